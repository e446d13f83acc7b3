use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("missing required flag: --{0}")]
    MissingParameter(&'static str),

    /// Failure reported by a backup or restore engine, passed through as-is.
    #[error(transparent)]
    Engine(#[from] anyhow::Error),

    #[error("failed to register interrupt handler: {0}")]
    Signal(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
