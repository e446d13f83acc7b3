use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Startup logging configuration, applied once before any command runs.
///
/// Output always goes to stderr; only the level is configurable.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingConfig {
    pub verbose: bool,
}

impl LoggingConfig {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }

    /// `RUST_LOG` wins over the configured level when set.
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(self.level()).into())
            .from_env_lossy()
    }

    /// Install the global subscriber. Later calls are no-ops.
    pub fn init(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.filter())
            .with_writer(std::io::stderr)
            .try_init();
    }
}
