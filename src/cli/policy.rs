use crate::Result;
use std::future::Future;
use std::io::Write;
use std::process::ExitCode;

/// Exit code used when a failure is treated as fatal.
pub const FATAL_EXIT_CODE: i32 = 255;

/// Called on the fatal path with [`FATAL_EXIT_CODE`].
///
/// The default hook exits the process. A hook that returns leaves the
/// invocation reporting [`Outcome::Failed`].
pub type FatalHook = fn(i32);

/// How a failed validation or run is surfaced to the operator.
#[derive(Debug, Clone, Copy)]
pub enum FailurePolicy {
    /// Log at fatal severity and terminate the process through the hook.
    /// Used when a command runs embedded in a larger operator CLI.
    Terminating(FatalHook),
    /// Write the error text to the error stream and return.
    /// Used when a command is the top-level invocation.
    Reporting,
}

impl FailurePolicy {
    pub fn terminating() -> Self {
        Self::Terminating(exit_process)
    }

    pub fn reporting() -> Self {
        Self::Reporting
    }
}

fn exit_process(code: i32) {
    std::process::exit(code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Succeeded => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::FAILURE,
        }
    }
}

/// Runs a command's validate/run pair under a failure policy.
pub struct Invocation {
    policy: FailurePolicy,
    err_out: Box<dyn Write + Send>,
}

impl Invocation {
    pub fn new(policy: FailurePolicy, err_out: impl Write + Send + 'static) -> Self {
        Self {
            policy,
            err_out: Box::new(err_out),
        }
    }

    /// Run `validate`, then `run` only if validation passed.
    pub async fn invoke<V, R, Fut>(mut self, validate: V, run: R) -> Outcome
    where
        V: FnOnce() -> Result<()>,
        R: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        if let Err(err) = validate() {
            self.fail(&err);
            return Outcome::Failed;
        }

        match run().await {
            Ok(()) => Outcome::Succeeded,
            Err(err) => {
                self.fail(&err);
                Outcome::Failed
            }
        }
    }

    fn fail(&mut self, err: &crate::Error) {
        match self.policy {
            FailurePolicy::Terminating(fatal) => {
                tracing::error!(fatal = true, "{}", err);
                fatal(FATAL_EXIT_CODE);
            }
            FailurePolicy::Reporting => {
                if let Err(write_err) = writeln!(self.err_out, "{}", err) {
                    tracing::warn!("Failed to write to error stream: {}", write_err);
                }
                let _ = self.err_out.flush();
            }
        }
    }
}
