use crate::shutdown::ShutdownSignalError;

/// What to do once an operation has failed and has no retries left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Log the error and carry on as if the operation produced nothing.
    LogAndContinue,
    /// Hand the error back to the caller.
    Abort,
}

/// Error policy for a single repeated operation, such as one API call inside a setup loop.
///
/// A [ShutdownSignalError] is never retried or swallowed, whatever the policy says, so that a
/// cancelled run stops promptly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailurePolicy {
    pub max_retries: u32,
    pub on_failure: OnFailure,
}

impl FailurePolicy {
    /// No retries, failures are logged and skipped.
    pub const LOG_AND_CONTINUE: FailurePolicy = FailurePolicy {
        max_retries: 0,
        on_failure: OnFailure::LogAndContinue,
    };

    /// No retries, the first failure is returned.
    pub const ABORT: FailurePolicy = FailurePolicy {
        max_retries: 0,
        on_failure: OnFailure::Abort,
    };

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Run `op` under this policy.
    ///
    /// Returns `Ok(Some(_))` on success, `Ok(None)` when the failure was logged and skipped, and
    /// `Err(_)` when the policy aborts or the run is shutting down. `what` names the operation in
    /// log output, e.g. `"Creating a sample"`.
    pub fn run<T, F>(&self, what: &str, mut op: F) -> anyhow::Result<Option<T>>
    where
        F: FnMut() -> anyhow::Result<T>,
    {
        let mut attempt = 0;
        loop {
            let err = match op() {
                Ok(value) => return Ok(Some(value)),
                Err(e) if e.is::<ShutdownSignalError>() => return Err(e),
                Err(e) => e,
            };

            if attempt < self.max_retries {
                attempt += 1;
                log::warn!(
                    "{}",
                    retry_message(what, &err, attempt, self.max_retries)
                );
                continue;
            }

            return match self.on_failure {
                OnFailure::LogAndContinue => {
                    log::error!("{}", failure_message(what, &err));
                    Ok(None)
                }
                OnFailure::Abort => Err(err),
            };
        }
    }
}

/// The whole error chain is included, not just the outermost context.
fn failure_message(what: &str, err: &anyhow::Error) -> String {
    format!("{what} failed: {err:#}")
}

fn retry_message(what: &str, err: &anyhow::Error, attempt: u32, max_retries: u32) -> String {
    format!("{what} failed, retrying ({attempt}/{max_retries}): {err:#}")
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::ABORT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_returned() {
        let result = FailurePolicy::LOG_AND_CONTINUE.run("Counting", || Ok(3));
        assert_eq!(Some(3), result.unwrap());
    }

    #[test]
    fn log_and_continue_swallows_failure_without_retry() {
        let mut calls = 0;
        let result = FailurePolicy::LOG_AND_CONTINUE.run("Counting", || -> anyhow::Result<()> {
            calls += 1;
            anyhow::bail!("boom")
        });

        assert!(result.unwrap().is_none());
        assert_eq!(1, calls);
    }

    #[test]
    fn abort_returns_failure() {
        let result = FailurePolicy::ABORT.run("Counting", || -> anyhow::Result<()> {
            anyhow::bail!("boom")
        });

        assert_eq!("boom", result.unwrap_err().to_string());
    }

    #[test]
    fn retries_until_success() {
        let mut calls = 0;
        let result = FailurePolicy::ABORT
            .with_max_retries(2)
            .run("Counting", || {
                calls += 1;
                if calls < 3 {
                    anyhow::bail!("not yet")
                }
                Ok(calls)
            });

        assert_eq!(Some(3), result.unwrap());
    }

    #[test]
    fn retries_are_bounded() {
        let mut calls = 0;
        let result = FailurePolicy::LOG_AND_CONTINUE
            .with_max_retries(2)
            .run("Counting", || -> anyhow::Result<()> {
                calls += 1;
                anyhow::bail!("never")
            });

        assert!(result.unwrap().is_none());
        assert_eq!(3, calls);
    }

    #[test]
    fn shutdown_is_never_swallowed() {
        let mut calls = 0;
        let result = FailurePolicy::LOG_AND_CONTINUE
            .with_max_retries(5)
            .run("Counting", || -> anyhow::Result<()> {
                calls += 1;
                Err(ShutdownSignalError::default().into())
            });

        assert!(result.unwrap_err().is::<ShutdownSignalError>());
        assert_eq!(1, calls);
    }

    #[test]
    fn failure_message_includes_the_cause() {
        let err = anyhow::anyhow!("Connection refused (os error 111)")
            .context("Failed to send create sample request");

        assert_eq!(
            "Creating a sample failed: Failed to send create sample request: Connection refused (os error 111)",
            failure_message("Creating a sample", &err)
        );
        assert_eq!(
            "Creating a sample failed, retrying (1/3): Failed to send create sample request: Connection refused (os error 111)",
            retry_message("Creating a sample", &err, 1, 3)
        );
    }
}
