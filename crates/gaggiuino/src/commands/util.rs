//! Shared helpers for command handlers.

use std::future::Future;
use std::time::Duration;

use gaggiuino_core::{Coordinator, CoordinatorConfig, CoreError, WriteOutcome};

use crate::error::CliError;

/// Like `Coordinator::oneshot`, for handlers that fail with CLI errors.
pub async fn with_coordinator<F, Fut, T>(config: CoordinatorConfig, f: F) -> Result<T, CliError>
where
    F: FnOnce(Coordinator) -> Fut,
    Fut: Future<Output = Result<T, CliError>>,
{
    let coordinator = Coordinator::new(config.with_poll_interval(Duration::ZERO))?;
    coordinator.first_refresh().await?;
    let result = f(coordinator.clone()).await;
    coordinator.shutdown().await;
    result
}

/// Turn the result of an entity write into CLI feedback.
///
/// `None` means the settings group was never reported by the machine.
pub fn report_write(
    result: Result<Option<WriteOutcome>, CoreError>,
    what: &str,
    quiet: bool,
) -> Result<(), CliError> {
    match result? {
        None => Err(CliError::Unavailable { what: what.into() }),
        Some(outcome) => report_outcome(outcome, what, quiet),
    }
}

pub fn report_outcome(outcome: WriteOutcome, what: &str, quiet: bool) -> Result<(), CliError> {
    match outcome {
        WriteOutcome::Applied => {
            if !quiet {
                eprintln!("{what} updated");
            }
            Ok(())
        }
        WriteOutcome::Unconfirmed => {
            if !quiet {
                eprintln!("{what}: request sent, machine did not confirm before the timeout");
            }
            Ok(())
        }
        WriteOutcome::Rejected => Err(CliError::Rejected {
            operation: what.to_lowercase(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_writes_are_errors() {
        assert!(report_outcome(WriteOutcome::Applied, "LED", true).is_ok());
        assert!(report_outcome(WriteOutcome::Unconfirmed, "LED", true).is_ok());
        assert!(matches!(
            report_outcome(WriteOutcome::Rejected, "LED", true),
            Err(CliError::Rejected { .. })
        ));
    }

    #[test]
    fn unknown_group_is_unavailable() {
        assert!(matches!(
            report_write(Ok(None), "Scales settings", true),
            Err(CliError::Unavailable { .. })
        ));
    }
}
