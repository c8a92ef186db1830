//! Result aggregation for a single orchestrator run.
//!
//! The orchestrator owns one `ExitReport` and is its only writer. Run-phase
//! results are recorded in completion order, except that results landing
//! together are recorded in registration order. The first failure recorded
//! claims the slot and later ones are kept separately without replacing it.

use crate::lifecycle::server::ServerError;

/// A failure attributed to one server.
#[derive(Debug)]
pub struct ServerFailure {
    /// Name of the server that failed.
    pub server: String,
    /// Position in registration order.
    pub index: usize,
    /// What went wrong.
    pub error: ServerError,
}

/// Aggregate outcome of an orchestrator run.
#[derive(Debug, Default)]
pub struct ExitReport {
    /// Earliest run-phase failure.
    pub first_failure: Option<ServerFailure>,
    /// Run-phase failures observed after the first.
    pub suppressed_failures: Vec<ServerFailure>,
    /// Failures from `stop`, including forced shutdowns, in stop order.
    pub stop_failures: Vec<ServerFailure>,
}

impl ExitReport {
    /// True when no server failed in either phase.
    pub fn is_success(&self) -> bool {
        self.first_failure.is_none() && self.stop_failures.is_empty()
    }

    /// Process exit code: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Record the result of a server's `run`.
    ///
    /// `shutdown_requested` tells whether an `Ok` return was asked for.
    /// Returns the failure's error text when the result counts as a failure.
    pub(crate) fn record_run(
        &mut self,
        index: usize,
        server: &str,
        result: Result<(), ServerError>,
        shutdown_requested: bool,
    ) -> Option<String> {
        let error = match result {
            Ok(()) if shutdown_requested => return None,
            Ok(()) => ServerError::UnexpectedExit,
            Err(err) => err,
        };
        let message = error.to_string();

        let failure = ServerFailure {
            server: server.to_string(),
            index,
            error,
        };
        if self.first_failure.is_none() {
            self.first_failure = Some(failure);
        } else {
            self.suppressed_failures.push(failure);
        }
        Some(message)
    }

    /// Record a failed `stop`.
    pub(crate) fn record_stop(&mut self, index: usize, server: &str, error: ServerError) {
        self.stop_failures.push(ServerFailure {
            server: server.to_string(),
            index,
            error,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_clean_report() {
        let mut report = ExitReport::default();
        assert_eq!(report.record_run(0, "metrics", Ok(()), true), None);
        assert!(report.is_success());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_first_failure_wins() {
        let mut report = ExitReport::default();
        report.record_run(1, "b", Err(ServerError::Setup("first".into())), false);
        report.record_run(0, "a", Err(ServerError::Setup("second".into())), true);

        let first = report.first_failure.as_ref().unwrap();
        assert_eq!(first.server, "b");
        assert_eq!(first.index, 1);
        assert_eq!(report.suppressed_failures.len(), 1);
        assert_eq!(report.suppressed_failures[0].server, "a");
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_early_exit_is_a_failure() {
        let mut report = ExitReport::default();
        let message = report.record_run(0, "metrics", Ok(()), false);
        assert!(message.is_some());
        assert!(matches!(
            report.first_failure,
            Some(ServerFailure {
                error: ServerError::UnexpectedExit,
                ..
            })
        ));
    }

    #[test]
    fn test_stop_failure_fails_the_run() {
        let mut report = ExitReport::default();
        report.record_run(0, "grpc", Ok(()), true);
        report.record_stop(0, "grpc", ServerError::ForcedShutdown(Duration::from_secs(1)));

        assert!(report.first_failure.is_none());
        assert_eq!(report.exit_code(), 1);
    }
}
