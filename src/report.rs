use crate::error::EmitError;
use std::io::{self, Write};

/// Receives failures that happened while emitting a log record.
///
/// Log calls never return errors to their caller; whatever goes wrong is
/// passed here and the record is dropped. Implementations must not log
/// through the same output they are attached to.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, err: &EmitError);
}

/// Default reporter: one line on stderr per failure. A failing stderr is
/// ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrReporter;

impl ErrorReporter for StderrReporter {
    fn report(&self, err: &EmitError) {
        let _ = writeln!(io::stderr().lock(), "unable to log: {}", err);
    }
}

/// Forwards failures as `tracing` error events under the crate's target.
///
/// Do not combine with a [`JsonOutputLayer`](crate::layer::JsonOutputLayer)
/// writing to the same output, or a failing writer will feed itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, err: &EmitError) {
        tracing::error!(target: "json_log_output", error = %err, "unable to emit log record");
    }
}

impl<F> ErrorReporter for F
where
    F: Fn(&EmitError) + Send + Sync,
{
    fn report(&self, err: &EmitError) {
        self(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_closure_reporter_receives_error() {
        let seen = AtomicUsize::new(0);
        let reporter = |err: &EmitError| {
            assert!(matches!(err, EmitError::Write(_)));
            seen.fetch_add(1, Ordering::Relaxed);
        };
        reporter.report(&EmitError::Write(io::Error::new(io::ErrorKind::Other, "closed")));
        assert_eq!(seen.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_stderr_reporter_is_best_effort() {
        StderrReporter.report(&EmitError::Format(std::fmt::Error));
        StderrReporter.report(&EmitError::Write(io::Error::new(io::ErrorKind::Other, "closed")));
    }

    #[test]
    fn test_error_messages() {
        let err = EmitError::Write(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert_eq!(err.to_string(), "unable to write log event: pipe closed");
    }
}
