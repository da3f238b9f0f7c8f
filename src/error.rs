use std::{fmt, io};

/// Failure while turning an event into a JSON line or writing it out.
///
/// These never reach the code that issued the log call; they are handed to
/// the output's [`ErrorReporter`](crate::report::ErrorReporter) instead.
#[derive(thiserror::Error, Debug)]
pub enum EmitError {
    #[error("unable to serialize log event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("unable to format log message: a Display implementation returned an error")]
    Format(#[from] fmt::Error),

    #[error("unable to write log event: {0}")]
    Write(#[from] io::Error),
}
