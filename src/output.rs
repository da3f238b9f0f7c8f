use crate::event::Fields;
use crate::message::Loggable;

/// Which of an output's two streams a record goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Error-class records (errors, fatal, warnings).
    Error,
    /// Debug-class records (debug, trace, info).
    Debug,
}

/// Back end of a logger: turns one log call into one record.
///
/// Both methods are fire-and-forget; failures are reported out of band.
///
/// **Parameters**
/// - `prefix`: component name followed by the `": "` separator, e.g.
///   `"server: "`.
/// - `skip_frames`: frames between the code being attributed and this
///   call; `0` attributes the direct caller, and every front-end wrapper
///   in between adds one.
/// - `print_stack`: attach a full stack dump to the record.
/// - `severity`: short label such as `"error"` or `"debug"`.
/// - `arg`: the message argument, if any.
/// - `fields`: extra key/value pairs, if any.
pub trait Output: Send + Sync {
    fn error(
        &self,
        prefix: &str,
        skip_frames: usize,
        print_stack: bool,
        severity: &str,
        arg: Option<&dyn Loggable>,
        fields: Option<&Fields>,
    );

    fn debug(
        &self,
        prefix: &str,
        skip_frames: usize,
        print_stack: bool,
        severity: &str,
        arg: Option<&dyn Loggable>,
        fields: Option<&Fields>,
    );
}
