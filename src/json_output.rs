use crate::caller::{resolve_caller, MAX_CALLER_FRAMES};
use crate::error::EmitError;
use crate::event::{Event, Fields};
use crate::message::Loggable;
use crate::output::{Destination, Output};
use crate::pool::{buffer_pool, BufferPool};
use crate::redact::{NoopRedactor, Redactor};
use crate::report::{ErrorReporter, StderrReporter};
use crate::stack::capture_stack;
use parking_lot::Mutex;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Arc;

/// Separator that terminates every component prefix (`"server: "`).
pub const COMPONENT_SEPARATOR: &str = ": ";

/// Strip the trailing [`COMPONENT_SEPARATOR`] from a component prefix.
///
/// Prefixes without the separator are returned unchanged.
pub fn component_name(prefix: &str) -> &str {
    prefix.strip_suffix(COMPONENT_SEPARATOR).unwrap_or(prefix)
}

type Stream = Mutex<Box<dyn Write + Send>>;

/// [`Output`] that writes one JSON object per line, error-class records to
/// one writer and debug-class records to another.
///
/// Each record is serialized into a pooled buffer and handed to its writer
/// with a single `write_all` under that writer's lock, so records from
/// concurrent threads never interleave. Writers are expected to do their
/// own buffering; nothing is flushed here.
pub struct JsonOutput {
    error: Stream,
    debug: Stream,
    redactor: Arc<dyn Redactor>,
    reporter: Arc<dyn ErrorReporter>,
    pool: Arc<BufferPool>,
}

impl JsonOutput {
    /// Create an output writing errors to `error_writer` and everything
    /// else to `debug_writer`, with no redaction, the stderr reporter and
    /// the process-wide buffer pool.
    pub fn new<E, D>(error_writer: E, debug_writer: D) -> Self
    where
        E: Write + Send + 'static,
        D: Write + Send + 'static,
    {
        Self {
            error: Mutex::new(Box::new(error_writer)),
            debug: Mutex::new(Box::new(debug_writer)),
            redactor: Arc::new(NoopRedactor),
            reporter: Arc::new(StderrReporter),
            pool: buffer_pool(),
        }
    }

    /// Errors to stderr, debug records to stdout.
    pub fn stdio() -> Self {
        Self::new(io::stderr(), io::stdout())
    }

    /// Redactor applied to multi-line messages.
    pub fn with_redactor(mut self, redactor: impl Redactor + 'static) -> Self {
        self.redactor = Arc::new(redactor);
        self
    }

    /// Where emission failures go instead of the caller.
    pub fn with_reporter(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    pub fn with_pool(mut self, pool: Arc<BufferPool>) -> Self {
        self.pool = pool;
        self
    }

    /// Pass a failure to the configured reporter.
    pub fn report(&self, err: &EmitError) {
        self.reporter.report(err);
    }

    /// Build and write one record, resolving the caller from the stack.
    ///
    /// `skip_frames == 0` attributes the record to the function calling
    /// `emit`. Unlike [`Output::error`] and [`Output::debug`] the failure is
    /// returned rather than reported.
    #[allow(clippy::too_many_arguments)]
    #[inline(never)]
    pub fn emit(
        &self,
        destination: Destination,
        prefix: &str,
        skip_frames: usize,
        print_stack: bool,
        severity: &str,
        arg: Option<&dyn Loggable>,
        fields: Option<&Fields>,
    ) -> Result<(), EmitError> {
        let mut pcs = [0usize; MAX_CALLER_FRAMES];
        let caller = resolve_caller(skip_frames + 1, &mut pcs);
        self.emit_with_caller(
            destination,
            component_name(prefix),
            caller,
            print_stack,
            severity,
            arg,
            fields,
        )
    }

    /// Build and write one record for an already known call site.
    ///
    /// `component` is the bare component name, without separator.
    #[allow(clippy::too_many_arguments)]
    pub fn emit_with_caller(
        &self,
        destination: Destination,
        component: &str,
        caller: String,
        print_stack: bool,
        severity: &str,
        arg: Option<&dyn Loggable>,
        fields: Option<&Fields>,
    ) -> Result<(), EmitError> {
        let mut buf = self.pool.scoped();

        let mut event = Event {
            message: None,
            component,
            caller,
            fields,
            severity,
            stack: None,
        };
        if print_stack {
            let mut stack = String::new();
            capture_stack(&mut stack);
            event.stack = Some(stack);
        }
        event.message = arg.map(|arg| self.render(arg, &mut buf)).transpose()?;

        buf.clear();
        event.encode(&mut buf)?;
        self.stream(destination).lock().write_all(&buf)?;
        Ok(())
    }

    /// Message text for `arg`: its `Display` output, or for multi-line
    /// arguments every printed line plus `\n`, redacted. `scratch` holds the
    /// lines while they are printed.
    ///
    /// A `Display` implementation that fails yields [`EmitError::Format`].
    fn render(&self, arg: &dyn Loggable, scratch: &mut Vec<u8>) -> Result<String, EmitError> {
        let Some(multi_line) = arg.as_multi_line() else {
            let mut message = String::new();
            write!(message, "{}", arg)?;
            return Ok(message);
        };

        let mut print = multi_line.multi_line_printer();
        loop {
            let more = print(&mut *scratch);
            scratch.push(b'\n');
            if !more {
                break;
            }
        }
        Ok(self.redactor.clean(&String::from_utf8_lossy(scratch)))
    }

    fn stream(&self, destination: Destination) -> &Stream {
        match destination {
            Destination::Error => &self.error,
            Destination::Debug => &self.debug,
        }
    }
}

impl Output for JsonOutput {
    #[inline(never)]
    fn error(
        &self,
        prefix: &str,
        skip_frames: usize,
        print_stack: bool,
        severity: &str,
        arg: Option<&dyn Loggable>,
        fields: Option<&Fields>,
    ) {
        if let Err(err) = self.emit(
            Destination::Error,
            prefix,
            skip_frames + 1,
            print_stack,
            severity,
            arg,
            fields,
        ) {
            self.report(&err);
        }
    }

    #[inline(never)]
    fn debug(
        &self,
        prefix: &str,
        skip_frames: usize,
        print_stack: bool,
        severity: &str,
        arg: Option<&dyn Loggable>,
        fields: Option<&Fields>,
    ) {
        if let Err(err) = self.emit(
            Destination::Debug,
            prefix,
            skip_frames + 1,
            print_stack,
            severity,
            arg,
            fields,
        ) {
            self.report(&err);
        }
    }
}
