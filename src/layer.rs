use crate::caller::base_name;
use crate::event::Fields;
use crate::json_output::JsonOutput;
use crate::message::Loggable;
use crate::output::Destination;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that writes every event it sees as a JSON
/// line through a [`JsonOutput`].
///
/// `ERROR` and `WARN` events go to the error stream, everything else to the
/// debug stream. The caller comes from the event's metadata, the severity is
/// the lowercase level name, the `message` field becomes the message and all
/// other fields end up under `ops`. Events more verbose than `min_level` are
/// ignored.
pub struct JsonOutputLayer {
    output: Arc<JsonOutput>,
    component: String,
    min_level: Level,
    stack_on_error: bool,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Events written out successfully.
    pub emitted_events: Arc<AtomicU64>,
    /// Events dropped because serialization or the write failed.
    pub failed_events: Arc<AtomicU64>,
}

impl JsonOutputLayer {
    pub fn new(output: Arc<JsonOutput>, component: impl Into<String>) -> Self {
        Self {
            output,
            component: component.into(),
            min_level: Level::TRACE,
            stack_on_error: false,
            total_events: Arc::new(AtomicU64::new(0)),
            emitted_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Most verbose level still written.
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Attach a stack dump to `ERROR` events.
    pub fn with_stack_on_error(mut self, enabled: bool) -> Self {
        self.stack_on_error = enabled;
        self
    }
}

impl<S> Layer<S> for JsonOutputLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        let meta = event.metadata();
        let level = *meta.level();
        if level > self.min_level {
            return;
        }

        let mut fields = Fields::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        let destination = if level <= Level::WARN {
            Destination::Error
        } else {
            Destination::Debug
        };
        let caller = match (meta.file(), meta.line()) {
            (Some(file), Some(line)) => format!("{}:{}", base_name(Path::new(file)), line),
            _ => String::new(),
        };
        let severity = level.as_str().to_ascii_lowercase();
        let print_stack = self.stack_on_error && level == Level::ERROR;

        let result = self.output.emit_with_caller(
            destination,
            &self.component,
            caller,
            print_stack,
            &severity,
            message.as_ref().map(|m| m as &dyn Loggable),
            Some(&fields),
        );
        match result {
            Ok(()) => {
                self.emitted_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                self.output.report(&err);
            }
        }
    }
}

/// Collects an event's fields into [`Fields`], pulling out `message`.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Fields,
    pub message: &'a mut Option<String>,
}

impl FieldVisitor<'_> {
    fn insert(&mut self, field: &Field, value: serde_json::Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.insert(field, serde_json::Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // Non-finite values become null.
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(debug_text(value));
        } else {
            self.insert(field, serde_json::Value::String(debug_text(value)));
        }
    }
}

/// Text written in place of a value whose `Debug` implementation failed.
pub const UNFORMATTABLE: &str = "<unformattable>";

/// `Debug` output of `value`, or [`UNFORMATTABLE`] if formatting fails.
fn debug_text(value: &dyn std::fmt::Debug) -> String {
    use std::fmt::Write;

    let mut text = String::new();
    match write!(text, "{:?}", value) {
        Ok(()) => text,
        Err(_) => UNFORMATTABLE.to_string(),
    }
}
