//! Newline-delimited JSON log output.
//!
//! A [`JsonOutput`] turns each log call into one JSON object on its own
//! line, sending error-class records to one writer and debug-class records
//! to another:
//!
//! ```
//! use json_log_output::{Fields, JsonOutput, Output, SharedWriter};
//!
//! let errors = SharedWriter::new();
//! let output = JsonOutput::new(errors.clone(), std::io::sink());
//!
//! let mut fields = Fields::new();
//! fields.insert("code".to_string(), 500.into());
//! output.error("server: ", 0, false, "error", Some(&"boom"), Some(&fields));
//!
//! let event: serde_json::Value = serde_json::from_str(&errors.lines()[0]).unwrap();
//! assert_eq!(event["msg"], "boom");
//! assert_eq!(event["component"], "server");
//! assert_eq!(event["ops"]["code"], 500);
//! assert_eq!(event["level"], "error");
//! ```
//!
//! Records are assembled in pooled buffers, the caller is resolved from the
//! stack, multi-line messages pass through a [`Redactor`], and failures go
//! to an [`ErrorReporter`] instead of the code that logged.
//!
//! The `caller` field needs line tables to read `file:line`. Release builds
//! have none by default; set `debug = "line-tables-only"` in the release
//! profile, otherwise `caller` falls back to the calling function's path.

pub mod caller;
pub mod env;
pub mod error;
pub mod event;
pub mod init;
pub mod json_output;
pub mod layer;
pub mod message;
pub mod output;
pub mod pool;
pub mod redact;
pub mod report;
pub mod stack;
pub mod writer;

pub use error::EmitError;
pub use event::{Event, Fields};
pub use json_output::{component_name, JsonOutput};
pub use layer::JsonOutputLayer;
pub use message::{Lines, Loggable, MultiLine};
pub use output::{Destination, Output};
pub use pool::{buffer_pool, BufferPool, PooledBuffer};
pub use redact::{NoopRedactor, Redactor};
pub use report::{ErrorReporter, StderrReporter, TracingReporter};
pub use writer::SharedWriter;
