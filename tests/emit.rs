//! End-to-end tests for records written by `JsonOutput`.

use json_log_output::{
    BufferPool, Destination, EmitError, Fields, JsonOutput, Lines, Loggable, MultiLine, Output,
    SharedWriter,
};
use serde_json::{json, Value};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn parse(line: &str) -> Value {
    serde_json::from_str(line).unwrap_or_else(|e| panic!("invalid JSON {:?}: {}", line, e))
}

fn pair() -> (SharedWriter, SharedWriter, JsonOutput) {
    let errors = SharedWriter::new();
    let debug = SharedWriter::new();
    let output = JsonOutput::new(errors.clone(), debug.clone());
    (errors, debug, output)
}

#[inline(never)]
fn log_through_wrapper(output: &dyn Output) {
    output.error("wrapper: ", 1, false, "error", Some(&"wrapped"), None);
}

#[test]
fn test_error_record_matches_expected_line() {
    let (errors, debug, output) = pair();
    let mut fields = Fields::new();
    fields.insert("code".to_string(), json!(500));

    let line = line!() + 1;
    output.error("server: ", 0, false, "error", Some(&"boom"), Some(&fields));

    let lines = errors.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(
        lines[0],
        format!(
            r#"{{"msg":"boom","component":"server","caller":"emit.rs:{}","ops":{{"code":500}},"level":"error"}}"#,
            line
        )
    );
    assert!(debug.contents().is_empty());
    assert!(errors.contents().ends_with(b"}\n"));
}

#[test]
fn test_debug_goes_to_debug_stream() {
    let (errors, debug, output) = pair();
    output.debug("cache: ", 0, false, "debug", Some(&"miss"), None);
    output.debug("cache: ", 0, false, "debug", Some(&"hit"), None);

    assert!(errors.contents().is_empty());
    let lines = debug.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(parse(&lines[0])["msg"], "miss");
    assert_eq!(parse(&lines[1])["msg"], "hit");
    assert_eq!(parse(&lines[1])["level"], "debug");
}

#[test]
fn test_skip_frames_attributes_wrapper_caller() {
    let (errors, _debug, output) = pair();

    let line = line!() + 1;
    log_through_wrapper(&output);

    let event = parse(&errors.lines()[0]);
    assert_eq!(event["caller"], format!("emit.rs:{}", line));
    assert_eq!(event["component"], "wrapper");
}

#[test]
fn test_skip_beyond_stack_depth_drops_caller_only() {
    let (errors, _debug, output) = pair();
    output.error("deep: ", 100_000, false, "error", Some(&"still logged"), None);

    let event = parse(&errors.lines()[0]);
    assert!(event.get("caller").is_none());
    assert_eq!(event["msg"], "still logged");
}

#[test]
fn test_empty_values_are_omitted() {
    let (errors, _debug, output) = pair();
    let empty = Fields::new();
    output.error("svc: ", 0, false, "", None, Some(&empty));

    let event = parse(&errors.lines()[0]);
    let keys: Vec<&str> = event.as_object().unwrap().keys().map(String::as_str).collect();
    assert!(!keys.contains(&"ops"));
    assert!(!keys.contains(&"level"));
    assert!(!keys.contains(&"stack"));
    assert!(!keys.contains(&"msg"));
    assert!(!errors.lines()[0].contains("null"));
}

#[test]
fn test_print_stack_attaches_stack() {
    let (errors, _debug, output) = pair();
    output.error("svc: ", 0, true, "fatal", Some(&"crash"), None);
    output.error("svc: ", 0, false, "error", Some(&"no stack"), None);

    let lines = errors.lines();
    let with_stack = parse(&lines[0]);
    let stack = with_stack["stack"].as_str().unwrap();
    assert!(stack.starts_with("thread '"));
    assert!(stack.contains("emit.rs:"));
    assert!(parse(&lines[1]).get("stack").is_none());
}

#[test]
fn test_number_argument_renders_as_text() {
    let (errors, _debug, output) = pair();
    output.error("svc: ", 0, false, "error", Some(&42), None);
    assert_eq!(parse(&errors.lines()[0])["msg"], "42");
}

#[test]
fn test_multi_line_message_is_redacted_after_assembly() {
    let errors = SharedWriter::new();
    let seen = Arc::new(recorder::Seen::default());
    let tap = Arc::clone(&seen);
    let output = JsonOutput::new(errors.clone(), io::sink()).with_redactor(move |text: &str| {
        tap.push(text);
        text.replace("hunter2", "********")
    });

    let lines = Lines(vec!["user=admin", "password=hunter2"]);
    output.error("auth: ", 0, false, "error", Some(&lines), None);

    assert_eq!(seen.all(), vec!["user=admin\npassword=hunter2\n".to_string()]);
    assert_eq!(
        parse(&errors.lines()[0])["msg"],
        "user=admin\npassword=********\n"
    );
}

/// Multi-line argument with its own stepping logic.
struct Countdown(u32);

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "countdown from {}", self.0)
    }
}

impl MultiLine for Countdown {
    fn multi_line_printer(&self) -> json_log_output::message::LinePrinter<'_> {
        let mut next = self.0;
        Box::new(move |buf: &mut Vec<u8>| {
            buf.extend_from_slice(next.to_string().as_bytes());
            if next == 0 {
                return false;
            }
            next -= 1;
            true
        })
    }
}

impl Loggable for Countdown {
    fn as_multi_line(&self) -> Option<&dyn MultiLine> {
        Some(self)
    }
}

#[test]
fn test_custom_multi_line_argument() {
    let (_errors, debug, output) = pair();
    output.debug("timer: ", 0, false, "debug", Some(&Countdown(2)), None);
    assert_eq!(parse(&debug.lines()[0])["msg"], "2\n1\n0\n");
}

#[test]
fn test_large_multi_line_message_is_not_kept_in_pool() {
    let pool = Arc::new(BufferPool::new(768));
    let errors = SharedWriter::new();
    let output = JsonOutput::new(errors.clone(), io::sink()).with_pool(Arc::clone(&pool));

    let big = Lines(vec!["x".repeat(400), "y".repeat(400)]);
    output.error("svc: ", 0, false, "error", Some(&big), None);
    assert_eq!(pool.idle_count(), 0);

    let event = parse(&errors.lines()[0]);
    assert_eq!(event["msg"].as_str().unwrap().len(), 802);
}

#[test]
fn test_failed_write_reports_and_never_panics() {
    struct Closed;
    impl io::Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let failures = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&failures);
    let output = JsonOutput::new(Closed, Closed).with_reporter(move |err: &EmitError| {
        assert!(err.to_string().contains("closed"));
        counter.fetch_add(1, Ordering::SeqCst);
    });

    output.error("svc: ", 0, false, "error", Some(&"lost"), None);
    output.debug("svc: ", 0, true, "debug", Some(&"lost too"), None);
    assert_eq!(failures.load(Ordering::SeqCst), 2);

    let direct = output.emit(Destination::Debug, "svc: ", 0, false, "debug", None, None);
    assert!(matches!(direct, Err(EmitError::Write(_))));
}

/// Argument whose `Display` always fails.
struct Faulty;

impl std::fmt::Display for Faulty {
    fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Err(std::fmt::Error)
    }
}

impl Loggable for Faulty {}

#[test]
fn test_failing_display_is_reported_not_panicked() {
    let errors = SharedWriter::new();
    let failures = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&failures);
    let output = JsonOutput::new(errors.clone(), io::sink()).with_reporter(move |err: &EmitError| {
        assert!(matches!(err, EmitError::Format(_)));
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        output.error("svc: ", 0, false, "error", Some(&Faulty), None);
    }));

    assert!(outcome.is_ok());
    assert_eq!(failures.load(Ordering::SeqCst), 1);
    assert!(errors.lines().is_empty());

    // The output keeps working afterwards.
    output.error("svc: ", 0, false, "error", Some(&"after"), None);
    assert_eq!(parse(&errors.lines()[0])["msg"], "after");
}

#[test]
fn test_concurrent_emission_produces_whole_lines() {
    const THREADS: usize = 16;
    const PER_THREAD: usize = 200;

    let errors = SharedWriter::new();
    let output: Arc<dyn Output> = Arc::new(JsonOutput::new(errors.clone(), io::sink()));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let output = Arc::clone(&output);
            std::thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let mut fields = Fields::new();
                    fields.insert("thread".to_string(), json!(t));
                    fields.insert("i".to_string(), json!(i));
                    let text = format!("message {} from {}", i, t);
                    output.error("worker: ", 0, false, "error", Some(&text), Some(&fields));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let lines = errors.lines();
    assert_eq!(lines.len(), THREADS * PER_THREAD);
    let mut per_thread = vec![0usize; THREADS];
    for line in &lines {
        let event = parse(line);
        let t = event["ops"]["thread"].as_u64().unwrap() as usize;
        let i = event["ops"]["i"].as_u64().unwrap();
        assert_eq!(event["msg"], format!("message {} from {}", i, t));
        assert!(event["caller"].as_str().unwrap().starts_with("emit.rs:"));
        per_thread[t] += 1;
    }
    assert!(per_thread.iter().all(|&n| n == PER_THREAD));
}

mod recorder {
    use std::sync::Mutex;

    /// Records every text handed to a redactor.
    #[derive(Default)]
    pub struct Seen(Mutex<Vec<String>>);

    impl Seen {
        pub fn push(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }

        pub fn all(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }
}
