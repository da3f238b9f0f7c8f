use std::io;
use std::sync::Arc;
use std::time::Instant;

use json_log_output::{Fields, JsonOutput, Output};

/// Calls the output directly from several threads, with caller lookup on
/// every record.
fn main() {
    let output: Arc<dyn Output> = Arc::new(JsonOutput::new(io::sink(), io::sink()));

    let threads = 4;
    let n: u64 = 25_000;
    let start = Instant::now();

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let output = Arc::clone(&output);
            std::thread::spawn(move || {
                for i in 0..n {
                    let mut fields = Fields::new();
                    fields.insert("thread".to_string(), t.into());
                    fields.insert("iteration".to_string(), i.into());
                    output.error("load: ", 0, false, "error", Some(&"custom load test error"), Some(&fields));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("load thread panicked");
    }

    let total = n * threads;
    let elapsed = start.elapsed();
    println!("custom load: wrote {} events in {:?} (~{:.0} ev/s)",
        total,
        elapsed,
        total as f64 / elapsed.as_secs_f64()
    );
}
