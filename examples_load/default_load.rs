use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use json_log_output::init::init_tracing;
use json_log_output::JsonOutput;

fn main() {
    let output = Arc::new(JsonOutput::new(io::sink(), io::sink()));
    init_tracing(output).expect("set global subscriber");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, "default load test error");
    }

    let elapsed = start.elapsed();
    println!("default config: wrote {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
