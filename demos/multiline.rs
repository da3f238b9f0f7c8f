use std::io;

use json_log_output::{JsonOutput, Lines, Output};

/// Prints a multi-line message whose secrets are masked before output.
fn main() {
    let output = JsonOutput::new(io::stderr(), io::stdout())
        .with_redactor(|text: &str| text.replace("s3cr3t", "[REDACTED]"));

    let request = Lines(vec![
        "POST /login HTTP/1.1",
        "Host: example.com",
        "Authorization: Bearer s3cr3t",
    ]);

    output.debug("http: ", 0, false, "debug", Some(&request), None);
    output.error("http: ", 0, true, "error", Some(&"login rejected"), None);
}
