//! Environment variable names read by [`LayerConfig::from_env`](crate::init::LayerConfig::from_env).
//!
//! These are helpers only; [`JsonOutput`](crate::json_output::JsonOutput)
//! itself never reads the environment.

/// Component name written on every record produced through the layer.
pub const JSON_LOG_COMPONENT_ENV: &str = "JSON_LOG_COMPONENT";

/// Most verbose level written: `error`, `warn`, `info`, `debug` or `trace`.
pub const JSON_LOG_LEVEL_ENV: &str = "JSON_LOG_LEVEL";

/// Attach a stack dump to error events when set to `1`, `true` or `yes`.
pub const JSON_LOG_STACK_ON_ERROR_ENV: &str = "JSON_LOG_STACK_ON_ERROR";

/// Also print human-readable lines through a `fmt` layer.
pub const JSON_LOG_STDOUT_ENV: &str = "JSON_LOG_STDOUT";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read a boolean flag; unset or unrecognized values give `default`.
pub fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
