use std::sync::Arc;
use tracing::{error, info};

use json_log_output::init::{init_tracing_with_config, LayerConfig};
use json_log_output::JsonOutput;

fn main() {
    let config = LayerConfig {
        component: "auth".to_string(),
        ..LayerConfig::default()
    };
    init_tracing_with_config(Arc::new(JsonOutput::stdio()), config).expect("set global subscriber");

    info!("starting service");

    error!(
        user_id = 42,
        reason = "invalid password",
        "authentication failed"
    );
}
