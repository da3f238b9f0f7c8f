use crate::env::{
    env_flag, env_or, JSON_LOG_COMPONENT_ENV, JSON_LOG_LEVEL_ENV, JSON_LOG_STACK_ON_ERROR_ENV,
    JSON_LOG_STDOUT_ENV,
};
use crate::json_output::JsonOutput;
use crate::layer::JsonOutputLayer;
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the [`JsonOutputLayer`] installed by [`init_tracing`].
///
/// **Fields**
/// - `component`: component name written on every record.
/// - `min_level`: most verbose level still written.
/// - `stack_on_error`: attach a stack dump to `ERROR` events.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   added next to the JSON layer and events are also printed to the
///   console in human-readable form.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub component: String,
    pub min_level: Level,
    pub stack_on_error: bool,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            component: "app".to_string(),
            min_level: Level::DEBUG,
            stack_on_error: false,
            enable_stdout: false,
        }
    }
}

impl LayerConfig {
    /// Defaults overridden by the `JSON_LOG_*` variables in [`crate::env`].
    /// An unparsable level keeps the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            component: env_or(JSON_LOG_COMPONENT_ENV, &defaults.component),
            min_level: env_or(JSON_LOG_LEVEL_ENV, "")
                .parse()
                .unwrap_or(defaults.min_level),
            stack_on_error: env_flag(JSON_LOG_STACK_ON_ERROR_ENV, defaults.stack_on_error),
            enable_stdout: env_flag(JSON_LOG_STDOUT_ENV, defaults.enable_stdout),
        }
    }

    /// Build the layer described by this configuration.
    pub fn layer(&self, output: Arc<JsonOutput>) -> JsonOutputLayer {
        JsonOutputLayer::new(output, self.component.clone())
            .with_min_level(self.min_level)
            .with_stack_on_error(self.stack_on_error)
    }
}

/// Install a global `tracing` subscriber that writes through `output`.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
pub fn init_tracing_with_config(
    output: Arc<JsonOutput>,
    config: LayerConfig,
) -> Result<(), SetGlobalDefaultError> {
    let layer = config.layer(output);

    // Two subscriber shapes, since the fmt layer changes the type.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Install the JSON layer configured from the environment.
pub fn init_tracing(output: Arc<JsonOutput>) -> Result<(), SetGlobalDefaultError> {
    init_tracing_with_config(output, LayerConfig::from_env())
}
