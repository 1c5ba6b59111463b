//! src/configuration.rs
use serde_aux::field_attributes::{
    deserialize_number_from_string, deserialize_option_number_from_string,
};
use std::path::Path;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub cluster: ClusterSettings,
    pub job: JobSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ClusterSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub workers: u16,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct JobSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub reduce_tasks: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub split_size_in_bytes: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_map_attempts: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_reduce_attempts: u32,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub timeout_seconds: Option<u64>,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    pub log_filter: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path =
        std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    get_configuration_from(&base_path.join("configuration"))
}

/// Built-in defaults, overridden by `<config_dir>/spec.yaml` when present,
/// overridden by `KEYWORD_INDEX_`-prefixed environment variables
/// (e.g. `KEYWORD_INDEX_JOB__REDUCE_TASKS=8`).
pub fn get_configuration_from(config_dir: &Path) -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .set_default("cluster.workers", 4)?
        .set_default("job.reduce_tasks", 1)?
        .set_default("job.split_size_in_bytes", 64 * 1024 * 1024)?
        .set_default("job.max_map_attempts", 4)?
        .set_default("job.max_reduce_attempts", 4)?
        .set_default("telemetry.log_filter", "info")?
        .add_source(config::File::from(config_dir.join("spec.yaml")).required(false))
        .add_source(
            config::Environment::with_prefix("KEYWORD_INDEX")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
