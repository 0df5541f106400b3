//! Syncer configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use syncer_lib::{ObjectRef, ReplicationConfig};

/// Syncer configuration, loaded from the environment
#[derive(Debug, Clone, Deserialize)]
pub struct SyncerConfig {
    /// Name of the source ConfigMap to watch
    #[serde(default = "default_source_name")]
    pub source_name: String,

    /// Namespace of the source ConfigMap
    #[serde(default = "default_source_namespace")]
    pub source_namespace: String,

    /// Target ConfigMaps as a JSON array of {"name", "namespace"} objects
    #[serde(default = "default_targets")]
    pub targets: String,

    /// API server port for health/metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Bounded watch session lifetime in seconds
    #[serde(default = "default_watch_timeout")]
    pub watch_timeout_secs: u32,

    /// Initial reconnect backoff in seconds
    #[serde(default = "default_backoff_initial")]
    pub backoff_initial_secs: u64,

    /// Maximum reconnect backoff in seconds
    #[serde(default = "default_backoff_max")]
    pub backoff_max_secs: u64,
}

fn default_source_name() -> String {
    "source-configmap".to_string()
}

fn default_source_namespace() -> String {
    "default".to_string()
}

fn default_targets() -> String {
    r#"[{"name":"config-1","namespace":"dev"},{"name":"config-2","namespace":"stage"}]"#
        .to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_watch_timeout() -> u32 {
    600
}

fn default_backoff_initial() -> u64 {
    1
}

fn default_backoff_max() -> u64 {
    60
}

impl SyncerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SYNCER"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| SyncerConfig {
            source_name: default_source_name(),
            source_namespace: default_source_namespace(),
            targets: default_targets(),
            api_port: default_api_port(),
            watch_timeout_secs: default_watch_timeout(),
            backoff_initial_secs: default_backoff_initial(),
            backoff_max_secs: default_backoff_max(),
        }))
    }

    /// Parse the static replication parameters.
    ///
    /// The result is the immutable block handed to the control loop; it is
    /// never re-read at runtime.
    pub fn replication(&self) -> Result<ReplicationConfig> {
        let targets: Vec<ObjectRef> =
            serde_json::from_str(&self.targets).context("Invalid SYNCER_TARGETS JSON")?;

        Ok(ReplicationConfig {
            source: ObjectRef::new(self.source_name.clone(), self.source_namespace.clone()),
            targets,
        })
    }
}
