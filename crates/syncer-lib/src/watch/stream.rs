//! Watch transport for the source ConfigMap
//!
//! Opens a server-side filtered watch on exactly one named ConfigMap and
//! yields change notifications until the bounded session lifetime elapses or
//! the connection fails. Restartable from an opaque resource-version cursor.

use super::event::{ConfigMapEvent, EventKind};
use crate::models::ObjectRef;
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{WatchEvent, WatchParams};
use kube::{Api, Client};

/// Errors surfaced by the watch transport
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The watch request could not be opened
    #[error("failed to open watch stream: {0}")]
    Connect(#[source] kube::Error),
    /// The established stream failed mid-session
    #[error("watch stream failed: {0}")]
    Transport(#[source] kube::Error),
    /// The resume cursor is no longer valid (HTTP 410 Gone)
    #[error("resume cursor expired: {0}")]
    CursorExpired(String),
    /// The server injected an error object into the stream
    #[error("watch error response ({code}): {message}")]
    Api { code: u16, message: String },
}

/// Stream of change notifications for one watch session
pub type EventStream = BoxStream<'static, Result<ConfigMapEvent, WatchError>>;

/// Restartable watch subscription on a single named ConfigMap.
///
/// Opening with `None` starts from the current state of the store; opening
/// with a cursor resumes from that position without missing or replaying
/// prior events.
#[async_trait]
pub trait ConfigMapWatcher: Send + Sync {
    async fn open(&self, cursor: Option<&str>) -> Result<EventStream, WatchError>;
}

/// Watch session parameters
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Bounded session lifetime; the server ends the stream cleanly after this
    pub timeout_secs: u32,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { timeout_secs: 600 }
    }
}

/// Kubernetes-backed watch transport
pub struct KubeWatcher {
    api: Api<ConfigMap>,
    source_name: String,
    config: WatchConfig,
}

impl KubeWatcher {
    pub fn new(client: Client, source: &ObjectRef, config: WatchConfig) -> Self {
        Self {
            api: Api::namespaced(client, &source.namespace),
            source_name: source.name.clone(),
            config,
        }
    }
}

#[async_trait]
impl ConfigMapWatcher for KubeWatcher {
    async fn open(&self, cursor: Option<&str>) -> Result<EventStream, WatchError> {
        let params = WatchParams::default()
            .fields(&format!("metadata.name={}", self.source_name))
            .timeout(self.config.timeout_secs);

        // An empty resourceVersion starts from the store's current state.
        let version = cursor.unwrap_or("");
        let stream = self
            .api
            .watch(&params, version)
            .await
            .map_err(WatchError::Connect)?;

        Ok(stream
            .map(|item| match item {
                Ok(event) => convert(event),
                Err(e) => Err(WatchError::Transport(e)),
            })
            .boxed())
    }
}

fn convert(event: WatchEvent<ConfigMap>) -> Result<ConfigMapEvent, WatchError> {
    match event {
        WatchEvent::Added(cm) => Ok(object_event(EventKind::Added, cm)),
        WatchEvent::Modified(cm) => Ok(object_event(EventKind::Modified, cm)),
        WatchEvent::Deleted(cm) => Ok(object_event(EventKind::Deleted, cm)),
        WatchEvent::Bookmark(bookmark) => Ok(ConfigMapEvent {
            kind: EventKind::Bookmark,
            data: None,
            cursor: Some(bookmark.metadata.resource_version),
        }),
        WatchEvent::Error(resp) if resp.code == 410 => Err(WatchError::CursorExpired(resp.message)),
        WatchEvent::Error(resp) => Err(WatchError::Api {
            code: resp.code,
            message: resp.message,
        }),
    }
}

fn object_event(kind: EventKind, cm: ConfigMap) -> ConfigMapEvent {
    ConfigMapEvent {
        kind,
        data: cm.data,
        cursor: cm.metadata.resource_version,
    }
}
