//! Watch stream for the source ConfigMap
//!
//! This module provides:
//! - The change notification model and its classification
//! - A restartable, cursor-resumable watch transport

mod event;
mod stream;

pub use event::{classify, ConfigMapEvent, EventKind, SyncAction};
pub use stream::{ConfigMapWatcher, EventStream, KubeWatcher, WatchConfig, WatchError};
