//! Sync engine: applies one snapshot to every target independently

use super::patcher::{ConfigMapPatcher, PatchOutcome};
use crate::models::{ConfigData, ObjectRef};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Counts from one replication pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub synced: usize,
    pub not_found: usize,
    pub failed: usize,
}

/// Replicates a source snapshot to the configured targets.
///
/// Targets are patched in order, one at a time. A failure on one target
/// never stops the remaining targets, and there is no retry within a pass:
/// the next incoming change event is the only retry vector.
pub struct SyncEngine {
    patcher: Arc<dyn ConfigMapPatcher>,
    targets: Vec<ObjectRef>,
}

impl SyncEngine {
    pub fn new(patcher: Arc<dyn ConfigMapPatcher>, targets: Vec<ObjectRef>) -> Self {
        Self { patcher, targets }
    }

    /// Replicate one snapshot to every target.
    ///
    /// An empty or absent snapshot skips the whole pass with a single
    /// warning; a transient bad read must not wipe every target.
    pub async fn replicate(&self, data: Option<&ConfigData>) -> SyncSummary {
        let mut summary = SyncSummary::default();

        let data = match data {
            Some(data) if !data.is_empty() => data,
            _ => {
                warn!("Source ConfigMap data is empty; skipping synchronization");
                return summary;
            }
        };

        info!(
            targets = self.targets.len(),
            "Source ConfigMap data changed; syncing to targets"
        );

        for target in &self.targets {
            match self.patcher.replace_data(target, data).await {
                PatchOutcome::Success => {
                    summary.synced += 1;
                    info!(target = %target, "Synced data to target ConfigMap");
                }
                PatchOutcome::NotFound => {
                    summary.not_found += 1;
                    error!(target = %target, "Target ConfigMap not found; skipping");
                }
                PatchOutcome::RequestFailed(reason) => {
                    summary.failed += 1;
                    error!(
                        target = %target,
                        error = %reason,
                        "Failed to patch target ConfigMap"
                    );
                }
            }
        }

        summary
    }
}
