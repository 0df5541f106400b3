//! Replication of the source snapshot to target ConfigMaps
//!
//! This module provides:
//! - The patch capability with an enumerated per-target outcome
//! - The sync engine applying one snapshot to every target independently

mod engine;
mod patcher;

pub use engine::{SyncEngine, SyncSummary};
pub use patcher::{ConfigMapPatcher, KubePatcher, PatchOutcome};
