//! Core library for the ConfigMap synchronization controller
//!
//! This crate provides:
//! - A restartable, cursor-resumable watch on the source ConfigMap
//! - Event classification into replicate/suppress/ignore actions
//! - A sync engine replicating the source data field to each target
//! - Bounded exponential reconnect backoff
//! - Health checks and observability

pub mod backoff;
pub mod controller;
pub mod health;
pub mod models;
pub mod observability;
pub mod sync;
pub mod watch;

pub use backoff::Backoff;
pub use controller::SyncController;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::{ConfigData, ObjectRef, ReplicationConfig};
pub use observability::{SyncLogger, SyncerMetrics};
