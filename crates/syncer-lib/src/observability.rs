//! Observability for the syncer
//!
//! Provides:
//! - Prometheus metrics (events processed, sync outcomes, reconnects, backoff)
//! - Structured lifecycle logging with tracing

use crate::sync::SyncSummary;
use prometheus::{register_int_counter, register_int_gauge, IntCounter, IntGauge};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{info, warn};

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<SyncerMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct SyncerMetricsInner {
    events_processed: IntCounter,
    stream_opens: IntCounter,
    targets_synced: IntCounter,
    targets_not_found: IntCounter,
    targets_failed: IntCounter,
    backoff_seconds: IntGauge,
    targets_configured: IntGauge,
}

impl SyncerMetricsInner {
    fn new() -> Self {
        Self {
            events_processed: register_int_counter!(
                "configmap_syncer_events_processed_total",
                "Watch notifications processed"
            )
            .expect("Failed to register events_processed_total"),

            stream_opens: register_int_counter!(
                "configmap_syncer_stream_opens_total",
                "Watch stream sessions opened, including reconnects"
            )
            .expect("Failed to register stream_opens_total"),

            targets_synced: register_int_counter!(
                "configmap_syncer_targets_synced_total",
                "Target ConfigMaps patched successfully"
            )
            .expect("Failed to register targets_synced_total"),

            targets_not_found: register_int_counter!(
                "configmap_syncer_targets_not_found_total",
                "Patch attempts that found no target ConfigMap"
            )
            .expect("Failed to register targets_not_found_total"),

            targets_failed: register_int_counter!(
                "configmap_syncer_targets_failed_total",
                "Patch attempts that failed for other reasons"
            )
            .expect("Failed to register targets_failed_total"),

            backoff_seconds: register_int_gauge!(
                "configmap_syncer_backoff_seconds",
                "Delay applied before the most recent reconnect attempt"
            )
            .expect("Failed to register backoff_seconds"),

            targets_configured: register_int_gauge!(
                "configmap_syncer_targets_configured",
                "Number of target ConfigMaps in the static configuration"
            )
            .expect("Failed to register targets_configured"),
        }
    }
}

/// Syncer metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance. Multiple
/// clones share the same underlying metrics.
#[derive(Clone)]
pub struct SyncerMetrics {
    _private: (),
}

impl Default for SyncerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncerMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(SyncerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &SyncerMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Count one processed watch notification
    pub fn inc_events_processed(&self) {
        self.inner().events_processed.inc();
    }

    /// Count one opened watch session
    pub fn inc_stream_opens(&self) {
        self.inner().stream_opens.inc();
    }

    /// Record the per-target outcomes of one replication pass
    pub fn record_sync(&self, summary: &SyncSummary) {
        self.inner().targets_synced.inc_by(summary.synced as u64);
        self.inner()
            .targets_not_found
            .inc_by(summary.not_found as u64);
        self.inner().targets_failed.inc_by(summary.failed as u64);
    }

    /// Update the backoff gauge
    pub fn set_backoff_seconds(&self, secs: i64) {
        self.inner().backoff_seconds.set(secs);
    }

    /// Update the configured target count
    pub fn set_targets_configured(&self, count: i64) {
        self.inner().targets_configured.set(count);
    }
}

/// Structured logger for syncer lifecycle events
///
/// Provides consistent JSON-formatted logging for stream transitions and
/// sync outcomes, keyed to the watched source.
#[derive(Clone)]
pub struct SyncLogger {
    source: String,
}

impl SyncLogger {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Log controller startup
    pub fn log_startup(&self, version: &str) {
        info!(
            event = "syncer_started",
            source = %self.source,
            version = %version,
            "ConfigMap synchronization controller started"
        );
    }

    /// Log controller shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "syncer_shutdown",
            source = %self.source,
            reason = %reason,
            "ConfigMap synchronization controller shutting down"
        );
    }

    /// Log a (re)connected watch stream
    pub fn log_stream_connected(&self, cursor: Option<&str>) {
        info!(
            event = "watch_connected",
            source = %self.source,
            cursor = ?cursor,
            "Watch stream opened"
        );
    }

    /// Log a disconnected watch stream and the reconnect delay
    pub fn log_stream_disconnected(&self, delay: Duration) {
        info!(
            event = "watch_disconnected",
            source = %self.source,
            retry_in_secs = delay.as_secs(),
            "Watch stream disconnected; retrying"
        );
    }

    /// Log the outcome counts of one replication pass
    pub fn log_sync_summary(&self, summary: &SyncSummary) {
        if summary.not_found > 0 || summary.failed > 0 {
            warn!(
                event = "sync_pass",
                source = %self.source,
                synced = summary.synced,
                not_found = summary.not_found,
                failed = summary.failed,
                "Replication pass completed with skipped targets"
            );
        } else {
            info!(
                event = "sync_pass",
                source = %self.source,
                synced = summary.synced,
                "Replication pass completed"
            );
        }
    }

    /// Log a deleted source ConfigMap
    pub fn log_source_deleted(&self) {
        warn!(
            event = "source_deleted",
            source = %self.source,
            "Source ConfigMap was deleted; target ConfigMaps will NOT be deleted"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syncer_metrics_creation() {
        // Metrics live in a global registry; a second handle must not
        // attempt a duplicate registration.
        let metrics = SyncerMetrics::new();
        let _again = SyncerMetrics::new();

        metrics.inc_events_processed();
        metrics.inc_stream_opens();
        metrics.record_sync(&SyncSummary {
            synced: 2,
            not_found: 1,
            failed: 0,
        });
        metrics.set_backoff_seconds(4);
        metrics.set_targets_configured(2);
    }

    #[test]
    fn test_sync_logger_creation() {
        let logger = SyncLogger::new("default/source-configmap");
        assert_eq!(logger.source, "default/source-configmap");
    }
}
