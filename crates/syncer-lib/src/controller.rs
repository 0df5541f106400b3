//! Control loop: watch, classify, replicate, back off, reconnect

use crate::backoff::Backoff;
use crate::health::{components, HealthRegistry};
use crate::models::ReplicationConfig;
use crate::observability::{SyncLogger, SyncerMetrics};
use crate::sync::SyncEngine;
use crate::watch::{
    classify, ConfigMapEvent, ConfigMapWatcher, EventStream, SyncAction, WatchError,
};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Drives the watch/replicate loop for one source ConfigMap.
///
/// Exactly one watch session is open at a time. Notifications are processed
/// strictly in receipt order, end to end, before the next one is read, and
/// the resume cursor is held only in memory: every restart of the process
/// begins from the current state of the store.
pub struct SyncController {
    watcher: Arc<dyn ConfigMapWatcher>,
    engine: SyncEngine,
    backoff: Backoff,
    config: ReplicationConfig,
    cursor: Option<String>,
    logger: SyncLogger,
    metrics: SyncerMetrics,
    health: HealthRegistry,
}

impl SyncController {
    pub fn new(
        watcher: Arc<dyn ConfigMapWatcher>,
        engine: SyncEngine,
        backoff: Backoff,
        config: ReplicationConfig,
        logger: SyncLogger,
        metrics: SyncerMetrics,
        health: HealthRegistry,
    ) -> Self {
        Self {
            watcher,
            engine,
            backoff,
            config,
            cursor: None,
            logger,
            metrics,
            health,
        }
    }

    /// Run until the shutdown channel fires.
    ///
    /// Both blocking points of the loop, the stream read and the backoff
    /// sleep, are cancellable through the shutdown channel.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            source = %self.config.source,
            targets = self.config.targets.len(),
            "Starting watch loop for source ConfigMap"
        );
        self.metrics
            .set_targets_configured(self.config.targets.len() as i64);

        loop {
            let opened = tokio::select! {
                res = self.watcher.open(self.cursor.as_deref()) => res,
                _ = shutdown.recv() => break,
            };

            match opened {
                Ok(mut events) => {
                    self.logger.log_stream_connected(self.cursor.as_deref());
                    self.metrics.inc_stream_opens();
                    self.health.set_healthy(components::WATCHER).await;

                    if !self.consume(&mut events, &mut shutdown).await {
                        break;
                    }
                }
                Err(e) => self.on_stream_error(e),
            }

            // Disconnected: sleep out the backoff, then reconnect with the
            // last known cursor.
            let delay = self.backoff.on_stream_end();
            self.health
                .set_degraded(components::WATCHER, "watch stream disconnected")
                .await;
            self.metrics.set_backoff_seconds(delay.as_secs() as i64);
            self.logger.log_stream_disconnected(delay);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.recv() => break,
            }
        }

        self.logger.log_shutdown("shutdown signal received");
    }

    /// Consume one watch session to completion.
    ///
    /// Returns `false` if shutdown was requested mid-session.
    async fn consume(
        &mut self,
        events: &mut EventStream,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> bool {
        loop {
            let item = tokio::select! {
                item = events.next() => item,
                _ = shutdown.recv() => return false,
            };

            match item {
                Some(Ok(event)) => self.process_event(event).await,
                Some(Err(e)) => {
                    self.on_stream_error(e);
                    return true;
                }
                None => {
                    info!("Watch session ended");
                    return true;
                }
            }
        }
    }

    async fn process_event(&mut self, event: ConfigMapEvent) {
        // The cursor advances on every observed event, whatever the
        // classification decides.
        if let Some(cursor) = &event.cursor {
            self.cursor = Some(cursor.clone());
        }

        match classify(event.kind) {
            SyncAction::Replicate => {
                let summary = self.engine.replicate(event.data.as_ref()).await;
                self.metrics.record_sync(&summary);
                self.logger.log_sync_summary(&summary);

                if summary.failed > 0 {
                    self.health
                        .set_degraded(components::SYNC_ENGINE, "one or more target patches failed")
                        .await;
                } else {
                    self.health.set_healthy(components::SYNC_ENGINE).await;
                }
            }
            SyncAction::SuppressAndWarn => {
                self.logger.log_source_deleted();
            }
            SyncAction::Ignore => {
                debug!(kind = ?event.kind, "Ignored event");
            }
        }

        self.backoff.on_event_processed();
        self.metrics.inc_events_processed();
    }

    fn on_stream_error(&mut self, error: WatchError) {
        match error {
            WatchError::CursorExpired(message) => {
                // The resume position is gone; restart from the current
                // state instead of retrying a dead cursor.
                warn!(
                    error = %message,
                    "Resume cursor expired; restarting from current state"
                );
                self.cursor = None;
            }
            other => {
                error!(error = %other, "Watch stream error");
            }
        }
    }
}
