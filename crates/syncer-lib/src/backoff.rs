//! Reconnect backoff for the watch loop
//!
//! Tracks a single delay that doubles every time the stream terminates and
//! resets as soon as an event is processed, keeping recovery fast in healthy
//! steady state while bounding load on a degraded API server.

use std::time::Duration;

/// Exponential backoff state for stream reconnection
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60))
    }
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            delay: initial,
        }
    }

    /// Delay to sleep before the next reconnect attempt.
    ///
    /// Returns the current delay, then doubles it up to the cap.
    pub fn on_stream_end(&mut self) -> Duration {
        let delay = self.delay;
        self.delay = (self.delay * 2).min(self.max);
        delay
    }

    /// Reset the delay after a successfully processed event.
    pub fn on_event_processed(&mut self) {
        self.delay = self.initial;
    }

    /// The delay the next stream termination would incur.
    pub fn current_delay(&self) -> Duration {
        self.delay
    }
}
