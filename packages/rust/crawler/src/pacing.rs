//! Jittered delays between remote interactions.

use std::time::Duration;

use rand::Rng;
use tracing::trace;

use jobscout_shared::PacingConfig;

/// Sleeps a random duration within configured bounds.
///
/// The delay is a suspension point, never a cancellation point.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    config: PacingConfig,
}

impl Pacer {
    pub fn new(config: PacingConfig) -> Self {
        Self { config }
    }

    /// A pacer that never sleeps.
    pub fn none() -> Self {
        Self::new(PacingConfig::none())
    }

    /// Pause between two listing positions.
    pub async fn between_positions(&self) {
        pause(self.config.between_positions).await;
    }

    /// Pause between two record fetches.
    pub async fn between_records(&self) {
        pause(self.config.between_records).await;
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::none()
    }
}

/// Pick a delay uniformly in `[min, max]`.
pub fn jitter((min, max): (Duration, Duration)) -> Duration {
    if max <= min {
        return min;
    }
    let ms = rand::thread_rng().gen_range(min.as_millis()..=max.as_millis());
    Duration::from_millis(u64::try_from(ms).unwrap_or(u64::MAX))
}

async fn pause(bounds: (Duration, Duration)) {
    let delay = jitter(bounds);
    if delay.is_zero() {
        return;
    }
    trace!(delay_ms = delay.as_millis() as u64, "pacing");
    tokio::time::sleep(delay).await;
}
