// crates/smauto-engine/src/clock.rs
// ============================================================================
// Module: System Clock Producer
// Description: Built-in 1 Hz publisher for the `system_clock` entity.
// Purpose: Automations that compare against a time-of-day need a live
//          `Time` attribute without requiring the model author to wire up
//          an external clock process (`spec.md` §3, grounded on
//          `original_source/examples/advanced_condition/system_clock.py`).
// Dependencies: smauto-broker, smauto-core, tokio, tracing
// ============================================================================

//! ## Overview
//! [`SystemClockProducer::run`] publishes the current UTC wall-clock time
//! on [`smauto_core::SYSTEM_CLOCK_TOPIC`] once a second, in the same
//! `{hour, minute, second, time_str}` shape the reference implementation's
//! standalone clock script publishes, until its cancellation watch fires.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use smauto_broker::Transport;
use smauto_core::{Time, SYSTEM_CLOCK_ATTRIBUTE, SYSTEM_CLOCK_TOPIC};
use tokio::sync::watch;

const SECONDS_PER_DAY: u64 = 86_400;

/// Publishes the built-in system clock entity's `time` attribute at 1 Hz.
pub struct SystemClockProducer {
    transport: std::sync::Arc<dyn Transport>,
}

impl SystemClockProducer {
    /// Creates a producer publishing through `transport`.
    #[must_use]
    pub fn new(transport: std::sync::Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Runs the 1 Hz publish loop until `cancel` reports `true`.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let time = current_time();
                    let payload = serde_json::json!({
                        SYSTEM_CLOCK_ATTRIBUTE: {
                            "hour": time.hour,
                            "minute": time.minute,
                            "second": time.second,
                            "time_str": time.to_time_str(),
                        }
                    });
                    if let Err(error) = self.transport.publish(SYSTEM_CLOCK_TOPIC, payload).await {
                        tracing::warn!(%error, "system clock publish failed");
                    }
                }
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        break;
                    }
                }
            }
        }
    }
}

fn current_time() -> Time {
    let seconds_today = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() % SECONDS_PER_DAY)
        .unwrap_or(0);
    let hour = (seconds_today / 3600) as u8;
    let minute = ((seconds_today % 3600) / 60) as u8;
    let second = (seconds_today % 60) as u8;
    Time::new(hour, minute, second).unwrap_or_else(|_| Time::midnight())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_time_components_stay_in_range() {
        let time = current_time();
        assert!(time.hour <= 23);
        assert!(time.minute < 60);
        assert!(time.second < 60);
    }
}
