// crates/smauto-broker/src/backoff.rs
// ============================================================================
// Module: Reconnect Backoff
// Description: Bounded exponential backoff for broker reconnect loops.
// Purpose: Avoid hammering a broker that just dropped the connection
//          (`spec.md` §4.A: transports must reconnect automatically).
// Dependencies: std::time
// ============================================================================

use std::time::Duration;

/// Exponential backoff doubling from `100ms` up to a `30s` ceiling.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    next: Duration,
    max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            next: Duration::from_millis(100),
            max: Duration::from_secs(30),
        }
    }
}

impl Backoff {
    /// Returns the delay to wait before the next reconnect attempt and
    /// doubles it for next time, capped at the ceiling.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = (self.next * 2).min(self.max);
        delay
    }

    /// Resets the backoff after a successful connection.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_up_to_ceiling() {
        let mut backoff = Backoff::default();
        let mut delays = Vec::new();
        for _ in 0..10 {
            delays.push(backoff.next_delay());
        }
        assert_eq!(delays[0], Duration::from_millis(100));
        assert_eq!(delays[1], Duration::from_millis(200));
        assert!(delays.last().unwrap() <= &Duration::from_secs(30));
    }

    #[test]
    fn reset_returns_to_initial_delay() {
        let mut backoff = Backoff::default();
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
    }
}
