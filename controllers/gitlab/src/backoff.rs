//! # Fibonacci Backoff
//!
//! Requeue delays for failed reconciles. Grows more slowly than exponential
//! backoff, so a GitLab outage of a few minutes is retried promptly without
//! hammering the API once it drags on.
//!
//! Default sequence: 5s, 5s, 10s, 15s, 25s, 40s, 65s, 105s, 170s, 275s, 300s (max).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each delay is the sum of the previous two, capped at `max_secs`.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min_secs: u64,
    prev_secs: u64,
    current_secs: u64,
    max_secs: u64,
}

impl FibonacciBackoff {
    /// Create a backoff whose first two delays are `min_secs`
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs,
            prev_secs: 0,
            current_secs: min_secs,
            max_secs,
        }
    }

    /// Get the next delay and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current_secs;
        let next = self.prev_secs + self.current_secs;
        self.prev_secs = self.current_secs;
        self.current_secs = std::cmp::min(next, self.max_secs);
        Duration::from_secs(result)
    }

    /// Reset the backoff to the initial state
    pub fn reset(&mut self) {
        self.prev_secs = 0;
        self.current_secs = self.min_secs;
    }
}

/// Per-object backoff state for one watched kind
///
/// Keyed by object name; a successful reconcile forgets the entry so the
/// next failure starts from the minimum again.
#[derive(Debug)]
pub struct BackoffRegistry {
    min_secs: u64,
    max_secs: u64,
    states: Mutex<HashMap<String, FibonacciBackoff>>,
}

impl BackoffRegistry {
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs,
            max_secs,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Delay before retrying `key` after another failure
    pub fn next(&self, key: &str) -> Duration {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states
            .entry(key.to_string())
            .or_insert_with(|| FibonacciBackoff::new(self.min_secs, self.max_secs))
            .next_backoff()
    }

    /// Forget `key`; called on success and once the object is released
    pub fn reset(&self, key: &str) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.remove(key);
    }

    /// Number of objects currently backing off
    pub fn len(&self) -> usize {
        self.states.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let mut backoff = FibonacciBackoff::new(5, 300);

        let delays: Vec<u64> = (0..11).map(|_| backoff.next_backoff().as_secs()).collect();
        assert_eq!(delays, vec![5, 5, 10, 15, 25, 40, 65, 105, 170, 275, 300]);
        // stays at the cap
        assert_eq!(backoff.next_backoff().as_secs(), 300);
    }

    #[test]
    fn test_fibonacci_backoff_reset() {
        let mut backoff = FibonacciBackoff::new(5, 300);
        backoff.next_backoff();
        backoff.next_backoff();
        backoff.next_backoff();

        backoff.reset();

        assert_eq!(backoff.next_backoff().as_secs(), 5);
        assert_eq!(backoff.next_backoff().as_secs(), 5);
        assert_eq!(backoff.next_backoff().as_secs(), 10);
    }

    #[test]
    fn test_registry_tracks_objects_independently() {
        let registry = BackoffRegistry::new(1, 10);

        assert_eq!(registry.next("a").as_secs(), 1);
        assert_eq!(registry.next("a").as_secs(), 1);
        assert_eq!(registry.next("a").as_secs(), 2);
        assert_eq!(registry.next("b").as_secs(), 1);

        registry.reset("a");
        assert_eq!(registry.next("a").as_secs(), 1);
        assert_eq!(registry.next("b").as_secs(), 1);
        assert_eq!(registry.next("b").as_secs(), 2);
    }

    #[test]
    fn test_released_objects_are_forgotten() {
        let registry = BackoffRegistry::new(1, 10);
        registry.next("deleted-while-failing");
        registry.next("deleted-while-failing");
        registry.next("still-failing");
        assert_eq!(registry.len(), 2);

        registry.reset("deleted-while-failing");
        assert_eq!(registry.len(), 1);

        registry.reset("still-failing");
        assert!(registry.is_empty());
    }
}
