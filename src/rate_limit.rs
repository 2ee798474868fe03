//! Fixed-window attempt counter keyed by session id.

use std::collections::HashMap;

use time::{Duration, OffsetDateTime};

use crate::clock::Clock;
use crate::config::SecurityConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub count: u32,
    pub window_start: OffsetDateTime,
}

/// Per-key fixed-window limiter.
///
/// A window opens on the first check for a key and lasts `window`. Every
/// check increments the stored count, including checks that are refused.
pub struct RateLimiter<C> {
    clock: C,
    max_attempts: u32,
    window: Duration,
    max_keys: usize,
    attempts: HashMap<String, RateWindow>,
}

impl<C: Clock> RateLimiter<C> {
    #[must_use]
    pub fn new(config: &SecurityConfig, clock: C) -> Self {
        Self {
            clock,
            max_attempts: config.rate_limit_max_attempts,
            window: config.rate_limit_window,
            max_keys: config.rate_limit_max_keys.max(1),
            attempts: HashMap::new(),
        }
    }

    /// Records an attempt for `key`. Returns `false` once the window's
    /// count exceeds the configured maximum.
    pub fn check_limit(&mut self, key: &str) -> bool {
        let now = self.clock.now();

        let stale = self
            .attempts
            .get(key)
            .is_none_or(|w| now - w.window_start > self.window);
        if stale {
            if !self.attempts.contains_key(key) {
                self.make_room();
            }
            self.attempts.insert(
                key.to_owned(),
                RateWindow {
                    count: 0,
                    window_start: now,
                },
            );
        }

        let Some(record) = self.attempts.get_mut(key) else {
            return false;
        };
        record.count = record.count.saturating_add(1);

        if record.count > self.max_attempts {
            tracing::warn!(key, count = record.count, "Rate limit exceeded");
            return false;
        }
        true
    }

    pub fn reset(&mut self, key: &str) {
        self.attempts.remove(key);
    }

    /// Count recorded in the key's current window, if one is tracked.
    #[must_use]
    pub fn attempts(&self, key: &str) -> Option<u32> {
        self.attempts.get(key).map(|w| w.count)
    }

    /// Drops every window that has already elapsed. Returns how many went.
    pub fn prune_expired(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.attempts.len();
        self.attempts
            .retain(|_, w| now - w.window_start <= self.window);
        before - self.attempts.len()
    }

    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.attempts.len()
    }

    fn make_room(&mut self) {
        if self.attempts.len() < self.max_keys {
            return;
        }
        self.prune_expired();
        if self.attempts.len() < self.max_keys {
            return;
        }
        let oldest = self
            .attempts
            .iter()
            .min_by_key(|(_, w)| w.window_start)
            .map(|(k, _)| k.clone());
        if let Some(key) = oldest {
            tracing::debug!(key = %key, "Evicting oldest rate window");
            self.attempts.remove(&key);
        }
    }
}
