//! Per-key rate limiting
//!
//! Each key fires at most once per interval. Time is always passed in by the
//! caller so the registry stays deterministic under test.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;

/// Last-fired timestamps keyed by `K`
#[derive(Debug, Clone)]
pub struct CooldownRegistry<K> {
    last_fired: HashMap<K, DateTime<Utc>>,
}

impl<K> Default for CooldownRegistry<K> {
    fn default() -> Self {
        Self {
            last_fired: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> CooldownRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `now` for `key` and return true if `interval` has elapsed since
    /// it last fired. A rejected attempt leaves the registry untouched.
    pub fn try_acquire(&mut self, key: &K, interval: Duration, now: DateTime<Utc>) -> bool {
        if let Some(last) = self.last_fired.get(key) {
            if now - *last < interval {
                return false;
            }
        }
        self.last_fired.insert(key.clone(), now);
        true
    }

    pub fn last_fired(&self, key: &K) -> Option<DateTime<Utc>> {
        self.last_fired.get(key).copied()
    }

    /// Time left before `key` may fire again, if it is cooling down
    pub fn remaining(&self, key: &K, interval: Duration, now: DateTime<Utc>) -> Option<Duration> {
        let last = self.last_fired.get(key)?;
        let left = interval - (now - *last);
        (left > Duration::zero()).then_some(left)
    }

    pub fn len(&self) -> usize {
        self.last_fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_fired.is_empty()
    }
}
