//! In-memory implementation of `CounterStore`.
//!
//! `InMemoryCounterStore` keeps all counters in a `HashMap` protected by a
//! `Mutex`, making it safe to share behind an `Arc` while concurrent
//! evaluations hit the same keys. The map-wide lock serializes every
//! increment, so two requests racing at a limit boundary can never both be
//! admitted past the limit.
//!
//! Counters are process-local and never persisted. A horizontally scaled
//! deployment needs a shared store behind the same trait to enforce limits
//! globally.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use lattice_contracts::restriction::{CounterKey, CounterVerdict};
use lattice_core::traits::CounterStore;

/// One counter's mutable state.
#[derive(Debug, Clone, Copy)]
struct CounterWindow {
    count: u32,
    window_start: DateTime<Utc>,
}

/// An in-memory, mutex-guarded counter store.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    counters: Mutex<HashMap<CounterKey, CounterWindow>>,
}

impl InMemoryCounterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// The number of live counters. Test and diagnostics helper.
    pub fn len(&self) -> usize {
        self.counters.lock().expect("counter lock poisoned").len()
    }

    /// True when no counter has been touched yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CounterStore for InMemoryCounterStore {
    /// Increment-or-reset-with-window, atomically under the store's lock.
    fn hit(
        &self,
        key: &CounterKey,
        limit: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> CounterVerdict {
        let mut counters = self.counters.lock().expect("counter lock poisoned");

        match counters.entry(key.clone()) {
            // Fresh key: open a window at `now`.
            Entry::Vacant(slot) => {
                slot.insert(CounterWindow {
                    count: 1,
                    window_start: now,
                });
                CounterVerdict::Admitted {
                    remaining: limit.saturating_sub(1),
                }
            }
            Entry::Occupied(mut slot) => {
                let counter = slot.get_mut();
                if now - counter.window_start >= window {
                    // The window elapsed: reset to 1.
                    counter.count = 1;
                    counter.window_start = now;
                    CounterVerdict::Admitted {
                        remaining: limit.saturating_sub(1),
                    }
                } else if counter.count >= limit {
                    let retry_after = window - (now - counter.window_start);
                    debug!(
                        user_id = %key.user_id,
                        action = %key.action,
                        resource = %key.resource,
                        count = counter.count,
                        limit,
                        "counter exhausted"
                    );
                    CounterVerdict::Exhausted {
                        retry_after_secs: retry_after.num_seconds().max(0),
                    }
                } else {
                    counter.count += 1;
                    CounterVerdict::Admitted {
                        remaining: limit - counter.count,
                    }
                }
            }
        }
    }
}
