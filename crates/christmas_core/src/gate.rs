// SPDX-License-Identifier: MIT OR Apache-2.0
//! One-shot readiness gate over several asynchronous sources.
//!
//! The presentation may only start once the user's name is known and the
//! 3D assets are loaded. Both finish in any order, possibly on different
//! threads; the gate invokes its callback exactly once, after the last
//! registered source reports ready.

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Sources the presentation waits for before the first scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadinessSource {
    /// Greeting name resolved (possibly to "no name")
    Identity,
    /// 3D assets preloaded
    Assets,
}

type ReadyCallback = Box<dyn FnOnce() + Send>;

struct GateState<K> {
    sources: IndexMap<K, bool>,
    callback: Option<ReadyCallback>,
    fired: bool,
}

impl<K> GateState<K> {
    fn satisfied(&self) -> bool {
        !self.sources.is_empty() && self.sources.values().all(|ready| *ready)
    }

    /// Hand out the callback if every source is ready. Sets `fired`.
    fn take_if_satisfied(&mut self) -> Option<ReadyCallback> {
        if self.fired || !self.satisfied() {
            return None;
        }
        let callback = self.callback.take()?;
        self.fired = true;
        Some(callback)
    }
}

/// Gate that opens once every registered source is ready.
///
/// Clones share state, so each producer can hold its own handle. The
/// callback always runs outside the internal lock.
pub struct ReadinessGate<K> {
    state: Arc<Mutex<GateState<K>>>,
}

impl<K> Clone for ReadinessGate<K> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<K: Eq + Hash + Debug> ReadinessGate<K> {
    /// Create a gate with no sources
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(GateState {
                sources: IndexMap::new(),
                callback: None,
                fired: false,
            })),
        }
    }

    /// Add a source the gate must wait for. Ignored once the gate fired.
    pub fn register_source(&self, source: K) {
        let mut state = self.state.lock();
        if state.fired {
            tracing::warn!(?source, "Readiness gate already fired, source ignored");
            return;
        }
        state.sources.entry(source).or_insert(false);
    }

    /// Report a source ready. Repeated reports and unknown sources are no-ops.
    pub fn mark_ready(&self, source: &K) {
        let callback = {
            let mut state = self.state.lock();
            match state.sources.get_mut(source) {
                None => {
                    tracing::warn!(?source, "Unregistered readiness source marked ready");
                    return;
                }
                Some(true) => {
                    tracing::debug!(?source, "Readiness source already ready");
                    return;
                }
                Some(ready) => *ready = true,
            }
            tracing::debug!(?source, "Readiness source ready");
            state.take_if_satisfied()
        };

        if let Some(callback) = callback {
            callback();
        }
    }

    /// Install the callback. Runs immediately if every source is already
    /// ready; dropped if the gate fired before.
    pub fn on_ready(&self, callback: impl FnOnce() + Send + 'static) {
        let callback = {
            let mut state = self.state.lock();
            if state.fired {
                tracing::debug!("Readiness gate already fired, callback dropped");
                return;
            }
            state.callback = Some(Box::new(callback));
            state.take_if_satisfied()
        };

        if let Some(callback) = callback {
            callback();
        }
    }

    /// Every registered source is ready
    pub fn is_ready(&self) -> bool {
        self.state.lock().satisfied()
    }

    /// The callback has run
    pub fn has_fired(&self) -> bool {
        self.state.lock().fired
    }
}

impl<K: Eq + Hash + Debug> Default for ReadinessGate<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_gate(sources: &[u8]) -> (ReadinessGate<u8>, Arc<AtomicUsize>) {
        let gate = ReadinessGate::new();
        for source in sources {
            gate.register_source(*source);
        }
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        gate.on_ready(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (gate, fired)
    }

    #[test]
    fn test_fires_after_last_source_in_any_order() {
        let orders = [
            [1, 2, 3],
            [1, 3, 2],
            [2, 1, 3],
            [2, 3, 1],
            [3, 1, 2],
            [3, 2, 1],
        ];
        for order in orders {
            let (gate, fired) = counting_gate(&[1, 2, 3]);
            for (i, source) in order.iter().enumerate() {
                assert_eq!(fired.load(Ordering::SeqCst), 0, "fired early in {order:?}");
                gate.mark_ready(source);
                if i < 2 {
                    assert!(!gate.has_fired());
                }
            }
            assert_eq!(fired.load(Ordering::SeqCst), 1, "{order:?}");
        }
    }

    #[test]
    fn test_duplicate_ready_is_noop() {
        let (gate, fired) = counting_gate(&[1, 2]);
        gate.mark_ready(&1);
        gate.mark_ready(&1);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        gate.mark_ready(&2);
        gate.mark_ready(&2);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_installed_late_runs_immediately() {
        let gate = ReadinessGate::new();
        gate.register_source(ReadinessSource::Identity);
        gate.mark_ready(&ReadinessSource::Identity);
        assert!(gate.is_ready());
        assert!(!gate.has_fired());

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        gate.on_ready(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        let counter = Arc::clone(&fired);
        gate.on_ready(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_sources_never_fires() {
        let (gate, fired) = counting_gate(&[]);
        gate.mark_ready(&7);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!gate.is_ready());
    }

    #[test]
    fn test_register_after_fire_is_ignored() {
        let (gate, fired) = counting_gate(&[1]);
        gate.mark_ready(&1);
        gate.register_source(2);
        gate.mark_ready(&2);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(gate.is_ready());
    }

    #[test]
    fn test_concurrent_marks_fire_once() {
        for _ in 0..50 {
            let (gate, fired) = counting_gate(&[1, 2]);
            std::thread::scope(|scope| {
                for source in [1u8, 2] {
                    let gate = gate.clone();
                    scope.spawn(move || gate.mark_ready(&source));
                }
            });
            assert_eq!(fired.load(Ordering::SeqCst), 1);
        }
    }
}
