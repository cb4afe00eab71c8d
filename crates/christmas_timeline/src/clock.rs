// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clock abstraction so timelines can run against virtual time.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Source of "now" for timelines, measured from an arbitrary origin
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;
}

/// Virtual clock that only moves when told to.
///
/// Clones share the same time, so a test can hand one copy to the code
/// under test and advance another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) -> Duration {
        let mut now = self.now.lock();
        *now += by;
        *now
    }

    /// Jump to an absolute time. Time never moves backwards.
    pub fn set(&self, to: Duration) {
        let mut now = self.now.lock();
        *now = (*now).max(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_time() {
        let clock = ManualClock::new();
        let view = clock.clone();
        clock.advance(Duration::from_millis(1500));
        assert_eq!(view.now(), Duration::from_millis(1500));
    }

    #[test]
    fn test_set_never_rewinds() {
        let clock = ManualClock::new();
        clock.set(Duration::from_secs(5));
        clock.set(Duration::from_secs(2));
        assert_eq!(clock.now(), Duration::from_secs(5));
    }
}
