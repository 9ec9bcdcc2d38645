//! Nullable clock: deterministic time for testing.

use hushcom_types::{Clock, Timestamp};
use std::sync::atomic::{AtomicI64, Ordering};

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to.
pub struct NullClock {
    current: AtomicI64,
}

impl NullClock {
    pub fn new(initial_nanos: i64) -> Self {
        Self {
            current: AtomicI64::new(initial_nanos),
        }
    }

    /// Advance time by a number of nanoseconds.
    pub fn advance(&self, nanos: i64) {
        self.current.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Set the time to a specific value.
    pub fn set(&self, nanos: i64) {
        self.current.store(nanos, Ordering::SeqCst);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.current.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_only_when_told() {
        let clock = NullClock::new(100);
        assert_eq!(clock.now(), Timestamp::new(100));
        assert_eq!(clock.now(), Timestamp::new(100));
        clock.advance(5);
        assert_eq!(clock.now(), Timestamp::new(105));
        clock.set(-1);
        assert_eq!(clock.now(), Timestamp::new(-1));
    }
}
