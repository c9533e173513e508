//! Busy indicator shared by the mirrored stores.
//!
//! Each outstanding request holds a [`BusyGuard`]; the store reads as busy
//! while at least one guard is alive. Dropping the guard is the only way to
//! clear it, so every exit path of an action resets the flag.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts requests in flight for one store.
#[derive(Debug, Default)]
pub struct BusyFlag {
    in_flight: AtomicUsize,
}

impl BusyFlag {
    /// Create an idle flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    /// Mark one request as started until the returned guard drops.
    pub fn enter(&self) -> BusyGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        BusyGuard { flag: self }
    }
}

/// Scope marker returned by [`BusyFlag::enter`].
#[derive(Debug)]
#[must_use = "the store stops reading as busy as soon as the guard drops"]
pub struct BusyGuard<'a> {
    flag: &'a BusyFlag,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
