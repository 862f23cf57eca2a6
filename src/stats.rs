// Operation counters for the core.

use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct CoreStats {
    pub searches: AtomicUsize,
    pub bookings_created: AtomicUsize,
    pub booking_conflicts: AtomicUsize,
    pub bookings_cancelled: AtomicUsize,
    pub no_shows: AtomicUsize,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub searches: usize,
    pub bookings_created: usize,
    pub booking_conflicts: usize,
    pub bookings_cancelled: usize,
    pub no_shows: usize,
}

impl CoreStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            searches: self.searches.load(Ordering::SeqCst),
            bookings_created: self.bookings_created.load(Ordering::SeqCst),
            booking_conflicts: self.booking_conflicts.load(Ordering::SeqCst),
            bookings_cancelled: self.bookings_cancelled.load(Ordering::SeqCst),
            no_shows: self.no_shows.load(Ordering::SeqCst),
        }
    }
}
