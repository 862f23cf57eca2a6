// Search engine: applies guest criteria against the inventory store and the
// availability index. Results are a read-only snapshot and may be stale by
// the time the caller books; booking re-validates at commit time.

use std::cmp::Ordering;
use std::sync::atomic::Ordering::SeqCst;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::availability::AvailabilityIndex;
use crate::error::CoreError;
use crate::inventory::InventoryStore;
use crate::model::{Hotel, Room, SearchCriteria};
use crate::stats::{CoreStats, StatsSnapshot};

/// One surviving hotel with every free room matching the capacity filter,
/// in inventory order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMatch {
    pub hotel: Hotel,
    pub rooms: Vec<Room>,
}

pub struct SearchEngine {
    inventory: Arc<dyn InventoryStore>,
    availability: Arc<AvailabilityIndex>,
    stats: CoreStats,
}

impl SearchEngine {
    pub fn new(inventory: Arc<dyn InventoryStore>, availability: Arc<AvailabilityIndex>) -> Self {
        Self {
            inventory,
            availability,
            stats: CoreStats::default(),
        }
    }

    /// Ranked matches: rating descending, nightly price ascending on ties.
    /// An empty result is not an error; malformed criteria are.
    pub fn search(&self, criteria: &SearchCriteria) -> Result<Vec<SearchMatch>, CoreError> {
        validate_criteria(criteria)?;
        self.stats.searches.fetch_add(1, SeqCst);

        // Each requested room must individually accommodate its share of
        // guests: ceil(guests / rooms).
        let min_capacity = (criteria.guests + criteria.rooms - 1) / criteria.rooms;
        let needle = criteria.destination.trim().to_lowercase();

        let mut matches = Vec::new();
        for hotel in self.inventory.hotels()? {
            if !needle.is_empty() && !hotel.location.to_lowercase().contains(&needle) {
                continue;
            }
            let rooms = self.availability.free_rooms_for_hotel(
                &hotel.id,
                criteria.check_in,
                criteria.check_out,
                min_capacity,
            )?;
            if (rooms.len() as u32) < criteria.rooms {
                continue;
            }
            matches.push(SearchMatch { hotel, rooms });
        }

        matches.sort_by(|a, b| compare_matches(&a.hotel, &b.hotel));
        debug!(
            destination = %criteria.destination,
            hotels = matches.len(),
            "search completed"
        );
        Ok(matches)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

fn compare_matches(a: &Hotel, b: &Hotel) -> Ordering {
    b.rating
        .total_cmp(&a.rating)
        .then_with(|| a.price_per_night.total_cmp(&b.price_per_night))
}

fn validate_criteria(criteria: &SearchCriteria) -> Result<(), CoreError> {
    if criteria.check_in >= criteria.check_out {
        return Err(CoreError::invalid("check-out must be after check-in"));
    }
    if criteria.guests < 1 {
        return Err(CoreError::invalid("at least one guest is required"));
    }
    if criteria.rooms < 1 {
        return Err(CoreError::invalid("at least one room is required"));
    }
    Ok(())
}
