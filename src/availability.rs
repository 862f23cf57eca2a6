// Availability index: which room-date intervals are currently held by
// active bookings. The sole mutating entry point (`reserve`) is the
// enforcement point for the no-double-booking invariant.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;
use crate::inventory::InventoryStore;
use crate::model::{IntervalHandle, Room, RoomId, RoomStatus};

/// One held interval, half-open: `[check_in, check_out)`. A checkout on
/// day D does not conflict with a check-in on day D.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeldInterval {
    pub handle_id: u64,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl HeldInterval {
    fn overlaps(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.check_in < check_out && check_in < self.check_out
    }
}

pub(crate) type RoomSlot = Arc<Mutex<Vec<HeldInterval>>>;

/// Per-room interval sets behind per-room mutexes. Operations on different
/// rooms never contend on one lock; there is no global lock across the
/// inventory.
pub struct AvailabilityIndex {
    inventory: Arc<dyn InventoryStore>,
    held: DashMap<RoomId, RoomSlot>,
    next_handle: AtomicU64,
}

impl AvailabilityIndex {
    pub fn new(inventory: Arc<dyn InventoryStore>) -> Self {
        Self {
            inventory,
            held: DashMap::new(),
            next_handle: AtomicU64::new(1),
        }
    }

    /// The room's critical section. The map guard is dropped before the
    /// returned mutex is locked, so shard locks never nest with room locks.
    pub(crate) fn room_slot(&self, room_id: &str) -> RoomSlot {
        let entry = self.held.entry(room_id.to_string()).or_default();
        Arc::clone(entry.value())
    }

    fn require_room(&self, room_id: &str) -> Result<Room, CoreError> {
        self.inventory
            .room(room_id)?
            .ok_or_else(|| CoreError::not_found("room", room_id))
    }

    /// True iff no held interval overlaps the candidate range and the room
    /// is not under maintenance.
    pub fn is_room_free(
        &self,
        room_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<bool, CoreError> {
        validate_range(check_in, check_out)?;
        let room = self.require_room(room_id)?;
        if room.status == RoomStatus::Maintenance {
            return Ok(false);
        }
        let slot = self.room_slot(room_id);
        let held = slot.lock();
        Ok(!held.iter().any(|iv| iv.overlaps(check_in, check_out)))
    }

    /// Free rooms of a hotel for the range, in inventory order, filtered by
    /// a minimum occupancy capacity.
    pub fn free_rooms_for_hotel(
        &self,
        hotel_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        min_capacity: u32,
    ) -> Result<Vec<Room>, CoreError> {
        validate_range(check_in, check_out)?;
        self.inventory
            .hotel(hotel_id)?
            .ok_or_else(|| CoreError::not_found("hotel", hotel_id))?;

        let mut free = Vec::new();
        for room in self.inventory.rooms_for_hotel(hotel_id)? {
            if room.capacity < min_capacity || room.status == RoomStatus::Maintenance {
                continue;
            }
            let slot = self.room_slot(&room.id);
            let taken = slot
                .lock()
                .iter()
                .any(|iv| iv.overlaps(check_in, check_out));
            if !taken {
                free.push(room);
            }
        }
        Ok(free)
    }

    /// Atomically re-checks freedom and records the interval. `Conflict`
    /// means another writer won the race; the caller should re-search.
    pub fn reserve(
        &self,
        room_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<IntervalHandle, CoreError> {
        let room = self.require_room(room_id)?;
        let slot = self.room_slot(room_id);
        let mut held = slot.lock();
        self.reserve_locked(&room, &mut held, check_in, check_out)
    }

    /// Overlap check + insert under an already-held room lock. Used by the
    /// booking desk so the booking-record write shares the critical section.
    pub(crate) fn reserve_locked(
        &self,
        room: &Room,
        held: &mut Vec<HeldInterval>,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<IntervalHandle, CoreError> {
        validate_range(check_in, check_out)?;
        if room.status == RoomStatus::Maintenance
            || held.iter().any(|iv| iv.overlaps(check_in, check_out))
        {
            debug!(room_id = %room.id, %check_in, %check_out, "reserve conflict");
            return Err(CoreError::Conflict {
                room_id: room.id.clone(),
                check_in,
                check_out,
            });
        }

        let handle_id = self.next_handle.fetch_add(1, Ordering::SeqCst);
        held.push(HeldInterval {
            handle_id,
            check_in,
            check_out,
        });
        debug!(room_id = %room.id, %check_in, %check_out, handle_id, "interval reserved");
        Ok(IntervalHandle {
            room_id: room.id.clone(),
            handle_id,
        })
    }

    /// Removes a previously reserved interval. Idempotent: releasing an
    /// already-released handle is a no-op, not an error.
    pub fn release(&self, handle: &IntervalHandle) {
        let slot = match self.held.get(&handle.room_id) {
            Some(entry) => Arc::clone(entry.value()),
            None => return,
        };
        let mut held = slot.lock();
        let before = held.len();
        held.retain(|iv| iv.handle_id != handle.handle_id);
        if held.len() < before {
            debug!(room_id = %handle.room_id, handle_id = handle.handle_id, "interval released");
        }
    }

    /// Held intervals for a room, as plain records.
    pub fn held_intervals(&self, room_id: &str) -> Vec<HeldInterval> {
        let slot = match self.held.get(room_id) {
            Some(entry) => Arc::clone(entry.value()),
            None => return Vec::new(),
        };
        let held = slot.lock();
        held.clone()
    }
}

fn validate_range(check_in: NaiveDate, check_out: NaiveDate) -> Result<(), CoreError> {
    if check_in >= check_out {
        return Err(CoreError::invalid("check-out must be after check-in"));
    }
    Ok(())
}
