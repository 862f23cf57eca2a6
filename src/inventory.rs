// Inventory store: the canonical set of hotels and rooms.
// Read-only from the core's perspective; the administrative surface on the
// in-memory implementation is the external writer the core merely observes.

use dashmap::DashMap;

use crate::error::StorageError;
use crate::model::{Hotel, HotelId, Room, RoomId, RoomStatus};

/// Contract every inventory backend satisfies. Missing ids read as `None`;
/// `Err` is reserved for infrastructure failure.
pub trait InventoryStore: Send + Sync + 'static {
    fn hotel(&self, id: &str) -> Result<Option<Hotel>, StorageError>;

    /// All hotels, for search enumeration.
    fn hotels(&self) -> Result<Vec<Hotel>, StorageError>;

    /// Rooms of a hotel, ordered floor ascending then room number.
    fn rooms_for_hotel(&self, hotel_id: &str) -> Result<Vec<Room>, StorageError>;

    fn room(&self, id: &str) -> Result<Option<Room>, StorageError>;
}

/// In-memory inventory backed by concurrent maps. Reads take no locks
/// beyond the map shard.
#[derive(Default)]
pub struct InMemoryInventory {
    hotels: DashMap<HotelId, Hotel>,
    rooms: DashMap<RoomId, Room>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_hotel(&self, hotel: Hotel) {
        self.hotels.insert(hotel.id.clone(), hotel);
    }

    pub fn add_room(&self, room: Room) {
        self.rooms.insert(room.id.clone(), room);
    }

    /// Returns false if the room is unknown.
    pub fn set_room_status(&self, room_id: &str, status: RoomStatus) -> bool {
        match self.rooms.get_mut(room_id) {
            Some(mut room) => {
                room.status = status;
                true
            }
            None => false,
        }
    }

    /// Folds one review score into the hotel's rating aggregate as a running
    /// mean. The aggregate is recomputed, never user-edited directly.
    pub fn record_review(&self, hotel_id: &str, score: f64) -> bool {
        match self.hotels.get_mut(hotel_id) {
            Some(mut hotel) => {
                let count = hotel.review_count as f64;
                hotel.rating = (hotel.rating * count + score) / (count + 1.0);
                hotel.review_count += 1;
                true
            }
            None => false,
        }
    }
}

impl InventoryStore for InMemoryInventory {
    fn hotel(&self, id: &str) -> Result<Option<Hotel>, StorageError> {
        Ok(self.hotels.get(id).map(|h| h.value().clone()))
    }

    fn hotels(&self) -> Result<Vec<Hotel>, StorageError> {
        Ok(self.hotels.iter().map(|h| h.value().clone()).collect())
    }

    fn rooms_for_hotel(&self, hotel_id: &str) -> Result<Vec<Room>, StorageError> {
        let mut rooms: Vec<Room> = self
            .rooms
            .iter()
            .filter(|r| r.hotel_id == hotel_id)
            .map(|r| r.value().clone())
            .collect();
        rooms.sort_by(|a, b| a.floor.cmp(&b.floor).then(a.number.cmp(&b.number)));
        Ok(rooms)
    }

    fn room(&self, id: &str) -> Result<Option<Room>, StorageError> {
        Ok(self.rooms.get(id).map(|r| r.value().clone()))
    }
}
