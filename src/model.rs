// Data model for the reservation core.
// Every record here is a plain serde-representable struct so that any
// storage backend (in-process map, embedded or remote database) can hold it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type HotelId = String;
pub type RoomId = String;
pub type BookingId = String;
pub type GuestId = String;

/// Static hotel record. Immutable after creation except the rating
/// aggregate, which inventory administration recomputes from reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotel {
    pub id: HotelId,
    pub name: String,
    pub location: String,
    pub rating: f64,
    pub review_count: u32,
    pub price_per_night: f64,
    pub amenities: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Operational status of a room. `Maintenance` removes the room from
/// availability results regardless of interval overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    Cleaning,
    Maintenance,
}

/// A room belongs to exactly one hotel for its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub hotel_id: HotelId,
    pub room_type: String,
    pub price_per_night: f64,
    pub capacity: u32,
    pub amenities: Vec<String>,
    pub status: RoomStatus,
    pub floor: u32,
    pub number: u32,
}

/// Booking lifecycle states. `Cancelled` and `NoShow` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    /// States whose interval is still counted against room availability.
    pub fn holds_room(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending
                | BookingStatus::Confirmed
                | BookingStatus::CheckedIn
                | BookingStatus::CheckedOut
        )
    }
}

/// Handle to a reserved interval in the availability index. Released on
/// cancellation or no-show; releasing twice is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalHandle {
    pub room_id: RoomId,
    pub handle_id: u64,
}

/// A booking is never physically deleted; cancellation is a status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub hotel_id: HotelId,
    pub room_id: RoomId,
    pub guest_id: GuestId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub handle: IntervalHandle,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

/// Guest search input. Destination is a case-insensitive substring match
/// against the hotel location; empty matches all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub destination: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub rooms: u32,
}
