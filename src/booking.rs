// Booking lifecycle manager: owns booking records, state transitions, and
// cancellation. The no-double-booking invariant is enforced by reserving
// through the availability index inside the room's critical section.

use std::sync::atomic::{AtomicU64, Ordering::SeqCst};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::availability::AvailabilityIndex;
use crate::error::CoreError;
use crate::inventory::InventoryStore;
use crate::model::{Booking, BookingId, BookingStatus, GuestId, HotelId, RoomId};
use crate::retry::{with_retry, RetryConfig};
use crate::stats::{CoreStats, StatsSnapshot};

/// Reservation attempt. Guest identity comes from the external identity
/// provider; the core does not authenticate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub hotel_id: HotelId,
    pub room_id: RoomId,
    pub guest_id: GuestId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
}

#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Upper bound on stay length; longer requests are rejected as invalid.
    pub max_stay_nights: u32,
    pub retry: RetryConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_stay_nights: 365,
            retry: RetryConfig::default(),
        }
    }
}

pub struct BookingDesk {
    inventory: Arc<dyn InventoryStore>,
    availability: Arc<AvailabilityIndex>,
    bookings: DashMap<BookingId, Booking>,
    next_id: AtomicU64,
    config: CoreConfig,
    stats: CoreStats,
}

impl BookingDesk {
    pub fn new(inventory: Arc<dyn InventoryStore>, availability: Arc<AvailabilityIndex>) -> Self {
        Self::with_config(inventory, availability, CoreConfig::default())
    }

    pub fn with_config(
        inventory: Arc<dyn InventoryStore>,
        availability: Arc<AvailabilityIndex>,
        config: CoreConfig,
    ) -> Self {
        Self {
            inventory,
            availability,
            bookings: DashMap::new(),
            next_id: AtomicU64::new(1),
            config,
            stats: CoreStats::default(),
        }
    }

    /// Validate, reserve, price, persist. A booking record only ever exists
    /// for a successfully reserved interval, and no reservation is left
    /// dangling without its booking: the reserve and the record insert share
    /// one room critical section.
    pub fn create_booking(&self, request: &BookingRequest) -> Result<Booking, CoreError> {
        if request.check_in >= request.check_out {
            return Err(CoreError::invalid("check-out must be after check-in"));
        }
        if request.guests < 1 {
            return Err(CoreError::invalid("at least one guest is required"));
        }
        let nights = (request.check_out - request.check_in).num_days();
        if nights > i64::from(self.config.max_stay_nights) {
            return Err(CoreError::invalid(format!(
                "stay of {nights} nights exceeds the {} night limit",
                self.config.max_stay_nights
            )));
        }

        let retry = &self.config.retry;
        let hotel = with_retry(retry, || self.inventory.hotel(&request.hotel_id))?
            .ok_or_else(|| CoreError::not_found("hotel", request.hotel_id.as_str()))?;
        let room = with_retry(retry, || self.inventory.room(&request.room_id))?
            .ok_or_else(|| CoreError::not_found("room", request.room_id.as_str()))?;
        if room.hotel_id != hotel.id {
            return Err(CoreError::invalid(
                "room does not belong to the requested hotel",
            ));
        }
        if request.guests > room.capacity {
            return Err(CoreError::invalid(format!(
                "party of {} exceeds room capacity {}",
                request.guests, room.capacity
            )));
        }

        let slot = self.availability.room_slot(&room.id);
        let mut held = slot.lock();
        let handle = match self.availability.reserve_locked(
            &room,
            &mut held,
            request.check_in,
            request.check_out,
        ) {
            Ok(handle) => handle,
            Err(err) => {
                if matches!(err, CoreError::Conflict { .. }) {
                    self.stats.booking_conflicts.fetch_add(1, SeqCst);
                }
                return Err(err);
            }
        };

        // Price is computed once here and frozen on the record.
        let total_price = room.price_per_night * nights as f64;
        let id = format!("bk-{}", self.next_id.fetch_add(1, SeqCst));
        let booking = Booking {
            id: id.clone(),
            hotel_id: hotel.id,
            room_id: room.id,
            guest_id: request.guest_id.clone(),
            check_in: request.check_in,
            check_out: request.check_out,
            guests: request.guests,
            total_price,
            status: BookingStatus::Pending,
            handle,
            created_at: Utc::now(),
        };
        self.bookings.insert(id, booking.clone());
        drop(held);

        self.stats.bookings_created.fetch_add(1, SeqCst);
        info!(
            booking_id = %booking.id,
            room_id = %booking.room_id,
            total_price,
            "booking created"
        );
        Ok(booking)
    }

    pub fn confirm(&self, booking_id: &str) -> Result<Booking, CoreError> {
        let mut entry = self.require_booking_mut(booking_id)?;
        match entry.status {
            BookingStatus::Pending => {
                entry.status = BookingStatus::Confirmed;
                debug!(booking_id, "booking confirmed");
                Ok(entry.clone())
            }
            from => Err(CoreError::InvalidTransition {
                from,
                attempted: "confirm",
            }),
        }
    }

    pub fn check_in(&self, booking_id: &str) -> Result<Booking, CoreError> {
        let mut entry = self.require_booking_mut(booking_id)?;
        match entry.status {
            BookingStatus::Confirmed => {
                entry.status = BookingStatus::CheckedIn;
                debug!(booking_id, "guest checked in");
                Ok(entry.clone())
            }
            from => Err(CoreError::InvalidTransition {
                from,
                attempted: "check in",
            }),
        }
    }

    pub fn check_out(&self, booking_id: &str) -> Result<Booking, CoreError> {
        let mut entry = self.require_booking_mut(booking_id)?;
        match entry.status {
            BookingStatus::CheckedIn => {
                entry.status = BookingStatus::CheckedOut;
                debug!(booking_id, "guest checked out");
                Ok(entry.clone())
            }
            from => Err(CoreError::InvalidTransition {
                from,
                attempted: "check out",
            }),
        }
    }

    /// Cancels a pending or confirmed booking and releases its interval.
    /// Only the thread that performs the status flip releases, so a second
    /// cancel gets `InvalidTransition` and can never double-release.
    pub fn cancel(&self, booking_id: &str) -> Result<Booking, CoreError> {
        let snapshot = {
            let mut entry = self.require_booking_mut(booking_id)?;
            match entry.status {
                BookingStatus::Pending | BookingStatus::Confirmed => {
                    entry.status = BookingStatus::Cancelled;
                    entry.clone()
                }
                from => {
                    return Err(CoreError::InvalidTransition {
                        from,
                        attempted: "cancel",
                    })
                }
            }
        };
        self.availability.release(&snapshot.handle);
        self.stats.bookings_cancelled.fetch_add(1, SeqCst);
        info!(booking_id, "booking cancelled");
        Ok(snapshot)
    }

    /// Terminal no-show transition for confirmed bookings that never arrive;
    /// releases the interval the same way cancellation does.
    pub fn mark_no_show(&self, booking_id: &str) -> Result<Booking, CoreError> {
        let snapshot = {
            let mut entry = self.require_booking_mut(booking_id)?;
            match entry.status {
                BookingStatus::Confirmed => {
                    entry.status = BookingStatus::NoShow;
                    entry.clone()
                }
                from => {
                    return Err(CoreError::InvalidTransition {
                        from,
                        attempted: "mark no-show",
                    })
                }
            }
        };
        self.availability.release(&snapshot.handle);
        self.stats.no_shows.fetch_add(1, SeqCst);
        info!(booking_id, "booking marked no-show");
        Ok(snapshot)
    }

    pub fn booking(&self, booking_id: &str) -> Result<Booking, CoreError> {
        self.bookings
            .get(booking_id)
            .map(|b| b.value().clone())
            .ok_or_else(|| CoreError::not_found("booking", booking_id))
    }

    /// Full history for a hotel, cancelled and no-show included, oldest first.
    pub fn bookings_for_hotel(&self, hotel_id: &str) -> Vec<Booking> {
        self.collect_sorted(|b| b.hotel_id == hotel_id)
    }

    pub fn bookings_for_guest(&self, guest_id: &str) -> Vec<Booking> {
        self.collect_sorted(|b| b.guest_id == guest_id)
    }

    fn collect_sorted(&self, keep: impl Fn(&Booking) -> bool) -> Vec<Booking> {
        let mut out: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| keep(b))
            .map(|b| b.value().clone())
            .collect();
        out.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        out
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn require_booking_mut(
        &self,
        booking_id: &str,
    ) -> Result<dashmap::mapref::one::RefMut<'_, BookingId, Booking>, CoreError> {
        self.bookings
            .get_mut(booking_id)
            .ok_or_else(|| CoreError::not_found("booking", booking_id))
    }
}
