//! Booking backend seam
//!
//! The remote HTTP API owns appointment data and business rules. The
//! scheduling core only talks to it through [`BookingBackend`].

pub mod http;
pub mod memory;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    error::AppResult,
    models::{AppointmentId, CreateReservation, Reservation, ReservationDetail},
};

pub use http::HttpBookingBackend;
pub use memory::MemoryBookingBackend;

/// Request/response operations offered by the booking backend.
///
/// Every call resolves before the caller continues. Timeouts surface as
/// ordinary errors.
#[async_trait]
pub trait BookingBackend: Send + Sync {
    /// Reservations booked on `date`, in backend order
    async fn get_reservations_for_date(&self, date: NaiveDate) -> AppResult<Vec<Reservation>>;

    async fn get_reservation_detail(&self, appointment_id: AppointmentId) -> AppResult<ReservationDetail>;

    /// Create an appointment and return its id
    async fn create_reservation(&self, request: &CreateReservation) -> AppResult<AppointmentId>;

    async fn cancel_reservation(&self, appointment_id: AppointmentId) -> AppResult<()>;

    /// Move an appointment. The backend rejects non-future times and occupied slots.
    async fn reschedule_reservation(
        &self,
        appointment_id: AppointmentId,
        new_date_time: NaiveDateTime,
    ) -> AppResult<()>;
}
