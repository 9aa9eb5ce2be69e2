//! Data models for the scheduling core

pub mod calendar;
pub mod reservation;
pub mod slot;
pub mod workflow;

// Re-export commonly used types
pub use calendar::{AgendaView, CalendarDay, Granularity, MonthView, ViewState};
pub use reservation::{AppointmentId, CreateReservation, Reservation, ReservationDetail};
pub use slot::{ClassifiedSlot, SlotState};
pub use workflow::{AppointmentDraft, ClientId, Destination, SlotAction, TapOutcome, VehicleId, WorkflowMode};
