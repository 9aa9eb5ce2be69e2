//! Booking workflow models (modes, tap outcomes, presenter actions)

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::reservation::{AppointmentId, ReservationDetail};

pub type ClientId = i64;
pub type VehicleId = i64;

/// Booking operation a scheduling session performs.
///
/// `CreateNew` doubles as the neutral mode a session falls back to after a
/// successful reschedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorkflowMode {
    #[default]
    CreateNew,
    Reschedule {
        appointment_id: AppointmentId,
    },
    ContinueWithKnownClientVehicle {
        client_id: ClientId,
        vehicle_id: VehicleId,
    },
}

/// Sub-actions offered for an occupied slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotAction {
    ViewDetails,
    Cancel,
}

impl SlotAction {
    pub fn label(&self) -> &'static str {
        match self {
            SlotAction::ViewDetails => "View details",
            SlotAction::Cancel => "Cancel appointment",
        }
    }
}

/// Data collected by the appointment creation sub-flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub client_id: ClientId,
    pub vehicle_id: VehicleId,
    pub order_type: String,
    pub jobs: Vec<String>,
}

/// Screens the core can ask the presenter to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    AppointmentDetail {
        appointment_id: AppointmentId,
        detail: ReservationDetail,
    },
    NewAppointment {
        date_time: NaiveDateTime,
    },
    ContinueAppointment {
        client_id: ClientId,
        vehicle_id: VehicleId,
        date_time: NaiveDateTime,
    },
}

/// What a slot tap ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// Blocked locally, nothing was sent to the backend
    Rejected { message: String },
    /// Occupied slot summary shown, no follow-up chosen
    InfoShown,
    DetailOpened { appointment_id: AppointmentId },
    Cancelled { appointment_id: AppointmentId },
    Created {
        appointment_id: AppointmentId,
        date_time: NaiveDateTime,
    },
    Rescheduled {
        appointment_id: AppointmentId,
        date_time: NaiveDateTime,
    },
    /// The user backed out of a sub-flow or confirmation
    Dismissed,
    /// The backend failed; the message was shown to the user
    Failed { message: String },
}

impl TapOutcome {
    /// Outcomes that changed backend data and require the view to be rebuilt
    pub fn requires_reload(&self) -> bool {
        matches!(
            self,
            TapOutcome::Cancelled { .. } | TapOutcome::Created { .. } | TapOutcome::Rescheduled { .. }
        )
    }
}
