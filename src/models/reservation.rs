//! Reservation (appointment) models exchanged with the booking backend

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub type AppointmentId = i64;

/// Appointment summary as returned by the per-date listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: AppointmentId,
    pub client_name: String,
    /// Local wall-clock time of the appointment
    pub date_time: NaiveDateTime,
    pub order_type: String,
}

impl Reservation {
    /// One-line summary used when an occupied slot is tapped
    pub fn brief(&self) -> String {
        format!(
            "{} - {} ({})",
            self.date_time.format("%H:%M"),
            self.client_name,
            self.order_type
        )
    }
}

/// Full appointment record for the detail screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDetail {
    pub id: AppointmentId,
    pub client_id: i64,
    pub client_name: String,
    pub vehicle_id: i64,
    pub vehicle_description: Option<String>,
    pub date_time: NaiveDateTime,
    pub order_type: String,
    #[serde(default)]
    pub jobs: Vec<String>,
    pub notes: Option<String>,
}

/// Create appointment request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservation {
    pub client_id: i64,
    pub vehicle_id: i64,
    pub order_type: String,
    pub date_time: NaiveDateTime,
    /// Requested jobs ("trabajos") attached to the work order
    pub jobs: Vec<String>,
}

/// Reschedule appointment request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleReservation {
    pub new_date_time: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationsResponse {
    pub success: bool,
    #[serde(default)]
    pub reservations: Vec<Reservation>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDetailResponse {
    pub success: bool,
    pub reservation: Option<ReservationDetail>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationResponse {
    pub success: bool,
    pub appointment_id: Option<AppointmentId>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    pub message: Option<String>,
}

/// Turn a `success = false` envelope into a business-rule error carrying the backend message
pub fn check_success(success: bool, message: Option<String>, fallback: &str) -> AppResult<()> {
    if success {
        Ok(())
    } else {
        Err(AppError::BusinessRule(
            message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()),
        ))
    }
}
