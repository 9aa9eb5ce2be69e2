//! Booking backend over the shop's JSON HTTP API

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::BookingBackend;
use crate::{
    config::BackendConfig,
    error::{AppError, AppResult},
    models::{
        reservation::{
            check_success, CreateReservationResponse, RescheduleReservation,
            ReservationDetailResponse, ReservationsResponse, StatusResponse,
        },
        AppointmentId, CreateReservation, Reservation, ReservationDetail,
    },
};

#[derive(Clone)]
pub struct HttpBookingBackend {
    client: Client,
    base_url: String,
}

impl HttpBookingBackend {
    /// Create a new HTTP backend from configuration
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let status = response.status();
        let body = response.text().await?;
        decode_body(status, &body)
    }
}

/// Decode a response envelope. Error statuses still carry an envelope
/// when the backend rejected the request on business grounds.
fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> AppResult<T> {
    serde_json::from_str::<T>(body).map_err(|e| {
        if status.is_success() {
            AppError::Backend(format!("Malformed response: {}", e))
        } else if status == StatusCode::NOT_FOUND {
            AppError::NotFound("Appointment not found".to_string())
        } else {
            AppError::Backend(format!("HTTP {}", status))
        }
    })
}

#[async_trait]
impl BookingBackend for HttpBookingBackend {
    async fn get_reservations_for_date(&self, date: NaiveDate) -> AppResult<Vec<Reservation>> {
        tracing::debug!(%date, "Fetching reservations");

        let response = self
            .client
            .get(self.url("appointments"))
            .query(&[("date", date.format("%Y-%m-%d").to_string())])
            .send()
            .await?;

        let body: ReservationsResponse = Self::decode(response).await?;
        check_success(body.success, body.message, "Could not load appointments")?;
        Ok(body.reservations)
    }

    async fn get_reservation_detail(&self, appointment_id: AppointmentId) -> AppResult<ReservationDetail> {
        tracing::debug!(appointment_id, "Fetching appointment detail");

        let response = self
            .client
            .get(self.url(&format!("appointments/{}", appointment_id)))
            .send()
            .await?;

        let body: ReservationDetailResponse = Self::decode(response).await?;
        check_success(body.success, body.message, "Could not load the appointment")?;
        body.reservation
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", appointment_id)))
    }

    async fn create_reservation(&self, request: &CreateReservation) -> AppResult<AppointmentId> {
        tracing::debug!(date_time = %request.date_time, client_id = request.client_id, "Creating appointment");

        let response = self
            .client
            .post(self.url("appointments"))
            .json(request)
            .send()
            .await?;

        let body: CreateReservationResponse = Self::decode(response).await?;
        check_success(body.success, body.message, "The appointment could not be created")?;
        body.appointment_id
            .ok_or_else(|| AppError::Backend("Missing appointment id in response".to_string()))
    }

    async fn cancel_reservation(&self, appointment_id: AppointmentId) -> AppResult<()> {
        tracing::debug!(appointment_id, "Cancelling appointment");

        let response = self
            .client
            .delete(self.url(&format!("appointments/{}", appointment_id)))
            .send()
            .await?;

        let body: StatusResponse = Self::decode(response).await?;
        check_success(body.success, body.message, "The appointment could not be cancelled")
    }

    async fn reschedule_reservation(
        &self,
        appointment_id: AppointmentId,
        new_date_time: NaiveDateTime,
    ) -> AppResult<()> {
        tracing::debug!(appointment_id, %new_date_time, "Rescheduling appointment");

        let response = self
            .client
            .put(self.url(&format!("appointments/{}/reschedule", appointment_id)))
            .json(&RescheduleReservation { new_date_time })
            .send()
            .await?;

        let body: StatusResponse = Self::decode(response).await?;
        check_success(body.success, body.message, "The appointment could not be rescheduled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = BackendConfig {
            base_url: "https://shop.example.com/api/v1/".to_string(),
            ..BackendConfig::default()
        };
        let backend = HttpBookingBackend::new(&config).unwrap();
        assert_eq!(
            backend.url("/appointments/42"),
            "https://shop.example.com/api/v1/appointments/42"
        );
    }

    #[test]
    fn test_decode_maps_status() {
        let err = decode_body::<StatusResponse>(StatusCode::NOT_FOUND, "<html>Not Found</html>").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = decode_body::<StatusResponse>(StatusCode::BAD_GATEWAY, "").unwrap_err();
        assert_eq!(err.user_message(), "Could not reach the booking service: HTTP 502 Bad Gateway");

        let err = decode_body::<StatusResponse>(StatusCode::OK, "{\"ok\": true}").unwrap_err();
        assert!(matches!(err, AppError::Backend(msg) if msg.starts_with("Malformed response")));
    }

    #[test]
    fn test_rejected_envelope_message_is_verbatim() {
        let body = r#"{"success": false, "message": "Slot already taken"}"#;
        let envelope = decode_body::<StatusResponse>(StatusCode::CONFLICT, body).unwrap();
        let err = check_success(envelope.success, envelope.message, "fallback").unwrap_err();
        assert_eq!(err.user_message(), "Slot already taken");
    }
}
