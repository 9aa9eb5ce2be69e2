//! In-memory booking backend
//!
//! Keeps appointments in process and applies the same business rules as the
//! remote API: one appointment per slot, bookings only inside the slot grid,
//! reschedules only into the future. Used for the offline mode of the binary
//! and for tests, where the call counter and failure injection let callers
//! check exactly when the backend was reached.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use super::BookingBackend;
use crate::{
    error::{AppError, AppResult},
    models::{AppointmentId, CreateReservation, Reservation, ReservationDetail},
    services::{clock::Clock, slots},
};

#[derive(Clone)]
pub struct MemoryBookingBackend {
    data: Arc<RwLock<MemoryData>>,
    clock: Arc<dyn Clock>,
}

struct MemoryData {
    appointments: BTreeMap<AppointmentId, ReservationDetail>,
    next_id: AppointmentId,
    calls: usize,
    /// When set, every call fails with this transport error
    offline: Option<String>,
}

impl MemoryBookingBackend {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            data: Arc::new(RwLock::new(MemoryData {
                appointments: BTreeMap::new(),
                next_id: 1,
                calls: 0,
                offline: None,
            })),
            clock,
        }
    }

    /// Store an appointment as-is, bypassing business rules
    pub fn insert(&self, detail: ReservationDetail) -> AppResult<()> {
        let mut data = self.write()?;
        data.next_id = data.next_id.max(detail.id + 1);
        data.appointments.insert(detail.id, detail);
        Ok(())
    }

    /// Number of backend operations served so far
    pub fn call_count(&self) -> usize {
        self.data.read().map(|d| d.calls).unwrap_or(0)
    }

    /// Make every following call fail as if the network were down
    pub fn set_offline(&self, reason: Option<&str>) -> AppResult<()> {
        self.write()?.offline = reason.map(str::to_string);
        Ok(())
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, MemoryData>> {
        self.data
            .write()
            .map_err(|_| AppError::Backend("Appointment store is unavailable".to_string()))
    }

    /// Count the call and apply failure injection
    fn enter(&self) -> AppResult<RwLockWriteGuard<'_, MemoryData>> {
        let mut data = self.write()?;
        data.calls += 1;
        if let Some(reason) = &data.offline {
            return Err(AppError::Backend(reason.clone()));
        }
        Ok(data)
    }
}

impl MemoryData {
    /// Id of the appointment already holding the grid slot that contains `at`
    fn slot_holder(&self, at: NaiveDateTime, ignore: Option<AppointmentId>) -> Option<AppointmentId> {
        let slot_start = slots::containing_slot(at.time())?;
        let start = at.date().and_time(slot_start);
        let end = start + slots::slot_duration();
        self.appointments
            .values()
            .filter(|a| Some(a.id) != ignore)
            .find(|a| start <= a.date_time && a.date_time < end)
            .map(|a| a.id)
    }
}

fn summary(detail: &ReservationDetail) -> Reservation {
    Reservation {
        id: detail.id,
        client_name: detail.client_name.clone(),
        date_time: detail.date_time,
        order_type: detail.order_type.clone(),
    }
}

fn ensure_bookable(data: &MemoryData, at: NaiveDateTime, ignore: Option<AppointmentId>) -> AppResult<()> {
    if slots::containing_slot(at.time()).is_none() {
        return Err(AppError::BusinessRule(
            "The requested time is outside business hours".to_string(),
        ));
    }
    if data.slot_holder(at, ignore).is_some() {
        return Err(AppError::BusinessRule("The slot is already taken".to_string()));
    }
    Ok(())
}

#[async_trait]
impl BookingBackend for MemoryBookingBackend {
    async fn get_reservations_for_date(&self, date: NaiveDate) -> AppResult<Vec<Reservation>> {
        tracing::debug!(%date, "Fetching reservations from memory");
        let data = self.enter()?;
        Ok(data
            .appointments
            .values()
            .filter(|a| a.date_time.date() == date)
            .map(summary)
            .collect())
    }

    async fn get_reservation_detail(&self, appointment_id: AppointmentId) -> AppResult<ReservationDetail> {
        tracing::debug!(appointment_id, "Fetching appointment detail from memory");
        let data = self.enter()?;
        data.appointments
            .get(&appointment_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", appointment_id)))
    }

    async fn create_reservation(&self, request: &CreateReservation) -> AppResult<AppointmentId> {
        tracing::debug!(date_time = %request.date_time, client_id = request.client_id, "Storing appointment");
        let mut data = self.enter()?;
        ensure_bookable(&data, request.date_time, None)?;

        let id = data.next_id;
        data.next_id += 1;
        data.appointments.insert(
            id,
            ReservationDetail {
                id,
                client_id: request.client_id,
                client_name: format!("Client {}", request.client_id),
                vehicle_id: request.vehicle_id,
                vehicle_description: None,
                date_time: request.date_time,
                order_type: request.order_type.clone(),
                jobs: request.jobs.clone(),
                notes: None,
            },
        );
        Ok(id)
    }

    async fn cancel_reservation(&self, appointment_id: AppointmentId) -> AppResult<()> {
        tracing::debug!(appointment_id, "Removing appointment");
        let mut data = self.enter()?;
        data.appointments
            .remove(&appointment_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", appointment_id)))
    }

    async fn reschedule_reservation(
        &self,
        appointment_id: AppointmentId,
        new_date_time: NaiveDateTime,
    ) -> AppResult<()> {
        tracing::debug!(appointment_id, %new_date_time, "Moving appointment");
        let mut data = self.enter()?;
        if new_date_time <= self.clock.now() {
            return Err(AppError::BusinessRule(
                "The new date must be in the future".to_string(),
            ));
        }
        if !data.appointments.contains_key(&appointment_id) {
            return Err(AppError::NotFound(format!("Appointment {} not found", appointment_id)));
        }
        ensure_bookable(&data, new_date_time, Some(appointment_id))?;

        if let Some(appointment) = data.appointments.get_mut(&appointment_id) {
            appointment.date_time = new_date_time;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::FixedClock;
    use chrono::NaiveTime;
    use tokio_test::{assert_err, assert_ok};

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn backend() -> MemoryBookingBackend {
        MemoryBookingBackend::new(Arc::new(FixedClock::new(at(14, 8, 0))))
    }

    fn request(date_time: NaiveDateTime) -> CreateReservation {
        CreateReservation {
            client_id: 3,
            vehicle_id: 9,
            order_type: "Diagnosis".to_string(),
            date_time,
            jobs: vec!["Brake check".to_string()],
        }
    }

    #[tokio::test]
    async fn test_one_appointment_per_slot() {
        let backend = backend();
        let id = assert_ok!(backend.create_reservation(&request(at(14, 9, 0))).await);
        assert_eq!(id, 1);

        // 09:15 falls in the same 09:00 window
        let err = assert_err!(backend.create_reservation(&request(at(14, 9, 15))).await);
        assert_eq!(err.user_message(), "The slot is already taken");

        assert_ok!(backend.create_reservation(&request(at(14, 9, 30))).await);
        let listed = assert_ok!(backend.get_reservations_for_date(at(14, 0, 0).date()).await);
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_outside_business_hours_is_rejected() {
        let backend = backend();
        assert_err!(backend.create_reservation(&request(at(14, 15, 0))).await);
    }

    #[tokio::test]
    async fn test_reschedule_rules() {
        let backend = backend();
        let id = assert_ok!(backend.create_reservation(&request(at(15, 9, 0))).await);
        let other = assert_ok!(backend.create_reservation(&request(at(15, 10, 0))).await);

        // Past
        assert_err!(backend.reschedule_reservation(id, at(13, 9, 0)).await);
        // Occupied by another appointment
        assert_err!(backend.reschedule_reservation(id, at(15, 10, 0)).await);
        // Same slot as itself is fine
        assert_ok!(backend.reschedule_reservation(id, at(15, 9, 0)).await);
        assert_ok!(backend.reschedule_reservation(id, at(16, 11, 0)).await);

        let detail = assert_ok!(backend.get_reservation_detail(id).await);
        assert_eq!(detail.date_time, at(16, 11, 0));
        assert_ok!(backend.cancel_reservation(other).await);
        assert_err!(backend.get_reservation_detail(other).await);
    }

    #[tokio::test]
    async fn test_offline_counts_calls_and_fails() {
        let backend = backend();
        backend.set_offline(Some("connection refused")).unwrap();
        let err = assert_err!(backend.get_reservations_for_date(at(14, 0, 0).date()).await);
        assert!(matches!(err, AppError::Backend(_)));
        assert_eq!(backend.call_count(), 1);

        backend.set_offline(None).unwrap();
        assert_ok!(backend.get_reservations_for_date(at(14, 0, 0).date()).await);
        assert_eq!(backend.call_count(), 2);
    }
}
