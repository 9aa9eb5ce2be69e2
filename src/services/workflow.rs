//! Workflow mode resolver
//!
//! Decides what a tap on a classified slot does, given the session's workflow
//! mode and the slot state. Backend failures never escape this component:
//! they are shown through the presenter and reported as [`TapOutcome::Failed`].

use chrono::NaiveDateTime;
use std::sync::Arc;

use crate::{
    backend::BookingBackend,
    error::AppError,
    models::{
        AppointmentId, ClassifiedSlot, ClientId, CreateReservation, Destination, Granularity,
        Reservation, SlotAction, TapOutcome, VehicleId, WorkflowMode,
    },
    presenter::InteractionPresenter,
    services::clock::Clock,
};

pub const SLOT_PASSED: &str = "This slot has already passed";
pub const CHOOSE_FREE_SLOT: &str = "Choose a free slot to move the appointment to";
pub const MUST_BE_FUTURE: &str = "The new date must be in the future";

#[derive(Clone)]
pub struct WorkflowResolver {
    backend: Arc<dyn BookingBackend>,
    presenter: Arc<dyn InteractionPresenter>,
    clock: Arc<dyn Clock>,
}

impl WorkflowResolver {
    pub fn new(
        backend: Arc<dyn BookingBackend>,
        presenter: Arc<dyn InteractionPresenter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            presenter,
            clock,
        }
    }

    /// Route a slot tap according to `mode` and the slot state
    pub async fn resolve_tap(
        &self,
        mode: WorkflowMode,
        granularity: Granularity,
        slot: &ClassifiedSlot,
    ) -> TapOutcome {
        if slot.is_past && !slot.is_occupied {
            return self.reject("Slot unavailable", SLOT_PASSED).await;
        }

        if slot.is_occupied {
            return match mode {
                WorkflowMode::Reschedule { .. } => self.reject("Slot occupied", CHOOSE_FREE_SLOT).await,
                _ => self.occupied(granularity, slot.reservation.as_ref()).await,
            };
        }

        match mode {
            WorkflowMode::CreateNew => {
                let destination = Destination::NewAppointment { date_time: slot.start };
                self.create(None, slot.start, destination).await
            }
            WorkflowMode::Reschedule { appointment_id } => self.reschedule(appointment_id, slot.start).await,
            WorkflowMode::ContinueWithKnownClientVehicle { client_id, vehicle_id } => {
                let destination = Destination::ContinueAppointment {
                    client_id,
                    vehicle_id,
                    date_time: slot.start,
                };
                self.create(Some((client_id, vehicle_id)), slot.start, destination).await
            }
        }
    }

    /// Move an appointment. Times not strictly in the future are rejected
    /// before the backend is contacted.
    pub async fn reschedule(&self, appointment_id: AppointmentId, new_date_time: NaiveDateTime) -> TapOutcome {
        if new_date_time <= self.clock.now() {
            return self.reject("Invalid date", MUST_BE_FUTURE).await;
        }

        match self
            .backend
            .reschedule_reservation(appointment_id, new_date_time)
            .await
        {
            Ok(()) => {
                tracing::info!(appointment_id, %new_date_time, "Appointment rescheduled");
                self.presenter
                    .show_message(
                        "Appointment rescheduled",
                        &format!("Moved to {}", new_date_time.format("%d/%m/%Y %H:%M")),
                    )
                    .await;
                TapOutcome::Rescheduled {
                    appointment_id,
                    date_time: new_date_time,
                }
            }
            Err(e) => self.fail("Reschedule failed", e).await,
        }
    }

    async fn occupied(&self, granularity: Granularity, reservation: Option<&Reservation>) -> TapOutcome {
        let Some(reservation) = reservation else {
            self.presenter.show_message("Appointment", "This slot is taken").await;
            return TapOutcome::InfoShown;
        };
        let brief = reservation.brief();

        // The week view only shows the summary
        if granularity == Granularity::Week {
            self.presenter.show_message("Appointment", &brief).await;
            return TapOutcome::InfoShown;
        }

        let choice = self
            .presenter
            .choose_action("Appointment", &brief, &[SlotAction::ViewDetails, SlotAction::Cancel])
            .await;

        match choice {
            None => TapOutcome::InfoShown,
            Some(SlotAction::ViewDetails) => self.open_detail(reservation.id).await,
            Some(SlotAction::Cancel) => self.cancel(reservation).await,
        }
    }

    async fn open_detail(&self, appointment_id: AppointmentId) -> TapOutcome {
        match self.backend.get_reservation_detail(appointment_id).await {
            Ok(detail) => {
                self.presenter
                    .navigate(Destination::AppointmentDetail { appointment_id, detail })
                    .await;
                TapOutcome::DetailOpened { appointment_id }
            }
            Err(e) => self.fail("Appointment", e).await,
        }
    }

    async fn cancel(&self, reservation: &Reservation) -> TapOutcome {
        let question = format!(
            "Cancel the appointment of {} on {}?",
            reservation.client_name,
            reservation.date_time.format("%d/%m/%Y %H:%M")
        );
        if !self.presenter.confirm("Cancel appointment", &question).await {
            return TapOutcome::Dismissed;
        }

        match self.backend.cancel_reservation(reservation.id).await {
            Ok(()) => {
                tracing::info!(appointment_id = reservation.id, "Appointment cancelled");
                TapOutcome::Cancelled {
                    appointment_id: reservation.id,
                }
            }
            Err(e) => self.fail("Cancel failed", e).await,
        }
    }

    /// Run the creation sub-flow, then book the slot. Known client and vehicle
    /// ids take precedence over whatever the sub-flow returns.
    async fn create(
        &self,
        known: Option<(ClientId, VehicleId)>,
        date_time: NaiveDateTime,
        destination: Destination,
    ) -> TapOutcome {
        let Some(draft) = self.presenter.request_appointment_draft(destination).await else {
            return TapOutcome::Dismissed;
        };
        let (client_id, vehicle_id) = known.unwrap_or((draft.client_id, draft.vehicle_id));

        let request = CreateReservation {
            client_id,
            vehicle_id,
            order_type: draft.order_type,
            date_time,
            jobs: draft.jobs,
        };

        match self.backend.create_reservation(&request).await {
            Ok(appointment_id) => {
                tracing::info!(appointment_id, %date_time, "Appointment created");
                TapOutcome::Created {
                    appointment_id,
                    date_time,
                }
            }
            Err(e) => self.fail("Booking failed", e).await,
        }
    }

    async fn reject(&self, title: &str, reason: &str) -> TapOutcome {
        let error = AppError::Validation(reason.to_string());
        tracing::debug!(error = %error, "Slot tap rejected");
        let message = error.user_message();
        self.presenter.show_message(title, &message).await;
        TapOutcome::Rejected { message }
    }

    async fn fail(&self, title: &str, error: AppError) -> TapOutcome {
        tracing::warn!(error = %error, "Booking operation failed");
        let message = error.user_message();
        self.presenter.show_message(title, &message).await;
        TapOutcome::Failed { message }
    }
}
