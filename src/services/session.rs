//! Scheduling session
//!
//! Ties the navigation controller, the view builders and the workflow
//! resolver together for one booking session. Every call rebuilds and
//! returns synchronously from the caller's point of view; the UI renders
//! [`SchedulingSession::current_view`] afterwards.

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

use crate::{
    backend::BookingBackend,
    config::AgendaConfig,
    error::AppResult,
    models::{AgendaView, AppointmentId, CalendarDay, ClassifiedSlot, Granularity, TapOutcome, ViewState, WorkflowMode},
    presenter::InteractionPresenter,
    services::{
        agenda::AgendaService,
        clock::Clock,
        navigation::{NavigationBounds, NavigationController, RebuildTicket},
        workflow::WorkflowResolver,
    },
};

/// What happened to a requested rebuild
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// The new view replaced the previous one
    Applied,
    /// Another rebuild is still running; nothing was started. The running
    /// rebuild picks up the new view state when it is applied.
    Busy,
    /// The backend failed; the previous view is kept and the message was shown
    Failed { message: String },
}

pub struct SchedulingSession {
    navigation: NavigationController,
    agenda: AgendaService,
    resolver: WorkflowResolver,
    presenter: Arc<dyn InteractionPresenter>,
    current_view: Option<AgendaView>,
}

impl SchedulingSession {
    /// Open a session on today's day view. The workflow mode is fixed here and
    /// only changes after a successful reschedule.
    pub fn open(
        backend: Arc<dyn BookingBackend>,
        presenter: Arc<dyn InteractionPresenter>,
        clock: Arc<dyn Clock>,
        workflow_mode: WorkflowMode,
        config: &AgendaConfig,
    ) -> Self {
        tracing::info!(?workflow_mode, today = %clock.today(), "Opening scheduling session");

        Self {
            navigation: NavigationController::new(clock.today(), workflow_mode),
            agenda: AgendaService::new(Arc::clone(&backend), Arc::clone(&clock), config.week_fetch_concurrency),
            resolver: WorkflowResolver::new(backend, Arc::clone(&presenter), clock),
            presenter,
            current_view: None,
        }
    }

    pub fn view_state(&self) -> ViewState {
        self.navigation.view_state()
    }

    pub fn bounds(&self) -> NavigationBounds {
        self.navigation.bounds()
    }

    pub fn current_view(&self) -> Option<&AgendaView> {
        self.current_view.as_ref()
    }

    pub fn can_go_back(&self) -> bool {
        self.navigation.can_go_back()
    }

    pub fn is_busy(&self) -> bool {
        self.navigation.is_busy()
    }

    // ---- Rebuilds ----

    /// Start a rebuild of the active view state
    pub fn begin_rebuild(&mut self) -> AppResult<RebuildTicket> {
        self.navigation.begin_rebuild()
    }

    /// Build the view described by a ticket
    pub async fn build(&self, ticket: &RebuildTicket) -> AppResult<AgendaView> {
        self.agenda.build(ticket.state()).await
    }

    /// Apply a finished rebuild. When the view state changed while it ran,
    /// its result is discarded and the active state is rebuilt instead.
    /// A failed rebuild leaves the previous view in place.
    pub async fn apply_rebuild(&mut self, ticket: RebuildTicket, result: AppResult<AgendaView>) -> RebuildOutcome {
        if self.navigation.finish_rebuild(&ticket) {
            return self.show(&ticket, result).await;
        }
        tracing::debug!(state = ?ticket.state(), "Discarding stale rebuild");
        self.refresh().await
    }

    /// Rebuild the active view and apply it
    pub async fn refresh(&mut self) -> RebuildOutcome {
        let ticket = match self.begin_rebuild() {
            Ok(ticket) => ticket,
            Err(_) => return RebuildOutcome::Busy,
        };
        let result = self.build(&ticket).await;
        // Nothing can navigate while this borrow is held
        self.navigation.finish_rebuild(&ticket);
        self.show(&ticket, result).await
    }

    async fn show(&mut self, ticket: &RebuildTicket, result: AppResult<AgendaView>) -> RebuildOutcome {
        match result {
            Ok(view) => {
                tracing::debug!(granularity = %view.granularity(), date = %ticket.state().selected_date, "Agenda view applied");
                self.current_view = Some(view);
                RebuildOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, state = ?ticket.state(), "Agenda rebuild failed");
                let message = e.user_message();
                self.presenter.show_message("Agenda", &message).await;
                RebuildOutcome::Failed { message }
            }
        }
    }

    // ---- Navigation ----

    pub async fn switch_granularity(&mut self, granularity: Granularity) -> RebuildOutcome {
        self.navigation.switch_granularity(granularity);
        self.refresh().await
    }

    pub async fn next(&mut self) -> RebuildOutcome {
        self.navigation.next();
        self.refresh().await
    }

    /// `None`, with nothing changed, when the active view is already at its floor
    pub async fn previous(&mut self) -> Option<RebuildOutcome> {
        if !self.navigation.previous() {
            return None;
        }
        Some(self.refresh().await)
    }

    /// Open the day view for a month or week cell. Blank and past cells do not react.
    pub async fn open_day(&mut self, day: &CalendarDay) -> Option<RebuildOutcome> {
        let date = day.date.filter(|_| !day.is_blank && !day.is_past)?;
        self.navigation.open_day(date);
        Some(self.refresh().await)
    }

    // ---- Booking ----

    /// Hand a slot tap to the workflow resolver and rebuild after data changes
    pub async fn tap_slot(&mut self, slot: &ClassifiedSlot) -> TapOutcome {
        let state = self.navigation.view_state();
        let outcome = self
            .resolver
            .resolve_tap(state.workflow_mode, state.granularity, slot)
            .await;
        self.after_booking(&outcome, slot.date()).await;
        outcome
    }

    /// Reschedule an appointment directly, outside a slot tap
    pub async fn reschedule(&mut self, appointment_id: AppointmentId, new_date_time: NaiveDateTime) -> TapOutcome {
        let outcome = self.resolver.reschedule(appointment_id, new_date_time).await;
        self.after_booking(&outcome, new_date_time.date()).await;
        outcome
    }

    async fn after_booking(&mut self, outcome: &TapOutcome, date: NaiveDate) {
        if !outcome.requires_reload() {
            return;
        }
        match outcome {
            TapOutcome::Created { .. } => self.navigation.anchor_at(date),
            TapOutcome::Rescheduled { date_time, .. } => {
                self.navigation.set_workflow_mode(WorkflowMode::CreateNew);
                self.navigation.open_day(date_time.date());
            }
            _ => {}
        }
        // Views fetched before the booking changed are outdated
        self.navigation.invalidate();
        self.refresh().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBookingBackend;
    use crate::models::AppointmentDraft;
    use crate::presenter::MockInteractionPresenter;
    use crate::services::clock::FixedClock;
    use chrono::NaiveTime;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn session(presenter: MockInteractionPresenter) -> (SchedulingSession, MemoryBookingBackend) {
        let now = date(14).and_time(NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now));
        let backend = MemoryBookingBackend::new(Arc::clone(&clock));
        let session = SchedulingSession::open(
            Arc::new(backend.clone()),
            Arc::new(presenter),
            clock,
            WorkflowMode::CreateNew,
            &AgendaConfig::default(),
        );
        (session, backend)
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_previous_view() {
        let mut presenter = MockInteractionPresenter::new();
        presenter
            .expect_show_message()
            .withf(|title, _| title == "Agenda")
            .times(1)
            .return_const(());
        let (mut session, backend) = session(presenter);

        assert_eq!(session.refresh().await, RebuildOutcome::Applied);
        let before = session.current_view().cloned();

        backend.set_offline(Some("network unreachable")).unwrap();
        let outcome = session.next().await;
        assert!(matches!(outcome, RebuildOutcome::Failed { .. }));
        assert_eq!(session.current_view().cloned(), before);
        assert!(!session.is_busy());
    }

    fn shown_date(session: &SchedulingSession) -> NaiveDate {
        match session.current_view() {
            Some(AgendaView::Day { date, .. }) => *date,
            other => panic!("day view expected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stale_rebuild_is_replaced_by_active_state() {
        let (mut session, _) = session(MockInteractionPresenter::new());

        let ticket = session.begin_rebuild().unwrap();
        let result = session.build(&ticket).await;

        // The user navigates while the first rebuild is still in flight
        assert_eq!(session.next().await, RebuildOutcome::Busy);
        assert_eq!(session.view_state().selected_date, date(15));

        assert_eq!(session.apply_rebuild(ticket, result).await, RebuildOutcome::Applied);
        assert_eq!(shown_date(&session), session.view_state().selected_date);
        assert_eq!(shown_date(&session), date(15));
        assert!(!session.is_busy());
        assert!(session.can_go_back());
    }

    #[tokio::test]
    async fn test_booking_during_rebuild_shows_up_once_applied() {
        let mut presenter = MockInteractionPresenter::new();
        presenter.expect_request_appointment_draft().times(1).returning(|_| {
            Some(AppointmentDraft {
                client_id: 1,
                vehicle_id: 2,
                order_type: "Service".to_string(),
                jobs: Vec::new(),
            })
        });
        let (mut session, _) = session(presenter);
        assert_eq!(session.refresh().await, RebuildOutcome::Applied);
        let Some(AgendaView::Day { slots, .. }) = session.current_view().cloned() else {
            panic!("day view expected");
        };
        let target = slots.into_iter().find(|s| s.is_available()).unwrap();

        let ticket = session.begin_rebuild().unwrap();
        let result = session.build(&ticket).await;

        assert!(matches!(session.tap_slot(&target).await, TapOutcome::Created { .. }));
        assert_eq!(session.apply_rebuild(ticket, result).await, RebuildOutcome::Applied);

        let Some(AgendaView::Day { slots, .. }) = session.current_view() else {
            panic!("day view expected");
        };
        let rebuilt = slots.iter().find(|s| s.start == target.start).unwrap();
        assert!(rebuilt.is_occupied);
    }

    #[tokio::test]
    async fn test_blank_and_past_cells_do_not_open() {
        let (mut session, _) = session(MockInteractionPresenter::new());
        session.switch_granularity(Granularity::Month).await;

        let Some(AgendaView::Month(month)) = session.current_view().cloned() else {
            panic!("month view expected");
        };
        assert!(session.open_day(&month.days[0]).await.is_none());
        let yesterday = month.days.iter().find(|d| d.date == Some(date(13))).unwrap();
        assert!(session.open_day(yesterday).await.is_none());

        let later = month.days.iter().find(|d| d.date == Some(date(20))).unwrap();
        assert_eq!(session.open_day(later).await, Some(RebuildOutcome::Applied));
        assert_eq!(session.view_state().granularity, Granularity::Day);
        assert_eq!(session.view_state().selected_date, date(20));
    }
}
