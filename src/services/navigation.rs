//! Navigation controller
//!
//! Owns the view state of a scheduling session (granularity, selected date,
//! workflow mode), the per-granularity lower bounds for "previous page", and
//! the busy flag guarding rebuilds.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::{
    error::{AppError, AppResult},
    models::{Granularity, ViewState, WorkflowMode},
    services::agenda::{first_of_month, monday_of},
};

/// Earliest day, week and month reachable with "previous", fixed when the session opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationBounds {
    pub day_floor: NaiveDate,
    pub week_floor: NaiveDate,
    pub month_floor: NaiveDate,
}

impl NavigationBounds {
    pub fn anchored_at(today: NaiveDate) -> Self {
        Self {
            day_floor: today,
            week_floor: monday_of(today),
            month_floor: first_of_month(today),
        }
    }
}

/// Snapshot handed out when a rebuild starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildTicket {
    generation: u64,
    state: ViewState,
}

impl RebuildTicket {
    pub fn state(&self) -> &ViewState {
        &self.state
    }
}

#[derive(Debug, Clone)]
pub struct NavigationController {
    bounds: NavigationBounds,
    granularity: Granularity,
    selected_date: NaiveDate,
    /// Date restored when switching back to the day view
    last_day_date: NaiveDate,
    workflow_mode: WorkflowMode,
    busy: bool,
    /// Bumped on every view state change
    generation: u64,
}

impl NavigationController {
    /// Start a session on the day view of `today`
    pub fn new(today: NaiveDate, workflow_mode: WorkflowMode) -> Self {
        Self {
            bounds: NavigationBounds::anchored_at(today),
            granularity: Granularity::Day,
            selected_date: today,
            last_day_date: today,
            workflow_mode,
            busy: false,
            generation: 0,
        }
    }

    pub fn bounds(&self) -> NavigationBounds {
        self.bounds
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn workflow_mode(&self) -> WorkflowMode {
        self.workflow_mode
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            granularity: self.granularity,
            selected_date: self.selected_date,
            workflow_mode: self.workflow_mode,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    fn set_selected(&mut self, date: NaiveDate) {
        self.selected_date = date;
        if self.granularity == Granularity::Day {
            self.last_day_date = date;
        }
        self.generation += 1;
    }

    pub fn set_workflow_mode(&mut self, mode: WorkflowMode) {
        if self.workflow_mode != mode {
            self.workflow_mode = mode;
            self.generation += 1;
        }
    }

    pub fn switch_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
        match granularity {
            Granularity::Day => self.selected_date = self.last_day_date,
            Granularity::Week => self.selected_date = self.bounds.week_floor,
            Granularity::Month => {}
        }
        self.generation += 1;
    }

    /// Show `date` in the day view
    pub fn open_day(&mut self, date: NaiveDate) {
        self.granularity = Granularity::Day;
        self.set_selected(date);
    }

    /// Re-anchor the current view on `date` without changing granularity
    pub fn anchor_at(&mut self, date: NaiveDate) {
        let anchored = match self.granularity {
            Granularity::Week => monday_of(date),
            Granularity::Day | Granularity::Month => date,
        };
        self.set_selected(anchored);
    }

    pub fn next(&mut self) {
        let next = match self.granularity {
            Granularity::Day => self.selected_date + Days::new(1),
            Granularity::Week => monday_of(self.selected_date) + Days::new(7),
            Granularity::Month => self.selected_date + Months::new(1),
        };
        self.set_selected(next);
    }

    pub fn can_go_back(&self) -> bool {
        match self.granularity {
            Granularity::Day => self.selected_date > self.bounds.day_floor,
            Granularity::Week => monday_of(self.selected_date) > self.bounds.week_floor,
            Granularity::Month => {
                (self.selected_date.year(), self.selected_date.month())
                    > (self.bounds.month_floor.year(), self.bounds.month_floor.month())
            }
        }
    }

    /// Step one page back. Returns false, leaving the state untouched, at the floor.
    pub fn previous(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        let previous = match self.granularity {
            Granularity::Day => self.selected_date - Days::new(1),
            Granularity::Week => monday_of(monday_of(self.selected_date) - Days::new(7)),
            Granularity::Month => self.selected_date - Months::new(1),
        };
        self.set_selected(previous);
        true
    }

    /// Make any rebuild in flight stale, e.g. after backend data changed
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Mark a rebuild as in flight
    pub fn begin_rebuild(&mut self) -> AppResult<RebuildTicket> {
        if self.busy {
            return Err(AppError::Busy);
        }
        self.busy = true;
        Ok(RebuildTicket {
            generation: self.generation,
            state: self.view_state(),
        })
    }

    /// Clear the busy flag. Returns true when the ticket still matches the
    /// active view state, i.e. its result may be applied.
    pub fn finish_rebuild(&mut self, ticket: &RebuildTicket) -> bool {
        self.busy = false;
        ticket.generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Thursday
    fn controller() -> NavigationController {
        NavigationController::new(date(2024, 3, 14), WorkflowMode::CreateNew)
    }

    #[test]
    fn test_bounds() {
        let bounds = NavigationBounds::anchored_at(date(2024, 3, 14));
        assert_eq!(bounds.day_floor, date(2024, 3, 14));
        assert_eq!(bounds.week_floor, date(2024, 3, 11));
        assert_eq!(bounds.month_floor, date(2024, 3, 1));
    }

    #[test]
    fn test_day_navigation_stops_at_today() {
        let mut nav = controller();
        assert!(!nav.can_go_back());
        assert!(!nav.previous());
        assert_eq!(nav.selected_date(), date(2024, 3, 14));

        nav.next();
        assert!(nav.can_go_back());
        assert!(nav.previous());
        assert_eq!(nav.selected_date(), date(2024, 3, 14));
    }

    #[test]
    fn test_week_navigation_uses_mondays() {
        let mut nav = controller();
        nav.switch_granularity(Granularity::Week);
        assert_eq!(nav.selected_date(), date(2024, 3, 11));
        assert!(!nav.can_go_back());

        nav.next();
        assert_eq!(nav.selected_date(), date(2024, 3, 18));
        assert!(nav.can_go_back());
        assert!(nav.previous());
        assert_eq!(nav.selected_date(), date(2024, 3, 11));
        assert!(!nav.previous());
    }

    #[test]
    fn test_month_navigation() {
        let mut nav = controller();
        nav.switch_granularity(Granularity::Month);
        assert_eq!(nav.selected_date(), date(2024, 3, 14));
        assert!(!nav.previous());
        assert_eq!(nav.selected_date(), date(2024, 3, 14));

        nav.next();
        assert_eq!(nav.selected_date(), date(2024, 4, 14));
        assert!(nav.can_go_back());
        assert!(nav.previous());
        assert!(!nav.can_go_back());
    }

    #[test]
    fn test_day_view_restores_last_chosen_date() {
        let mut nav = controller();
        nav.next();
        nav.next();
        nav.switch_granularity(Granularity::Week);
        nav.next();
        nav.switch_granularity(Granularity::Day);
        assert_eq!(nav.selected_date(), date(2024, 3, 16));
    }

    #[test]
    fn test_anchor_at_normalizes_week() {
        let mut nav = controller();
        nav.switch_granularity(Granularity::Week);
        nav.anchor_at(date(2024, 3, 21));
        assert_eq!(nav.selected_date(), date(2024, 3, 18));
    }

    #[test]
    fn test_busy_flag_and_stale_tickets() {
        let mut nav = controller();
        let ticket = nav.begin_rebuild().unwrap();
        assert!(nav.is_busy());
        assert!(matches!(nav.begin_rebuild(), Err(AppError::Busy)));

        nav.next();
        assert!(!nav.finish_rebuild(&ticket));
        assert!(!nav.is_busy());

        let ticket = nav.begin_rebuild().unwrap();
        assert_eq!(ticket.state().selected_date, date(2024, 3, 15));
        assert!(nav.finish_rebuild(&ticket));
    }

    #[test]
    fn test_invalidate_keeps_view_state() {
        let mut nav = controller();
        let ticket = nav.begin_rebuild().unwrap();
        nav.invalidate();
        assert!(!nav.finish_rebuild(&ticket));
        assert_eq!(nav.view_state(), *ticket.state());
    }

    #[test]
    fn test_workflow_mode_change_invalidates_tickets() {
        let mut nav = NavigationController::new(
            date(2024, 3, 14),
            WorkflowMode::Reschedule { appointment_id: 42 },
        );
        let ticket = nav.begin_rebuild().unwrap();
        nav.set_workflow_mode(WorkflowMode::CreateNew);
        assert!(!nav.finish_rebuild(&ticket));
        assert_eq!(nav.view_state().workflow_mode, WorkflowMode::CreateNew);
    }
}
