//! Calendar view models (granularity, view state, day cells)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{reservation::Reservation, slot::ClassifiedSlot, workflow::WorkflowMode};

/// Calendar view scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Granularity::Day => "Day",
            Granularity::Week => "Week",
            Granularity::Month => "Month",
        };
        write!(f, "{}", label)
    }
}

/// What the scheduling session is currently showing and doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub granularity: Granularity,
    pub selected_date: NaiveDate,
    pub workflow_mode: WorkflowMode,
}

/// A day cell in the week or month view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    /// None for month-view padding cells
    pub date: Option<NaiveDate>,
    pub day_number: Option<u32>,
    pub day_name: String,
    pub is_past: bool,
    pub is_today: bool,
    pub is_blank: bool,
    pub has_reservations: bool,
    pub reservations: Vec<Reservation>,
    /// Only filled in the week view
    pub slots: Vec<ClassifiedSlot>,
}

impl CalendarDay {
    /// Leading padding cell of the month grid. Flagged past so it never reacts to taps.
    pub fn blank() -> Self {
        Self {
            date: None,
            day_number: None,
            day_name: String::new(),
            is_past: true,
            is_today: false,
            is_blank: true,
            has_reservations: false,
            reservations: Vec::new(),
            slots: Vec::new(),
        }
    }
}

/// Month grid, Monday in column 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthView {
    /// "March 2024"
    pub title: String,
    pub weekday_header: Vec<String>,
    pub leading_blanks: usize,
    pub days: Vec<CalendarDay>,
}

/// Result of rebuilding the active view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AgendaView {
    Day {
        date: NaiveDate,
        slots: Vec<ClassifiedSlot>,
    },
    Week {
        days: Vec<CalendarDay>,
    },
    Month(MonthView),
}

impl AgendaView {
    pub fn granularity(&self) -> Granularity {
        match self {
            AgendaView::Day { .. } => Granularity::Day,
            AgendaView::Week { .. } => Granularity::Week,
            AgendaView::Month(_) => Granularity::Month,
        }
    }
}
