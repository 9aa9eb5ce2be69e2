//! Classified booking slot model

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::reservation::Reservation;

/// The three states a slot reports to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotState {
    Past,
    Occupied,
    Available,
}

/// One 30-minute window of a business day, classified against the reservations of its date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedSlot {
    pub start: NaiveDateTime,
    /// Exclusive end of the window
    pub end: NaiveDateTime,
    pub is_past: bool,
    pub is_occupied: bool,
    pub reservation: Option<Reservation>,
}

impl ClassifiedSlot {
    pub fn is_available(&self) -> bool {
        !self.is_occupied && !self.is_past
    }

    /// Occupancy wins over the past flag
    pub fn state(&self) -> SlotState {
        if self.is_occupied {
            SlotState::Occupied
        } else if self.is_past {
            SlotState::Past
        } else {
            SlotState::Available
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// "08:30 - 09:00"
    pub fn label(&self) -> String {
        format!("{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}
