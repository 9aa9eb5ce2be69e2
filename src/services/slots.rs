//! Slot grid definition and slot classification
//!
//! A business day is a fixed grid of ten 30-minute windows starting at
//! 08:30, the last one starting at 13:00. Each window is classified against
//! the reservations fetched for its date.

use chrono::{Duration, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;

use crate::models::{ClassifiedSlot, Reservation};

/// Length of one booking window
pub const SLOT_MINUTES: i64 = 30;

/// Number of windows in a business day
pub const SLOTS_PER_DAY: usize = 10;

static SLOT_GRID: Lazy<Vec<NaiveTime>> = Lazy::new(|| {
    let first = NaiveTime::from_hms_opt(8, 30, 0).expect("08:30 is a valid time");
    (0..SLOTS_PER_DAY as i64)
        .map(|i| first + Duration::minutes(SLOT_MINUTES * i))
        .collect()
});

/// Ordered slot start times of a business day
pub fn definitions() -> &'static [NaiveTime] {
    &SLOT_GRID
}

pub fn slot_duration() -> Duration {
    Duration::minutes(SLOT_MINUTES)
}

/// Start of the grid window containing `time`, if it falls inside business hours
pub fn containing_slot(time: NaiveTime) -> Option<NaiveTime> {
    definitions()
        .iter()
        .copied()
        .find(|start| *start <= time && time < *start + slot_duration())
}

/// Classify one slot of `date` against the reservations of that date.
///
/// The first reservation whose time of day lies in `[start, end)` occupies the
/// slot. An occupied slot is never reported as past.
pub fn classify(
    date: NaiveDate,
    time_of_day: NaiveTime,
    reservations: &[Reservation],
    now: chrono::NaiveDateTime,
) -> ClassifiedSlot {
    let start = date.and_time(time_of_day);
    let end = start + slot_duration();

    let occupant = reservations.iter().find(|r| {
        let at = date.and_time(r.date_time.time());
        start <= at && at < end
    });

    match occupant {
        Some(reservation) => ClassifiedSlot {
            start,
            end,
            is_past: false,
            is_occupied: true,
            reservation: Some(reservation.clone()),
        },
        None => ClassifiedSlot {
            start,
            end,
            is_past: start < now,
            is_occupied: false,
            reservation: None,
        },
    }
}

/// Classify the whole grid of `date`, in chronological order
pub fn classify_day(
    date: NaiveDate,
    reservations: &[Reservation],
    now: chrono::NaiveDateTime,
) -> Vec<ClassifiedSlot> {
    definitions()
        .iter()
        .map(|time| classify(date, *time, reservations, now))
        .collect()
}
