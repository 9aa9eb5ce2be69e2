//! Day, week and month view builders

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use futures::{stream, StreamExt, TryStreamExt};
use std::sync::Arc;

use crate::{
    backend::BookingBackend,
    error::AppResult,
    models::{AgendaView, CalendarDay, ClassifiedSlot, Granularity, MonthView, Reservation, ViewState},
    services::{clock::Clock, slots},
};

/// Monday of the week containing `date`
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    let diff = (7 + date.weekday().num_days_from_monday() - Weekday::Mon.num_days_from_monday()) % 7;
    date - Days::new(diff as u64)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.day0() as u64)
}

/// Padding cells needed so the first of the month lands in its weekday column
/// (Monday first)
pub fn leading_blanks(first_of_month: NaiveDate) -> usize {
    match first_of_month.weekday() {
        Weekday::Sun => 6,
        weekday => weekday.num_days_from_monday() as usize,
    }
}

/// Inclusive day range shown by the week view.
///
/// The current week starts at today; any other week starts on its Monday.
/// Weeks end on Saturday. `None` when nothing is left to show (today is Sunday).
pub fn week_range(selected: NaiveDate, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let week_monday = monday_of(selected);
    let start = if week_monday == monday_of(today) { today } else { week_monday };
    let end = week_monday + Days::new(5);

    if start > end {
        None
    } else {
        Some((start, end))
    }
}

fn day_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

/// Builds classified agenda views from backend reservations
#[derive(Clone)]
pub struct AgendaService {
    backend: Arc<dyn BookingBackend>,
    clock: Arc<dyn Clock>,
    week_fetch_concurrency: usize,
}

impl AgendaService {
    pub fn new(backend: Arc<dyn BookingBackend>, clock: Arc<dyn Clock>, week_fetch_concurrency: usize) -> Self {
        Self {
            backend,
            clock,
            week_fetch_concurrency: week_fetch_concurrency.max(1),
        }
    }

    /// Build the view matching `state.granularity`
    pub async fn build(&self, state: &ViewState) -> AppResult<AgendaView> {
        match state.granularity {
            Granularity::Day => Ok(AgendaView::Day {
                date: state.selected_date,
                slots: self.build_day(state.selected_date).await?,
            }),
            Granularity::Week => Ok(AgendaView::Week {
                days: self.build_week(state.selected_date).await?,
            }),
            Granularity::Month => Ok(AgendaView::Month(self.build_month(state.selected_date))),
        }
    }

    /// Classified grid of one date, in chronological order
    pub async fn build_day(&self, date: NaiveDate) -> AppResult<Vec<ClassifiedSlot>> {
        let reservations = self.backend.get_reservations_for_date(date).await?;
        Ok(slots::classify_day(date, &reservations, self.clock.now()))
    }

    /// One day record per date from the week start through Saturday
    pub async fn build_week(&self, selected: NaiveDate) -> AppResult<Vec<CalendarDay>> {
        let today = self.clock.today();
        let Some((start, end)) = week_range(selected, today) else {
            return Ok(Vec::new());
        };

        let dates: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();
        let fetched = self.fetch_days(dates).await?;
        let now = self.clock.now();

        Ok(fetched
            .into_iter()
            .map(|(date, reservations)| CalendarDay {
                date: Some(date),
                day_number: Some(date.day()),
                day_name: day_name(date),
                is_past: date < today,
                is_today: date == today,
                is_blank: false,
                has_reservations: !reservations.is_empty(),
                slots: slots::classify_day(date, &reservations, now),
                reservations,
            })
            .collect())
    }

    /// Per-day fetches, in date order. Sequential unless a higher concurrency is configured.
    async fn fetch_days(&self, dates: Vec<NaiveDate>) -> AppResult<Vec<(NaiveDate, Vec<Reservation>)>> {
        if self.week_fetch_concurrency <= 1 {
            let mut fetched = Vec::with_capacity(dates.len());
            for date in dates {
                let reservations = self.backend.get_reservations_for_date(date).await?;
                fetched.push((date, reservations));
            }
            return Ok(fetched);
        }

        stream::iter(dates)
            .map(|date| {
                let backend = Arc::clone(&self.backend);
                async move {
                    let reservations = backend.get_reservations_for_date(date).await?;
                    Ok::<_, crate::error::AppError>((date, reservations))
                }
            })
            .buffered(self.week_fetch_concurrency)
            .try_collect()
            .await
    }

    /// Padded month grid. No reservations are fetched at this granularity.
    pub fn build_month(&self, selected: NaiveDate) -> MonthView {
        let today = self.clock.today();
        let first = first_of_month(selected);
        let last = first + Months::new(1) - Days::new(1);
        let blanks = leading_blanks(first);

        let mut days: Vec<CalendarDay> = (0..blanks).map(|_| CalendarDay::blank()).collect();
        days.extend(first.iter_days().take_while(|d| *d <= last).map(|date| CalendarDay {
            date: Some(date),
            day_number: Some(date.day()),
            day_name: day_name(date),
            is_past: date < today,
            is_today: date == today,
            is_blank: false,
            has_reservations: false,
            reservations: Vec::new(),
            slots: Vec::new(),
        }));

        let weekday_header = monday_of(first)
            .iter_days()
            .take(7)
            .map(|d| d.format("%a").to_string())
            .collect();

        MonthView {
            title: first.format("%B %Y").to_string(),
            weekday_header,
            leading_blanks: blanks,
            days,
        }
    }
}
