//! Month arithmetic and the calendar view projection
//!
//! A month view is a grid of [`DayCell`]s, starting on a Sunday: the 1st of the month is preceded by as many padding cells as
//! its weekday index (0 for Sunday). Tasks are bucketed by the calendar date they are due, whatever their time of day.

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::iter::FusedIterator;

use chrono::{Datelike, Local, NaiveDate};

use crate::error::CalendarError;
use crate::task::Task;

/// Count of columns in a month view
pub const DAYS_PER_WEEK: usize = 7;

/// A month of a given year
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month {
    /// Always the 1st of the month
    first: NaiveDate,
}

impl Month {
    /// `month` ranges from 1 (January) to 12 (December)
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or(CalendarError::InvalidMonth { year, month })
    }

    /// The month a date belongs to
    pub fn containing(date: NaiveDate) -> Self {
        Self { first: date.with_day(1).unwrap_or(date) }
    }

    /// The current month, according to the local clock
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 { self.first.year() }
    pub fn month(&self) -> u32 { self.first.month() }
    pub fn first_day(&self) -> NaiveDate { self.first }

    pub fn days_in_month(&self) -> u32 {
        match self.month() {
            2 => if NaiveDate::from_ymd_opt(self.year(), 2, 29).is_some() { 29 } else { 28 },
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// Weekday index of the 1st of the month, 0 being Sunday
    pub fn first_weekday(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    /// The date of a given day of this month, if this day exists
    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        self.first.with_day(day)
    }

    /// See [`days_in_grid`]
    pub fn days_in_grid(&self) -> DayGrid {
        days_in_grid(*self)
    }

    /// See [`change_month`]
    pub fn shifted(&self, delta: i32) -> Self {
        change_month(*self, delta)
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first.format("%B %Y"))
    }
}


/// One position of a month view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DayCell {
    /// Empty cell, before the 1st or after the last day of the month
    Padding,
    /// A day of the month, starting at 1
    Day(u32),
}

impl DayCell {
    pub fn day(&self) -> Option<u32> {
        match self {
            DayCell::Padding => None,
            DayCell::Day(d) => Some(*d),
        }
    }
}

/// The cells of a month view: leading padding, then every day of the month.
///
/// This is computed lazily. Clone it (or call [`DayGrid::restart`]) to iterate again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayGrid {
    padding: u32,
    days: u32,
    position: u32,
}

impl DayGrid {
    /// A grid positioned on its first cell
    pub fn restart(&self) -> Self {
        Self { position: 0, ..self.clone() }
    }

    /// The whole grid, as rows of 7 cells. The last row is completed with padding cells
    pub fn weeks(&self) -> Vec<[DayCell; DAYS_PER_WEEK]> {
        let mut weeks = Vec::new();
        let mut row = [DayCell::Padding; DAYS_PER_WEEK];
        let mut column = 0;

        for cell in self.restart() {
            row[column] = cell;
            column += 1;
            if column == DAYS_PER_WEEK {
                weeks.push(row);
                row = [DayCell::Padding; DAYS_PER_WEEK];
                column = 0;
            }
        }
        if column > 0 {
            weeks.push(row);
        }
        weeks
    }
}

impl Iterator for DayGrid {
    type Item = DayCell;

    fn next(&mut self) -> Option<DayCell> {
        let cell = if self.position < self.padding {
            DayCell::Padding
        } else if self.position < self.padding + self.days {
            DayCell::Day(self.position - self.padding + 1)
        } else {
            return None;
        };
        self.position += 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.padding + self.days).saturating_sub(self.position) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DayGrid {}
impl FusedIterator for DayGrid {}


/// The cells of the view of a month
pub fn days_in_grid(month: Month) -> DayGrid {
    DayGrid {
        padding: month.first_weekday(),
        days: month.days_in_month(),
        position: 0,
    }
}

/// The tasks due on a given day of a month.
///
/// Only calendar dates are compared: the time of day the tasks are due does not matter.
pub fn tasks_on_day<'a>(day: u32, month: Month, tasks: &'a [Task]) -> impl Iterator<Item = &'a Task> + 'a {
    let target = month.date(day);
    tasks.iter()
        .filter(move |task| target == Some(task.due_day()))
}

/// The tasks due during a month, keyed by day of the month
pub fn tasks_by_day(month: Month, tasks: &[Task]) -> BTreeMap<u32, Vec<&Task>> {
    let mut buckets: BTreeMap<u32, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        if Month::containing(task.due_day()) == month {
            buckets.entry(task.due_day().day()).or_default().push(task);
        }
    }
    buckets
}

/// Move forward (or backwards, for negative values) by `delta` whole months.
///
/// Moving past the range of representable dates leaves the month unchanged.
pub fn change_month(current: Month, delta: i32) -> Month {
    let index = current.year() as i64 * 12 + (current.month() as i64 - 1) + delta as i64;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;

    let shifted = i32::try_from(year).ok()
        .and_then(|year| Month::new(year, month).ok());
    match shifted {
        Some(m) => m,
        None => {
            log::warn!("Unable to move {} months away from {}", delta, current);
            current
        }
    }
}
