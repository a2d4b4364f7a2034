//! To-do tasks

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Identifies a task for its whole lifetime, whichever partition it currently lives in.
///
/// Ids are derived from the wall clock (milliseconds since the Unix epoch), but are always forced above the previous id,
/// so that two tasks created within the same millisecond still get distinct ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// The id carried by tasks decoded from documents that had no id.
    /// A [`TaskStore`](crate::store::TaskStore) replaces it when it adopts such tasks.
    pub const UNASSIGNED: TaskId = TaskId(0);

    /// Generate an id from the current time, that is strictly greater than `previous`
    pub fn from_clock(previous: Option<TaskId>) -> Self {
        let now = Utc::now().timestamp_millis().max(1) as u64;
        match previous {
            Some(prev) if prev.0 >= now => Self(prev.0.saturating_add(1)),
            _ => Self(now),
        }
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn is_assigned(&self) -> bool {
        *self != Self::UNASSIGNED
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}


/// A to-do task
///
/// Its fields never change once it has been created. Completing or restoring a task only moves it between the partitions of a store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier (missing in documents written by the earliest versions of the app)
    #[serde(default)]
    id: TaskId,

    /// What has to be done
    text: String,
    /// Free-form details
    #[serde(default)]
    notes: String,

    #[serde(with = "lenient_time")]
    start_time: NaiveTime,
    #[serde(with = "lenient_time")]
    end_time: NaiveTime,
    /// When the task is due. Only the date part matters to the calendar view, but the picker also sets a time
    #[serde(with = "lenient_due_date")]
    due_date: NaiveDateTime,
}

impl Task {
    /// Create a new Task instance.
    ///
    /// This does not check the text is non-blank: use [`TaskStore::add`](crate::store::TaskStore::add) to create tasks from user input.
    pub fn new_with_parameters(id: TaskId, text: String, notes: String,
                               start_time: NaiveTime, end_time: NaiveTime, due_date: NaiveDateTime) -> Self
    {
        Self {
            id,
            text,
            notes,
            start_time,
            end_time,
            due_date,
        }
    }

    pub fn id(&self) -> TaskId                  { self.id           }
    pub fn text(&self) -> &str                  { &self.text        }
    pub fn notes(&self) -> &str                 { &self.notes       }
    pub fn start_time(&self) -> NaiveTime       { self.start_time   }
    pub fn end_time(&self) -> NaiveTime         { self.end_time     }
    pub fn due_date(&self) -> NaiveDateTime     { self.due_date     }

    /// The calendar day this task is due, regardless of the time of day
    pub fn due_day(&self) -> NaiveDate {
        self.due_date.date()
    }

    /// Used when a store adopts a task whose id is missing or already taken
    pub(crate) fn with_id(mut self, id: TaskId) -> Self {
        self.id = id;
        self
    }
}


const TIME_FORMAT: &str = "%H:%M:%S";
const DUE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const TIME_INPUT_FORMATS: &[&str] = &[
    "%H:%M:%S",
    "%H:%M",
    // toLocaleTimeString() in an en-US locale
    "%I:%M:%S %p",
    "%I:%M %p",
];

const DATE_TIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    // toDateString(), e.g. "Tue Mar 05 2024"
    "%a %b %d %Y",
    // the date picker display format
    "%m/%d/%Y",
];

/// Browsers may separate the time from the AM/PM marker with non-breaking spaces
fn normalize_spaces(input: &str) -> String {
    input.trim()
        .replace('\u{202f}', " ")
        .replace('\u{a0}', " ")
}

/// Parse a time of day, either as `HH:MM[:SS]` or in the 12-hour `H:MM[:SS] AM` form
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let input = normalize_spaces(input).to_uppercase();
    TIME_INPUT_FORMATS.iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&input, fmt).ok())
}

/// Parse a due date, with or without a time of day.
///
/// Offsets of RFC 3339 timestamps are dropped: the local wall-clock date and time are kept as written.
/// A bare date is due at midnight.
pub fn parse_due_date(input: &str) -> Option<NaiveDateTime> {
    let input = normalize_spaces(input);

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&input) {
        return Some(dt.naive_local());
    }
    if let Some(dt) = DATE_TIME_INPUT_FORMATS.iter().find_map(|fmt| NaiveDateTime::parse_from_str(&input, fmt).ok()) {
        return Some(dt);
    }
    DATE_INPUT_FORMATS.iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&input, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

mod lenient_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(super::TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_time(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time of day {:?}", s)))
    }
}

mod lenient_due_date {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(super::DUE_DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_due_date(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid due date {:?}", s)))
    }
}
