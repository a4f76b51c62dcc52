use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::error::TimetableError;

/// Teaching days. Sunday is not a valid timetable day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.is_empty() {
            return Err(TimetableError::validation("day", "day is required"));
        }
        Day::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                TimetableError::validation(
                    "day",
                    format!("'{}' is not a timetable day (Monday to Saturday)", wanted),
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Lecture,
    Lab,
    Tutorial,
    Seminar,
}

impl EntryType {
    pub const ALL: [EntryType; 4] = [
        EntryType::Lecture,
        EntryType::Lab,
        EntryType::Tutorial,
        EntryType::Seminar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Lecture => "lecture",
            EntryType::Lab => "lab",
            EntryType::Tutorial => "tutorial",
            EntryType::Seminar => "seminar",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.is_empty() {
            return Err(TimetableError::validation("type", "type is required"));
        }
        EntryType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                TimetableError::validation(
                    "type",
                    format!(
                        "'{}' is not one of lecture, lab, tutorial or seminar",
                        wanted
                    ),
                )
            })
    }
}

/// Reference to a course owned by the course directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRef {
    pub id: String,
    pub code: Option<String>,
    pub title: Option<String>,
}

impl CourseRef {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            code: None,
            title: None,
        }
    }

    pub fn with_display<C: Into<String>, T: Into<String>>(mut self, code: C, title: T) -> Self {
        self.code = Some(code.into());
        self.title = Some(title.into());
        self
    }

    pub fn needs_display(&self) -> bool {
        self.code.is_none() || self.title.is_none()
    }
}

/// One scheduled class occurrence.
///
/// Only constructed through [`NewEntry::into_entry`], so every `Entry` has a
/// valid day and type and `start_time < end_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    id: String,
    day: Day,
    #[serde(serialize_with = "hhmm::serialize")]
    start_time: NaiveTime,
    #[serde(serialize_with = "hhmm::serialize")]
    end_time: NaiveTime,
    course: CourseRef,
    room: String,
    #[serde(rename = "type")]
    entry_type: EntryType,
}

impl Entry {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn day(&self) -> Day {
        self.day
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn course(&self) -> &CourseRef {
        &self.course
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }
}

/// Unvalidated entry fields as supplied by a caller.
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub course: CourseRef,
    pub room: String,
    pub entry_type: String,
}

impl NewEntry {
    /// Validates every field and builds an [`Entry`] carrying `id`.
    pub fn into_entry(self, id: String) -> Result<Entry, TimetableError> {
        let day: Day = self.day.parse()?;
        let start_time = parse_clock_time("start_time", &self.start_time)?;
        let end_time = parse_clock_time("end_time", &self.end_time)?;
        if start_time >= end_time {
            return Err(TimetableError::validation(
                "end_time",
                format!(
                    "end time {} must be after start time {}",
                    end_time.format(hhmm::FORMAT),
                    start_time.format(hhmm::FORMAT)
                ),
            ));
        }

        let course_id = self.course.id.trim();
        if course_id.is_empty() {
            return Err(TimetableError::validation("course_id", "course is required"));
        }
        let room = self.room.trim();
        if room.is_empty() {
            return Err(TimetableError::validation("room", "room is required"));
        }
        let entry_type: EntryType = self.entry_type.parse()?;

        Ok(Entry {
            id,
            day,
            start_time,
            end_time,
            course: CourseRef {
                id: course_id.to_string(),
                code: non_blank(self.course.code),
                title: non_blank(self.course.title),
            },
            room: room.to_string(),
            entry_type,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses `HH:MM` (or `HH:MM:SS` with zero seconds) on a 24-hour clock.
pub fn parse_clock_time(field: &'static str, raw: &str) -> Result<NaiveTime, TimetableError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TimetableError::validation(field, "time is required"));
    }
    let time = NaiveTime::parse_from_str(raw, hhmm::FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| {
            TimetableError::validation(field, format!("'{}' is not a valid HH:MM time", raw))
        })?;
    if time.second() != 0 || time.nanosecond() != 0 {
        return Err(TimetableError::validation(
            field,
            format!("'{}' must be a whole minute", raw),
        ));
    }
    Ok(time)
}

pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::Serializer;

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }
}
