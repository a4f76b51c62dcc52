//! Timetable conflict engine.
//!
//! A [`Timetable`] holds one owner's class entries and keeps the set of
//! same-day overlaps up to date after every add or delete. The engine does
//! no I/O; persistence and per-owner locking live in
//! [`crate::services::TimetableService`].

pub mod clash;
pub mod entry;
pub mod error;

use serde::Serialize;
use uuid::Uuid;

pub use clash::{Clash, ClashSet, detect_clashes, overlaps};
pub use entry::{CourseRef, Day, Entry, EntryType, NewEntry, parse_clock_time};
pub use error::TimetableError;

#[derive(Debug, Clone, Serialize)]
pub struct Timetable {
    owner: String,
    entries: Vec<Entry>,
    #[serde(skip)]
    clashes: ClashSet,
}

/// Entries of one day, ordered by start time.
#[derive(Debug, Clone, Serialize)]
pub struct DaySchedule {
    pub day: Day,
    pub entries: Vec<Entry>,
}

impl Timetable {
    pub fn new<S: Into<String>>(owner: S) -> Self {
        Self {
            owner: owner.into(),
            entries: Vec::new(),
            clashes: ClashSet::default(),
        }
    }

    /// Rebuilds a timetable from stored entries, in their stored order.
    pub fn from_entries<S: Into<String>>(owner: S, entries: Vec<Entry>) -> Self {
        let clashes = detect_clashes(&entries);
        Self {
            owner: owner.into(),
            entries,
            clashes,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, entry_id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id() == entry_id)
    }

    /// Validates and appends a new entry, returning it with the recomputed
    /// clash set. Clashing entries are accepted; the clash is only reported.
    pub fn add_entry(&mut self, new: NewEntry) -> Result<(Entry, ClashSet), TimetableError> {
        let entry = new.into_entry(Uuid::new_v4().to_string())?;
        self.entries.push(entry.clone());
        self.clashes = detect_clashes(&self.entries);
        Ok((entry, self.clashes.clone()))
    }

    pub fn delete_entry(&mut self, entry_id: &str) -> Result<Entry, TimetableError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id() == entry_id)
            .ok_or_else(|| TimetableError::not_found(format!("entry {}", entry_id)))?;
        let removed = self.entries.remove(index);
        self.clashes = detect_clashes(&self.entries);
        Ok(removed)
    }

    pub fn clashes(&self) -> &ClashSet {
        &self.clashes
    }

    pub fn entries_for_day(&self, day: Day) -> impl Iterator<Item = &Entry> + Clone {
        self.entries.iter().filter(move |e| e.day() == day)
    }

    pub fn week(&self) -> Vec<DaySchedule> {
        Day::ALL
            .into_iter()
            .filter_map(|day| {
                let mut entries: Vec<Entry> = self.entries_for_day(day).cloned().collect();
                if entries.is_empty() {
                    return None;
                }
                entries.sort_by_key(|e| (e.start_time(), e.end_time()));
                Some(DaySchedule { day, entries })
            })
            .collect()
    }
}
