use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveTime;
use serde::Serialize;

use super::entry::{Day, Entry, hhmm};

/// Two entries on the same day whose `[start, end)` ranges overlap.
///
/// `entry_ids` is sorted so the pair is unordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Clash {
    pub day: Day,
    pub entry_ids: [String; 2],
    #[serde(serialize_with = "hhmm::serialize")]
    pub overlap_start: NaiveTime,
    #[serde(serialize_with = "hhmm::serialize")]
    pub overlap_end: NaiveTime,
}

impl Clash {
    pub fn between(a: &Entry, b: &Entry) -> Option<Clash> {
        if a.id() == b.id() || !overlaps(a, b) {
            return None;
        }
        let entry_ids = if a.id() < b.id() {
            [a.id().to_string(), b.id().to_string()]
        } else {
            [b.id().to_string(), a.id().to_string()]
        };
        Some(Clash {
            day: a.day(),
            entry_ids,
            overlap_start: a.start_time().max(b.start_time()),
            overlap_end: a.end_time().min(b.end_time()),
        })
    }

    pub fn involves(&self, entry_id: &str) -> bool {
        self.entry_ids.iter().any(|id| id == entry_id)
    }

    pub fn is_pair(&self, a: &str, b: &str) -> bool {
        self.involves(a) && self.involves(b) && a != b
    }
}

/// Half-open overlap test: an entry ending at 10:00 does not clash with one
/// starting at 10:00.
pub fn overlaps(a: &Entry, b: &Entry) -> bool {
    a.day() == b.day() && a.start_time() < b.end_time() && b.start_time() < a.end_time()
}

/// Every current clash of a timetable, ordered by day then entry ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClashSet(BTreeSet<Clash>);

impl ClashSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clash> {
        self.0.iter()
    }

    pub fn contains_pair(&self, a: &str, b: &str) -> bool {
        self.0.iter().any(|clash| clash.is_pair(a, b))
    }

    pub fn involving<'a>(&'a self, entry_id: &'a str) -> impl Iterator<Item = &'a Clash> {
        self.0.iter().filter(move |clash| clash.involves(entry_id))
    }

    pub fn is_superset(&self, other: &ClashSet) -> bool {
        self.0.is_superset(&other.0)
    }
}

impl FromIterator<Clash> for ClashSet {
    fn from_iter<I: IntoIterator<Item = Clash>>(iter: I) -> Self {
        ClashSet(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ClashSet {
    type Item = &'a Clash;
    type IntoIter = std::collections::btree_set::Iter<'a, Clash>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Recomputes the full clash set from scratch.
///
/// Entries are bucketed by day and compared pairwise inside each bucket, so
/// three mutually overlapping entries yield three separate clashes.
pub fn detect_clashes(entries: &[Entry]) -> ClashSet {
    let mut by_day: BTreeMap<Day, Vec<&Entry>> = BTreeMap::new();
    for entry in entries {
        by_day.entry(entry.day()).or_default().push(entry);
    }

    let mut clashes = BTreeSet::new();
    for bucket in by_day.values() {
        for (i, a) in bucket.iter().enumerate() {
            for b in &bucket[i + 1..] {
                if let Some(clash) = Clash::between(a, b) {
                    clashes.insert(clash);
                }
            }
        }
    }
    ClashSet(clashes)
}
