use serde::{Deserialize, Serialize};

use crate::timetable::{ClashSet, CourseRef, Entry, NewEntry, Timetable};

/// Body of `POST /timetable/entries`.
///
/// Fields default to empty so missing values surface as validation errors
/// naming the field rather than as JSON rejections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEntryRequest {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub course_id: String,
    pub course_code: Option<String>,
    pub course_title: Option<String>,
    #[serde(default)]
    pub room: String,
    #[serde(default, rename = "type")]
    pub entry_type: String,
}

impl From<NewEntryRequest> for NewEntry {
    fn from(req: NewEntryRequest) -> Self {
        NewEntry {
            day: req.day,
            start_time: req.start_time,
            end_time: req.end_time,
            course: CourseRef {
                id: req.course_id,
                code: req.course_code,
                title: req.course_title,
            },
            room: req.room,
            entry_type: req.entry_type,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AddEntryResponse {
    pub entry: Entry,
    pub timetable: Timetable,
    /// Same value as `GET /timetable/clashes` right after the add; omitted
    /// when there are no clashes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clashes: Option<ClashSet>,
}
