pub mod course;
pub mod timetable;

pub use course::{Course, NewCourseRequest};
pub use timetable::{AddEntryResponse, NewEntryRequest};
