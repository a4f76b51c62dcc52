pub mod course_directory;
pub mod timetable_service;

pub use course_directory::{CourseDirectory, NoopCourseDirectory, SqliteCourseDirectory};
pub use timetable_service::{AddedEntry, TimetableService};
