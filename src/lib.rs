pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod timetable;

pub use error::AppError;
pub use state::AppState;
pub use timetable::{Clash, ClashSet, Day, Entry, EntryType, Timetable, TimetableError};
