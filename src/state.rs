use std::sync::Arc;

use sqlx::SqlitePool;

use crate::services::{SqliteCourseDirectory, TimetableService};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub timetables: Arc<TimetableService>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        let courses = Arc::new(SqliteCourseDirectory::new(db.clone()));
        let timetables = Arc::new(TimetableService::new(db.clone(), courses));
        Self { db, timetables }
    }
}
