use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db::repository;
use crate::error::AppError;
use crate::models::Course;

/// Resolves course references to display fields.
#[async_trait]
pub trait CourseDirectory: Send + Sync {
    async fn find_course(&self, id: &str) -> Result<Option<Course>, AppError>;
}

pub struct SqliteCourseDirectory {
    db: SqlitePool,
}

impl SqliteCourseDirectory {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseDirectory for SqliteCourseDirectory {
    async fn find_course(&self, id: &str) -> Result<Option<Course>, AppError> {
        Ok(repository::find_course_by_id(&self.db, id).await?)
    }
}

/// Directory that knows no courses; references stay opaque.
pub struct NoopCourseDirectory;

#[async_trait]
impl CourseDirectory for NoopCourseDirectory {
    async fn find_course(&self, _id: &str) -> Result<Option<Course>, AppError> {
        Ok(None)
    }
}
