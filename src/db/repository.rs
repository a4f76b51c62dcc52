use chrono::Utc;
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use tracing::error;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Course, NewCourseRequest};
use crate::timetable::{CourseRef, Entry, NewEntry};

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, code, title, instructor, updated_at FROM courses ORDER BY code ASC"
    )
    .fetch_all(db)
    .await
}

pub async fn insert_course(
    db: &SqlitePool,
    req: NewCourseRequest,
) -> Result<Course, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO courses (id, code, title, instructor, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&id)
    .bind(&req.code)
    .bind(&req.title)
    .bind(&req.instructor)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Course {
        id,
        code: req.code,
        title: req.title,
        instructor: req.instructor,
        updated_at: now,
    })
}

pub async fn find_course_by_id(db: &SqlitePool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, code, title, instructor, updated_at FROM courses WHERE id = ?"
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn timetable_exists(db: &SqlitePool, owner: &str) -> Result<bool, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as("SELECT owner_id FROM timetables WHERE owner_id = ?")
        .bind(owner)
        .fetch_optional(db)
        .await?;
    Ok(row.is_some())
}

pub async fn insert_timetable<'e, E>(db: E, owner: &str) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = Utc::now().to_rfc3339();
    sqlx::query("INSERT INTO timetables (owner_id, created_at) VALUES (?1, ?2)")
        .bind(owner)
        .bind(now)
        .execute(db)
        .await?;
    Ok(())
}

#[derive(Debug, FromRow)]
struct EntryRow {
    id: String,
    day: String,
    start_time: String,
    end_time: String,
    course_id: String,
    course_code: Option<String>,
    course_title: Option<String>,
    room: String,
    entry_type: String,
}

impl EntryRow {
    fn into_entry(self) -> Result<Entry, AppError> {
        let id = self.id.clone();
        NewEntry {
            day: self.day,
            start_time: self.start_time,
            end_time: self.end_time,
            course: CourseRef {
                id: self.course_id,
                code: self.course_code,
                title: self.course_title,
            },
            room: self.room,
            entry_type: self.entry_type,
        }
        .into_entry(self.id)
        .map_err(|e| {
            error!("stored entry {} is invalid: {}", id, e);
            AppError::InternalServerError
        })
    }
}

/// Entries of one owner in insertion order.
pub async fn fetch_entries(db: &SqlitePool, owner: &str) -> Result<Vec<Entry>, AppError> {
    let rows = sqlx::query_as::<_, EntryRow>(
        r#"
        SELECT id, day, start_time, end_time, course_id, course_code, course_title, room, entry_type
        FROM timetable_entries
        WHERE owner_id = ?
        ORDER BY rowid ASC
        "#,
    )
    .bind(owner)
    .fetch_all(db)
    .await?;

    rows.into_iter().map(EntryRow::into_entry).collect()
}

pub async fn insert_entry<'e, E>(db: E, owner: &str, entry: &Entry) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = Utc::now().to_rfc3339();
    let course = entry.course();

    sqlx::query(
        r#"
        INSERT INTO timetable_entries
            (id, owner_id, day, start_time, end_time, course_id, course_code, course_title,
            room, entry_type, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(entry.id())
    .bind(owner)
    .bind(entry.day().as_str())
    .bind(entry.start_time().format("%H:%M").to_string())
    .bind(entry.end_time().format("%H:%M").to_string())
    .bind(&course.id)
    .bind(&course.code)
    .bind(&course.title)
    .bind(entry.room())
    .bind(entry.entry_type().as_str())
    .bind(now)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn delete_entry<'e, E>(db: E, owner: &str, id: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM timetable_entries WHERE owner_id = ?1 AND id = ?2")
        .bind(owner)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
