mod owner;

use axum::Json;
use axum::extract::Path;
use axum::extract::rejection::JsonRejection;
use axum::routing::{delete, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::db::repository;
use crate::error::AppError;
use crate::models::{AddEntryResponse, Course, NewCourseRequest, NewEntryRequest};
use crate::state::AppState;
use crate::timetable::{ClashSet, DaySchedule, Entry, Timetable};

pub use owner::{OWNER_HEADER, Owner};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route("/timetable", get(get_timetable))
        .route("/timetable/entries", post(add_entry))
        .route("/timetable/entries/{id}", delete(delete_entry))
        .route("/timetable/clashes", get(get_clashes))
        .route("/timetable/days/{day}", get(entries_for_day))
        .route("/timetable/week", get(week))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = repository::fetch_courses(&state.db).await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    body: Result<Json<NewCourseRequest>, JsonRejection>
) -> Result<(StatusCode, Json<Course>), AppError> {
    let Json(mut req) = body?;
    req.code = req.code.trim().to_string();
    req.title = req.title.trim().to_string();
    if req.code.is_empty() {
        return Err(AppError::Validation { field: "code", message: "code is required".to_string() });
    }
    if req.title.is_empty() {
        return Err(AppError::Validation { field: "title", message: "title is required".to_string() });
    }
    let course = repository::insert_course(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn get_timetable(
    State(state): State<AppState>,
    Owner(owner): Owner
) -> Result<Json<Timetable>, AppError> {
    let timetable = state.timetables.timetable(&owner).await?;
    Ok(Json(timetable))
}

async fn add_entry(
    State(state): State<AppState>,
    Owner(owner): Owner,
    body: Result<Json<NewEntryRequest>, JsonRejection>
) -> Result<(StatusCode, Json<AddEntryResponse>), AppError> {
    let Json(req) = body?;
    let added = state.timetables.add_entry(&owner, req).await?;
    let clashes = (!added.clashes.is_empty()).then_some(added.clashes);
    Ok((
        StatusCode::CREATED,
        Json(AddEntryResponse {
            entry: added.entry,
            timetable: added.timetable,
            clashes,
        }),
    ))
}

async fn delete_entry(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>
) -> Result<Json<Timetable>, AppError> {
    let timetable = state.timetables.delete_entry(&owner, &id).await?;
    Ok(Json(timetable))
}

async fn get_clashes(
    State(state): State<AppState>,
    Owner(owner): Owner
) -> Result<Json<ClashSet>, AppError> {
    let clashes = state.timetables.clashes(&owner).await?;
    Ok(Json(clashes))
}

async fn entries_for_day(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(day): Path<String>
) -> Result<Json<Vec<Entry>>, AppError> {
    let entries = state.timetables.entries_for_day(&owner, &day).await?;
    Ok(Json(entries))
}

async fn week(
    State(state): State<AppState>,
    Owner(owner): Owner
) -> Result<Json<Vec<DaySchedule>>, AppError> {
    let week = state.timetables.week(&owner).await?;
    Ok(Json(week))
}
