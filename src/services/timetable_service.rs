use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::models::NewEntryRequest;
use crate::services::CourseDirectory;
use crate::timetable::{ClashSet, CourseRef, Day, DaySchedule, Entry, NewEntry, Timetable};

type Slot = Arc<Mutex<Option<Timetable>>>;

/// Owns every owner's timetable.
///
/// Each owner has its own lock, so mutations on one timetable run one at a
/// time (clash recomputation and the store write included) while other
/// owners proceed independently. A mutation is applied to a copy that only
/// replaces the cached timetable once the store has committed.
pub struct TimetableService {
    db: SqlitePool,
    courses: Arc<dyn CourseDirectory>,
    owners: Mutex<HashMap<String, Slot>>,
}

#[derive(Debug, Clone)]
pub struct AddedEntry {
    pub entry: Entry,
    pub clashes: ClashSet,
    pub timetable: Timetable,
}

impl TimetableService {
    pub fn new(db: SqlitePool, courses: Arc<dyn CourseDirectory>) -> Self {
        Self {
            db,
            courses,
            owners: Mutex::new(HashMap::new()),
        }
    }

    async fn slot(&self, owner: &str) -> Slot {
        let mut owners = self.owners.lock().await;
        owners.entry(owner.to_string()).or_default().clone()
    }

    /// Drops the owner's slot when it holds no timetable and nobody else is
    /// using it, so unknown owners leave nothing behind.
    async fn release_if_absent(&self, owner: &str, slot: Slot) {
        let mut owners = self.owners.lock().await;
        let unused = owners.get(owner).is_some_and(|held| Arc::ptr_eq(held, &slot))
            && Arc::strong_count(&slot) == 2
            && slot.try_lock().is_ok_and(|cached| cached.is_none());
        if unused {
            owners.remove(owner);
        }
    }

    /// Number of owners currently holding a slot.
    pub async fn cached_owners(&self) -> usize {
        self.owners.lock().await.len()
    }

    async fn ensure_loaded(&self, owner: &str, cached: &mut Option<Timetable>) -> Result<(), AppError> {
        if cached.is_some() || !repository::timetable_exists(&self.db, owner).await? {
            return Ok(());
        }
        let entries = repository::fetch_entries(&self.db, owner).await?;
        debug!("loaded timetable for {} ({} entries)", owner, entries.len());
        *cached = Some(Timetable::from_entries(owner, entries));
        Ok(())
    }

    fn missing_timetable(owner: &str) -> AppError {
        AppError::NotFound(format!("timetable for {}", owner))
    }

    async fn resolve_course(&self, course: &mut CourseRef) -> Result<(), AppError> {
        let id = course.id.trim();
        if id.is_empty() || !course.needs_display() {
            return Ok(());
        }
        if let Some(found) = self.courses.find_course(id).await? {
            if course.code.is_none() {
                course.code = Some(found.code);
            }
            if course.title.is_none() {
                course.title = Some(found.title);
            }
        }
        Ok(())
    }

    pub async fn timetable(&self, owner: &str) -> Result<Timetable, AppError> {
        let slot = self.slot(owner).await;
        let result = {
            let mut cached = slot.lock().await;
            self.load_locked(owner, &mut cached).await
        };
        self.release_if_absent(owner, slot).await;
        result
    }

    async fn load_locked(&self, owner: &str, cached: &mut Option<Timetable>) -> Result<Timetable, AppError> {
        self.ensure_loaded(owner, cached).await?;
        cached.clone().ok_or_else(|| Self::missing_timetable(owner))
    }

    /// Adds an entry, creating the owner's timetable on first use. Clashes
    /// are reported, never rejected.
    pub async fn add_entry(&self, owner: &str, req: NewEntryRequest) -> Result<AddedEntry, AppError> {
        let slot = self.slot(owner).await;
        let result = {
            let mut cached = slot.lock().await;
            self.add_entry_locked(owner, req, &mut cached).await
        };
        self.release_if_absent(owner, slot).await;
        result
    }

    async fn add_entry_locked(
        &self,
        owner: &str,
        req: NewEntryRequest,
        cached: &mut Option<Timetable>,
    ) -> Result<AddedEntry, AppError> {
        self.ensure_loaded(owner, cached).await?;

        let is_new = cached.is_none();
        let mut next = cached.clone().unwrap_or_else(|| Timetable::new(owner));

        let mut new_entry = NewEntry::from(req);
        self.resolve_course(&mut new_entry.course).await?;
        let (entry, clashes) = next.add_entry(new_entry)?;

        let mut tx = self.db.begin().await?;
        if is_new {
            repository::insert_timetable(&mut *tx, owner).await?;
        }
        repository::insert_entry(&mut *tx, owner, &entry).await?;
        tx.commit().await?;

        info!(
            "added {} {} {}-{} for {}",
            entry.course().id,
            entry.day(),
            entry.start_time().format("%H:%M"),
            entry.end_time().format("%H:%M"),
            owner
        );
        let involving = clashes.involving(entry.id()).count();
        if involving > 0 {
            warn!("entry {} clashes with {} other entries", entry.id(), involving);
        }

        *cached = Some(next.clone());
        Ok(AddedEntry {
            entry,
            clashes,
            timetable: next,
        })
    }

    pub async fn delete_entry(&self, owner: &str, entry_id: &str) -> Result<Timetable, AppError> {
        let slot = self.slot(owner).await;
        let result = {
            let mut cached = slot.lock().await;
            self.delete_entry_locked(owner, entry_id, &mut cached).await
        };
        self.release_if_absent(owner, slot).await;
        result
    }

    async fn delete_entry_locked(
        &self,
        owner: &str,
        entry_id: &str,
        cached: &mut Option<Timetable>,
    ) -> Result<Timetable, AppError> {
        let mut next = self.load_locked(owner, cached).await?;
        next.delete_entry(entry_id)?;

        if !repository::delete_entry(&self.db, owner, entry_id).await? {
            warn!("entry {} was cached but missing from the store", entry_id);
        }
        info!("deleted entry {} for {}", entry_id, owner);

        *cached = Some(next.clone());
        Ok(next)
    }

    pub async fn clashes(&self, owner: &str) -> Result<ClashSet, AppError> {
        Ok(self.timetable(owner).await?.clashes().clone())
    }

    pub async fn entries_for_day(&self, owner: &str, day: &str) -> Result<Vec<Entry>, AppError> {
        let day: Day = day.parse()?;
        let timetable = self.timetable(owner).await?;
        Ok(timetable.entries_for_day(day).cloned().collect())
    }

    pub async fn week(&self, owner: &str) -> Result<Vec<DaySchedule>, AppError> {
        Ok(self.timetable(owner).await?.week())
    }
}
