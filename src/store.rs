use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Flow, NewPeriodEntry, PeriodEntry};

/// Source of a user's period entries. Reads return entries oldest first.
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn list_entries(&self, user_id: Uuid) -> Result<Vec<PeriodEntry>, AppError>;

    async fn create_entry(
        &self,
        user_id: Uuid,
        entry: NewPeriodEntry,
    ) -> Result<PeriodEntry, AppError>;

    /// Returns `false` when the user has no entry with that id.
    async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> Result<bool, AppError>;
}

pub type SharedStore = Arc<dyn EntryStore>;

fn validate(entry: &NewPeriodEntry) -> Result<(), AppError> {
    match entry.end_date {
        Some(end) if end < entry.start_date => Err(AppError::BadRequest(
            "endDate must not be before startDate".into(),
        )),
        _ => Ok(()),
    }
}

pub struct PgEntryStore {
    pool: PgPool,
}

impl PgEntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PeriodEntryRow {
    id: Uuid,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    flow: String,
    symptoms: Vec<String>,
    notes: Option<String>,
}

impl PeriodEntryRow {
    fn into_entry(self) -> Option<PeriodEntry> {
        let flow = match self.flow.parse::<Flow>() {
            Ok(flow) => flow,
            Err(e) => {
                tracing::warn!("⚠️ Skipping entry {}: {}", self.id, e);
                return None;
            }
        };

        Some(PeriodEntry {
            id: self.id,
            start_date: self.start_date,
            end_date: self.end_date,
            flow,
            symptoms: self
                .symptoms
                .iter()
                .filter_map(|tag| tag.parse().ok())
                .collect(),
            notes: self.notes,
        })
    }
}

const ENTRY_COLUMNS: &str = "id, start_date, end_date, flow, symptoms, notes";

#[async_trait]
impl EntryStore for PgEntryStore {
    async fn list_entries(&self, user_id: Uuid) -> Result<Vec<PeriodEntry>, AppError> {
        let rows = sqlx::query_as::<_, PeriodEntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM period_entries WHERE user_id = $1 ORDER BY start_date ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(PeriodEntryRow::into_entry).collect())
    }

    async fn create_entry(
        &self,
        user_id: Uuid,
        entry: NewPeriodEntry,
    ) -> Result<PeriodEntry, AppError> {
        validate(&entry)?;

        let symptoms: Vec<String> = entry.symptoms.iter().map(|s| s.to_string()).collect();
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO period_entries (user_id, start_date, end_date, flow, symptoms, notes)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(user_id)
        .bind(entry.start_date)
        .bind(entry.end_date)
        .bind(entry.flow.as_str())
        .bind(symptoms)
        .bind(entry.notes.clone())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                tracing::error!("❌ DB insert failed: {}", db_err.message());

                if let Some(constraint) = db_err.constraint() {
                    tracing::info!("🔒 Constraint violated: {}", constraint);
                }

                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "an entry starting on {} already exists",
                        entry.start_date
                    ));
                }
            }
            AppError::Store(e)
        })?;

        Ok(PeriodEntry {
            id,
            start_date: entry.start_date,
            end_date: entry.end_date,
            flow: entry.flow,
            symptoms: entry.symptoms,
            notes: entry.notes,
        })
    }

    async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM period_entries WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(entry_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Process-local store used when no database is configured.
#[derive(Default)]
pub struct MemoryEntryStore {
    entries: RwLock<HashMap<Uuid, Vec<PeriodEntry>>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn list_entries(&self, user_id: Uuid) -> Result<Vec<PeriodEntry>, AppError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut list = entries.get(&user_id).cloned().unwrap_or_default();
        list.sort_by_key(|e| e.start_date);
        Ok(list)
    }

    async fn create_entry(
        &self,
        user_id: Uuid,
        entry: NewPeriodEntry,
    ) -> Result<PeriodEntry, AppError> {
        validate(&entry)?;

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let user_entries = entries.entry(user_id).or_default();

        if user_entries.iter().any(|e| e.start_date == entry.start_date) {
            return Err(AppError::Conflict(format!(
                "an entry starting on {} already exists",
                entry.start_date
            )));
        }

        let created = PeriodEntry {
            id: Uuid::new_v4(),
            start_date: entry.start_date,
            end_date: entry.end_date,
            flow: entry.flow,
            symptoms: entry.symptoms,
            notes: entry.notes,
        };
        user_entries.push(created.clone());
        Ok(created)
    }

    async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> Result<bool, AppError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let Some(user_entries) = entries.get_mut(&user_id) else {
            return Ok(false);
        };

        let before = user_entries.len();
        user_entries.retain(|e| e.id != entry_id);
        Ok(user_entries.len() < before)
    }
}
