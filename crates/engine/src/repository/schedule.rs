use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use uuid::Uuid;

use super::ScheduleStore;
use crate::Database;
use crate::error::{Result, StorageError};
use crate::models::{ScheduleTanding, ScheduleTgr};

const KIND_TANDING: &str = "tanding";
const KIND_TGR: &str = "tgr";

/// Repository for schedule entries of both kinds. Submission order is kept
/// by the `seq` column.
pub struct ScheduleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ScheduleRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<T: Serialize>(&self, kind: &str, id: Uuid, entry: &T) -> Result<()> {
        let document = serde_json::to_value(entry)?;

        sqlx::query(
            r#"
            INSERT INTO schedules (schedule_id, kind, document)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(kind)
        .bind(document)
        .execute(self.pool)
        .await
        .map_err(|e| match StorageError::from(e) {
            e if e.is_unique_violation() => {
                StorageError::ConstraintViolation("Schedule entry already exists".to_string())
            }
            e => e,
        })?;

        Ok(())
    }

    pub async fn find_by_id<T: DeserializeOwned>(&self, kind: &str, id: Uuid) -> Result<T> {
        let document: serde_json::Value = sqlx::query_scalar(
            r#"
            SELECT document
            FROM schedules
            WHERE schedule_id = $1 AND kind = $2
            "#,
        )
        .bind(id)
        .bind(kind)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(serde_json::from_value(document)?)
    }

    pub async fn list<T: DeserializeOwned>(&self, kind: &str) -> Result<Vec<T>> {
        let documents: Vec<serde_json::Value> = sqlx::query_scalar(
            r#"
            SELECT document
            FROM schedules
            WHERE kind = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(kind)
        .fetch_all(self.pool)
        .await?;

        documents
            .into_iter()
            .map(|d| serde_json::from_value(d).map_err(StorageError::from))
            .collect()
    }

    /// Rewrites a batch of entries in one transaction.
    pub async fn update_many<T: Serialize>(&self, kind: &str, entries: &[(Uuid, &T)]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for (id, entry) in entries {
            let document = serde_json::to_value(entry)?;
            let result = sqlx::query(
                r#"
                UPDATE schedules
                SET document = $3
                WHERE schedule_id = $1 AND kind = $2
                "#,
            )
            .bind(*id)
            .bind(kind)
            .bind(document)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(StorageError::NotFound);
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for Database {
    async fn insert_tanding(&self, entry: &ScheduleTanding) -> Result<()> {
        ScheduleRepository::new(self.pool())
            .insert(KIND_TANDING, entry.schedule_id, entry)
            .await
    }

    async fn get_tanding(&self, id: Uuid) -> Result<ScheduleTanding> {
        ScheduleRepository::new(self.pool())
            .find_by_id(KIND_TANDING, id)
            .await
    }

    async fn list_tanding(&self) -> Result<Vec<ScheduleTanding>> {
        ScheduleRepository::new(self.pool()).list(KIND_TANDING).await
    }

    async fn update_tanding(&self, entries: &[ScheduleTanding]) -> Result<()> {
        let batch: Vec<(Uuid, &ScheduleTanding)> =
            entries.iter().map(|e| (e.schedule_id, e)).collect();
        ScheduleRepository::new(self.pool())
            .update_many(KIND_TANDING, &batch)
            .await
    }

    async fn insert_tgr(&self, entry: &ScheduleTgr) -> Result<()> {
        ScheduleRepository::new(self.pool())
            .insert(KIND_TGR, entry.schedule_id, entry)
            .await
    }

    async fn list_tgr(&self) -> Result<Vec<ScheduleTgr>> {
        ScheduleRepository::new(self.pool()).list(KIND_TGR).await
    }

    async fn update_tgr(&self, entries: &[ScheduleTgr]) -> Result<()> {
        let batch: Vec<(Uuid, &ScheduleTgr)> =
            entries.iter().map(|e| (e.schedule_id, e)).collect();
        ScheduleRepository::new(self.pool())
            .update_many(KIND_TGR, &batch)
            .await
    }
}
