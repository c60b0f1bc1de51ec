use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{MatchFilter, MatchStore, Versioned};
use crate::Database;
use crate::error::{Result, StorageError};
use crate::models::Match;

#[derive(Debug, FromRow)]
struct MatchRow {
    version: i64,
    document: Json<Match>,
}

impl From<MatchRow> for Versioned<Match> {
    fn from(row: MatchRow) -> Self {
        Self {
            value: row.document.0,
            version: row.version,
        }
    }
}

/// Repository for match documents
pub struct MatchRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MatchRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, m: &Match) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO matches (match_id, version, status, gelanggang, match_number, document, created_at)
            VALUES ($1, 1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(m.match_id)
        .bind(m.status.to_string())
        .bind(&m.gelanggang)
        .bind(m.match_number)
        .bind(Json(m))
        .bind(m.created_at)
        .execute(self.pool)
        .await
        .map_err(|e| match StorageError::from(e) {
            e if e.is_unique_violation() => {
                StorageError::ConstraintViolation("Match already exists".to_string())
            }
            e => e,
        })?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Versioned<Match>> {
        let row = sqlx::query_as::<_, MatchRow>(
            r#"
            SELECT version, document
            FROM matches
            WHERE match_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(row.into())
    }

    pub async fn list(&self, filter: &MatchFilter) -> Result<Vec<Match>> {
        let rows = sqlx::query_as::<_, MatchRow>(
            r#"
            SELECT version, document
            FROM matches
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR gelanggang = $2)
            ORDER BY match_number ASC, created_at ASC
            "#,
        )
        .bind(filter.status.map(|s| s.to_string()))
        .bind(&filter.gelanggang)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.document.0).collect())
    }

    /// Compare-and-swap on the `version` column.
    pub async fn update(&self, m: &Match, expected_version: i64) -> Result<i64> {
        let new_version: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE matches
            SET document = $2,
                status = $3,
                gelanggang = $4,
                version = version + 1,
                updated_at = now()
            WHERE match_id = $1 AND version = $5
            RETURNING version
            "#,
        )
        .bind(m.match_id)
        .bind(Json(m))
        .bind(m.status.to_string())
        .bind(&m.gelanggang)
        .bind(expected_version)
        .fetch_optional(self.pool)
        .await?;

        match new_version {
            Some(version) => Ok(version),
            None => {
                // Tell a lost race apart from a missing row
                self.find_by_id(m.match_id).await?;
                Err(StorageError::VersionConflict {
                    id: m.match_id,
                    expected: expected_version,
                })
            }
        }
    }
}

#[async_trait]
impl MatchStore for Database {
    async fn insert_match(&self, m: &Match) -> Result<()> {
        MatchRepository::new(self.pool()).insert(m).await
    }

    async fn get_match(&self, id: Uuid) -> Result<Versioned<Match>> {
        MatchRepository::new(self.pool()).find_by_id(id).await
    }

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>> {
        MatchRepository::new(self.pool()).list(filter).await
    }

    async fn save_match(&self, m: &Match, expected_version: i64) -> Result<i64> {
        MatchRepository::new(self.pool())
            .update(m, expected_version)
            .await
    }
}
