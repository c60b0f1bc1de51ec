//! Storage boundary. Services receive an `Arc<dyn MatchStore>` /
//! `Arc<dyn ScheduleStore>` at construction; which backend sits behind it is
//! decided once at process start.

pub mod matches;
pub mod memory;
pub mod schedule;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Match, MatchStatus, ScheduleTanding, ScheduleTgr};

pub use matches::MatchRepository;
pub use memory::MemoryStore;
pub use schedule::ScheduleRepository;

/// A document together with the version it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub version: i64,
}

#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    pub status: Option<MatchStatus>,
    pub gelanggang: Option<String>,
}

impl MatchFilter {
    pub fn accepts(&self, m: &Match) -> bool {
        self.status.is_none_or(|s| m.status == s)
            && self
                .gelanggang
                .as_deref()
                .is_none_or(|g| m.gelanggang.as_deref() == Some(g))
    }
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Stores a new match at version 1.
    async fn insert_match(&self, m: &Match) -> Result<()>;

    async fn get_match(&self, id: Uuid) -> Result<Versioned<Match>>;

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>>;

    /// Replaces the document only if it is still at `expected_version`.
    /// Returns the new version; fails `VersionConflict` otherwise.
    async fn save_match(&self, m: &Match, expected_version: i64) -> Result<i64>;
}

/// Schedules are listed in submission order.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn insert_tanding(&self, entry: &ScheduleTanding) -> Result<()>;

    async fn get_tanding(&self, id: Uuid) -> Result<ScheduleTanding>;

    async fn list_tanding(&self) -> Result<Vec<ScheduleTanding>>;

    async fn update_tanding(&self, entries: &[ScheduleTanding]) -> Result<()>;

    async fn insert_tgr(&self, entry: &ScheduleTgr) -> Result<()>;

    async fn list_tgr(&self) -> Result<Vec<ScheduleTgr>>;

    async fn update_tgr(&self, entries: &[ScheduleTgr]) -> Result<()>;
}
