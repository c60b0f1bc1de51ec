use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{MatchFilter, MatchStore, ScheduleStore, Versioned};
use crate::error::{Result, StorageError};
use crate::models::{Match, ScheduleTanding, ScheduleTgr};

/// Process-local store, used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryStore {
    matches: RwLock<HashMap<Uuid, Versioned<Match>>>,
    tanding: RwLock<Vec<ScheduleTanding>>,
    tgr: RwLock<Vec<ScheduleTgr>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn insert_match(&self, m: &Match) -> Result<()> {
        let mut matches = self.matches.write().await;
        if matches.contains_key(&m.match_id) {
            return Err(StorageError::ConstraintViolation(
                "Match already exists".to_string(),
            ));
        }
        matches.insert(
            m.match_id,
            Versioned {
                value: m.clone(),
                version: 1,
            },
        );
        Ok(())
    }

    async fn get_match(&self, id: Uuid) -> Result<Versioned<Match>> {
        self.matches
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>> {
        let matches = self.matches.read().await;
        let mut listed: Vec<Match> = matches
            .values()
            .map(|v| &v.value)
            .filter(|m| filter.accepts(m))
            .cloned()
            .collect();
        listed.sort_by_key(|m| (m.match_number, m.created_at));
        Ok(listed)
    }

    async fn save_match(&self, m: &Match, expected_version: i64) -> Result<i64> {
        let mut matches = self.matches.write().await;
        let stored = matches.get_mut(&m.match_id).ok_or(StorageError::NotFound)?;

        if stored.version != expected_version {
            return Err(StorageError::VersionConflict {
                id: m.match_id,
                expected: expected_version,
            });
        }

        stored.value = m.clone();
        stored.version += 1;
        Ok(stored.version)
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn insert_tanding(&self, entry: &ScheduleTanding) -> Result<()> {
        let mut tanding = self.tanding.write().await;
        if tanding.iter().any(|e| e.schedule_id == entry.schedule_id) {
            return Err(StorageError::ConstraintViolation(
                "Schedule entry already exists".to_string(),
            ));
        }
        tanding.push(entry.clone());
        Ok(())
    }

    async fn get_tanding(&self, id: Uuid) -> Result<ScheduleTanding> {
        self.tanding
            .read()
            .await
            .iter()
            .find(|e| e.schedule_id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_tanding(&self) -> Result<Vec<ScheduleTanding>> {
        Ok(self.tanding.read().await.clone())
    }

    async fn update_tanding(&self, entries: &[ScheduleTanding]) -> Result<()> {
        let mut tanding = self.tanding.write().await;
        replace_all(&mut tanding, entries, |e| e.schedule_id)
    }

    async fn insert_tgr(&self, entry: &ScheduleTgr) -> Result<()> {
        let mut tgr = self.tgr.write().await;
        if tgr.iter().any(|e| e.schedule_id == entry.schedule_id) {
            return Err(StorageError::ConstraintViolation(
                "Schedule entry already exists".to_string(),
            ));
        }
        tgr.push(entry.clone());
        Ok(())
    }

    async fn list_tgr(&self) -> Result<Vec<ScheduleTgr>> {
        Ok(self.tgr.read().await.clone())
    }

    async fn update_tgr(&self, entries: &[ScheduleTgr]) -> Result<()> {
        let mut tgr = self.tgr.write().await;
        replace_all(&mut tgr, entries, |e| e.schedule_id)
    }
}

/// All-or-nothing: nothing is written if any entry is unknown.
fn replace_all<T: Clone>(stored: &mut [T], entries: &[T], id: impl Fn(&T) -> Uuid) -> Result<()> {
    let mut positions = Vec::with_capacity(entries.len());
    for entry in entries {
        let pos = stored
            .iter()
            .position(|s| id(s) == id(entry))
            .ok_or(StorageError::NotFound)?;
        positions.push(pos);
    }
    for (pos, entry) in positions.into_iter().zip(entries) {
        stored[pos] = entry.clone();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScheduleCorner, DEFAULT_TOTAL_ROUNDS};
    use chrono::Utc;

    fn tanding(number: i32) -> ScheduleTanding {
        ScheduleTanding {
            schedule_id: Uuid::new_v4(),
            match_number: number,
            kelas: "Kelas A Putri".to_string(),
            babak: "Final".to_string(),
            merah: ScheduleCorner {
                name: "Ayu".to_string(),
                contingent: "Jawa Barat".to_string(),
            },
            biru: ScheduleCorner {
                name: "Sari".to_string(),
                contingent: "Bali".to_string(),
            },
            gelanggang: None,
            match_date: None,
            lot: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_requires_current_version() {
        let store = MemoryStore::new();
        let m = Match::from_schedule(&tanding(1), DEFAULT_TOTAL_ROUNDS, Utc::now());
        store.insert_match(&m).await.unwrap();

        assert_eq!(store.save_match(&m, 1).await.unwrap(), 2);
        assert!(matches!(
            store.save_match(&m, 1).await,
            Err(StorageError::VersionConflict { expected: 1, .. })
        ));
        assert_eq!(store.get_match(m.match_id).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_missing_match_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get_match(Uuid::new_v4()).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_schedules_keep_submission_order() {
        let store = MemoryStore::new();
        let entries: Vec<ScheduleTanding> = (1..=4).rev().map(tanding).collect();
        for e in &entries {
            store.insert_tanding(e).await.unwrap();
        }

        let listed = store.list_tanding().await.unwrap();
        assert_eq!(listed, entries);
        assert!(store.insert_tanding(&entries[0]).await.is_err());
    }

    #[tokio::test]
    async fn test_update_with_unknown_entry_writes_nothing() {
        let store = MemoryStore::new();
        let known = tanding(1);
        store.insert_tanding(&known).await.unwrap();

        let mut changed = known.clone();
        changed.gelanggang = Some("A".to_string());
        let result = store.update_tanding(&[changed, tanding(2)]).await;

        assert!(matches!(result, Err(StorageError::NotFound)));
        assert_eq!(store.get_tanding(known.schedule_id).await.unwrap().gelanggang, None);
    }
}
