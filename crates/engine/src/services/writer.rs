use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{DomainError, EngineResult};
use crate::models::Match;
use crate::repository::{MatchStore, Versioned};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(25),
        }
    }
}

/// Single write path for match documents.
///
/// Mutations of one match are serialized through a per-match lock inside the
/// process and saved with an expected version, so a writer in another process
/// shows up as a `VersionConflict`. Conflicts reload the document and apply the
/// mutation again, up to `RetryPolicy::attempts` times.
pub struct MatchWriter {
    store: Arc<dyn MatchStore>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    locks: LockMap,
}

impl MatchWriter {
    pub fn new(store: Arc<dyn MatchStore>, clock: Arc<dyn Clock>, retry: RetryPolicy) -> Self {
        Self {
            store,
            clock,
            retry: RetryPolicy {
                attempts: retry.attempts.max(1),
                ..retry
            },
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &dyn MatchStore {
        self.store.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Hands out the lock of one match. The map entry lives only as long as
    /// some lease on it does.
    fn lease(&self, id: Uuid) -> LockLease<'_> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        LockLease {
            locks: &self.locks,
            id,
            lock: locks.entry(id).or_default().clone(),
        }
    }

    /// Loads the match, applies `apply` and saves it. `apply` gets the clock
    /// reading taken after the lock is held, fresh on every attempt. When it
    /// leaves the document untouched nothing is written.
    pub async fn mutate<T, F>(&self, id: Uuid, mut apply: F) -> EngineResult<(Match, T)>
    where
        F: FnMut(&mut Match, DateTime<Utc>) -> Result<T, DomainError> + Send,
        T: Send,
    {
        let lease = self.lease(id);
        let _guard = lease.lock.lock().await;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let Versioned { value, version } = self.store.get_match(id).await?;
            let mut updated = value.clone();
            let output = apply(&mut updated, self.clock.now())?;

            if updated == value {
                return Ok((updated, output));
            }

            match self.store.save_match(&updated, version).await {
                Ok(_) => return Ok((updated, output)),
                Err(e) if e.is_retryable() && attempt < self.retry.attempts => {
                    tracing::warn!(
                        match_id = %id,
                        attempt,
                        error = %e,
                        "Retrying match write"
                    );
                    tokio::time::sleep(self.retry.backoff * attempt).await;
                }
                Err(e) => {
                    tracing::error!(match_id = %id, attempt, error = %e, "Match write failed");
                    return Err(e.into());
                }
            }
        }
    }
}

type LockMap = Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>;

struct LockLease<'a> {
    locks: &'a LockMap,
    id: Uuid,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for LockLease<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        // An entry held only by the map is idle
        drop(std::mem::take(&mut self.lock));
        if locks.get(&self.id).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(&self.id);
        }
    }
}
