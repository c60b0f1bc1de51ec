use std::sync::Arc;

use super::distributor::{VenueAssignment, distribute_and_assign, parse_venue_list};
use crate::clock::Clock;
use crate::dto::schedule::{CreateTandingRequest, CreateTgrRequest};
use crate::error::EngineResult;
use crate::models::{ScheduleTanding, ScheduleTgr};
use crate::repository::ScheduleStore;

/// Schedule intake and gelanggang distribution.
pub struct ScheduleService {
    store: Arc<dyn ScheduleStore>,
    clock: Arc<dyn Clock>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn ScheduleStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn create_tanding(&self, request: CreateTandingRequest) -> EngineResult<ScheduleTanding> {
        let entry = request.into_schedule(self.clock.now());
        self.store.insert_tanding(&entry).await?;
        Ok(entry)
    }

    /// Participant count must match the category (Tunggal 1, Ganda 2, Regu 3).
    pub async fn create_tgr(&self, request: CreateTgrRequest) -> EngineResult<ScheduleTgr> {
        let entry = request.into_schedule(self.clock.now());
        entry.validate_participants()?;
        self.store.insert_tgr(&entry).await?;
        Ok(entry)
    }

    pub async fn list_tanding(&self) -> EngineResult<Vec<ScheduleTanding>> {
        Ok(self.store.list_tanding().await?)
    }

    pub async fn list_tgr(&self) -> EngineResult<Vec<ScheduleTgr>> {
        Ok(self.store.list_tgr().await?)
    }

    /// Spreads every tanding entry over the given gelanggang list and stores
    /// the assignment.
    pub async fn distribute_tanding(&self, venues_input: &str) -> EngineResult<VenueAssignment<ScheduleTanding>> {
        let venues = parse_venue_list(venues_input)?;
        let entries = self.store.list_tanding().await?;
        let assignment = distribute_and_assign(entries, &venues)?;

        let updated: Vec<ScheduleTanding> = assignment
            .buckets
            .iter()
            .flat_map(|b| b.entries.iter().cloned())
            .collect();
        self.store.update_tanding(&updated).await?;

        tracing::info!(
            venues = venues.len(),
            entries = updated.len(),
            "Tanding schedule distributed"
        );
        Ok(assignment)
    }

    pub async fn distribute_tgr(&self, venues_input: &str) -> EngineResult<VenueAssignment<ScheduleTgr>> {
        let venues = parse_venue_list(venues_input)?;
        let entries = self.store.list_tgr().await?;
        let assignment = distribute_and_assign(entries, &venues)?;

        let updated: Vec<ScheduleTgr> = assignment
            .buckets
            .iter()
            .flat_map(|b| b.entries.iter().cloned())
            .collect();
        self.store.update_tgr(&updated).await?;

        tracing::info!(
            venues = venues.len(),
            entries = updated.len(),
            "TGR schedule distributed"
        );
        Ok(assignment)
    }
}
