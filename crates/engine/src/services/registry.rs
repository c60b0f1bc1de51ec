use std::sync::Arc;
use uuid::Uuid;

use super::writer::MatchWriter;
use crate::error::EngineResult;
use crate::models::{Match, ScheduleTanding};
use crate::repository::{MatchFilter, ScheduleStore};

/// Owns match lifecycles: creation from the schedule and every status change.
pub struct MatchRegistry {
    writer: Arc<MatchWriter>,
    schedules: Arc<dyn ScheduleStore>,
    total_rounds: u8,
}

impl MatchRegistry {
    pub fn new(writer: Arc<MatchWriter>, schedules: Arc<dyn ScheduleStore>, total_rounds: u8) -> Self {
        Self {
            writer,
            schedules,
            total_rounds,
        }
    }

    /// Create a `Pending` match from a tanding schedule entry
    pub async fn create_match(&self, schedule: &ScheduleTanding) -> EngineResult<Match> {
        let m = Match::from_schedule(schedule, self.total_rounds, self.writer.clock().now());
        self.writer.store().insert_match(&m).await?;

        tracing::info!(
            match_id = %m.match_id,
            schedule_id = %schedule.schedule_id,
            match_number = m.match_number,
            "Match created"
        );
        Ok(m)
    }

    /// Create a match from a stored schedule entry
    pub async fn create_match_from_schedule(&self, schedule_id: Uuid) -> EngineResult<Match> {
        let schedule = self.schedules.get_tanding(schedule_id).await?;
        self.create_match(&schedule).await
    }

    pub async fn get_match(&self, id: Uuid) -> EngineResult<Match> {
        Ok(self.writer.store().get_match(id).await?.value)
    }

    pub async fn list_matches(&self, filter: &MatchFilter) -> EngineResult<Vec<Match>> {
        Ok(self.writer.store().list_matches(filter).await?)
    }

    pub async fn start_match(&self, id: Uuid) -> EngineResult<Match> {
        let (m, _) = self.writer.mutate(id, |m, now| m.start(now)).await?;
        Ok(m)
    }

    pub async fn pause_match(&self, id: Uuid) -> EngineResult<Match> {
        let (m, _) = self.writer.mutate(id, |m, now| m.pause(now)).await?;
        Ok(m)
    }

    pub async fn resume_match(&self, id: Uuid) -> EngineResult<Match> {
        let (m, _) = self.writer.mutate(id, |m, now| m.resume(now)).await?;
        Ok(m)
    }

    pub async fn finish_match(&self, id: Uuid) -> EngineResult<Match> {
        let (m, _) = self.writer.mutate(id, |m, now| m.finish(now)).await?;
        Ok(m)
    }

    pub async fn advance_round(&self, id: Uuid) -> EngineResult<Match> {
        let (m, round) = self.writer.mutate(id, |m, _| m.advance_round()).await?;
        tracing::info!(match_id = %id, round, "Advanced to next babak");
        Ok(m)
    }
}
