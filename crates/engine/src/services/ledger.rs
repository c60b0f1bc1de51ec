use std::sync::Arc;
use uuid::Uuid;

use super::writer::MatchWriter;
use crate::error::EngineResult;
use crate::models::{Appended, CornerColor, Foul, MatchStatus, ScoreDetail, Warning};

/// Result of a ledger append as seen by the judge console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub appended: Appended,
    pub score: i32,
    pub opponent_score: i32,
    pub status: MatchStatus,
}

/// Append-only scoring ledger. Each append goes through the match writer, so
/// both corners of a match are serialized and the derived scores are never
/// read from a half-written document.
pub struct ScoringLedger {
    writer: Arc<MatchWriter>,
}

impl ScoringLedger {
    pub fn new(writer: Arc<MatchWriter>) -> Self {
        Self { writer }
    }

    pub async fn record_score(
        &self,
        match_id: Uuid,
        color: CornerColor,
        detail: ScoreDetail,
    ) -> EngineResult<RecordOutcome> {
        let event_id = detail.event_id;
        let (m, appended) = self
            .writer
            .mutate(match_id, |m, _| m.record_score(color, detail.clone()))
            .await?;

        tracing::debug!(%match_id, %color, %event_id, ?appended, "Score recorded");
        Ok(outcome(&m, color, appended))
    }

    pub async fn record_foul(
        &self,
        match_id: Uuid,
        color: CornerColor,
        foul: Foul,
    ) -> EngineResult<RecordOutcome> {
        let event_id = foul.event_id;
        let foul_type = foul.foul_type;
        let (m, appended) = self
            .writer
            .mutate(match_id, |m, now| m.record_foul(color, foul.clone(), now))
            .await?;

        tracing::info!(%match_id, %color, %event_id, ?foul_type, ?appended, "Foul recorded");
        Ok(outcome(&m, color, appended))
    }

    pub async fn record_warning(
        &self,
        match_id: Uuid,
        color: CornerColor,
        warning: Warning,
    ) -> EngineResult<RecordOutcome> {
        let event_id = warning.event_id;
        let (m, appended) = self
            .writer
            .mutate(match_id, |m, _| m.record_warning(color, warning.clone()))
            .await?;

        tracing::debug!(%match_id, %color, %event_id, ?appended, "Warning recorded");
        Ok(outcome(&m, color, appended))
    }

    pub async fn get_score(&self, match_id: Uuid, color: CornerColor) -> EngineResult<i32> {
        let m = self.writer.store().get_match(match_id).await?.value;
        Ok(m.score(color))
    }
}

fn outcome(m: &crate::models::Match, color: CornerColor, appended: Appended) -> RecordOutcome {
    RecordOutcome {
        appended,
        score: m.score(color),
        opponent_score: m.score(color.opponent()),
        status: m.status,
    }
}
