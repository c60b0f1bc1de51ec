use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    Appended, CornerColor, Foul, FoulType, Match, MatchStatus, Pesilat, PesilatMatchData,
    ScoreDetail, StatusTransition, Technique, TimerState, Warning, WarningType,
};
use crate::repository::MatchFilter;
use crate::services::ledger::RecordOutcome;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateMatchRequest {
    pub schedule_id: Uuid,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct MatchListQuery {
    /// Pending, Ongoing, Paused or Finished
    pub status: Option<String>,
    pub gelanggang: Option<String>,
}

impl MatchListQuery {
    pub fn to_filter(&self) -> Result<MatchFilter, String> {
        let status = match self.status.as_deref() {
            Some(s) => Some(MatchStatus::parse(s).ok_or_else(|| format!("Unknown status '{}'", s))?),
            None => None,
        };

        Ok(MatchFilter {
            status,
            gelanggang: self.gelanggang.clone(),
        })
    }
}

/// Judge input for a scoring event. `event_id` should be generated by the
/// client so that a resubmission is recognised as the same event.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordScoreRequest {
    pub event_id: Option<Uuid>,
    pub technique: Technique,
    #[validate(range(min = -10, max = 10, message = "Points must be between -10 and 10"))]
    pub points: i32,
    pub timestamp: Option<DateTime<Utc>>,
    pub corrects: Option<Uuid>,
}

impl RecordScoreRequest {
    pub fn into_detail(self, now: DateTime<Utc>) -> ScoreDetail {
        ScoreDetail {
            event_id: self.event_id.unwrap_or_else(Uuid::new_v4),
            technique: self.technique,
            points: self.points,
            timestamp: self.timestamp.unwrap_or(now),
            corrects: self.corrects,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordFoulRequest {
    pub event_id: Option<Uuid>,
    pub foul_type: FoulType,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub description: String,
    /// Defaults to the usual deduction for `foul_type`
    #[validate(range(min = 0, max = 100))]
    pub points_deducted: Option<i32>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RecordFoulRequest {
    pub fn into_foul(self, now: DateTime<Utc>) -> Foul {
        Foul {
            event_id: self.event_id.unwrap_or_else(Uuid::new_v4),
            foul_type: self.foul_type,
            description: self.description,
            points_deducted: self
                .points_deducted
                .unwrap_or_else(|| self.foul_type.default_deduction()),
            timestamp: self.timestamp.unwrap_or(now),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordWarningRequest {
    pub event_id: Option<Uuid>,
    pub warning_type: WarningType,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RecordWarningRequest {
    pub fn into_warning(self, now: DateTime<Utc>) -> Warning {
        Warning {
            event_id: self.event_id.unwrap_or_else(Uuid::new_v4),
            warning_type: self.warning_type,
            note: self.note,
            timestamp: self.timestamp.unwrap_or(now),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimerResponse {
    pub state: TimerState,
    pub start_time: Option<DateTime<Utc>>,
    pub elapsed_seconds: i64,
    pub is_running: bool,
    pub current_round: u8,
    pub total_rounds: u8,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PesilatMatchResponse {
    pub pesilat: Pesilat,
    pub score: i32,
    pub scores: Vec<ScoreDetail>,
    pub fouls: Vec<Foul>,
    pub warnings: Vec<Warning>,
}

impl From<&PesilatMatchData> for PesilatMatchResponse {
    fn from(data: &PesilatMatchData) -> Self {
        Self {
            pesilat: data.pesilat.clone(),
            score: data.score(),
            scores: data.scores().to_vec(),
            fouls: data.fouls().to_vec(),
            warnings: data.warnings().to_vec(),
        }
    }
}

/// Match as shown on the scoreboard; elapsed time is evaluated at `now`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchResponse {
    pub match_id: Uuid,
    pub schedule_id: Option<Uuid>,
    pub match_number: i32,
    pub babak: String,
    pub kelas: String,
    pub merah: PesilatMatchResponse,
    pub biru: PesilatMatchResponse,
    pub timer: TimerResponse,
    pub status: MatchStatus,
    pub gelanggang: Option<String>,
    pub match_date: Option<NaiveDate>,
    pub winner: Option<CornerColor>,
    pub transitions: Vec<StatusTransition>,
    pub created_at: DateTime<Utc>,
}

impl MatchResponse {
    pub fn from_match(m: &Match, now: DateTime<Utc>) -> Self {
        Self {
            match_id: m.match_id,
            schedule_id: m.schedule_id,
            match_number: m.match_number,
            babak: m.babak.clone(),
            kelas: m.kelas.clone(),
            merah: (&m.merah).into(),
            biru: (&m.biru).into(),
            timer: TimerResponse {
                state: m.timer.state,
                start_time: m.timer.start_time,
                elapsed_seconds: m.timer.elapsed_seconds(now),
                is_running: m.timer.is_running(),
                current_round: m.timer.current_round,
                total_rounds: m.timer.total_rounds,
            },
            status: m.status,
            gelanggang: m.gelanggang.clone(),
            match_date: m.match_date,
            winner: m.winner,
            transitions: m.transitions.clone(),
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecordOutcomeResponse {
    /// False when the event had already been recorded
    pub recorded: bool,
    pub score: i32,
    pub opponent_score: i32,
    pub status: MatchStatus,
}

impl From<RecordOutcome> for RecordOutcomeResponse {
    fn from(outcome: RecordOutcome) -> Self {
        Self {
            recorded: outcome.appended == Appended::Recorded,
            score: outcome.score,
            opponent_score: outcome.opponent_score,
            status: outcome.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScoreResponse {
    pub match_id: Uuid,
    pub color: CornerColor,
    pub score: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foul_request_defaults_deduction() {
        let now = Utc::now();
        let req = RecordFoulRequest {
            event_id: None,
            foul_type: FoulType::PeringatanPertama,
            description: String::new(),
            points_deducted: None,
            timestamp: None,
        };
        let foul = req.into_foul(now);
        assert_eq!(foul.points_deducted, 5);
        assert_eq!(foul.timestamp, now);
    }

    #[test]
    fn test_list_query_rejects_unknown_status() {
        let query = MatchListQuery {
            status: Some("playing".to_string()),
            gelanggang: None,
        };
        assert!(query.to_filter().is_err());

        let query = MatchListQuery {
            status: Some("ongoing".to_string()),
            gelanggang: Some("A".to_string()),
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.status, Some(MatchStatus::Ongoing));
    }
}
