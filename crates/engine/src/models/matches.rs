use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use super::event::{Foul, ScoreDetail, Warning};
use super::match_data::{Appended, PesilatMatchData};
use super::pesilat::{CornerColor, Pesilat};
use super::schedule::ScheduleTanding;
use super::timer::MatchTimer;
use crate::error::DomainError;

/// Default number of babak in a tanding match.
pub const DEFAULT_TOTAL_ROUNDS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum MatchStatus {
    Pending,
    Ongoing,
    Paused,
    Finished,
}

impl MatchStatus {
    /// Forward-only, apart from the Ongoing/Paused cycle.
    pub fn can_transition_to(self, to: MatchStatus) -> bool {
        use MatchStatus::*;
        matches!(
            (self, to),
            (Pending, Ongoing)
                | (Ongoing, Paused)
                | (Paused, Ongoing)
                | (Ongoing, Finished)
                | (Paused, Finished)
        )
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "ongoing" => Some(Self::Ongoing),
            "paused" => Some(Self::Paused),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Ongoing => write!(f, "Ongoing"),
            Self::Paused => write!(f, "Paused"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

/// Audit record of a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusTransition {
    pub from: MatchStatus,
    pub to: MatchStatus,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub match_id: Uuid,
    pub schedule_id: Option<Uuid>,
    pub match_number: i32,
    pub babak: String,
    pub kelas: String,
    pub merah: PesilatMatchData,
    pub biru: PesilatMatchData,
    pub timer: MatchTimer,
    pub status: MatchStatus,
    pub gelanggang: Option<String>,
    pub match_date: Option<NaiveDate>,
    pub winner: Option<CornerColor>,
    #[serde(default)]
    pub transitions: Vec<StatusTransition>,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn from_schedule(schedule: &ScheduleTanding, total_rounds: u8, now: DateTime<Utc>) -> Self {
        let merah = Pesilat::new(
            schedule.merah.name.clone(),
            schedule.merah.contingent.clone(),
            CornerColor::Merah,
        );
        let biru = Pesilat::new(
            schedule.biru.name.clone(),
            schedule.biru.contingent.clone(),
            CornerColor::Biru,
        );

        Self {
            match_id: Uuid::new_v4(),
            schedule_id: Some(schedule.schedule_id),
            match_number: schedule.match_number,
            babak: schedule.babak.clone(),
            kelas: schedule.kelas.clone(),
            merah: PesilatMatchData::new(merah),
            biru: PesilatMatchData::new(biru),
            timer: MatchTimer::new(total_rounds),
            status: MatchStatus::Pending,
            gelanggang: schedule.gelanggang.clone(),
            match_date: schedule.match_date,
            winner: None,
            transitions: Vec::new(),
            created_at: now,
        }
    }

    pub fn side(&self, color: CornerColor) -> &PesilatMatchData {
        match color {
            CornerColor::Merah => &self.merah,
            CornerColor::Biru => &self.biru,
        }
    }

    fn side_mut(&mut self, color: CornerColor) -> &mut PesilatMatchData {
        match color {
            CornerColor::Merah => &mut self.merah,
            CornerColor::Biru => &mut self.biru,
        }
    }

    pub fn score(&self, color: CornerColor) -> i32 {
        self.side(color).score()
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.check_transition(MatchStatus::Ongoing)?;
        self.timer.start(now)?;
        self.record_transition(MatchStatus::Ongoing, now, None);
        Ok(())
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.check_transition(MatchStatus::Paused)?;
        self.timer.pause(now)?;
        self.record_transition(MatchStatus::Paused, now, None);
        Ok(())
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.check_transition(MatchStatus::Ongoing)?;
        self.timer.resume(now)?;
        self.record_transition(MatchStatus::Ongoing, now, None);
        Ok(())
    }

    /// Ends the match and settles the winner on points. A draw leaves
    /// `winner` empty for the referee to decide.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.check_transition(MatchStatus::Finished)?;
        self.timer.stop(now);
        self.winner = match self.merah.score().cmp(&self.biru.score()) {
            Ordering::Greater => Some(CornerColor::Merah),
            Ordering::Less => Some(CornerColor::Biru),
            Ordering::Equal => None,
        };
        self.record_transition(MatchStatus::Finished, now, None);
        Ok(())
    }

    pub fn advance_round(&mut self) -> Result<u8, DomainError> {
        match self.status {
            MatchStatus::Ongoing | MatchStatus::Paused => self.timer.advance_round(),
            status => Err(DomainError::MatchNotActive { status }),
        }
    }

    pub fn record_score(
        &mut self,
        color: CornerColor,
        detail: ScoreDetail,
    ) -> Result<Appended, DomainError> {
        self.ensure_active(detail.event_id, color)?;
        self.side_mut(color).append_score(detail)
    }

    /// Appends a foul. A `Diskualifikasi` ends the match on the spot with the
    /// opponent as winner.
    pub fn record_foul(
        &mut self,
        color: CornerColor,
        foul: Foul,
        now: DateTime<Utc>,
    ) -> Result<Appended, DomainError> {
        self.ensure_active(foul.event_id, color)?;
        let terminal = foul.foul_type.is_terminal();
        let appended = self.side_mut(color).append_foul(foul)?;

        if appended == Appended::Recorded && terminal {
            self.timer.stop(now);
            self.winner = Some(color.opponent());
            self.record_transition(
                MatchStatus::Finished,
                now,
                Some(format!("{} disqualified", color)),
            );
        }

        Ok(appended)
    }

    pub fn record_warning(
        &mut self,
        color: CornerColor,
        warning: Warning,
    ) -> Result<Appended, DomainError> {
        self.ensure_active(warning.event_id, color)?;
        self.side_mut(color).append_warning(warning)
    }

    /// A resubmitted event id is let through to the ledger even after the
    /// match stopped, so it resolves to a duplicate or a conflict.
    fn ensure_active(&self, event_id: Uuid, color: CornerColor) -> Result<(), DomainError> {
        if self.status != MatchStatus::Ongoing && !self.side(color).has_event(event_id) {
            return Err(DomainError::MatchNotActive {
                status: self.status,
            });
        }
        if self.side(color.opponent()).has_event(event_id) {
            return Err(DomainError::EventIdConflict(event_id));
        }
        Ok(())
    }

    fn check_transition(&self, to: MatchStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(to) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        Ok(())
    }

    fn record_transition(&mut self, to: MatchStatus, at: DateTime<Utc>, reason: Option<String>) {
        let from = self.status;
        tracing::info!(
            match_id = %self.match_id,
            %from,
            %to,
            at = %at,
            reason = reason.as_deref().unwrap_or(""),
            "Match status changed"
        );
        self.transitions.push(StatusTransition {
            from,
            to,
            at,
            reason,
        });
        self.status = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoulType, ScheduleCorner, Technique, TimerState};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    fn schedule() -> ScheduleTanding {
        ScheduleTanding {
            schedule_id: Uuid::new_v4(),
            match_number: 7,
            kelas: "Kelas C Putra".to_string(),
            babak: "Penyisihan".to_string(),
            merah: ScheduleCorner {
                name: "Ayu".to_string(),
                contingent: "Jawa Barat".to_string(),
            },
            biru: ScheduleCorner {
                name: "Sari".to_string(),
                contingent: "Bali".to_string(),
            },
            gelanggang: Some("Gelanggang A".to_string()),
            match_date: None,
            lot: None,
            created_at: t0(),
        }
    }

    fn score(points: i32) -> ScoreDetail {
        ScoreDetail {
            event_id: Uuid::new_v4(),
            technique: Technique::Pukulan,
            points,
            timestamp: t0(),
            corrects: None,
        }
    }

    fn foul(foul_type: FoulType) -> Foul {
        Foul {
            event_id: Uuid::new_v4(),
            foul_type,
            description: "Membanting dengan sengaja".to_string(),
            points_deducted: foul_type.default_deduction(),
            timestamp: t0(),
        }
    }

    #[test]
    fn test_created_from_schedule_is_pending() {
        let m = Match::from_schedule(&schedule(), DEFAULT_TOTAL_ROUNDS, t0());
        assert_eq!(m.status, MatchStatus::Pending);
        assert_eq!(m.timer.state, TimerState::Stopped);
        assert_eq!(m.merah.pesilat.name, "Ayu");
        assert_eq!(m.biru.pesilat.color, CornerColor::Biru);
        assert_eq!(m.gelanggang.as_deref(), Some("Gelanggang A"));
    }

    #[test]
    fn test_full_lifecycle_records_transitions() {
        let mut m = Match::from_schedule(&schedule(), 3, t0());
        m.start(t0()).unwrap();
        m.pause(t0() + Duration::seconds(10)).unwrap();
        m.resume(t0() + Duration::seconds(30)).unwrap();
        m.finish(t0() + Duration::seconds(40)).unwrap();

        assert_eq!(m.status, MatchStatus::Finished);
        assert_eq!(m.transitions.len(), 4);
        assert_eq!(m.timer.elapsed_millis, 20_000);
        assert_eq!(m.transitions[2].from, MatchStatus::Paused);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut m = Match::from_schedule(&schedule(), 3, t0());
        assert_eq!(
            m.resume(t0()),
            Err(DomainError::InvalidTransition {
                from: MatchStatus::Pending,
                to: MatchStatus::Ongoing
            })
        );
        m.start(t0()).unwrap();
        assert!(matches!(
            m.start(t0()),
            Err(DomainError::InvalidTransition { from: MatchStatus::Ongoing, .. })
        ));
        m.finish(t0()).unwrap();
        assert!(m.resume(t0()).is_err());
        assert!(m.pause(t0()).is_err());
        assert!(m.finish(t0()).is_err());
    }

    #[test]
    fn test_recording_requires_ongoing() {
        let mut m = Match::from_schedule(&schedule(), 3, t0());
        assert_eq!(
            m.record_score(CornerColor::Merah, score(1)),
            Err(DomainError::MatchNotActive {
                status: MatchStatus::Pending
            })
        );
        m.start(t0()).unwrap();
        m.pause(t0()).unwrap();
        assert!(m.record_score(CornerColor::Merah, score(1)).is_err());
    }

    #[test]
    fn test_finish_decides_winner_on_points() {
        let mut m = Match::from_schedule(&schedule(), 3, t0());
        m.start(t0()).unwrap();
        m.record_score(CornerColor::Biru, score(3)).unwrap();
        m.record_score(CornerColor::Merah, score(1)).unwrap();
        m.finish(t0()).unwrap();
        assert_eq!(m.winner, Some(CornerColor::Biru));
    }

    #[test]
    fn test_draw_leaves_winner_empty() {
        let mut m = Match::from_schedule(&schedule(), 3, t0());
        m.start(t0()).unwrap();
        m.finish(t0()).unwrap();
        assert_eq!(m.winner, None);
    }

    #[test]
    fn test_disqualification_finishes_match() {
        let mut m = Match::from_schedule(&schedule(), 3, t0());
        m.start(t0()).unwrap();
        m.record_score(CornerColor::Merah, score(5)).unwrap();
        m.record_foul(CornerColor::Merah, foul(FoulType::Diskualifikasi), t0() + Duration::seconds(3))
            .unwrap();

        assert_eq!(m.status, MatchStatus::Finished);
        assert_eq!(m.winner, Some(CornerColor::Biru));
        assert_eq!(m.timer.state, TimerState::Stopped);
        assert!(m.transitions.last().unwrap().reason.is_some());
        assert!(m.record_score(CornerColor::Biru, score(1)).is_err());
    }

    #[test]
    fn test_resubmitted_disqualification_is_duplicate() {
        let mut m = Match::from_schedule(&schedule(), 3, t0());
        m.start(t0()).unwrap();
        let dq = foul(FoulType::Diskualifikasi);
        m.record_foul(CornerColor::Biru, dq.clone(), t0()).unwrap();
        let finished = m.clone();

        assert_eq!(
            m.record_foul(CornerColor::Biru, dq.clone(), t0()),
            Ok(Appended::Duplicate)
        );
        assert_eq!(m, finished);

        let changed = Foul {
            description: "lain".to_string(),
            ..dq
        };
        assert!(matches!(
            m.record_foul(CornerColor::Biru, changed, t0()),
            Err(DomainError::EventIdConflict(_))
        ));
    }

    #[test]
    fn test_event_id_cannot_be_reused_across_corners() {
        let mut m = Match::from_schedule(&schedule(), 3, t0());
        m.start(t0()).unwrap();
        let entry = score(2);
        m.record_score(CornerColor::Merah, entry.clone()).unwrap();
        assert_eq!(
            m.record_score(CornerColor::Biru, entry.clone()),
            Err(DomainError::EventIdConflict(entry.event_id))
        );
    }

    #[test]
    fn test_advance_round_only_while_active() {
        let mut m = Match::from_schedule(&schedule(), 2, t0());
        assert!(matches!(
            m.advance_round(),
            Err(DomainError::MatchNotActive { .. })
        ));
        m.start(t0()).unwrap();
        assert_eq!(m.advance_round().unwrap(), 2);
        assert!(matches!(
            m.advance_round(),
            Err(DomainError::RoundLimitExceeded { total_rounds: 2 })
        ));
    }
}
