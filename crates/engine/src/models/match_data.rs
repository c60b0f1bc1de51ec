use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::{Foul, LedgerEvent, ScoreDetail, Warning};
use super::pesilat::Pesilat;
use crate::error::DomainError;

/// Largest value a single score entry may carry, either way.
pub const MAX_ENTRY_POINTS: i32 = 10;

/// Largest deduction a single foul may carry.
pub const MAX_FOUL_DEDUCTION: i32 = 100;

/// Outcome of an append. Re-submitting an identical event is not an error so
/// that clients can safely retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appended {
    Recorded,
    Duplicate,
}

/// One contestant's side of a match: who they are and everything the judges
/// recorded for them. The score is never stored, it is always reduced from
/// the event sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PesilatMatchData {
    pub pesilat: Pesilat,
    #[serde(default)]
    scores: Vec<ScoreDetail>,
    #[serde(default)]
    fouls: Vec<Foul>,
    #[serde(default)]
    warnings: Vec<Warning>,
}

impl PesilatMatchData {
    pub fn new(pesilat: Pesilat) -> Self {
        Self {
            pesilat,
            scores: Vec::new(),
            fouls: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn scores(&self) -> &[ScoreDetail] {
        &self.scores
    }

    pub fn fouls(&self) -> &[Foul] {
        &self.fouls
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn score(&self) -> i32 {
        reduce_score(&self.scores, &self.fouls)
    }

    pub fn has_event(&self, event_id: Uuid) -> bool {
        self.scores.iter().any(|e| e.event_id == event_id)
            || self.fouls.iter().any(|e| e.event_id == event_id)
            || self.warnings.iter().any(|e| e.event_id == event_id)
    }

    pub fn append_score(&mut self, detail: ScoreDetail) -> Result<Appended, DomainError> {
        if let Some(existing) = self.scores.iter().find(|s| s.event_id == detail.event_id) {
            return same_or_conflict(existing, &detail);
        }
        self.ensure_unused(detail.event_id)?;
        self.validate_score(&detail)?;
        insert_ordered(&mut self.scores, detail);
        Ok(Appended::Recorded)
    }

    pub fn append_foul(&mut self, foul: Foul) -> Result<Appended, DomainError> {
        if let Some(existing) = self.fouls.iter().find(|f| f.event_id == foul.event_id) {
            return same_or_conflict(existing, &foul);
        }
        self.ensure_unused(foul.event_id)?;
        if !(0..=MAX_FOUL_DEDUCTION).contains(&foul.points_deducted) {
            return Err(DomainError::InvalidEvent(format!(
                "points_deducted must be between 0 and {}",
                MAX_FOUL_DEDUCTION
            )));
        }
        insert_ordered(&mut self.fouls, foul);
        Ok(Appended::Recorded)
    }

    pub fn append_warning(&mut self, warning: Warning) -> Result<Appended, DomainError> {
        if let Some(existing) = self.warnings.iter().find(|w| w.event_id == warning.event_id) {
            return same_or_conflict(existing, &warning);
        }
        self.ensure_unused(warning.event_id)?;
        insert_ordered(&mut self.warnings, warning);
        Ok(Appended::Recorded)
    }

    fn ensure_unused(&self, event_id: Uuid) -> Result<(), DomainError> {
        if self.has_event(event_id) {
            return Err(DomainError::EventIdConflict(event_id));
        }
        Ok(())
    }

    fn validate_score(&self, detail: &ScoreDetail) -> Result<(), DomainError> {
        match (detail.points, detail.corrects) {
            (0, _) => Err(DomainError::InvalidEvent(
                "points must not be zero".to_string(),
            )),
            (p, _) if p.unsigned_abs() > MAX_ENTRY_POINTS.unsigned_abs() => {
                Err(DomainError::InvalidEvent(format!(
                    "points must be between -{0} and {0}",
                    MAX_ENTRY_POINTS
                )))
            }
            (p, Some(_)) if p > 0 => Err(DomainError::InvalidEvent(
                "only negative entries can correct another entry".to_string(),
            )),
            (p, None) if p < 0 => Err(DomainError::InvalidEvent(
                "negative entries must reference the entry they correct".to_string(),
            )),
            (p, Some(target)) => {
                let original = self
                    .scores
                    .iter()
                    .find(|s| s.event_id == target && s.points > 0)
                    .ok_or_else(|| {
                        DomainError::InvalidEvent(format!("no score entry {} to correct", target))
                    })?;
                let already_corrected: i32 = self
                    .scores
                    .iter()
                    .filter(|s| s.corrects == Some(target))
                    .map(|s| s.points)
                    .sum();
                if original.points + already_corrected + p < 0 {
                    return Err(DomainError::InvalidEvent(format!(
                        "correction exceeds the {} points of entry {}",
                        original.points, target
                    )));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Points earned minus points deducted, saturating at the `i32` range.
pub fn reduce_score(scores: &[ScoreDetail], fouls: &[Foul]) -> i32 {
    let earned: i64 = scores.iter().map(|s| i64::from(s.points)).sum();
    let deducted: i64 = fouls.iter().map(|f| i64::from(f.points_deducted)).sum();
    (earned - deducted).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Inserts after every event with an equal or earlier timestamp, so ties keep
/// their arrival order.
fn insert_ordered<E: LedgerEvent>(events: &mut Vec<E>, event: E) {
    let at = events.partition_point(|e| e.timestamp() <= event.timestamp());
    events.insert(at, event);
}

fn same_or_conflict<E: LedgerEvent>(existing: &E, incoming: &E) -> Result<Appended, DomainError> {
    if existing == incoming {
        Ok(Appended::Duplicate)
    } else {
        Err(DomainError::EventIdConflict(incoming.event_id()))
    }
}
