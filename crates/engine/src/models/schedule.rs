use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScheduleCorner {
    pub name: String,
    pub contingent: String,
}

/// A sparring bout waiting to become a live match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScheduleTanding {
    pub schedule_id: Uuid,
    pub match_number: i32,
    pub kelas: String,
    pub babak: String,
    pub merah: ScheduleCorner,
    pub biru: ScheduleCorner,
    pub gelanggang: Option<String>,
    pub match_date: Option<NaiveDate>,
    pub lot: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TgrCategory {
    Tunggal,
    Ganda,
    Regu,
}

impl TgrCategory {
    pub fn expected_participants(self) -> usize {
        match self {
            Self::Tunggal => 1,
            Self::Ganda => 2,
            Self::Regu => 3,
        }
    }
}

/// An artistic-form performance slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScheduleTgr {
    pub schedule_id: Uuid,
    pub category: TgrCategory,
    pub kelas: String,
    pub participant_names: Vec<String>,
    pub contingent: String,
    pub gelanggang: Option<String>,
    pub match_date: Option<NaiveDate>,
    pub lot: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl ScheduleTgr {
    pub fn validate_participants(&self) -> Result<(), DomainError> {
        let expected = self.category.expected_participants();
        let named = self
            .participant_names
            .iter()
            .filter(|n| !n.trim().is_empty())
            .count();

        if named != expected || self.participant_names.len() != expected {
            return Err(DomainError::InvalidSchedule(format!(
                "{:?} requires exactly {} participant name(s), got {}",
                self.category,
                expected,
                self.participant_names.len()
            )));
        }
        Ok(())
    }
}

/// Entries the distributor can place on a gelanggang.
pub trait VenueAssignable {
    fn assign_venue(&mut self, venue: &str);
}

impl VenueAssignable for ScheduleTanding {
    fn assign_venue(&mut self, venue: &str) {
        self.gelanggang = Some(venue.to_string());
    }
}

impl VenueAssignable for ScheduleTgr {
    fn assign_venue(&mut self, venue: &str) {
        self.gelanggang = Some(venue.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tgr(category: TgrCategory, names: &[&str]) -> ScheduleTgr {
        ScheduleTgr {
            schedule_id: Uuid::new_v4(),
            category,
            kelas: "Remaja".to_string(),
            participant_names: names.iter().map(|n| n.to_string()).collect(),
            contingent: "DKI Jakarta".to_string(),
            gelanggang: None,
            match_date: None,
            lot: Some(1),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_participant_cardinality() {
        assert!(tgr(TgrCategory::Tunggal, &["Rani"]).validate_participants().is_ok());
        assert!(tgr(TgrCategory::Ganda, &["Rani", "Dewi"]).validate_participants().is_ok());
        assert!(
            tgr(TgrCategory::Regu, &["Rani", "Dewi", "Tika"])
                .validate_participants()
                .is_ok()
        );
        assert!(tgr(TgrCategory::Ganda, &["Rani"]).validate_participants().is_err());
        assert!(tgr(TgrCategory::Tunggal, &["Rani", "Dewi"]).validate_participants().is_err());
        assert!(tgr(TgrCategory::Ganda, &["Rani", "  "]).validate_participants().is_err());
    }
}
