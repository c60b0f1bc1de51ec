use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{ScheduleCorner, ScheduleTanding, ScheduleTgr, TgrCategory};
use crate::services::distributor::VenueAssignment;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CornerRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Contingent must be between 1 and 255 characters"
    ))]
    pub contingent: String,
}

/// Request payload for a new tanding (sparring) schedule entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTandingRequest {
    #[validate(range(min = 1, message = "Match number must be positive"))]
    pub match_number: i32,

    #[validate(length(min = 1, max = 255))]
    pub kelas: String,

    #[validate(length(min = 1, max = 255))]
    pub babak: String,

    #[validate(nested)]
    pub merah: CornerRequest,

    #[validate(nested)]
    pub biru: CornerRequest,

    #[validate(length(max = 255))]
    pub gelanggang: Option<String>,

    pub match_date: Option<NaiveDate>,

    #[validate(range(min = 1))]
    pub lot: Option<i32>,
}

impl CreateTandingRequest {
    pub fn into_schedule(self, now: DateTime<Utc>) -> ScheduleTanding {
        ScheduleTanding {
            schedule_id: Uuid::new_v4(),
            match_number: self.match_number,
            kelas: self.kelas,
            babak: self.babak,
            merah: ScheduleCorner {
                name: self.merah.name,
                contingent: self.merah.contingent,
            },
            biru: ScheduleCorner {
                name: self.biru.name,
                contingent: self.biru.contingent,
            },
            gelanggang: self.gelanggang,
            match_date: self.match_date,
            lot: self.lot,
            created_at: now,
        }
    }
}

/// Request payload for a new TGR (artistic form) schedule entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTgrRequest {
    pub category: TgrCategory,

    #[validate(length(min = 1, max = 255))]
    pub kelas: String,

    #[validate(length(min = 1, max = 3, message = "Between 1 and 3 participants"))]
    pub participant_names: Vec<String>,

    #[validate(length(min = 1, max = 255))]
    pub contingent: String,

    #[validate(length(max = 255))]
    pub gelanggang: Option<String>,

    pub match_date: Option<NaiveDate>,

    #[validate(range(min = 1))]
    pub lot: Option<i32>,
}

impl CreateTgrRequest {
    pub fn into_schedule(self, now: DateTime<Utc>) -> ScheduleTgr {
        ScheduleTgr {
            schedule_id: Uuid::new_v4(),
            category: self.category,
            kelas: self.kelas,
            participant_names: self
                .participant_names
                .into_iter()
                .map(|n| n.trim().to_string())
                .collect(),
            contingent: self.contingent,
            gelanggang: self.gelanggang,
            match_date: self.match_date,
            lot: self.lot,
            created_at: now,
        }
    }
}

/// Comma-separated gelanggang names, as typed by the operator
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DistributeRequest {
    pub venues: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TandingBucket {
    pub venue: String,
    pub entries: Vec<ScheduleTanding>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TgrBucket {
    pub venue: String,
    pub entries: Vec<ScheduleTgr>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TandingDistributionResponse {
    pub buckets: Vec<TandingBucket>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TgrDistributionResponse {
    pub buckets: Vec<TgrBucket>,
}

impl From<VenueAssignment<ScheduleTanding>> for TandingDistributionResponse {
    fn from(assignment: VenueAssignment<ScheduleTanding>) -> Self {
        Self {
            buckets: assignment
                .buckets
                .into_iter()
                .map(|b| TandingBucket {
                    venue: b.venue,
                    entries: b.entries,
                })
                .collect(),
        }
    }
}

impl From<VenueAssignment<ScheduleTgr>> for TgrDistributionResponse {
    fn from(assignment: VenueAssignment<ScheduleTgr>) -> Self {
        Self {
            buckets: assignment
                .buckets
                .into_iter()
                .map(|b| TgrBucket {
                    venue: b.venue,
                    entries: b.entries,
                })
                .collect(),
        }
    }
}
