use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Common shape of the append-only ledger entries.
pub trait LedgerEvent: PartialEq {
    fn event_id(&self) -> Uuid;
    fn timestamp(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Technique {
    /// Strike
    Pukulan,
    /// Kick
    Tendangan,
    /// Takedown
    Jatuhan,
    /// Lock
    Kuncian,
    Lainnya,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreDetail {
    pub event_id: Uuid,
    pub technique: Technique,
    /// Negative only for corrective entries.
    pub points: i32,
    pub timestamp: DateTime<Utc>,
    /// Score entry this one corrects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrects: Option<Uuid>,
}

impl LedgerEvent for ScoreDetail {
    fn event_id(&self) -> Uuid {
        self.event_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Severity ladder of a pelanggaran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FoulType {
    Teguran,
    PeringatanPertama,
    PeringatanKedua,
    Diskualifikasi,
}

impl FoulType {
    /// Deduction applied when the judge does not state one explicitly.
    pub fn default_deduction(self) -> i32 {
        match self {
            Self::Teguran => 1,
            Self::PeringatanPertama => 5,
            Self::PeringatanKedua => 10,
            Self::Diskualifikasi => 0,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Diskualifikasi)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Foul {
    pub event_id: Uuid,
    pub foul_type: FoulType,
    pub description: String,
    pub points_deducted: i32,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEvent for Foul {
    fn event_id(&self) -> Uuid {
        self.event_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum WarningType {
    /// Coaching note, no formal consequence.
    Binaan,
    Peringatan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Warning {
    pub event_id: Uuid,
    pub warning_type: WarningType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEvent for Warning {
    fn event_id(&self) -> Uuid {
        self.event_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
