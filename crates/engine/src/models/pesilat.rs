use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Corner a contestant fights from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CornerColor {
    Merah,
    Biru,
}

impl CornerColor {
    pub fn opponent(self) -> Self {
        match self {
            Self::Merah => Self::Biru,
            Self::Biru => Self::Merah,
        }
    }

    /// Parses the path segment form (`merah`, `biru`, also `red`/`blue`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "merah" | "red" => Some(Self::Merah),
            "biru" | "blue" => Some(Self::Biru),
            _ => None,
        }
    }
}

impl fmt::Display for CornerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merah => write!(f, "Merah"),
            Self::Biru => write!(f, "Biru"),
        }
    }
}

/// A contestant. Fixed once the match has been created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pesilat {
    pub pesilat_id: Uuid,
    pub name: String,
    pub contingent: String,
    pub color: CornerColor,
}

impl Pesilat {
    pub fn new(name: impl Into<String>, contingent: impl Into<String>, color: CornerColor) -> Self {
        Self {
            pesilat_id: Uuid::new_v4(),
            name: name.into(),
            contingent: contingent.into(),
            color,
        }
    }
}
