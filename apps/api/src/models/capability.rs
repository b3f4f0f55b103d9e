use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Ordered proficiency scale. Variant order is the ordinal order, so the
/// derived `Ord` is the comparison the scorer relies on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "proficiency_level")]
pub enum ProficiencyLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl ProficiencyLevel {
    pub const ALL: [ProficiencyLevel; 4] = [
        ProficiencyLevel::Beginner,
        ProficiencyLevel::Intermediate,
        ProficiencyLevel::Advanced,
        ProficiencyLevel::Expert,
    ];

    /// Ordinal rank, 1 (Beginner) to 4 (Expert).
    pub fn rank(self) -> i32 {
        match self {
            ProficiencyLevel::Beginner => 1,
            ProficiencyLevel::Intermediate => 2,
            ProficiencyLevel::Advanced => 3,
            ProficiencyLevel::Expert => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProficiencyLevel::Beginner => "Beginner",
            ProficiencyLevel::Intermediate => "Intermediate",
            ProficiencyLevel::Advanced => "Advanced",
            ProficiencyLevel::Expert => "Expert",
        }
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("Unknown proficiency level '{0}'")]
pub struct UnknownProficiency(pub String);

impl FromStr for ProficiencyLevel {
    type Err = UnknownProficiency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownProficiency(s.to_string()))
    }
}

/// Resource-side skill fact.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Capability {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub app_id: Uuid,
    pub technology_id: Uuid,
    pub role_id: Uuid,
    pub proficiency_level: ProficiencyLevel,
    pub years_of_experience: Option<f64>,
    pub is_primary: bool,
}

/// Project-side need for a capability combination.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Requirement {
    pub id: Uuid,
    pub project_id: Uuid,
    pub app_id: Uuid,
    pub technology_id: Uuid,
    pub role_id: Uuid,
    pub proficiency_level: ProficiencyLevel,
    pub min_years_exp: Option<f64>,
    pub required_count: i32,
    pub fulfilled_count: i32,
}

impl Requirement {
    /// Headcount still to be filled. Never negative.
    pub fn open_positions(&self) -> i32 {
        (self.required_count - self.fulfilled_count).max(0)
    }
}
