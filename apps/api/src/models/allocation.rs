use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A time-bounded percentage commitment of one resource to one project.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Allocation {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub project_id: Uuid,
    pub allocation_percentage: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub match_score: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating an allocation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAllocation {
    pub resource_id: Uuid,
    pub project_id: Uuid,
    pub allocation_percentage: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllocationChanges {
    pub allocation_percentage: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl AllocationChanges {
    /// Applies the changes to a copy of `current` without touching storage.
    pub fn apply_to(&self, current: &Allocation) -> Allocation {
        let mut next = current.clone();
        if let Some(pct) = self.allocation_percentage {
            next.allocation_percentage = pct;
        }
        if self.start_date.is_some() {
            next.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            next.end_date = self.end_date;
        }
        next
    }
}
