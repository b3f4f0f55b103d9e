// Allocation integrity: per-resource concurrent load analysis and the
// allocation write surface that re-runs it after every mutation.

use chrono::NaiveDate;

use crate::allocation::sweep::{max_concurrent_load, Commitment};
use crate::errors::AppError;

pub mod handlers;
pub mod sweep;

/// Rejects a single allocation window before it is written. Shape checks
/// go through the analyzer itself.
pub fn check_allocation(
    percentage: f64,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<(), AppError> {
    max_concurrent_load(&[Commitment {
        percentage,
        start_date,
        end_date,
    }])?;
    if percentage > 100.0 {
        return Err(AppError::Validation(format!(
            "allocation_percentage must be between 0 and 100, got {percentage}"
        )));
    }
    Ok(())
}
