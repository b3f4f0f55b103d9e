//! Allocation Interval Analyzer — maximum concurrent committed percentage
//! for one resource, via an event sweep over its allocation windows.
//!
//! Windows are half-open `[start, end)`. Every event sharing a date is
//! applied before the running total is sampled, so an allocation ending on
//! the day another starts never overlaps it, and zero-length windows add
//! nothing. Allocations missing either date are always concurrent: their sum
//! is added on top of the dated peak.
//!
//! Loads are summed in whole hundredths of a percent, so fractional inputs
//! that add up to exactly 100 stay at 100.
//!
//! Reporting only. Over-allocation is a fact for the caller, never an error.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::allocation::Allocation;

/// Load above this is over-allocation.
pub const FULL_CAPACITY: f64 = 100.0;

/// The part of an allocation the sweep looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Commitment {
    pub percentage: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<&Allocation> for Commitment {
    fn from(a: &Allocation) -> Self {
        Self {
            percentage: a.allocation_percentage,
            start_date: a.start_date,
            end_date: a.end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MalformedInterval {
    #[error("allocation #{index} has negative percentage {percentage}")]
    NegativePercentage { index: usize, percentage: f64 },

    #[error("allocation #{index} has a non-finite percentage")]
    NonFinitePercentage { index: usize },

    #[error("allocation #{index} ends {end} before it starts {start}")]
    EndBeforeStart {
        index: usize,
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// First window during which the dated peak load holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeakWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub max_load: f64,
    pub is_over_allocated: bool,
    /// How far `max_load` exceeds full capacity; 0 when it does not.
    pub excess: f64,
    /// Sum of allocations without a complete date range.
    pub undated_load: f64,
    /// `None` when the peak comes from undated allocations alone.
    pub peak_window: Option<PeakWindow>,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.max_load)?;
        match self.peak_window {
            Some(w) => write!(f, " during {} to {}", w.start, w.end),
            None if self.undated_load > 0.0 => write!(f, " across undated allocations"),
            None => Ok(()),
        }
    }
}

pub fn is_over_allocated(load: f64) -> bool {
    hundredths(load) > hundredths(FULL_CAPACITY)
}

/// Percentage as an exact count of hundredths of a percent.
fn hundredths(percentage: f64) -> i64 {
    (percentage * 100.0).round() as i64
}

fn percent(amount: i64) -> f64 {
    amount as f64 / 100.0
}

/// Peak concurrent load only.
pub fn max_concurrent_load(commitments: &[Commitment]) -> Result<f64, MalformedInterval> {
    Ok(analyze(commitments)?.max_load)
}

/// Full sweep: peak load, over-allocation flag, excess and peak window.
pub fn analyze(commitments: &[Commitment]) -> Result<LoadReport, MalformedInterval> {
    let mut events: Vec<(NaiveDate, i64)> = Vec::with_capacity(commitments.len() * 2);
    let mut undated: i64 = 0;

    for (index, c) in commitments.iter().enumerate() {
        if !c.percentage.is_finite() {
            return Err(MalformedInterval::NonFinitePercentage { index });
        }
        if c.percentage < 0.0 {
            return Err(MalformedInterval::NegativePercentage {
                index,
                percentage: c.percentage,
            });
        }
        let amount = hundredths(c.percentage);
        match (c.start_date, c.end_date) {
            (Some(start), Some(end)) => {
                if end < start {
                    return Err(MalformedInterval::EndBeforeStart { index, start, end });
                }
                events.push((start, amount));
                events.push((end, -amount));
            }
            _ => undated += amount,
        }
    }

    events.sort_by_key(|(date, _)| *date);

    let mut running: i64 = 0;
    let mut dated_peak: i64 = 0;
    let mut peak_window = None;
    let mut open_peak: Option<NaiveDate> = None;

    for group in events.chunk_by(|a, b| a.0 == b.0) {
        let date = group[0].0;
        running += group.iter().map(|(_, delta)| delta).sum::<i64>();
        if running > dated_peak {
            dated_peak = running;
            open_peak = Some(date);
            peak_window = None;
        } else if running < dated_peak {
            if let Some(start) = open_peak.take() {
                peak_window = Some(PeakWindow { start, end: date });
            }
        }
    }

    let peak = dated_peak + undated;
    let capacity = hundredths(FULL_CAPACITY);
    Ok(LoadReport {
        max_load: percent(peak),
        is_over_allocated: peak > capacity,
        excess: percent((peak - capacity).max(0)),
        undated_load: percent(undated),
        peak_window,
    })
}
