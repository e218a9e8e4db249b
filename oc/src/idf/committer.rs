//! Schedule committer
//!
//! Writes a finalized 24-hour estimate into a named `Schedule:Compact` block:
//! 24 alternating (time, value) field slots in increasing hour order, times
//! `01:00` through `24:00`. Every other object in the document is passed
//! through byte-for-byte.

use thiserror::Error;
use tracing::{debug, info};

use super::ScheduleDocument;
use crate::estimate::{EstimateError, OccupancyEstimate};

/// Class of the target block
const SCHEDULE_CLASS: &str = "Schedule:Compact";

/// Header fields preceding the hourly slots: type limits, Through, For
const HEADER_FIELDS: usize = 4;

/// Errors from committing an estimate
///
/// Both are non-retryable; on either the document is left unmodified.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommitError {
    #[error("schedule block '{0}' not found in document")]
    BlockNotFound(String),

    #[error("invalid estimate: {0}")]
    InvalidEstimate(#[from] EstimateError),
}

/// Overwrite the named schedule block with the given hourly values
///
/// The values are re-validated here independently of the estimation session:
/// this function does not trust its caller. Missing header fields (schedule
/// type limits, `Through:`, `For:`) are filled with defaults; any prior slot
/// content beyond the 24 pairs is truncated.
pub fn commit(
    mut document: ScheduleDocument,
    block_name: &str,
    hourly_values: &[f64],
) -> Result<ScheduleDocument, CommitError> {
    debug!(%block_name, value_count = %hourly_values.len(), "commit: called");
    let estimate = OccupancyEstimate::new(hourly_values.to_vec())?;

    let object = document
        .find_object_mut(SCHEDULE_CLASS, block_name)
        .ok_or_else(|| CommitError::BlockNotFound(block_name.to_string()))?;

    let mut fields = Vec::with_capacity(HEADER_FIELDS + 2 * OccupancyEstimate::HOURS);
    fields.push(block_name.to_string());
    fields.push(header_field(&object.fields, 1, "Fraction"));
    fields.push(header_field(&object.fields, 2, "Through: 12/31"));
    fields.push(header_field(&object.fields, 3, "For: AllDays"));

    for (hour, value) in estimate.values().iter().enumerate() {
        fields.push(format!("{:02}:00", hour + 1));
        fields.push(format!("{}", value));
    }

    object.rewrite(fields);
    info!(%block_name, "commit: schedule block overwritten with 24 hourly values");

    Ok(document)
}

/// Keep an existing non-empty header field, falling back to a default
fn header_field(fields: &[String], index: usize, default: &str) -> String {
    match fields.get(index) {
        Some(field) if !field.trim().is_empty() => field.clone(),
        _ => default.to_string(),
    }
}
