//! Hourly occupancy estimate domain type
//!
//! An [`OccupancyEstimate`] is the one validated representation of a 24-hour
//! occupancy schedule: exactly 24 fractional values, hour 0 through hour 23,
//! each in [0.0, 1.0]. It can only be constructed through [`OccupancyEstimate::new`],
//! so holding one is proof the invariant holds.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors from constructing an occupancy estimate
///
/// No clamping and no partial acceptance: a wrong-length or out-of-range
/// vector is rejected whole.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstimateError {
    #[error("estimate must contain exactly 24 values, got {actual}")]
    WrongLength { actual: usize },

    #[error("estimate value {value} at hour {hour} is outside [0, 1]")]
    OutOfRange { hour: usize, value: f64 },
}

/// A validated 24-hour occupancy schedule
///
/// Index i is the occupancy fraction for hour i (0-23), where 0.0 is vacant
/// and 1.0 is fully occupied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyEstimate(Vec<f64>);

impl OccupancyEstimate {
    /// Number of hourly samples in a schedule
    pub const HOURS: usize = 24;

    /// Validate and wrap a raw hourly vector
    pub fn new(values: Vec<f64>) -> Result<Self, EstimateError> {
        debug!(count = %values.len(), "OccupancyEstimate::new: called");
        if values.len() != Self::HOURS {
            debug!(actual = %values.len(), "OccupancyEstimate::new: wrong length");
            return Err(EstimateError::WrongLength { actual: values.len() });
        }

        for (hour, &value) in values.iter().enumerate() {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                debug!(%hour, %value, "OccupancyEstimate::new: value out of range");
                return Err(EstimateError::OutOfRange { hour, value });
            }
        }

        Ok(Self(values))
    }

    /// Borrow the hourly values, hour 0 first
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Consume the estimate and return the hourly values
    pub fn into_values(self) -> Vec<f64> {
        self.0
    }
}

impl TryFrom<Vec<f64>> for OccupancyEstimate {
    type Error = EstimateError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}
