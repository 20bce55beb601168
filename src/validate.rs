//! Pure validation of forecast points and query ranges.
//!
//! Submitted timestamps carry the offset they arrived with so that non-UTC
//! instants are rejected here instead of silently converted.

use chrono::{DateTime, Duration, FixedOffset, Timelike};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::ForecastPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("timestamps must be in UTC")]
    InvalidTimezone,

    #[error("timestamps must be hour-aligned (minutes and seconds must be 0)")]
    InvalidHourAlignment,

    #[error("MWh values must be non-negative")]
    NegativeMwh,

    #[error("start time must be before end time")]
    InvalidTimeRange,

    #[error("time range cannot exceed {max_days} days")]
    TimeRangeTooLarge { max_days: i64 },
}

pub fn validate_point(point: &ForecastPoint) -> Result<(), ValidationError> {
    validate_instant(point.hour_utc)?;
    if point.mwh < Decimal::ZERO {
        return Err(ValidationError::NegativeMwh);
    }
    Ok(())
}

/// A range is valid when both bounds are UTC, hour-aligned, `from < to` and
/// the window does not exceed `max_days`. Exactly `max_days` is allowed; the
/// ceiling bounds query cost, it is not a forecast-horizon rule.
pub fn validate_range(
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
    max_days: i64,
) -> Result<(), ValidationError> {
    validate_instant(from)?;
    validate_instant(to)?;
    if from >= to {
        return Err(ValidationError::InvalidTimeRange);
    }
    if to - from > Duration::days(max_days) {
        return Err(ValidationError::TimeRangeTooLarge { max_days });
    }
    Ok(())
}

fn validate_instant(instant: DateTime<FixedOffset>) -> Result<(), ValidationError> {
    if instant.offset().local_minus_utc() != 0 {
        return Err(ValidationError::InvalidTimezone);
    }
    if instant.minute() != 0 || instant.second() != 0 || instant.nanosecond() != 0 {
        return Err(ValidationError::InvalidHourAlignment);
    }
    Ok(())
}
