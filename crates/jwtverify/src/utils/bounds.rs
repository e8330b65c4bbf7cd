//! Bounds validation utilities

use crate::error::{Error, Result};
use crate::limits::{MAX_TIMESTAMP, MIN_TIMESTAMP};

/// Check if timestamp is within acceptable bounds
pub(crate) fn validate_timestamp_bounds(value: i64) -> Result<()> {
    if !(MIN_TIMESTAMP..=MAX_TIMESTAMP).contains(&value) {
        return Err(Error::TimestampOutOfBounds {
            value,
            min: MIN_TIMESTAMP,
            max: MAX_TIMESTAMP,
        });
    }
    Ok(())
}

/// Apply clock skew to a timestamp with overflow protection
pub(crate) fn apply_clock_skew(timestamp: i64, skew_seconds: u64, add: bool) -> Result<i64> {
    let skew = i64::try_from(skew_seconds).map_err(|_| Error::TimestampOverflow)?;
    if add {
        timestamp.checked_add(skew)
    } else {
        timestamp.checked_sub(skew)
    }
    .ok_or(Error::TimestampOverflow)
}

/// Validate string field size
pub(crate) fn validate_field_size(field: &str, value: &str, max: usize) -> Result<()> {
    if value.len() > max {
        return Err(Error::HeaderFieldTooLong {
            field: field.into(),
            length: value.len(),
            max,
        });
    }
    Ok(())
}
