//! Human timestamps (`"1:30"`, `"1:02:03.5"`, `"0:00:00:01"`) and their
//! mapping onto frame positions.

use crate::error::{PaudError, Result};

/// Milliseconds per field, from seconds (rightmost) up to days (leftmost).
const FIELD_WEIGHTS_MS: [u64; 4] = [1_000, 60_000, 3_600_000, 86_400_000];

/// Fractional digits beyond this can't move the truncated result.
const MAX_FRACTION_DIGITS: usize = 30;

/// Parse a `[[[days:]hours:]minutes:]seconds` timestamp into whole milliseconds.
///
/// Every field may carry a decimal fraction. The result is truncated, never
/// rounded.
pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
    let fields: Vec<&str> = timestamp.split(':').collect();
    if fields.len() > FIELD_WEIGHTS_MS.len() {
        return Err(PaudError::Parse(format!(
            "timestamp {timestamp:?} has {} fields, at most {} allowed",
            fields.len(),
            FIELD_WEIGHTS_MS.len()
        )));
    }

    let mut total: u128 = 0;
    for (field, weight) in fields.iter().rev().zip(FIELD_WEIGHTS_MS) {
        let ms = field_ms(field.trim(), weight).ok_or_else(|| {
            PaudError::Parse(format!(
                "non-numeric field {field:?} in timestamp {timestamp:?}"
            ))
        })?;
        total = total.saturating_add(ms);
    }

    u64::try_from(total)
        .map_err(|_| PaudError::Parse(format!("timestamp {timestamp:?} is too large")))
}

/// Index of the frame at `ms` milliseconds: `floor(ms * frame_rate / 1000)`.
pub fn ms_to_frame_index(ms: u64, frame_rate: u32) -> usize {
    let index = ms as u128 * frame_rate as u128 / 1000;
    usize::try_from(index).unwrap_or(usize::MAX)
}

/// Exact `floor(field * weight)` for a non-negative decimal field.
fn field_ms(field: &str, weight: u64) -> Option<u128> {
    let (whole, fraction) = field.split_once('.').unwrap_or((field, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let whole_value: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().ok()?
    };

    let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    let fraction_ms = if fraction.is_empty() {
        0
    } else {
        let numerator: u128 = fraction.parse().ok()?;
        numerator * weight as u128 / 10u128.pow(fraction.len() as u32)
    };

    whole_value
        .checked_mul(weight as u128)?
        .checked_add(fraction_ms)
}
