//! Unit parsing for legacy configuration values.
//!
//! Legacy documents carry sizes and durations as suffixed strings
//! (`"200MB"`, `"5s"`). Parsing fails loudly with `UnitParse` on anything
//! unrecognized; an unparseable value must never become a silent default.

use crate::{Error, Result};

/// Parse a memory size into whole megabytes.
///
/// Accepted forms: a bare integer (already MB), or an integer with a
/// `KB`, `MB` or `GB` suffix (case-insensitive, optional whitespace).
/// Sub-megabyte values round up to 1 MB.
pub fn parse_size_mb(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    let (number, suffix) = split_unit(trimmed)?;

    match suffix.to_ascii_uppercase().as_str() {
        "" | "MB" => Ok(number),
        "KB" => Ok(number.div_ceil(1024).max(1)),
        "GB" => number.checked_mul(1024).ok_or_else(|| Error::UnitParse {
            value: value.to_string(),
        }),
        _ => Err(Error::UnitParse {
            value: value.to_string(),
        }),
    }
}

/// Parse a duration into whole milliseconds.
///
/// Accepted forms: a bare integer (already ms), or an integer with a
/// `ms`, `s` or `m` suffix (case-insensitive, optional whitespace).
pub fn parse_duration_ms(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    let (number, suffix) = split_unit(trimmed)?;

    match suffix.to_ascii_lowercase().as_str() {
        "" | "ms" => Ok(number),
        "s" => number.checked_mul(1000).ok_or_else(|| Error::UnitParse {
            value: value.to_string(),
        }),
        "m" => number.checked_mul(60_000).ok_or_else(|| Error::UnitParse {
            value: value.to_string(),
        }),
        _ => Err(Error::UnitParse {
            value: value.to_string(),
        }),
    }
}

/// Split a value into its integer prefix and unit suffix.
fn split_unit(value: &str) -> Result<(u64, &str)> {
    let digits_end = value
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(value.len(), |(i, _)| i);

    let (digits, suffix) = value.split_at(digits_end);
    let number: u64 = digits.parse().map_err(|_| Error::UnitParse {
        value: value.to_string(),
    })?;
    Ok((number, suffix.trim()))
}
