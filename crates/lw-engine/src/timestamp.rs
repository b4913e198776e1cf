//! Bracketed access-log timestamp resolution.
//!
//! Log lines carry `dd/Mon/YYYY:HH:MM:SS ±HHMM` between square brackets.
//! The offset is optional in the wild; when present it must sit inside the
//! real-world range UTC-12:00..UTC+14:00 (inclusive). Resolution is
//! stateless per line, so files mixing offsets are fine.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

const DATETIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S";
const OFFSET_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

// Inclusive bounds in minutes from UTC. chrono itself accepts anything
// under ±24h, so the range check is ours.
const MIN_OFFSET_MINUTES: i32 = -12 * 60;
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// A timestamp that could not be resolved; carries the offending text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail} in {raw:?}")]
pub struct TimestampError {
    pub raw: String,
    pub detail: String,
}

impl TimestampError {
    fn new(raw: &str, detail: impl Into<String>) -> Self {
        Self {
            raw: raw.to_string(),
            detail: detail.into(),
        }
    }

    fn out_of_range(raw: &str, minutes: i32) -> Self {
        Self::new(
            raw,
            format!(
                "timezone offset {} outside -12:00..+14:00",
                fmt_offset(minutes)
            ),
        )
    }
}

/// Outcome of resolving one bracketed timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTimestamp {
    pub timestamp: DateTime<FixedOffset>,
    /// True when the line carried no offset and UTC was attached. The
    /// wall-clock fields are kept as written.
    pub fallback: bool,
}

/// Resolve `dd/Mon/YYYY:HH:MM:SS [±HHMM]` into an instant with offset.
///
/// Missing offsets fall back to the naive wall clock with an explicit UTC
/// offset attached (flagged via `fallback`). Present-but-invalid offsets
/// are rejected, never silently stripped.
pub fn resolve(raw: &str) -> Result<ResolvedTimestamp, TimestampError> {
    let raw = raw.trim();
    match DateTime::parse_from_str(raw, OFFSET_FORMAT) {
        Ok(timestamp) => {
            let minutes = timestamp.offset().local_minus_utc() / 60;
            if !(MIN_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
                return Err(TimestampError::out_of_range(raw, minutes));
            }
            Ok(ResolvedTimestamp {
                timestamp,
                fallback: false,
            })
        }
        Err(_) => resolve_without_offset(raw),
    }
}

fn resolve_without_offset(raw: &str) -> Result<ResolvedTimestamp, TimestampError> {
    let (datetime_part, trailer) = match raw.split_once(' ') {
        Some((head, rest)) => (head, rest.trim()),
        None => (raw, ""),
    };

    if trailer.starts_with('+') || trailer.starts_with('-') {
        // The line tried to carry an offset that chrono already refused.
        return Err(match offset_minutes(trailer) {
            Some(minutes) => TimestampError::out_of_range(raw, minutes),
            None => TimestampError::new(
                raw,
                format!("timezone offset must be ±HHMM, got {trailer:?}"),
            ),
        });
    }

    let naive = NaiveDateTime::parse_from_str(datetime_part, DATETIME_FORMAT)
        .map_err(|_| TimestampError::new(raw, "expected dd/Mon/YYYY:HH:MM:SS [±HHMM]"))?;
    Ok(ResolvedTimestamp {
        timestamp: Utc.from_utc_datetime(&naive).fixed_offset(),
        fallback: true,
    })
}

/// Signed minutes for a structurally valid `±HHMM` token, `None` otherwise.
fn offset_minutes(token: &str) -> Option<i32> {
    let (sign, digits) = token.split_at(1);
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    let total = hours * 60 + minutes;
    Some(if sign == "-" { -total } else { total })
}

fn fmt_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    let abs = minutes.abs();
    format!("{sign}{:02}:{:02}", abs / 60, abs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_utc_offset() {
        let resolved = resolve("10/Oct/2023:13:55:36 +0000").unwrap();
        assert!(!resolved.fallback);
        assert_eq!(
            resolved.timestamp.to_rfc3339(),
            "2023-10-10T13:55:36+00:00"
        );
    }

    #[test]
    fn negative_offset_same_instant_as_utc() {
        let local = resolve("10/Oct/2023:13:55:36 -0500").unwrap();
        let utc = resolve("10/Oct/2023:18:55:36 +0000").unwrap();
        assert_eq!(local.timestamp, utc.timestamp);
    }

    #[test]
    fn half_hour_offset_is_valid() {
        let resolved = resolve("10/Oct/2023:13:55:36 +0530").unwrap();
        assert_eq!(resolved.timestamp.offset().local_minus_utc(), 5 * 3600 + 1800);
    }

    #[test]
    fn extreme_offsets_are_inclusive() {
        assert!(resolve("10/Oct/2023:13:55:36 -1200").is_ok());
        assert!(resolve("10/Oct/2023:13:55:36 +1400").is_ok());
    }

    #[test]
    fn offset_past_plus_1400_is_rejected() {
        let err = resolve("10/Oct/2023:13:55:36 +1500").unwrap_err();
        assert!(err.raw.contains("+1500"));
        assert!(err.detail.contains("+15:00"), "{}", err.detail);
    }

    #[test]
    fn offset_past_minus_1200_is_rejected() {
        let err = resolve("10/Oct/2023:13:55:36 -1300").unwrap_err();
        assert!(err.detail.contains("-13:00"), "{}", err.detail);
    }

    #[test]
    fn offset_beyond_chrono_range_is_rejected() {
        // chrono refuses ±24h outright; the error should still name the range.
        let err = resolve("10/Oct/2023:13:55:36 +2500").unwrap_err();
        assert!(err.detail.contains("outside"), "{}", err.detail);
    }

    #[test]
    fn missing_offset_falls_back_to_utc() {
        let resolved = resolve("10/Oct/2023:13:55:36").unwrap();
        assert!(resolved.fallback);
        assert_eq!(resolved.timestamp.offset().local_minus_utc(), 0);
        // Wall clock preserved, not shifted.
        assert_eq!(
            resolved.timestamp.to_rfc3339(),
            "2023-10-10T13:55:36+00:00"
        );
    }

    #[test]
    fn named_zone_trailer_falls_back() {
        let resolved = resolve("10/Oct/2023:13:55:36 EST").unwrap();
        assert!(resolved.fallback);
    }

    #[test]
    fn malformed_offset_shape_is_rejected() {
        for bad in ["+05", "+053", "+ABCD", "-05301", "+0599"] {
            let raw = format!("10/Oct/2023:13:55:36 {bad}");
            let err = resolve(&raw).unwrap_err();
            assert!(err.raw.contains(bad), "{bad} should be in {:?}", err.raw);
        }
    }

    #[test]
    fn garbage_datetime_is_rejected() {
        assert!(resolve("not-a-timestamp").is_err());
        assert!(resolve("99/Zzz/2023:13:55:36 +0000").is_err());
    }

    #[test]
    fn wall_clock_round_trips() {
        let raw = "10/Oct/2023:13:55:36 +0530";
        let resolved = resolve(raw).unwrap();
        assert_eq!(resolved.timestamp.format(OFFSET_FORMAT).to_string(), raw);
    }
}
