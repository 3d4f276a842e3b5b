//! Expiration-timestamp parsing and the field-wise comparison rule.
//!
//! The identity API stamps token expirations as `2026-08-06T14:02:26.550Z`,
//! sometimes without the fractional seconds. Whether a token outlives a
//! reference instant is decided by comparing calendar fields
//! most-significant first, with the caller's tolerance added to the seconds
//! field of the reference alone. The tolerance is intentionally not
//! normalized into the minute field: a tolerance that pushes seconds past 59
//! only biases that one comparison. Services downstream depend on this exact
//! rule, so it is preserved as-is rather than replaced with timestamp
//! subtraction.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::error::AuthError;

/// Accepted expiration stamp layouts, tried in order.
const TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S.%fZ", "%Y-%m-%dT%H:%M:%SZ"];

/// Parse an expiration stamp in one of the accepted layouts.
///
/// Stamps are UTC by definition; no offset other than the trailing `Z` is
/// accepted. Anything else fails with [`AuthError::TimeFormat`].
pub fn parse_expiration(value: &str) -> Result<NaiveDateTime, AuthError> {
    for format in TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }
    Err(AuthError::TimeFormat {
        value: value.to_string(),
    })
}

/// Whether `expiry` still outlives `now` given a tolerance in seconds.
///
/// Compares `(year, month, day, hour, minute, second)` lexicographically,
/// with `tolerance_secs` added to the seconds field of `now` only. Returns
/// true when `expiry` is strictly later under that order, or when all six
/// fields are equal.
pub fn outlives(expiry: NaiveDateTime, now: NaiveDateTime, tolerance_secs: i64) -> bool {
    let expiry_fields = (
        i64::from(expiry.year()),
        i64::from(expiry.month()),
        i64::from(expiry.day()),
        i64::from(expiry.hour()),
        i64::from(expiry.minute()),
        i64::from(expiry.second()),
    );
    let reference_fields = (
        i64::from(now.year()),
        i64::from(now.month()),
        i64::from(now.day()),
        i64::from(now.hour()),
        i64::from(now.minute()),
        i64::from(now.second()) + tolerance_secs,
    );
    expiry_fields >= reference_fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(value: &str) -> NaiveDateTime {
        parse_expiration(value).unwrap()
    }

    #[test]
    fn test_parses_fractional_and_whole_second_stamps() {
        let with_fraction = stamp("2026-08-06T14:02:26.550Z");
        let without = stamp("2026-08-06T14:02:26Z");
        assert_eq!(with_fraction.second(), 26);
        assert_eq!(without.second(), 26);
        assert_eq!(with_fraction.date(), without.date());
    }

    #[test]
    fn test_rejects_other_layouts() {
        for value in ["2026-08-06 14:02:26", "garbage", "2026-08-06T14:02:26+00:00", ""] {
            match parse_expiration(value) {
                Err(AuthError::TimeFormat { value: v }) => assert_eq!(v, value),
                other => panic!("expected AuthError::TimeFormat for {value:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_later_now_means_expired() {
        // expiry 00:00:00, now 00:00:01: now is later, the token is gone.
        let expiry = stamp("2024-01-01T00:00:00Z");
        let now = stamp("2024-01-01T00:00:01Z");
        assert!(!outlives(expiry, now, 0));
    }

    #[test]
    fn test_tolerance_narrows_the_window() {
        // expiry 00:00:05 vs now 00:00:03: fine at zero tolerance, but a
        // two-second tolerance makes the fields equal, which still counts
        // as outliving.
        let expiry = stamp("2024-01-01T00:00:05Z");
        let now = stamp("2024-01-01T00:00:03Z");
        assert!(outlives(expiry, now, 0));
        assert!(outlives(expiry, now, 2));
        assert!(!outlives(expiry, now, 3));
    }

    #[test]
    fn test_equal_fields_outlive() {
        let expiry = stamp("2024-06-15T12:30:45Z");
        assert!(outlives(expiry, expiry, 0));
    }

    #[test]
    fn test_higher_field_short_circuits() {
        // A later year wins regardless of every smaller field.
        let expiry = stamp("2025-01-01T00:00:00Z");
        let now = stamp("2024-12-31T23:59:59Z");
        assert!(outlives(expiry, now, 0));
        assert!(!outlives(now, expiry, 0));
    }

    #[test]
    fn test_tolerance_does_not_roll_into_minutes() {
        // now 00:00:58 with a five-second tolerance compares seconds as
        // 0 vs 63, but the expiry's later minute decides first: the token
        // is treated as outliving even though now + 5s is past the expiry
        // on a wall clock.
        let expiry = stamp("2024-01-01T00:01:00Z");
        let now = stamp("2024-01-01T00:00:58Z");
        assert!(outlives(expiry, now, 5));
    }

    #[test]
    fn test_tolerance_applies_within_the_same_minute() {
        let expiry = stamp("2024-01-01T00:01:02Z");
        let now = stamp("2024-01-01T00:01:00Z");
        assert!(outlives(expiry, now, 1));
        assert!(outlives(expiry, now, 2));
        assert!(!outlives(expiry, now, 3));
    }
}
