//! Common validation utilities.

use validator::ValidationError;

/// Longest interval a schedule may contain (ten years).
pub const MAX_INTERVAL_DAYS: i32 = 3650;

/// Maximum number of entries in an interval schedule.
pub const MAX_SCHEDULE_LENGTH: usize = 100;

/// Validates a spaced-repetition interval schedule.
///
/// The schedule must be non-empty, no longer than 100 entries, and every
/// interval must be between 0 and 3650 days.
pub fn validate_interval_days(intervals: &[i32]) -> Result<(), ValidationError> {
    if intervals.is_empty() {
        let mut err = ValidationError::new("intervals_empty");
        err.message = Some("At least one interval is required".into());
        return Err(err);
    }

    if intervals.len() > MAX_SCHEDULE_LENGTH {
        let mut err = ValidationError::new("intervals_too_many");
        err.message = Some("At most 100 intervals are allowed".into());
        return Err(err);
    }

    if intervals
        .iter()
        .any(|days| !(0..=MAX_INTERVAL_DAYS).contains(days))
    {
        let mut err = ValidationError::new("interval_range");
        err.message = Some("Intervals must be between 0 and 3650 days".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a string contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a push endpoint is an absolute http(s) URL.
pub fn validate_push_endpoint(endpoint: &str) -> Result<(), ValidationError> {
    if endpoint.starts_with("https://") || endpoint.starts_with("http://") {
        Ok(())
    } else {
        let mut err = ValidationError::new("endpoint_scheme");
        err.message = Some("Endpoint must be an http(s) URL".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_interval_days() {
        assert!(validate_interval_days(&[1, 3, 7, 14, 30]).is_ok());
        assert!(validate_interval_days(&[0]).is_ok());
        assert!(validate_interval_days(&[MAX_INTERVAL_DAYS]).is_ok());
    }

    #[test]
    fn test_validate_interval_days_empty() {
        let err = validate_interval_days(&[]).unwrap_err();
        assert_eq!(err.code, "intervals_empty");
    }

    #[test]
    fn test_validate_interval_days_out_of_range() {
        assert!(validate_interval_days(&[1, -1]).is_err());
        assert!(validate_interval_days(&[MAX_INTERVAL_DAYS + 1]).is_err());
    }

    #[test]
    fn test_validate_interval_days_too_many() {
        let intervals = vec![1; MAX_SCHEDULE_LENGTH + 1];
        let err = validate_interval_days(&intervals).unwrap_err();
        assert_eq!(err.code, "intervals_too_many");
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Learn the bones").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   \t").is_err());
    }

    #[test]
    fn test_validate_push_endpoint() {
        assert!(validate_push_endpoint("https://push.example.com/abc").is_ok());
        assert!(validate_push_endpoint("http://localhost:9000/hook").is_ok());
        assert!(validate_push_endpoint("ftp://example.com").is_err());
        assert!(validate_push_endpoint("push.example.com").is_err());
    }
}
