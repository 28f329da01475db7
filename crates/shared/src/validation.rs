//! Common validation utilities.

use validator::ValidationError;

/// Minimum digits for a phone number.
const PHONE_MIN_DIGITS: usize = 8;

/// Maximum digits for a phone number.
const PHONE_MAX_DIGITS: usize = 15;

/// Validates a phone number: optional leading `+`, then 8-15 digits with
/// optional spaces, dots, or dashes between groups.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let trimmed = phone.trim();
    let rest = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let mut digits = 0usize;
    for c in rest.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '.' | '-' => {}
            _ => {
                let mut err = ValidationError::new("phone_format");
                err.message = Some("Phone number contains invalid characters".into());
                return Err(err);
            }
        }
    }

    if (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_length");
        err.message = Some("Phone number must contain 8 to 15 digits".into());
        Err(err)
    }
}

/// Validates that a monetary amount is non-negative.
pub fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if amount >= 0.0 && amount.is_finite() {
        Ok(())
    } else {
        let mut err = ValidationError::new("amount_range");
        err.message = Some("Amount must be non-negative".into());
        Err(err)
    }
}

/// Validates a 24-hour `HH:MM` time-of-day string.
pub fn validate_time_hhmm(value: &str) -> Result<(), ValidationError> {
    let invalid = || {
        let mut err = ValidationError::new("time_format");
        err.message = Some("Time must be in HH:MM format".into());
        err
    };

    let (hh, mm) = value.split_once(':').ok_or_else(invalid)?;
    if hh.len() != 2 || mm.len() != 2 {
        return Err(invalid());
    }
    let hours: u32 = hh.parse().map_err(|_| invalid())?;
    let minutes: u32 = mm.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok(())
}

/// Validates a permission tag of the form `resource:action`
/// (lowercase segments, e.g. "submissions:approve").
pub fn validate_permission_tag(tag: &str) -> Result<(), ValidationError> {
    let invalid = || {
        let mut err = ValidationError::new("permission_format");
        err.message = Some("Permission must be in resource:action form".into());
        err
    };

    let (resource, action) = tag.split_once(':').ok_or_else(invalid)?;
    let segment_ok = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    };
    if segment_ok(resource) && segment_ok(action) {
        Ok(())
    } else {
        Err(invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Phone tests
    #[test]
    fn test_validate_phone_plain_digits() {
        assert!(validate_phone("0912345678").is_ok());
        assert!(validate_phone("84912345678").is_ok());
    }

    #[test]
    fn test_validate_phone_international() {
        assert!(validate_phone("+84 91 234 5678").is_ok());
        assert!(validate_phone("+1-202-555-0176").is_ok());
    }

    #[test]
    fn test_validate_phone_too_short() {
        let err = validate_phone("12345").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Phone number must contain 8 to 15 digits"
        );
    }

    #[test]
    fn test_validate_phone_too_long() {
        assert!(validate_phone("1234567890123456").is_err());
    }

    #[test]
    fn test_validate_phone_invalid_characters() {
        let err = validate_phone("091234abcd").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Phone number contains invalid characters"
        );
    }

    #[test]
    fn test_validate_phone_plus_only_at_start() {
        assert!(validate_phone("0912+345678").is_err());
    }

    // Amount tests
    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(0.0).is_ok());
        assert!(validate_amount(1_500_000.0).is_ok());
        assert!(validate_amount(-1.0).is_err());
    }

    #[test]
    fn test_validate_amount_non_finite() {
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_amount(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_amount_error_message() {
        let err = validate_amount(-10.0).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Amount must be non-negative"
        );
    }

    // Time tests
    #[test]
    fn test_validate_time_hhmm() {
        assert!(validate_time_hhmm("00:00").is_ok());
        assert!(validate_time_hhmm("09:30").is_ok());
        assert!(validate_time_hhmm("23:59").is_ok());
    }

    #[test]
    fn test_validate_time_hhmm_out_of_range() {
        assert!(validate_time_hhmm("24:00").is_err());
        assert!(validate_time_hhmm("12:60").is_err());
    }

    #[test]
    fn test_validate_time_hhmm_malformed() {
        assert!(validate_time_hhmm("9:30").is_err());
        assert!(validate_time_hhmm("0930").is_err());
        assert!(validate_time_hhmm("ab:cd").is_err());
        assert!(validate_time_hhmm("").is_err());
    }

    // Permission tag tests
    #[test]
    fn test_validate_permission_tag() {
        assert!(validate_permission_tag("submissions:approve").is_ok());
        assert!(validate_permission_tag("tasks:edit").is_ok());
        assert!(validate_permission_tag("finance:view").is_ok());
    }

    #[test]
    fn test_validate_permission_tag_underscore_segments() {
        assert!(validate_permission_tag("event_documents:delete").is_ok());
    }

    #[test]
    fn test_validate_permission_tag_malformed() {
        assert!(validate_permission_tag("submissions").is_err());
        assert!(validate_permission_tag(":approve").is_err());
        assert!(validate_permission_tag("submissions:").is_err());
        assert!(validate_permission_tag("Submissions:Approve").is_err());
        assert!(validate_permission_tag("a b:c").is_err());
    }
}
