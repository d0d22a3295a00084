//! Pure normalization and field validation rules.
//!
//! Normalization mirrors what the store applies on writes, so reads and
//! writes always compare the same shape. Validation is fail-fast: each rule
//! returns the first violation as a typed error.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AuthError;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Lowercases and trims an email for both storage and lookup.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Strips everything but digits from a mobile number.
pub fn normalize_mobile(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// First letter uppercased, the rest lowercased, applied on save.
pub fn capitalize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Presence check only; format rules run separately, after the terms and
/// age checks.
pub fn require_present(field: &'static str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::validation(field, "is required"));
    }
    Ok(())
}

/// Letters only, 2 to 30 characters. Returns the capitalized form.
pub fn validate_name(field: &'static str, raw: &str) -> Result<String, AuthError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AuthError::validation(field, "is required"));
    }
    if !trimmed.chars().all(|c| c.is_alphabetic()) {
        return Err(AuthError::validation(field, "must contain letters only"));
    }
    let len = trimmed.chars().count();
    if !(2..=30).contains(&len) {
        return Err(AuthError::validation(field, "must be 2-30 characters"));
    }
    Ok(capitalize_name(trimmed))
}

/// Syntactic check plus the optional single-domain policy. Returns the
/// normalized (lowercased, trimmed) address.
pub fn validate_email(raw: &str, allowed_domain: Option<&str>) -> Result<String, AuthError> {
    let email = normalize_email(raw);
    if email.is_empty() {
        return Err(AuthError::validation("email", "is required"));
    }
    if !is_valid_email(&email) {
        return Err(AuthError::validation("email", "is not a valid email address"));
    }
    if let Some(domain) = allowed_domain {
        let matches = email
            .rsplit_once('@')
            .map(|(_, d)| d == domain)
            .unwrap_or(false);
        if !matches {
            return Err(AuthError::validation(
                "email",
                format!("must be a {domain} address"),
            ));
        }
    }
    Ok(email)
}

/// Must normalize to exactly 10 digits. Returns the digits-only form.
pub fn validate_mobile(raw: &str) -> Result<String, AuthError> {
    let mobile = normalize_mobile(raw);
    if mobile.is_empty() {
        return Err(AuthError::validation("mobile", "is required"));
    }
    if mobile.len() != 10 {
        return Err(AuthError::validation("mobile", "must be 10 digits"));
    }
    Ok(mobile)
}

pub fn validate_age(age: i32) -> Result<(), AuthError> {
    if !(13..=120).contains(&age) {
        return Err(AuthError::validation("age", "must be between 13 and 120"));
    }
    Ok(())
}

/// At least 8 characters with one uppercase, one lowercase, one digit and
/// one symbol.
pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < 8 {
        return Err(AuthError::validation(
            "password",
            "must be at least 8 characters",
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(AuthError::validation(
            "password",
            "must contain an uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(AuthError::validation(
            "password",
            "must contain a lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::validation("password", "must contain a digit"));
    }
    if password.chars().all(|c| c.is_alphanumeric()) {
        return Err(AuthError::validation("password", "must contain a symbol"));
    }
    Ok(())
}

pub fn validate_password_pair(password: &str, confirm: &str) -> Result<(), AuthError> {
    validate_password_strength(password)?;
    if password != confirm {
        return Err(AuthError::validation(
            "confirmPassword",
            "passwords do not match",
        ));
    }
    Ok(())
}

pub fn validate_terms(terms_accepted: bool) -> Result<(), AuthError> {
    if !terms_accepted {
        return Err(AuthError::validation(
            "termsAccepted",
            "you must accept terms and conditions",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: AuthError) -> &'static str {
        match err {
            AuthError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn presence_check_rejects_blank_values() {
        assert!(require_present("email", "ann@gmail.com").is_ok());
        assert_eq!(field_of(require_present("email", "   ").unwrap_err()), "email");
        assert_eq!(field_of(require_present("password", "").unwrap_err()), "password");
    }

    #[test]
    fn email_is_lowercased_and_trimmed() {
        assert_eq!(normalize_email("  Ann@GMail.com "), "ann@gmail.com");
    }

    #[test]
    fn mobile_keeps_digits_only() {
        assert_eq!(normalize_mobile("(987) 654-3210"), "9876543210");
    }

    #[test]
    fn names_are_capitalized_on_save() {
        assert_eq!(capitalize_name("ann"), "Ann");
        assert_eq!(capitalize_name("LEE"), "Lee");
        assert_eq!(validate_name("firstName", " ann ").unwrap(), "Ann");
    }

    #[test]
    fn name_rejects_digits_and_bad_lengths() {
        assert_eq!(field_of(validate_name("firstName", "ann3").unwrap_err()), "firstName");
        assert_eq!(field_of(validate_name("lastName", "a").unwrap_err()), "lastName");
        let long = "a".repeat(31);
        assert!(validate_name("lastName", &long).is_err());
    }

    #[test]
    fn email_syntax_and_domain_policy() {
        assert!(validate_email("ann@gmail.com", None).is_ok());
        assert!(validate_email("not-an-email", None).is_err());
        assert!(validate_email("ann@gmail.com", Some("gmail.com")).is_ok());
        assert_eq!(
            field_of(validate_email("ann@other.com", Some("gmail.com")).unwrap_err()),
            "email"
        );
    }

    #[test]
    fn mobile_must_be_ten_digits() {
        assert_eq!(validate_mobile("987-654-3210").unwrap(), "9876543210");
        assert!(validate_mobile("12345").is_err());
        assert!(validate_mobile("98765432100").is_err());
    }

    #[test]
    fn age_bounds() {
        assert!(validate_age(13).is_ok());
        assert!(validate_age(120).is_ok());
        let err = validate_age(10).unwrap_err();
        match err {
            AuthError::Validation { field, reason } => {
                assert_eq!(field, "age");
                assert_eq!(reason, "must be between 13 and 120");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(validate_age(121).is_err());
    }

    #[test]
    fn password_composition_rules() {
        assert!(validate_password_strength("Abcd123!").is_ok());
        assert!(validate_password_strength("Ab1!").is_err()); // too short
        assert!(validate_password_strength("abcd123!").is_err()); // no upper
        assert!(validate_password_strength("ABCD123!").is_err()); // no lower
        assert!(validate_password_strength("Abcdefg!").is_err()); // no digit
        assert!(validate_password_strength("Abcd1234").is_err()); // no symbol
    }

    #[test]
    fn password_pair_must_match() {
        assert!(validate_password_pair("Abcd123!", "Abcd123!").is_ok());
        assert_eq!(
            field_of(validate_password_pair("Abcd123!", "Abcd124!").unwrap_err()),
            "confirmPassword"
        );
    }

    #[test]
    fn terms_must_be_exactly_true() {
        assert!(validate_terms(true).is_ok());
        assert_eq!(field_of(validate_terms(false).unwrap_err()), "termsAccepted");
    }
}
