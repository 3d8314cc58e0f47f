//! Shared form validation helpers.
//!
//! # Design
//! - Forms keep raw strings; validation converts them into API inputs or a
//!   per-field error map.
//! - The first failing rule for a field wins, matching how inputs show one message.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static EMAIL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());
static PHONE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\+?[1-9]\d{7,14}$").ok());

const PASSWORD_SPECIALS: &str = r"!@#$%^&*()_+{}[]:;<>,.?~\/-";

/// Per-field validation messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    /// Record `message` for `field` unless it already has one.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Record `message` when `failed` holds.
    pub fn check(&mut self, failed: bool, field: &'static str, message: &str) {
        if failed {
            self.insert(field, message);
        }
    }

    /// Message for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether `field` has a message.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(build())` when empty, otherwise the errors.
    ///
    /// # Errors
    ///
    /// Returns `self` when any field failed.
    pub fn finish<T>(self, build: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(build()) } else { Err(self) }
    }
}

/// Whether a trimmed value is blank.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Trimmed value, or `None` when blank.
#[must_use]
pub fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Basic `local@domain.tld` shape check.
#[must_use]
pub fn is_email(value: &str) -> bool {
    EMAIL
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(value.trim()))
}

/// International phone number with 8 to 15 digits.
#[must_use]
pub fn is_phone(value: &str) -> bool {
    let value = value.trim();
    let digits = value.chars().filter(char::is_ascii_digit).count();
    PHONE
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(value))
        && digits >= 8
}

/// Absolute `http`, `https`, or `ftp` URL.
#[must_use]
pub fn is_url(value: &str) -> bool {
    Url::parse(value.trim())
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https" | "ftp") && url.has_host())
}

/// At least 8 characters with an uppercase letter and a special character.
#[must_use]
pub fn is_strong_password(value: &str) -> bool {
    value.chars().count() >= 8
        && value.chars().any(char::is_uppercase)
        && value.chars().any(|ch| PASSWORD_SPECIALS.contains(ch))
}

/// Character length within `[min, max]`, measured on the trimmed value.
#[must_use]
pub fn length_between(value: &str, min: usize, max: usize) -> bool {
    let len = value.trim().chars().count();
    (min..=max).contains(&len)
}

/// Parse a decimal number, `None` when blank or malformed.
#[must_use]
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Standard name rule for catalogue entities: required, 2 to 50 characters.
pub fn check_catalogue_name(errors: &mut FieldErrors, field: &'static str, value: &str) {
    errors.check(is_blank(value), field, "Name is required");
    errors.check(
        value.trim().chars().count() < 2,
        field,
        "Name should be at least 2 characters",
    );
    errors.check(
        value.trim().chars().count() > 50,
        field,
        "Name should not exceed 50 characters",
    );
}

/// Email rule shared by company and user forms.
pub fn check_email(errors: &mut FieldErrors, field: &'static str, value: &str, invalid: &str) {
    errors.check(is_blank(value), field, "Email is required");
    errors.check(!is_email(value), field, invalid);
}

/// Split a comma separated list, dropping blanks and duplicates.
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in value.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        if !items.iter().any(|existing| existing == item) {
            items.push(item.to_string());
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_per_field_wins() {
        let mut errors = FieldErrors::default();
        errors.check(true, "name", "Name is required");
        errors.check(true, "name", "Name should be at least 2 characters");
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.len(), 1);
        assert!(errors.clone().finish(|| ()).is_err());
        assert_eq!(FieldErrors::default().finish(|| 5), Ok(5));
    }

    #[test]
    fn phone_rule_requires_international_digits() {
        assert!(is_phone("+381641234567"));
        assert!(is_phone("38164123"));
        assert!(!is_phone("+0641234567"));
        assert!(!is_phone("1234567"));
        assert!(!is_phone("+38 164 123 456"));
        assert!(!is_phone("+1234567890123456"));
    }

    #[test]
    fn email_and_url_shapes() {
        assert!(is_email("ops@dealer.example"));
        assert!(!is_email("ops@dealer"));
        assert!(!is_email("two words@x.io"));
        assert!(is_url("https://inventory.example.com/api/cars"));
        assert!(!is_url("inventory.example.com"));
        assert!(!is_url("mailto:ops@example.com"));
    }

    #[test]
    fn password_strength() {
        assert!(is_strong_password("Secret!23"));
        assert!(!is_strong_password("secret!23"));
        assert!(!is_strong_password("Secret123"));
        assert!(!is_strong_password("Se!1"));
    }

    #[test]
    fn catalogue_names_are_bounded() {
        let mut errors = FieldErrors::default();
        check_catalogue_name(&mut errors, "name", "A");
        assert_eq!(
            errors.get("name"),
            Some("Name should be at least 2 characters")
        );
        let mut errors = FieldErrors::default();
        check_catalogue_name(&mut errors, "name", &"x".repeat(51));
        assert_eq!(
            errors.get("name"),
            Some("Name should not exceed 50 characters")
        );
        let mut errors = FieldErrors::default();
        check_catalogue_name(&mut errors, "name", "Premium");
        assert!(errors.is_empty());
    }

    #[test]
    fn helpers_trim_and_parse() {
        assert_eq!(optional("  "), None);
        assert_eq!(optional(" Belgrade "), Some("Belgrade".into()));
        assert_eq!(parse_number(" 1.5 "), Some(1.5));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert!(length_between(" ab ", 2, 50));
        assert_eq!(split_list("sales, service,,sales"), vec!["sales", "service"]);
    }
}
