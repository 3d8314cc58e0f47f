//! Subscription form and list ordering.
//!
//! # Design
//! - Dates are edited as `YYYY-MM-DD` strings and sent as UTC midnight.

use chrono::{DateTime, NaiveDate, Utc};
use dealerdesk_api_models::{Subscription, SubscriptionInput, SubscriptionType};
use uuid::Uuid;

use crate::core::validation::{FieldErrors, is_blank};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn format_date(value: &DateTime<Utc>) -> String {
    value.format(DATE_FORMAT).to_string()
}

/// Display form of a subscription date, e.g. `01.03.2025`.
#[must_use]
pub fn display_date(value: Option<&DateTime<Utc>>) -> String {
    value.map_or_else(|| "-".to_string(), |date| date.format("%d.%m.%Y").to_string())
}

/// Status pill modifier class.
#[must_use]
pub fn status_class(status: &str) -> &'static str {
    match status {
        "active" => "success",
        "cancelled" => "danger",
        "expired" => "subtle",
        "inactive" => "warning",
        _ => "neutral",
    }
}

/// Newest subscriptions first.
#[must_use]
pub fn newest_first(subscriptions: &[Subscription]) -> Vec<Subscription> {
    let mut sorted = subscriptions.to_vec();
    sorted.sort_by(|left, right| right.start_date.cmp(&left.start_date));
    sorted
}

/// Editable subscription fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionForm {
    /// `YYYY-MM-DD`.
    pub start_date: String,
    /// `YYYY-MM-DD`, optional.
    pub end_date: String,
    /// `basic` or `premium`.
    pub kind: String,
    /// Selected package id.
    pub package_id: String,
}

impl Default for SubscriptionForm {
    fn default() -> Self {
        Self {
            start_date: String::new(),
            end_date: String::new(),
            kind: SubscriptionType::Basic.as_str().to_string(),
            package_id: String::new(),
        }
    }
}

impl SubscriptionForm {
    /// Prefill from a saved subscription.
    #[must_use]
    pub fn from_subscription(subscription: &Subscription) -> Self {
        Self {
            start_date: format_date(&subscription.start_date),
            end_date: subscription.end_date.as_ref().map(format_date).unwrap_or_default(),
            kind: subscription.kind.as_str().to_string(),
            package_id: subscription.package_id.to_string(),
        }
    }

    /// Validate and build the request body for `company_id`.
    ///
    /// # Errors
    ///
    /// Returns per-field messages when a rule fails.
    pub fn validate(&self, company_id: Uuid) -> Result<SubscriptionInput, FieldErrors> {
        let mut errors = FieldErrors::default();

        let start = parse_date(&self.start_date);
        errors.check(start.is_none(), "start_date", "Start date is required");

        let end = if is_blank(&self.end_date) {
            None
        } else {
            let end = parse_date(&self.end_date);
            errors.check(end.is_none(), "end_date", "End date is invalid");
            end
        };
        if let (Some(start), Some(end)) = (start, end) {
            errors.check(end < start, "end_date", "End date must be after start date");
        }

        let kind = match self.kind.as_str() {
            "basic" => Some(SubscriptionType::Basic),
            "premium" => Some(SubscriptionType::Premium),
            "" => {
                errors.insert("type", "Type is required");
                None
            }
            _ => {
                errors.insert("type", "Invalid type");
                None
            }
        };

        let package_id = Uuid::parse_str(self.package_id.trim()).ok();
        errors.check(package_id.is_none(), "package_id", "Package is required");

        match (start, kind, package_id) {
            (Some(start_date), Some(kind), Some(package_id)) if errors.is_empty() => {
                Ok(SubscriptionInput {
                    company_id,
                    package_id,
                    start_date,
                    end_date: end,
                    kind,
                })
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SubscriptionForm {
        SubscriptionForm {
            start_date: "2025-03-01".into(),
            end_date: "2025-04-01".into(),
            kind: "premium".into(),
            package_id: Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn dates_become_utc_midnight() {
        let company_id = Uuid::new_v4();
        let input = form().validate(company_id).expect("valid");
        assert_eq!(input.company_id, company_id);
        assert_eq!(input.start_date.to_rfc3339(), "2025-03-01T00:00:00+00:00");
        assert_eq!(input.kind, SubscriptionType::Premium);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut subscription = form();
        subscription.end_date = "2025-02-01".into();
        assert_eq!(
            subscription
                .validate(Uuid::new_v4())
                .expect_err("backwards")
                .get("end_date"),
            Some("End date must be after start date")
        );
    }

    #[test]
    fn missing_fields_are_reported() {
        let errors = SubscriptionForm::default()
            .validate(Uuid::new_v4())
            .expect_err("empty");
        assert_eq!(errors.get("start_date"), Some("Start date is required"));
        assert_eq!(errors.get("package_id"), Some("Package is required"));
        assert!(!errors.has("type"));
        assert!(!errors.has("end_date"));
    }

    #[test]
    fn dates_display_day_first() {
        let date = parse_date("2025-03-01");
        assert_eq!(display_date(date.as_ref()), "01.03.2025");
        assert_eq!(display_date(None), "-");
        assert_eq!(status_class("cancelled"), "danger");
    }
}
