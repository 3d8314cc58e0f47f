//! Company group form.

use dealerdesk_api_models::{CompanyGroup, CompanyGroupInput};

use crate::core::validation::{FieldErrors, check_email, is_blank, optional};

/// Editable company group fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompanyGroupForm {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Country (required).
    pub country: String,
    /// City.
    pub city: String,
    /// Street address.
    pub address: String,
    /// Postal code.
    pub postal_code: String,
    /// Contact email (required).
    pub contact_email: String,
    /// Contact phone.
    pub contact_phone: String,
}

impl CompanyGroupForm {
    /// Prefill from an existing group.
    #[must_use]
    pub fn from_group(group: &CompanyGroup) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            name: group.name.clone(),
            description: text(&group.description),
            country: text(&group.country),
            city: text(&group.city),
            address: text(&group.address),
            postal_code: text(&group.postal_code),
            contact_email: text(&group.contact_email),
            contact_phone: text(&group.contact_phone),
        }
    }

    /// Validate and build the request body.
    ///
    /// # Errors
    ///
    /// Returns per-field messages when a rule fails.
    pub fn validate(&self) -> Result<CompanyGroupInput, FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check(is_blank(&self.name), "name", "Name is required");
        errors.check(is_blank(&self.country), "country", "Country is required");
        check_email(
            &mut errors,
            "contact_email",
            &self.contact_email,
            "Invalid email format",
        );
        errors.finish(|| CompanyGroupInput {
            name: self.name.trim().to_string(),
            description: optional(&self.description),
            country: self.country.trim().to_string(),
            city: optional(&self.city),
            address: optional(&self.address),
            postal_code: optional(&self.postal_code),
            contact_email: self.contact_email.trim().to_string(),
            contact_phone: optional(&self.contact_phone),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_and_contact_email_are_required() {
        let form = CompanyGroupForm {
            name: "Balkan Motors".into(),
            ..CompanyGroupForm::default()
        };
        let errors = form.validate().expect_err("invalid");
        assert_eq!(errors.get("country"), Some("Country is required"));
        assert_eq!(errors.get("contact_email"), Some("Email is required"));
        assert!(!errors.has("name"));
    }

    #[test]
    fn postal_code_is_sent_in_camel_case() {
        let form = CompanyGroupForm {
            name: "Balkan Motors".into(),
            country: "Serbia".into(),
            contact_email: "hq@balkan.example".into(),
            postal_code: "11000".into(),
            ..CompanyGroupForm::default()
        };
        let input = form.validate().expect("valid");
        let body = serde_json::to_value(&input).expect("encodes");
        assert_eq!(body["postalCode"], "11000");
        assert_eq!(body["city"], serde_json::Value::Null);
    }
}
