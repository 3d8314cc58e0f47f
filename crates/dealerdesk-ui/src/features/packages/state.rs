//! Package form.

use dealerdesk_api_models::{Package, PackageInput};

use crate::core::validation::{FieldErrors, check_catalogue_name, parse_number};

/// Editable package fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageForm {
    /// Display name.
    pub name: String,
    /// Price, as typed.
    pub price: String,
    /// Included conversations, as typed.
    pub conversations_limit: String,
}

impl PackageForm {
    /// Prefill from a saved package.
    #[must_use]
    pub fn from_package(package: &Package) -> Self {
        Self {
            name: package.name.clone(),
            price: package.price.to_string(),
            conversations_limit: package.conversations_limit.to_string(),
        }
    }

    /// Validate and build the request body.
    ///
    /// # Errors
    ///
    /// Returns per-field messages when a rule fails.
    pub fn validate(&self) -> Result<PackageInput, FieldErrors> {
        let mut errors = FieldErrors::default();
        check_catalogue_name(&mut errors, "name", &self.name);
        let price = parse_number(&self.price).filter(|price| *price >= 0.0);
        errors.check(price.is_none(), "price", "Price must be a number");
        let limit = self.conversations_limit.trim().parse::<u32>().ok();
        errors.check(
            limit.is_none(),
            "conversations_limit",
            "Conversations limit must be a whole number",
        );
        errors.finish(|| PackageInput {
            name: self.name.trim().to_string(),
            price: price.unwrap_or_default(),
            conversations_limit: limit.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_parsed() {
        let form = PackageForm {
            name: "Starter".into(),
            price: "49.90".into(),
            conversations_limit: "500".into(),
        };
        let input = form.validate().expect("valid");
        assert!((input.price - 49.9).abs() < 1e-9);
        assert_eq!(input.conversations_limit, 500);
    }

    #[test]
    fn long_names_and_bad_numbers_fail() {
        let form = PackageForm {
            name: "x".repeat(51),
            price: "free".into(),
            conversations_limit: "-1".into(),
        };
        let errors = form.validate().expect_err("invalid");
        assert_eq!(errors.get("name"), Some("Name should not exceed 50 characters"));
        assert!(errors.has("price"));
        assert!(errors.has("conversations_limit"));
    }
}
