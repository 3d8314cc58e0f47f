//! Feature catalogue form and per-company pricing form.

use dealerdesk_api_models::{BillingType, CompanyFeature, CompanyFeatureInput, Feature, FeatureInput};
use uuid::Uuid;

use crate::core::validation::{FieldErrors, check_catalogue_name, is_blank, optional, parse_number};

/// Editable catalogue feature.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureForm {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
}

impl FeatureForm {
    /// Prefill from a catalogue feature.
    #[must_use]
    pub fn from_feature(feature: &Feature) -> Self {
        Self {
            name: feature.name.clone(),
            description: feature.description.clone().unwrap_or_default(),
        }
    }

    /// Validate and build the request body.
    ///
    /// # Errors
    ///
    /// Returns per-field messages when a rule fails.
    pub fn validate(&self) -> Result<FeatureInput, FieldErrors> {
        let mut errors = FieldErrors::default();
        check_catalogue_name(&mut errors, "name", &self.name);
        errors.finish(|| FeatureInput {
            name: self.name.trim().to_string(),
            description: optional(&self.description),
        })
    }
}

/// Editable company feature price.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompanyFeatureForm {
    /// Catalogue feature id, as selected.
    pub feature_id: String,
    /// Unit price, as typed.
    pub price: String,
    /// `prepaid` or `postpaid`.
    pub billing_type: String,
    /// Prepaid balance, as typed.
    pub prepaid_amount: String,
}

impl CompanyFeatureForm {
    /// Prefill from an existing price.
    #[must_use]
    pub fn from_price(price: &CompanyFeature) -> Self {
        Self {
            feature_id: price.feature_id.to_string(),
            price: price.price.to_string(),
            billing_type: price.billing_type.as_str().to_string(),
            prepaid_amount: price
                .prepaid_amount
                .map(|amount| amount.to_string())
                .unwrap_or_default(),
        }
    }

    /// Whether the prepaid amount input should be shown.
    #[must_use]
    pub fn is_prepaid(&self) -> bool {
        self.billing_type == BillingType::Prepaid.as_str()
    }

    /// Validate and build the request body.
    ///
    /// # Errors
    ///
    /// Returns per-field messages when a rule fails.
    pub fn validate(&self) -> Result<CompanyFeatureInput, FieldErrors> {
        let mut errors = FieldErrors::default();

        errors.check(is_blank(&self.feature_id), "feature_id", "Feature ID is required");
        let feature_id = Uuid::parse_str(self.feature_id.trim()).ok();
        errors.check(
            feature_id.is_none(),
            "feature_id",
            "Feature ID must be a valid UUID",
        );

        let price = parse_number(&self.price);
        errors.check(price.is_none(), "price", "Price is required");
        errors.check(
            price.is_some_and(|price| price <= 0.0),
            "price",
            "Price must be a positive number",
        );

        let billing_type = match self.billing_type.as_str() {
            "prepaid" => Some(BillingType::Prepaid),
            "postpaid" => Some(BillingType::Postpaid),
            "" => {
                errors.insert("billing_type", "Billing type is required");
                None
            }
            _ => {
                errors.insert("billing_type", "Billing type must be prepaid or postpaid");
                None
            }
        };

        let prepaid_amount = parse_number(&self.prepaid_amount);
        errors.check(
            billing_type == Some(BillingType::Prepaid) && prepaid_amount.is_none(),
            "prepaid_amount",
            "Amount is required",
        );

        match (feature_id, price, billing_type) {
            (Some(feature_id), Some(price), Some(billing_type)) if errors.is_empty() => {
                Ok(CompanyFeatureInput {
                    feature_id,
                    price,
                    billing_type,
                    prepaid_amount: prepaid_amount
                        .filter(|_| billing_type == BillingType::Prepaid),
                })
            }
            _ => Err(errors),
        }
    }
}
