//! Company list filters and the add/edit form.
//!
//! # Design
//! - Filters are plain values; the cache key is derived from them so every
//!   filter combination is cached separately.
//! - Form inputs stay strings until validation builds a [`CompanyInput`].

use dealerdesk_api_models::{Company, CompanyInput};
use uuid::Uuid;

use crate::core::cache::QueryKey;
use crate::core::validation::{FieldErrors, check_email, is_blank, is_phone, optional};

/// Companies shown per page.
pub const PAGE_SIZE: u32 = 12;

/// Phone rule message shared with the company group form.
pub const PHONE_MESSAGE: &str =
    "Phone number must be in international format and 8–15 digits long (e.g. +381641234567)";

/// Name sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// A to Z.
    #[default]
    Asc,
    /// Z to A.
    Desc,
}

impl SortOrder {
    /// Query and select-control value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Parse a select-control value.
    #[must_use]
    pub fn from_value(value: &str) -> Self {
        if value == "desc" { Self::Desc } else { Self::Asc }
    }
}

/// Company list filters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompanyQuery {
    /// Restrict to one group (group admins, group details screen).
    pub group_id: Option<Uuid>,
    /// One-based page number.
    pub page: u32,
    /// Free-text name search (already debounced).
    pub search: String,
    /// Country filter.
    pub country: String,
    /// Sort direction.
    pub order: SortOrder,
}

impl Default for CompanyQuery {
    fn default() -> Self {
        Self {
            group_id: None,
            page: 1,
            search: String::new(),
            country: String::new(),
            order: SortOrder::Asc,
        }
    }
}

impl CompanyQuery {
    /// Filters scoped to `group_id`.
    #[must_use]
    pub fn for_group(group_id: Option<Uuid>) -> Self {
        Self {
            group_id,
            ..Self::default()
        }
    }

    /// Cache key for this filter combination.
    #[must_use]
    pub fn key(&self) -> QueryKey {
        QueryKey::new("companies")
            .with_opt(self.group_id)
            .with(self.page)
            .with(self.search.trim())
            .with(self.country.trim())
            .with(self.order.as_str())
    }

    /// Query-string pairs, blank filters omitted.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", PAGE_SIZE.to_string()),
        ];
        for (name, value) in [
            ("search", self.search.trim()),
            ("country", self.country.trim()),
        ] {
            if !value.is_empty() {
                params.push((name, value.to_string()));
            }
        }
        params.push(("order", self.order.as_str().to_string()));
        params
    }

    /// Change a filter and go back to the first page.
    #[must_use]
    pub fn refine(&self, update: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        update(&mut next);
        next.page = 1;
        next
    }
}

/// Editable company fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompanyForm {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Country.
    pub country: String,
    /// Postal code.
    pub postal_code: String,
    /// Website URL.
    pub website: String,
    /// Free-form description.
    pub description: String,
    /// Owning group, fixed by the screen the dialog was opened from.
    pub company_group_id: Option<Uuid>,
}

impl CompanyForm {
    /// Empty form for a new company in `group_id`.
    #[must_use]
    pub fn new_in(group_id: Option<Uuid>) -> Self {
        Self {
            company_group_id: group_id,
            ..Self::default()
        }
    }

    /// Prefill from an existing company.
    #[must_use]
    pub fn from_company(company: &Company) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            name: company.name.clone(),
            email: text(&company.email),
            phone: text(&company.phone),
            address: text(&company.address),
            city: text(&company.city),
            country: text(&company.country),
            postal_code: text(&company.postal_code),
            website: text(&company.website),
            description: text(&company.description),
            company_group_id: company.company_group_id,
        }
    }

    /// Validate and build the request body.
    ///
    /// # Errors
    ///
    /// Returns per-field messages when a rule fails.
    pub fn validate(&self) -> Result<CompanyInput, FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check(is_blank(&self.name), "name", "Name is required");
        check_email(&mut errors, "email", &self.email, "Invalid email format");
        errors.check(
            !is_blank(&self.phone) && !is_phone(&self.phone),
            "phone",
            PHONE_MESSAGE,
        );
        errors.finish(|| CompanyInput {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: optional(&self.phone),
            address: optional(&self.address),
            city: optional(&self.city),
            country: optional(&self.country),
            postal_code: optional(&self.postal_code),
            website: optional(&self.website),
            description: optional(&self.description),
            company_group_id: self.company_group_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> CompanyForm {
        CompanyForm {
            name: " Autokuca Nis ".into(),
            email: "sales@autokuca.rs".into(),
            ..CompanyForm::default()
        }
    }

    #[test]
    fn valid_form_trims_and_drops_blank_optionals() {
        let input = filled().validate().expect("valid");
        assert_eq!(input.name, "Autokuca Nis");
        assert_eq!(input.phone, None);
        assert_eq!(input.website, None);
    }

    #[test]
    fn email_rules_report_required_then_format() {
        let mut form = filled();
        form.email = String::new();
        assert_eq!(
            form.validate().expect_err("missing").get("email"),
            Some("Email is required")
        );
        form.email = "sales@".into();
        assert_eq!(
            form.validate().expect_err("bad").get("email"),
            Some("Invalid email format")
        );
    }

    #[test]
    fn phone_is_optional_but_must_be_international() {
        let mut form = filled();
        form.phone = "  ".into();
        assert!(form.validate().is_ok());
        form.phone = "064 123".into();
        assert_eq!(
            form.validate().expect_err("bad phone").get("phone"),
            Some(PHONE_MESSAGE)
        );
        form.phone = "+381641234567".into();
        assert_eq!(
            form.validate().expect("valid").phone.as_deref(),
            Some("+381641234567")
        );
    }

    #[test]
    fn query_params_skip_blank_filters() {
        let query = CompanyQuery {
            search: "  ".into(),
            country: "Serbia".into(),
            ..CompanyQuery::default()
        };
        assert_eq!(
            query.params(),
            vec![
                ("page", "1".to_string()),
                ("limit", "12".to_string()),
                ("country", "Serbia".to_string()),
                ("order", "asc".to_string()),
            ]
        );
    }

    #[test]
    fn refining_resets_the_page_and_changes_the_key() {
        let query = CompanyQuery {
            page: 3,
            ..CompanyQuery::default()
        };
        let next = query.refine(|query| query.order = SortOrder::Desc);
        assert_eq!(next.page, 1);
        assert_ne!(next.key(), query.key());
        assert!(next.key().starts_with(&QueryKey::new("companies")));
    }
}
