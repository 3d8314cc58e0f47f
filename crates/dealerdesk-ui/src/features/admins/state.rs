//! Admin user form and list scope.
//!
//! # Design
//! - An admin list is always scoped to one company or one group; the scope
//!   decides the role and owner reference of created users.
//! - Passwords are required on create and optional on edit.

use dealerdesk_api_models::{EntityRef, Role, User, UserInput};
use uuid::Uuid;

use crate::core::cache::QueryKey;
use crate::core::errors::ApiError;
use crate::core::validation::{FieldErrors, is_blank, is_email, is_strong_password};

/// Admins shown per page.
pub const PAGE_SIZE: u32 = 8;

/// Password rule message.
pub const PASSWORD_MESSAGE: &str = "Password must be at least 8 characters long, contain one uppercase letter and one special character";

/// Owner of an admin list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminScope {
    /// Company admins (`admin` role).
    Company(Uuid),
    /// Group admins (`group_admin` role).
    Group(Uuid),
}

impl AdminScope {
    /// Role given to users created in this scope.
    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            Self::Company(_) => Role::Admin,
            Self::Group(_) => Role::GroupAdmin,
        }
    }

    /// Key prefix covering every page of this scope.
    #[must_use]
    pub fn key(self) -> QueryKey {
        let (company_id, group_id) = self.ids();
        QueryKey::new("users").with_opt(company_id).with_opt(group_id)
    }

    /// Key of one page.
    #[must_use]
    pub fn page_key(self, page: u32) -> QueryKey {
        self.key().with(page)
    }

    /// `(company id, group id)` filter pair.
    #[must_use]
    pub const fn ids(self) -> (Option<Uuid>, Option<Uuid>) {
        match self {
            Self::Company(id) => (Some(id), None),
            Self::Group(id) => (None, Some(id)),
        }
    }
}

/// Editable admin fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdminForm {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email.
    pub email: String,
    /// New password.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
}

impl AdminForm {
    /// Prefill from an existing user; passwords stay empty.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            ..Self::default()
        }
    }

    /// Validate and build the request body.
    ///
    /// `editing` relaxes the password rules: a blank password keeps the current one.
    ///
    /// # Errors
    ///
    /// Returns per-field messages when a rule fails.
    pub fn validate(&self, scope: AdminScope, editing: bool) -> Result<UserInput, FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check(
            is_blank(&self.first_name),
            "first_name",
            "First name is required",
        );
        errors.check(is_blank(&self.last_name), "last_name", "Last name is required");
        errors.check(is_blank(&self.email), "email", "Email is required");
        errors.check(!is_email(&self.email), "email", "Invalid email");

        let has_password = !self.password.is_empty();
        if !editing {
            errors.check(!has_password, "password", "Password is required");
            errors.check(
                !is_strong_password(&self.password),
                "password",
                PASSWORD_MESSAGE,
            );
        }
        if has_password {
            errors.check(
                self.confirm_password.is_empty(),
                "confirm_password",
                "Please confirm your password",
            );
            errors.check(
                self.confirm_password != self.password,
                "confirm_password",
                "Passwords must match",
            );
        }

        let (company_id, group_id) = scope.ids();
        errors.finish(|| UserInput {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: has_password.then(|| self.password.clone()),
            role: scope.role(),
            company: company_id.map(|id| EntityRef { id }),
            company_group: group_id.map(|id| EntityRef { id }),
        })
    }
}

/// Application code for an email that already belongs to a user.
pub const DUPLICATE_EMAIL_CODE: i64 = 4_000_019;

/// Field errors for a save failure the dialog renders inline.
#[must_use]
pub fn inline_save_errors(error: &ApiError) -> Option<FieldErrors> {
    if !error.is_status(400) || error.error_code != Some(DUPLICATE_EMAIL_CODE) {
        return None;
    }
    let mut errors = FieldErrors::default();
    errors.insert("email", error.message.clone());
    Some(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{ErrorBody, RequestError};

    fn form() -> AdminForm {
        AdminForm {
            first_name: "Marko".into(),
            last_name: "Jovic".into(),
            email: "marko@dealer.example".into(),
            password: "Showroom#1".into(),
            confirm_password: "Showroom#1".into(),
        }
    }

    #[test]
    fn company_scope_creates_admins_with_company_reference() {
        let company_id = Uuid::new_v4();
        let input = form()
            .validate(AdminScope::Company(company_id), false)
            .expect("valid");
        assert_eq!(input.role, Role::Admin);
        assert_eq!(input.company, Some(EntityRef { id: company_id }));
        assert_eq!(input.company_group, None);
        assert_eq!(input.password.as_deref(), Some("Showroom#1"));
    }

    #[test]
    fn create_requires_a_strong_matching_password() {
        let scope = AdminScope::Group(Uuid::new_v4());
        let mut weak = form();
        weak.password = "showroom".into();
        weak.confirm_password = "showroom".into();
        assert_eq!(
            weak.validate(scope, false).expect_err("weak").get("password"),
            Some(PASSWORD_MESSAGE)
        );

        let mut mismatch = form();
        mismatch.confirm_password = "Showroom#2".into();
        assert_eq!(
            mismatch
                .validate(scope, false)
                .expect_err("mismatch")
                .get("confirm_password"),
            Some("Passwords must match")
        );

        let mut missing = form();
        missing.password.clear();
        missing.confirm_password.clear();
        assert_eq!(
            missing.validate(scope, false).expect_err("missing").get("password"),
            Some("Password is required")
        );
    }

    #[test]
    fn edits_may_keep_the_current_password() {
        let scope = AdminScope::Group(Uuid::new_v4());
        let mut edit = form();
        edit.password.clear();
        edit.confirm_password.clear();
        let input = edit.validate(scope, true).expect("valid");
        assert_eq!(input.password, None);
        assert_eq!(input.role, Role::GroupAdmin);
    }

    #[test]
    fn scope_keys_share_a_prefix_across_pages() {
        let scope = AdminScope::Company(Uuid::new_v4());
        assert!(scope.page_key(2).starts_with(&scope.key()));
        assert!(!AdminScope::Group(Uuid::new_v4()).page_key(1).starts_with(&scope.key()));
    }

    fn rejected(status: u16, body: &str) -> ApiError {
        ApiError::from(RequestError::Status {
            status,
            body: ErrorBody::parse(body.as_bytes()),
            handled_globally: false,
        })
    }

    #[test]
    fn duplicate_email_lands_on_the_email_field() {
        let errors = inline_save_errors(&rejected(400, r#"{"errorCode": 4000019}"#))
            .expect("inline");
        assert_eq!(errors.get("email"), Some("User with entered email already exist."));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn other_failures_are_not_inline() {
        assert!(inline_save_errors(&rejected(400, r#"{"message": "bad"}"#)).is_none());
        assert!(inline_save_errors(&rejected(403, r#"{"errorCode": 4030010}"#)).is_none());
    }
}
