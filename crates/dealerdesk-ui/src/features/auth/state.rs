//! Login form.

use crate::core::session::Credentials;
use crate::core::validation::{FieldErrors, check_email, is_blank};

/// Sign-in form fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Keep the session across browser restarts.
    pub remember_me: bool,
}

impl LoginForm {
    /// Validate and build the credentials.
    ///
    /// # Errors
    ///
    /// Returns per-field messages when a rule fails.
    pub fn validate(&self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::default();
        check_email(&mut errors, "email", &self.email, "Invalid email address");
        errors.check(is_blank(&self.password), "password", "Password is required");
        errors.finish(|| Credentials {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            remember_me: self.remember_me,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_keep_the_password_verbatim() {
        let form = LoginForm {
            email: " root@example.com ".into(),
            password: " spaced ".into(),
            remember_me: true,
        };
        let credentials = form.validate().expect("valid");
        assert_eq!(credentials.email, "root@example.com");
        assert_eq!(credentials.password, " spaced ");
        assert!(credentials.remember_me);
    }

    #[test]
    fn empty_form_reports_both_fields() {
        let errors = LoginForm::default().validate().expect_err("empty");
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
    }
}
