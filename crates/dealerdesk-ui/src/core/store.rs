//! App-wide yewdux store slices.
//!
//! # Design
//! - One store per concern; last write wins.
//! - Fields are private where an invariant spans them, and every mutation
//!   goes through a reducer method that upholds it.
//! - Reducers are plain methods so they are testable without a renderer.

use dealerdesk_api_models::{Role, User};
use yewdux::store::Store;

use crate::core::notify::{Notification, Severity};

/// Authenticated user and token lifecycle.
///
/// A user is only ever present together with a token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Store)]
pub struct AuthStore {
    user: Option<User>,
    access_token: Option<String>,
    is_auth_checked: bool,
}

impl AuthStore {
    /// Current user, when signed in.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Current bearer token, when signed in.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Whether the stored session has been restored or rejected.
    #[must_use]
    pub const fn is_auth_checked(&self) -> bool {
        self.is_auth_checked
    }

    /// Role of the signed-in user.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    /// Record a successful login or restore.
    pub fn signed_in(&mut self, user: User, access_token: String) {
        self.user = Some(user);
        self.access_token = Some(access_token);
        self.is_auth_checked = true;
    }

    /// Record logout, expiry, or a failed restore.
    pub fn signed_out(&mut self) {
        self.user = None;
        self.access_token = None;
        self.is_auth_checked = true;
    }
}

/// Desktop and mobile sidebar visibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Store)]
pub struct SidebarStore {
    /// Desktop sidebar expanded.
    pub is_open: bool,
    /// Mobile drawer visible.
    pub mobile_open: bool,
}

impl Default for SidebarStore {
    fn default() -> Self {
        Self {
            is_open: true,
            mobile_open: false,
        }
    }
}

impl SidebarStore {
    /// Expand or collapse the desktop sidebar.
    pub const fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Show or hide the mobile drawer.
    pub const fn toggle_mobile(&mut self) {
        self.mobile_open = !self.mobile_open;
    }

    /// Hide the mobile drawer.
    pub const fn close_mobile(&mut self) {
        self.mobile_open = false;
    }
}

/// Auto-hide delay for the snackbar.
pub const SNACKBAR_AUTO_HIDE_MS: u32 = 4_000;

/// Global snackbar state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Store)]
pub struct SnackbarStore {
    /// Whether the snackbar is visible.
    pub open: bool,
    /// Message text.
    pub message: String,
    /// Visual severity.
    pub severity: Severity,
    /// Bumped on every show so repeated messages restart the hide timer.
    pub sequence: u64,
}

impl SnackbarStore {
    /// Show a message, replacing whatever is visible.
    pub fn show(&mut self, notification: Notification) {
        self.open = true;
        self.message = notification.message;
        self.severity = notification.severity;
        self.sequence = self.sequence.wrapping_add(1);
    }

    /// Hide the snackbar, keeping the last message for the exit transition.
    pub const fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn root_user() -> User {
        User {
            id: Uuid::nil(),
            first_name: "Root".into(),
            last_name: "Operator".into(),
            email: "root@example.com".into(),
            role: Role::Root,
            company: None,
            company_group: None,
        }
    }

    #[test]
    fn signed_out_clears_user_and_token_together() {
        let mut store = AuthStore::default();
        assert!(!store.is_auth_checked());
        store.signed_in(root_user(), "tok".into());
        assert_eq!(store.role(), Some(Role::Root));
        assert_eq!(store.access_token(), Some("tok"));

        store.signed_out();
        assert!(store.user().is_none());
        assert!(store.access_token().is_none());
        assert!(store.is_auth_checked());
    }

    #[test]
    fn sidebar_starts_open_and_toggles() {
        let mut sidebar = SidebarStore::default();
        assert!(sidebar.is_open);
        assert!(!sidebar.mobile_open);
        sidebar.toggle();
        sidebar.toggle_mobile();
        assert!(!sidebar.is_open);
        assert!(sidebar.mobile_open);
        sidebar.close_mobile();
        assert!(!sidebar.mobile_open);
    }

    #[test]
    fn snackbar_last_write_wins() {
        let mut snackbar = SnackbarStore::default();
        assert!(!snackbar.open);
        assert_eq!(snackbar.severity, Severity::Success);

        snackbar.show(Notification::error("first"));
        snackbar.show(Notification::success("second"));
        assert!(snackbar.open);
        assert_eq!(snackbar.message, "second");
        assert_eq!(snackbar.severity, Severity::Success);
        assert_eq!(snackbar.sequence, 2);

        snackbar.close();
        assert!(!snackbar.open);
        assert_eq!(snackbar.message, "second");
    }
}
