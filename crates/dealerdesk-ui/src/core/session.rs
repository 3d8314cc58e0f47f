//! Login, restore, and logout flows.
//!
//! # Design
//! - Flows return data; callers commit it to [`AuthStore`] through its reducers.
//! - Any failure while signing in clears stored credentials.
//! - Session expiry is reported through [`SessionSink`] so the HTTP layer
//!   stays ignorant of the UI store.

use dealerdesk_api_models::{LoginRequest, LoginResponse, User};
use tracing::{info, warn};

use crate::core::client::ApiClients;
use crate::core::errors::RequestError;
use crate::core::http::ApiRequest;
use crate::core::store::AuthStore;
use crate::core::tokens::TokenStore;

/// Receives forced sign-outs from the HTTP layer.
pub trait SessionSink {
    /// Reset the authenticated-user state.
    fn session_expired(&self);
}

/// Login form submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Keep the token in durable storage.
    pub remember_me: bool,
}

/// Fetch the profile of the token holder.
///
/// # Errors
///
/// Propagates request failures.
pub async fn current_user(clients: &ApiClients) -> Result<User, RequestError> {
    clients.api.json(ApiRequest::get("/users/me")).await
}

/// Exchange credentials for a token, persist it, and load the profile.
///
/// # Errors
///
/// Propagates request failures after clearing stored credentials.
pub async fn login(
    clients: &ApiClients,
    tokens: &dyn TokenStore,
    credentials: Credentials,
) -> Result<(User, String), RequestError> {
    let Credentials {
        email,
        password,
        remember_me,
    } = credentials;
    let outcome = async move {
        let request = ApiRequest::post("/auth/login").json(&LoginRequest {
            email: email.trim().to_string(),
            password,
        })?;
        let response: LoginResponse = clients.auth.json(request).await?;
        tokens.set(&response.access_token, remember_me);
        let user = current_user(clients).await?;
        Ok::<_, RequestError>((user, response.access_token))
    }
    .await;

    match &outcome {
        Ok((user, _)) => info!(role = user.role.as_str(), "signed in"),
        Err(err) => {
            warn!(error = %err, "sign-in failed");
            tokens.clear();
        }
    }
    outcome
}

/// Result of restoring a session from storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A stored token was accepted.
    Restored {
        /// Profile of the token holder.
        user: User,
        /// The accepted token.
        token: String,
    },
    /// No token was stored.
    NoToken,
    /// The stored token was rejected or the profile could not be loaded.
    Rejected,
}

/// Restore the session from a stored token.
pub async fn restore(clients: &ApiClients, tokens: &dyn TokenStore) -> RestoreOutcome {
    let Some(token) = tokens.get() else {
        return RestoreOutcome::NoToken;
    };
    match current_user(clients).await {
        Ok(user) => {
            info!(role = user.role.as_str(), "session restored");
            RestoreOutcome::Restored { user, token }
        }
        Err(err) => {
            warn!(error = %err, "stored session rejected");
            tokens.clear();
            RestoreOutcome::Rejected
        }
    }
}

impl RestoreOutcome {
    /// Commit the outcome to the auth store.
    pub fn apply(self, store: &mut AuthStore) {
        match self {
            Self::Restored { user, token } => store.signed_in(user, token),
            Self::NoToken | Self::Rejected => store.signed_out(),
        }
    }
}

/// Clear stored credentials and reset the auth store.
pub fn logout(tokens: &dyn TokenStore, store: &mut AuthStore) {
    tokens.clear();
    store.signed_out();
    info!("signed out");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::SESSION_EXPIRED_MESSAGE;
    use crate::core::testing::{Harness, sample_user};
    use dealerdesk_api_models::Role;
    use serde_json::json;

    fn credentials(remember_me: bool) -> Credentials {
        Credentials {
            email: " root@example.com ".into(),
            password: "Secret!234".into(),
            remember_me,
        }
    }

    #[tokio::test]
    async fn login_persists_token_and_loads_profile() {
        let harness = Harness::anonymous();
        harness
            .transport
            .respond_json(201, &json!({"access_token": "fresh"}));
        harness
            .transport
            .respond_json(200, &serde_json::to_value(sample_user(Role::Root)).expect("user"));

        let (user, token) = login(&harness.clients, harness.tokens.as_ref(), credentials(true))
            .await
            .expect("login");
        assert_eq!(user.role, Role::Root);
        assert_eq!(token, "fresh");
        assert_eq!(harness.tokens.get().as_deref(), Some("fresh"));

        let sent = harness.transport.requests();
        assert_eq!(sent[0].url, "http://auth.test/auth/login");
        assert_eq!(
            sent[0].body,
            crate::core::http::RequestBody::Json(
                json!({"email": "root@example.com", "password": "Secret!234"})
            )
        );
        assert_eq!(sent[1].header("Authorization"), Some("Bearer fresh"));
    }

    #[tokio::test]
    async fn rejected_login_clears_credentials_without_global_noise() {
        let harness = Harness::with_token("old");
        harness
            .transport
            .respond_json(403, &json!({"errorCode": 4030004}));
        let err = login(&harness.clients, harness.tokens.as_ref(), credentials(false))
            .await
            .expect_err("rejected");
        assert_eq!(err.status(), Some(403));
        assert!(!err.handled_globally());
        assert_eq!(harness.tokens.get(), None);
        assert!(harness.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn restore_without_token_skips_the_network() {
        let harness = Harness::anonymous();
        let outcome = restore(&harness.clients, harness.tokens.as_ref()).await;
        assert_eq!(outcome, RestoreOutcome::NoToken);
        assert!(harness.transport.requests().is_empty());

        let mut store = AuthStore::default();
        outcome.apply(&mut store);
        assert!(store.is_auth_checked());
        assert!(store.user().is_none());
    }

    #[tokio::test]
    async fn restore_accepts_valid_token() {
        let harness = Harness::with_token("kept");
        harness.transport.respond_json(
            200,
            &serde_json::to_value(sample_user(Role::Admin)).expect("user"),
        );
        let outcome = restore(&harness.clients, harness.tokens.as_ref()).await;
        let mut store = AuthStore::default();
        outcome.apply(&mut store);
        assert_eq!(store.role(), Some(Role::Admin));
        assert_eq!(store.access_token(), Some("kept"));
    }

    #[tokio::test]
    async fn expired_token_during_restore_resets_everything() {
        let harness = Harness::with_token("expired");
        harness.session.auth.borrow_mut().signed_in(sample_user(Role::Root), "expired".into());
        harness.transport.respond_json(401, &json!({"message": "Unauthorized"}));

        let outcome = restore(&harness.clients, harness.tokens.as_ref()).await;
        assert_eq!(outcome, RestoreOutcome::Rejected);
        assert_eq!(harness.tokens.get(), None);
        assert!(harness.session.auth.borrow().user().is_none());
        assert_eq!(
            harness.notifier.messages(),
            vec![SESSION_EXPIRED_MESSAGE.to_string()]
        );
    }

    #[test]
    fn logout_clears_storage_and_store() {
        let harness = Harness::with_token("t");
        let mut store = AuthStore::default();
        store.signed_in(sample_user(Role::GroupAdmin), "t".into());
        logout(harness.tokens.as_ref(), &mut store);
        assert_eq!(harness.tokens.get(), None);
        assert!(store.access_token().is_none());
    }
}
