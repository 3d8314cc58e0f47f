//! Preconfigured REST clients and the shared request/response pipeline.
//!
//! # Design
//! - One pipeline serves both clients: bearer header on the way out, status
//!   policy on the way back.
//! - The response policy is a pure function; side effects happen in one place.
//! - Every failure is returned to the caller, flagged when already surfaced.
//! - Requests polled under [`reported_by_caller`] skip the generic toast; the
//!   fetch wrappers surface the mapped message instead.

use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use dealerdesk_api_models::{Listing, Page};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::core::config::{ApiConfig, join_url};
use crate::core::errors::{ErrorBody, RequestError, SESSION_EXPIRED_MESSAGE};
use crate::core::http::{ApiRequest, PreparedRequest, RawResponse, Transport};
use crate::core::notify::{Notification, Notifier};
use crate::core::session::SessionSink;
use crate::core::tokens::TokenStore;

/// What the response hook does with a completed response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponseAction {
    /// Nothing global; the caller handles the outcome.
    Pass,
    /// Clear credentials, reset the user, and announce the expiry.
    ExpireSession,
    /// Queue a generic error notification with this text.
    Notify(String),
}

/// Decide the global reaction to a response status.
///
/// Login requests are exempt from every global path.
#[must_use]
pub fn response_policy(status: u16, is_login: bool, body: &ErrorBody) -> ResponseAction {
    if (200..300).contains(&status) || is_login {
        return ResponseAction::Pass;
    }
    if status == 401 {
        return ResponseAction::ExpireSession;
    }
    ResponseAction::Notify(format!("{status}: {}", body.display_message()))
}

thread_local! {
    static CALLER_REPORTS: Cell<usize> = const { Cell::new(0) };
}

fn caller_reports() -> bool {
    CALLER_REPORTS.with(|depth| depth.get() > 0)
}

/// Future adapter returned by [`reported_by_caller`].
pub struct ReportedByCaller<F: Future> {
    inner: Pin<Box<F>>,
}

impl<F: Future> Future for ReportedByCaller<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        CALLER_REPORTS.with(|depth| depth.set(depth.get() + 1));
        let polled = self.inner.as_mut().poll(cx);
        CALLER_REPORTS.with(|depth| depth.set(depth.get() - 1));
        polled
    }
}

/// Run `future` with the generic `"<status>: <message>"` toast disabled.
///
/// Responses completed while `future` is being polled come back unflagged,
/// so the caller decides what (if anything) to show. Session expiry is
/// unaffected.
#[must_use]
pub fn reported_by_caller<F: Future>(future: F) -> ReportedByCaller<F> {
    ReportedByCaller {
        inner: Box::pin(future),
    }
}

/// Whether a request path targets a login endpoint.
#[must_use]
pub fn is_login_path(path: &str) -> bool {
    path.contains("/login")
}

/// Collaborators shared by both clients.
pub struct ClientHooks {
    /// Bearer token source.
    pub tokens: Rc<dyn TokenStore>,
    /// Receives session expiry.
    pub session: Rc<dyn SessionSink>,
    /// Receives global error notifications.
    pub notifier: Rc<dyn Notifier>,
}

impl ClientHooks {
    fn apply(&self, action: ResponseAction) -> bool {
        match action {
            ResponseAction::Pass => false,
            ResponseAction::ExpireSession => {
                let had_token = self.tokens.get().is_some();
                self.tokens.clear();
                self.session.session_expired();
                if had_token {
                    info!("session expired; credentials cleared");
                    self.notifier
                        .notify(Notification::error(SESSION_EXPIRED_MESSAGE));
                }
                true
            }
            ResponseAction::Notify(_) if caller_reports() => false,
            ResponseAction::Notify(message) => {
                self.notifier.notify(Notification::error(message));
                true
            }
        }
    }
}

/// REST client bound to one base URL.
pub struct ApiClient {
    base_url: String,
    transport: Rc<dyn Transport>,
    hooks: Rc<ClientHooks>,
}

impl ApiClient {
    /// Create a client for `base_url`.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        transport: Rc<dyn Transport>,
        hooks: Rc<ClientHooks>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            hooks,
        }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared hooks (token store, session sink, notifier).
    #[must_use]
    pub fn hooks(&self) -> &ClientHooks {
        &self.hooks
    }

    /// Resolve a request and attach the bearer token when one is stored.
    #[must_use]
    pub fn prepare(&self, request: ApiRequest) -> PreparedRequest {
        let mut headers = Vec::new();
        if let Some(token) = self.hooks.tokens.get() {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        PreparedRequest {
            method: request.method,
            url: join_url(&self.base_url, &request.path),
            query: request.query,
            headers,
            body: request.body,
        }
    }

    /// Send a request through the pipeline and return the 2xx response.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Network`] when no response arrives and
    /// [`RequestError::Status`] for non-2xx responses.
    pub async fn execute(&self, request: ApiRequest) -> Result<RawResponse, RequestError> {
        let is_login = is_login_path(&request.path);
        let prepared = self.prepare(request);
        let method = prepared.method.as_str();
        let url = prepared.url.clone();
        debug!(method, url = %url, "sending request");

        let response = self.transport.send(prepared).await.map_err(|err| {
            warn!(method, url = %url, error = %err, "request failed without response");
            RequestError::Network(err.to_string())
        })?;
        if response.is_success() {
            return Ok(response);
        }

        let body = ErrorBody::parse(&response.body);
        warn!(
            method,
            url = %url,
            status = response.status,
            error_code = ?body.error_code,
            "request rejected"
        );
        let action = response_policy(response.status, is_login, &body);
        let handled_globally = self.hooks.apply(action);
        Err(RequestError::Status {
            status: response.status,
            body,
            handled_globally,
        })
    }

    /// Send and decode a JSON response.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiClient::execute`] failures and returns
    /// [`RequestError::Decode`] when the body does not match `T`.
    pub async fn json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, RequestError> {
        let response = self.execute(request).await?;
        serde_json::from_slice(&response.body).map_err(|err| RequestError::Decode(err.to_string()))
    }

    /// Send and ignore the response body.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiClient::execute`] failures.
    pub async fn send(&self, request: ApiRequest) -> Result<(), RequestError> {
        self.execute(request).await.map(|_| ())
    }

    /// Send and decode a list response, bare array or `{data, meta}` envelope.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::json`].
    pub async fn page<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Page<T>, RequestError> {
        self.json::<Listing<T>>(request).await.map(Page::from)
    }

    /// Send and return the raw response bytes (exports).
    ///
    /// # Errors
    ///
    /// Propagates [`ApiClient::execute`] failures.
    pub async fn bytes(&self, request: ApiRequest) -> Result<Vec<u8>, RequestError> {
        self.execute(request).await.map(|response| response.body)
    }
}

/// The authentication client and the main API client.
#[derive(Clone)]
pub struct ApiClients {
    /// Main API client.
    pub api: Rc<ApiClient>,
    /// Authentication API client.
    pub auth: Rc<ApiClient>,
}

impl ApiClients {
    /// Build both clients over one transport and one set of hooks.
    #[must_use]
    pub fn new(config: &ApiConfig, transport: Rc<dyn Transport>, hooks: ClientHooks) -> Self {
        let hooks = Rc::new(hooks);
        Self {
            api: Rc::new(ApiClient::new(
                config.api_url.clone(),
                Rc::clone(&transport),
                Rc::clone(&hooks),
            )),
            auth: Rc::new(ApiClient::new(config.auth_api_url.clone(), transport, hooks)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::Harness;
    use serde_json::{Value, json};

    #[test]
    fn policy_passes_success_and_login() {
        let body = ErrorBody::default();
        assert_eq!(response_policy(204, false, &body), ResponseAction::Pass);
        assert_eq!(response_policy(401, true, &body), ResponseAction::Pass);
        assert_eq!(response_policy(403, true, &body), ResponseAction::Pass);
    }

    #[test]
    fn policy_formats_generic_errors() {
        let body = ErrorBody::parse(br#"{"message": "Company not found"}"#);
        assert_eq!(
            response_policy(404, false, &body),
            ResponseAction::Notify("404: Company not found".into())
        );
        assert_eq!(
            response_policy(502, false, &ErrorBody::default()),
            ResponseAction::Notify("502: Error".into())
        );
        assert_eq!(
            response_policy(401, false, &body),
            ResponseAction::ExpireSession
        );
    }

    #[tokio::test]
    async fn bearer_header_is_attached_when_token_present() {
        let harness = Harness::with_token("tok-1");
        harness.transport.respond_json(200, &json!({"ok": true}));
        let value: Value = harness
            .clients
            .api
            .json(ApiRequest::get("/users/me"))
            .await
            .expect("ok");
        assert_eq!(value, json!({"ok": true}));

        let sent = harness.transport.requests();
        assert_eq!(sent[0].url, "http://api.test/users/me");
        assert_eq!(sent[0].header("Authorization"), Some("Bearer tok-1"));
    }

    #[tokio::test]
    async fn no_header_without_token() {
        let harness = Harness::anonymous();
        harness.transport.respond_json(200, &json!({}));
        harness
            .clients
            .auth
            .send(ApiRequest::post("/auth/login"))
            .await
            .expect("ok");
        let sent = harness.transport.requests();
        assert_eq!(sent[0].url, "http://auth.test/auth/login");
        assert_eq!(sent[0].header("Authorization"), None);
    }

    #[tokio::test]
    async fn unauthorized_non_login_expires_session_once() {
        let harness = Harness::with_token("stale");
        harness.transport.respond_json(401, &json!({"message": "Unauthorized"}));
        harness.transport.respond_json(401, &json!({"message": "Unauthorized"}));

        let first = harness
            .clients
            .api
            .send(ApiRequest::get("/companies"))
            .await
            .expect_err("401");
        let second = harness
            .clients
            .api
            .send(ApiRequest::get("/company-groups"))
            .await
            .expect_err("401");

        assert!(first.handled_globally());
        assert!(second.handled_globally());
        assert_eq!(harness.tokens.get(), None);
        assert_eq!(harness.session.expired_count(), 2);
        assert_eq!(
            harness.notifier.messages(),
            vec![SESSION_EXPIRED_MESSAGE.to_string()]
        );
    }

    #[tokio::test]
    async fn unauthorized_login_is_left_to_the_caller() {
        let harness = Harness::with_token("keep");
        harness
            .transport
            .respond_json(401, &json!({"errorCode": 4030004}));
        let err = harness
            .clients
            .auth
            .send(ApiRequest::post("/auth/login"))
            .await
            .expect_err("401");
        assert!(!err.handled_globally());
        assert_eq!(err.status(), Some(401));
        assert_eq!(harness.tokens.get().as_deref(), Some("keep"));
        assert_eq!(harness.session.expired_count(), 0);
        assert!(harness.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn other_errors_queue_generic_notification() {
        let harness = Harness::with_token("t");
        harness
            .transport
            .respond_json(409, &json!({"message": "Name already taken"}));
        let err = harness
            .clients
            .api
            .send(ApiRequest::post("/packages"))
            .await
            .expect_err("409");
        assert!(err.handled_globally());
        assert_eq!(
            harness.notifier.messages(),
            vec!["409: Name already taken".to_string()]
        );
        assert_eq!(harness.tokens.get().as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn caller_reported_requests_skip_the_generic_notification() {
        let harness = Harness::with_token("t");
        harness
            .transport
            .respond_json(403, &json!({"errorCode": 4030010}));
        harness.transport.respond_json(401, &json!({}));
        let err = reported_by_caller(harness.clients.api.send(ApiRequest::post("/subscriptions")))
            .await
            .expect_err("403");
        assert!(!err.handled_globally());
        assert!(harness.notifier.messages().is_empty());

        let expired = reported_by_caller(harness.clients.api.send(ApiRequest::get("/companies")))
            .await
            .expect_err("401");
        assert!(expired.handled_globally());
        assert_eq!(
            harness.notifier.messages(),
            vec![SESSION_EXPIRED_MESSAGE.to_string()]
        );
    }

    #[tokio::test]
    async fn network_failures_are_not_notified_by_the_hook() {
        let harness = Harness::with_token("t");
        harness.transport.fail("offline");
        let err = harness
            .clients
            .api
            .send(ApiRequest::get("/voices"))
            .await
            .expect_err("offline");
        assert!(matches!(err, RequestError::Network(_)));
        assert!(!err.handled_globally());
        assert!(harness.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let harness = Harness::with_token("t");
        harness.transport.respond_raw(200, b"not json".to_vec());
        let err = harness
            .clients
            .api
            .json::<Value>(ApiRequest::get("/features"))
            .await
            .expect_err("decode");
        assert!(matches!(err, RequestError::Decode(_)));
    }

    #[tokio::test]
    async fn page_accepts_arrays_and_envelopes() {
        let harness = Harness::with_token("t");
        harness
            .transport
            .respond_json(200, &json!([{"id": 1}, {"id": 2}]));
        harness.transport.respond_json(
            200,
            &json!({"data": [{"id": 3}], "meta": {"total": 31, "page": 2, "limit": 10}}),
        );
        let bare = harness
            .clients
            .api
            .page::<Value>(ApiRequest::get("/voices"))
            .await
            .expect("array");
        assert_eq!(bare.data.len(), 2);
        assert_eq!(bare.meta, None);
        let enveloped = harness
            .clients
            .api
            .page::<Value>(ApiRequest::get("/companies"))
            .await
            .expect("envelope");
        assert_eq!(enveloped.data.len(), 1);
        assert_eq!(enveloped.meta.map(|meta| meta.page_count()), Some(4));
    }
}
