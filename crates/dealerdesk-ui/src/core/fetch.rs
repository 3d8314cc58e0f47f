//! Query and mutation wrappers: the single funnel for non-form errors.
//!
//! # Design
//! - Failures are normalized to [`ApiError`] and toasted once with the mapped
//!   message unless the session expired or the caller opted out. The HTTP
//!   layer's generic toast is disabled while a wrapper drives the request.
//! - Queries write through the cache using fetch tickets; mutations invalidate
//!   the keys they name after success. Sagas invalidate whatever the outcome.
//! - One attempt per call; nothing is retried.

use std::cell::RefCell;
use std::future::Future;

use crate::core::cache::{QueryCache, QueryKey};
use crate::core::client::reported_by_caller;
use crate::core::errors::{ApiError, RequestError};
use crate::core::notify::{Notification, Notifier};
use crate::core::saga::{Saga, SagaError};

/// Per-call options shared by queries and mutations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Skip the global error toast; the caller renders the error itself.
    pub disable_global_error: bool,
}

impl FetchOptions {
    /// Options that suppress the global error toast.
    pub const SILENT: Self = Self {
        disable_global_error: true,
    };
}

/// Mutable access to the shared [`QueryCache`].
pub trait CacheHandle {
    /// Run `update` against the cache.
    fn with_cache<R>(&self, update: impl FnOnce(&mut QueryCache) -> R) -> R;
}

impl CacheHandle for RefCell<QueryCache> {
    fn with_cache<R>(&self, update: impl FnOnce(&mut QueryCache) -> R) -> R {
        update(&mut self.borrow_mut())
    }
}

/// Normalize a request failure and toast it when appropriate.
pub fn surface_error(
    err: RequestError,
    options: FetchOptions,
    notifier: &dyn Notifier,
) -> ApiError {
    let api_error = ApiError::from(err);
    report(&api_error, options, notifier);
    api_error
}

fn report(api_error: &ApiError, options: FetchOptions, notifier: &dyn Notifier) {
    let handled = api_error.original.handled_globally();
    tracing::warn!(
        status = ?api_error.status,
        error_code = ?api_error.error_code,
        handled_globally = handled,
        message = %api_error.message,
        "request failed"
    );
    if !handled && !options.disable_global_error {
        notifier.notify(Notification::error(api_error.message.clone()));
    }
}

/// Fetch `key` and store the outcome in the cache.
///
/// # Errors
///
/// Returns the normalized error after recording it on the entry.
pub async fn run_query<T, C, Fut>(
    cache: &C,
    notifier: &dyn Notifier,
    key: &QueryKey,
    options: FetchOptions,
    fetch: Fut,
) -> Result<(), ApiError>
where
    T: 'static,
    C: CacheHandle + ?Sized,
    Fut: Future<Output = Result<T, RequestError>>,
{
    let ticket = cache.with_cache(|cache| cache.begin_fetch(key));
    match reported_by_caller(fetch).await {
        Ok(value) => {
            cache.with_cache(|cache| cache.complete(&ticket, Ok(value)));
            Ok(())
        }
        Err(err) => {
            let api_error = surface_error(err, options, notifier);
            cache.with_cache(|cache| cache.complete::<T>(&ticket, Err(api_error.clone())));
            Err(api_error)
        }
    }
}

/// Run a write and invalidate `invalidates` when it succeeds.
///
/// # Errors
///
/// Returns the normalized error; nothing is invalidated on failure.
pub async fn run_mutation<T, C, Fut>(
    cache: &C,
    notifier: &dyn Notifier,
    invalidates: &[QueryKey],
    options: FetchOptions,
    mutation: Fut,
) -> Result<T, ApiError>
where
    C: CacheHandle + ?Sized,
    Fut: Future<Output = Result<T, RequestError>>,
{
    let value = reported_by_caller(mutation)
        .await
        .map_err(|err| surface_error(err, options, notifier))?;
    cache.with_cache(|cache| {
        for key in invalidates {
            cache.invalidate(key);
        }
    });
    Ok(value)
}

/// Run a multi-step write and invalidate `invalidates` afterwards.
///
/// Keys are invalidated on failure too, once compensation has run, since a
/// partially applied write may have left server state the cache has not seen.
///
/// # Errors
///
/// Returns the [`SagaError`] after surfacing its cause.
pub async fn run_saga<Ctx, C>(
    cache: &C,
    notifier: &dyn Notifier,
    saga: &Saga<Ctx>,
    ctx: &mut Ctx,
    invalidates: &[QueryKey],
    options: FetchOptions,
) -> Result<(), SagaError>
where
    C: CacheHandle + ?Sized,
{
    let outcome = reported_by_caller(saga.execute(ctx)).await;
    if let Err(err) = &outcome {
        report(&err.source, options, notifier);
    }
    cache.with_cache(|cache| {
        for key in invalidates {
            cache.invalidate(key);
        }
    });
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{ErrorBody, NETWORK_ERROR_MESSAGE};
    use crate::core::http::ApiRequest;
    use crate::core::testing::{Harness, RecordingNotifier};
    use dealerdesk_api_models::{Feature, Listing, Page};
    use serde_json::json;

    fn status_error(status: u16, body: &str, handled_globally: bool) -> RequestError {
        RequestError::Status {
            status,
            body: ErrorBody::parse(body.as_bytes()),
            handled_globally,
        }
    }

    #[test]
    fn unhandled_errors_are_toasted_once() {
        let notifier = RecordingNotifier::default();
        let err = surface_error(
            status_error(403, r#"{"errorCode": 4030010}"#, false),
            FetchOptions::default(),
            &notifier,
        );
        assert_eq!(err.message, "Not enough credits.");
        assert_eq!(notifier.messages(), vec!["Not enough credits.".to_string()]);
    }

    #[test]
    fn globally_handled_and_silent_errors_are_not_toasted() {
        let notifier = RecordingNotifier::default();
        surface_error(
            status_error(500, "{}", true),
            FetchOptions::default(),
            &notifier,
        );
        let err = surface_error(
            status_error(409, r#"{"message": "Duplicate"}"#, false),
            FetchOptions::SILENT,
            &notifier,
        );
        assert_eq!(err.message, "Duplicate");
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn offline_mutation_normalizes_to_network_error() {
        let harness = Harness::with_token("t");
        harness.transport.fail("offline");
        let cache = RefCell::new(QueryCache::default());
        let err = run_mutation(
            &cache,
            harness.notifier.as_ref(),
            &[QueryKey::new("voices")],
            FetchOptions::default(),
            harness.clients.api.send(ApiRequest::post("/voices")),
        )
        .await
        .expect_err("offline");
        assert_eq!(err.status, None);
        assert_eq!(err.error_code, None);
        assert_eq!(err.message, NETWORK_ERROR_MESSAGE);
        assert_eq!(harness.notifier.messages(), vec![NETWORK_ERROR_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn server_errors_toast_once_through_the_whole_stack() {
        let harness = Harness::with_token("t");
        harness
            .transport
            .respond_json(500, &json!({"message": "boom"}));
        let cache = RefCell::new(QueryCache::default());
        let key = QueryKey::new("features");
        let err = run_query(
            &cache,
            harness.notifier.as_ref(),
            &key,
            FetchOptions::default(),
            harness.clients.api.json::<Listing<Feature>>(ApiRequest::get("/features")),
        )
        .await
        .expect_err("500");
        assert_eq!(err.message, "Internal Server Error: Something went wrong on our end.");
        assert_eq!(harness.notifier.messages(), vec![err.message.clone()]);
        assert_eq!(
            cache.borrow().snapshot::<Listing<Feature>>(&key).error,
            Some(err)
        );
    }

    #[tokio::test]
    async fn queries_populate_the_cache() {
        let harness = Harness::with_token("t");
        harness.transport.respond_json(
            200,
            &json!([{"id": "00000000-0000-0000-0000-000000000000", "name": "SMS"}]),
        );
        let cache = RefCell::new(QueryCache::default());
        let key = QueryKey::new("features");
        run_query(
            &cache,
            harness.notifier.as_ref(),
            &key,
            FetchOptions::default(),
            async {
                harness
                    .clients
                    .api
                    .json::<Listing<Feature>>(ApiRequest::get("/features"))
                    .await
                    .map(Page::from)
            },
        )
        .await
        .expect("ok");
        let page = cache.borrow().get::<Page<Feature>>(&key).expect("cached");
        assert_eq!(page.data[0].name, "SMS");
    }

    #[tokio::test]
    async fn successful_mutations_invalidate_named_keys() {
        let harness = Harness::with_token("t");
        harness.transport.respond_json(200, &json!({}));
        let cache = RefCell::new(QueryCache::default());
        let key = QueryKey::new("packages");
        cache.borrow_mut().set_data(&key, 1_u8);
        run_mutation(
            &cache,
            harness.notifier.as_ref(),
            &[key.clone()],
            FetchOptions::default(),
            harness.clients.api.send(ApiRequest::delete("/packages/1")),
        )
        .await
        .expect("deleted");
        assert!(cache.borrow().needs_fetch(&key));
    }

    #[tokio::test]
    async fn failed_mutations_leave_cache_untouched() {
        let harness = Harness::with_token("t");
        harness
            .transport
            .respond_json(400, &json!({"errorCode": 4000019}));
        let cache = RefCell::new(QueryCache::default());
        let key = QueryKey::new("users");
        cache.borrow_mut().set_data(&key, 1_u8);
        let err = run_mutation(
            &cache,
            harness.notifier.as_ref(),
            &[key.clone()],
            FetchOptions::SILENT,
            harness.clients.api.send(ApiRequest::post("/users")),
        )
        .await
        .expect_err("duplicate");
        assert_eq!(err.message, "User with entered email already exist.");
        assert!(!cache.borrow().needs_fetch(&key));
        assert!(harness.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn domain_errors_toast_the_mapped_message_only() {
        let harness = Harness::with_token("t");
        harness
            .transport
            .respond_json(403, &json!({"errorCode": 4030010, "message": "credits"}));
        let cache = RefCell::new(QueryCache::default());
        let err = run_mutation(
            &cache,
            harness.notifier.as_ref(),
            &[QueryKey::new("subscriptions")],
            FetchOptions::default(),
            harness.clients.api.send(ApiRequest::post("/subscriptions")),
        )
        .await
        .expect_err("403");
        assert_eq!(err.message, "Not enough credits.");
        assert!(!err.original.handled_globally());
        assert_eq!(
            harness.notifier.messages(),
            vec!["Not enough credits.".to_string()]
        );
    }

    #[tokio::test]
    async fn silent_mutations_show_nothing_on_domain_errors() {
        let harness = Harness::with_token("t");
        harness
            .transport
            .respond_json(403, &json!({"errorCode": 4030010}));
        let cache = RefCell::new(QueryCache::default());
        let err = run_mutation(
            &cache,
            harness.notifier.as_ref(),
            &[],
            FetchOptions::SILENT,
            harness.clients.api.send(ApiRequest::post("/subscriptions")),
        )
        .await
        .expect_err("403");
        assert_eq!(err.message, "Not enough credits.");
        assert!(harness.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn expired_sessions_are_not_toasted_twice() {
        let harness = Harness::with_token("stale");
        harness.transport.respond_json(401, &json!({}));
        let cache = RefCell::new(QueryCache::default());
        run_query(
            &cache,
            harness.notifier.as_ref(),
            &QueryKey::new("companies"),
            FetchOptions::default(),
            harness.clients.api.json::<serde_json::Value>(ApiRequest::get("/companies")),
        )
        .await
        .expect_err("401");
        assert_eq!(
            harness.notifier.messages(),
            vec![crate::core::errors::SESSION_EXPIRED_MESSAGE.to_string()]
        );
    }

    struct Fails;

    #[async_trait::async_trait(?Send)]
    impl crate::core::saga::SagaStep<u8> for Fails {
        fn name(&self) -> &'static str {
            "fails"
        }

        async fn run(&self, ctx: &mut u8) -> Result<(), ApiError> {
            *ctx += 1;
            Err(ApiError::from(status_error(403, r#"{"errorCode": 4030010}"#, false)))
        }
    }

    #[tokio::test]
    async fn failed_sagas_still_invalidate_and_toast_once() {
        let notifier = RecordingNotifier::default();
        let cache = RefCell::new(QueryCache::default());
        let key = QueryKey::new("assistants").with("c1");
        cache.borrow_mut().set_data(&key, 1_u8);
        let saga = Saga::new("test").step(Fails);
        let mut ctx = 0_u8;
        let err = run_saga(
            &cache,
            &notifier,
            &saga,
            &mut ctx,
            &[QueryKey::new("assistants")],
            FetchOptions::default(),
        )
        .await
        .expect_err("fails");
        assert_eq!(err.step, "fails");
        assert_eq!(ctx, 1);
        assert!(cache.borrow().needs_fetch(&key));
        assert_eq!(notifier.messages(), vec!["Not enough credits.".to_string()]);
    }
}
