//! Query hooks backed by the shared [`QueryCache`] store.
//!
//! # Design
//! - Components select a typed snapshot; an effect starts a fetch whenever the
//!   cache reports the key missing or stale.
//! - Fetches run through the core query wrapper so errors surface once.
//! - A key whose last fetch failed is retried when a reader mounts.

use std::future::Future;
use std::rc::Rc;

use yew::prelude::*;
use yewdux::prelude::{Dispatch, use_selector_with_deps};

use crate::app::api::ApiCtx;
use crate::core::cache::{QueryCache, QueryKey, QuerySnapshot};
use crate::core::client::ApiClient;
use crate::core::errors::RequestError;
use crate::core::fetch::{CacheHandle, FetchOptions, run_query};

impl CacheHandle for Dispatch<QueryCache> {
    fn with_cache<R>(&self, update: impl FnOnce(&mut QueryCache) -> R) -> R {
        let mut cache = (*self.get()).clone();
        let outcome = update(&mut cache);
        self.set(cache);
        outcome
    }
}

/// Read `key`, fetching it with `fetch` when missing or stale.
#[hook]
pub(crate) fn use_query<T, F, Fut>(key: QueryKey, fetch: F) -> Rc<QuerySnapshot<T>>
where
    T: 'static,
    F: FnOnce(Rc<ApiClient>) -> Fut + 'static,
    Fut: Future<Output = Result<T, RequestError>> + 'static,
{
    use_query_with(key, true, fetch)
}

/// [`use_query`] that only fetches while `enabled`.
#[hook]
pub(crate) fn use_query_with<T, F, Fut>(
    key: QueryKey,
    enabled: bool,
    fetch: F,
) -> Rc<QuerySnapshot<T>>
where
    T: 'static,
    F: FnOnce(Rc<ApiClient>) -> Fut + 'static,
    Fut: Future<Output = Result<T, RequestError>> + 'static,
{
    let api_ctx = use_context::<ApiCtx>();
    let snapshot = use_selector_with_deps(
        |cache: &QueryCache, key: &QueryKey| cache.snapshot::<T>(key),
        key.clone(),
    );
    let needs_fetch = use_selector_with_deps(
        |cache: &QueryCache, key: &QueryKey| cache.needs_fetch(key),
        key.clone(),
    );
    use_effect_with_deps(
        |(key, enabled)| {
            if *enabled && Dispatch::<QueryCache>::new().with_cache(|cache| cache.retry_failed(key)) {
                tracing::debug!(key = %key, "retrying failed query");
            }
            || ()
        },
        (key.clone(), enabled),
    );
    use_effect_with_deps(
        move |(key, needs_fetch, enabled)| {
            if let (true, true, Some(api_ctx)) = (*enabled, **needs_fetch, api_ctx) {
                let key = key.clone();
                let request = fetch(api_ctx.api());
                yew::platform::spawn_local(async move {
                    let cache = Dispatch::<QueryCache>::new();
                    if run_query(
                        &cache,
                        api_ctx.notifier.as_ref(),
                        &key,
                        FetchOptions::default(),
                        request,
                    )
                    .await
                    .is_err()
                    {
                        tracing::debug!(key = %key, "query failed");
                    }
                });
            }
            || ()
        },
        (key, needs_fetch, enabled),
    );
    snapshot
}
