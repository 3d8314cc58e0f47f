//! Package REST calls and the optimistic edit.
//!
//! # Design
//! - Edits patch the cached list before the request and roll back on failure.
//! - Creates go through a plain mutation; the list refetches afterwards.

use dealerdesk_api_models::{Package, PackageInput, Page};
use uuid::Uuid;

use crate::core::cache::QueryKey;
use crate::core::client::ApiClient;
use crate::core::errors::{ApiError, RequestError};
use crate::core::fetch::{CacheHandle, FetchOptions, run_mutation};
use crate::core::http::ApiRequest;
use crate::core::notify::Notifier;

/// Key of the package list.
#[must_use]
pub fn packages_key() -> QueryKey {
    QueryKey::new("packages")
}

/// Every package.
pub async fn list(client: &ApiClient) -> Result<Page<Package>, RequestError> {
    client.page(ApiRequest::get("/packages")).await
}

/// Fetch one package.
pub async fn get(client: &ApiClient, package_id: Uuid) -> Result<Package, RequestError> {
    client
        .json(ApiRequest::get(format!("/packages/{package_id}")))
        .await
}

/// Create a package.
pub async fn create(client: &ApiClient, input: &PackageInput) -> Result<Package, RequestError> {
    client.json(ApiRequest::post("/packages").json(input)?).await
}

/// Patch a package.
pub async fn update(
    client: &ApiClient,
    package_id: Uuid,
    input: &PackageInput,
) -> Result<Package, RequestError> {
    client
        .json(ApiRequest::patch(format!("/packages/{package_id}")).json(input)?)
        .await
}

/// Delete a package.
pub async fn delete(client: &ApiClient, package_id: Uuid) -> Result<(), RequestError> {
    client
        .send(ApiRequest::delete(format!("/packages/{package_id}")))
        .await
}

/// Update a package, showing the new values in the cached list immediately.
///
/// # Errors
///
/// Returns the normalized error after restoring the previous list.
pub async fn update_optimistic<C>(
    cache: &C,
    notifier: &dyn Notifier,
    client: &ApiClient,
    package_id: Uuid,
    input: &PackageInput,
) -> Result<Package, ApiError>
where
    C: CacheHandle + ?Sized,
{
    let key = packages_key();
    let previous = cache.with_cache(|cache| {
        cache.patch::<Page<Package>>(&key, |page| {
            for package in page.data.iter_mut().filter(|package| package.id == package_id) {
                package.name.clone_from(&input.name);
                package.price = input.price;
                package.conversations_limit = input.conversations_limit;
            }
        })
    });
    let outcome = run_mutation(
        cache,
        notifier,
        std::slice::from_ref(&key),
        FetchOptions::default(),
        update(client, package_id, input),
    )
    .await;
    if let (Err(_), Some(previous)) = (&outcome, previous) {
        cache.with_cache(|cache| cache.rollback(&key, previous));
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::QueryCache;
    use crate::core::testing::Harness;
    use serde_json::json;
    use std::cell::RefCell;

    fn package(id: Uuid, name: &str) -> Package {
        Package {
            id,
            name: name.into(),
            price: 10.0,
            conversations_limit: 100,
        }
    }

    fn input() -> PackageInput {
        PackageInput {
            name: "Pro".into(),
            price: 99.0,
            conversations_limit: 1000,
        }
    }

    fn seeded(id: Uuid) -> RefCell<QueryCache> {
        let cache = RefCell::new(QueryCache::default());
        cache.borrow_mut().set_data(
            &packages_key(),
            Page {
                data: vec![package(id, "Basic")],
                meta: None,
            },
        );
        cache
    }

    #[tokio::test]
    async fn failed_update_restores_the_cached_list() {
        let harness = Harness::with_token("t");
        harness.transport.fail("offline");
        let id = Uuid::new_v4();
        let cache = seeded(id);
        let err = update_optimistic(&cache, harness.notifier.as_ref(), &harness.clients.api, id, &input())
            .await
            .expect_err("offline");
        assert_eq!(err.status, None);
        let cached = cache
            .borrow()
            .get::<Page<Package>>(&packages_key())
            .expect("cached");
        assert_eq!(cached.data[0].name, "Basic");
        assert_eq!(harness.notifier.messages(), vec!["Network or server error".to_string()]);
    }

    #[tokio::test]
    async fn successful_update_marks_the_list_stale() {
        let harness = Harness::with_token("t");
        let id = Uuid::new_v4();
        harness.transport.respond_json(
            200,
            &json!({"id": id, "name": "Pro", "price": 99.0, "conversations_limit": 1000}),
        );
        let cache = seeded(id);
        let saved = update_optimistic(&cache, harness.notifier.as_ref(), &harness.clients.api, id, &input())
            .await
            .expect("saved");
        assert_eq!(saved.name, "Pro");
        let snapshot = cache.borrow().snapshot::<Page<Package>>(&packages_key());
        assert!(snapshot.stale);
        assert_eq!(snapshot.data.expect("kept").data[0].name, "Pro");
    }
}
