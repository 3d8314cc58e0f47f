//! Subscription REST calls.

use dealerdesk_api_models::{Page, Subscription, SubscriptionInput};
use uuid::Uuid;

use crate::core::cache::QueryKey;
use crate::core::client::ApiClient;
use crate::core::errors::RequestError;
use crate::core::http::ApiRequest;

/// Key of a company's subscriptions.
#[must_use]
pub fn subscriptions_key(company_id: Uuid) -> QueryKey {
    QueryKey::new("subscriptions").with(company_id)
}

/// Subscriptions of a company.
pub async fn list(client: &ApiClient, company_id: Uuid) -> Result<Page<Subscription>, RequestError> {
    client
        .page(ApiRequest::get("/subscriptions").query("companyId", company_id))
        .await
}

/// Create a subscription.
pub async fn create(
    client: &ApiClient,
    input: &SubscriptionInput,
) -> Result<Subscription, RequestError> {
    client
        .json(ApiRequest::post("/subscriptions").json(input)?)
        .await
}

/// Patch a subscription.
pub async fn update(
    client: &ApiClient,
    subscription_id: Uuid,
    input: &SubscriptionInput,
) -> Result<Subscription, RequestError> {
    client
        .json(ApiRequest::patch(format!("/subscriptions/{subscription_id}")).json(input)?)
        .await
}

/// Delete a subscription.
pub async fn delete(client: &ApiClient, subscription_id: Uuid) -> Result<(), RequestError> {
    client
        .send(ApiRequest::delete(format!("/subscriptions/{subscription_id}")))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::Harness;
    use serde_json::json;

    #[tokio::test]
    async fn list_filters_by_company() {
        let harness = Harness::with_token("t");
        let company_id = Uuid::new_v4();
        harness.transport.respond_json(
            200,
            &json!([{
                "id": Uuid::new_v4(),
                "package_id": Uuid::new_v4(),
                "start_date": "2025-03-01T00:00:00Z",
                "type": "basic",
                "status": "active"
            }]),
        );
        let page = list(&harness.clients.api, company_id).await.expect("list");
        assert!(page.data[0].is_active());
        let sent = harness.transport.requests();
        assert_eq!(sent[0].url, "http://api.test/subscriptions");
        assert_eq!(
            sent[0].query,
            vec![("companyId".to_string(), company_id.to_string())]
        );
    }
}
