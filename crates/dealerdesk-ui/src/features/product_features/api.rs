//! Feature catalogue and company pricing REST calls.

use dealerdesk_api_models::{CompanyFeature, CompanyFeatureInput, Feature, FeatureInput, Page};
use uuid::Uuid;

use crate::core::cache::QueryKey;
use crate::core::client::ApiClient;
use crate::core::errors::RequestError;
use crate::core::http::ApiRequest;

/// Key of the feature catalogue.
#[must_use]
pub fn features_key() -> QueryKey {
    QueryKey::new("features")
}

/// Key of a company's feature prices.
#[must_use]
pub fn feature_prices_key(company_id: Uuid) -> QueryKey {
    QueryKey::new("features-price").with(company_id)
}

/// Every catalogue feature.
pub async fn list(client: &ApiClient) -> Result<Page<Feature>, RequestError> {
    client.page(ApiRequest::get("/features")).await
}

/// Create a catalogue feature.
pub async fn create(client: &ApiClient, input: &FeatureInput) -> Result<Feature, RequestError> {
    client.json(ApiRequest::post("/features").json(input)?).await
}

/// Patch a catalogue feature.
pub async fn update(
    client: &ApiClient,
    feature_id: Uuid,
    input: &FeatureInput,
) -> Result<Feature, RequestError> {
    client
        .json(ApiRequest::patch(format!("/features/{feature_id}")).json(input)?)
        .await
}

/// Delete a catalogue feature.
pub async fn delete(client: &ApiClient, feature_id: Uuid) -> Result<(), RequestError> {
    client
        .send(ApiRequest::delete(format!("/features/{feature_id}")))
        .await
}

/// Feature prices of a company.
pub async fn company_prices(
    client: &ApiClient,
    company_id: Uuid,
) -> Result<Page<CompanyFeature>, RequestError> {
    client
        .page(ApiRequest::get(format!("/companies/{company_id}/feature-prices")))
        .await
}

/// Add or change a company's price for a feature.
pub async fn set_company_price(
    client: &ApiClient,
    company_id: Uuid,
    input: &CompanyFeatureInput,
) -> Result<(), RequestError> {
    client
        .send(ApiRequest::patch(format!("/companies/{company_id}/features")).json(input)?)
        .await
}

/// Remove a feature from a company.
pub async fn remove_company_feature(
    client: &ApiClient,
    company_id: Uuid,
    feature_id: Uuid,
) -> Result<(), RequestError> {
    client
        .send(ApiRequest::delete(format!(
            "/companies/{company_id}/features/{feature_id}"
        )))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::{Method, RequestBody};
    use crate::core::testing::Harness;
    use dealerdesk_api_models::BillingType;
    use serde_json::json;

    #[tokio::test]
    async fn company_price_patch_omits_amount_for_postpaid() {
        let harness = Harness::with_token("t");
        harness.transport.respond_json(200, &json!({}));
        let company_id = Uuid::new_v4();
        let feature_id = Uuid::new_v4();
        set_company_price(
            &harness.clients.api,
            company_id,
            &CompanyFeatureInput {
                feature_id,
                price: 5.0,
                billing_type: BillingType::Postpaid,
                prepaid_amount: None,
            },
        )
        .await
        .expect("saved");
        let sent = harness.transport.requests();
        assert_eq!(sent[0].method, Method::Patch);
        assert_eq!(sent[0].url, format!("http://api.test/companies/{company_id}/features"));
        assert_eq!(
            sent[0].body,
            RequestBody::Json(json!({
                "feature_id": feature_id.to_string(),
                "price": 5.0,
                "billing_type": "postpaid"
            }))
        );
    }

    #[tokio::test]
    async fn prices_decode_with_embedded_features() {
        let harness = Harness::with_token("t");
        let feature_id = Uuid::new_v4();
        harness.transport.respond_json(
            200,
            &json!([{
                "feature_id": feature_id,
                "feature": {"id": feature_id, "name": "Avatars"},
                "price": 20,
                "billing_type": "prepaid",
                "prepaid_amount": 200
            }]),
        );
        let prices = company_prices(&harness.clients.api, Uuid::new_v4())
            .await
            .expect("prices");
        assert_eq!(prices.data[0].billing_type, BillingType::Prepaid);
        assert_eq!(
            prices.data[0].feature.as_ref().map(|feature| feature.name.as_str()),
            Some("Avatars")
        );
    }
}
