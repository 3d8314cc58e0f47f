//! Voice catalogue REST calls.

use dealerdesk_api_models::{Page, Voice, VoiceInput};
use uuid::Uuid;

use crate::core::cache::QueryKey;
use crate::core::client::ApiClient;
use crate::core::errors::RequestError;
use crate::core::http::ApiRequest;

/// Key of the voice catalogue.
#[must_use]
pub fn voices_key() -> QueryKey {
    QueryKey::new("voices")
}

/// Every voice.
pub async fn list(client: &ApiClient) -> Result<Page<Voice>, RequestError> {
    client.page(ApiRequest::get("/voices")).await
}

/// Fetch one voice.
pub async fn get(client: &ApiClient, voice_id: Uuid) -> Result<Voice, RequestError> {
    client.json(ApiRequest::get(format!("/voices/{voice_id}"))).await
}

/// Create a voice.
pub async fn create(client: &ApiClient, input: &VoiceInput) -> Result<Voice, RequestError> {
    client.json(ApiRequest::post("/voices").json(input)?).await
}

/// Patch a voice.
pub async fn update(client: &ApiClient, voice_id: Uuid, input: &VoiceInput) -> Result<Voice, RequestError> {
    client
        .json(ApiRequest::patch(format!("/voices/{voice_id}")).json(input)?)
        .await
}

/// Delete a voice.
pub async fn delete(client: &ApiClient, voice_id: Uuid) -> Result<(), RequestError> {
    client
        .send(ApiRequest::delete(format!("/voices/{voice_id}")))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::Harness;
    use serde_json::json;

    #[tokio::test]
    async fn plain_arrays_decode_into_a_page() {
        let harness = Harness::with_token("t");
        harness.transport.respond_json(
            200,
            &json!([{"id": Uuid::new_v4(), "name": "Emma", "language": "en", "gender": "female"}]),
        );
        let page = list(&harness.clients.api).await.expect("voices");
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].picker_label(), "Emma [EN • Female]");
        assert!(page.meta.is_none());
    }
}
