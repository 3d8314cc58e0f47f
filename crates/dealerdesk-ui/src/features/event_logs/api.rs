//! Event log REST call.

use dealerdesk_api_models::{EventLog, Page};

use crate::core::client::ApiClient;
use crate::core::errors::RequestError;
use crate::core::http::ApiRequest;
use crate::features::event_logs::state::EventFilters;

/// One page of event logs.
pub async fn list(client: &ApiClient, filters: &EventFilters) -> Result<Page<EventLog>, RequestError> {
    let request = filters
        .params()
        .into_iter()
        .fold(ApiRequest::get("/event-logs"), |request, (name, value)| {
            request.query(name, value)
        });
    client.page(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::Harness;
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn filters_become_query_parameters() {
        let harness = Harness::with_token("t");
        harness.transport.respond_json(
            200,
            &json!({"data": [], "meta": {"total": 45, "page": 2, "limit": 20}}),
        );
        let user_id = Uuid::new_v4();
        let filters = EventFilters {
            user_id: Some(user_id),
            page: 2,
            ..EventFilters::default()
        };
        let page = list(&harness.clients.api, &filters).await.expect("page");
        assert_eq!(page.meta.map(|meta| meta.page_count()), Some(3));
        let sent = harness.transport.requests();
        assert_eq!(sent[0].url, "http://api.test/event-logs");
        assert!(sent[0].query.contains(&("user_id".into(), user_id.to_string())));
        assert!(!sent[0].query.iter().any(|(name, _)| name == "entity_type"));
    }
}
