//! Data collection REST calls: collections, entries, import, export, publish.

use dealerdesk_api_models::{
    DataCollection, DataCollectionEntries, DataCollectionEntry, DataCollectionInput, Page,
};
use serde_json::Value;
use uuid::Uuid;

use crate::core::cache::QueryKey;
use crate::core::client::ApiClient;
use crate::core::errors::RequestError;
use crate::core::http::ApiRequest;
use crate::features::data_collections::state::ImportPlan;

/// Key of a company's collections.
#[must_use]
pub fn collections_key(company_id: Uuid) -> QueryKey {
    QueryKey::new("dataCollections").with(company_id)
}

/// Key of one collection.
#[must_use]
pub fn collection_key(company_id: Uuid, collection_id: Uuid) -> QueryKey {
    QueryKey::new("dataCollection")
        .with(company_id)
        .with(collection_id)
}

/// Key of a collection's entries.
#[must_use]
pub fn entries_key(company_id: Uuid, collection_id: Uuid) -> QueryKey {
    QueryKey::new("dataCollectionEntries")
        .with(company_id)
        .with(collection_id)
}

fn base(company_id: Uuid) -> String {
    format!("/companies/{company_id}/data-collections")
}

fn item(company_id: Uuid, collection_id: Uuid) -> String {
    format!("{}/{collection_id}", base(company_id))
}

/// Collections of a company.
pub async fn list(
    client: &ApiClient,
    company_id: Uuid,
) -> Result<Page<DataCollection>, RequestError> {
    client.page(ApiRequest::get(base(company_id))).await
}

/// Fetch one collection.
pub async fn get(
    client: &ApiClient,
    company_id: Uuid,
    collection_id: Uuid,
) -> Result<DataCollection, RequestError> {
    client
        .json(ApiRequest::get(item(company_id, collection_id)))
        .await
}

/// Create a collection.
pub async fn create(
    client: &ApiClient,
    company_id: Uuid,
    input: &DataCollectionInput,
) -> Result<DataCollection, RequestError> {
    client
        .json(ApiRequest::post(base(company_id)).json(input)?)
        .await
}

/// Patch a collection.
pub async fn update(
    client: &ApiClient,
    company_id: Uuid,
    collection_id: Uuid,
    input: &DataCollectionInput,
) -> Result<(), RequestError> {
    client
        .send(ApiRequest::patch(item(company_id, collection_id)).json(input)?)
        .await
}

/// Delete a collection.
pub async fn delete(
    client: &ApiClient,
    company_id: Uuid,
    collection_id: Uuid,
) -> Result<(), RequestError> {
    client
        .send(ApiRequest::delete(item(company_id, collection_id)))
        .await
}

/// Rows of a collection.
pub async fn entries(
    client: &ApiClient,
    company_id: Uuid,
    collection_id: Uuid,
) -> Result<Vec<DataCollectionEntry>, RequestError> {
    client
        .json::<DataCollectionEntries>(ApiRequest::get(format!(
            "{}/entries",
            item(company_id, collection_id)
        )))
        .await
        .map(|body| body.entries)
}

/// Add one row.
pub async fn add_entry(
    client: &ApiClient,
    company_id: Uuid,
    collection_id: Uuid,
    data: &Value,
) -> Result<(), RequestError> {
    client
        .send(
            ApiRequest::post(format!("{}/entries", item(company_id, collection_id))).json(data)?,
        )
        .await
}

/// Remove one row.
pub async fn delete_entry(
    client: &ApiClient,
    company_id: Uuid,
    collection_id: Uuid,
    entry_id: Uuid,
) -> Result<(), RequestError> {
    client
        .send(ApiRequest::delete(format!(
            "{}/entries/{entry_id}",
            item(company_id, collection_id)
        )))
        .await
}

/// Export rows as CSV.
pub async fn export_csv(
    client: &ApiClient,
    company_id: Uuid,
    collection_id: Uuid,
) -> Result<Vec<u8>, RequestError> {
    client
        .bytes(
            ApiRequest::get(format!("{}/export", item(company_id, collection_id)))
                .query("format", "csv"),
        )
        .await
}

/// Run an API or CSV import.
pub async fn import(
    client: &ApiClient,
    company_id: Uuid,
    collection_id: Uuid,
    plan: ImportPlan,
) -> Result<(), RequestError> {
    let request = ApiRequest::post(format!("{}/import", item(company_id, collection_id)));
    let request = match plan {
        ImportPlan::Api(body) => request.json(&body)?,
        ImportPlan::File(fields) => request.multipart(fields),
    };
    client.send(request).await
}

/// Publish a collection to assistants.
pub async fn publish(
    client: &ApiClient,
    company_id: Uuid,
    collection_id: Uuid,
) -> Result<(), RequestError> {
    client
        .send(ApiRequest::patch(format!(
            "{}/publish",
            item(company_id, collection_id)
        )))
        .await
}

/// File name offered for a CSV export.
#[must_use]
pub fn export_file_name(collection: &DataCollection) -> String {
    let slug: String = collection
        .name
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        format!("data-collection-{}.csv", collection.id)
    } else {
        format!("{slug}.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::{Method, MultipartField, RequestBody, Upload};
    use crate::core::testing::Harness;
    use crate::features::data_collections::state::{ImportForm, ImportKind};
    use serde_json::json;

    #[tokio::test]
    async fn entries_are_unwrapped() {
        let harness = Harness::with_token("t");
        let entry_id = Uuid::new_v4();
        harness.transport.respond_json(
            200,
            &json!({"entries": [{"id": entry_id, "data": {"make": "Skoda"}}]}),
        );
        let company_id = Uuid::new_v4();
        let collection_id = Uuid::new_v4();
        let rows = entries(&harness.clients.api, company_id, collection_id)
            .await
            .expect("entries");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, entry_id);
        assert_eq!(
            harness.transport.requests()[0].url,
            format!("http://api.test/companies/{company_id}/data-collections/{collection_id}/entries")
        );
    }

    #[tokio::test]
    async fn export_asks_for_csv_and_returns_raw_bytes() {
        let harness = Harness::with_token("t");
        harness
            .transport
            .respond_raw(200, b"make,model\nSkoda,Octavia\n".to_vec());
        let bytes = export_csv(&harness.clients.api, Uuid::new_v4(), Uuid::new_v4())
            .await
            .expect("export");
        assert!(bytes.starts_with(b"make,model"));
        let sent = harness.transport.requests();
        assert_eq!(sent[0].query, vec![("format".to_string(), "csv".to_string())]);
    }

    #[tokio::test]
    async fn file_import_is_multipart() {
        let harness = Harness::with_token("t");
        harness.transport.respond_json(201, &json!({}));
        let form = ImportForm {
            kind: ImportKind::File,
            file: Some(Upload {
                file_name: "stock.csv".into(),
                mime: "text/csv".into(),
                bytes: b"make\n".to_vec(),
            }),
            ..ImportForm::default()
        };
        let plan = form.validate().expect("valid");
        import(&harness.clients.api, Uuid::new_v4(), Uuid::new_v4(), plan)
            .await
            .expect("imported");
        let sent = harness.transport.requests();
        assert_eq!(sent[0].method, Method::Post);
        assert!(sent[0].url.ends_with("/import"));
        let RequestBody::Multipart(fields) = &sent[0].body else {
            panic!("expected multipart body");
        };
        assert_eq!(fields.len(), 2);
        assert!(matches!(&fields[1], MultipartField::File { name, .. } if name == "file"));
    }

    #[tokio::test]
    async fn publish_is_a_bodyless_patch() {
        let harness = Harness::with_token("t");
        harness.transport.respond_json(200, &json!({}));
        publish(&harness.clients.api, Uuid::new_v4(), Uuid::new_v4())
            .await
            .expect("published");
        let sent = harness.transport.requests();
        assert_eq!(sent[0].method, Method::Patch);
        assert!(sent[0].url.ends_with("/publish"));
        assert_eq!(sent[0].body, RequestBody::Empty);
    }

    #[test]
    fn export_names_are_slugged() {
        let collection = DataCollection {
            id: Uuid::nil(),
            name: "Used Cars".into(),
            tags: Vec::new(),
            published: false,
            created_at: None,
        };
        assert_eq!(export_file_name(&collection), "used-cars.csv");
    }
}
