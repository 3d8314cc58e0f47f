//! Assistant REST calls and the multi-step submit saga.
//!
//! # Design
//! - Every call is scoped to a company: `/companies/{company}/assistants/...`.
//! - A submit is save, icon upload, voice sync, then knowledge-base sync.
//!   If any later step fails after a create, the new assistant is deleted.

use std::rc::Rc;

use async_trait::async_trait;
use dealerdesk_api_models::{
    Assistant, AssistantInput, AttachDataCollectionRequest, AttachVoiceRequest, Page,
    UploadedFile, Voice,
};
use uuid::Uuid;

use crate::core::cache::QueryKey;
use crate::core::client::ApiClient;
use crate::core::errors::{ApiError, RequestError};
use crate::core::http::{ApiRequest, Upload};
use crate::core::saga::{Saga, SagaStep};
use crate::features::assistants::state::{DataCollectionChange, voice_diff};

/// Key of a company's assistant list; also the invalidation prefix after a submit.
#[must_use]
pub fn assistants_key(company_id: Uuid) -> QueryKey {
    QueryKey::new("assistants").with(company_id)
}

/// Key of one assistant.
#[must_use]
pub fn assistant_key(company_id: Uuid, assistant_id: Uuid) -> QueryKey {
    QueryKey::new("assistant").with(company_id).with(assistant_id)
}

fn base(company_id: Uuid) -> String {
    format!("/companies/{company_id}/assistants")
}

fn item(company_id: Uuid, assistant_id: Uuid) -> String {
    format!("{}/{assistant_id}", base(company_id))
}

/// Assistants of a company.
pub async fn list(client: &ApiClient, company_id: Uuid) -> Result<Page<Assistant>, RequestError> {
    client.page(ApiRequest::get(base(company_id))).await
}

/// Fetch one assistant.
pub async fn get(
    client: &ApiClient,
    company_id: Uuid,
    assistant_id: Uuid,
) -> Result<Assistant, RequestError> {
    client
        .json(ApiRequest::get(item(company_id, assistant_id)))
        .await
}

/// Create an assistant.
pub async fn create(
    client: &ApiClient,
    company_id: Uuid,
    input: &AssistantInput,
) -> Result<Assistant, RequestError> {
    client
        .json(ApiRequest::post(base(company_id)).json(input)?)
        .await
}

/// Patch an assistant.
pub async fn update(
    client: &ApiClient,
    company_id: Uuid,
    assistant_id: Uuid,
    input: &AssistantInput,
) -> Result<Assistant, RequestError> {
    client
        .json(ApiRequest::patch(item(company_id, assistant_id)).json(input)?)
        .await
}

/// Delete an assistant.
pub async fn delete(
    client: &ApiClient,
    company_id: Uuid,
    assistant_id: Uuid,
) -> Result<(), RequestError> {
    client
        .send(ApiRequest::delete(item(company_id, assistant_id)))
        .await
}

/// Upload an icon as multipart field `icon`.
pub async fn upload_icon(
    client: &ApiClient,
    company_id: Uuid,
    assistant_id: Uuid,
    icon: Upload,
) -> Result<UploadedFile, RequestError> {
    client
        .json(
            ApiRequest::post(format!("{}/icons", item(company_id, assistant_id)))
                .multipart(vec![icon.into_field("icon")]),
        )
        .await
}

/// Voices attached to an assistant.
pub async fn voices(
    client: &ApiClient,
    company_id: Uuid,
    assistant_id: Uuid,
) -> Result<Page<Voice>, RequestError> {
    client
        .page(ApiRequest::get(format!(
            "{}/voices",
            item(company_id, assistant_id)
        )))
        .await
}

/// Attach a voice.
pub async fn attach_voice(
    client: &ApiClient,
    company_id: Uuid,
    assistant_id: Uuid,
    voice_id: Uuid,
) -> Result<(), RequestError> {
    client
        .send(
            ApiRequest::post(format!("{}/voices", item(company_id, assistant_id)))
                .json(&AttachVoiceRequest { voice_id })?,
        )
        .await
}

/// Detach a voice.
pub async fn detach_voice(
    client: &ApiClient,
    company_id: Uuid,
    assistant_id: Uuid,
    voice_id: Uuid,
) -> Result<(), RequestError> {
    client
        .send(ApiRequest::delete(format!(
            "{}/voices/{voice_id}",
            item(company_id, assistant_id)
        )))
        .await
}

/// Attach a data collection.
pub async fn attach_data_collection(
    client: &ApiClient,
    company_id: Uuid,
    assistant_id: Uuid,
    data_collection_id: Uuid,
) -> Result<(), RequestError> {
    client
        .send(
            ApiRequest::post(format!(
                "{}/data-collections",
                item(company_id, assistant_id)
            ))
            .json(&AttachDataCollectionRequest { data_collection_id })?,
        )
        .await
}

/// Detach a data collection.
pub async fn detach_data_collection(
    client: &ApiClient,
    company_id: Uuid,
    assistant_id: Uuid,
    data_collection_id: Uuid,
) -> Result<(), RequestError> {
    client
        .send(ApiRequest::delete(format!(
            "{}/data-collections/{data_collection_id}",
            item(company_id, assistant_id)
        )))
        .await
}

/// Shared state of the assistant submit saga.
pub struct AssistantSubmit {
    client: Rc<ApiClient>,
    company_id: Uuid,
    assistant_id: Option<Uuid>,
    input: AssistantInput,
    icon: Option<Upload>,
    voices_to_add: Vec<Uuid>,
    voices_to_remove: Vec<Uuid>,
    data_collection: Option<DataCollectionChange>,
    created: bool,
}

impl AssistantSubmit {
    /// Plan a create (`existing = None`) or an update of `existing`.
    #[must_use]
    pub fn new(
        client: Rc<ApiClient>,
        company_id: Uuid,
        existing: Option<&Assistant>,
        input: AssistantInput,
        icon: Option<Upload>,
        voice_ids: &[Uuid],
        data_collection_id: Option<Uuid>,
    ) -> Self {
        let current_voices: Vec<Uuid> = existing
            .map(|assistant| assistant.voices.iter().map(|voice| voice.id).collect())
            .unwrap_or_default();
        let (voices_to_add, voices_to_remove) = voice_diff(&current_voices, voice_ids);
        let current_collection =
            existing.and_then(|assistant| assistant.data_collection.as_ref().map(|dc| dc.id));
        Self {
            client,
            company_id,
            assistant_id: existing.map(|assistant| assistant.id),
            input,
            icon,
            voices_to_add,
            voices_to_remove,
            data_collection: DataCollectionChange::between(current_collection, data_collection_id),
            created: false,
        }
    }

    /// Id of the saved assistant, once known.
    #[must_use]
    pub const fn assistant_id(&self) -> Option<Uuid> {
        self.assistant_id
    }

    /// Whether this submit creates a new assistant.
    #[must_use]
    pub const fn is_create(&self) -> bool {
        self.created || self.assistant_id.is_none()
    }
}

struct SaveAssistant;

#[async_trait(?Send)]
impl SagaStep<AssistantSubmit> for SaveAssistant {
    fn name(&self) -> &'static str {
        "save assistant"
    }

    async fn run(&self, ctx: &mut AssistantSubmit) -> Result<(), ApiError> {
        let saved = match ctx.assistant_id {
            Some(assistant_id) => {
                update(&ctx.client, ctx.company_id, assistant_id, &ctx.input).await?
            }
            None => {
                let assistant = create(&ctx.client, ctx.company_id, &ctx.input).await?;
                ctx.created = true;
                assistant
            }
        };
        ctx.assistant_id = Some(saved.id);
        Ok(())
    }

    async fn compensate(&self, ctx: &mut AssistantSubmit) -> Result<(), ApiError> {
        if let (true, Some(assistant_id)) = (ctx.created, ctx.assistant_id) {
            delete(&ctx.client, ctx.company_id, assistant_id).await?;
            ctx.assistant_id = None;
            ctx.created = false;
        }
        Ok(())
    }
}

struct UploadIcon;

#[async_trait(?Send)]
impl SagaStep<AssistantSubmit> for UploadIcon {
    fn name(&self) -> &'static str {
        "upload icon"
    }

    async fn run(&self, ctx: &mut AssistantSubmit) -> Result<(), ApiError> {
        if let (Some(assistant_id), Some(icon)) = (ctx.assistant_id, ctx.icon.clone()) {
            upload_icon(&ctx.client, ctx.company_id, assistant_id, icon).await?;
        }
        Ok(())
    }
}

struct SyncVoices;

#[async_trait(?Send)]
impl SagaStep<AssistantSubmit> for SyncVoices {
    fn name(&self) -> &'static str {
        "sync voices"
    }

    async fn run(&self, ctx: &mut AssistantSubmit) -> Result<(), ApiError> {
        let Some(assistant_id) = ctx.assistant_id else {
            return Ok(());
        };
        for voice_id in &ctx.voices_to_add {
            attach_voice(&ctx.client, ctx.company_id, assistant_id, *voice_id).await?;
        }
        for voice_id in &ctx.voices_to_remove {
            detach_voice(&ctx.client, ctx.company_id, assistant_id, *voice_id).await?;
        }
        Ok(())
    }
}

struct SyncDataCollection;

#[async_trait(?Send)]
impl SagaStep<AssistantSubmit> for SyncDataCollection {
    fn name(&self) -> &'static str {
        "sync data collection"
    }

    async fn run(&self, ctx: &mut AssistantSubmit) -> Result<(), ApiError> {
        let Some(assistant_id) = ctx.assistant_id else {
            return Ok(());
        };
        match ctx.data_collection {
            Some(DataCollectionChange::Attach(id)) => {
                attach_data_collection(&ctx.client, ctx.company_id, assistant_id, id).await?;
            }
            Some(DataCollectionChange::Detach(id)) => {
                detach_data_collection(&ctx.client, ctx.company_id, assistant_id, id).await?;
            }
            None => {}
        }
        Ok(())
    }
}

/// Save an assistant, upload its icon, then sync voices and knowledge base.
#[must_use]
pub fn submit_saga() -> Saga<AssistantSubmit> {
    Saga::new("assistant submit")
        .step(SaveAssistant)
        .step(UploadIcon)
        .step(SyncVoices)
        .step(SyncDataCollection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::{Method, RequestBody};
    use crate::core::testing::Harness;
    use dealerdesk_api_models::DataCollectionRef;
    use serde_json::json;

    fn input() -> AssistantInput {
        AssistantInput {
            name: "Ana".into(),
            supported_languages: vec!["en".into()],
            ..AssistantInput::default()
        }
    }

    fn saved(id: Uuid, voices: Vec<Uuid>, collection: Option<Uuid>) -> Assistant {
        Assistant {
            id,
            company_id: None,
            name: "Ana".into(),
            personality: None,
            supported_languages: vec!["en".into()],
            virtual_office_id: None,
            data_collection: collection.map(|id| DataCollectionRef { id, name: None }),
            user_message_limit: None,
            subscription_id: None,
            use_tts: false,
            icon_url: None,
            voices: voices
                .into_iter()
                .map(|id| Voice {
                    id,
                    name: "v".into(),
                    display_name: None,
                    language: "en".into(),
                    gender: None,
                    pitch: 0.0,
                    speaking_rate: 1.0,
                    provider: None,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn create_runs_every_step_in_order() {
        let harness = Harness::with_token("t");
        let company_id = Uuid::new_v4();
        let assistant_id = Uuid::new_v4();
        let voice_id = Uuid::new_v4();
        let collection_id = Uuid::new_v4();
        harness
            .transport
            .respond_json(201, &json!({"id": assistant_id, "name": "Ana"}));
        harness.transport.respond_json(201, &json!({"url": "https://cdn/icon.png"}));
        harness.transport.respond_json(201, &json!({}));
        harness.transport.respond_json(201, &json!({}));
        let icon = Upload {
            file_name: "icon.png".into(),
            mime: "image/png".into(),
            bytes: vec![7],
        };
        let mut ctx = AssistantSubmit::new(
            Rc::clone(&harness.clients.api),
            company_id,
            None,
            input(),
            Some(icon),
            &[voice_id],
            Some(collection_id),
        );
        assert!(ctx.is_create());
        submit_saga().execute(&mut ctx).await.expect("saved");

        let sent = harness.transport.requests();
        let prefix = format!("http://api.test/companies/{company_id}/assistants");
        let urls: Vec<&str> = sent.iter().map(|request| request.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                prefix.clone(),
                format!("{prefix}/{assistant_id}/icons"),
                format!("{prefix}/{assistant_id}/voices"),
                format!("{prefix}/{assistant_id}/data-collections"),
            ]
        );
        assert_eq!(
            sent[2].body,
            RequestBody::Json(json!({"voiceId": voice_id.to_string()}))
        );
        assert_eq!(
            sent[3].body,
            RequestBody::Json(json!({"data_collection_id": collection_id.to_string()}))
        );
    }

    #[tokio::test]
    async fn update_only_sends_changed_voices_and_detaches_collection() {
        let harness = Harness::with_token("t");
        let company_id = Uuid::new_v4();
        let assistant_id = Uuid::new_v4();
        let kept = Uuid::new_v4();
        let dropped = Uuid::new_v4();
        let collection_id = Uuid::new_v4();
        let existing = saved(assistant_id, vec![kept, dropped], Some(collection_id));
        harness
            .transport
            .respond_json(200, &json!({"id": assistant_id, "name": "Ana"}));
        harness.transport.respond_json(200, &json!({}));
        harness.transport.respond_json(200, &json!({}));
        let mut ctx = AssistantSubmit::new(
            Rc::clone(&harness.clients.api),
            company_id,
            Some(&existing),
            input(),
            None,
            &[kept],
            None,
        );
        assert!(!ctx.is_create());
        submit_saga().execute(&mut ctx).await.expect("saved");

        let sent = harness.transport.requests();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].method, Method::Patch);
        assert_eq!(sent[1].method, Method::Delete);
        assert!(sent[1].url.ends_with(&format!("/voices/{dropped}")));
        assert!(sent[2].url.ends_with(&format!("/data-collections/{collection_id}")));
    }

    #[tokio::test]
    async fn failed_voice_attach_after_create_deletes_the_assistant() {
        let harness = Harness::with_token("t");
        let company_id = Uuid::new_v4();
        let assistant_id = Uuid::new_v4();
        harness
            .transport
            .respond_json(201, &json!({"id": assistant_id, "name": "Ana"}));
        harness
            .transport
            .respond_json(403, &json!({"errorCode": 4030010}));
        harness.transport.respond_json(200, &json!({}));
        let mut ctx = AssistantSubmit::new(
            Rc::clone(&harness.clients.api),
            company_id,
            None,
            input(),
            None,
            &[Uuid::new_v4()],
            None,
        );
        let err = submit_saga().execute(&mut ctx).await.expect_err("attach fails");
        assert_eq!(err.step, "sync voices");
        assert_eq!(err.source.message, "Not enough credits.");
        assert!(err.fully_compensated());
        assert_eq!(ctx.assistant_id(), None);

        let sent = harness.transport.requests();
        assert_eq!(sent[2].method, Method::Delete);
        assert_eq!(
            sent[2].url,
            format!("http://api.test/companies/{company_id}/assistants/{assistant_id}")
        );
    }
}
