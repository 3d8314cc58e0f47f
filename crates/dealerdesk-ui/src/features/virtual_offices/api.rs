//! Virtual office REST calls and the save-with-media saga.

use std::rc::Rc;

use async_trait::async_trait;
use dealerdesk_api_models::{Page, VirtualOffice, VirtualOfficeInput};
use uuid::Uuid;

use crate::core::cache::QueryKey;
use crate::core::client::ApiClient;
use crate::core::errors::{ApiError, RequestError};
use crate::core::http::{ApiRequest, Upload};
use crate::core::saga::{Saga, SagaStep};

/// Key of a company's offices.
#[must_use]
pub fn offices_key(company_id: Uuid) -> QueryKey {
    QueryKey::new("virtualOffices").with(company_id)
}

fn base(company_id: Uuid) -> String {
    format!("/companies/{company_id}/virtual-offices")
}

/// Offices of a company.
pub async fn list(client: &ApiClient, company_id: Uuid) -> Result<Page<VirtualOffice>, RequestError> {
    client.page(ApiRequest::get(base(company_id))).await
}

/// Create an office.
pub async fn create(
    client: &ApiClient,
    company_id: Uuid,
    input: &VirtualOfficeInput,
) -> Result<VirtualOffice, RequestError> {
    client
        .json(ApiRequest::post(base(company_id)).json(input)?)
        .await
}

/// Patch an office.
pub async fn update(
    client: &ApiClient,
    company_id: Uuid,
    office_id: Uuid,
    input: &VirtualOfficeInput,
) -> Result<VirtualOffice, RequestError> {
    client
        .json(ApiRequest::patch(format!("{}/{office_id}", base(company_id))).json(input)?)
        .await
}

/// Delete an office.
pub async fn delete(client: &ApiClient, company_id: Uuid, office_id: Uuid) -> Result<(), RequestError> {
    client
        .send(ApiRequest::delete(format!("{}/{office_id}", base(company_id))))
        .await
}

/// Upload a background image (multipart field `file`).
pub async fn upload_background(
    client: &ApiClient,
    company_id: Uuid,
    office_id: Uuid,
    file: Upload,
) -> Result<(), RequestError> {
    client
        .send(
            ApiRequest::post(format!("{}/{office_id}/backgrounds", base(company_id)))
                .multipart(vec![file.into_field("file")]),
        )
        .await
}

/// Upload an avatar source image (multipart field `file`); the backend
/// renders the avatar asynchronously.
pub async fn upload_avatar(
    client: &ApiClient,
    company_id: Uuid,
    office_id: Uuid,
    file: Upload,
) -> Result<(), RequestError> {
    client
        .send(
            ApiRequest::post(format!("{}/{office_id}/avatar", base(company_id)))
                .multipart(vec![file.into_field("file")]),
        )
        .await
}

/// Remove an office avatar.
pub async fn delete_avatar(
    client: &ApiClient,
    company_id: Uuid,
    office_id: Uuid,
) -> Result<(), RequestError> {
    client
        .send(ApiRequest::delete(format!("{}/{office_id}/avatar", base(company_id))))
        .await
}

/// Shared state of the office submit saga.
pub struct OfficeSubmit {
    client: Rc<ApiClient>,
    company_id: Uuid,
    office_id: Option<Uuid>,
    input: VirtualOfficeInput,
    background: Option<Upload>,
    avatar: Option<Upload>,
    created: bool,
}

impl OfficeSubmit {
    /// Create (`office_id = None`) or update an office, then upload media.
    #[must_use]
    pub const fn new(
        client: Rc<ApiClient>,
        company_id: Uuid,
        office_id: Option<Uuid>,
        input: VirtualOfficeInput,
        background: Option<Upload>,
        avatar: Option<Upload>,
    ) -> Self {
        Self {
            client,
            company_id,
            office_id,
            input,
            background,
            avatar,
            created: false,
        }
    }

    /// Id of the saved office, once known.
    #[must_use]
    pub const fn office_id(&self) -> Option<Uuid> {
        self.office_id
    }
}

struct SaveOffice;

#[async_trait(?Send)]
impl SagaStep<OfficeSubmit> for SaveOffice {
    fn name(&self) -> &'static str {
        "save virtual office"
    }

    async fn run(&self, ctx: &mut OfficeSubmit) -> Result<(), ApiError> {
        let saved = match ctx.office_id {
            Some(office_id) => update(&ctx.client, ctx.company_id, office_id, &ctx.input).await?,
            None => {
                let office = create(&ctx.client, ctx.company_id, &ctx.input).await?;
                ctx.created = true;
                office
            }
        };
        ctx.office_id = Some(saved.id);
        Ok(())
    }

    async fn compensate(&self, ctx: &mut OfficeSubmit) -> Result<(), ApiError> {
        if let (true, Some(office_id)) = (ctx.created, ctx.office_id) {
            delete(&ctx.client, ctx.company_id, office_id).await?;
            ctx.office_id = None;
            ctx.created = false;
        }
        Ok(())
    }
}

struct UploadBackground;

#[async_trait(?Send)]
impl SagaStep<OfficeSubmit> for UploadBackground {
    fn name(&self) -> &'static str {
        "upload background"
    }

    async fn run(&self, ctx: &mut OfficeSubmit) -> Result<(), ApiError> {
        if let (Some(office_id), Some(file)) = (ctx.office_id, ctx.background.clone()) {
            upload_background(&ctx.client, ctx.company_id, office_id, file).await?;
        }
        Ok(())
    }
}

struct UploadAvatar;

#[async_trait(?Send)]
impl SagaStep<OfficeSubmit> for UploadAvatar {
    fn name(&self) -> &'static str {
        "upload avatar"
    }

    async fn run(&self, ctx: &mut OfficeSubmit) -> Result<(), ApiError> {
        if let (Some(office_id), Some(file)) = (ctx.office_id, ctx.avatar.clone()) {
            upload_avatar(&ctx.client, ctx.company_id, office_id, file).await?;
        }
        Ok(())
    }
}

/// Save an office, then upload its background and avatar.
#[must_use]
pub fn submit_saga() -> Saga<OfficeSubmit> {
    Saga::new("virtual office submit")
        .step(SaveOffice)
        .step(UploadBackground)
        .step(UploadAvatar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::{Method, MultipartField, RequestBody};
    use crate::core::testing::Harness;
    use serde_json::json;

    fn upload(name: &str) -> Upload {
        Upload {
            file_name: name.into(),
            mime: "image/jpeg".into(),
            bytes: vec![1],
        }
    }

    #[tokio::test]
    async fn media_uploads_use_the_file_field() {
        let harness = Harness::with_token("t");
        let company_id = Uuid::new_v4();
        let office_id = Uuid::new_v4();
        harness
            .transport
            .respond_json(200, &json!({"id": office_id, "name": "Lobby"}));
        harness
            .transport
            .respond_json(201, &json!({"background": {"url": "https://cdn/bg.jpg"}}));
        harness
            .transport
            .respond_json(201, &json!({"avatar": {"url": "https://cdn/a.jpg"}}));
        let mut ctx = OfficeSubmit::new(
            Rc::clone(&harness.clients.api),
            company_id,
            Some(office_id),
            VirtualOfficeInput {
                name: "Lobby".into(),
                kind: None,
                configuration: None,
            },
            Some(upload("bg.jpg")),
            Some(upload("face.jpg")),
        );
        submit_saga().execute(&mut ctx).await.expect("saved");

        let sent = harness.transport.requests();
        assert_eq!(sent[0].method, Method::Patch);
        assert!(sent[1].url.ends_with(&format!("{office_id}/backgrounds")));
        assert!(sent[2].url.ends_with(&format!("{office_id}/avatar")));
        for request in &sent[1..] {
            let RequestBody::Multipart(fields) = &request.body else {
                panic!("expected multipart body");
            };
            assert!(matches!(&fields[0], MultipartField::File { name, .. } if name == "file"));
        }
    }

    #[tokio::test]
    async fn failed_background_after_create_deletes_the_office() {
        let harness = Harness::with_token("t");
        let company_id = Uuid::new_v4();
        let office_id = Uuid::new_v4();
        harness
            .transport
            .respond_json(201, &json!({"id": office_id, "name": "Lobby"}));
        harness.transport.fail("timeout");
        harness.transport.respond_json(200, &json!({}));
        let mut ctx = OfficeSubmit::new(
            Rc::clone(&harness.clients.api),
            company_id,
            None,
            VirtualOfficeInput {
                name: "Lobby".into(),
                kind: Some("default".into()),
                configuration: None,
            },
            Some(upload("bg.jpg")),
            None,
        );
        let err = submit_saga().execute(&mut ctx).await.expect_err("upload fails");
        assert_eq!(err.step, "upload background");
        assert_eq!(ctx.office_id(), None);
        assert_eq!(harness.transport.requests()[2].method, Method::Delete);
    }
}
