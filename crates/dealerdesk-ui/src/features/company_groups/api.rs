//! Company group REST calls and the save-with-logo flow.

use std::rc::Rc;

use async_trait::async_trait;
use dealerdesk_api_models::{CompanyGroup, CompanyGroupInput, Page, UploadedFile};
use uuid::Uuid;

use crate::core::cache::QueryKey;
use crate::core::client::ApiClient;
use crate::core::errors::{ApiError, RequestError};
use crate::core::http::{ApiRequest, Upload};
use crate::core::saga::{Saga, SagaStep};

/// Key of the group list.
#[must_use]
pub fn groups_key() -> QueryKey {
    QueryKey::new("companyGroups")
}

/// Key of a single group.
#[must_use]
pub fn group_key(group_id: Uuid) -> QueryKey {
    QueryKey::new("companyGroup").with(group_id)
}

/// Every company group.
pub async fn list(client: &ApiClient) -> Result<Page<CompanyGroup>, RequestError> {
    client.page(ApiRequest::get("/company-groups")).await
}

/// Fetch one group.
pub async fn get(client: &ApiClient, group_id: Uuid) -> Result<CompanyGroup, RequestError> {
    client
        .json(ApiRequest::get(format!("/company-groups/{group_id}")))
        .await
}

/// Create a group.
pub async fn create(
    client: &ApiClient,
    input: &CompanyGroupInput,
) -> Result<CompanyGroup, RequestError> {
    client
        .json(ApiRequest::post("/company-groups").json(input)?)
        .await
}

/// Patch a group.
pub async fn update(
    client: &ApiClient,
    group_id: Uuid,
    input: &CompanyGroupInput,
) -> Result<CompanyGroup, RequestError> {
    client
        .json(ApiRequest::patch(format!("/company-groups/{group_id}")).json(input)?)
        .await
}

/// Delete a group.
pub async fn delete(client: &ApiClient, group_id: Uuid) -> Result<(), RequestError> {
    client
        .send(ApiRequest::delete(format!("/company-groups/{group_id}")))
        .await
}

/// Upload a logo as multipart field `logo`.
pub async fn upload_logo(
    client: &ApiClient,
    group_id: Uuid,
    logo: Upload,
) -> Result<UploadedFile, RequestError> {
    client
        .json(
            ApiRequest::post(format!("/company-groups/{group_id}/logos"))
                .multipart(vec![logo.into_field("logo")]),
        )
        .await
}

/// Shared state of the group save-with-logo saga.
pub struct GroupSubmit {
    client: Rc<ApiClient>,
    input: CompanyGroupInput,
    logo: Option<Upload>,
    group_id: Option<Uuid>,
    created: bool,
}

impl GroupSubmit {
    /// Create (`group_id = None`) or update a group, then upload `logo`.
    #[must_use]
    pub const fn new(
        client: Rc<ApiClient>,
        group_id: Option<Uuid>,
        input: CompanyGroupInput,
        logo: Option<Upload>,
    ) -> Self {
        Self {
            client,
            input,
            logo,
            group_id,
            created: false,
        }
    }

    /// Id of the saved group, once known.
    #[must_use]
    pub const fn group_id(&self) -> Option<Uuid> {
        self.group_id
    }
}

struct SaveGroup;

#[async_trait(?Send)]
impl SagaStep<GroupSubmit> for SaveGroup {
    fn name(&self) -> &'static str {
        "save group"
    }

    async fn run(&self, ctx: &mut GroupSubmit) -> Result<(), ApiError> {
        let saved = if let Some(group_id) = ctx.group_id {
            update(&ctx.client, group_id, &ctx.input).await?
        } else {
            let group = create(&ctx.client, &ctx.input).await?;
            ctx.created = true;
            group
        };
        ctx.group_id = Some(saved.id);
        Ok(())
    }

    async fn compensate(&self, ctx: &mut GroupSubmit) -> Result<(), ApiError> {
        if let (true, Some(group_id)) = (ctx.created, ctx.group_id) {
            delete(&ctx.client, group_id).await?;
            ctx.group_id = None;
            ctx.created = false;
        }
        Ok(())
    }
}

struct UploadGroupLogo;

#[async_trait(?Send)]
impl SagaStep<GroupSubmit> for UploadGroupLogo {
    fn name(&self) -> &'static str {
        "upload logo"
    }

    async fn run(&self, ctx: &mut GroupSubmit) -> Result<(), ApiError> {
        if let (Some(group_id), Some(logo)) = (ctx.group_id, ctx.logo.clone()) {
            upload_logo(&ctx.client, group_id, logo).await?;
        }
        Ok(())
    }
}

/// Save a group, then upload its logo.
#[must_use]
pub fn submit_saga() -> Saga<GroupSubmit> {
    Saga::new("company group submit")
        .step(SaveGroup)
        .step(UploadGroupLogo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::Method;
    use crate::core::testing::Harness;
    use serde_json::json;

    fn input() -> CompanyGroupInput {
        CompanyGroupInput {
            name: "Balkan Motors".into(),
            country: "Serbia".into(),
            contact_email: "hq@balkan.example".into(),
            ..CompanyGroupInput::default()
        }
    }

    #[tokio::test]
    async fn update_without_logo_is_a_single_patch() {
        let harness = Harness::with_token("t");
        let group_id = Uuid::new_v4();
        harness
            .transport
            .respond_json(200, &json!({"id": group_id, "name": "Balkan Motors"}));
        let mut ctx = GroupSubmit::new(Rc::clone(&harness.clients.api), Some(group_id), input(), None);
        submit_saga().execute(&mut ctx).await.expect("saved");
        let sent = harness.transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Patch);
        assert_eq!(sent[0].url, format!("http://api.test/company-groups/{group_id}"));
    }

    #[tokio::test]
    async fn failed_upload_after_create_deletes_the_group() {
        let harness = Harness::with_token("t");
        let group_id = Uuid::new_v4();
        harness
            .transport
            .respond_json(201, &json!({"id": group_id, "name": "Balkan Motors"}));
        harness.transport.fail("connection reset");
        harness.transport.respond_json(200, &json!({}));
        let logo = Upload {
            file_name: "g.png".into(),
            mime: "image/png".into(),
            bytes: vec![0],
        };
        let mut ctx = GroupSubmit::new(Rc::clone(&harness.clients.api), None, input(), Some(logo));
        let err = submit_saga().execute(&mut ctx).await.expect_err("upload fails");
        assert_eq!(err.source.status, None);
        assert_eq!(ctx.group_id(), None);
        let sent = harness.transport.requests();
        assert_eq!(sent[2].method, Method::Delete);
        assert_eq!(sent[2].url, format!("http://api.test/company-groups/{group_id}"));
    }
}
