//! Company REST calls, cache keys, and the save-with-logo flow.
//!
//! # Design
//! - Calls take the shared [`ApiClient`] so auth and error handling stay in one pipeline.
//! - Saving a company and uploading its logo run as one saga; a failed upload
//!   after a create deletes the new company again.

use std::rc::Rc;

use async_trait::async_trait;
use dealerdesk_api_models::{Company, CompanyInput, Page, UploadedFile};
use uuid::Uuid;

use crate::core::cache::QueryKey;
use crate::core::client::ApiClient;
use crate::core::errors::{ApiError, RequestError};
use crate::core::http::{ApiRequest, Upload};
use crate::core::saga::{Saga, SagaStep};
use crate::features::companies::state::CompanyQuery;

/// Prefix of every company list key.
#[must_use]
pub fn companies_key() -> QueryKey {
    QueryKey::new("companies")
}

/// Key of a single company.
#[must_use]
pub fn company_key(company_id: Uuid) -> QueryKey {
    QueryKey::new("company").with(company_id)
}

/// List companies, scoped to a group when the query names one.
pub async fn list(client: &ApiClient, query: &CompanyQuery) -> Result<Page<Company>, RequestError> {
    let path = query.group_id.map_or_else(
        || "/companies".to_string(),
        |group_id| format!("/company-groups/{group_id}/companies"),
    );
    let request = query
        .params()
        .into_iter()
        .fold(ApiRequest::get(path), |request, (name, value)| {
            request.query(name, value)
        });
    client.page(request).await
}

/// Fetch one company.
pub async fn get(client: &ApiClient, company_id: Uuid) -> Result<Company, RequestError> {
    client
        .json(ApiRequest::get(format!("/companies/{company_id}")))
        .await
}

/// Create a company.
pub async fn create(client: &ApiClient, input: &CompanyInput) -> Result<Company, RequestError> {
    client
        .json(ApiRequest::post("/companies").json(input)?)
        .await
}

/// Patch a company.
pub async fn update(
    client: &ApiClient,
    company_id: Uuid,
    input: &CompanyInput,
) -> Result<Company, RequestError> {
    client
        .json(ApiRequest::patch(format!("/companies/{company_id}")).json(input)?)
        .await
}

/// Delete a company.
pub async fn delete(client: &ApiClient, company_id: Uuid) -> Result<(), RequestError> {
    client
        .send(ApiRequest::delete(format!("/companies/{company_id}")))
        .await
}

/// Upload a logo as multipart field `logo`.
pub async fn upload_logo(
    client: &ApiClient,
    company_id: Uuid,
    logo: Upload,
) -> Result<UploadedFile, RequestError> {
    client
        .json(
            ApiRequest::post(format!("/companies/{company_id}/logos"))
                .multipart(vec![logo.into_field("logo")]),
        )
        .await
}

/// Shared state of the save-with-logo saga.
pub struct CompanySubmit {
    client: Rc<ApiClient>,
    input: CompanyInput,
    logo: Option<Upload>,
    company_id: Option<Uuid>,
    created: bool,
}

impl CompanySubmit {
    /// Create (`company_id = None`) or update a company, then upload `logo`.
    #[must_use]
    pub const fn new(
        client: Rc<ApiClient>,
        company_id: Option<Uuid>,
        input: CompanyInput,
        logo: Option<Upload>,
    ) -> Self {
        Self {
            client,
            input,
            logo,
            company_id,
            created: false,
        }
    }

    /// Id of the saved company, once known.
    #[must_use]
    pub const fn company_id(&self) -> Option<Uuid> {
        self.company_id
    }
}

struct SaveCompany;

#[async_trait(?Send)]
impl SagaStep<CompanySubmit> for SaveCompany {
    fn name(&self) -> &'static str {
        "save company"
    }

    async fn run(&self, ctx: &mut CompanySubmit) -> Result<(), ApiError> {
        let saved = match ctx.company_id {
            Some(company_id) => update(&ctx.client, company_id, &ctx.input).await?,
            None => {
                let company = create(&ctx.client, &ctx.input).await?;
                ctx.created = true;
                company
            }
        };
        ctx.company_id = Some(saved.id);
        Ok(())
    }

    async fn compensate(&self, ctx: &mut CompanySubmit) -> Result<(), ApiError> {
        if let (true, Some(company_id)) = (ctx.created, ctx.company_id) {
            delete(&ctx.client, company_id).await?;
            ctx.company_id = None;
            ctx.created = false;
        }
        Ok(())
    }
}

struct UploadLogo;

#[async_trait(?Send)]
impl SagaStep<CompanySubmit> for UploadLogo {
    fn name(&self) -> &'static str {
        "upload logo"
    }

    async fn run(&self, ctx: &mut CompanySubmit) -> Result<(), ApiError> {
        if let (Some(company_id), Some(logo)) = (ctx.company_id, ctx.logo.clone()) {
            upload_logo(&ctx.client, company_id, logo).await?;
        }
        Ok(())
    }
}

/// Save a company, then upload its logo.
#[must_use]
pub fn submit_saga() -> Saga<CompanySubmit> {
    Saga::new("company submit").step(SaveCompany).step(UploadLogo)
}
