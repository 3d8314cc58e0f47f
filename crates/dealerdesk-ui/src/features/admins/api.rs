//! User REST calls for admin management.

use dealerdesk_api_models::{Page, User, UserInput};
use uuid::Uuid;

use crate::core::client::ApiClient;
use crate::core::errors::RequestError;
use crate::core::http::ApiRequest;
use crate::features::admins::state::{AdminScope, PAGE_SIZE};

/// One page of admins in `scope`.
pub async fn list(client: &ApiClient, scope: AdminScope, page: u32) -> Result<Page<User>, RequestError> {
    let (company_id, group_id) = scope.ids();
    let request = ApiRequest::get("/users")
        .query_opt("companyId", company_id)
        .query_opt("companyGroupId", group_id)
        .query("role", scope.role().as_str())
        .query("page", page)
        .query("limit", PAGE_SIZE);
    client.page(request).await
}

/// Create a user.
pub async fn create(client: &ApiClient, input: &UserInput) -> Result<User, RequestError> {
    client.json(ApiRequest::post("/users").json(input)?).await
}

/// Patch a user.
pub async fn update(client: &ApiClient, user_id: Uuid, input: &UserInput) -> Result<User, RequestError> {
    client
        .json(ApiRequest::patch(format!("/users/{user_id}")).json(input)?)
        .await
}

/// Delete a user.
pub async fn delete(client: &ApiClient, user_id: Uuid) -> Result<(), RequestError> {
    client
        .send(ApiRequest::delete(format!("/users/{user_id}")))
        .await
}
