#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(
    missing_docs,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]
//! Shared HTTP DTOs for the DealerDesk admin API.
//!
//! Records are passed through unchanged between the REST API and the views;
//! the client applies no invariants of its own. Decoding is lenient: unknown
//! fields are ignored and optional fields default to `None` so that backend
//! additions never break the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Role attached to an authenticated dashboard user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator with access to every tenant.
    Root,
    /// Administrator of a company group.
    GroupAdmin,
    /// Administrator of a single company.
    Admin,
}

impl Role {
    /// Wire representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::GroupAdmin => "group_admin",
            Self::Admin => "admin",
        }
    }
}

/// Credentials posted to `/auth/login`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Account email address.
    pub email: String,
    /// Plain-text password (sent over TLS only).
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub access_token: String,
}

/// Dashboard user (also used for company and group administrators).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Stable identifier.
    pub id: Uuid,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Login email.
    pub email: String,
    /// Authorization role.
    pub role: Role,
    /// Company the user administers, for `admin` users.
    #[serde(default)]
    pub company: Option<UserCompany>,
    /// Group the user administers, for `group_admin` users.
    #[serde(default)]
    pub company_group: Option<EntityRef>,
}

/// Reference to another record by id (`{"id": ...}`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityRef {
    /// Referenced record.
    pub id: Uuid,
}

/// Company embedded in an `admin` user's profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserCompany {
    /// Company identifier.
    pub id: Uuid,
    /// Features enabled for the company.
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl User {
    /// Id of the administered company.
    #[must_use]
    pub fn company_id(&self) -> Option<Uuid> {
        self.company.as_ref().map(|company| company.id)
    }

    /// Id of the administered group.
    #[must_use]
    pub fn company_group_id(&self) -> Option<Uuid> {
        self.company_group.map(|group| group.id)
    }

    /// Whether the user's company has the feature called `name`.
    #[must_use]
    pub fn has_feature(&self, name: &str) -> bool {
        self.company
            .as_ref()
            .is_some_and(|company| company.features.iter().any(|feature| feature.name == name))
    }

    /// Display name composed from first and last name, falling back to email.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

/// Create/update payload for users.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserInput {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email.
    pub email: String,
    /// New password; omitted on edits that keep the current one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Role to assign.
    pub role: Role,
    /// Owning company for `admin` users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<EntityRef>,
    /// Owning group for `group_admin` users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_group: Option<EntityRef>,
}

/// Dealership tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Company {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone in international format.
    #[serde(default)]
    pub phone: Option<String>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Country.
    #[serde(default)]
    pub country: Option<String>,
    /// Postal code.
    #[serde(default)]
    pub postal_code: Option<String>,
    /// Public website.
    #[serde(default)]
    pub website: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Owning company group.
    #[serde(default)]
    pub company_group_id: Option<Uuid>,
    /// Uploaded logo location.
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Assistant shown by default in the integration snippet.
    #[serde(default)]
    pub default_assistant_id: Option<Uuid>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Create/update payload for companies.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CompanyInput {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Public website.
    pub website: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Owning company group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_group_id: Option<Uuid>,
}

/// Group of dealerships managed together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanyGroup {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Country.
    #[serde(default)]
    pub country: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// Postal code.
    #[serde(default, alias = "postalCode")]
    pub postal_code: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub contact_email: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub contact_phone: Option<String>,
    /// Uploaded logo location.
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Create/update payload for company groups.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CompanyGroupInput {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Country.
    pub country: String,
    /// City.
    pub city: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Postal code.
    #[serde(rename = "postalCode")]
    pub postal_code: Option<String>,
    /// Contact email.
    pub contact_email: String,
    /// Contact phone.
    pub contact_phone: Option<String>,
}

/// Reference to a data collection embedded in an assistant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataCollectionRef {
    /// Collection identifier.
    pub id: Uuid,
    /// Collection name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Virtual assistant configured for a company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assistant {
    /// Stable identifier.
    pub id: Uuid,
    /// Owning company.
    #[serde(default)]
    pub company_id: Option<Uuid>,
    /// Display name.
    pub name: String,
    /// Personality preset key.
    #[serde(default)]
    pub personality: Option<String>,
    /// ISO language codes the assistant answers in.
    #[serde(default)]
    pub supported_languages: Vec<String>,
    /// Virtual office the assistant is placed in.
    #[serde(default)]
    pub virtual_office_id: Option<Uuid>,
    /// Knowledge base attached to the assistant.
    #[serde(default)]
    pub data_collection: Option<DataCollectionRef>,
    /// Per-user message cap.
    #[serde(default)]
    pub user_message_limit: Option<u32>,
    /// Subscription the assistant consumes.
    #[serde(default)]
    pub subscription_id: Option<Uuid>,
    /// Whether text-to-speech is enabled.
    #[serde(default)]
    pub use_tts: bool,
    /// Uploaded icon location.
    #[serde(default)]
    pub icon_url: Option<String>,
    /// Voices attached to the assistant.
    #[serde(default)]
    pub voices: Vec<Voice>,
}

/// Create/update payload for assistants.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AssistantInput {
    /// Display name.
    pub name: String,
    /// Personality preset key.
    pub personality: Option<String>,
    /// ISO language codes.
    pub supported_languages: Vec<String>,
    /// Virtual office placement.
    pub virtual_office_id: Option<Uuid>,
    /// Per-user message cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_message_limit: Option<u32>,
    /// Subscription the assistant consumes.
    pub subscription_id: Option<Uuid>,
    /// Whether text-to-speech is enabled.
    pub use_tts: bool,
}

/// Body used to attach a voice to an assistant.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachVoiceRequest {
    /// Voice to attach.
    pub voice_id: Uuid,
}

/// Body used to attach a data collection to an assistant.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AttachDataCollectionRequest {
    /// Collection to attach.
    pub data_collection_id: Uuid,
}

/// Voice gender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male voice.
    Male,
    /// Female voice.
    Female,
}

impl Gender {
    /// Wire and select-control value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

/// Text-to-speech voice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Voice {
    /// Stable identifier.
    pub id: Uuid,
    /// Provider voice name.
    pub name: String,
    /// Friendly name shown in pickers.
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
    /// ISO language code.
    #[serde(default)]
    pub language: String,
    /// Voice gender.
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Pitch adjustment in semitones.
    #[serde(default)]
    pub pitch: f64,
    /// Speaking rate multiplier.
    #[serde(default = "default_speaking_rate")]
    pub speaking_rate: f64,
    /// Upstream TTS provider.
    #[serde(default)]
    pub provider: Option<String>,
}

const fn default_speaking_rate() -> f64 {
    1.0
}

impl Voice {
    /// Label used in pickers, e.g. `Emma [EN • Female]`.
    #[must_use]
    pub fn picker_label(&self) -> String {
        let name = self.display_name.as_deref().unwrap_or(&self.name);
        let gender = match self.gender {
            Some(Gender::Male) => "Male",
            Some(Gender::Female) => "Female",
            None => "Unknown",
        };
        format!("{name} [{} • {gender}]", self.language.to_uppercase())
    }
}

/// Create/update payload for voices.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VoiceInput {
    /// Provider voice name.
    pub name: String,
    /// ISO language code.
    pub language: String,
    /// Voice gender.
    pub gender: Gender,
    /// Pitch adjustment.
    pub pitch: f64,
    /// Speaking rate multiplier.
    pub speaking_rate: f64,
    /// Upstream TTS provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Virtual showroom configuration attached to a company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VirtualOffice {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Office template type.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Template-specific configuration.
    #[serde(default)]
    pub configuration: Option<Value>,
    /// Uploaded background image.
    #[serde(default)]
    pub background_url: Option<String>,
    /// Uploaded avatar image.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Whether the backend is still rendering office assets.
    #[serde(default)]
    pub file_generation_in_progress: bool,
}

/// Create/update payload for virtual offices.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VirtualOfficeInput {
    /// Display name.
    pub name: String,
    /// Office template type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Template-specific configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Value>,
}

/// Knowledge base of structured entries owned by a company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataCollection {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether the collection is live for assistants.
    #[serde(default)]
    pub published: bool,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Create/update payload for data collections.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DataCollectionInput {
    /// Display name.
    pub name: String,
    /// Free-form tags.
    pub tags: Vec<String>,
}

/// One row of a data collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataCollectionEntry {
    /// Stable identifier.
    pub id: Uuid,
    /// Arbitrary JSON payload.
    #[serde(default)]
    pub data: Value,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `GET .../entries`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DataCollectionEntries {
    /// Rows of the collection.
    #[serde(default)]
    pub entries: Vec<DataCollectionEntry>,
}

/// Header pair forwarded by an API import.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportHeader {
    /// Header name.
    pub key: String,
    /// Header value.
    pub value: String,
}

/// Import that pulls rows from a remote HTTP endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiImportRequest {
    /// Always `"api"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Remote endpoint.
    pub url: String,
    /// HTTP method used against the remote endpoint.
    pub method: String,
    /// Headers collapsed into a single object, wrapped in a list.
    pub headers: Vec<serde_json::Map<String, Value>>,
    /// Property of the remote payload that holds the rows.
    pub payload_property: String,
}

/// Per-company billing mode for a feature.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BillingType {
    /// Paid up front from a prepaid balance.
    Prepaid,
    /// Billed after use.
    Postpaid,
}

impl BillingType {
    /// Wire and select-control value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prepaid => "prepaid",
            Self::Postpaid => "postpaid",
        }
    }
}

/// Billable platform feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feature {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Create/update payload for features.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct FeatureInput {
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Price a company pays for a feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyFeature {
    /// Feature identifier.
    pub feature_id: Uuid,
    /// Embedded feature, when expanded by the API.
    #[serde(default)]
    pub feature: Option<Feature>,
    /// Unit price.
    pub price: f64,
    /// Billing mode.
    pub billing_type: BillingType,
    /// Prepaid balance, for prepaid billing.
    #[serde(default)]
    pub prepaid_amount: Option<f64>,
}

/// Payload for `PATCH /companies/{id}/features`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompanyFeatureInput {
    /// Feature identifier.
    pub feature_id: Uuid,
    /// Unit price.
    pub price: f64,
    /// Billing mode.
    pub billing_type: BillingType,
    /// Prepaid balance, for prepaid billing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepaid_amount: Option<f64>,
}

/// Conversation bundle sold to companies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Package {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Package price.
    #[serde(default)]
    pub price: f64,
    /// Number of conversations included.
    #[serde(default)]
    pub conversations_limit: u32,
}

/// Create/update payload for packages.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PackageInput {
    /// Display name.
    pub name: String,
    /// Package price.
    pub price: f64,
    /// Number of conversations included.
    pub conversations_limit: u32,
}

/// Subscription tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    /// Entry tier.
    Basic,
    /// Premium tier.
    Premium,
}

impl SubscriptionType {
    /// Wire and select-control value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Premium => "premium",
        }
    }
}

/// Company subscription to a package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    /// Stable identifier.
    pub id: Uuid,
    /// Subscribed company.
    #[serde(default)]
    pub company_id: Option<Uuid>,
    /// Package reference.
    pub package_id: Uuid,
    /// Embedded package, when expanded by the API.
    #[serde(default)]
    pub package: Option<Package>,
    /// Start of the billing period.
    pub start_date: DateTime<Utc>,
    /// End of the billing period.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    /// Tier.
    #[serde(rename = "type")]
    pub kind: SubscriptionType,
    /// Lifecycle status reported by the backend (e.g. `active`).
    #[serde(default)]
    pub status: String,
    /// Conversations consumed so far.
    #[serde(default)]
    pub conversations_count: u32,
}

impl Subscription {
    /// Whether the backend reports this subscription as active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }
}

/// Create/update payload for subscriptions.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SubscriptionInput {
    /// Subscribed company.
    pub company_id: Uuid,
    /// Package reference.
    pub package_id: Uuid,
    /// Start of the billing period.
    pub start_date: DateTime<Utc>,
    /// End of the billing period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// Tier.
    #[serde(rename = "type")]
    pub kind: SubscriptionType,
}

/// Audit record emitted by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventLog {
    /// Stable identifier.
    pub id: Uuid,
    /// Event type (e.g. `ENTITY_CREATE`).
    #[serde(default)]
    pub event_type: String,
    /// Entity type the event refers to (e.g. `Company`).
    #[serde(default)]
    pub entity_type: Option<String>,
    /// Acting user.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// HTTP status for request/response events.
    #[serde(default)]
    pub status: Option<u16>,
    /// Event payload.
    #[serde(default)]
    pub data: Value,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Pagination metadata returned alongside list pages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PageMeta {
    /// Total number of records.
    #[serde(default)]
    pub total: u64,
    /// One-based page number.
    #[serde(default)]
    pub page: u32,
    /// Page size.
    #[serde(default)]
    pub limit: u32,
}

impl PageMeta {
    /// Number of pages implied by `total` and `limit` (at least one).
    #[must_use]
    pub fn page_count(&self) -> u64 {
        if self.limit == 0 {
            return 1;
        }
        let limit = u64::from(self.limit);
        self.total.div_ceil(limit).max(1)
    }
}

/// List envelope (`{"data": [...], "meta": {...}}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    /// Records on this page.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Pagination details, when the endpoint paginates.
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            meta: None,
        }
    }
}

/// List response body: either a bare array or a [`Page`] envelope.
///
/// Some endpoints (voices, features) answer with plain arrays while the rest
/// wrap records in `{"data": [...]}`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Listing<T> {
    /// Bare JSON array.
    Items(Vec<T>),
    /// Enveloped page.
    Page(Page<T>),
}

impl<T> From<Listing<T>> for Page<T> {
    fn from(value: Listing<T>) -> Self {
        match value {
            Listing::Items(data) => Self { data, meta: None },
            Listing::Page(page) => page,
        }
    }
}

/// Response payload of file uploads (logos, icons, backgrounds, avatars).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedFile {
    /// Public URL of the stored file.
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_decodes_role_and_display_name() {
        let user: User = serde_json::from_value(json!({
            "id": "7d7f3a39-4b8e-4c55-9a52-3a3c7e1fd2a1",
            "first_name": "Ana",
            "last_name": "Petrovic",
            "email": "ana@example.com",
            "role": "group_admin",
            "unexpected": true
        }))
        .expect("user decodes");
        assert_eq!(user.role, Role::GroupAdmin);
        assert_eq!(user.display_name(), "Ana Petrovic");
        assert_eq!(user.company_id(), None);
    }

    #[test]
    fn admin_profile_carries_company_and_features() {
        let user: User = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "email": "admin@dealer.example",
            "role": "admin",
            "company": {"id": "0d5e8f3c-7c1a-4f57-9d0e-5f8c2b1a9e11", "features": [{"id": Uuid::nil(), "name": "Avatars"}]},
            "company_group": null
        }))
        .expect("user decodes");
        assert_eq!(
            user.company_id().map(|id| id.to_string()).as_deref(),
            Some("0d5e8f3c-7c1a-4f57-9d0e-5f8c2b1a9e11")
        );
        assert!(user.has_feature("Avatars"));
        assert!(!user.has_feature("SMS"));
        assert_eq!(user.company_group_id(), None);
    }

    #[test]
    fn user_input_nests_owner_references() {
        let input = UserInput {
            first_name: "Ana".into(),
            last_name: "Petrovic".into(),
            email: "ana@example.com".into(),
            password: None,
            role: Role::GroupAdmin,
            company: None,
            company_group: Some(EntityRef { id: Uuid::nil() }),
        };
        let value = serde_json::to_value(&input).expect("encodes");
        assert_eq!(value["company_group"]["id"], Uuid::nil().to_string());
        assert_eq!(value["role"], "group_admin");
        assert!(value.get("company").is_none());
        assert!(value.get("password").is_none());
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let user = User {
            id: Uuid::nil(),
            first_name: " ".into(),
            last_name: String::new(),
            email: "ops@example.com".into(),
            role: Role::Root,
            company: None,
            company_group: None,
        };
        assert_eq!(user.display_name(), "ops@example.com");
    }

    #[test]
    fn voice_label_uses_display_name_and_gender() {
        let voice: Voice = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "name": "en-US-Neural2-F",
            "displayName": "Emma",
            "language": "en",
            "gender": "female"
        }))
        .expect("voice decodes");
        assert_eq!(voice.picker_label(), "Emma [EN • Female]");
        assert!((voice.speaking_rate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn page_envelope_tolerates_missing_meta() {
        let page: Page<Feature> = serde_json::from_value(json!({
            "data": [{"id": Uuid::nil(), "name": "SMS"}]
        }))
        .expect("page decodes");
        assert_eq!(page.data.len(), 1);
        assert!(page.meta.is_none());

        let meta = PageMeta {
            total: 41,
            page: 1,
            limit: 20,
        };
        assert_eq!(meta.page_count(), 3);
        assert_eq!(PageMeta::default().page_count(), 1);
    }

    #[test]
    fn listing_accepts_bare_arrays_and_envelopes() {
        let bare: Listing<Feature> =
            serde_json::from_value(json!([{"id": Uuid::nil(), "name": "SMS"}])).expect("bare");
        let page: Page<Feature> = bare.into();
        assert_eq!(page.data.len(), 1);

        let wrapped: Listing<Feature> = serde_json::from_value(json!({
            "data": [],
            "meta": {"total": 0, "page": 1, "limit": 10}
        }))
        .expect("wrapped");
        let page: Page<Feature> = wrapped.into();
        assert!(page.data.is_empty());
        assert_eq!(page.meta.map(|meta| meta.limit), Some(10));
    }

    #[test]
    fn subscription_input_uses_wire_names() {
        let input = SubscriptionInput {
            company_id: Uuid::nil(),
            package_id: Uuid::nil(),
            start_date: DateTime::<Utc>::UNIX_EPOCH,
            end_date: None,
            kind: SubscriptionType::Premium,
        };
        let value = serde_json::to_value(&input).expect("encodes");
        assert_eq!(value["type"], "premium");
        assert!(value.get("end_date").is_none());
    }

    #[test]
    fn group_input_renames_postal_code() {
        let input = CompanyGroupInput {
            name: "North".into(),
            country: "RS".into(),
            contact_email: "north@example.com".into(),
            postal_code: Some("11000".into()),
            ..CompanyGroupInput::default()
        };
        let value = serde_json::to_value(&input).expect("encodes");
        assert_eq!(value["postalCode"], "11000");
    }
}
