//! Routing table and the role guard.

use dealerdesk_api_models::Role;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::use_store_value;

use crate::core::access::{Access, Section, check_access};
use crate::core::store::AuthStore;

#[derive(Clone, Routable, PartialEq, Eq, Debug)]
pub(crate) enum Route {
    #[at("/")]
    Home,
    #[at("/login")]
    Login,
    #[at("/company-groups")]
    CompanyGroups,
    #[at("/company-groups/:id")]
    CompanyGroupDetails { id: String },
    #[at("/companies")]
    Companies,
    #[at("/companies/:id")]
    CompanyDetails { id: String },
    #[at("/companies/:company_id/assistants/:assistant_id")]
    AssistantDetails {
        company_id: String,
        assistant_id: String,
    },
    #[at("/companies/:company_id/data-collections/:collection_id/entries")]
    DataCollectionEntries {
        company_id: String,
        collection_id: String,
    },
    #[at("/assistants")]
    Assistants,
    #[at("/voices")]
    Voices,
    #[at("/packages")]
    Packages,
    #[at("/features")]
    Features,
    #[at("/event-logs")]
    EventLogs,
    #[at("/settings")]
    Settings,
    #[not_found]
    #[at("/404")]
    NotFound,
}

impl Route {
    /// Gated section rendered by the route; `None` for redirects.
    pub(crate) fn section(&self) -> Option<Section> {
        Some(match self {
            Self::Home | Self::NotFound => return None,
            Self::Login => Section::Login,
            Self::CompanyGroups => Section::CompanyGroups,
            Self::CompanyGroupDetails { .. } => Section::CompanyGroupDetails,
            Self::Companies => Section::Companies,
            Self::CompanyDetails { .. } => Section::CompanyDetails,
            Self::AssistantDetails { .. } => Section::AssistantDetails,
            Self::DataCollectionEntries { .. } => Section::DataCollectionEntries,
            Self::Assistants => Section::Assistants,
            Self::Voices => Section::Voices,
            Self::Packages => Section::Packages,
            Self::Features => Section::Features,
            Self::EventLogs => Section::EventLogs,
            Self::Settings => Section::Settings,
        })
    }

    /// Route for a landing path.
    pub(crate) fn from_landing(role: Role) -> Self {
        match role {
            Role::Root => Self::CompanyGroups,
            Role::GroupAdmin => Self::Companies,
            Role::Admin => Self::Assistants,
        }
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct GuardProps {
    pub section: Section,
    pub children: Children,
}

/// Render children only when the signed-in role may open `section`.
#[function_component(Guard)]
pub(crate) fn guard(props: &GuardProps) -> Html {
    let auth = use_store_value::<AuthStore>();
    match check_access(props.section, auth.role(), auth.is_auth_checked()) {
        Access::Pending => html! {
            <div class="page-loading"><span class="loading loading-spinner"></span></div>
        },
        Access::Granted => html! { <>{for props.children.iter()}</> },
        Access::RedirectToLogin => html! { <Redirect<Route> to={Route::Login} /> },
        Access::RedirectTo(_) => match auth.role() {
            Some(role) => html! { <Redirect<Route> to={Route::from_landing(role)} /> },
            None => html! { <Redirect<Route> to={Route::Login} /> },
        },
    }
}
