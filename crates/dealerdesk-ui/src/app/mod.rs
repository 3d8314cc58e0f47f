//! Application root: boot wiring, context, routing, and the snackbar host.

use std::rc::Rc;

use uuid::Uuid;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::{Dispatch, use_store_value};

use crate::components::layout::DashboardLayout;
use crate::components::snackbar::SnackbarHost;
use crate::core::client::{ApiClients, ClientHooks};
use crate::core::config::{ApiConfig, ConfigError, log_level};
use crate::core::logging::init_logging;
use crate::core::notify::Notifier;
use crate::core::session::restore;
use crate::core::store::AuthStore;
use crate::core::tokens::TokenStore;
use crate::features::assistants::view::{AssistantDetailsPage, AssistantsPage};
use crate::features::auth::view::LoginPage;
use crate::features::companies::view::{CompaniesPage, CompanyDetailsPage};
use crate::features::company_groups::view::{CompanyGroupDetailsPage, CompanyGroupsPage};
use crate::features::data_collections::view::DataCollectionEntriesPage;
use crate::features::event_logs::view::EventLogsPage;
use crate::features::packages::view::PackagesPage;
use crate::features::product_features::view::FeaturesPage;
use crate::features::settings::view::SettingsPage;
use crate::features::voices::view::VoicesPage;
use crate::services::browser::{BrowserSession, ConsoleSink, snackbar_notifier};
use crate::services::storage::BrowserTokenStore;
use crate::services::transport::GlooTransport;
use api::ApiCtx;
use routes::Guard;
pub(crate) use routes::Route;

pub(crate) mod api;
pub(crate) mod hooks;
mod routes;

fn build_context() -> Result<ApiCtx, ConfigError> {
    let config = ApiConfig::from_build_env()?;
    let tokens: Rc<dyn TokenStore> = Rc::new(BrowserTokenStore);
    let notifier: Rc<dyn Notifier> = Rc::new(snackbar_notifier());
    let hooks = ClientHooks {
        tokens: Rc::clone(&tokens),
        session: Rc::new(BrowserSession),
        notifier: Rc::clone(&notifier),
    };
    let clients = ApiClients::new(&config, Rc::new(GlooTransport), hooks);
    tracing::info!(api = %config.api_url, auth = %config.auth_api_url, "api clients ready");
    Ok(ApiCtx {
        clients,
        tokens,
        notifier,
    })
}

#[function_component(DealerDeskApp)]
fn dealer_desk_app() -> Html {
    let context = use_memo(|_| build_context(), ());

    {
        let context = Rc::clone(&context);
        use_effect_with_deps(
            move |_| {
                let dispatch = Dispatch::<AuthStore>::new();
                match &*context {
                    Ok(api_ctx) => {
                        let api_ctx = api_ctx.clone();
                        yew::platform::spawn_local(async move {
                            let outcome = restore(&api_ctx.clients, api_ctx.tokens.as_ref()).await;
                            dispatch.reduce_mut(|store| outcome.apply(store));
                        });
                    }
                    Err(_) => dispatch.reduce_mut(AuthStore::signed_out),
                }
                || ()
            },
            (),
        );
    }

    match &*context {
        Ok(api_ctx) => html! {
            <ContextProvider<ApiCtx> context={api_ctx.clone()}>
                <BrowserRouter>
                    <Switch<Route> render={switch} />
                </BrowserRouter>
                <SnackbarHost />
            </ContextProvider<ApiCtx>>
        },
        Err(err) => html! {
            <div class="page config-error">
                <div class="panel">
                    <h2>{"Configuration error"}</h2>
                    <p class="muted">{err.to_string()}</p>
                </div>
            </div>
        },
    }
}

fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

fn switch(route: Route) -> Html {
    let Some(section) = route.section() else {
        return match route {
            Route::Home => html! { <HomeRedirect /> },
            _ => html! { <NotFound /> },
        };
    };
    let page = match route {
        Route::Login => return html! { <Guard {section}><LoginPage /></Guard> },
        Route::CompanyGroups => html! { <CompanyGroupsPage /> },
        Route::CompanyGroupDetails { id } => match parse_id(&id) {
            Some(group_id) => html! { <CompanyGroupDetailsPage {group_id} /> },
            None => html! { <NotFound /> },
        },
        Route::Companies => html! { <CompaniesPage /> },
        Route::CompanyDetails { id } => match parse_id(&id) {
            Some(company_id) => html! { <CompanyDetailsPage {company_id} /> },
            None => html! { <NotFound /> },
        },
        Route::AssistantDetails {
            company_id,
            assistant_id,
        } => match (parse_id(&company_id), parse_id(&assistant_id)) {
            (Some(company_id), Some(assistant_id)) => {
                html! { <AssistantDetailsPage {company_id} {assistant_id} /> }
            }
            _ => html! { <NotFound /> },
        },
        Route::DataCollectionEntries {
            company_id,
            collection_id,
        } => match (parse_id(&company_id), parse_id(&collection_id)) {
            (Some(company_id), Some(collection_id)) => {
                html! { <DataCollectionEntriesPage {company_id} {collection_id} /> }
            }
            _ => html! { <NotFound /> },
        },
        Route::Assistants => html! { <AssistantsPage /> },
        Route::Voices => html! { <VoicesPage /> },
        Route::Packages => html! { <PackagesPage /> },
        Route::Features => html! { <FeaturesPage /> },
        Route::EventLogs => html! { <EventLogsPage /> },
        Route::Settings => html! { <SettingsPage /> },
        Route::Home | Route::NotFound => html! { <NotFound /> },
    };
    html! {
        <Guard {section}>
            <DashboardLayout>{page}</DashboardLayout>
        </Guard>
    }
}

/// `/`: the role's landing page once the session check finishes.
#[function_component(HomeRedirect)]
fn home_redirect() -> Html {
    let auth = use_store_value::<AuthStore>();
    match auth.role() {
        Some(role) => html! { <Redirect<Route> to={Route::from_landing(role)} /> },
        None if auth.is_auth_checked() => html! { <Redirect<Route> to={Route::Login} /> },
        None => html! {
            <div class="page-loading"><span class="loading loading-spinner"></span></div>
        },
    }
}

#[function_component(NotFound)]
fn not_found() -> Html {
    html! {
        <div class="placeholder">
            <h2>{"Page not found"}</h2>
            <p class="muted">{"Use the navigation to return to a supported view."}</p>
            <Link<Route> to={Route::Home} classes={classes!("btn", "btn-primary", "btn-sm")}>{"Go home"}</Link<Route>>
        </div>
    }
}

/// Entrypoint invoked by Trunk for wasm32 builds.
pub fn run_app() {
    console_error_panic_hook::set_once();
    if let Err(err) = init_logging(ConsoleSink, log_level()) {
        gloo::console::warn!(format!("logging unavailable: {err}"));
    }
    if let Some(root) = gloo::utils::document().get_element_by_id("root") {
        yew::Renderer::<DealerDeskApp>::with_root(root).render();
    } else {
        yew::Renderer::<DealerDeskApp>::new().render();
    }
}
