//! `/settings`: the signed-in admin's own company resources and widget snippet.

use uuid::Uuid;
use yew::prelude::*;
use yewdux::prelude::use_store_value;

use crate::app::hooks::use_query;
use crate::components::empty_state::{EmptyState, QueryStatus, query_error};
use crate::app::api::ApiCtx;
use crate::core::config::widget_url;
use crate::core::store::AuthStore;
use crate::features::companies::api::{self as companies, company_key};
use crate::features::data_collections::view::DataCollectionsPanel;
use crate::features::settings::state::{COPY_FAILURE_MESSAGE, COPY_SUCCESS_MESSAGE, widget_snippet};
use crate::features::virtual_offices::view::VirtualOfficesPanel;
use crate::services::browser::copy_to_clipboard;

#[derive(Clone, Copy, PartialEq, Eq)]
enum SettingsTab {
    Offices,
    Collections,
    Integration,
}

impl SettingsTab {
    const ALL: [Self; 3] = [Self::Offices, Self::Collections, Self::Integration];

    const fn label(self) -> &'static str {
        match self {
            Self::Offices => "Virtual offices",
            Self::Collections => "Data collections",
            Self::Integration => "Virtual office button",
        }
    }
}

#[derive(Properties, PartialEq)]
struct IntegrationSnippetProps {
    company_id: Uuid,
}

/// Widget script tag with a copy button.
#[function_component(IntegrationSnippet)]
fn integration_snippet(props: &IntegrationSnippetProps) -> Html {
    let api_ctx = use_context::<ApiCtx>();
    let snippet = widget_snippet(widget_url(), props.company_id);
    let on_copy = {
        let snippet = snippet.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(api_ctx) = api_ctx.clone() else {
                return;
            };
            let snippet = snippet.clone();
            yew::platform::spawn_local(async move {
                match copy_to_clipboard(&snippet).await {
                    Ok(()) => api_ctx.success(COPY_SUCCESS_MESSAGE),
                    Err(err) => {
                        tracing::warn!(error = %err, "copy failed");
                        api_ctx.error(COPY_FAILURE_MESSAGE);
                    }
                }
            });
        })
    };
    html! {
        <div class="panel">
            <h3>{"Integration code"}</h3>
            <p class="muted">
                {"Copy the code below and paste it before the closing "}<code>{"</body>"}</code>{" tag on your website:"}
            </p>
            <div class="snippet">
                <textarea class="textarea textarea-bordered w-full font-mono" rows="3" readonly={true} value={snippet} />
                <button class="btn btn-ghost btn-sm" title="Copy code" onclick={on_copy}>{"Copy"}</button>
            </div>
            <p class="text-xs muted">
                {"This script displays a floating button in the bottom-right corner that links to your virtual office."}
            </p>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct SettingsTabsProps {
    company_id: Uuid,
}

#[function_component(SettingsTabs)]
fn settings_tabs(props: &SettingsTabsProps) -> Html {
    let company_id = props.company_id;
    let tab = use_state(|| SettingsTab::Offices);
    let company = use_query(company_key(company_id), move |client| async move {
        companies::get(&client, company_id).await
    });
    let profile = company.data.as_ref().map_or_else(
        || html! { <QueryStatus loading={company.is_loading()} error={query_error(&company)} /> },
        |company| {
            let contact = [company.email.clone(), company.phone.clone(), company.website.clone()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" · ");
            html! {
                <div class="panel">
                    <p class="eyebrow">{"Company"}</p>
                    <h3>{company.name.clone()}</h3>
                    <p class="muted">{contact}</p>
                    {company.description.clone().map(|text| html! { <p>{text}</p> }).unwrap_or_default()}
                </div>
            }
        },
    );
    let body = match *tab {
        SettingsTab::Offices => html! { <VirtualOfficesPanel {company_id} /> },
        SettingsTab::Collections => html! { <DataCollectionsPanel {company_id} /> },
        SettingsTab::Integration => html! { <IntegrationSnippet {company_id} /> },
    };
    html! {
        <>
            {profile}
            <div role="tablist" class="tabs tabs-bordered">
                {for SettingsTab::ALL.iter().map(|candidate| {
                    let candidate = *candidate;
                    let onclick = {
                        let tab = tab.clone();
                        Callback::from(move |_| tab.set(candidate))
                    };
                    html! {
                        <button role="tab" class={classes!("tab", (*tab == candidate).then_some("tab-active"))} {onclick}>
                            {candidate.label()}
                        </button>
                    }
                })}
            </div>
            {body}
        </>
    }
}

#[function_component(SettingsPage)]
pub(crate) fn settings_page() -> Html {
    let auth = use_store_value::<AuthStore>();
    let body = match auth.user().and_then(|user| user.company_id()) {
        Some(company_id) => html! { <SettingsTabs {company_id} /> },
        None => html! {
            <EmptyState title="No company" description={Some(AttrValue::from("Your account is not linked to a company."))} />
        },
    };
    html! {
        <section class="page">
            {body}
        </section>
    }
}
