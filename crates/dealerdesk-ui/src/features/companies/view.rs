//! Company list, company dialog, and the tabbed company details screen.

use std::rc::Rc;

use dealerdesk_api_models::{Company, Page};
use gloo::timers::callback::Timeout;
use uuid::Uuid;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::use_store_value;

use crate::app::Route;
use crate::app::api::ApiCtx;
use crate::app::hooks::use_query;
use crate::components::empty_state::{EmptyState, QueryStatus, query_error};
use crate::components::form::{
    FileField, SelectField, TextAreaField, TextField, bind, field_error, pick_upload, spawn_write,
};
use crate::components::modal::{ConfirmDialog, Dialog, Modal, close, open};
use crate::components::pagination::Pagination;
use crate::core::http::Upload;
use crate::core::store::AuthStore;
use crate::core::validation::FieldErrors;
use crate::features::admins::state::AdminScope;
use crate::features::admins::view::AdminsPanel;
use crate::features::assistants::view::AssistantsPanel;
use crate::features::companies::api::{
    self, CompanySubmit, companies_key, company_key, submit_saga,
};
use crate::features::companies::state::{CompanyForm, CompanyQuery, SortOrder};
use crate::features::data_collections::view::DataCollectionsPanel;
use crate::features::product_features::view::CompanyFeaturesPanel;
use crate::features::subscriptions::view::SubscriptionsPanel;
use crate::features::virtual_offices::view::VirtualOfficesPanel;

const SEARCH_DEBOUNCE_MS: u32 = 400;

/// `/companies`: every company for root, the own group's for group admins.
#[function_component(CompaniesPage)]
pub(crate) fn companies_page() -> Html {
    let auth = use_store_value::<AuthStore>();
    let group_id = auth.user().and_then(|user| user.company_group_id());
    html! {
        <section class="page">
            <CompaniesTable {group_id} />
        </section>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct CompaniesTableProps {
    #[prop_or_default]
    pub group_id: Option<Uuid>,
}

/// Filterable company table; scoped to `group_id` when set.
#[function_component(CompaniesTable)]
pub(crate) fn companies_table(props: &CompaniesTableProps) -> Html {
    let query = {
        let group_id = props.group_id;
        use_state(move || CompanyQuery::for_group(group_id))
    };
    let search = use_state(String::new);
    let dialog = use_state(Dialog::<Company>::default);
    let busy = use_state(|| false);
    let api_ctx = use_context::<ApiCtx>();
    let snapshot = {
        let current = (*query).clone();
        use_query(current.key(), move |client| async move {
            api::list(&client, &current).await
        })
    };

    {
        let query = query.clone();
        use_effect_with_deps(
            move |text: &String| {
                let text = text.clone();
                let timeout = Timeout::new(SEARCH_DEBOUNCE_MS, move || {
                    if query.search != text {
                        query.set(query.refine(|next| next.search = text));
                    }
                });
                move || drop(timeout)
            },
            (*search).clone(),
        );
    }

    let Some(api_ctx) = api_ctx else {
        return html! { <div class="panel"><p class="muted">{"Missing API context."}</p></div> };
    };
    let listing = snapshot
        .data
        .clone()
        .unwrap_or_else(|| Rc::new(Page::default()));

    let on_search = {
        let search = search.clone();
        Callback::from(move |value: String| search.set(value))
    };
    let on_country = {
        let query = query.clone();
        Callback::from(move |value: String| query.set(query.refine(|next| next.country = value)))
    };
    let on_order = {
        let query = query.clone();
        Callback::from(move |value: String| {
            query.set(query.refine(|next| next.order = SortOrder::from_value(&value)));
        })
    };
    let on_page = {
        let query = query.clone();
        Callback::from(move |page: u32| {
            let mut next = (*query).clone();
            next.page = page;
            query.set(next);
        })
    };

    let dialog_view = match &*dialog {
        Dialog::Closed => html! {},
        Dialog::Create | Dialog::Edit(_) => html! {
            <CompanyDialog company={dialog.editing()} group_id={props.group_id} on_close={close(&dialog)} />
        },
        Dialog::Delete(company) => {
            let on_confirm = {
                let api_ctx = api_ctx.clone();
                let dialog = dialog.clone();
                let busy = busy.clone();
                let company_id = company.id;
                Callback::from(move |()| {
                    let api_ctx = api_ctx.clone();
                    let dialog = dialog.clone();
                    let write = {
                        let api_ctx = api_ctx.clone();
                        async move {
                            let client = api_ctx.api();
                            api_ctx
                                .mutate(&[companies_key()], api::delete(&client, company_id))
                                .await
                        }
                    };
                    spawn_write(&busy, write, move |()| {
                        api_ctx.success("Company deleted successfully");
                        dialog.set(Dialog::Closed);
                    });
                })
            };
            html! {
                <ConfirmDialog
                    title="Delete company"
                    message={format!("Delete {} and everything it owns?", company.name)}
                    busy={*busy}
                    {on_confirm}
                    on_cancel={close(&dialog)}
                />
            }
        }
    };

    let order_options = vec![
        (AttrValue::from(SortOrder::Asc.as_str()), AttrValue::from("Name A–Z")),
        (AttrValue::from(SortOrder::Desc.as_str()), AttrValue::from("Name Z–A")),
    ];

    html! {
        <div class="panel">
            <div class="panel-head">
                <div>
                    <p class="eyebrow">{"Dealerships"}</p>
                    <h3>{"Companies"}</h3>
                </div>
                <button class="btn btn-primary btn-sm" onclick={open(&dialog, Dialog::Create)}>
                    {"Add company"}
                </button>
            </div>
            <div class="filters">
                <TextField label="Search" placeholder="Company name" value={(*search).clone()} on_input={on_search} />
                <TextField label="Country" value={query.country.clone()} on_input={on_country} />
                <SelectField label="Sort" value={query.order.as_str()} options={order_options} on_change={on_order} />
            </div>
            <QueryStatus loading={snapshot.is_loading()} error={query_error(&snapshot)} />
            {if listing.data.is_empty() && !snapshot.is_loading() {
                html! { <EmptyState title="No companies found" /> }
            } else {
                html! {
                    <div class="card-grid">
                        {for listing.data.iter().map(|company| html! {
                            <article class="card company-card" key={company.id.to_string()}>
                                {company.logo_url.clone().map(|src| html! {
                                    <img class="company-logo" {src} alt="" />
                                }).unwrap_or_default()}
                                <Link<Route> to={Route::CompanyDetails { id: company.id.to_string() }}>
                                    <h4>{company.name.clone()}</h4>
                                </Link<Route>>
                                <p class="muted">
                                    {[company.city.clone(), company.country.clone()]
                                        .into_iter()
                                        .flatten()
                                        .collect::<Vec<_>>()
                                        .join(", ")}
                                </p>
                                <div class="row-actions">
                                    <button class="btn btn-ghost btn-xs" onclick={open(&dialog, Dialog::Edit(company.clone()))}>{"Edit"}</button>
                                    <button class="btn btn-ghost btn-xs text-error" onclick={open(&dialog, Dialog::Delete(company.clone()))}>{"Delete"}</button>
                                </div>
                            </article>
                        })}
                    </div>
                }
            }}
            <Pagination page={query.page} meta={listing.meta} {on_page} />
            {dialog_view}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct CompanyDialogProps {
    pub company: Option<Company>,
    #[prop_or_default]
    pub group_id: Option<Uuid>,
    pub on_close: Callback<()>,
}

#[derive(Clone, PartialEq)]
struct CompanyDraft {
    form: CompanyForm,
    logo: Option<Upload>,
}

/// Add or edit a company, uploading a new logo when one was picked.
#[function_component(CompanyDialog)]
pub(crate) fn company_dialog(props: &CompanyDialogProps) -> Html {
    let api_ctx = use_context::<ApiCtx>();
    let draft = {
        let company = props.company.clone();
        let group_id = props.group_id;
        use_state(move || CompanyDraft {
            form: company
                .as_ref()
                .map_or_else(|| CompanyForm::new_in(group_id), CompanyForm::from_company),
            logo: None,
        })
    };
    let errors = use_state(FieldErrors::default);
    let busy = use_state(|| false);
    let Some(api_ctx) = api_ctx else {
        return html! {};
    };
    let company_id = props.company.as_ref().map(|company| company.id);

    let on_save = {
        let draft = draft.clone();
        let errors = errors.clone();
        let busy = busy.clone();
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| {
            let input = match draft.form.validate() {
                Ok(input) => input,
                Err(found) => {
                    errors.set(found);
                    return;
                }
            };
            errors.set(FieldErrors::default());
            let api_ctx = api_ctx.clone();
            let on_close = on_close.clone();
            let logo = draft.logo.clone();
            let write = {
                let api_ctx = api_ctx.clone();
                async move {
                    let mut ctx = CompanySubmit::new(api_ctx.api(), company_id, input, logo);
                    let mut keys = vec![companies_key()];
                    keys.extend(company_id.map(company_key));
                    api_ctx.submit(&submit_saga(), &mut ctx, &keys).await
                }
            };
            spawn_write(&busy, write, move |()| {
                api_ctx.success(if company_id.is_some() {
                    "Company updated successfully"
                } else {
                    "Company created successfully"
                });
                on_close.emit(());
            });
        })
    };
    let cancel = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };
    let actions = html! {
        <>
            <button class="btn btn-ghost btn-sm" onclick={cancel}>{"Cancel"}</button>
            <button class="btn btn-primary btn-sm" disabled={*busy} onclick={on_save}>{"Save"}</button>
        </>
    };
    let form = &draft.form;

    html! {
        <Modal title={if company_id.is_some() { "Edit company" } else { "Add company" }} on_close={props.on_close.clone()} {actions}>
            <TextField label="Name" value={form.name.clone()} error={field_error(&errors, "name")}
                on_input={bind(&draft, |draft, value| draft.form.name = value)} />
            <TextField label="Email" input_type="email" value={form.email.clone()} error={field_error(&errors, "email")}
                on_input={bind(&draft, |draft, value| draft.form.email = value)} />
            <TextField label="Phone" placeholder="+381641234567" value={form.phone.clone()} error={field_error(&errors, "phone")}
                on_input={bind(&draft, |draft, value| draft.form.phone = value)} />
            <TextField label="Website" value={form.website.clone()}
                on_input={bind(&draft, |draft, value| draft.form.website = value)} />
            <TextField label="Address" value={form.address.clone()}
                on_input={bind(&draft, |draft, value| draft.form.address = value)} />
            <div class="grid-2">
                <TextField label="City" value={form.city.clone()}
                    on_input={bind(&draft, |draft, value| draft.form.city = value)} />
                <TextField label="Postal code" value={form.postal_code.clone()}
                    on_input={bind(&draft, |draft, value| draft.form.postal_code = value)} />
            </div>
            <TextField label="Country" value={form.country.clone()}
                on_input={bind(&draft, |draft, value| draft.form.country = value)} />
            <TextAreaField label="Description" value={form.description.clone()}
                on_input={bind(&draft, |draft, value| draft.form.description = value)} />
            <FileField label="Logo" accept="image/*"
                file_name={draft.logo.as_ref().map(|logo| AttrValue::from(logo.file_name.clone()))}
                on_pick={pick_upload(&draft, |draft, upload| draft.logo = Some(upload))} />
        </Modal>
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CompanyTab {
    Admins,
    Assistants,
    Offices,
    Collections,
    Subscriptions,
    Features,
}

impl CompanyTab {
    const ALL: [Self; 6] = [
        Self::Admins,
        Self::Assistants,
        Self::Offices,
        Self::Collections,
        Self::Subscriptions,
        Self::Features,
    ];

    const fn label(self) -> &'static str {
        match self {
            Self::Admins => "Admins",
            Self::Assistants => "Assistants",
            Self::Offices => "Virtual offices",
            Self::Collections => "Data collections",
            Self::Subscriptions => "Subscriptions",
            Self::Features => "Features",
        }
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct CompanyDetailsProps {
    pub company_id: Uuid,
}

/// `/companies/:id`: profile header plus one tab per owned resource.
#[function_component(CompanyDetailsPage)]
pub(crate) fn company_details_page(props: &CompanyDetailsProps) -> Html {
    let company_id = props.company_id;
    let tab = use_state(|| CompanyTab::Admins);
    let editing = use_state(|| false);
    let snapshot = use_query(company_key(company_id), move |client| async move {
        api::get(&client, company_id).await
    });

    let Some(company) = snapshot.data.clone() else {
        return html! {
            <section class="page">
                <QueryStatus loading={snapshot.is_loading()} error={query_error(&snapshot)} />
            </section>
        };
    };

    let body = match *tab {
        CompanyTab::Admins => html! { <AdminsPanel scope={AdminScope::Company(company_id)} /> },
        CompanyTab::Assistants => html! { <AssistantsPanel {company_id} /> },
        CompanyTab::Offices => html! { <VirtualOfficesPanel {company_id} /> },
        CompanyTab::Collections => html! { <DataCollectionsPanel {company_id} /> },
        CompanyTab::Subscriptions => html! { <SubscriptionsPanel {company_id} /> },
        CompanyTab::Features => html! { <CompanyFeaturesPanel {company_id} /> },
    };
    let on_close = {
        let editing = editing.clone();
        Callback::from(move |()| editing.set(false))
    };
    let edit_click = {
        let editing = editing.clone();
        Callback::from(move |_| editing.set(true))
    };

    html! {
        <section class="page">
            <div class="panel">
                <div class="panel-head">
                    <div>
                        <p class="eyebrow">{"Company"}</p>
                        <h3>{company.name.clone()}</h3>
                        <p class="muted">{company.email.clone().unwrap_or_default()}</p>
                    </div>
                    <button class="btn btn-ghost btn-sm" onclick={edit_click}>{"Edit"}</button>
                </div>
                {company.description.clone().map(|text| html! { <p>{text}</p> }).unwrap_or_default()}
            </div>
            <div role="tablist" class="tabs tabs-bordered">
                {for CompanyTab::ALL.iter().map(|candidate| {
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
            {if *editing {
                html! { <CompanyDialog company={Some((*company).clone())} group_id={company.company_group_id} {on_close} /> }
            } else {
                html! {}
            }}
        </section>
    }
}
