//! Company group screens.

use dealerdesk_api_models::CompanyGroup;
use uuid::Uuid;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::app::Route;
use crate::app::api::ApiCtx;
use crate::app::hooks::use_query;
use crate::components::empty_state::{EmptyState, QueryStatus, query_error};
use crate::components::form::{
    FileField, TextAreaField, TextField, bind, field_error, pick_upload, spawn_write,
};
use crate::components::modal::{ConfirmDialog, Dialog, Modal, close, open};
use crate::core::http::Upload;
use crate::core::validation::FieldErrors;
use crate::features::admins::state::AdminScope;
use crate::features::admins::view::AdminsPanel;
use crate::features::companies::view::CompaniesTable;
use crate::features::company_groups::api::{self, GroupSubmit, group_key, groups_key, submit_saga};
use crate::features::company_groups::state::CompanyGroupForm;

#[function_component(CompanyGroupsPage)]
pub(crate) fn company_groups_page() -> Html {
    let dialog = use_state(Dialog::<CompanyGroup>::default);
    let busy = use_state(|| false);
    let api_ctx = use_context::<ApiCtx>();
    let snapshot = use_query(groups_key(), |client| async move { api::list(&client).await });
    let Some(api_ctx) = api_ctx else {
        return html! { <div class="panel"><p class="muted">{"Missing API context."}</p></div> };
    };
    let groups = snapshot
        .data
        .as_ref()
        .map(|page| page.data.clone())
        .unwrap_or_default();

    let dialog_view = match &*dialog {
        Dialog::Closed => html! {},
        Dialog::Create | Dialog::Edit(_) => html! {
            <GroupDialog group={dialog.editing()} on_close={close(&dialog)} />
        },
        Dialog::Delete(group) => {
            let on_confirm = {
                let api_ctx = api_ctx.clone();
                let dialog = dialog.clone();
                let busy = busy.clone();
                let group_id = group.id;
                Callback::from(move |()| {
                    let api_ctx = api_ctx.clone();
                    let dialog = dialog.clone();
                    let write = {
                        let api_ctx = api_ctx.clone();
                        async move {
                            let client = api_ctx.api();
                            api_ctx.mutate(&[groups_key()], api::delete(&client, group_id)).await
                        }
                    };
                    spawn_write(&busy, write, move |()| {
                        api_ctx.success("Company group deleted successfully");
                        dialog.set(Dialog::Closed);
                    });
                })
            };
            html! {
                <ConfirmDialog
                    title="Delete company group"
                    message={format!("Delete {}?", group.name)}
                    busy={*busy}
                    {on_confirm}
                    on_cancel={close(&dialog)}
                />
            }
        }
    };

    html! {
        <section class="page">
            <div class="panel">
                <div class="panel-head">
                    <div>
                        <p class="eyebrow">{"Tenants"}</p>
                        <h3>{"Company groups"}</h3>
                    </div>
                    <button class="btn btn-primary btn-sm" onclick={open(&dialog, Dialog::Create)}>
                        {"Add group"}
                    </button>
                </div>
                <QueryStatus loading={snapshot.is_loading()} error={query_error(&snapshot)} />
                {if groups.is_empty() && !snapshot.is_loading() {
                    html! { <EmptyState title="No company groups yet" /> }
                } else {
                    html! {
                        <div class="card-grid">
                            {for groups.iter().map(|group| html! {
                                <article class="card" key={group.id.to_string()}>
                                    {group.logo_url.clone().map(|src| html! {
                                        <img class="company-logo" {src} alt="" />
                                    }).unwrap_or_default()}
                                    <Link<Route> to={Route::CompanyGroupDetails { id: group.id.to_string() }}>
                                        <h4>{group.name.clone()}</h4>
                                    </Link<Route>>
                                    <p class="muted">{group.country.clone().unwrap_or_default()}</p>
                                    <div class="row-actions">
                                        <button class="btn btn-ghost btn-xs" onclick={open(&dialog, Dialog::Edit(group.clone()))}>{"Edit"}</button>
                                        <button class="btn btn-ghost btn-xs text-error" onclick={open(&dialog, Dialog::Delete(group.clone()))}>{"Delete"}</button>
                                    </div>
                                </article>
                            })}
                        </div>
                    }
                }}
            </div>
            {dialog_view}
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct GroupDialogProps {
    group: Option<CompanyGroup>,
    on_close: Callback<()>,
}

#[derive(Clone, PartialEq)]
struct GroupDraft {
    form: CompanyGroupForm,
    logo: Option<Upload>,
}

#[function_component(GroupDialog)]
fn group_dialog(props: &GroupDialogProps) -> Html {
    let api_ctx = use_context::<ApiCtx>();
    let draft = {
        let group = props.group.clone();
        use_state(move || GroupDraft {
            form: group.as_ref().map(CompanyGroupForm::from_group).unwrap_or_default(),
            logo: None,
        })
    };
    let errors = use_state(FieldErrors::default);
    let busy = use_state(|| false);
    let Some(api_ctx) = api_ctx else {
        return html! {};
    };
    let group_id = props.group.as_ref().map(|group| group.id);

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
                    let mut ctx = GroupSubmit::new(api_ctx.api(), group_id, input, logo);
                    let mut keys = vec![groups_key()];
                    keys.extend(group_id.map(group_key));
                    api_ctx.submit(&submit_saga(), &mut ctx, &keys).await
                }
            };
            spawn_write(&busy, write, move |()| {
                api_ctx.success(if group_id.is_some() {
                    "Company group updated successfully"
                } else {
                    "Company group created successfully"
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
        <Modal title={if group_id.is_some() { "Edit company group" } else { "Add company group" }} on_close={props.on_close.clone()} {actions}>
            <TextField label="Name" value={form.name.clone()} error={field_error(&errors, "name")}
                on_input={bind(&draft, |draft, value| draft.form.name = value)} />
            <TextField label="Contact email" input_type="email" value={form.contact_email.clone()}
                error={field_error(&errors, "contact_email")}
                on_input={bind(&draft, |draft, value| draft.form.contact_email = value)} />
            <TextField label="Contact phone" value={form.contact_phone.clone()}
                on_input={bind(&draft, |draft, value| draft.form.contact_phone = value)} />
            <TextField label="Country" value={form.country.clone()} error={field_error(&errors, "country")}
                on_input={bind(&draft, |draft, value| draft.form.country = value)} />
            <div class="grid-2">
                <TextField label="City" value={form.city.clone()}
                    on_input={bind(&draft, |draft, value| draft.form.city = value)} />
                <TextField label="Postal code" value={form.postal_code.clone()}
                    on_input={bind(&draft, |draft, value| draft.form.postal_code = value)} />
            </div>
            <TextField label="Address" value={form.address.clone()}
                on_input={bind(&draft, |draft, value| draft.form.address = value)} />
            <TextAreaField label="Description" value={form.description.clone()}
                on_input={bind(&draft, |draft, value| draft.form.description = value)} />
            <FileField label="Logo" accept="image/*"
                file_name={draft.logo.as_ref().map(|logo| AttrValue::from(logo.file_name.clone()))}
                on_pick={pick_upload(&draft, |draft, upload| draft.logo = Some(upload))} />
        </Modal>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct GroupDetailsProps {
    pub group_id: Uuid,
}

/// `/company-groups/:id`: the group's companies and its admins.
#[function_component(CompanyGroupDetailsPage)]
pub(crate) fn company_group_details_page(props: &GroupDetailsProps) -> Html {
    let group_id = props.group_id;
    let snapshot = use_query(group_key(group_id), move |client| async move {
        api::get(&client, group_id).await
    });
    let Some(group) = snapshot.data.clone() else {
        return html! {
            <section class="page">
                <QueryStatus loading={snapshot.is_loading()} error={query_error(&snapshot)} />
            </section>
        };
    };
    html! {
        <section class="page">
            <div class="panel">
                <p class="eyebrow">{"Company group"}</p>
                <h3>{group.name.clone()}</h3>
                <p class="muted">
                    {[group.contact_email.clone(), group.contact_phone.clone(), group.country.clone()]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join(" · ")}
                </p>
            </div>
            <CompaniesTable group_id={Some(group_id)} />
            <AdminsPanel scope={AdminScope::Group(group_id)} />
        </section>
    }
}
