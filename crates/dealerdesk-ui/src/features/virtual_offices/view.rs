//! Virtual offices panel: templates, backgrounds, and rendered avatars.

use dealerdesk_api_models::{Role, VirtualOffice};
use uuid::Uuid;
use yew::prelude::*;
use yewdux::prelude::use_store_value;

use crate::app::api::ApiCtx;
use crate::app::hooks::use_query;
use crate::components::empty_state::{EmptyState, QueryStatus, query_error};
use crate::components::form::{FileField, SelectField, TextField, bind, field_error, pick_upload, spawn_write};
use crate::components::modal::{ConfirmDialog, Dialog, Modal, close, open};
use crate::core::http::Upload;
use crate::core::store::AuthStore;
use crate::core::validation::FieldErrors;
use crate::features::virtual_offices::api::{self, OfficeSubmit, offices_key, submit_saga};
use crate::features::virtual_offices::state::{
    OFFICE_TYPES, PLACEMENT_KEYS, VirtualOfficeForm, can_delete, can_edit,
};

#[derive(Properties, PartialEq)]
pub(crate) struct VirtualOfficesPanelProps {
    pub company_id: Uuid,
}

#[function_component(VirtualOfficesPanel)]
pub(crate) fn virtual_offices_panel(props: &VirtualOfficesPanelProps) -> Html {
    let company_id = props.company_id;
    let dialog = use_state(Dialog::<VirtualOffice>::default);
    let busy = use_state(|| false);
    let api_ctx = use_context::<ApiCtx>();
    let auth = use_store_value::<AuthStore>();
    let snapshot = use_query(offices_key(company_id), move |client| async move {
        api::list(&client, company_id).await
    });
    let (Some(api_ctx), Some(user)) = (api_ctx, auth.user().cloned()) else {
        return html! { <div class="panel"><p class="muted">{"Missing API context."}</p></div> };
    };
    let offices = snapshot
        .data
        .as_ref()
        .map(|page| page.data.clone())
        .unwrap_or_default();
    let is_root = user.role == Role::Root;

    let remove_avatar = |office_id: Uuid| {
        let api_ctx = api_ctx.clone();
        let busy = busy.clone();
        Callback::from(move |_: MouseEvent| {
            let api_ctx = api_ctx.clone();
            let write = {
                let api_ctx = api_ctx.clone();
                async move {
                    let client = api_ctx.api();
                    api_ctx
                        .mutate(&[offices_key(company_id)], api::delete_avatar(&client, company_id, office_id))
                        .await
                }
            };
            spawn_write(&busy, write, move |()| api_ctx.success("Avatar removed"));
        })
    };

    let dialog_view = match &*dialog {
        Dialog::Closed => html! {},
        Dialog::Create | Dialog::Edit(_) => html! {
            <OfficeDialog {company_id} office={dialog.editing()} with_layout={is_root} on_close={close(&dialog)} />
        },
        Dialog::Delete(office) => {
            let on_confirm = {
                let api_ctx = api_ctx.clone();
                let dialog = dialog.clone();
                let busy = busy.clone();
                let office_id = office.id;
                Callback::from(move |()| {
                    let api_ctx = api_ctx.clone();
                    let dialog = dialog.clone();
                    let write = {
                        let api_ctx = api_ctx.clone();
                        async move {
                            let client = api_ctx.api();
                            api_ctx
                                .mutate(&[offices_key(company_id)], api::delete(&client, company_id, office_id))
                                .await
                        }
                    };
                    spawn_write(&busy, write, move |()| {
                        api_ctx.success("Virtual office deleted successfully");
                        dialog.set(Dialog::Closed);
                    });
                })
            };
            html! {
                <ConfirmDialog
                    title="Delete virtual office"
                    message={format!("Delete {}?", office.name)}
                    busy={*busy}
                    {on_confirm}
                    on_cancel={close(&dialog)}
                />
            }
        }
    };

    html! {
        <div class="panel">
            <div class="panel-head">
                <div>
                    <p class="eyebrow">{"Presence"}</p>
                    <h3>{"Virtual offices"}</h3>
                </div>
                {if is_root {
                    html! { <button class="btn btn-primary btn-sm" onclick={open(&dialog, Dialog::Create)}>{"Add office"}</button> }
                } else {
                    html! {}
                }}
            </div>
            <QueryStatus loading={snapshot.is_loading()} error={query_error(&snapshot)} />
            {if offices.is_empty() && !snapshot.is_loading() {
                html! { <EmptyState title="No virtual offices" /> }
            } else {
                html! {
                    <div class="card-grid">
                        {for offices.iter().map(|office| html! {
                            <article class="card" key={office.id.to_string()}>
                                {office.background_url.clone().map(|src| html! {
                                    <img class="office-background" {src} alt="" />
                                }).unwrap_or_default()}
                                <h4>{office.name.clone()}</h4>
                                <p class="muted">{office.kind.clone().unwrap_or_default()}</p>
                                {if office.file_generation_in_progress {
                                    html! { <span class="pill warning">{"Avatar rendering…"}</span> }
                                } else {
                                    office.avatar_url.clone().map(|src| html! {
                                        <img class="office-avatar" {src} alt="" />
                                    }).unwrap_or_default()
                                }}
                                <div class="row-actions">
                                    {if can_edit(&user, office) {
                                        html! {
                                            <>
                                                <button class="btn btn-ghost btn-xs" onclick={open(&dialog, Dialog::Edit(office.clone()))}>{"Edit"}</button>
                                                {if office.avatar_url.is_some() {
                                                    html! { <button class="btn btn-ghost btn-xs" disabled={*busy} onclick={remove_avatar(office.id)}>{"Remove avatar"}</button> }
                                                } else {
                                                    html! {}
                                                }}
                                            </>
                                        }
                                    } else {
                                        html! {}
                                    }}
                                    {if can_delete(&user) {
                                        html! { <button class="btn btn-ghost btn-xs text-error" onclick={open(&dialog, Dialog::Delete(office.clone()))}>{"Delete"}</button> }
                                    } else {
                                        html! {}
                                    }}
                                </div>
                            </article>
                        })}
                    </div>
                }
            }}
            {dialog_view}
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct OfficeDialogProps {
    company_id: Uuid,
    office: Option<VirtualOffice>,
    with_layout: bool,
    on_close: Callback<()>,
}

#[derive(Clone, PartialEq)]
struct OfficeDraft {
    form: VirtualOfficeForm,
    background: Option<Upload>,
    avatar: Option<Upload>,
}

#[function_component(OfficeDialog)]
fn office_dialog(props: &OfficeDialogProps) -> Html {
    let company_id = props.company_id;
    let with_layout = props.with_layout;
    let api_ctx = use_context::<ApiCtx>();
    let draft = {
        let office = props.office.clone();
        use_state(move || OfficeDraft {
            form: office.as_ref().map(VirtualOfficeForm::from_office).unwrap_or_default(),
            background: None,
            avatar: None,
        })
    };
    let errors = use_state(FieldErrors::default);
    let busy = use_state(|| false);
    let Some(api_ctx) = api_ctx else {
        return html! {};
    };
    let office_id = props.office.as_ref().map(|office| office.id);

    let on_save = {
        let draft = draft.clone();
        let errors = errors.clone();
        let busy = busy.clone();
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| {
            let input = match draft.form.validate(with_layout) {
                Ok(input) => input,
                Err(found) => {
                    errors.set(found);
                    return;
                }
            };
            errors.set(FieldErrors::default());
            let api_ctx = api_ctx.clone();
            let on_close = on_close.clone();
            let mut ctx = OfficeSubmit::new(
                api_ctx.api(),
                company_id,
                office_id,
                input,
                draft.background.clone(),
                draft.avatar.clone(),
            );
            let write = {
                let api_ctx = api_ctx.clone();
                async move {
                    api_ctx
                        .submit(&submit_saga(), &mut ctx, &[offices_key(company_id)])
                        .await
                }
            };
            spawn_write(&busy, write, move |()| {
                api_ctx.success(if office_id.is_some() {
                    "Virtual office updated"
                } else {
                    "Virtual office created"
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
    let type_options = OFFICE_TYPES
        .iter()
        .map(|(value, label)| (AttrValue::from(*value), AttrValue::from(*label)))
        .collect::<Vec<_>>();
    let form = &draft.form;

    html! {
        <Modal title={if office_id.is_some() { "Edit virtual office" } else { "Add virtual office" }} on_close={props.on_close.clone()} {actions}>
            <TextField label="Name" value={form.name.clone()} error={field_error(&errors, "name")}
                on_input={bind(&draft, |draft, value| draft.form.name = value)} />
            {if with_layout {
                html! {
                    <>
                        <SelectField label="Type" placeholder={Some(AttrValue::from("Choose a template"))}
                            value={form.kind.clone()} options={type_options}
                            on_change={bind(&draft, |draft, value| draft.form.kind = value)} />
                        <div class="grid-2">
                            {for PLACEMENT_KEYS.iter().enumerate().map(|(index, key)| html! {
                                <TextField label={*key} input_type="number"
                                    value={form.placement[index].clone()}
                                    error={field_error(&errors, &format!("configuration.{key}"))}
                                    on_input={bind(&draft, move |draft, value| draft.form.placement[index] = value)} />
                            })}
                        </div>
                    </>
                }
            } else {
                html! {}
            }}
            <FileField label="Background" accept="image/*"
                file_name={draft.background.as_ref().map(|file| AttrValue::from(file.file_name.clone()))}
                on_pick={pick_upload(&draft, |draft, upload| draft.background = Some(upload))} />
            <FileField label="Avatar source" accept="image/*,video/*"
                file_name={draft.avatar.as_ref().map(|file| AttrValue::from(file.file_name.clone()))}
                on_pick={pick_upload(&draft, |draft, upload| draft.avatar = Some(upload))} />
        </Modal>
    }
}
