//! Admin list with add, edit and delete dialogs.

use dealerdesk_api_models::{Page, User};
use yew::prelude::*;

use crate::app::api::ApiCtx;
use crate::app::hooks::use_query;
use crate::components::empty_state::{EmptyState, QueryStatus, query_error};
use crate::components::form::{TextField, bind, field_error, spawn_write};
use crate::components::modal::{ConfirmDialog, Dialog, Modal, close, open};
use crate::components::pagination::Pagination;
use crate::core::fetch::FetchOptions;
use crate::core::validation::FieldErrors;
use crate::features::admins::api;
use crate::features::admins::state::{AdminForm, AdminScope, inline_save_errors};

#[derive(Properties, PartialEq)]
pub(crate) struct AdminsPanelProps {
    pub scope: AdminScope,
}

#[function_component(AdminsPanel)]
pub(crate) fn admins_panel(props: &AdminsPanelProps) -> Html {
    let scope = props.scope;
    let page = use_state(|| 1_u32);
    let dialog = use_state(Dialog::<User>::default);
    let busy = use_state(|| false);
    let api_ctx = use_context::<ApiCtx>();
    let current = *page;
    let snapshot = use_query(scope.page_key(current), move |client| async move {
        api::list(&client, scope, current).await
    });
    let Some(api_ctx) = api_ctx else {
        return html! { <div class="panel"><p class="muted">{"Missing API context."}</p></div> };
    };

    let on_page = {
        let page = page.clone();
        Callback::from(move |next: u32| page.set(next))
    };
    let listing = snapshot.data.clone().unwrap_or_else(|| std::rc::Rc::new(Page::default()));

    let dialog_view = match &*dialog {
        Dialog::Closed => html! {},
        Dialog::Create | Dialog::Edit(_) => html! {
            <AdminDialog {scope} user={dialog.editing()} on_close={close(&dialog)} />
        },
        Dialog::Delete(user) => {
            let on_confirm = {
                let api_ctx = api_ctx.clone();
                let dialog = dialog.clone();
                let busy = busy.clone();
                let user_id = user.id;
                Callback::from(move |()| {
                    let api_ctx = api_ctx.clone();
                    let dialog = dialog.clone();
                    let write = {
                        let api_ctx = api_ctx.clone();
                        async move {
                            let client = api_ctx.api();
                            api_ctx.mutate(&[scope.key()], api::delete(&client, user_id)).await
                        }
                    };
                    spawn_write(&busy, write, move |()| {
                        api_ctx.success("Admin successfully deleted.");
                        dialog.set(Dialog::Closed);
                    });
                })
            };
            html! {
                <ConfirmDialog
                    title="Delete admin"
                    message={format!("Delete {}? This cannot be undone.", user.display_name())}
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
                    <p class="eyebrow">{"Access"}</p>
                    <h3>{"Admins"}</h3>
                </div>
                <button class="btn btn-primary btn-sm" onclick={open(&dialog, Dialog::Create)}>
                    {"Add admin"}
                </button>
            </div>
            <QueryStatus loading={snapshot.is_loading()} error={query_error(&snapshot)} />
            {if listing.data.is_empty() && !snapshot.is_loading() {
                html! { <EmptyState title="No admins yet" description={Some(AttrValue::from("Add an admin to give someone access."))} /> }
            } else {
                html! {
                    <table class="table">
                        <thead><tr><th>{"Name"}</th><th>{"Email"}</th><th></th></tr></thead>
                        <tbody>
                            {for listing.data.iter().map(|user| html! {
                                <tr key={user.id.to_string()}>
                                    <td>{user.display_name()}</td>
                                    <td class="muted">{user.email.clone()}</td>
                                    <td class="row-actions">
                                        <button class="btn btn-ghost btn-xs" onclick={open(&dialog, Dialog::Edit(user.clone()))}>{"Edit"}</button>
                                        <button class="btn btn-ghost btn-xs text-error" onclick={open(&dialog, Dialog::Delete(user.clone()))}>{"Delete"}</button>
                                    </td>
                                </tr>
                            })}
                        </tbody>
                    </table>
                }
            }}
            <Pagination page={current} meta={listing.meta} {on_page} />
            {dialog_view}
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct AdminDialogProps {
    scope: AdminScope,
    user: Option<User>,
    on_close: Callback<()>,
}

#[function_component(AdminDialog)]
fn admin_dialog(props: &AdminDialogProps) -> Html {
    let api_ctx = use_context::<ApiCtx>();
    let form = {
        let user = props.user.clone();
        use_state(move || user.as_ref().map(AdminForm::from_user).unwrap_or_default())
    };
    let errors = use_state(FieldErrors::default);
    let busy = use_state(|| false);
    let Some(api_ctx) = api_ctx else {
        return html! {};
    };
    let editing = props.user.as_ref().map(|user| user.id);

    let on_save = {
        let form = form.clone();
        let errors = errors.clone();
        let busy = busy.clone();
        let on_close = props.on_close.clone();
        let scope = props.scope;
        Callback::from(move |_: MouseEvent| {
            let input = match form.validate(scope, editing.is_some()) {
                Ok(input) => input,
                Err(found) => {
                    errors.set(found);
                    return;
                }
            };
            errors.set(FieldErrors::default());
            let api_ctx = api_ctx.clone();
            let on_close = on_close.clone();
            let write = {
                let api_ctx = api_ctx.clone();
                let errors = errors.clone();
                async move {
                    let client = api_ctx.api();
                    let keys = [scope.key()];
                    let saved = match editing {
                        Some(user_id) => {
                            api_ctx
                                .mutate_with(&keys, FetchOptions::SILENT, api::update(&client, user_id, &input))
                                .await
                        }
                        None => {
                            api_ctx
                                .mutate_with(&keys, FetchOptions::SILENT, api::create(&client, &input))
                                .await
                        }
                    };
                    saved.map_err(|err| {
                        match inline_save_errors(&err) {
                            Some(found) => errors.set(found),
                            None => api_ctx.error(err.message.clone()),
                        }
                        err
                    })
                }
            };
            spawn_write(&busy, write, move |_| {
                api_ctx.success(if editing.is_some() {
                    "Admin successfully updated."
                } else {
                    "Admin successfully added."
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
    let password_label = if editing.is_some() { "New password (optional)" } else { "Password" };

    html! {
        <Modal title={if editing.is_some() { "Edit admin" } else { "Add admin" }} on_close={props.on_close.clone()} {actions}>
            <TextField label="First name" value={form.first_name.clone()} error={field_error(&errors, "first_name")}
                on_input={bind(&form, |form, value| form.first_name = value)} />
            <TextField label="Last name" value={form.last_name.clone()} error={field_error(&errors, "last_name")}
                on_input={bind(&form, |form, value| form.last_name = value)} />
            <TextField label="Email" input_type="email" value={form.email.clone()} error={field_error(&errors, "email")}
                on_input={bind(&form, |form, value| form.email = value)} />
            <TextField label={password_label} input_type="password" value={form.password.clone()} error={field_error(&errors, "password")}
                on_input={bind(&form, |form, value| form.password = value)} />
            <TextField label="Confirm password" input_type="password" value={form.confirm_password.clone()}
                error={field_error(&errors, "confirm_password")}
                on_input={bind(&form, |form, value| form.confirm_password = value)} />
        </Modal>
    }
}
