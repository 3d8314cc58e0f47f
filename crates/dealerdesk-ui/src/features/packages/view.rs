//! `/packages`: package list; edits are applied to the cached list before the server answers.

use dealerdesk_api_models::Package;
use yew::prelude::*;
use yewdux::prelude::Dispatch;

use crate::app::api::ApiCtx;
use crate::app::hooks::use_query;
use crate::components::empty_state::{EmptyState, QueryStatus, query_error};
use crate::components::form::{TextField, bind, field_error, spawn_write};
use crate::components::modal::{ConfirmDialog, Dialog, Modal, close, open};
use crate::core::cache::QueryCache;
use crate::core::validation::FieldErrors;
use crate::features::packages::api::{self, packages_key, update_optimistic};
use crate::features::packages::state::PackageForm;

#[function_component(PackagesPage)]
pub(crate) fn packages_page() -> Html {
    let dialog = use_state(Dialog::<Package>::default);
    let busy = use_state(|| false);
    let api_ctx = use_context::<ApiCtx>();
    let snapshot = use_query(packages_key(), |client| async move { api::list(&client).await });
    let Some(api_ctx) = api_ctx else {
        return html! { <div class="panel"><p class="muted">{"Missing API context."}</p></div> };
    };
    let packages = snapshot
        .data
        .as_ref()
        .map(|page| page.data.clone())
        .unwrap_or_default();

    let dialog_view = match &*dialog {
        Dialog::Closed => html! {},
        Dialog::Create | Dialog::Edit(_) => html! {
            <PackageDialog package={dialog.editing()} on_close={close(&dialog)} />
        },
        Dialog::Delete(package) => {
            let on_confirm = {
                let api_ctx = api_ctx.clone();
                let dialog = dialog.clone();
                let busy = busy.clone();
                let package_id = package.id;
                Callback::from(move |()| {
                    let api_ctx = api_ctx.clone();
                    let dialog = dialog.clone();
                    let write = {
                        let api_ctx = api_ctx.clone();
                        async move {
                            let client = api_ctx.api();
                            api_ctx.mutate(&[packages_key()], api::delete(&client, package_id)).await
                        }
                    };
                    spawn_write(&busy, write, move |()| {
                        api_ctx.success("Package deleted successfully");
                        dialog.set(Dialog::Closed);
                    });
                })
            };
            html! {
                <ConfirmDialog
                    title="Delete package"
                    message={format!("Delete {}?", package.name)}
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
                        <p class="eyebrow">{"Billing"}</p>
                        <h3>{"Packages"}</h3>
                    </div>
                    <button class="btn btn-primary btn-sm" onclick={open(&dialog, Dialog::Create)}>{"Add package"}</button>
                </div>
                <QueryStatus loading={snapshot.is_loading()} error={query_error(&snapshot)} />
                {if packages.is_empty() && !snapshot.is_loading() {
                    html! { <EmptyState title="No packages yet" /> }
                } else {
                    html! {
                        <table class="table">
                            <thead><tr><th>{"Name"}</th><th>{"Price"}</th><th>{"Conversations"}</th><th></th></tr></thead>
                            <tbody>
                                {for packages.iter().map(|package| html! {
                                    <tr key={package.id.to_string()}>
                                        <td>{package.name.clone()}</td>
                                        <td>{format!("{:.2}", package.price)}</td>
                                        <td>{package.conversations_limit.to_string()}</td>
                                        <td class="row-actions">
                                            <button class="btn btn-ghost btn-xs" onclick={open(&dialog, Dialog::Edit(package.clone()))}>{"Edit"}</button>
                                            <button class="btn btn-ghost btn-xs text-error" onclick={open(&dialog, Dialog::Delete(package.clone()))}>{"Delete"}</button>
                                        </td>
                                    </tr>
                                })}
                            </tbody>
                        </table>
                    }
                }}
            </div>
            {dialog_view}
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct PackageDialogProps {
    package: Option<Package>,
    on_close: Callback<()>,
}

#[function_component(PackageDialog)]
fn package_dialog(props: &PackageDialogProps) -> Html {
    let api_ctx = use_context::<ApiCtx>();
    let form = {
        let package = props.package.clone();
        use_state(move || package.as_ref().map(PackageForm::from_package).unwrap_or_default())
    };
    let errors = use_state(FieldErrors::default);
    let busy = use_state(|| false);
    let Some(api_ctx) = api_ctx else {
        return html! {};
    };
    let editing = props.package.as_ref().map(|package| package.id);

    let on_save = {
        let form = form.clone();
        let errors = errors.clone();
        let busy = busy.clone();
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| {
            let input = match form.validate() {
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
                async move {
                    let client = api_ctx.api();
                    match editing {
                        Some(package_id) => {
                            update_optimistic(
                                &Dispatch::<QueryCache>::new(),
                                api_ctx.notifier.as_ref(),
                                &client,
                                package_id,
                                &input,
                            )
                            .await
                        }
                        None => api_ctx.mutate(&[packages_key()], api::create(&client, &input)).await,
                    }
                }
            };
            spawn_write(&busy, write, move |_| {
                api_ctx.success(if editing.is_some() {
                    "Package updated successfully!"
                } else {
                    "Package created successfully!"
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

    html! {
        <Modal title={if editing.is_some() { "Edit package" } else { "Add package" }} on_close={props.on_close.clone()} {actions}>
            <TextField label="Name" value={form.name.clone()} error={field_error(&errors, "name")}
                on_input={bind(&form, |form, value| form.name = value)} />
            <TextField label="Price" input_type="number" value={form.price.clone()} error={field_error(&errors, "price")}
                on_input={bind(&form, |form, value| form.price = value)} />
            <TextField label="Conversations limit" input_type="number" value={form.conversations_limit.clone()}
                error={field_error(&errors, "conversations_limit")}
                on_input={bind(&form, |form, value| form.conversations_limit = value)} />
        </Modal>
    }
}
