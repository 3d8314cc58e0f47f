//! Company subscriptions panel.

use dealerdesk_api_models::{Subscription, SubscriptionType};
use uuid::Uuid;
use yew::prelude::*;

use crate::app::api::ApiCtx;
use crate::app::hooks::use_query;
use crate::components::empty_state::{EmptyState, QueryStatus, query_error};
use crate::components::form::{SelectField, TextField, bind, field_error, spawn_write};
use crate::components::modal::{ConfirmDialog, Dialog, Modal, close, open};
use crate::core::validation::FieldErrors;
use crate::features::packages::api::{self as packages_api, packages_key};
use crate::features::subscriptions::api::{self, subscriptions_key};
use crate::features::subscriptions::state::{
    SubscriptionForm, display_date, newest_first, status_class,
};

#[derive(Properties, PartialEq)]
pub(crate) struct SubscriptionsPanelProps {
    pub company_id: Uuid,
}

#[function_component(SubscriptionsPanel)]
pub(crate) fn subscriptions_panel(props: &SubscriptionsPanelProps) -> Html {
    let company_id = props.company_id;
    let dialog = use_state(Dialog::<Subscription>::default);
    let busy = use_state(|| false);
    let api_ctx = use_context::<ApiCtx>();
    let snapshot = use_query(subscriptions_key(company_id), move |client| async move {
        api::list(&client, company_id).await
    });
    let Some(api_ctx) = api_ctx else {
        return html! { <div class="panel"><p class="muted">{"Missing API context."}</p></div> };
    };
    let subscriptions = snapshot
        .data
        .as_ref()
        .map(|page| newest_first(&page.data))
        .unwrap_or_default();

    let dialog_view = match &*dialog {
        Dialog::Closed => html! {},
        Dialog::Create | Dialog::Edit(_) => html! {
            <SubscriptionDialog {company_id} subscription={dialog.editing()} on_close={close(&dialog)} />
        },
        Dialog::Delete(subscription) => {
            let on_confirm = {
                let api_ctx = api_ctx.clone();
                let dialog = dialog.clone();
                let busy = busy.clone();
                let subscription_id = subscription.id;
                Callback::from(move |()| {
                    let api_ctx = api_ctx.clone();
                    let dialog = dialog.clone();
                    let write = {
                        let api_ctx = api_ctx.clone();
                        async move {
                            let client = api_ctx.api();
                            api_ctx
                                .mutate(&[subscriptions_key(company_id)], api::delete(&client, subscription_id))
                                .await
                        }
                    };
                    spawn_write(&busy, write, move |()| {
                        api_ctx.success("Subscription deleted successfully");
                        dialog.set(Dialog::Closed);
                    });
                })
            };
            html! {
                <ConfirmDialog
                    title="Delete subscription"
                    message="Delete this subscription?"
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
                    <p class="eyebrow">{"Billing"}</p>
                    <h3>{"Subscriptions"}</h3>
                </div>
                <button class="btn btn-primary btn-sm" onclick={open(&dialog, Dialog::Create)}>{"Add subscription"}</button>
            </div>
            <QueryStatus loading={snapshot.is_loading()} error={query_error(&snapshot)} />
            {if subscriptions.is_empty() && !snapshot.is_loading() {
                html! { <EmptyState title="No subscriptions" /> }
            } else {
                html! {
                    <table class="table">
                        <thead>
                            <tr>
                                <th>{"Package"}</th><th>{"Type"}</th><th>{"Start"}</th><th>{"End"}</th>
                                <th>{"Conversations"}</th><th>{"Status"}</th><th></th>
                            </tr>
                        </thead>
                        <tbody>
                            {for subscriptions.iter().map(|subscription| {
                                let limit = subscription
                                    .package
                                    .as_ref()
                                    .map_or_else(String::new, |package| format!(" / {}", package.conversations_limit));
                                html! {
                                    <tr key={subscription.id.to_string()}>
                                        <td>{subscription.package.as_ref().map(|package| package.name.clone()).unwrap_or_default()}</td>
                                        <td>{subscription.kind.as_str()}</td>
                                        <td>{display_date(Some(&subscription.start_date))}</td>
                                        <td>{display_date(subscription.end_date.as_ref())}</td>
                                        <td>{format!("{}{limit}", subscription.conversations_count)}</td>
                                        <td><span class={classes!("pill", status_class(&subscription.status))}>{subscription.status.clone()}</span></td>
                                        <td class="row-actions">
                                            <button class="btn btn-ghost btn-xs" onclick={open(&dialog, Dialog::Edit(subscription.clone()))}>{"Edit"}</button>
                                            <button class="btn btn-ghost btn-xs text-error" onclick={open(&dialog, Dialog::Delete(subscription.clone()))}>{"Delete"}</button>
                                        </td>
                                    </tr>
                                }
                            })}
                        </tbody>
                    </table>
                }
            }}
            {dialog_view}
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct SubscriptionDialogProps {
    company_id: Uuid,
    subscription: Option<Subscription>,
    on_close: Callback<()>,
}

#[function_component(SubscriptionDialog)]
fn subscription_dialog(props: &SubscriptionDialogProps) -> Html {
    let company_id = props.company_id;
    let api_ctx = use_context::<ApiCtx>();
    let form = {
        let subscription = props.subscription.clone();
        use_state(move || {
            subscription
                .as_ref()
                .map(SubscriptionForm::from_subscription)
                .unwrap_or_default()
        })
    };
    let errors = use_state(FieldErrors::default);
    let busy = use_state(|| false);
    let packages = use_query(packages_key(), |client| async move { packages_api::list(&client).await });
    let Some(api_ctx) = api_ctx else {
        return html! {};
    };
    let editing = props.subscription.as_ref().map(|subscription| subscription.id);

    let on_save = {
        let form = form.clone();
        let errors = errors.clone();
        let busy = busy.clone();
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| {
            let input = match form.validate(company_id) {
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
                    let keys = [subscriptions_key(company_id)];
                    match editing {
                        Some(subscription_id) => {
                            api_ctx.mutate(&keys, api::update(&client, subscription_id, &input)).await
                        }
                        None => api_ctx.mutate(&keys, api::create(&client, &input)).await,
                    }
                }
            };
            spawn_write(&busy, write, move |_| {
                api_ctx.success(if editing.is_some() {
                    "Subscription updated successfully"
                } else {
                    "Subscription created successfully"
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
    let package_options = packages
        .data
        .as_ref()
        .map(|page| {
            page.data
                .iter()
                .map(|package| (AttrValue::from(package.id.to_string()), AttrValue::from(package.name.clone())))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let type_options = [SubscriptionType::Basic, SubscriptionType::Premium]
        .iter()
        .map(|kind| (AttrValue::from(kind.as_str()), AttrValue::from(kind.as_str())))
        .collect::<Vec<_>>();

    html! {
        <Modal title={if editing.is_some() { "Edit subscription" } else { "Add subscription" }} on_close={props.on_close.clone()} {actions}>
            <SelectField label="Package" placeholder={Some(AttrValue::from("Choose a package"))}
                value={form.package_id.clone()} options={package_options} error={field_error(&errors, "package_id")}
                on_change={bind(&form, |form, value| form.package_id = value)} />
            <SelectField label="Type" value={form.kind.clone()} options={type_options} error={field_error(&errors, "type")}
                on_change={bind(&form, |form, value| form.kind = value)} />
            <div class="grid-2">
                <TextField label="Start date" input_type="date" value={form.start_date.clone()}
                    error={field_error(&errors, "start_date")}
                    on_input={bind(&form, |form, value| form.start_date = value)} />
                <TextField label="End date" input_type="date" value={form.end_date.clone()}
                    error={field_error(&errors, "end_date")}
                    on_input={bind(&form, |form, value| form.end_date = value)} />
            </div>
        </Modal>
    }
}
