//! Feature catalogue page and the company feature-pricing panel.

use dealerdesk_api_models::{BillingType, CompanyFeature, Feature};
use uuid::Uuid;
use yew::prelude::*;

use crate::app::api::ApiCtx;
use crate::app::hooks::use_query;
use crate::components::empty_state::{EmptyState, QueryStatus, query_error};
use crate::components::form::{SelectField, TextAreaField, TextField, bind, field_error, spawn_write};
use crate::components::modal::{ConfirmDialog, Dialog, Modal, close, open};
use crate::core::validation::FieldErrors;
use crate::features::product_features::api::{self, feature_prices_key, features_key};
use crate::features::product_features::state::{CompanyFeatureForm, FeatureForm};

#[function_component(FeaturesPage)]
pub(crate) fn features_page() -> Html {
    let dialog = use_state(Dialog::<Feature>::default);
    let busy = use_state(|| false);
    let api_ctx = use_context::<ApiCtx>();
    let snapshot = use_query(features_key(), |client| async move { api::list(&client).await });
    let Some(api_ctx) = api_ctx else {
        return html! { <div class="panel"><p class="muted">{"Missing API context."}</p></div> };
    };
    let features = snapshot
        .data
        .as_ref()
        .map(|page| page.data.clone())
        .unwrap_or_default();

    let dialog_view = match &*dialog {
        Dialog::Closed => html! {},
        Dialog::Create | Dialog::Edit(_) => html! {
            <FeatureDialog feature={dialog.editing()} on_close={close(&dialog)} />
        },
        Dialog::Delete(feature) => {
            let on_confirm = {
                let api_ctx = api_ctx.clone();
                let dialog = dialog.clone();
                let busy = busy.clone();
                let feature_id = feature.id;
                Callback::from(move |()| {
                    let api_ctx = api_ctx.clone();
                    let dialog = dialog.clone();
                    let write = {
                        let api_ctx = api_ctx.clone();
                        async move {
                            let client = api_ctx.api();
                            api_ctx.mutate(&[features_key()], api::delete(&client, feature_id)).await
                        }
                    };
                    spawn_write(&busy, write, move |()| {
                        api_ctx.success("Feature deleted successfully");
                        dialog.set(Dialog::Closed);
                    });
                })
            };
            html! {
                <ConfirmDialog
                    title="Delete feature"
                    message={format!("Delete {}?", feature.name)}
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
                        <p class="eyebrow">{"Catalogue"}</p>
                        <h3>{"Features"}</h3>
                    </div>
                    <button class="btn btn-primary btn-sm" onclick={open(&dialog, Dialog::Create)}>{"Add feature"}</button>
                </div>
                <QueryStatus loading={snapshot.is_loading()} error={query_error(&snapshot)} />
                {if features.is_empty() && !snapshot.is_loading() {
                    html! { <EmptyState title="No features yet" /> }
                } else {
                    html! {
                        <table class="table">
                            <thead><tr><th>{"Name"}</th><th>{"Description"}</th><th></th></tr></thead>
                            <tbody>
                                {for features.iter().map(|feature| html! {
                                    <tr key={feature.id.to_string()}>
                                        <td>{feature.name.clone()}</td>
                                        <td class="muted">{feature.description.clone().unwrap_or_default()}</td>
                                        <td class="row-actions">
                                            <button class="btn btn-ghost btn-xs" onclick={open(&dialog, Dialog::Edit(feature.clone()))}>{"Edit"}</button>
                                            <button class="btn btn-ghost btn-xs text-error" onclick={open(&dialog, Dialog::Delete(feature.clone()))}>{"Delete"}</button>
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
struct FeatureDialogProps {
    feature: Option<Feature>,
    on_close: Callback<()>,
}

#[function_component(FeatureDialog)]
fn feature_dialog(props: &FeatureDialogProps) -> Html {
    let api_ctx = use_context::<ApiCtx>();
    let form = {
        let feature = props.feature.clone();
        use_state(move || feature.as_ref().map(FeatureForm::from_feature).unwrap_or_default())
    };
    let errors = use_state(FieldErrors::default);
    let busy = use_state(|| false);
    let Some(api_ctx) = api_ctx else {
        return html! {};
    };
    let editing = props.feature.as_ref().map(|feature| feature.id);

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
                        Some(feature_id) => {
                            api_ctx
                                .mutate(&[features_key()], api::update(&client, feature_id, &input))
                                .await
                        }
                        None => api_ctx.mutate(&[features_key()], api::create(&client, &input)).await,
                    }
                }
            };
            spawn_write(&busy, write, move |_| {
                api_ctx.success(if editing.is_some() {
                    "Feature updated successfully"
                } else {
                    "Feature created successfully"
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
        <Modal title={if editing.is_some() { "Edit feature" } else { "Add feature" }} on_close={props.on_close.clone()} {actions}>
            <TextField label="Name" value={form.name.clone()} error={field_error(&errors, "name")}
                on_input={bind(&form, |form, value| form.name = value)} />
            <TextAreaField label="Description" value={form.description.clone()}
                on_input={bind(&form, |form, value| form.description = value)} />
        </Modal>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct CompanyFeaturesPanelProps {
    pub company_id: Uuid,
}

/// Features enabled for a company with their billing terms.
#[function_component(CompanyFeaturesPanel)]
pub(crate) fn company_features_panel(props: &CompanyFeaturesPanelProps) -> Html {
    let company_id = props.company_id;
    let dialog = use_state(Dialog::<CompanyFeature>::default);
    let busy = use_state(|| false);
    let api_ctx = use_context::<ApiCtx>();
    let snapshot = use_query(feature_prices_key(company_id), move |client| async move {
        api::company_prices(&client, company_id).await
    });
    let catalogue = use_query(features_key(), |client| async move { api::list(&client).await });
    let Some(api_ctx) = api_ctx else {
        return html! { <div class="panel"><p class="muted">{"Missing API context."}</p></div> };
    };
    let prices = snapshot
        .data
        .as_ref()
        .map(|page| page.data.clone())
        .unwrap_or_default();
    let features = catalogue
        .data
        .as_ref()
        .map(|page| page.data.clone())
        .unwrap_or_default();
    let feature_name = |price: &CompanyFeature| {
        price
            .feature
            .as_ref()
            .or_else(|| features.iter().find(|feature| feature.id == price.feature_id))
            .map_or_else(|| price.feature_id.to_string(), |feature| feature.name.clone())
    };

    let dialog_view = match &*dialog {
        Dialog::Closed => html! {},
        Dialog::Create | Dialog::Edit(_) => html! {
            <CompanyFeatureDialog {company_id} price={dialog.editing()} features={features.clone()} on_close={close(&dialog)} />
        },
        Dialog::Delete(price) => {
            let on_confirm = {
                let api_ctx = api_ctx.clone();
                let dialog = dialog.clone();
                let busy = busy.clone();
                let feature_id = price.feature_id;
                Callback::from(move |()| {
                    let api_ctx = api_ctx.clone();
                    let dialog = dialog.clone();
                    let write = {
                        let api_ctx = api_ctx.clone();
                        async move {
                            let client = api_ctx.api();
                            api_ctx
                                .mutate(
                                    &[feature_prices_key(company_id)],
                                    api::remove_company_feature(&client, company_id, feature_id),
                                )
                                .await
                        }
                    };
                    spawn_write(&busy, write, move |()| {
                        api_ctx.success("Feature successfully deleted.");
                        dialog.set(Dialog::Closed);
                    });
                })
            };
            html! {
                <ConfirmDialog
                    title="Remove feature"
                    message={format!("Remove {} from this company?", feature_name(price))}
                    confirm_label="Remove"
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
                    <h3>{"Features"}</h3>
                </div>
                <button class="btn btn-primary btn-sm" onclick={open(&dialog, Dialog::Create)}>{"Add feature"}</button>
            </div>
            <QueryStatus loading={snapshot.is_loading()} error={query_error(&snapshot)} />
            {if prices.is_empty() && !snapshot.is_loading() {
                html! { <EmptyState title="No features enabled" /> }
            } else {
                html! {
                    <table class="table">
                        <thead><tr><th>{"Feature"}</th><th>{"Price"}</th><th>{"Billing"}</th><th>{"Prepaid amount"}</th><th></th></tr></thead>
                        <tbody>
                            {for prices.iter().map(|price| html! {
                                <tr key={price.feature_id.to_string()}>
                                    <td>{feature_name(price)}</td>
                                    <td>{format!("{:.2}", price.price)}</td>
                                    <td><span class="pill subtle">{price.billing_type.as_str()}</span></td>
                                    <td>{price.prepaid_amount.map_or_else(|| "-".to_string(), |amount| format!("{amount:.2}"))}</td>
                                    <td class="row-actions">
                                        <button class="btn btn-ghost btn-xs" onclick={open(&dialog, Dialog::Edit(price.clone()))}>{"Edit"}</button>
                                        <button class="btn btn-ghost btn-xs text-error" onclick={open(&dialog, Dialog::Delete(price.clone()))}>{"Remove"}</button>
                                    </td>
                                </tr>
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
struct CompanyFeatureDialogProps {
    company_id: Uuid,
    price: Option<CompanyFeature>,
    features: Vec<Feature>,
    on_close: Callback<()>,
}

#[function_component(CompanyFeatureDialog)]
fn company_feature_dialog(props: &CompanyFeatureDialogProps) -> Html {
    let company_id = props.company_id;
    let api_ctx = use_context::<ApiCtx>();
    let form = {
        let price = props.price.clone();
        use_state(move || {
            price.as_ref().map_or_else(
                || CompanyFeatureForm {
                    billing_type: BillingType::Postpaid.as_str().to_string(),
                    ..CompanyFeatureForm::default()
                },
                CompanyFeatureForm::from_price,
            )
        })
    };
    let errors = use_state(FieldErrors::default);
    let busy = use_state(|| false);
    let Some(api_ctx) = api_ctx else {
        return html! {};
    };
    let editing = props.price.is_some();

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
                    api_ctx
                        .mutate(
                            &[feature_prices_key(company_id)],
                            api::set_company_price(&client, company_id, &input),
                        )
                        .await
                }
            };
            spawn_write(&busy, write, move |()| {
                api_ctx.success("Feature successfully updated.");
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
    let feature_options = props
        .features
        .iter()
        .map(|feature| (AttrValue::from(feature.id.to_string()), AttrValue::from(feature.name.clone())))
        .collect::<Vec<_>>();
    let billing_options = [BillingType::Prepaid, BillingType::Postpaid]
        .iter()
        .map(|kind| (AttrValue::from(kind.as_str()), AttrValue::from(kind.as_str())))
        .collect::<Vec<_>>();

    html! {
        <Modal title={if editing { "Edit feature price" } else { "Add feature" }} on_close={props.on_close.clone()} {actions}>
            {if editing {
                html! {}
            } else {
                html! {
                    <SelectField label="Feature" placeholder={Some(AttrValue::from("Choose a feature"))}
                        value={form.feature_id.clone()} options={feature_options} error={field_error(&errors, "feature_id")}
                        on_change={bind(&form, |form, value| form.feature_id = value)} />
                }
            }}
            <TextField label="Price" input_type="number" value={form.price.clone()} error={field_error(&errors, "price")}
                on_input={bind(&form, |form, value| form.price = value)} />
            <SelectField label="Billing type" value={form.billing_type.clone()} options={billing_options}
                error={field_error(&errors, "billing_type")}
                on_change={bind(&form, |form, value| form.billing_type = value)} />
            {if form.is_prepaid() {
                html! {
                    <TextField label="Prepaid amount" input_type="number" value={form.prepaid_amount.clone()}
                        error={field_error(&errors, "prepaid_amount")}
                        on_input={bind(&form, |form, value| form.prepaid_amount = value)} />
                }
            } else {
                html! {}
            }}
        </Modal>
    }
}
