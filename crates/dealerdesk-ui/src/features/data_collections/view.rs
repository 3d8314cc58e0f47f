//! Data collection panel and the entries screen.

use dealerdesk_api_models::{DataCollection, DataCollectionEntry};
use uuid::Uuid;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::app::Route;
use crate::app::api::ApiCtx;
use crate::app::hooks::use_query;
use crate::components::empty_state::{EmptyState, QueryStatus, query_error};
use crate::components::form::{
    FileField, SelectField, TextAreaField, TextField, bind, edit, field_error, pick_upload,
    spawn_write,
};
use crate::components::modal::{ConfirmDialog, Dialog, Modal, close, open};
use crate::core::cache::QueryKey;
use crate::core::validation::FieldErrors;
use crate::features::data_collections::api::{
    self, collection_key, collections_key, entries_key, export_file_name,
};
use crate::features::data_collections::state::{
    DataCollectionForm, EntryForm, EntryRow, ImportForm, ImportKind, format_key, format_value,
};
use crate::services::files::download;

const IMPORT_METHODS: [&str; 2] = ["GET", "POST"];

fn publish_callback(
    api_ctx: &ApiCtx,
    busy: &UseStateHandle<bool>,
    company_id: Uuid,
    collection_id: Uuid,
) -> Callback<MouseEvent> {
    let api_ctx = api_ctx.clone();
    let busy = busy.clone();
    Callback::from(move |_: MouseEvent| {
        let api_ctx = api_ctx.clone();
        let write = {
            let api_ctx = api_ctx.clone();
            async move {
                let client = api_ctx.api();
                api_ctx
                    .mutate(
                        &[collections_key(company_id), collection_key(company_id, collection_id)],
                        api::publish(&client, company_id, collection_id),
                    )
                    .await
            }
        };
        spawn_write(&busy, write, move |()| {
            api_ctx.success("Data Collection published successfully");
        });
    })
}

#[derive(Properties, PartialEq)]
pub(crate) struct DataCollectionsPanelProps {
    pub company_id: Uuid,
}

#[function_component(DataCollectionsPanel)]
pub(crate) fn data_collections_panel(props: &DataCollectionsPanelProps) -> Html {
    let company_id = props.company_id;
    let dialog = use_state(Dialog::<DataCollection>::default);
    let busy = use_state(|| false);
    let api_ctx = use_context::<ApiCtx>();
    let snapshot = use_query(collections_key(company_id), move |client| async move {
        api::list(&client, company_id).await
    });
    let Some(api_ctx) = api_ctx else {
        return html! { <div class="panel"><p class="muted">{"Missing API context."}</p></div> };
    };
    let collections = snapshot
        .data
        .as_ref()
        .map(|page| page.data.clone())
        .unwrap_or_default();

    let dialog_view = match &*dialog {
        Dialog::Closed => html! {},
        Dialog::Create | Dialog::Edit(_) => html! {
            <CollectionDialog {company_id} collection={dialog.editing()} on_close={close(&dialog)} />
        },
        Dialog::Delete(collection) => {
            let on_confirm = {
                let api_ctx = api_ctx.clone();
                let dialog = dialog.clone();
                let busy = busy.clone();
                let collection_id = collection.id;
                Callback::from(move |()| {
                    let api_ctx = api_ctx.clone();
                    let dialog = dialog.clone();
                    let write = {
                        let api_ctx = api_ctx.clone();
                        async move {
                            let client = api_ctx.api();
                            api_ctx
                                .mutate(
                                    &[collections_key(company_id)],
                                    api::delete(&client, company_id, collection_id),
                                )
                                .await
                        }
                    };
                    spawn_write(&busy, write, move |()| {
                        api_ctx.success("Data Collection deleted");
                        dialog.set(Dialog::Closed);
                    });
                })
            };
            html! {
                <ConfirmDialog
                    title="Delete data collection"
                    message={format!("Delete {} and all of its entries?", collection.name)}
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
                    <p class="eyebrow">{"Knowledge"}</p>
                    <h3>{"Data collections"}</h3>
                </div>
                <button class="btn btn-primary btn-sm" onclick={open(&dialog, Dialog::Create)}>{"Add collection"}</button>
            </div>
            <QueryStatus loading={snapshot.is_loading()} error={query_error(&snapshot)} />
            {if collections.is_empty() && !snapshot.is_loading() {
                html! { <EmptyState title="No data collections" /> }
            } else {
                html! {
                    <table class="table">
                        <thead><tr><th>{"Name"}</th><th>{"Tags"}</th><th>{"Status"}</th><th></th></tr></thead>
                        <tbody>
                            {for collections.iter().map(|collection| html! {
                                <tr key={collection.id.to_string()}>
                                    <td>
                                        <Link<Route> to={Route::DataCollectionEntries {
                                            company_id: company_id.to_string(),
                                            collection_id: collection.id.to_string(),
                                        }}>{collection.name.clone()}</Link<Route>>
                                    </td>
                                    <td>
                                        {for collection.tags.iter().map(|tag| html! { <span class="pill subtle">{tag.clone()}</span> })}
                                    </td>
                                    <td>
                                        {if collection.published {
                                            html! { <span class="pill success">{"Published"}</span> }
                                        } else {
                                            html! { <span class="pill subtle">{"Draft"}</span> }
                                        }}
                                    </td>
                                    <td class="row-actions">
                                        {if collection.published {
                                            html! {}
                                        } else {
                                            html! {
                                                <button class="btn btn-ghost btn-xs" disabled={*busy}
                                                    onclick={publish_callback(&api_ctx, &busy, company_id, collection.id)}>{"Publish"}</button>
                                            }
                                        }}
                                        <button class="btn btn-ghost btn-xs" onclick={open(&dialog, Dialog::Edit(collection.clone()))}>{"Edit"}</button>
                                        <button class="btn btn-ghost btn-xs text-error" onclick={open(&dialog, Dialog::Delete(collection.clone()))}>{"Delete"}</button>
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
struct CollectionDialogProps {
    company_id: Uuid,
    collection: Option<DataCollection>,
    on_close: Callback<()>,
}

#[function_component(CollectionDialog)]
fn collection_dialog(props: &CollectionDialogProps) -> Html {
    let company_id = props.company_id;
    let api_ctx = use_context::<ApiCtx>();
    let form = {
        let collection = props.collection.clone();
        use_state(move || {
            collection
                .as_ref()
                .map(DataCollectionForm::from_collection)
                .unwrap_or_default()
        })
    };
    let errors = use_state(FieldErrors::default);
    let busy = use_state(|| false);
    let Some(api_ctx) = api_ctx else {
        return html! {};
    };
    let editing = props.collection.as_ref().map(|collection| collection.id);

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
                        Some(collection_id) => {
                            api_ctx
                                .mutate(
                                    &[collections_key(company_id), collection_key(company_id, collection_id)],
                                    api::update(&client, company_id, collection_id, &input),
                                )
                                .await
                        }
                        None => api_ctx
                            .mutate(&[collections_key(company_id)], async {
                                api::create(&client, company_id, &input).await.map(drop)
                            })
                            .await,
                    }
                }
            };
            spawn_write(&busy, write, move |()| {
                api_ctx.success(if editing.is_some() {
                    "Data Collection updated"
                } else {
                    "Data Collection created"
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
        <Modal title={if editing.is_some() { "Edit data collection" } else { "Add data collection" }} on_close={props.on_close.clone()} {actions}>
            <TextField label="Name" value={form.name.clone()} error={field_error(&errors, "name")}
                on_input={bind(&form, |form, value| form.name = value)} />
            <TextField label="Tags" placeholder="cars, used, 2024" value={form.tags.clone()}
                on_input={bind(&form, |form, value| form.tags = value)} />
        </Modal>
    }
}

#[derive(Clone, PartialEq)]
enum EntriesDialog {
    Closed,
    Add,
    Import,
    Delete(Uuid),
}

#[derive(Properties, PartialEq)]
pub(crate) struct EntriesPageProps {
    pub company_id: Uuid,
    pub collection_id: Uuid,
}

/// `/companies/:cid/data-collections/:dcid/entries`.
#[function_component(DataCollectionEntriesPage)]
pub(crate) fn data_collection_entries_page(props: &EntriesPageProps) -> Html {
    let company_id = props.company_id;
    let collection_id = props.collection_id;
    let dialog = use_state(|| EntriesDialog::Closed);
    let selected = use_state(|| None as Option<Uuid>);
    let busy = use_state(|| false);
    let api_ctx = use_context::<ApiCtx>();
    let collection = use_query(collection_key(company_id, collection_id), move |client| async move {
        api::get(&client, company_id, collection_id).await
    });
    let entries = use_query(entries_key(company_id, collection_id), move |client| async move {
        api::entries(&client, company_id, collection_id).await
    });
    let Some(api_ctx) = api_ctx else {
        return html! { <div class="panel"><p class="muted">{"Missing API context."}</p></div> };
    };
    let Some(info) = collection.data.clone() else {
        return html! {
            <section class="page">
                <QueryStatus loading={collection.is_loading()} error={query_error(&collection)} />
            </section>
        };
    };
    let rows: Vec<DataCollectionEntry> = entries.data.as_deref().cloned().unwrap_or_default();
    let detail = (*selected)
        .and_then(|entry_id| rows.iter().find(|entry| entry.id == entry_id))
        .cloned();

    let set_dialog = |next: EntriesDialog| {
        let dialog = dialog.clone();
        Callback::from(move |_: MouseEvent| dialog.set(next.clone()))
    };
    let close_dialog = {
        let dialog = dialog.clone();
        Callback::from(move |()| dialog.set(EntriesDialog::Closed))
    };
    let on_export = {
        let api_ctx = api_ctx.clone();
        let busy = busy.clone();
        let file_name = export_file_name(&info);
        Callback::from(move |_: MouseEvent| {
            let api_ctx = api_ctx.clone();
            let file_name = file_name.clone();
            let write = {
                let api_ctx = api_ctx.clone();
                async move {
                    let client = api_ctx.api();
                    api_ctx
                        .mutate(&[], api::export_csv(&client, company_id, collection_id))
                        .await
                }
            };
            spawn_write(&busy, write, move |bytes: Vec<u8>| {
                if let Err(err) = download(&bytes, "text/csv", &file_name) {
                    tracing::warn!(error = %err, "csv export download failed");
                    api_ctx.error("Export failed");
                }
            });
        })
    };

    let dialog_view = match &*dialog {
        EntriesDialog::Closed => html! {},
        EntriesDialog::Add => html! {
            <AddEntryDialog {company_id} {collection_id} on_close={close_dialog.clone()} />
        },
        EntriesDialog::Import => html! {
            <ImportDialog {company_id} {collection_id} on_close={close_dialog.clone()} />
        },
        EntriesDialog::Delete(entry_id) => {
            let entry_id = *entry_id;
            let on_confirm = {
                let api_ctx = api_ctx.clone();
                let dialog = dialog.clone();
                let selected = selected.clone();
                let busy = busy.clone();
                Callback::from(move |()| {
                    let api_ctx = api_ctx.clone();
                    let dialog = dialog.clone();
                    let selected = selected.clone();
                    let write = {
                        let api_ctx = api_ctx.clone();
                        async move {
                            let client = api_ctx.api();
                            api_ctx
                                .mutate(
                                    &[entries_key(company_id, collection_id)],
                                    api::delete_entry(&client, company_id, collection_id, entry_id),
                                )
                                .await
                        }
                    };
                    spawn_write(&busy, write, move |()| {
                        api_ctx.success("Entry deleted");
                        selected.set(None);
                        dialog.set(EntriesDialog::Closed);
                    });
                })
            };
            html! {
                <ConfirmDialog
                    title="Delete entry"
                    message="Delete this entry?"
                    busy={*busy}
                    {on_confirm}
                    on_cancel={close_dialog.clone()}
                />
            }
        }
    };

    html! {
        <section class="page">
            <div class="panel">
                <div class="panel-head">
                    <div>
                        <p class="eyebrow">{"Data collection"}</p>
                        <h3>{info.name.clone()}</h3>
                        <p class="muted">{format!("{} entries", rows.len())}</p>
                    </div>
                    <div class="row-actions">
                        <button class="btn btn-ghost btn-sm" onclick={set_dialog(EntriesDialog::Add)}>{"Add entry"}</button>
                        <button class="btn btn-ghost btn-sm" onclick={set_dialog(EntriesDialog::Import)}>{"Import"}</button>
                        <button class="btn btn-ghost btn-sm" disabled={*busy} onclick={on_export}>{"Export CSV"}</button>
                        {if info.published {
                            html! { <span class="pill success">{"Published"}</span> }
                        } else {
                            html! {
                                <button class="btn btn-primary btn-sm" disabled={*busy}
                                    onclick={publish_callback(&api_ctx, &busy, company_id, collection_id)}>{"Publish"}</button>
                            }
                        }}
                    </div>
                </div>
                <QueryStatus loading={entries.is_loading()} error={query_error(&entries)} />
                {if rows.is_empty() && !entries.is_loading() {
                    html! { <EmptyState title="No entries yet" description={Some(AttrValue::from("Add entries by hand or import them."))} /> }
                } else {
                    html! {
                        <table class="table">
                            <thead>
                                <tr>
                                    <th></th><th>{"Make"}</th><th>{"Model"}</th><th>{"Body"}</th><th>{"Mileage"}</th>
                                    <th>{"Fuel"}</th><th>{"Power"}</th><th>{"Owners"}</th><th>{"Price"}</th><th>{"Category"}</th><th></th>
                                </tr>
                            </thead>
                            <tbody>
                                {for rows.iter().map(|entry| {
                                    let row = EntryRow::from_data(&entry.data);
                                    let entry_id = entry.id;
                                    let on_select = {
                                        let selected = selected.clone();
                                        Callback::from(move |_| selected.set(Some(entry_id)))
                                    };
                                    html! {
                                        <tr key={entry_id.to_string()} class={classes!((*selected == Some(entry_id)).then_some("active"))} onclick={on_select}>
                                            <td>{row.photo.map(|src| html! { <img class="thumb" {src} alt="" /> }).unwrap_or_default()}</td>
                                            <td>{row.make}</td>
                                            <td>{row.model}</td>
                                            <td>{row.body_type}</td>
                                            <td>{row.mileage}</td>
                                            <td>{row.fuel}</td>
                                            <td>{row.power}</td>
                                            <td>{row.previous_owners}</td>
                                            <td>{row.price}</td>
                                            <td>{row.category}</td>
                                            <td class="row-actions">
                                                <button class="btn btn-ghost btn-xs text-error" onclick={set_dialog(EntriesDialog::Delete(entry_id))}>{"Delete"}</button>
                                            </td>
                                        </tr>
                                    }
                                })}
                            </tbody>
                        </table>
                    }
                }}
            </div>
            {detail.map(|entry| html! {
                <div class="panel">
                    <h4>{"Entry details"}</h4>
                    <dl class="details">
                        {for entry.data.as_object().into_iter().flatten().map(|(key, value)| html! {
                            <>
                                <dt>{format_key(key)}</dt>
                                <dd>{format_value(value)}</dd>
                            </>
                        })}
                    </dl>
                </div>
            }).unwrap_or_default()}
            {dialog_view}
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct EntryDialogProps {
    company_id: Uuid,
    collection_id: Uuid,
    on_close: Callback<()>,
}

#[function_component(AddEntryDialog)]
fn add_entry_dialog(props: &EntryDialogProps) -> Html {
    let company_id = props.company_id;
    let collection_id = props.collection_id;
    let api_ctx = use_context::<ApiCtx>();
    let form = use_state(EntryForm::default);
    let errors = use_state(FieldErrors::default);
    let busy = use_state(|| false);
    let Some(api_ctx) = api_ctx else {
        return html! {};
    };

    let on_save = {
        let form = form.clone();
        let errors = errors.clone();
        let busy = busy.clone();
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| {
            let data = match form.validate() {
                Ok(data) => data,
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
                            &[entries_key(company_id, collection_id)],
                            api::add_entry(&client, company_id, collection_id, &data),
                        )
                        .await
                }
            };
            spawn_write(&busy, write, move |()| {
                api_ctx.success("Entry added");
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
            <button class="btn btn-primary btn-sm" disabled={*busy} onclick={on_save}>{"Add"}</button>
        </>
    };

    html! {
        <Modal title="Add entry" on_close={props.on_close.clone()} {actions}>
            <TextAreaField label="Entry (JSON object)" rows={12} value={form.json.clone()}
                error={field_error(&errors, "json")}
                on_input={bind(&form, |form, value| form.json = value)} />
        </Modal>
    }
}

#[function_component(ImportDialog)]
fn import_dialog(props: &EntryDialogProps) -> Html {
    let company_id = props.company_id;
    let collection_id = props.collection_id;
    let api_ctx = use_context::<ApiCtx>();
    let form = use_state(ImportForm::default);
    let errors = use_state(FieldErrors::default);
    let busy = use_state(|| false);
    let Some(api_ctx) = api_ctx else {
        return html! {};
    };

    let on_import = {
        let form = form.clone();
        let errors = errors.clone();
        let busy = busy.clone();
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| {
            let plan = match form.validate() {
                Ok(plan) => plan,
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
                    let keys: [QueryKey; 2] = [
                        entries_key(company_id, collection_id),
                        collection_key(company_id, collection_id),
                    ];
                    api_ctx
                        .mutate(&keys, api::import(&client, company_id, collection_id, plan))
                        .await
                }
            };
            spawn_write(&busy, write, move |()| {
                api_ctx.success("Import successful");
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
            <button class="btn btn-primary btn-sm" disabled={*busy} onclick={on_import}>{"Import"}</button>
        </>
    };
    let kind_options = vec![
        (AttrValue::from("api"), AttrValue::from("Remote API")),
        (AttrValue::from("file"), AttrValue::from("CSV file")),
    ];
    let method_options = IMPORT_METHODS
        .iter()
        .map(|method| (AttrValue::from(*method), AttrValue::from(*method)))
        .collect::<Vec<_>>();
    let header_errors = form.header_errors();
    let kind_value = match form.kind {
        ImportKind::Api => "api",
        ImportKind::File => "file",
    };

    let source = match form.kind {
        ImportKind::Api => html! {
            <>
                <TextField label="URL" placeholder="https://" value={form.url.clone()} error={field_error(&errors, "url")}
                    on_input={bind(&form, |form, value| form.url = value)} />
                <SelectField label="Method" value={form.method.clone()} options={method_options}
                    error={field_error(&errors, "method")}
                    on_change={bind(&form, |form, value| form.method = value)} />
                <fieldset class="stack">
                    <legend>{"Headers"}</legend>
                    {for form.headers.iter().enumerate().map(|(index, header)| {
                        let (key_error, value_error) = header_errors.get(index).copied().unwrap_or_default();
                        let remove = {
                            let form = form.clone();
                            Callback::from(move |_| edit(&form, |form| form.remove_header(index)))
                        };
                        html! {
                            <div class="grid-2 header-row">
                                <TextField label="Key" value={header.key.clone()} error={key_error.map(AttrValue::from)}
                                    on_input={bind(&form, move |form, value| form.headers[index].key = value)} />
                                <TextField label="Value" value={header.value.clone()} error={value_error.map(AttrValue::from)}
                                    on_input={bind(&form, move |form, value| form.headers[index].value = value)} />
                                <button class="btn btn-ghost btn-xs" aria-label="Remove header" onclick={remove}>{"✕"}</button>
                            </div>
                        }
                    })}
                    <button class="btn btn-ghost btn-xs" onclick={{
                        let form = form.clone();
                        Callback::from(move |_| edit(&form, ImportForm::add_header))
                    }}>{"Add header"}</button>
                </fieldset>
                <TextField label="Payload property" placeholder="data" value={form.payload_property.clone()}
                    on_input={bind(&form, |form, value| form.payload_property = value)} />
            </>
        },
        ImportKind::File => html! {
            <FileField label="CSV file" accept=".csv,text/csv"
                file_name={form.file.as_ref().map(|file| AttrValue::from(file.file_name.clone()))}
                error={field_error(&errors, "file")}
                on_pick={pick_upload(&form, |form, upload| form.file = Some(upload))} />
        },
    };

    html! {
        <Modal title="Import entries" on_close={props.on_close.clone()} {actions}>
            <SelectField label="Source" value={kind_value} options={kind_options}
                on_change={bind(&form, |form, value| {
                    form.kind = if value == "file" { ImportKind::File } else { ImportKind::Api };
                })} />
            {source}
        </Modal>
    }
}
