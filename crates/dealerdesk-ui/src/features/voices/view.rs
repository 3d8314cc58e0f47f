//! `/voices`: voice catalogue with add, edit and delete.

use dealerdesk_api_models::{Gender, Voice};
use yew::prelude::*;

use crate::app::api::ApiCtx;
use crate::app::hooks::use_query;
use crate::components::empty_state::{EmptyState, QueryStatus, query_error};
use crate::components::form::{SelectField, TextField, bind, field_error, spawn_write};
use crate::components::modal::{ConfirmDialog, Dialog, Modal, close, open};
use crate::core::validation::FieldErrors;
use crate::features::assistants::state::{LANGUAGES, language_label};
use crate::features::voices::api::{self, voices_key};
use crate::features::voices::state::VoiceForm;

#[function_component(VoicesPage)]
pub(crate) fn voices_page() -> Html {
    let dialog = use_state(Dialog::<Voice>::default);
    let busy = use_state(|| false);
    let api_ctx = use_context::<ApiCtx>();
    let snapshot = use_query(voices_key(), |client| async move { api::list(&client).await });
    let Some(api_ctx) = api_ctx else {
        return html! { <div class="panel"><p class="muted">{"Missing API context."}</p></div> };
    };
    let voices = snapshot
        .data
        .as_ref()
        .map(|page| page.data.clone())
        .unwrap_or_default();

    let dialog_view = match &*dialog {
        Dialog::Closed => html! {},
        Dialog::Create | Dialog::Edit(_) => html! {
            <VoiceDialog voice={dialog.editing()} on_close={close(&dialog)} />
        },
        Dialog::Delete(voice) => {
            let on_confirm = {
                let api_ctx = api_ctx.clone();
                let dialog = dialog.clone();
                let busy = busy.clone();
                let voice_id = voice.id;
                Callback::from(move |()| {
                    let api_ctx = api_ctx.clone();
                    let dialog = dialog.clone();
                    let write = {
                        let api_ctx = api_ctx.clone();
                        async move {
                            let client = api_ctx.api();
                            api_ctx.mutate(&[voices_key()], api::delete(&client, voice_id)).await
                        }
                    };
                    spawn_write(&busy, write, move |()| {
                        api_ctx.success("Voice deleted successfully");
                        dialog.set(Dialog::Closed);
                    });
                })
            };
            html! {
                <ConfirmDialog
                    title="Delete voice"
                    message={format!("Delete {}? Assistants using it lose the voice.", voice.picker_label())}
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
                        <h3>{"Voices"}</h3>
                    </div>
                    <button class="btn btn-primary btn-sm" onclick={open(&dialog, Dialog::Create)}>{"Add voice"}</button>
                </div>
                <QueryStatus loading={snapshot.is_loading()} error={query_error(&snapshot)} />
                {if voices.is_empty() && !snapshot.is_loading() {
                    html! { <EmptyState title="No voices yet" /> }
                } else {
                    html! {
                        <table class="table">
                            <thead>
                                <tr>
                                    <th>{"Name"}</th><th>{"Language"}</th><th>{"Gender"}</th>
                                    <th>{"Pitch"}</th><th>{"Rate"}</th><th>{"Provider"}</th><th></th>
                                </tr>
                            </thead>
                            <tbody>
                                {for voices.iter().map(|voice| html! {
                                    <tr key={voice.id.to_string()}>
                                        <td>{voice.display_name.clone().unwrap_or_else(|| voice.name.clone())}</td>
                                        <td>{language_label(&voice.language)}</td>
                                        <td>{voice.gender.map(Gender::as_str).unwrap_or("-")}</td>
                                        <td>{voice.pitch.to_string()}</td>
                                        <td>{voice.speaking_rate.to_string()}</td>
                                        <td class="muted">{voice.provider.clone().unwrap_or_default()}</td>
                                        <td class="row-actions">
                                            <button class="btn btn-ghost btn-xs" onclick={open(&dialog, Dialog::Edit(voice.clone()))}>{"Edit"}</button>
                                            <button class="btn btn-ghost btn-xs text-error" onclick={open(&dialog, Dialog::Delete(voice.clone()))}>{"Delete"}</button>
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
struct VoiceDialogProps {
    voice: Option<Voice>,
    on_close: Callback<()>,
}

#[function_component(VoiceDialog)]
fn voice_dialog(props: &VoiceDialogProps) -> Html {
    let api_ctx = use_context::<ApiCtx>();
    let form = {
        let voice = props.voice.clone();
        use_state(move || voice.as_ref().map(VoiceForm::from_voice).unwrap_or_default())
    };
    let errors = use_state(FieldErrors::default);
    let busy = use_state(|| false);
    let Some(api_ctx) = api_ctx else {
        return html! {};
    };
    let editing = props.voice.as_ref().map(|voice| voice.id);

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
                        Some(voice_id) => {
                            api_ctx.mutate(&[voices_key()], api::update(&client, voice_id, &input)).await
                        }
                        None => api_ctx.mutate(&[voices_key()], api::create(&client, &input)).await,
                    }
                }
            };
            spawn_write(&busy, write, move |_| {
                api_ctx.success(if editing.is_some() {
                    "Voice successfully updated"
                } else {
                    "Voice successfully created"
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
    let language_options = LANGUAGES
        .iter()
        .map(|(code, label)| (AttrValue::from(*code), AttrValue::from(*label)))
        .collect::<Vec<_>>();
    let gender_options = [Gender::Male, Gender::Female]
        .iter()
        .map(|gender| (AttrValue::from(gender.as_str()), AttrValue::from(gender.as_str())))
        .collect::<Vec<_>>();

    html! {
        <Modal title={if editing.is_some() { "Edit voice" } else { "Add voice" }} on_close={props.on_close.clone()} {actions}>
            <TextField label="Name" value={form.name.clone()} error={field_error(&errors, "name")}
                on_input={bind(&form, |form, value| form.name = value)} />
            <SelectField label="Language" placeholder={Some(AttrValue::from("Choose a language"))}
                value={form.language.clone()} options={language_options} error={field_error(&errors, "language")}
                on_change={bind(&form, |form, value| form.language = value)} />
            <SelectField label="Gender" placeholder={Some(AttrValue::from("Choose a gender"))}
                value={form.gender.clone()} options={gender_options} error={field_error(&errors, "gender")}
                on_change={bind(&form, |form, value| form.gender = value)} />
            <div class="grid-2">
                <TextField label="Pitch" input_type="number" value={form.pitch.clone()} error={field_error(&errors, "pitch")}
                    on_input={bind(&form, |form, value| form.pitch = value)} />
                <TextField label="Speaking rate" input_type="number" value={form.speaking_rate.clone()}
                    error={field_error(&errors, "speaking_rate")}
                    on_input={bind(&form, |form, value| form.speaking_rate = value)} />
            </div>
            <TextField label="Provider" value={form.provider.clone()}
                on_input={bind(&form, |form, value| form.provider = value)} />
        </Modal>
    }
}
