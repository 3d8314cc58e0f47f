//! Assistant list, dialog, and details screens.

use std::rc::Rc;

use dealerdesk_api_models::{Assistant, Page, Role};
use uuid::Uuid;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::use_store_value;

use crate::app::Route;
use crate::app::api::ApiCtx;
use crate::app::hooks::{use_query, use_query_with};
use crate::components::empty_state::{EmptyState, QueryStatus, query_error};
use crate::components::form::{
    CheckboxField, FileField, SelectField, TextField, bind, edit, field_error, pick_upload,
    spawn_write,
};
use crate::components::modal::{ConfirmDialog, Dialog, Modal, close, open};
use crate::core::http::Upload;
use crate::core::store::AuthStore;
use crate::core::validation::FieldErrors;
use crate::features::assistants::api::{
    self, AssistantSubmit, assistant_key, assistants_key, submit_saga,
};
use crate::features::assistants::state::{
    AssistantForm, LANGUAGES, PERSONALITIES, available_subscriptions, language_label,
};
use crate::features::data_collections::api::{self as collections_api, collections_key};
use crate::features::subscriptions::api::{self as subscriptions_api, subscriptions_key};
use crate::features::subscriptions::state::display_date;
use crate::features::virtual_offices::api::{self as offices_api, offices_key};
use crate::features::voices::api::{self as voices_api, voices_key};

fn uuid_options<T>(items: &[T], id: impl Fn(&T) -> Uuid, label: impl Fn(&T) -> String) -> Vec<(AttrValue, AttrValue)> {
    items
        .iter()
        .map(|item| (AttrValue::from(id(item).to_string()), AttrValue::from(label(item))))
        .collect()
}

fn uuid_value(id: Option<Uuid>) -> AttrValue {
    id.map(|id| AttrValue::from(id.to_string())).unwrap_or_default()
}

/// `/assistants`: the signed-in admin's own company.
#[function_component(AssistantsPage)]
pub(crate) fn assistants_page() -> Html {
    let auth = use_store_value::<AuthStore>();
    match auth.user().and_then(|user| user.company_id()) {
        Some(company_id) => html! {
            <section class="page"><AssistantsPanel {company_id} /></section>
        },
        None => html! {
            <section class="page">
                <EmptyState title="No company" description={Some(AttrValue::from("Your account is not linked to a company."))} />
            </section>
        },
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct AssistantsPanelProps {
    pub company_id: Uuid,
}

#[function_component(AssistantsPanel)]
pub(crate) fn assistants_panel(props: &AssistantsPanelProps) -> Html {
    let company_id = props.company_id;
    let dialog = use_state(Dialog::<Assistant>::default);
    let busy = use_state(|| false);
    let api_ctx = use_context::<ApiCtx>();
    let auth = use_store_value::<AuthStore>();
    let snapshot = use_query(assistants_key(company_id), move |client| async move {
        api::list(&client, company_id).await
    });
    let Some(api_ctx) = api_ctx else {
        return html! { <div class="panel"><p class="muted">{"Missing API context."}</p></div> };
    };
    let is_root = auth.role() == Some(Role::Root);
    let assistants = snapshot
        .data
        .as_ref()
        .map(|page| page.data.clone())
        .unwrap_or_default();

    let dialog_view = match &*dialog {
        Dialog::Closed => html! {},
        Dialog::Create | Dialog::Edit(_) => html! {
            <AssistantDialog {company_id} assistant={dialog.editing()} on_close={close(&dialog)} />
        },
        Dialog::Delete(assistant) => {
            let on_confirm = {
                let api_ctx = api_ctx.clone();
                let dialog = dialog.clone();
                let busy = busy.clone();
                let assistant_id = assistant.id;
                Callback::from(move |()| {
                    let api_ctx = api_ctx.clone();
                    let dialog = dialog.clone();
                    let write = {
                        let api_ctx = api_ctx.clone();
                        async move {
                            let client = api_ctx.api();
                            api_ctx
                                .mutate(
                                    &[assistants_key(company_id)],
                                    api::delete(&client, company_id, assistant_id),
                                )
                                .await
                        }
                    };
                    spawn_write(&busy, write, move |()| {
                        api_ctx.success("Assistant deleted successfully");
                        dialog.set(Dialog::Closed);
                    });
                })
            };
            html! {
                <ConfirmDialog
                    title="Delete assistant"
                    message={format!("Delete {}?", assistant.name)}
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
                    <p class="eyebrow">{"Chat"}</p>
                    <h3>{"Assistants"}</h3>
                </div>
                <button class="btn btn-primary btn-sm" onclick={open(&dialog, Dialog::Create)}>
                    {"Add assistant"}
                </button>
            </div>
            <QueryStatus loading={snapshot.is_loading()} error={query_error(&snapshot)} />
            {if assistants.is_empty() && !snapshot.is_loading() {
                html! { <EmptyState title="No assistants yet" /> }
            } else {
                html! {
                    <div class="card-grid">
                        {for assistants.iter().map(|assistant| {
                            let title = html! { <h4>{assistant.name.clone()}</h4> };
                            html! {
                                <article class="card" key={assistant.id.to_string()}>
                                    {assistant.icon_url.clone().map(|src| html! {
                                        <img class="assistant-icon" {src} alt="" />
                                    }).unwrap_or_default()}
                                    {if is_root {
                                        html! {
                                            <Link<Route> to={Route::AssistantDetails {
                                                company_id: company_id.to_string(),
                                                assistant_id: assistant.id.to_string(),
                                            }}>{title}</Link<Route>>
                                        }
                                    } else {
                                        title
                                    }}
                                    <div class="pill-row">
                                        {for assistant.supported_languages.iter().map(|code| html! {
                                            <span class="pill subtle">{language_label(code)}</span>
                                        })}
                                    </div>
                                    <div class="row-actions">
                                        <button class="btn btn-ghost btn-xs" onclick={open(&dialog, Dialog::Edit(assistant.clone()))}>{"Edit"}</button>
                                        <button class="btn btn-ghost btn-xs text-error" onclick={open(&dialog, Dialog::Delete(assistant.clone()))}>{"Delete"}</button>
                                    </div>
                                </article>
                            }
                        })}
                    </div>
                }
            }}
            {dialog_view}
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct AssistantDialogProps {
    company_id: Uuid,
    assistant: Option<Assistant>,
    on_close: Callback<()>,
}

#[derive(Clone, PartialEq)]
struct AssistantDraft {
    form: AssistantForm,
    icon: Option<Upload>,
}

#[function_component(AssistantDialog)]
fn assistant_dialog(props: &AssistantDialogProps) -> Html {
    let company_id = props.company_id;
    let api_ctx = use_context::<ApiCtx>();
    let auth = use_store_value::<AuthStore>();
    let is_root = auth.role() == Some(Role::Root);
    let draft = {
        let assistant = props.assistant.clone();
        use_state(move || AssistantDraft {
            form: assistant
                .as_ref()
                .map(AssistantForm::from_assistant)
                .unwrap_or_default(),
            icon: None,
        })
    };
    let errors = use_state(FieldErrors::default);
    let busy = use_state(|| false);
    let voices = use_query(voices_key(), |client| async move { voices_api::list(&client).await });
    let offices = use_query(offices_key(company_id), move |client| async move {
        offices_api::list(&client, company_id).await
    });
    let collections = use_query(collections_key(company_id), move |client| async move {
        collections_api::list(&client, company_id).await
    });
    let subscriptions = use_query_with(subscriptions_key(company_id), is_root, move |client| async move {
        subscriptions_api::list(&client, company_id).await
    });
    let assistants = use_query(assistants_key(company_id), move |client| async move {
        api::list(&client, company_id).await
    });
    let Some(api_ctx) = api_ctx else {
        return html! {};
    };
    let existing = props.assistant.clone();
    let editing = existing.as_ref().map(|assistant| assistant.id);

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
            let mut ctx = AssistantSubmit::new(
                api_ctx.api(),
                company_id,
                existing.as_ref(),
                input,
                draft.icon.clone(),
                &draft.form.voice_ids(),
                draft.form.data_collection_id,
            );
            let api_ctx = api_ctx.clone();
            let on_close = on_close.clone();
            let write = {
                let api_ctx = api_ctx.clone();
                async move {
                    let mut keys = vec![assistants_key(company_id)];
                    keys.extend(editing.map(|assistant_id| assistant_key(company_id, assistant_id)));
                    api_ctx.submit(&submit_saga(), &mut ctx, &keys).await
                }
            };
            spawn_write(&busy, write, move |()| {
                api_ctx.success(if editing.is_some() {
                    "Assistant updated successfully"
                } else {
                    "Assistant created successfully"
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
    let personality_options = PERSONALITIES
        .iter()
        .map(|(value, label)| (AttrValue::from(*value), AttrValue::from(*label)))
        .collect::<Vec<_>>();
    let office_options = offices
        .data
        .as_ref()
        .map(|page| uuid_options(&page.data, |office| office.id, |office| office.name.clone()))
        .unwrap_or_default();
    let collection_options = collections
        .data
        .as_ref()
        .map(|page| uuid_options(&page.data, |dc| dc.id, |dc| dc.name.clone()))
        .unwrap_or_default();
    let all_voices: Rc<Page<_>> = voices.data.clone().unwrap_or_default();
    let selected_ids = form.voice_ids();
    let voice_options = all_voices
        .data
        .iter()
        .filter(|voice| form.supported_languages.contains(&voice.language))
        .filter(|voice| !selected_ids.contains(&voice.id))
        .map(|voice| (AttrValue::from(voice.id.to_string()), AttrValue::from(voice.picker_label())))
        .collect::<Vec<_>>();
    let subscription_options = match (&subscriptions.data, &assistants.data) {
        (Some(subscriptions), Some(assistants)) => {
            available_subscriptions(&subscriptions.data, &assistants.data, editing)
                .into_iter()
                .map(|subscription| {
                    let package = subscription
                        .package
                        .as_ref()
                        .map_or_else(String::new, |package| package.name.clone());
                    (
                        AttrValue::from(subscription.id.to_string()),
                        AttrValue::from(format!(
                            "{package} ({}) from {}",
                            subscription.kind.as_str(),
                            display_date(Some(&subscription.start_date))
                        )),
                    )
                })
                .collect::<Vec<_>>()
        }
        _ => Vec::new(),
    };

    let on_pick_voice = {
        let draft = draft.clone();
        let all_voices = Rc::clone(&all_voices);
        Callback::from(move |value: String| {
            let picked = all_voices
                .data
                .iter()
                .find(|voice| voice.id.to_string() == value)
                .cloned();
            if let Some(voice) = picked {
                edit(&draft, |draft| draft.form.pick_voice(voice));
            }
        })
    };

    html! {
        <Modal title={if editing.is_some() { "Edit assistant" } else { "Add assistant" }} on_close={props.on_close.clone()} {actions}>
            <TextField label="Name" value={form.name.clone()} error={field_error(&errors, "name")}
                on_input={bind(&draft, |draft, value| draft.form.name = value)} />
            <SelectField label="Personality" placeholder={Some(AttrValue::from("None"))}
                value={form.personality.clone().unwrap_or_default()} options={personality_options}
                on_change={bind(&draft, |draft, value| draft.form.personality = (!value.is_empty()).then_some(value))} />
            <fieldset class="stack">
                <legend>{"Languages"}</legend>
                {for LANGUAGES.iter().map(|(code, label)| html! {
                    <CheckboxField
                        label={*label}
                        checked={form.supported_languages.iter().any(|lang| lang == *code)}
                        on_toggle={{
                            let draft = draft.clone();
                            Callback::from(move |_| edit(&draft, |draft| draft.form.toggle_language(code)))
                        }}
                    />
                })}
            </fieldset>
            <fieldset class="stack">
                <legend>{"Voices"}</legend>
                <div class="pill-row">
                    {for form.voices.iter().map(|voice| {
                        let voice_id = voice.id;
                        let remove = {
                            let draft = draft.clone();
                            Callback::from(move |_| edit(&draft, |draft| draft.form.remove_voice(voice_id)))
                        };
                        html! {
                            <span class="pill subtle" key={voice_id.to_string()}>
                                {voice.picker_label()}
                                <button class="btn btn-ghost btn-xs" aria-label="Remove voice" onclick={remove}>{"✕"}</button>
                            </span>
                        }
                    })}
                </div>
                <SelectField label="Add voice" placeholder={Some(AttrValue::from("Choose a voice"))}
                    value="" options={voice_options} on_change={on_pick_voice} />
            </fieldset>
            <SelectField label="Virtual office" placeholder={Some(AttrValue::from("None"))}
                value={uuid_value(form.virtual_office_id)} options={office_options}
                on_change={bind(&draft, |draft, value| draft.form.virtual_office_id = Uuid::parse_str(&value).ok())} />
            <SelectField label="Data collection" placeholder={Some(AttrValue::from("None"))}
                value={uuid_value(form.data_collection_id)} options={collection_options}
                on_change={bind(&draft, |draft, value| draft.form.data_collection_id = Uuid::parse_str(&value).ok())} />
            <TextField label="Message limit per user" input_type="number" value={form.user_message_limit.clone()}
                error={field_error(&errors, "user_message_limit")}
                on_input={bind(&draft, |draft, value| draft.form.user_message_limit = value)} />
            {if is_root {
                html! {
                    <SelectField label="Subscription" placeholder={Some(AttrValue::from("None"))}
                        value={uuid_value(form.subscription_id)} options={subscription_options}
                        on_change={bind(&draft, |draft, value| draft.form.subscription_id = Uuid::parse_str(&value).ok())} />
                }
            } else {
                html! {}
            }}
            <CheckboxField label="Text to speech" checked={form.use_tts}
                on_toggle={{
                    let draft = draft.clone();
                    Callback::from(move |checked| edit(&draft, |draft| draft.form.use_tts = checked))
                }} />
            <FileField label="Icon" accept="image/*"
                file_name={draft.icon.as_ref().map(|icon| AttrValue::from(icon.file_name.clone()))}
                on_pick={pick_upload(&draft, |draft, upload| draft.icon = Some(upload))} />
        </Modal>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct AssistantDetailsProps {
    pub company_id: Uuid,
    pub assistant_id: Uuid,
}

/// `/companies/:cid/assistants/:aid`.
#[function_component(AssistantDetailsPage)]
pub(crate) fn assistant_details_page(props: &AssistantDetailsProps) -> Html {
    let company_id = props.company_id;
    let assistant_id = props.assistant_id;
    let editing = use_state(|| false);
    let snapshot = use_query(assistant_key(company_id, assistant_id), move |client| async move {
        api::get(&client, company_id, assistant_id).await
    });
    let voices = use_query(
        assistant_key(company_id, assistant_id).with("voices"),
        move |client| async move { api::voices(&client, company_id, assistant_id).await },
    );
    let Some(assistant) = snapshot.data.clone() else {
        return html! {
            <section class="page">
                <QueryStatus loading={snapshot.is_loading()} error={query_error(&snapshot)} />
            </section>
        };
    };
    let open_edit = {
        let editing = editing.clone();
        Callback::from(move |_| editing.set(true))
    };
    let on_close = {
        let editing = editing.clone();
        Callback::from(move |()| editing.set(false))
    };
    let attached = voices
        .data
        .as_ref()
        .map(|page| page.data.clone())
        .unwrap_or_default();
    let limit = assistant
        .user_message_limit
        .map_or_else(|| "Unlimited".to_string(), |limit| limit.to_string());

    html! {
        <section class="page">
            <div class="panel">
                <div class="panel-head">
                    <div>
                        <p class="eyebrow">{"Assistant"}</p>
                        <h3>{assistant.name.clone()}</h3>
                    </div>
                    <div class="row-actions">
                        <Link<Route> classes={classes!("btn", "btn-ghost", "btn-sm")} to={Route::CompanyDetails { id: company_id.to_string() }}>
                            {"Back to company"}
                        </Link<Route>>
                        <button class="btn btn-primary btn-sm" onclick={open_edit}>{"Edit"}</button>
                    </div>
                </div>
                <dl class="details">
                    <dt>{"Personality"}</dt>
                    <dd>{assistant.personality.clone().unwrap_or_else(|| "-".to_string())}</dd>
                    <dt>{"Languages"}</dt>
                    <dd>{assistant.supported_languages.iter().map(String::as_str).map(language_label).collect::<Vec<_>>().join(", ")}</dd>
                    <dt>{"Data collection"}</dt>
                    <dd>{assistant.data_collection.as_ref().and_then(|dc| dc.name.clone()).unwrap_or_else(|| "-".to_string())}</dd>
                    <dt>{"Message limit"}</dt>
                    <dd>{limit}</dd>
                    <dt>{"Text to speech"}</dt>
                    <dd>{if assistant.use_tts { "On" } else { "Off" }}</dd>
                </dl>
            </div>
            <div class="panel">
                <h4>{"Voices"}</h4>
                <QueryStatus loading={voices.is_loading()} error={query_error(&voices)} />
                <ul class="stack">
                    {for attached.iter().map(|voice| html! {
                        <li key={voice.id.to_string()}>{voice.picker_label()}</li>
                    })}
                </ul>
            </div>
            {if *editing {
                html! { <AssistantDialog {company_id} assistant={Some((*assistant).clone())} {on_close} /> }
            } else {
                html! {}
            }}
        </section>
    }
}
