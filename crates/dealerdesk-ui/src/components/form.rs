//! Labelled form controls and the state-edit helper shared by every dialog.
//!
//! # Design
//! - Controls are dumb: value in, `Callback<String>` out, optional error text.
//! - Form structs stay in feature `state` modules; views edit them via [`edit`].

use std::future::Future;

use gloo::file::File;
use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::core::validation::FieldErrors;
use crate::core::http::Upload;
use crate::services::files::{first_file, read_upload};

/// Clone the state, apply `update`, and store the result.
pub(crate) fn edit<T: Clone>(state: &UseStateHandle<T>, update: impl FnOnce(&mut T)) {
    let mut next = (**state).clone();
    update(&mut next);
    state.set(next);
}

/// Message for `field`, ready for a control's `error` prop.
pub(crate) fn field_error(errors: &FieldErrors, field: &str) -> Option<AttrValue> {
    errors
        .get(field)
        .map(|message| AttrValue::from(message.to_string()))
}

/// Callback that writes the new control value into a form field.
pub(crate) fn bind<T: Clone + 'static>(
    state: &UseStateHandle<T>,
    apply: impl Fn(&mut T, String) + 'static,
) -> Callback<String> {
    let state = state.clone();
    Callback::from(move |value: String| edit(&state, |form| apply(form, value)))
}

/// Run `write` with `busy` raised, handing a successful value to `on_success`.
///
/// Failures were already toasted by the fetch wrappers, so they only clear `busy`.
pub(crate) fn spawn_write<T, E, Fut>(
    busy: &UseStateHandle<bool>,
    write: Fut,
    on_success: impl FnOnce(T) + 'static,
) where
    T: 'static,
    E: 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
{
    busy.set(true);
    let busy = busy.clone();
    yew::platform::spawn_local(async move {
        let outcome = write.await;
        busy.set(false);
        if let Ok(value) = outcome {
            on_success(value);
        }
    });
}

/// Callback that reads a picked file into `apply`.
pub(crate) fn pick_upload<T: Clone + 'static>(
    state: &UseStateHandle<T>,
    apply: impl Fn(&mut T, Upload) + 'static,
) -> Callback<File> {
    let state = state.clone();
    let apply = std::rc::Rc::new(apply);
    Callback::from(move |file: File| {
        let state = state.clone();
        let apply = std::rc::Rc::clone(&apply);
        yew::platform::spawn_local(async move {
            match read_upload(&file).await {
                Ok(upload) => edit(&state, |form| apply(form, upload)),
                Err(err) => gloo::console::error!(format!("file read failed: {err}")),
            }
        });
    })
}

fn error_line(error: Option<&AttrValue>) -> Html {
    error
        .map(|message| html! { <span class="text-sm text-error">{message.clone()}</span> })
        .unwrap_or_default()
}

#[derive(Properties, PartialEq)]
pub(crate) struct TextFieldProps {
    pub label: AttrValue,
    pub value: AttrValue,
    pub on_input: Callback<String>,
    #[prop_or_default]
    pub error: Option<AttrValue>,
    #[prop_or(AttrValue::Static("text"))]
    pub input_type: AttrValue,
    #[prop_or_default]
    pub placeholder: AttrValue,
    #[prop_or_default]
    pub disabled: bool,
}

#[function_component(TextField)]
pub(crate) fn text_field(props: &TextFieldProps) -> Html {
    let oninput = {
        let on_input = props.on_input.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(input) = event.target_dyn_into::<HtmlInputElement>() {
                on_input.emit(input.value());
            }
        })
    };
    html! {
        <label class="stack">
            <span>{props.label.clone()}</span>
            <input
                type={props.input_type.clone()}
                class={classes!("input", props.error.is_some().then_some("input-error"))}
                placeholder={props.placeholder.clone()}
                value={props.value.clone()}
                disabled={props.disabled}
                {oninput}
            />
            {error_line(props.error.as_ref())}
        </label>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct TextAreaFieldProps {
    pub label: AttrValue,
    pub value: AttrValue,
    pub on_input: Callback<String>,
    #[prop_or_default]
    pub error: Option<AttrValue>,
    #[prop_or(4)]
    pub rows: u32,
}

#[function_component(TextAreaField)]
pub(crate) fn text_area_field(props: &TextAreaFieldProps) -> Html {
    let oninput = {
        let on_input = props.on_input.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(input) = event.target_dyn_into::<HtmlTextAreaElement>() {
                on_input.emit(input.value());
            }
        })
    };
    html! {
        <label class="stack">
            <span>{props.label.clone()}</span>
            <textarea
                class={classes!("textarea", props.error.is_some().then_some("textarea-error"))}
                rows={props.rows.to_string()}
                value={props.value.clone()}
                {oninput}
            />
            {error_line(props.error.as_ref())}
        </label>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct SelectFieldProps {
    pub label: AttrValue,
    pub value: AttrValue,
    /// `(value, label)` pairs.
    pub options: Vec<(AttrValue, AttrValue)>,
    pub on_change: Callback<String>,
    #[prop_or_default]
    pub error: Option<AttrValue>,
    #[prop_or_default]
    pub placeholder: Option<AttrValue>,
}

#[function_component(SelectField)]
pub(crate) fn select_field(props: &SelectFieldProps) -> Html {
    let onchange = {
        let on_change = props.on_change.clone();
        Callback::from(move |event: Event| {
            if let Some(select) = event.target_dyn_into::<HtmlSelectElement>() {
                on_change.emit(select.value());
            }
        })
    };
    html! {
        <label class="stack">
            <span>{props.label.clone()}</span>
            <select class="select" {onchange}>
                {props.placeholder.clone().map(|text| html! {
                    <option value="" selected={props.value.is_empty()}>{text}</option>
                }).unwrap_or_default()}
                {for props.options.iter().map(|(value, label)| html! {
                    <option value={value.clone()} selected={*value == props.value}>{label.clone()}</option>
                })}
            </select>
            {error_line(props.error.as_ref())}
        </label>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct CheckboxFieldProps {
    pub label: AttrValue,
    pub checked: bool,
    pub on_toggle: Callback<bool>,
}

#[function_component(CheckboxField)]
pub(crate) fn checkbox_field(props: &CheckboxFieldProps) -> Html {
    let onchange = {
        let on_toggle = props.on_toggle.clone();
        Callback::from(move |event: Event| {
            if let Some(input) = event.target_dyn_into::<HtmlInputElement>() {
                on_toggle.emit(input.checked());
            }
        })
    };
    html! {
        <label class="stack toggle-row">
            <input type="checkbox" class="checkbox" checked={props.checked} {onchange} />
            <span>{props.label.clone()}</span>
        </label>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct FileFieldProps {
    pub label: AttrValue,
    pub on_pick: Callback<File>,
    #[prop_or_default]
    pub accept: AttrValue,
    #[prop_or_default]
    pub file_name: Option<AttrValue>,
    #[prop_or_default]
    pub error: Option<AttrValue>,
}

#[function_component(FileField)]
pub(crate) fn file_field(props: &FileFieldProps) -> Html {
    let onchange = {
        let on_pick = props.on_pick.clone();
        Callback::from(move |event: Event| {
            let Some(input) = event
                .target()
                .and_then(|node| node.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            if let Some(file) = first_file(&input) {
                on_pick.emit(file);
            }
        })
    };
    html! {
        <label class="stack">
            <span>{props.label.clone()}</span>
            <input type="file" class="file-input" accept={props.accept.clone()} {onchange} />
            {props.file_name.clone().map(|name| html! { <span class="muted">{name}</span> }).unwrap_or_default()}
            {error_line(props.error.as_ref())}
        </label>
    }
}
