use yew::prelude::*;

/// Dialog currently open on a list screen.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Dialog<T> {
    Closed,
    Create,
    Edit(T),
    Delete(T),
}

impl<T> Default for Dialog<T> {
    fn default() -> Self {
        Self::Closed
    }
}

impl<T: Clone> Dialog<T> {
    /// Record being edited, `None` when creating.
    pub(crate) fn editing(&self) -> Option<T> {
        match self {
            Self::Edit(item) => Some(item.clone()),
            _ => None,
        }
    }
}

/// Callback that switches `state` to `next`.
pub(crate) fn open<T: Clone + 'static, E>(state: &UseStateHandle<Dialog<T>>, next: Dialog<T>) -> Callback<E> {
    let state = state.clone();
    Callback::from(move |_| state.set(next.clone()))
}

/// Callback that closes the dialog.
pub(crate) fn close<T: 'static>(state: &UseStateHandle<Dialog<T>>) -> Callback<()> {
    let state = state.clone();
    Callback::from(move |()| state.set(Dialog::Closed))
}

#[derive(Properties, PartialEq)]
pub(crate) struct ModalProps {
    pub title: AttrValue,
    pub on_close: Callback<()>,
    #[prop_or_default]
    pub children: Children,
    /// Footer buttons.
    #[prop_or_default]
    pub actions: Html,
}

#[function_component(Modal)]
pub(crate) fn modal(props: &ModalProps) -> Html {
    let close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_| on_close.emit(()))
    };
    html! {
        <div class="modal modal-open" role="dialog" aria-modal="true">
            <div class="modal-box">
                <header class="panel-head">
                    <h3>{props.title.clone()}</h3>
                    <button class="btn btn-ghost btn-sm" aria-label="Close" onclick={close}>{"✕"}</button>
                </header>
                <div class="stack">{for props.children.iter()}</div>
                <div class="modal-action">{props.actions.clone()}</div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct ConfirmDialogProps {
    pub title: AttrValue,
    pub message: AttrValue,
    pub on_confirm: Callback<()>,
    pub on_cancel: Callback<()>,
    #[prop_or_default]
    pub busy: bool,
    #[prop_or(AttrValue::Static("Delete"))]
    pub confirm_label: AttrValue,
}

/// Yes/no dialog used before destructive actions.
#[function_component(ConfirmDialog)]
pub(crate) fn confirm_dialog(props: &ConfirmDialogProps) -> Html {
    let confirm = {
        let on_confirm = props.on_confirm.clone();
        Callback::from(move |_| on_confirm.emit(()))
    };
    let cancel = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_| on_cancel.emit(()))
    };
    let actions = html! {
        <>
            <button class="btn btn-ghost btn-sm" onclick={cancel}>{"Cancel"}</button>
            <button class="btn btn-error btn-sm" disabled={props.busy} onclick={confirm}>
                {if props.busy { AttrValue::Static("Working…") } else { props.confirm_label.clone() }}
            </button>
        </>
    };
    html! {
        <Modal title={props.title.clone()} on_close={props.on_cancel.clone()} {actions}>
            <p>{props.message.clone()}</p>
        </Modal>
    }
}
