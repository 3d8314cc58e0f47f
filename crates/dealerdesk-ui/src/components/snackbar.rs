use gloo::timers::callback::Timeout;
use yew::prelude::*;
use yewdux::prelude::use_store;

use crate::core::store::{SNACKBAR_AUTO_HIDE_MS, SnackbarStore};

/// Global snackbar bound to [`SnackbarStore`]; hides itself after a delay.
#[function_component(SnackbarHost)]
pub(crate) fn snackbar_host() -> Html {
    let (snackbar, dispatch) = use_store::<SnackbarStore>();
    {
        let dispatch = dispatch.clone();
        use_effect_with_deps(
            move |(open, _sequence)| {
                let handle = open.then(|| {
                    Timeout::new(SNACKBAR_AUTO_HIDE_MS, move || {
                        dispatch.reduce_mut(SnackbarStore::close);
                    })
                });
                move || drop(handle)
            },
            (snackbar.open, snackbar.sequence),
        );
    }
    let on_close = Callback::from(move |_| dispatch.reduce_mut(SnackbarStore::close));

    html! {
        <div class="toast-host" aria-live="polite" aria-atomic="true">
            {if snackbar.open {
                html! {
                    <div class={classes!("toast", snackbar.severity.class())} role="status">
                        <span>{snackbar.message.clone()}</span>
                        <button class="ghost" aria-label="Dismiss" onclick={on_close}>{"✕"}</button>
                    </div>
                }
            } else {
                html! {}
            }}
        </div>
    }
}
