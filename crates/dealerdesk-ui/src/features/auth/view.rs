use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::Dispatch;

use crate::app::Route;
use crate::app::api::ApiCtx;
use crate::components::form::{CheckboxField, TextField, bind, edit, field_error};
use crate::core::errors::ApiError;
use crate::core::session::login;
use crate::core::store::AuthStore;
use crate::core::validation::FieldErrors;
use crate::features::auth::state::LoginForm;

#[function_component(LoginPage)]
pub(crate) fn login_page() -> Html {
    let api_ctx = use_context::<ApiCtx>();
    let navigator = use_navigator();
    let form = use_state(LoginForm::default);
    let errors = use_state(FieldErrors::default);
    let failure = use_state(|| None as Option<String>);
    let busy = use_state(|| false);
    let Some(api_ctx) = api_ctx else {
        return html! {
            <div class="panel">
                <p class="text-sm text-error">{"Missing API context."}</p>
            </div>
        };
    };

    let on_submit = {
        let form = form.clone();
        let errors = errors.clone();
        let failure = failure.clone();
        let busy = busy.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let credentials = match form.validate() {
                Ok(credentials) => credentials,
                Err(found) => {
                    errors.set(found);
                    return;
                }
            };
            errors.set(FieldErrors::default());
            failure.set(None);
            busy.set(true);
            let api_ctx = api_ctx.clone();
            let navigator = navigator.clone();
            let failure = failure.clone();
            let busy = busy.clone();
            yew::platform::spawn_local(async move {
                match login(&api_ctx.clients, api_ctx.tokens.as_ref(), credentials).await {
                    Ok((user, token)) => {
                        let landing = Route::from_landing(user.role);
                        Dispatch::<AuthStore>::new().reduce_mut(|store| store.signed_in(user, token));
                        if let Some(navigator) = navigator {
                            navigator.push(&landing);
                        }
                    }
                    Err(err) => failure.set(Some(ApiError::from(err).message)),
                }
                busy.set(false);
            });
        })
    };

    html! {
        <section class="login-page">
            <form class="card login-card" onsubmit={on_submit}>
                <header>
                    <p class="eyebrow">{"DealerDesk"}</p>
                    <h3>{"Sign in"}</h3>
                </header>
                <TextField
                    label="Email"
                    input_type="email"
                    value={form.email.clone()}
                    error={field_error(&errors, "email")}
                    on_input={bind(&form, |form, value| form.email = value)}
                />
                <TextField
                    label="Password"
                    input_type="password"
                    value={form.password.clone()}
                    error={field_error(&errors, "password")}
                    on_input={bind(&form, |form, value| form.password = value)}
                />
                <CheckboxField
                    label="Remember me"
                    checked={form.remember_me}
                    on_toggle={{
                        let form = form.clone();
                        Callback::from(move |checked| edit(&form, |form| form.remember_me = checked))
                    }}
                />
                {failure.as_ref().map(|message| html! {
                    <p class="text-sm text-error">{message.clone()}</p>
                }).unwrap_or_default()}
                <div class="actions">
                    <button class="btn btn-primary" type="submit" disabled={*busy}>
                        {if *busy { "Signing in…" } else { "Sign in" }}
                    </button>
                </div>
            </form>
        </section>
    }
}
