//! Dashboard chrome: collapsible sidebar, top bar, and the page slot.

use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::{Dispatch, use_store};

use crate::app::Route;
use crate::app::api::ApiCtx;
use crate::core::access::{NavItem, is_active, nav_items};
use crate::core::cache::QueryCache;
use crate::core::session::logout;
use crate::core::store::{AuthStore, SidebarStore};

#[derive(Properties, PartialEq)]
pub(crate) struct DashboardLayoutProps {
    pub children: Children,
}

#[function_component(DashboardLayout)]
pub(crate) fn dashboard_layout(props: &DashboardLayoutProps) -> Html {
    let (sidebar, sidebar_dispatch) = use_store::<SidebarStore>();
    let (auth, auth_dispatch) = use_store::<AuthStore>();
    let cache_dispatch = Dispatch::<QueryCache>::new();
    let api_ctx = use_context::<ApiCtx>();
    let navigator = use_navigator();
    let location = use_location();
    let current_path = location.map(|location| location.path().to_string()).unwrap_or_default();

    let toggle = sidebar_dispatch.reduce_mut_callback(SidebarStore::toggle);
    let toggle_mobile = sidebar_dispatch.reduce_mut_callback(SidebarStore::toggle_mobile);
    let close_mobile = sidebar_dispatch.reduce_mut_callback(SidebarStore::close_mobile);

    let on_logout = Callback::from(move |_| {
        if let Some(api_ctx) = api_ctx.as_ref() {
            auth_dispatch.reduce_mut(|store| logout(api_ctx.tokens.as_ref(), store));
        }
        cache_dispatch.reduce_mut(QueryCache::clear);
        if let Some(navigator) = navigator.as_ref() {
            navigator.push(&Route::Login);
        }
    });

    let items: &[NavItem] = auth.role().map(nav_items).unwrap_or_default();
    let user_label = auth
        .user()
        .map(|user| format!("{} {}", user.first_name, user.last_name))
        .unwrap_or_default();

    html! {
        <div class={classes!("app-shell", (!sidebar.is_open).then_some("sidebar-collapsed"))}>
            <aside class={classes!("sidebar", if sidebar.mobile_open { "open" } else { "closed" })}>
                <div class="brand">
                    <button class="ghost mobile-only" onclick={close_mobile.clone()} aria-label="Close navigation">{"✕"}</button>
                    <strong>{"DealerDesk"}</strong>
                </div>
                <nav>
                    {for items.iter().map(|item| nav_link(item, &current_path, close_mobile.clone()))}
                </nav>
                <div class="sidebar-footer">
                    <span class="muted">{user_label}</span>
                    <button class="btn btn-ghost btn-sm" onclick={on_logout}>{"Log out"}</button>
                </div>
            </aside>
            <div class="main">
                <header class="topbar">
                    <button class="ghost mobile-only" aria-label="Open navigation" onclick={toggle_mobile}>{"☰"}</button>
                    <button class="ghost desktop-only" aria-label="Toggle sidebar" onclick={toggle}>{"☰"}</button>
                </header>
                <main>
                    {for props.children.iter()}
                </main>
            </div>
        </div>
    }
}

fn nav_link(item: &NavItem, current_path: &str, on_click: Callback<MouseEvent>) -> Html {
    let classes = classes!("nav-item", is_active(item, current_path).then_some("active"));
    let Some(route) = Route::recognize(item.path) else {
        return html! {};
    };
    html! {
        <span onclick={on_click}>
            <Link<Route> to={route} {classes}>{item.label}</Link<Route>>
        </span>
    }
}
