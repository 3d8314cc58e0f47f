use dealerdesk_api_models::PageMeta;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct PaginationProps {
    pub page: u32,
    pub meta: Option<PageMeta>,
    pub on_page: Callback<u32>,
}

/// Previous/next pager; hidden when everything fits on one page.
#[function_component(Pagination)]
pub(crate) fn pagination(props: &PaginationProps) -> Html {
    let Some(meta) = props.meta else {
        return html! {};
    };
    let pages = u32::try_from(meta.page_count()).unwrap_or(u32::MAX);
    if pages <= 1 {
        return html! {};
    }
    let page = props.page.clamp(1, pages);
    let go = |target: u32| {
        let on_page = props.on_page.clone();
        Callback::from(move |_| on_page.emit(target))
    };
    html! {
        <div class="join pagination">
            <button class="join-item btn btn-sm" disabled={page == 1} onclick={go(page.saturating_sub(1))}>{"«"}</button>
            <span class="join-item btn btn-sm btn-disabled">{format!("{page} / {pages}")}</span>
            <button class="join-item btn btn-sm" disabled={page >= pages} onclick={go(page + 1)}>{"»"}</button>
        </div>
    }
}
