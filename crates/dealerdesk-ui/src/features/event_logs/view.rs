//! Filterable event log table.

use std::rc::Rc;

use dealerdesk_api_models::Page;
use uuid::Uuid;
use yew::prelude::*;

use crate::app::hooks::use_query;
use crate::components::empty_state::{EmptyState, QueryStatus, query_error};
use crate::components::form::{SelectField, TextField};
use crate::components::pagination::Pagination;
use crate::features::event_logs::api;
use crate::features::event_logs::state::{
    ENTITY_TYPES, EVENT_TYPES, EventFilters, EventRow, PAGE_SIZES, status_chip,
};

fn options(values: &[&'static str]) -> Vec<(AttrValue, AttrValue)> {
    values
        .iter()
        .map(|value| (AttrValue::from(*value), AttrValue::from(*value)))
        .collect()
}

/// `/event-logs`, root only.
#[function_component(EventLogsPage)]
pub(crate) fn event_logs_page() -> Html {
    let filters = use_state(EventFilters::default);
    let user_text = use_state(String::new);
    let snapshot = {
        let current = (*filters).clone();
        use_query(current.key(), move |client| async move {
            api::list(&client, &current).await
        })
    };
    let listing = snapshot
        .data
        .clone()
        .unwrap_or_else(|| Rc::new(Page::default()));

    let refine = |apply: fn(&mut EventFilters, String)| {
        let filters = filters.clone();
        Callback::from(move |value: String| filters.set(filters.refine(|next| apply(next, value))))
    };
    let on_user = {
        let filters = filters.clone();
        let user_text = user_text.clone();
        Callback::from(move |value: String| {
            let trimmed = value.trim();
            let parsed = if trimmed.is_empty() {
                Some(None)
            } else {
                Uuid::parse_str(trimmed).ok().map(Some)
            };
            if let Some(user_id) = parsed {
                if filters.user_id != user_id {
                    filters.set(filters.refine(|next| next.user_id = user_id));
                }
            }
            user_text.set(value);
        })
    };
    let on_page = {
        let filters = filters.clone();
        Callback::from(move |page: u32| {
            let mut next = (*filters).clone();
            next.page = page;
            filters.set(next);
        })
    };
    let size_options = PAGE_SIZES
        .iter()
        .map(|size| (AttrValue::from(size.to_string()), AttrValue::from(size.to_string())))
        .collect::<Vec<_>>();

    html! {
        <section class="page">
            <div class="panel">
                <div class="panel-head">
                    <div>
                        <p class="eyebrow">{"Audit"}</p>
                        <h3>{"Event logs"}</h3>
                    </div>
                </div>
                <div class="filters grid-3">
                    <SelectField label="Entity type" value={filters.entity_type.clone()} options={options(&ENTITY_TYPES)}
                        placeholder={Some(AttrValue::from("All entities"))}
                        on_change={refine(|next, value| next.entity_type = value)} />
                    <SelectField label="Event type" value={filters.event_type.clone()} options={options(&EVENT_TYPES)}
                        placeholder={Some(AttrValue::from("All events"))}
                        on_change={refine(|next, value| next.event_type = value)} />
                    <TextField label="User id" value={(*user_text).clone()} on_input={on_user} />
                    <TextField label="From" input_type="date" value={filters.start_date.clone()}
                        on_input={refine(|next, value| next.start_date = value)} />
                    <TextField label="To" input_type="date" value={filters.end_date.clone()}
                        on_input={refine(|next, value| next.end_date = value)} />
                    <SelectField label="Rows" value={filters.limit.to_string()} options={size_options}
                        on_change={refine(|next, value| next.limit = value.parse().unwrap_or(PAGE_SIZES[0]))} />
                </div>
                <QueryStatus loading={snapshot.is_loading()} error={query_error(&snapshot)} />
                {if listing.data.is_empty() && !snapshot.is_loading() {
                    html! { <EmptyState title="No events match these filters" /> }
                } else {
                    html! {
                        <table class="table">
                            <thead>
                                <tr>
                                    <th>{"Endpoint"}</th><th>{"Method"}</th><th>{"Event"}</th>
                                    <th>{"When"}</th><th>{"User"}</th><th>{"Status"}</th>
                                </tr>
                            </thead>
                            <tbody>
                                {for listing.data.iter().map(|event| {
                                    let row = EventRow::from_event(event);
                                    let (label, tone) = status_chip(row.status);
                                    html! {
                                        <tr key={event.id.to_string()}>
                                            <td class="mono">{row.endpoint}</td>
                                            <td>{row.method}</td>
                                            <td>{row.event_type}</td>
                                            <td>{row.when}</td>
                                            <td class="mono">{row.user_id}</td>
                                            <td><span class={classes!("pill", tone)}>{label}</span></td>
                                        </tr>
                                    }
                                })}
                            </tbody>
                        </table>
                    }
                }}
                <Pagination page={filters.page} meta={listing.meta} {on_page} />
            </div>
        </section>
    }
}
