//! Event log filters and row formatting.
//!
//! # Design
//! - Blank filters never reach the query string.
//! - Date filters are whole days: the start day from midnight, the end day
//!   through its last second, both in UTC.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use dealerdesk_api_models::EventLog;
use serde_json::Value;
use uuid::Uuid;

use crate::core::cache::QueryKey;

/// Event types offered by the filter.
pub const EVENT_TYPES: [&str; 6] = [
    "ENTITY_ATTACH",
    "ENTITY_UPDATE",
    "RESPONSE",
    "REQUEST",
    "ENTITY_CREATE",
    "ENTITY_DELETE",
];

/// Entity types offered by the filter.
pub const ENTITY_TYPES: [&str; 11] = [
    "User",
    "Subscription",
    "DataCollection",
    "File",
    "AssistantVoice",
    "Assistant",
    "Voice",
    "Company",
    "VirtualOffice",
    "CompanyGroup",
    "Conversation",
];

/// Page sizes offered by the table.
pub const PAGE_SIZES: [u32; 3] = [20, 50, 100];

/// Event log filters; dates are `YYYY-MM-DD`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventFilters {
    /// Entity type.
    pub entity_type: String,
    /// Event type.
    pub event_type: String,
    /// First day.
    pub start_date: String,
    /// Last day.
    pub end_date: String,
    /// Acting user.
    pub user_id: Option<Uuid>,
    /// One-based page.
    pub page: u32,
    /// Page size.
    pub limit: u32,
}

impl Default for EventFilters {
    fn default() -> Self {
        Self {
            entity_type: String::new(),
            event_type: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            user_id: None,
            page: 1,
            limit: PAGE_SIZES[0],
        }
    }
}

fn day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn iso(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl EventFilters {
    /// Cache key for this filter combination.
    #[must_use]
    pub fn key(&self) -> QueryKey {
        QueryKey::new("events")
            .with(&self.entity_type)
            .with(&self.event_type)
            .with(&self.start_date)
            .with(&self.end_date)
            .with_opt(self.user_id)
            .with(self.page)
            .with(self.limit)
    }

    /// Query-string pairs, blank filters omitted.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        for (name, value) in [
            ("entity_type", self.entity_type.trim()),
            ("event_type", self.event_type.trim()),
        ] {
            if !value.is_empty() {
                params.push((name, value.to_string()));
            }
        }
        if let Some(start) = day(&self.start_date).and_then(|date| date.and_hms_opt(0, 0, 0)) {
            params.push(("start_date", iso(start.and_utc())));
        }
        if let Some(end) = day(&self.end_date).and_then(|date| date.and_hms_milli_opt(23, 59, 59, 999)) {
            params.push(("end_date", iso(end.and_utc())));
        }
        if let Some(user_id) = self.user_id {
            params.push(("user_id", user_id.to_string()));
        }
        params.push(("page", self.page.max(1).to_string()));
        params.push(("limit", self.limit.to_string()));
        params
    }

    /// Change a filter and go back to the first page.
    #[must_use]
    pub fn refine(&self, update: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        update(&mut next);
        next.page = 1;
        next
    }
}

/// Status chip for a logged response code: `(label, css modifier)`.
#[must_use]
pub const fn status_chip(status: Option<u16>) -> (&'static str, &'static str) {
    match status {
        Some(200) => ("Success", "ok"),
        Some(400) => ("Error", "error"),
        Some(500) => ("Server Error", "warn"),
        _ => ("Unknown", "subtle"),
    }
}

/// Columns of one event row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRow {
    /// Request endpoint.
    pub endpoint: String,
    /// HTTP method.
    pub method: String,
    /// Event type.
    pub event_type: String,
    /// `Mar 01, 2025 10:30:00`, or empty.
    pub when: String,
    /// Acting user id.
    pub user_id: String,
    /// Response status.
    pub status: Option<u16>,
}

impl EventRow {
    /// Read the columns from the event payload, falling back to the record.
    #[must_use]
    pub fn from_event(event: &EventLog) -> Self {
        let text = |field: &str| {
            event
                .data
                .get(field)
                .and_then(Value::as_str)
                .map(ToString::to_string)
        };
        let when = text("timestamp")
            .and_then(|stamp| DateTime::parse_from_rfc3339(&stamp).ok())
            .map(|stamp| stamp.with_timezone(&Utc))
            .or(event.created_at)
            .map(|stamp| stamp.format("%b %d, %Y %H:%M:%S").to_string())
            .unwrap_or_default();
        let status = event
            .data
            .get("status_code")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .or(event.status);
        Self {
            endpoint: text("endpoint").unwrap_or_default(),
            method: text("method").unwrap_or_default(),
            event_type: text("event_type").unwrap_or_else(|| event.event_type.clone()),
            when,
            user_id: text("user_id")
                .or_else(|| event.user_id.map(|id| id.to_string()))
                .unwrap_or_default(),
            status,
        }
    }
}
