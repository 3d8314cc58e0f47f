//! Feature slices: REST calls and form state per resource, plus their screens.
//!
//! # Design
//! - `api` and `state` modules are DOM-free and tested natively.
//! - `view` modules only build for wasm32.

pub mod admins;
pub mod assistants;
pub mod auth;
pub mod companies;
pub mod company_groups;
pub mod data_collections;
pub mod event_logs;
pub mod packages;
pub mod product_features;
pub mod settings;
pub mod subscriptions;
pub mod virtual_offices;
pub mod voices;
