//! Core, DOM-free primitives: request pipeline, stores, cache, and validation.
pub mod access;
pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod http;
pub mod logging;
pub mod notify;
pub mod saga;
pub mod session;
pub mod store;
pub mod tokens;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;
