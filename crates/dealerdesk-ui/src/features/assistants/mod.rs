//! Assistants: per-company list, details, and the multi-step submit.
pub mod api;
pub mod state;
#[cfg(target_arch = "wasm32")]
pub(crate) mod view;
