//! Data collections: knowledge bases assistants answer from.
pub mod api;
pub mod state;
#[cfg(target_arch = "wasm32")]
pub(crate) mod view;
