//! Company and group admin users.
pub mod api;
pub mod state;
#[cfg(target_arch = "wasm32")]
pub(crate) mod view;
