//! Company groups: list, add/edit with logo, and group details.
pub mod api;
pub mod state;
#[cfg(target_arch = "wasm32")]
pub(crate) mod view;
