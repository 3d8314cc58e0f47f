//! Companies: list, add/edit with logo, and the details screen.
pub mod api;
pub mod state;
#[cfg(target_arch = "wasm32")]
pub(crate) mod view;
