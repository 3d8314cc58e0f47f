#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! `DealerDesk` admin dashboard binary.
//!
//! The dashboard only runs in the browser; a native build prints how to serve it.

#[cfg(target_arch = "wasm32")]
fn main() {
    dealerdesk_ui::run_app();
}

#[cfg(not(target_arch = "wasm32"))]
const NATIVE_NOTICE: &str = "\
dealerdesk-ui is a browser dashboard. Serve it with `trunk serve` (wasm32-unknown-unknown).
Build-time settings: VITE_API_URL, VITE_AUTH_API_URL, VITE_WIDGET_URL, DEALERDESK_LOG.
";

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::io::Result<()> {
    use std::io::Write;

    std::io::stderr().lock().write_all(NATIVE_NOTICE.as_bytes())
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn native_notice_lists_build_settings() {
        for name in ["VITE_API_URL", "VITE_AUTH_API_URL", "VITE_WIDGET_URL", "DEALERDESK_LOG"] {
            assert!(NATIVE_NOTICE.contains(name), "{name} missing");
        }
        assert!(main().is_ok());
    }
}
