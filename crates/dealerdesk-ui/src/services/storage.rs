//! Web Storage backed [`TokenStore`].

use gloo::console;
use gloo::storage::{LocalStorage, SessionStorage, Storage};

use crate::core::tokens::{ACCESS_TOKEN_KEY, TokenStore};

/// Keeps the bearer token in `localStorage` ("remember me") or `sessionStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BrowserTokenStore;

impl TokenStore for BrowserTokenStore {
    fn get(&self) -> Option<String> {
        LocalStorage::get::<String>(ACCESS_TOKEN_KEY)
            .ok()
            .filter(|token| !token.is_empty())
            .or_else(|| {
                SessionStorage::get::<String>(ACCESS_TOKEN_KEY)
                    .ok()
                    .filter(|token| !token.is_empty())
            })
    }

    fn set(&self, token: &str, persistent: bool) {
        let outcome = if persistent {
            LocalStorage::set(ACCESS_TOKEN_KEY, token)
        } else {
            SessionStorage::set(ACCESS_TOKEN_KEY, token)
        };
        if let Err(err) = outcome {
            log_storage_error("set", &err.to_string());
        }
    }

    fn clear(&self) {
        LocalStorage::delete(ACCESS_TOKEN_KEY);
        SessionStorage::delete(ACCESS_TOKEN_KEY);
    }
}

fn log_storage_error(operation: &'static str, detail: &str) {
    console::error!("token storage operation failed", operation, detail);
}
