//! Bearer token persistence contract.
//!
//! # Design
//! - "Remember me" selects durable storage; otherwise the token is session-scoped.
//! - Reads prefer the durable value, clears remove both.
//! - No expiry or refresh; the server decides when a token is dead.

use std::cell::RefCell;

/// Storage key shared by durable and session storage.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Get/set/clear access to the bearer credential.
pub trait TokenStore {
    /// Current token, durable storage first.
    fn get(&self) -> Option<String>;
    /// Store a token; `persistent` selects durable storage.
    fn set(&self, token: &str, persistent: bool);
    /// Remove the token from both storages.
    fn clear(&self);
}

/// In-memory token store used natively and when browser storage is unavailable.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    durable: RefCell<Option<String>>,
    session: RefCell<Option<String>>,
}

impl MemoryTokenStore {
    /// Create a store pre-seeded with a durable token.
    #[must_use]
    pub fn with_durable(token: impl Into<String>) -> Self {
        Self {
            durable: RefCell::new(Some(token.into())),
            session: RefCell::new(None),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.durable
            .borrow()
            .clone()
            .filter(|token| !token.is_empty())
            .or_else(|| self.session.borrow().clone().filter(|token| !token.is_empty()))
    }

    fn set(&self, token: &str, persistent: bool) {
        let slot = if persistent {
            &self.durable
        } else {
            &self.session
        };
        *slot.borrow_mut() = Some(token.to_string());
    }

    fn clear(&self) {
        self.durable.borrow_mut().take();
        self.session.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durable_value_wins_over_session() {
        let store = MemoryTokenStore::default();
        store.set("session-token", false);
        assert_eq!(store.get().as_deref(), Some("session-token"));
        store.set("durable-token", true);
        assert_eq!(store.get().as_deref(), Some("durable-token"));
    }

    #[test]
    fn clear_removes_both_slots() {
        let store = MemoryTokenStore::with_durable("a");
        store.set("b", false);
        store.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn empty_tokens_read_as_absent() {
        let store = MemoryTokenStore::default();
        store.set("", true);
        assert_eq!(store.get(), None);
    }
}
