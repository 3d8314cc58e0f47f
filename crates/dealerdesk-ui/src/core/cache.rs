//! Client-side response cache keyed by query keys.
//!
//! # Design
//! - Entries hold decoded values behind `Rc<dyn Any>`; readers downcast to the
//!   type they fetched.
//! - Invalidation is by key prefix and bumps a per-key epoch. A fetch carries
//!   the epoch it started under and its result is dropped if the epoch moved,
//!   so a response fetched before an invalidation never overwrites newer state.
//! - Optimistic patches return the previous value for rollback.
//! - No eviction; the cache lives as long as the session and is cleared on sign-out.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use yewdux::store::Store;

use crate::core::errors::ApiError;

/// Hierarchical cache key, e.g. `["assistants", "<company id>"]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// Key with a single root segment.
    #[must_use]
    pub fn new(root: &str) -> Self {
        Self(vec![root.to_string()])
    }

    /// Append a segment.
    #[must_use]
    pub fn with(mut self, segment: impl ToString) -> Self {
        self.0.push(segment.to_string());
        self
    }

    /// Append a segment, using an empty segment for `None`.
    #[must_use]
    pub fn with_opt(self, segment: Option<impl ToString>) -> Self {
        let segment = segment.map(|value| value.to_string()).unwrap_or_default();
        self.with(segment)
    }

    /// Key segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether `prefix` names this key or one of its ancestors.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

#[derive(Clone, Default)]
struct Entry {
    data: Option<Rc<dyn Any>>,
    error: Option<ApiError>,
    stale: bool,
    in_flight: bool,
    epoch: u64,
    version: u64,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        let same_data = match (&self.data, &other.data) {
            (Some(left), Some(right)) => Rc::ptr_eq(left, right),
            (None, None) => true,
            _ => false,
        };
        same_data
            && self.version == other.version
            && self.epoch == other.epoch
            && self.stale == other.stale
            && self.in_flight == other.in_flight
            && self.error == other.error
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("has_data", &self.data.is_some())
            .field("error", &self.error)
            .field("stale", &self.stale)
            .field("in_flight", &self.in_flight)
            .field("epoch", &self.epoch)
            .field("version", &self.version)
            .finish()
    }
}

/// Proof that a fetch started under a given epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    key: QueryKey,
    epoch: u64,
}

impl FetchTicket {
    /// Key being fetched.
    #[must_use]
    pub const fn key(&self) -> &QueryKey {
        &self.key
    }
}

/// Typed view of one cache entry.
#[derive(Debug)]
pub struct QuerySnapshot<T> {
    /// Last successfully fetched value.
    pub data: Option<Rc<T>>,
    /// Error of the last fetch, if it failed.
    pub error: Option<ApiError>,
    /// A fetch is in flight.
    pub fetching: bool,
    /// The entry was invalidated and awaits a refetch.
    pub stale: bool,
}

impl<T> Clone for QuerySnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            fetching: self.fetching,
            stale: self.stale,
        }
    }
}

impl<T> PartialEq for QuerySnapshot<T> {
    fn eq(&self, other: &Self) -> bool {
        let same_data = match (&self.data, &other.data) {
            (Some(left), Some(right)) => Rc::ptr_eq(left, right),
            (None, None) => true,
            _ => false,
        };
        same_data
            && self.error == other.error
            && self.fetching == other.fetching
            && self.stale == other.stale
    }
}

impl<T> QuerySnapshot<T> {
    /// Nothing to show yet.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }
}

/// Response cache store.
#[derive(Clone, Debug, Default, PartialEq, Store)]
pub struct QueryCache {
    entries: HashMap<QueryKey, Entry>,
}

impl QueryCache {
    /// Typed snapshot of `key`.
    #[must_use]
    pub fn snapshot<T: 'static>(&self, key: &QueryKey) -> QuerySnapshot<T> {
        self.entries.get(key).map_or(
            QuerySnapshot {
                data: None,
                error: None,
                fetching: false,
                stale: false,
            },
            |entry| QuerySnapshot {
                data: downcast(entry),
                error: entry.error.clone(),
                fetching: entry.in_flight,
                stale: entry.stale,
            },
        )
    }

    /// Cached value of `key`, when present and of type `T`.
    #[must_use]
    pub fn get<T: 'static>(&self, key: &QueryKey) -> Option<Rc<T>> {
        self.entries.get(key).and_then(downcast)
    }

    /// Whether `key` should be fetched now.
    ///
    /// Failed entries are not refetched until invalidated or retried.
    #[must_use]
    pub fn needs_fetch(&self, key: &QueryKey) -> bool {
        self.entries
            .get(key)
            .is_none_or(|entry| entry.stale && !entry.in_flight)
    }

    /// Mark `key` stale when its last fetch failed so the next reader fetches it again.
    ///
    /// Returns `false` when the entry is healthy, pending, or already in flight.
    pub fn retry_failed(&mut self, key: &QueryKey) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) if entry.error.is_some() && !entry.stale && !entry.in_flight => {
                entry.stale = true;
                true
            }
            _ => false,
        }
    }

    /// Mark `key` as in flight and return the ticket its result must present.
    pub fn begin_fetch(&mut self, key: &QueryKey) -> FetchTicket {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.in_flight = true;
        FetchTicket {
            key: key.clone(),
            epoch: entry.epoch,
        }
    }

    /// Store a fetch result unless the key was invalidated since the fetch began.
    ///
    /// Returns `false` when the result was discarded.
    pub fn complete<T: 'static>(&mut self, ticket: &FetchTicket, result: Result<T, ApiError>) -> bool {
        let Some(entry) = self.entries.get_mut(&ticket.key) else {
            return false;
        };
        if entry.epoch != ticket.epoch {
            tracing::debug!(key = %ticket.key, "discarding response fetched before invalidation");
            return false;
        }
        match result {
            Ok(value) => {
                entry.data = Some(Rc::new(value));
                entry.error = None;
            }
            Err(err) => entry.error = Some(err),
        }
        entry.stale = false;
        entry.in_flight = false;
        entry.version = entry.version.wrapping_add(1);
        true
    }

    /// Mark every key under `prefix` stale and cancel in-flight results.
    ///
    /// Returns the number of affected entries.
    pub fn invalidate(&mut self, prefix: &QueryKey) -> usize {
        let mut affected = 0;
        for (key, entry) in &mut self.entries {
            if key.starts_with(prefix) {
                entry.epoch = entry.epoch.wrapping_add(1);
                entry.stale = true;
                entry.in_flight = false;
                affected += 1;
            }
        }
        tracing::debug!(prefix = %prefix, affected, "invalidated queries");
        affected
    }

    /// Replace the value of `key` directly, cancelling any in-flight fetch.
    pub fn set_data<T: 'static>(&mut self, key: &QueryKey, value: T) {
        self.replace(key, Some(Rc::new(value)));
    }

    /// Apply an optimistic patch to the cached value of `key`.
    ///
    /// Returns the previous value for [`QueryCache::rollback`], or `None` when
    /// nothing of type `T` is cached.
    pub fn patch<T: Clone + 'static>(
        &mut self,
        key: &QueryKey,
        update: impl FnOnce(&mut T),
    ) -> Option<Rc<T>> {
        let previous = self.get::<T>(key)?;
        let mut next = (*previous).clone();
        update(&mut next);
        self.replace(key, Some(Rc::new(next)));
        Some(previous)
    }

    /// Restore a value captured by [`QueryCache::patch`].
    pub fn rollback<T: 'static>(&mut self, key: &QueryKey, previous: Rc<T>) {
        self.replace(key, Some(previous));
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn replace(&mut self, key: &QueryKey, data: Option<Rc<dyn Any>>) {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.data = data;
        entry.error = None;
        entry.stale = false;
        entry.in_flight = false;
        entry.epoch = entry.epoch.wrapping_add(1);
        entry.version = entry.version.wrapping_add(1);
    }
}

fn downcast<T: 'static>(entry: &Entry) -> Option<Rc<T>> {
    entry
        .data
        .clone()
        .and_then(|data| data.downcast::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::RequestError;

    fn companies() -> QueryKey {
        QueryKey::new("companies")
    }

    #[test]
    fn keys_match_by_prefix() {
        let key = QueryKey::new("assistants").with("c-1").with_opt(None::<u32>);
        assert!(key.starts_with(&QueryKey::new("assistants")));
        assert!(key.starts_with(&QueryKey::new("assistants").with("c-1")));
        assert!(!key.starts_with(&QueryKey::new("assistants").with("c-2")));
        assert!(!QueryKey::new("assistants").starts_with(&key));
        assert_eq!(key.to_string(), "assistants/c-1/");
    }

    #[test]
    fn fetch_lifecycle_stores_typed_value() {
        let mut cache = QueryCache::default();
        let key = companies().with(1);
        assert!(cache.needs_fetch(&key));

        let ticket = cache.begin_fetch(&key);
        assert!(!cache.needs_fetch(&key));
        assert!(cache.snapshot::<Vec<u32>>(&key).fetching);
        assert!(cache.complete(&ticket, Ok(vec![1_u32, 2])));

        let snapshot = cache.snapshot::<Vec<u32>>(&key);
        assert_eq!(snapshot.data.as_deref(), Some(&vec![1, 2]));
        assert!(!snapshot.is_loading());
        assert!(cache.get::<String>(&key).is_none());
        assert!(!cache.needs_fetch(&key));
    }

    #[test]
    fn response_fetched_before_invalidation_is_discarded() {
        let mut cache = QueryCache::default();
        let key = companies().with("group-a");
        let old = cache.begin_fetch(&key);

        assert_eq!(cache.invalidate(&companies()), 1);
        assert!(cache.needs_fetch(&key));

        let fresh = cache.begin_fetch(&key);
        assert!(cache.complete(&fresh, Ok("fresh".to_string())));
        assert!(!cache.complete(&old, Ok("old".to_string())));
        assert_eq!(cache.get::<String>(&key).as_deref().map(String::as_str), Some("fresh"));
    }

    #[test]
    fn invalidation_only_touches_matching_prefix() {
        let mut cache = QueryCache::default();
        for key in [companies().with(1), companies().with(2), QueryKey::new("voices")] {
            let ticket = cache.begin_fetch(&key);
            cache.complete(&ticket, Ok(0_u8));
        }
        assert_eq!(cache.invalidate(&companies()), 2);
        assert!(cache.needs_fetch(&companies().with(2)));
        assert!(!cache.needs_fetch(&QueryKey::new("voices")));
        assert!(cache.snapshot::<u8>(&companies().with(1)).stale);
    }

    #[test]
    fn failures_are_kept_until_invalidated() {
        let mut cache = QueryCache::default();
        let key = QueryKey::new("packages");
        let ticket = cache.begin_fetch(&key);
        let err = ApiError::from(RequestError::Network("offline".into()));
        cache.complete::<Vec<u8>>(&ticket, Err(err.clone()));

        assert_eq!(cache.snapshot::<Vec<u8>>(&key).error, Some(err));
        assert!(!cache.needs_fetch(&key));
        cache.invalidate(&key);
        assert!(cache.needs_fetch(&key));
    }

    #[test]
    fn failed_entries_are_fetched_again_once_retried() {
        let mut cache = QueryCache::default();
        let key = companies();
        let ticket = cache.begin_fetch(&key);
        cache.complete::<Vec<u8>>(
            &ticket,
            Err(ApiError::from(RequestError::Network("offline".into()))),
        );
        assert!(!cache.needs_fetch(&key));

        assert!(cache.retry_failed(&key));
        assert!(cache.needs_fetch(&key));
        assert!(!cache.retry_failed(&key));

        let ticket = cache.begin_fetch(&key);
        assert!(!cache.retry_failed(&key));
        assert!(cache.complete(&ticket, Ok(vec![1_u8])));
        assert!(!cache.retry_failed(&key));
        assert!(!cache.retry_failed(&QueryKey::new("voices")));
        assert_eq!(cache.get::<Vec<u8>>(&key).as_deref(), Some(&vec![1_u8]));
    }

    #[test]
    fn optimistic_patch_and_rollback() {
        let mut cache = QueryCache::default();
        let key = QueryKey::new("packages");
        cache.set_data(&key, vec!["basic".to_string()]);

        let previous = cache
            .patch::<Vec<String>>(&key, |items| items.push("premium".into()))
            .expect("cached");
        assert_eq!(cache.get::<Vec<String>>(&key).map(|items| items.len()), Some(2));

        cache.rollback(&key, previous);
        assert_eq!(cache.get::<Vec<String>>(&key).map(|items| items.len()), Some(1));
        assert!(cache.patch::<Vec<u8>>(&key, |_| {}).is_none());
    }

    #[test]
    fn direct_writes_cancel_in_flight_fetches() {
        let mut cache = QueryCache::default();
        let key = QueryKey::new("features");
        let ticket = cache.begin_fetch(&key);
        cache.set_data(&key, 7_u32);
        assert!(!cache.complete(&ticket, Ok(1_u32)));
        assert_eq!(cache.get::<u32>(&key).as_deref(), Some(&7));
    }

    #[test]
    fn snapshots_compare_by_identity() {
        let mut cache = QueryCache::default();
        let key = QueryKey::new("voices");
        cache.set_data(&key, 1_u8);
        let before = cache.clone();
        assert_eq!(before, cache);
        cache.set_data(&key, 1_u8);
        assert_ne!(before, cache);
        cache.clear();
        assert!(cache.needs_fetch(&key));
    }
}
