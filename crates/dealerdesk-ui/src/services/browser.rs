//! Snackbar notifier, session reset, clipboard, and console logging for the browser build.

use std::rc::Rc;

use gloo::console;
use tracing::Level;
use yewdux::prelude::Dispatch;

use crate::core::cache::QueryCache;
use crate::core::logging::LogSink;
use crate::core::notify::{DeferredNotifier, NotificationQueue, visible_in_batch};
use crate::core::session::SessionSink;
use crate::core::store::{AuthStore, SnackbarStore};

/// Notifier that flushes queued messages into the snackbar on the next tick.
///
/// One message is shown per batch; see [`visible_in_batch`].
pub(crate) fn snackbar_notifier() -> DeferredNotifier {
    let queue = Rc::new(NotificationQueue::default());
    let flush_queue = Rc::clone(&queue);
    DeferredNotifier::new(
        queue,
        Rc::new(move || {
            let queue = Rc::clone(&flush_queue);
            yew::platform::spawn_local(async move {
                if let Some(notification) = visible_in_batch(queue.drain()) {
                    Dispatch::<SnackbarStore>::new().reduce_mut(|snackbar| snackbar.show(notification));
                }
            });
        }),
    )
}

/// Write `text` to the system clipboard.
pub(crate) async fn copy_to_clipboard(text: &str) -> anyhow::Result<()> {
    let promise = gloo::utils::window().navigator().clipboard().write_text(text);
    wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map(drop)
        .map_err(|err| anyhow::anyhow!("clipboard write failed: {err:?}"))
}

/// Resets the auth store and drops cached responses when the token dies.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BrowserSession;

impl SessionSink for BrowserSession {
    fn session_expired(&self) {
        Dispatch::<AuthStore>::new().reduce_mut(AuthStore::signed_out);
        Dispatch::<QueryCache>::new().reduce_mut(QueryCache::clear);
    }
}

/// Writes rendered `tracing` lines to the browser console.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, level: Level, line: &str) {
        match level {
            Level::ERROR => console::error!(line),
            Level::WARN => console::warn!(line),
            Level::INFO => console::info!(line),
            Level::DEBUG | Level::TRACE => console::debug!(line),
        }
    }
}
