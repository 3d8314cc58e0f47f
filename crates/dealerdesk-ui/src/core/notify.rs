//! User notifications and their deferred dispatch.
//!
//! # Design
//! - Producers never touch the snackbar directly; they push onto a queue.
//! - The queue is flushed once per scheduling tick, after the current update
//!   finishes, so no notification is raised synchronously inside a render.
//! - Scheduling is injected, keeping this module free of browser APIs.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Snackbar severity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Severity {
    /// Positive confirmation.
    #[default]
    Success,
    /// Neutral information.
    Info,
    /// Recoverable problem.
    Warning,
    /// Failed operation.
    Error,
}

impl Severity {
    /// CSS modifier for the snackbar.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A message destined for the snackbar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Text shown to the user.
    pub message: String,
    /// Visual severity.
    pub severity: Severity,
}

impl Notification {
    /// Success notification.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    /// Informational notification.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
        }
    }

    /// Error notification.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

/// The one notification of a flushed batch the snackbar shows.
///
/// The snackbar holds a single message, so the first error wins over anything
/// queued after it; a batch without errors shows its latest entry.
#[must_use]
pub fn visible_in_batch(mut batch: Vec<Notification>) -> Option<Notification> {
    let first_error = batch
        .iter()
        .position(|notification| notification.severity == Severity::Error);
    match first_error {
        Some(index) => Some(batch.swap_remove(index)),
        None => batch.pop(),
    }
}

/// Sink for user notifications.
pub trait Notifier {
    /// Enqueue a notification for display.
    fn notify(&self, notification: Notification);
}

/// FIFO of notifications awaiting dispatch.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: RefCell<VecDeque<Notification>>,
}

impl NotificationQueue {
    /// Push a notification; returns `true` when the queue was previously empty
    /// and a flush therefore needs scheduling.
    pub fn push(&self, notification: Notification) -> bool {
        let mut pending = self.pending.borrow_mut();
        let was_empty = pending.is_empty();
        pending.push_back(notification);
        was_empty
    }

    /// Take every pending notification in arrival order.
    #[must_use]
    pub fn drain(&self) -> Vec<Notification> {
        self.pending.borrow_mut().drain(..).collect()
    }

    /// Number of pending notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

/// Notifier that queues and asks the host to flush on the next tick.
pub struct DeferredNotifier {
    queue: Rc<NotificationQueue>,
    schedule_flush: Rc<dyn Fn()>,
}

impl DeferredNotifier {
    /// Create a notifier over `queue`; `schedule_flush` runs once per batch.
    #[must_use]
    pub fn new(queue: Rc<NotificationQueue>, schedule_flush: Rc<dyn Fn()>) -> Self {
        Self {
            queue,
            schedule_flush,
        }
    }

    /// Shared queue handle.
    #[must_use]
    pub fn queue(&self) -> Rc<NotificationQueue> {
        Rc::clone(&self.queue)
    }
}

impl Notifier for DeferredNotifier {
    fn notify(&self, notification: Notification) {
        tracing::debug!(
            severity = notification.severity.class(),
            message = %notification.message,
            "notification queued"
        );
        if self.queue.push(notification) {
            (self.schedule_flush)();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn flush_is_scheduled_once_per_batch() {
        let queue = Rc::new(NotificationQueue::default());
        let scheduled = Rc::new(Cell::new(0_u32));
        let notifier = DeferredNotifier::new(Rc::clone(&queue), {
            let scheduled = Rc::clone(&scheduled);
            Rc::new(move || scheduled.set(scheduled.get() + 1))
        });

        notifier.notify(Notification::error("first"));
        notifier.notify(Notification::info("second"));
        assert_eq!(scheduled.get(), 1);
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(drained[0], Notification::error("first"));
        assert_eq!(drained[1].severity, Severity::Info);
        assert!(queue.is_empty());

        notifier.notify(Notification::success("third"));
        assert_eq!(scheduled.get(), 2);
    }

    #[test]
    fn first_error_of_a_batch_stays_visible() {
        let batch = vec![
            Notification::success("Company created"),
            Notification::error("Your session has expired. Please log in again."),
            Notification::error("Network or server error"),
        ];
        assert_eq!(
            visible_in_batch(batch),
            Some(Notification::error("Your session has expired. Please log in again."))
        );
        assert_eq!(
            visible_in_batch(vec![Notification::info("a"), Notification::success("b")]),
            Some(Notification::success("b"))
        );
        assert_eq!(visible_in_batch(Vec::new()), None);
    }

    #[test]
    fn severity_defaults_to_success() {
        assert_eq!(Severity::default(), Severity::Success);
        assert_eq!(Severity::Error.class(), "error");
    }
}
