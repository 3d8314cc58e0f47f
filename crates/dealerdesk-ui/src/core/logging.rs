//! Tracing subscriber setup for the dashboard.
//!
//! # Design
//! - Core code emits `tracing` events; this module renders them to a [`LogSink`].
//! - The browser build installs a console sink once at startup.
//! - Rendering is one line per event: `LEVEL target: message key=value ...`.

use std::fmt::{self, Write as _};

use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Destination for rendered log lines.
pub trait LogSink: Send + Sync + 'static {
    /// Write one rendered line.
    fn write(&self, level: Level, line: &str);
}

/// Error raised when a global subscriber is already installed.
#[derive(Debug, Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct LoggingError(String);

/// Layer that renders events into a [`LogSink`].
pub struct SinkLayer<S> {
    sink: S,
}

impl<S: LogSink> SinkLayer<S> {
    /// Wrap `sink`.
    pub const fn new(sink: S) -> Self {
        Self { sink }
    }
}

impl<S, Sub> Layer<Sub> for SinkLayer<S>
where
    S: LogSink,
    Sub: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, Sub>) {
        let metadata = event.metadata();
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let line = visitor.render(*metadata.level(), metadata.target());
        self.sink.write(*metadata.level(), &line);
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn render(self, level: Level, target: &str) -> String {
        let mut line = format!("{level} {target}: {}", self.message);
        line.push_str(&self.fields);
        line
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

/// Install the global subscriber with `sink` at `level`.
///
/// # Errors
///
/// Returns [`LoggingError`] when a global subscriber is already set.
pub fn init_logging<S: LogSink>(sink: S, level: LevelFilter) -> Result<(), LoggingError> {
    let subscriber = tracing_subscriber::registry()
        .with(SinkLayer::new(sink))
        .with(level);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| LoggingError(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<(Level, String)>>>);

    impl LogSink for Capture {
        fn write(&self, level: Level, line: &str) {
            if let Ok(mut lines) = self.0.lock() {
                lines.push((level, line.to_string()));
            }
        }
    }

    #[test]
    fn events_render_message_and_fields() {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry()
            .with(SinkLayer::new(capture.clone()))
            .with(LevelFilter::INFO);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(status = 404, url = "http://h/x", "request rejected");
            tracing::debug!("filtered out");
        });

        let lines = capture.0.lock().expect("lock").clone();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, Level::WARN);
        assert!(lines[0].1.starts_with("WARN "));
        assert!(lines[0].1.contains(": request rejected status=404 url=http://h/x"));
    }
}
