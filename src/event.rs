//! Session event callbacks.
//!
//! A view layer registers a callback on its session to hear about loads,
//! toggles, and saves without polling. Every session owns its own callback.

use std::fmt;
use std::path::PathBuf;

use crate::document::{SectionId, SectionKey};

/// Something that happened in an editing session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// New text was loaded; `source` names where it came from.
    Loaded { source: String, sections: usize },
    Collapsed(SectionId),
    Expanded(SectionId),
    /// The display was regenerated; any saved cursor offsets are stale.
    Rendered { lines: usize },
    /// A collapsed body was restored from the last known document.
    Recovered(SectionKey),
    Saved(PathBuf),
}

impl SessionEvent {
    /// Short machine-readable event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Loaded { .. } => "loaded",
            Self::Collapsed(_) => "collapsed",
            Self::Expanded(_) => "expanded",
            Self::Rendered { .. } => "rendered",
            Self::Recovered(_) => "recovered",
            Self::Saved(_) => "saved",
        }
    }
}

type EventCallback = Box<dyn Fn(&SessionEvent) + Send + Sync + 'static>;

/// Optional per-session event callback.
#[derive(Default)]
pub struct EventSink {
    callback: Option<EventCallback>,
}

impl EventSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the callback, replacing any previous one.
    pub fn set<F>(&mut self, callback: F)
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    pub fn clear(&mut self) {
        self.callback = None;
    }

    /// Emit an event to the registered callback.
    pub fn emit(&self, event: &SessionEvent) {
        tracing::trace!(event = event.name(), "session event");
        if let Some(callback) = self.callback.as_ref() {
            callback(event);
        }
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("registered", &self.callback.is_some())
            .finish()
    }
}
