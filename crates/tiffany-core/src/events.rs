//! Outward notifications and the collaborator traits the core calls into.
//!
//! The core never talks to a UI directly. Components queue [`EditorEvent`]s,
//! the session drains the queues and hands them to every registered
//! [`EditorObserver`]. Long-running batches report through a
//! [`ProgressSink`], and saving is delegated to a [`SaveHook`].

use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};

use crate::page::Page;

/// A change the host UI may want to react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditorEvent {
    /// The canvas transform changed (zoom, fit, scroll).
    ViewChanged {
        scale_factor: f64,
        effective_scale: f64,
        scroll_x: f64,
        scroll_y: f64,
        can_zoom_in: bool,
        can_zoom_out: bool,
    },
    /// The bitmap of the page at `index` changed.
    ContentChanged { index: usize },
    /// The host should make `selected` its current selection.
    SelectionChanged { selected: Vec<usize> },
    /// A file in a load batch could not be decoded.
    DecodeFailed { path: String, reason: String },
    /// The canvas now shows the page at `index`, or nothing.
    ActivePageChanged { index: Option<usize> },
}

/// One progress report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressUpdate {
    Begin { label: String, total: usize },
    Step { done: usize },
    End,
}

/// Receives progress for batch operations.
pub trait ProgressSink {
    /// A batch of `total` items is starting.
    fn begin(&mut self, label: &str, total: usize);
    /// `done` items have been processed so far.
    fn step(&mut self, done: usize);
    /// The batch finished.
    fn end(&mut self);
}

/// Receives every event the session dispatches.
pub trait EditorObserver {
    fn notify(&mut self, event: &EditorEvent);
}

/// Called when the user asks to save.
///
/// Persistence is outside the core; the default implementation does nothing.
pub trait SaveHook {
    fn on_save_requested(&mut self, _pages: &[&Page]) {}
}

/// Progress sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn begin(&mut self, _label: &str, _total: usize) {}
    fn step(&mut self, _done: usize) {}
    fn end(&mut self) {}
}

/// Progress sink that keeps every update, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingProgress {
    pub updates: Vec<ProgressUpdate>,
}

impl ProgressSink for RecordingProgress {
    fn begin(&mut self, label: &str, total: usize) {
        self.updates.push(ProgressUpdate::Begin {
            label: label.to_string(),
            total,
        });
    }

    fn step(&mut self, done: usize) {
        self.updates.push(ProgressUpdate::Step { done });
    }

    fn end(&mut self) {
        self.updates.push(ProgressUpdate::End);
    }
}

impl ProgressSink for Sender<ProgressUpdate> {
    fn begin(&mut self, label: &str, total: usize) {
        // A dropped receiver means nobody is listening
        let _ = self.send(ProgressUpdate::Begin {
            label: label.to_string(),
            total,
        });
    }

    fn step(&mut self, done: usize) {
        let _ = self.send(ProgressUpdate::Step { done });
    }

    fn end(&mut self) {
        let _ = self.send(ProgressUpdate::End);
    }
}

/// Save hook that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSaveHook;

impl SaveHook for NoopSaveHook {}

impl<F: FnMut(&EditorEvent)> EditorObserver for F {
    fn notify(&mut self, event: &EditorEvent) {
        self(event)
    }
}
