//! One editing session: pages, canvas and the host's collaborators.
//!
//! The session is the only place where collection and canvas meet. After
//! every operation it drains both event queues, lets the canvas follow the
//! collection (re-find its page, reload a rotated page, show a newly
//! selected page) and forwards everything to the observers.

use crate::canvas::{CanvasView, PointerEvent};
use crate::collection::{LoadMode, LoadReport, MirrorAxis, PageCollection, RotateCommand};
use crate::config::EditorConfig;
use crate::decode::{Decoder, FileDecoder};
use crate::error::EditError;
use crate::events::{EditorEvent, EditorObserver, NoopSaveHook, NullProgress, ProgressSink, SaveHook};
use crate::page::Page;
use crate::thumbnail::ThumbnailRenderer;

pub struct Session {
    config: EditorConfig,
    pages: PageCollection,
    canvas: CanvasView,
    decoder: Box<dyn Decoder>,
    progress: Box<dyn ProgressSink>,
    observers: Vec<Box<dyn EditorObserver>>,
    save_hook: Box<dyn SaveHook>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EditorConfig::default(), Box::new(FileDecoder))
    }
}

impl Session {
    pub fn new(config: EditorConfig, decoder: Box<dyn Decoder>) -> Self {
        Self {
            pages: PageCollection::new(ThumbnailRenderer::new(config.thumbnail_size)),
            canvas: CanvasView::new(&config),
            config,
            decoder,
            progress: Box::new(NullProgress),
            observers: Vec::new(),
            save_hook: Box::new(NoopSaveHook),
        }
    }

    pub fn set_progress(&mut self, progress: Box<dyn ProgressSink>) {
        self.progress = progress;
    }

    pub fn set_save_hook(&mut self, save_hook: Box<dyn SaveHook>) {
        self.save_hook = save_hook;
    }

    pub fn add_observer(&mut self, observer: Box<dyn EditorObserver>) {
        self.observers.push(observer);
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn pages(&self) -> &PageCollection {
        &self.pages
    }

    pub fn canvas(&self) -> &CanvasView {
        &self.canvas
    }

    // ========================================================================
    // Collection
    // ========================================================================

    pub fn load<P: AsRef<str>>(
        &mut self,
        paths: &[P],
        mode: LoadMode,
        selected: &[usize],
    ) -> Result<LoadReport, EditError> {
        let result = self.pages.load(
            paths,
            mode,
            selected,
            self.decoder.as_mut(),
            self.progress.as_mut(),
        );
        self.dispatch();
        result
    }

    pub fn delete_selection(&mut self, selected: &[usize]) -> Result<Option<usize>, EditError> {
        let result = self.pages.delete_selection(selected);
        self.dispatch();
        result
    }

    pub fn rotate_selection(
        &mut self,
        selected: &[usize],
        command: RotateCommand,
    ) -> Result<(), EditError> {
        let result =
            self.pages
                .rotate_selection(selected, command.quarter_turns(), self.progress.as_mut());
        self.dispatch();
        result
    }

    pub fn mirror_selection(&mut self, selected: &[usize], axis: MirrorAxis) -> Result<(), EditError> {
        let result = self
            .pages
            .mirror_selection(selected, axis, self.progress.as_mut());
        self.dispatch();
        result
    }

    pub fn to_grayscale_selection(&mut self, selected: &[usize]) -> Result<(), EditError> {
        let result = self
            .pages
            .to_grayscale_selection(selected, self.progress.as_mut());
        self.dispatch();
        result
    }

    pub fn to_binary_selection(
        &mut self,
        selected: &[usize],
        threshold: Option<u8>,
    ) -> Result<(), EditError> {
        let result = self
            .pages
            .to_binary_selection(selected, threshold, self.progress.as_mut());
        self.dispatch();
        result
    }

    /// Insert a page in the background color before the first selected
    /// page, or after the last page when nothing is selected.
    pub fn insert_blank(&mut self, selected: &[usize]) -> usize {
        let at = selected
            .iter()
            .copied()
            .min()
            .unwrap_or(self.pages.len());
        let index = self.pages.insert_blank(at, self.canvas.background());
        self.dispatch();
        index
    }

    /// The host's selection changed. The canvas shows its last entry.
    pub fn select(&mut self, selected: &[usize]) {
        self.canvas
            .activate(&mut self.pages, selected.last().copied());
        self.dispatch();
    }

    /// Hand the selected pages, or all pages when nothing is selected, to
    /// the save hook.
    pub fn request_save(&mut self, selected: &[usize]) {
        let pages: Vec<&Page> = if selected.is_empty() {
            self.pages.iter().collect()
        } else {
            selected.iter().map(|&i| &self.pages.pages()[i]).collect()
        };
        log::info!("save requested for {} pages", pages.len());
        self.save_hook.on_save_requested(&pages);
    }

    // ========================================================================
    // Canvas
    // ========================================================================

    pub fn pointer_down(&mut self, event: PointerEvent) {
        self.with_canvas(|canvas, pages| canvas.pointer_down(pages, event));
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        self.with_canvas(|canvas, pages| canvas.pointer_move(pages, event));
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        self.with_canvas(|canvas, pages| canvas.pointer_up(pages, event));
    }

    pub fn undo(&mut self) -> Result<bool, EditError> {
        self.with_canvas(|canvas, pages| canvas.undo(pages))
    }

    pub fn redo(&mut self) -> Result<bool, EditError> {
        self.with_canvas(|canvas, pages| canvas.redo(pages))
    }

    /// Run any canvas operation and deliver the events it caused.
    pub fn with_canvas<R>(
        &mut self,
        op: impl FnOnce(&mut CanvasView, &mut PageCollection) -> R,
    ) -> R {
        let result = op(&mut self.canvas, &mut self.pages);
        self.dispatch();
        result
    }

    // ========================================================================
    // Event routing
    // ========================================================================

    fn dispatch(&mut self) {
        let mut events = self.pages.drain_events();
        self.canvas.revalidate(&mut self.pages);
        for event in &events {
            match event {
                EditorEvent::ContentChanged { index } if Some(*index) == self.canvas.active_index() => {
                    self.canvas.reload(&mut self.pages);
                }
                EditorEvent::SelectionChanged { selected } => {
                    self.canvas.activate(&mut self.pages, selected.last().copied());
                }
                _ => {}
            }
        }
        events.extend(self.canvas.drain_events());

        for event in &events {
            for observer in &mut self.observers {
                observer.notify(event);
            }
        }
    }
}
