//! The ordered, selectable list of pages.
//!
//! Selection is owned by the host and passed into each operation as a list
//! of indices. After every structural change the pages are renumbered so
//! that each label is its index plus one. Changes the host should react to
//! are queued as [`EditorEvent`]s and picked up with
//! [`PageCollection::drain_events`].

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::bitmap::{Bitmap, PixelFormat};
use crate::decode::Decoder;
use crate::error::EditError;
use crate::events::{EditorEvent, ProgressSink};
use crate::luminance::otsu_threshold;
use crate::page::{Page, PageId};
use crate::thumbnail::ThumbnailRenderer;
use crate::transform::{mirror, rotate_quarter_turns};
use crate::Color;

pub use crate::transform::MirrorAxis;

/// Size of a blank page inserted into an empty collection: US Letter at
/// 300 dpi.
pub const BLANK_PAGE_SIZE: (u32, u32) = (2550, 3300);

/// Where a load batch puts its pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// After the last page.
    #[default]
    Append,
    /// Before the first selected page.
    InsertBeforeSelection,
    /// Over the selected pages, in order.
    ReplaceSelection,
}

/// A clockwise rotation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotateCommand {
    Clockwise,
    CounterClockwise,
    HalfTurn,
}

impl RotateCommand {
    /// Equivalent number of clockwise quarter turns.
    pub fn quarter_turns(self) -> u8 {
        match self {
            RotateCommand::Clockwise => 1,
            RotateCommand::HalfTurn => 2,
            RotateCommand::CounterClockwise => 3,
        }
    }
}

/// A file of a load batch that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFailure {
    pub path: String,
    pub reason: String,
}

/// Outcome of a load batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Pages added or replaced.
    pub loaded: usize,
    pub failed: Vec<LoadFailure>,
    /// Index of the first page the batch filled.
    pub first_index: Option<usize>,
}

/// Where the next loaded page goes.
enum Placement {
    /// Insert at the cursor, then advance it.
    Insert(usize),
    /// Overwrite queued rows first, then insert after the last one.
    Replace { rows: VecDeque<usize>, next: usize },
}

impl Placement {
    fn place(&mut self, pages: &mut Vec<Page>, page: Page) -> usize {
        match self {
            Placement::Insert(cursor) => {
                let index = *cursor;
                pages.insert(index, page);
                *cursor += 1;
                index
            }
            Placement::Replace { rows, next } => match rows.pop_front() {
                Some(row) => {
                    pages[row] = page;
                    *next = row + 1;
                    row
                }
                None => {
                    let index = *next;
                    pages.insert(index, page);
                    *next += 1;
                    index
                }
            },
        }
    }

    /// Selected rows the batch did not overwrite.
    fn unconsumed(self) -> Vec<usize> {
        match self {
            Placement::Insert(_) => Vec::new(),
            Placement::Replace { rows, .. } => rows.into(),
        }
    }
}

/// Owns every loaded page, in display order.
#[derive(Debug, Clone, Default)]
pub struct PageCollection {
    pages: Vec<Page>,
    renderer: ThumbnailRenderer,
    outbox: Vec<EditorEvent>,
}

impl PageCollection {
    pub fn new(renderer: ThumbnailRenderer) -> Self {
        Self {
            pages: Vec::new(),
            renderer,
            outbox: Vec::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Current index of the page with `id`.
    pub fn index_of(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|page| page.id() == id)
    }

    pub fn labels(&self) -> Vec<usize> {
        self.pages.iter().map(Page::label).collect()
    }

    pub fn renderer(&self) -> &ThumbnailRenderer {
        &self.renderer
    }

    /// Take the queued events.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.outbox)
    }

    // ========================================================================
    // Structural changes
    // ========================================================================

    /// Add an already decoded page after the last one.
    pub fn push(&mut self, mut page: Page) -> usize {
        page.set_thumbnail(self.renderer.render(&page));
        self.pages.push(page);
        self.renumber();
        self.pages.len() - 1
    }

    /// Decode `paths` in order and place the resulting pages per `mode`.
    ///
    /// Files that fail to decode are logged, reported as
    /// [`EditorEvent::DecodeFailed`] and listed in the report; the batch
    /// carries on without them.
    ///
    /// # Panics
    ///
    /// Panics if a selected index is out of range.
    pub fn load<P: AsRef<str>>(
        &mut self,
        paths: &[P],
        mode: LoadMode,
        selected: &[usize],
        decoder: &mut dyn Decoder,
        progress: &mut dyn ProgressSink,
    ) -> Result<LoadReport, EditError> {
        let rows = self.sorted_rows(selected);
        let mut placement = match mode {
            LoadMode::Append => Placement::Insert(self.pages.len()),
            LoadMode::InsertBeforeSelection => {
                Placement::Insert(*rows.first().ok_or(EditError::NoInsertionPoint)?)
            }
            LoadMode::ReplaceSelection => {
                let first = *rows.first().ok_or(EditError::NoInsertionPoint)?;
                Placement::Replace {
                    rows: rows.into(),
                    next: first,
                }
            }
        };

        let mut report = LoadReport::default();
        let mut placed = Vec::with_capacity(paths.len());
        progress.begin("Reading...", paths.len());
        for (n, path) in paths.iter().enumerate() {
            let path = path.as_ref();
            match decoder.decode(path) {
                Ok(source) => {
                    let page = Page::new(source.into_bitmap(), path);
                    let index = placement.place(&mut self.pages, page);
                    report.first_index.get_or_insert(index);
                    report.loaded += 1;
                    placed.push(index);
                }
                Err(e) => {
                    log::warn!("could not read {}: {}", path, e);
                    self.outbox.push(EditorEvent::DecodeFailed {
                        path: path.to_string(),
                        reason: e.to_string(),
                    });
                    report.failed.push(LoadFailure {
                        path: path.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
            progress.step(n + 1);
        }
        progress.end();

        // Leftover rows all lie after the replaced ones, so placed indices
        // stay valid
        let leftovers = placement.unconsumed();
        for &row in leftovers.iter().rev() {
            self.pages.remove(row);
        }
        self.renumber();
        for index in placed {
            self.refresh_thumbnail(index);
        }

        log::info!(
            "loaded {} of {} files ({:?})",
            report.loaded,
            paths.len(),
            mode
        );
        let suggestion = match (report.first_index, leftovers.first()) {
            (Some(first), _) => Some(vec![first]),
            (None, Some(&row)) => Some(self.next_after_removal(row).into_iter().collect()),
            (None, None) => None,
        };
        if let Some(selected) = suggestion {
            self.outbox.push(EditorEvent::SelectionChanged { selected });
        }
        Ok(report)
    }

    /// Remove the selected pages. Returns the index the host should select
    /// next: the page that moved into the first removed slot, else the new
    /// last page, else nothing.
    ///
    /// # Panics
    ///
    /// Panics if a selected index is out of range.
    pub fn delete_selection(&mut self, selected: &[usize]) -> Result<Option<usize>, EditError> {
        let rows = self.sorted_rows(selected);
        let first = *rows.first().ok_or(EditError::EmptySelection)?;
        for &row in rows.iter().rev() {
            self.pages.remove(row);
        }
        self.renumber();

        let next = self.next_after_removal(first);
        log::info!("deleted {} pages", rows.len());
        self.outbox.push(EditorEvent::SelectionChanged {
            selected: next.into_iter().collect(),
        });
        Ok(next)
    }

    /// Rotate the selected pages clockwise by `quarter_turns` (1 to 3).
    ///
    /// # Panics
    ///
    /// Panics if a selected index is out of range.
    pub fn rotate_selection(
        &mut self,
        selected: &[usize],
        quarter_turns: u8,
        progress: &mut dyn ProgressSink,
    ) -> Result<(), EditError> {
        if !(1..=3).contains(&quarter_turns) {
            return Err(EditError::InvalidQuarterTurns(quarter_turns));
        }
        self.for_each_selected(selected, "Rotating...", progress, |page| {
            let rotated = rotate_quarter_turns(page.bitmap(), quarter_turns);
            page.set_bitmap(rotated);
            page.add_rotation(quarter_turns);
        })
    }

    /// Flip the selected pages. Counts as an edit.
    ///
    /// # Panics
    ///
    /// Panics if a selected index is out of range.
    pub fn mirror_selection(
        &mut self,
        selected: &[usize],
        axis: MirrorAxis,
        progress: &mut dyn ProgressSink,
    ) -> Result<(), EditError> {
        self.for_each_selected(selected, "Mirroring...", progress, |page| {
            let flipped = mirror(page.bitmap(), axis);
            page.set_bitmap(flipped);
            page.record_edit();
        })
    }

    /// Convert the selected pages to 8-bit grayscale. Counts as an edit.
    ///
    /// # Panics
    ///
    /// Panics if a selected index is out of range.
    pub fn to_grayscale_selection(
        &mut self,
        selected: &[usize],
        progress: &mut dyn ProgressSink,
    ) -> Result<(), EditError> {
        self.for_each_selected(selected, "Grayscale...", progress, |page| {
            let gray = page.bitmap().to_grayscale();
            page.set_bitmap(gray);
            page.record_edit();
        })
    }

    /// Reduce the selected pages to black and white. Levels above
    /// `threshold` turn white; `None` picks a threshold per page with
    /// Otsu's method. Counts as an edit.
    ///
    /// # Panics
    ///
    /// Panics if a selected index is out of range.
    pub fn to_binary_selection(
        &mut self,
        selected: &[usize],
        threshold: Option<u8>,
        progress: &mut dyn ProgressSink,
    ) -> Result<(), EditError> {
        self.for_each_selected(selected, "Binary...", progress, |page| {
            let gray = page.bitmap().to_grayscale();
            let level = threshold.unwrap_or_else(|| otsu_threshold(&gray.pixels));
            page.set_bitmap(gray.to_binary(level));
            page.record_edit();
        })
    }

    /// Insert a page filled with `color` at `index`, sized and formatted
    /// like the page it displaces (or the last page, or
    /// [`BLANK_PAGE_SIZE`] in an empty collection). Returns its index.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_blank(&mut self, index: usize, color: Color) -> usize {
        assert!(
            index <= self.pages.len(),
            "page index {} out of range for {} pages",
            index,
            self.pages.len()
        );
        let (width, height, format) = self
            .pages
            .get(index)
            .or_else(|| self.pages.last())
            .map(|page| {
                let bitmap = page.bitmap();
                (bitmap.width, bitmap.height, bitmap.format)
            })
            .unwrap_or((BLANK_PAGE_SIZE.0, BLANK_PAGE_SIZE.1, PixelFormat::Gray8));

        let mut page = Page::new(Bitmap::filled(width, height, format, color), "");
        page.record_edit();
        self.pages.insert(index, page);
        self.renumber();
        self.refresh_thumbnail(index);
        log::info!("inserted blank page at {}", index + 1);
        self.outbox.push(EditorEvent::SelectionChanged {
            selected: vec![index],
        });
        index
    }

    fn for_each_selected(
        &mut self,
        selected: &[usize],
        label: &str,
        progress: &mut dyn ProgressSink,
        mut op: impl FnMut(&mut Page),
    ) -> Result<(), EditError> {
        let rows = self.sorted_rows(selected);
        if rows.is_empty() {
            return Err(EditError::EmptySelection);
        }
        progress.begin(label, rows.len());
        for (n, &row) in rows.iter().enumerate() {
            op(&mut self.pages[row]);
            self.refresh_thumbnail(row);
            self.outbox.push(EditorEvent::ContentChanged { index: row });
            progress.step(n + 1);
        }
        progress.end();
        Ok(())
    }

    /// Re-render the icon of the page at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn refresh_thumbnail(&mut self, index: usize) {
        let icon = self.renderer.render(&self.pages[index]);
        self.pages[index].set_thumbnail(icon);
    }

    /// Where the selection goes after removing rows starting at `first`.
    fn next_after_removal(&self, first: usize) -> Option<usize> {
        match self.pages.len() {
            0 => None,
            len if first < len => Some(first),
            len => Some(len - 1),
        }
    }

    fn renumber(&mut self) {
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.set_label(i + 1);
        }
    }

    /// `selected` sorted ascending without duplicates.
    fn sorted_rows(&self, selected: &[usize]) -> Vec<usize> {
        let mut rows = selected.to_vec();
        rows.sort_unstable();
        rows.dedup();
        if let Some(&last) = rows.last() {
            assert!(
                last < self.pages.len(),
                "page index {} out of range for {} pages",
                last,
                self.pages.len()
            );
        }
        rows
    }

    // ========================================================================
    // Selection helpers
    // ========================================================================

    /// Pages with even labels (2, 4, 6...).
    ///
    /// Parity follows the 1-based labels the user sees, so the returned
    /// 0-based indices are the odd ones.
    pub fn select_even(&self) -> Vec<usize> {
        (1..self.pages.len()).step_by(2).collect()
    }

    /// Pages with odd labels (1, 3, 5...), at even 0-based indices.
    pub fn select_odd(&self) -> Vec<usize> {
        (0..self.pages.len()).step_by(2).collect()
    }

    pub fn select_modified(&self) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.is_modified())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn any_modified(&self) -> bool {
        self.pages.iter().any(Page::is_modified)
    }
}


#[cfg(test)]
mod proptests {
    use std::collections::HashSet;

    use super::*;
    use crate::decode::{DecodeError, SourceImage};
    use crate::events::NullProgress;
    use proptest::prelude::*;

    /// Paths starting with "bad" fail, everything else is a 1x1 page.
    struct TinyDecoder;

    impl Decoder for TinyDecoder {
        fn decode(&mut self, path: &str) -> Result<SourceImage, DecodeError> {
            if path.starts_with("bad") {
                return Err(DecodeError::InvalidFormat);
            }
            Ok(Bitmap::filled(1, 1, PixelFormat::Gray8, Color::WHITE).into())
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Load {
            mode: LoadMode,
            picks: Vec<prop::sample::Index>,
            files: Vec<bool>,
        },
        Delete(Vec<prop::sample::Index>),
        Blank(prop::sample::Index),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        let picks = proptest::collection::vec(any::<prop::sample::Index>(), 0..4);
        let mode = prop_oneof![
            Just(LoadMode::Append),
            Just(LoadMode::InsertBeforeSelection),
            Just(LoadMode::ReplaceSelection),
        ];
        prop_oneof![
            (mode, picks.clone(), proptest::collection::vec(any::<bool>(), 0..4))
                .prop_map(|(mode, picks, files)| Op::Load { mode, picks, files }),
            picks.prop_map(Op::Delete),
            any::<prop::sample::Index>().prop_map(Op::Blank),
        ]
    }

    fn rows(picks: &[prop::sample::Index], len: usize) -> Vec<usize> {
        if len == 0 {
            return Vec::new();
        }
        picks.iter().map(|p| p.index(len)).collect()
    }

    fn collection(len: usize) -> PageCollection {
        let mut pages = PageCollection::new(ThumbnailRenderer::new(4));
        for i in 0..len {
            pages.push(Page::new(
                Bitmap::filled(1, 1, PixelFormat::Gray8, Color::gray(i as u8)),
                "",
            ));
        }
        pages
    }

    proptest! {
        /// Property: Labels are always 1..=len after a delete.
        #[test]
        fn prop_delete_renumbers(
            len in 1usize..12,
            picks in proptest::collection::vec(any::<prop::sample::Index>(), 1..6),
        ) {
            let mut pages = collection(len);
            let selected: Vec<usize> = picks.iter().map(|p| p.index(len)).collect();
            let mut unique = selected.clone();
            unique.sort_unstable();
            unique.dedup();

            let next = pages.delete_selection(&selected).unwrap();
            prop_assert_eq!(pages.len(), len - unique.len());
            prop_assert_eq!(pages.labels(), (1..=pages.len()).collect::<Vec<_>>());
            match next {
                Some(i) => prop_assert!(i < pages.len()),
                None => prop_assert!(pages.is_empty()),
            }
        }

        /// Property: Any mix of loads, deletes and blank inserts keeps labels
        /// at 1..=len and page identities unique.
        #[test]
        fn prop_mixed_edits_keep_labels(
            start in 0usize..6,
            ops in proptest::collection::vec(op_strategy(), 1..12),
        ) {
            let mut pages = collection(start);
            for op in ops {
                let len = pages.len();
                match op {
                    Op::Load { mode, picks, files } => {
                        let paths: Vec<String> = files
                            .iter()
                            .enumerate()
                            .map(|(i, &ok)| if ok { format!("p{i}.png") } else { format!("bad{i}.png") })
                            .collect();
                        let selected = rows(&picks, len);
                        let result = pages.load(
                            paths.as_slice(),
                            mode,
                            &selected,
                            &mut TinyDecoder,
                            &mut NullProgress,
                        );
                        if selected.is_empty() && mode != LoadMode::Append {
                            prop_assert_eq!(result, Err(EditError::NoInsertionPoint));
                            prop_assert_eq!(pages.len(), len);
                        } else {
                            prop_assert!(result.is_ok());
                        }
                    }
                    Op::Delete(picks) => {
                        let selected = rows(&picks, len);
                        let result = pages.delete_selection(&selected);
                        prop_assert_eq!(result.is_err(), selected.is_empty());
                    }
                    Op::Blank(at) => {
                        pages.insert_blank(at.index(len + 1), Color::WHITE);
                    }
                }

                prop_assert_eq!(pages.labels(), (1..=pages.len()).collect::<Vec<_>>());
                let ids: HashSet<PageId> = pages.iter().map(Page::id).collect();
                prop_assert_eq!(ids.len(), pages.len());
                pages.drain_events();
            }
        }

        /// Property: Even and odd selections partition the pages.
        #[test]
        fn prop_even_odd_partition(len in 0usize..20) {
            let pages = collection(len);
            let mut all = pages.select_even();
            all.extend(pages.select_odd());
            all.sort_unstable();
            prop_assert_eq!(all, (0..len).collect::<Vec<_>>());
        }
    }
}
