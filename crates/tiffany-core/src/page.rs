//! A single loaded page and its edit metadata.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::bitmap::Bitmap;
use crate::canvas::ViewMemo;

/// Stems at least this long are shortened for display.
const NAME_SHORTEN_AT: usize = 13;
/// Characters kept at each end of a shortened name.
const NAME_KEEP: usize = 5;

static NEXT_PAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique page identity. Survives reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId(u64);

impl PageId {
    fn next() -> Self {
        PageId(NEXT_PAGE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// One page of the collection.
///
/// A page is modified when it has been rotated away from its loaded
/// orientation or edited since load.
#[derive(Debug, Clone)]
pub struct Page {
    id: PageId,
    bitmap: Bitmap,
    source_path: String,
    display_name: String,
    rotation: u8,
    change_count: u32,
    label: usize,
    thumbnail: Bitmap,
    view: Option<ViewMemo>,
}

impl Page {
    /// Create a page for a freshly decoded bitmap. Label and thumbnail are
    /// filled in when the page joins a collection.
    pub fn new(bitmap: Bitmap, source_path: impl Into<String>) -> Self {
        let source_path = source_path.into();
        let display_name = display_name_for(&source_path);
        Self {
            id: PageId::next(),
            bitmap,
            source_path,
            display_name,
            rotation: 0,
            change_count: 0,
            label: 0,
            thumbnail: Bitmap::empty(),
            view: None,
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Clockwise quarter turns applied since load, in `0..4`.
    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    /// Edits made since load.
    pub fn change_count(&self) -> u32 {
        self.change_count
    }

    /// 1-based position in the collection.
    pub fn label(&self) -> usize {
        self.label
    }

    pub fn thumbnail(&self) -> &Bitmap {
        &self.thumbnail
    }

    /// The canvas view saved when this page was last shown.
    pub fn view(&self) -> Option<&ViewMemo> {
        self.view.as_ref()
    }

    pub fn is_modified(&self) -> bool {
        self.rotation != 0 || self.change_count != 0
    }

    pub(crate) fn bitmap_mut(&mut self) -> &mut Bitmap {
        &mut self.bitmap
    }

    pub(crate) fn set_bitmap(&mut self, bitmap: Bitmap) {
        self.bitmap = bitmap;
    }

    pub(crate) fn add_rotation(&mut self, quarter_turns: u8) {
        self.rotation = (self.rotation + quarter_turns) % 4;
    }

    pub(crate) fn record_edit(&mut self) {
        self.change_count = self.change_count.saturating_add(1);
    }

    pub(crate) fn revert_edit(&mut self) {
        self.change_count = self.change_count.saturating_sub(1);
    }

    pub(crate) fn set_label(&mut self, label: usize) {
        self.label = label;
    }

    pub(crate) fn set_thumbnail(&mut self, thumbnail: Bitmap) {
        self.thumbnail = thumbnail;
    }

    pub(crate) fn set_view(&mut self, view: Option<ViewMemo>) {
        self.view = view;
    }
}

/// The name shown under a thumbnail: the file stem, shortened to
/// `first5..last5` when it is long.
pub fn display_name_for(source_path: &str) -> String {
    let stem = Path::new(source_path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let chars: Vec<char> = stem.chars().collect();
    if chars.len() < NAME_SHORTEN_AT {
        return stem;
    }
    let head: String = chars[..NAME_KEEP].iter().collect();
    let tail: String = chars[chars.len() - NAME_KEEP..].iter().collect();
    format!("{head}..{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::PixelFormat;
    use crate::Color;

    fn page() -> Page {
        Page::new(
            Bitmap::filled(4, 4, PixelFormat::Gray8, Color::WHITE),
            "/scans/page-01.png",
        )
    }

    #[test]
    fn test_new_page_is_clean() {
        let p = page();
        assert_eq!(p.rotation(), 0);
        assert_eq!(p.change_count(), 0);
        assert!(!p.is_modified());
        assert_eq!(p.display_name(), "page-01");
        assert!(p.view().is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(page().id(), page().id());
    }

    #[test]
    fn test_rotation_wraps() {
        let mut p = page();
        p.add_rotation(3);
        p.add_rotation(2);
        assert_eq!(p.rotation(), 1);
        assert!(p.is_modified());
        p.add_rotation(3);
        assert_eq!(p.rotation(), 0);
        assert!(!p.is_modified());
    }

    #[test]
    fn test_edit_counting_saturates() {
        let mut p = page();
        p.revert_edit();
        assert_eq!(p.change_count(), 0);
        p.record_edit();
        p.record_edit();
        p.revert_edit();
        assert_eq!(p.change_count(), 1);
        assert!(p.is_modified());
    }

    #[test]
    fn test_display_name_short() {
        assert_eq!(display_name_for("a/b/scan12.tif"), "scan12");
        // 12 characters stays as is
        assert_eq!(display_name_for("abcdefghijkl.png"), "abcdefghijkl");
    }

    #[test]
    fn test_display_name_long_is_shortened() {
        // 13 characters
        assert_eq!(display_name_for("abcdefghijklm.png"), "abcde..ijklm");
        assert_eq!(
            display_name_for("/home/me/Scan_2024-01-15_0001.tiff"),
            "Scan_.._0001"
        );
    }

    #[test]
    fn test_display_name_empty_path() {
        assert_eq!(display_name_for(""), "");
    }
}
