//! Page icons for the host's page list.
//!
//! Each icon is a square RGB bitmap: the page scaled to fit and centered on a
//! light gray background. Modified pages get a small red marker in the
//! top-left corner.

use crate::bitmap::{Bitmap, PixelFormat};
use crate::decode::{scale_to_box, FilterType};
use crate::draw::fill_rect;
use crate::geometry::PixelRect;
use crate::page::Page;
use crate::Color;

/// Default icon edge length in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 100;

/// Background behind the scaled page.
pub const THUMBNAIL_BACKGROUND: Color = Color::rgb(240, 240, 240);

/// Marker drawn on modified pages.
pub const MODIFIED_MARKER: PixelRect = PixelRect::new(2, 2, 10, 10);

/// Renders fixed-size page icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailRenderer {
    size: u32,
}

impl Default for ThumbnailRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_THUMBNAIL_SIZE)
    }
}

impl ThumbnailRenderer {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Render the icon for `page`.
    pub fn render(&self, page: &Page) -> Bitmap {
        let mut icon = Bitmap::filled(self.size, self.size, PixelFormat::Rgb8, THUMBNAIL_BACKGROUND);

        match scale_to_box(page.bitmap(), self.size, FilterType::Bilinear) {
            Ok(scaled) => blit_centered(&mut icon, &scaled),
            Err(e) => log::debug!("page {} has no preview: {}", page.label(), e),
        }

        if page.is_modified() {
            fill_rect(&mut icon, MODIFIED_MARKER, Color::RED);
        }
        icon
    }
}

/// Copy `src` into the middle of `dst`, converting gray to RGB.
fn blit_centered(dst: &mut Bitmap, src: &Bitmap) {
    let off_x = dst.width.saturating_sub(src.width) / 2;
    let off_y = dst.height.saturating_sub(src.height) / 2;
    for y in 0..src.height.min(dst.height) {
        for x in 0..src.width.min(dst.width) {
            dst.set_pixel(off_x + x, off_y + y, src.pixel(x, y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(width: u32, height: u32) -> Page {
        Page::new(
            Bitmap::filled(width, height, PixelFormat::Gray8, Color::BLACK),
            "scan.png",
        )
    }

    #[test]
    fn test_icon_is_square() {
        let icon = ThumbnailRenderer::default().render(&page(300, 200));
        assert_eq!(icon.dimensions(), (100, 100));
        assert_eq!(icon.format, PixelFormat::Rgb8);
    }

    #[test]
    fn test_landscape_is_centered_vertically() {
        // 300x200 scales to 100x67, leaving 16 rows of background on top
        let icon = ThumbnailRenderer::default().render(&page(300, 200));
        assert_eq!(icon.pixel(50, 0), THUMBNAIL_BACKGROUND);
        assert_eq!(icon.pixel(50, 15), THUMBNAIL_BACKGROUND);
        assert_eq!(icon.pixel(50, 16), Color::BLACK);
        assert_eq!(icon.pixel(50, 82), Color::BLACK);
        assert_eq!(icon.pixel(50, 83), THUMBNAIL_BACKGROUND);
    }

    #[test]
    fn test_portrait_is_centered_horizontally() {
        let icon = ThumbnailRenderer::default().render(&page(50, 100));
        assert_eq!(icon.pixel(24, 50), THUMBNAIL_BACKGROUND);
        assert_eq!(icon.pixel(25, 50), Color::BLACK);
        assert_eq!(icon.pixel(74, 50), Color::BLACK);
        assert_eq!(icon.pixel(75, 50), THUMBNAIL_BACKGROUND);
    }

    #[test]
    fn test_clean_page_has_no_marker() {
        let icon = ThumbnailRenderer::default().render(&page(10, 100));
        assert_eq!(icon.pixel(5, 5), THUMBNAIL_BACKGROUND);
    }

    #[test]
    fn test_modified_page_has_marker() {
        let mut p = page(10, 100);
        p.record_edit();
        let icon = ThumbnailRenderer::default().render(&p);
        assert_eq!(icon.pixel(2, 2), Color::RED);
        assert_eq!(icon.pixel(11, 11), Color::RED);
        assert_eq!(icon.pixel(12, 12), THUMBNAIL_BACKGROUND);
        assert_eq!(icon.pixel(1, 1), THUMBNAIL_BACKGROUND);
    }

    #[test]
    fn test_rotated_page_has_marker() {
        let mut p = page(10, 100);
        p.add_rotation(1);
        let icon = ThumbnailRenderer::default().render(&p);
        assert_eq!(icon.pixel(5, 5), Color::RED);
    }

    #[test]
    fn test_empty_bitmap_renders_background() {
        let p = Page::new(Bitmap::empty(), "");
        let icon = ThumbnailRenderer::new(32).render(&p);
        assert_eq!(icon.dimensions(), (32, 32));
        assert!(icon.pixels.iter().all(|&v| v == 240));
    }
}
