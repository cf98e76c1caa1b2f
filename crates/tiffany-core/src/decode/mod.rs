//! Image decoding for Tiffany.
//!
//! This module provides:
//! - The [`Decoder`] trait the page collection loads files through
//! - A filesystem decoder built on the `image` crate (PNG, JPEG, TIFF, BMP)
//! - In-memory decoding for hosts that hand over file bytes directly
//! - Resampling used for thumbnails
//!
//! Decoding happens synchronously, one file at a time, inside a load batch.
//! A failure is reported per file and never aborts the batch.

mod file;
mod memory;
mod resize;
mod types;

pub use file::{decode_bytes, get_orientation, is_palette_encoded, FileDecoder};
pub use memory::MemoryDecoder;
pub use resize::{fit_dimensions, resize, scale_to_box};
pub use types::{DecodeError, FilterType, Orientation, SourceImage};

#[cfg(test)]
pub(crate) use file::encode_png;

/// Turns a path into an image.
pub trait Decoder {
    /// Decode the file at `path`.
    fn decode(&mut self, path: &str) -> Result<SourceImage, DecodeError>;
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    fn decode(&mut self, path: &str) -> Result<SourceImage, DecodeError> {
        (**self).decode(path)
    }
}
