//! Decoding image files with the `image` crate.
//!
//! PNG, JPEG, TIFF and BMP are supported. JPEG EXIF orientation is applied
//! so pages appear upright, and palette-encoded PNG/BMP files are reported
//! as [`SourceImage::Indexed`] so the collection can store them as grayscale.

use std::collections::HashMap;
use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, Decoder, Orientation, SourceImage};
use crate::bitmap::{Bitmap, PixelFormat};
use crate::Color;

/// PNG file signature.
const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// PNG IHDR color type for palette images.
const PNG_COLOR_PALETTE: u8 = 3;

/// Decode an image file from bytes.
///
/// # Arguments
///
/// * `bytes` - Raw file bytes
///
/// # Returns
///
/// The decoded image. Grayscale sources stay grayscale, everything else is
/// converted to 8-bit RGB.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognized.
/// Returns `DecodeError::CorruptedFile` if the data cannot be decoded.
pub fn decode_bytes(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    // Extract EXIF orientation before decoding
    let orientation = get_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    let bitmap = Bitmap::from_dynamic(apply_orientation(img, orientation));

    if is_palette_encoded(bytes) {
        if let Some(indexed) = index_colors(&bitmap) {
            return Ok(indexed);
        }
    }
    Ok(SourceImage::Direct(bitmap))
}

/// Extract the EXIF orientation from file bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

/// Check the file header for a color palette.
///
/// This is a quick check that doesn't fully parse the file. PNG color type 3
/// and BMP files with 8 or fewer bits per pixel count as palette-encoded.
pub fn is_palette_encoded(bytes: &[u8]) -> bool {
    // PNG: signature, IHDR length + tag, width, height, bit depth, color type
    if bytes.len() > 25 && bytes[..8] == PNG_MAGIC && &bytes[12..16] == b"IHDR" {
        return bytes[25] == PNG_COLOR_PALETTE;
    }
    // BMP: "BM", bits per pixel at offset 28
    if bytes.len() >= 30 && &bytes[..2] == b"BM" {
        let bpp = u16::from_le_bytes([bytes[28], bytes[29]]);
        return bpp <= 8;
    }
    false
}

/// Rebuild a palette from decoded pixels.
///
/// Returns `None` when the image uses more than 256 distinct colors.
fn index_colors(bitmap: &Bitmap) -> Option<SourceImage> {
    let mut palette: Vec<Color> = Vec::new();
    let mut lookup: HashMap<Color, u8> = HashMap::new();
    let mut indices = Vec::with_capacity(bitmap.pixel_count());

    for y in 0..bitmap.height {
        for x in 0..bitmap.width {
            let color = bitmap.pixel(x, y);
            let index = match lookup.get(&color) {
                Some(&i) => i,
                None => {
                    let i = u8::try_from(palette.len()).ok()?;
                    palette.push(color);
                    lookup.insert(color, i);
                    i
                }
            };
            indices.push(index);
        }
    }

    Some(SourceImage::Indexed {
        width: bitmap.width,
        height: bitmap.height,
        indices,
        palette,
    })
}

/// Reads and decodes files from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileDecoder;

impl Decoder for FileDecoder {
    fn decode(&mut self, path: &str) -> Result<SourceImage, DecodeError> {
        let bytes = std::fs::read(path)?;
        decode_bytes(&bytes)
    }
}

/// Encode a bitmap as PNG, used to build fixtures for decoder tests.
#[cfg(test)]
pub(crate) fn encode_png(bitmap: &Bitmap) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    bitmap
        .to_dynamic()
        .unwrap()
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
