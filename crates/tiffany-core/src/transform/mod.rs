//! Whole-bitmap geometric transforms: quarter-turn rotation, mirroring and
//! cropping.
//!
//! Pages only ever rotate in 90° steps, so every transform here is an exact
//! pixel permutation with no interpolation.
//!
//! # Coordinate System
//!
//! - Rotation is clockwise, counted in quarter turns
//! - Crop rectangles are in whole pixels
//! - Origin is top-left corner

mod crop;
mod rotation;

pub use crop::crop;
pub use rotation::{mirror, rotate_quarter_turns, rotated_dimensions, MirrorAxis};
