//! mcore paint vocabulary
//!
//! Value types shared by every other mcore crate: colors, geometry and the
//! draw commands a host records during a frame.
//!
//! # Features
//!
//! - CSS color parsing (hex, rgb, hsl, oklab, oklch, lab, lch, named)
//! - Perceptual interpolation in Oklab
//! - Rounded and styled rectangles with optional border and shadow
//! - Clip stack with intersecting push

pub mod clip;
pub mod color;
pub mod command;
pub mod primitives;

pub use clip::ClipStack;
pub use color::{Color, Oklab, Oklch};
pub use command::{DrawCommand, DrawList, TextRun};
pub use primitives::*;
