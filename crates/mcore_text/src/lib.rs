//! Text shaping and measurement for mcore
//!
//! This crate provides:
//! - Font registration from raw bytes (TTF/OTF via ttf-parser)
//! - Text shaping (HarfBuzz via rustybuzz)
//! - Line breaking (UAX #14 via unicode-linebreak)
//! - Byte offset to caret position mapping, and back
//! - An LRU cache of layouts shared by rendering and measurement

pub mod font;
pub mod layout;
pub mod registry;
pub mod system;

pub use font::{
    FixedPitchFace, FontFace, FontLoader, FontMetrics, OpenTypeLoader, ShapeFont, ShapedGlyph,
    ShapedText,
};
pub use layout::{
    layout_text, normalize_wrap, snap_to_boundary, Caret, LayoutLine, PositionedGlyph, Size,
    TextLayout, TextMetrics,
};
pub use registry::{FontId, FontRegistry};
pub use system::{CacheStats, TextSystem, DEFAULT_CACHE_CAPACITY};

use thiserror::Error;

/// Text errors
#[derive(Error, Debug)]
pub enum TextError {
    #[error("Failed to load font: {0}")]
    FontLoadError(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid font data")]
    InvalidFontData,
}

pub type Result<T> = std::result::Result<T, TextError>;
