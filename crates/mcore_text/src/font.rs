//! Font faces and shaping
//!
//! A face turns a UTF-8 run into positioned glyph advances. The OpenType face
//! parses with ttf-parser and shapes with rustybuzz; the fixed-pitch face is a
//! synthetic stand-in for headless hosts and tests.

use std::sync::Arc;

use crate::{Result, TextError};

/// Vertical font metrics in font units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
}

impl FontMetrics {
    fn scale(&self, font_size: f32) -> f32 {
        if self.units_per_em == 0 {
            0.0
        } else {
            font_size / self.units_per_em as f32
        }
    }

    pub fn ascender_px(&self, font_size: f32) -> f32 {
        self.ascender as f32 * self.scale(font_size)
    }

    pub fn descender_px(&self, font_size: f32) -> f32 {
        self.descender as f32 * self.scale(font_size)
    }

    /// (ascender - descender + line gap) at `font_size`
    pub fn line_height_px(&self, font_size: f32) -> f32 {
        let units = self.ascender as f32 - self.descender as f32 + self.line_gap as f32;
        units * self.scale(font_size)
    }
}

/// A single shaped glyph, advances in font units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    pub glyph_id: u16,
    /// Byte index of the source character within the shaped run
    pub cluster: u32,
    pub x_advance: i32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub codepoint: char,
}

/// Output of shaping one run
#[derive(Debug, Clone)]
pub struct ShapedText {
    pub glyphs: Vec<ShapedGlyph>,
    pub font_size: f32,
    pub units_per_em: u16,
}

impl ShapedText {
    /// Convert font units to pixels
    pub fn scale(&self, units: i32) -> f32 {
        if self.units_per_em == 0 {
            return 0.0;
        }
        units as f32 * self.font_size / self.units_per_em as f32
    }

    pub fn total_advance(&self) -> f32 {
        self.glyphs.iter().map(|g| self.scale(g.x_advance)).sum()
    }
}

/// A face that can shape left-to-right text
pub trait ShapeFont {
    fn metrics(&self) -> FontMetrics;

    /// Shape `text` (no newlines) at `font_size`. Clusters are byte indices
    /// into `text` and never decrease.
    fn shape(&self, text: &str, font_size: f32) -> ShapedText;

    fn family_name(&self) -> Option<String> {
        None
    }
}

/// Decodes raw font bytes into a shaping face
pub trait FontLoader {
    fn load(&self, data: &[u8]) -> Result<Arc<dyn ShapeFont>>;
}

/// Loader for TrueType/OpenType data (first face of a collection)
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenTypeLoader;

impl FontLoader for OpenTypeLoader {
    fn load(&self, data: &[u8]) -> Result<Arc<dyn ShapeFont>> {
        Ok(Arc::new(FontFace::from_data(data.to_vec())?))
    }
}

/// An OpenType face backed by owned font bytes
pub struct FontFace {
    // Borrows from `data`. Declared first so it is dropped before the bytes.
    shaper: rustybuzz::Face<'static>,
    data: Arc<[u8]>,
    index: u32,
    metrics: FontMetrics,
    family: Option<String>,
}

impl FontFace {
    pub fn from_data(data: Vec<u8>) -> Result<Self> {
        Self::from_data_with_index(data, 0)
    }

    pub fn from_data_with_index(data: Vec<u8>, index: u32) -> Result<Self> {
        let data: Arc<[u8]> = data.into();
        // SAFETY: the bytes live in a heap allocation owned by `data`, which
        // is never mutated and outlives `shaper` (see field order). The
        // 'static lifetime never leaves this struct.
        let bytes: &'static [u8] = unsafe { &*(data.as_ref() as *const [u8]) };

        let face = ttf_parser::Face::parse(bytes, index)
            .map_err(|e| TextError::FontParseError(e.to_string()))?;

        let metrics = FontMetrics {
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
            descender: face.descender(),
            line_gap: face.line_gap(),
        };
        if metrics.units_per_em == 0 {
            return Err(TextError::InvalidFontData);
        }

        let family = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == ttf_parser::name_id::FAMILY && name.is_unicode())
            .find_map(|name| name.to_string());

        let shaper = rustybuzz::Face::from_face(face);

        Ok(Self {
            shaper,
            data,
            index,
            metrics,
            family,
        })
    }

    /// The raw font bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Face index within a collection
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl ShapeFont for FontFace {
    fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    fn shape(&self, text: &str, font_size: f32) -> ShapedText {
        let mut buffer = rustybuzz::UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.set_direction(rustybuzz::Direction::LeftToRight);
        let output = rustybuzz::shape(&self.shaper, &[], buffer);

        let glyphs = output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions())
            .map(|(info, pos)| ShapedGlyph {
                glyph_id: info.glyph_id as u16,
                cluster: info.cluster,
                x_advance: pos.x_advance,
                x_offset: pos.x_offset,
                y_offset: pos.y_offset,
                codepoint: text
                    .get(info.cluster as usize..)
                    .and_then(|rest| rest.chars().next())
                    .unwrap_or('\u{FFFD}'),
            })
            .collect();
        ShapedText {
            glyphs,
            font_size,
            units_per_em: self.metrics.units_per_em,
        }
    }

    fn family_name(&self) -> Option<String> {
        self.family.clone()
    }
}

/// Synthetic monospace face: every character advances 600 of 1000 units.
///
/// Gives deterministic metrics without font files: at size 10 each character
/// is 6px wide and a line is 10px tall.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPitchFace;

impl FixedPitchFace {
    pub const UNITS_PER_EM: u16 = 1000;
    pub const ADVANCE: i32 = 600;
}

impl ShapeFont for FixedPitchFace {
    fn metrics(&self) -> FontMetrics {
        FontMetrics {
            units_per_em: Self::UNITS_PER_EM,
            ascender: 800,
            descender: -200,
            line_gap: 0,
        }
    }

    fn shape(&self, text: &str, font_size: f32) -> ShapedText {
        let glyphs = text
            .char_indices()
            .map(|(i, c)| ShapedGlyph {
                glyph_id: (c as u32 % u16::MAX as u32) as u16,
                cluster: i as u32,
                x_advance: if c.is_control() { 0 } else { Self::ADVANCE },
                x_offset: 0,
                y_offset: 0,
                codepoint: c,
            })
            .collect();
        ShapedText {
            glyphs,
            font_size,
            units_per_em: Self::UNITS_PER_EM,
        }
    }

    fn family_name(&self) -> Option<String> {
        Some("Fixed Pitch".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_pitch_advances() {
        let shaped = FixedPitchFace.shape("héllo", 10.0);
        assert_eq!(shaped.glyphs.len(), 5);
        assert_eq!(shaped.total_advance(), 30.0);
        let clusters: Vec<u32> = shaped.glyphs.iter().map(|g| g.cluster).collect();
        assert_eq!(clusters, vec![0, 1, 3, 4, 5]);
    }

    #[test]
    fn test_line_height_from_metrics() {
        let metrics = FixedPitchFace.metrics();
        assert_eq!(metrics.line_height_px(20.0), 20.0);
        assert_eq!(metrics.ascender_px(20.0), 16.0);
        assert_eq!(metrics.descender_px(20.0), -4.0);
    }

    #[test]
    fn test_invalid_font_data_is_rejected() {
        let err = OpenTypeLoader.load(b"definitely not a font").err();
        assert!(matches!(
            err,
            Some(TextError::FontParseError(_)) | Some(TextError::InvalidFontData)
        ));
        assert!(OpenTypeLoader.load(&[]).is_err());
    }
}
