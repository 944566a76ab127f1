//! Caret queries must agree with the glyph positions used for drawing.

use std::sync::Arc;

use mcore_text::{FixedPitchFace, FontId, TextSystem};

fn system() -> (TextSystem, FontId) {
    let mut text = TextSystem::new(32);
    let font = text.register_face(Arc::new(FixedPitchFace), Some("mono"));
    (text, font)
}

#[test]
fn caret_matches_rendered_glyph_origin() {
    let (mut text, font) = system();
    let sample = "wrap me around a narrow box";
    let layout = text
        .layout_full(sample, Some(50.0), 10.0, font)
        .expect("font is registered");

    for glyph in layout.glyphs() {
        let caret = text.caret_position(sample, font, 10.0, Some(50.0), glyph.cluster as usize);
        let line = &layout.lines[caret.line];
        assert!(line.range.contains(&(glyph.cluster as usize)));
        assert_eq!(caret.x, glyph.x, "cluster {}", glyph.cluster);
        assert_eq!(caret.y + (line.baseline_y - line.top), glyph.y);
    }
}

#[test]
fn measure_is_monotonic_and_round_trips_through_hit_test() {
    let (mut text, _) = system();
    let sample = "naïve café ☕ text";
    let mut previous = 0.0;
    for offset in 0..=sample.len() {
        let x = text.measure_to_byte_offset(sample, 16.0, offset);
        assert!(x >= previous);
        previous = x;
        if sample.is_char_boundary(offset) {
            assert_eq!(text.hit_test(sample, 16.0, x), offset);
        }
    }
}

#[test]
fn wrapped_lines_cover_the_text_without_gaps() {
    let (mut text, font) = system();
    let sample = "first paragraph wraps\n\nthird after a blank line";
    let layout = text.layout_full(sample, Some(60.0), 10.0, font).unwrap();

    let mut expected_start = 0;
    for line in &layout.lines {
        assert_eq!(line.range.start, expected_start);
        expected_start = line.range.end;
        if sample[line.range.end..].starts_with('\n') {
            expected_start += 1;
        }
    }
    assert_eq!(expected_start, sample.len());
    assert_eq!(
        text.layout(sample, Some(60.0), 10.0, font).line_count as usize,
        layout.lines.len()
    );
}
