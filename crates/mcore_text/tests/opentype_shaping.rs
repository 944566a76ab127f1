//! Shaping and caret queries against a real OpenType font (DejaVu Sans).

use mcore_text::{FontFace, ShapeFont, TextSystem};

const LIGATURES: &str = "office affine flow";
const COMBINING: &str = "cafe\u{301} re\u{301}sume\u{301} nai\u{308}ve";

fn font_bytes() -> Vec<u8> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSans.ttf");
    std::fs::read(path).expect("font fixture is checked in")
}

fn system() -> TextSystem {
    let mut text = TextSystem::new(16);
    text.register(&font_bytes(), None).expect("DejaVu Sans parses");
    text
}

#[test]
fn family_name_comes_from_the_name_table() {
    let text = system();
    assert!(text.registry().find("DejaVu Sans").is_some());
}

#[test]
fn clusters_are_ordered_and_ligatures_merge() {
    let face = FontFace::from_data(font_bytes()).unwrap();
    let shaped = face.shape(LIGATURES, 16.0);

    let clusters: Vec<u32> = shaped.glyphs.iter().map(|g| g.cluster).collect();
    assert!(clusters.windows(2).all(|w| w[0] <= w[1]), "{clusters:?}");
    assert!(clusters
        .iter()
        .all(|&c| LIGATURES.is_char_boundary(c as usize)));
    // "ffi" and "fl" collapse into single glyphs
    assert!(shaped.glyphs.len() < LIGATURES.chars().count());
    assert!(shaped.total_advance() > 0.0);
}

#[test]
fn caret_stops_are_distinct_and_round_trip() {
    let mut text = system();
    for sample in [LIGATURES, COMBINING] {
        let mut previous = None;
        for offset in (0..=sample.len()).filter(|&i| sample.is_char_boundary(i)) {
            let x = text.measure_to_byte_offset(sample, 16.0, offset);
            if let Some(previous) = previous {
                assert!(x > previous, "{sample:?} offset {offset}: {x} <= {previous}");
            }
            previous = Some(x);
            assert_eq!(text.hit_test(sample, 16.0, x), offset, "{sample:?} at x={x}");
        }
    }
}

#[test]
fn caret_never_decreases_across_inner_bytes() {
    let mut text = system();
    let mut previous = 0.0;
    for offset in 0..=COMBINING.len() + 2 {
        let x = text.measure_to_byte_offset(COMBINING, 16.0, offset);
        assert!(x >= previous);
        previous = x;
    }
    let size = text.measure(COMBINING, 16.0, None);
    assert_eq!(previous, size.width);
}
