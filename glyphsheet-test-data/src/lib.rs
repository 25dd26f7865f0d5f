//! test data shared between the glyphsheet crates.

/// A traced sheet with two lines of handwriting in the tracer's JSON form.
///
/// Each line reads `Helo.ipndx` in uneven handwriting: capitals and
/// ascenders, x-height letters, a period, an `i` with a separate dot, a
/// descending `p` and bowls traced with separate counters. The first shape
/// is the border of the scanned page.
pub static SHEET: &str = include_str!("../test_data/sheet.json");

/// Number of shapes in [`SHEET`], border included.
pub const SHEET_SHAPES: usize = 35;

/// Number of characters on [`SHEET`] once shapes are merged.
pub const SHEET_GLYPHS: usize = 20;

/// A single cluster of toplines, as traced from one glyph size.
const CLUSTER: [f64; 11] = [
    440.0, 470.0, 485.0, 492.0, 498.0, 500.0, 502.0, 508.0, 515.0, 530.0, 560.0,
];

/// Toplines of x-height letters around 500 and capitals around 800.
pub fn bimodal_toplines() -> Vec<f64> {
    shifted(&[0.0, 300.0])
}

/// Toplines of three glyph sizes around 300, 500 and 800.
///
/// The three clusters are too close for the default bandwidth to resolve
/// and only separate on the narrower retry.
pub fn trimodal_toplines() -> Vec<f64> {
    shifted(&[-200.0, 0.0, 300.0])
}

fn shifted(offsets: &[f64]) -> Vec<f64> {
    offsets
        .iter()
        .flat_map(|offset| CLUSTER.iter().map(move |v| v + offset))
        .collect()
}
