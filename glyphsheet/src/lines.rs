//! Grouping glyphs into text lines.

use crate::bbox::BoundingBox;

/// A set of glyphs sharing a vertical band of the sheet.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct TextLine {
    /// Positions of the member glyphs, in order of increasing vertical
    /// center.
    pub members: Vec<usize>,
    /// The running vertical center after the last member joined.
    pub center: f64,
}

impl TextLine {
    fn start(ix: usize, center: f64) -> Self {
        Self {
            members: vec![ix],
            center,
        }
    }
}

/// Groups glyphs into lines ordered top to bottom.
///
/// Glyphs are visited in order of vertical center. A glyph joins the current
/// line when its center is closer than `factor` times the mean glyph height
/// to the line's running center, which then moves halfway toward the new
/// glyph's center. Otherwise the glyph starts a new line.
///
/// The running center is not the mean of the members: it weights recent
/// glyphs more heavily, so the result depends on visiting order.
pub fn segment_lines(bboxes: &[BoundingBox], factor: f64) -> Vec<TextLine> {
    if bboxes.is_empty() {
        return Vec::new();
    }
    let mut centers: Vec<(usize, f64)> = bboxes
        .iter()
        .map(BoundingBox::center_y)
        .enumerate()
        .collect();
    // stable, so equal centers keep input order
    centers.sort_by(|a, b| a.1.total_cmp(&b.1));
    let mean_height = bboxes.iter().map(BoundingBox::height).sum::<f64>() / bboxes.len() as f64;
    let threshold = factor * mean_height;
    log::debug!("line threshold {threshold:.2} (factor {factor})");

    let mut lines: Vec<TextLine> = Vec::new();
    for (ix, center) in centers {
        match lines.last_mut() {
            Some(line) if (center - line.center).abs() < threshold => {
                line.members.push(ix);
                line.center = (line.center + center) / 2.0;
            }
            _ => lines.push(TextLine::start(ix, center)),
        }
    }
    lines
}

/// Maps each glyph position to the index of the line containing it.
pub fn line_index(lines: &[TextLine], glyph_count: usize) -> Vec<usize> {
    let mut index = vec![0; glyph_count];
    for (line_ix, line) in lines.iter().enumerate() {
        for &member in &line.members {
            index[member] = line_ix;
        }
    }
    index
}
