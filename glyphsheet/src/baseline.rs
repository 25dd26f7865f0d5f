//! Per line baselines and descender detection.

use crate::{bbox::BoundingBox, lines::TextLine, stats};

/// Lines with fewer glyphs than this use the mean bottom as their baseline.
const MIN_LINE_GLYPHS: usize = 4;
/// Percentile of the glyph bottoms taken as the baseline of a line.
const BASELINE_PERCENTILE: f64 = 20.0;
/// A glyph descends when its bottom is below the baseline by more than this
/// fraction of its own height.
const DESCENDER_RATIO: f64 = 0.1;
/// The same, for short lines, as a fraction of the tallest glyph in the line.
const SHORT_LINE_DESCENDER_RATIO: f64 = 0.25;

/// Vertical position of a glyph relative to the baseline of its line.
///
/// Offsets are measured upward from the baseline: a glyph sitting on the
/// baseline has a `bottomline` of zero and a `topline` equal to its height.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct BaselineMetrics {
    /// Index of the line containing the glyph.
    pub line: usize,
    pub baseline: f64,
    /// Offset of the glyph's top above the baseline.
    pub topline: f64,
    /// Offset of the glyph's bottom above the baseline; negative when the
    /// glyph hangs below it.
    pub bottomline: f64,
    /// How far a descender hangs below the baseline (a negative value), zero
    /// for any other glyph.
    pub adjustment: f64,
    pub is_descender: bool,
}

/// Estimates the baseline of every line and measures each glyph against the
/// baseline of its own line.
///
/// The result is indexed like `bboxes`. Every glyph must belong to exactly
/// one of `lines`.
pub fn measure_baselines(bboxes: &[BoundingBox], lines: &[TextLine]) -> Vec<BaselineMetrics> {
    let mut metrics = vec![BaselineMetrics::default(); bboxes.len()];
    for (line_ix, line) in lines.iter().enumerate() {
        let members: Vec<_> = line.members.iter().map(|&ix| bboxes[ix]).collect();
        let is_descender = descender_test(&members);
        let Some(baseline) = line_baseline(&members) else {
            continue;
        };
        log::debug!(
            "line {line_ix}: {} glyphs, baseline {baseline:.2}",
            members.len()
        );
        for (&ix, bbox) in line.members.iter().zip(&members) {
            let descends = is_descender(baseline, bbox);
            metrics[ix] = BaselineMetrics {
                line: line_ix,
                baseline,
                topline: baseline - bbox.y_min,
                bottomline: baseline - bbox.y_max,
                adjustment: if descends { baseline - bbox.y_max } else { 0.0 },
                is_descender: descends,
            };
        }
    }
    metrics
}

/// The baseline of a line of glyphs, `None` if the line is empty.
pub fn line_baseline(members: &[BoundingBox]) -> Option<f64> {
    let bottoms: Vec<_> = members.iter().map(|bbox| bbox.y_max).collect();
    if bottoms.len() < MIN_LINE_GLYPHS {
        if !bottoms.is_empty() {
            log::warn!(
                "only {} glyphs in line, using the mean bottom as baseline",
                bottoms.len()
            );
        }
        stats::mean(&bottoms)
    } else {
        stats::percentile(&bottoms, BASELINE_PERCENTILE)
    }
}

fn descender_test(members: &[BoundingBox]) -> impl Fn(f64, &BoundingBox) -> bool {
    let short_line_limit = (members.len() < MIN_LINE_GLYPHS).then(|| {
        members.iter().map(BoundingBox::height).fold(0.0, f64::max) * SHORT_LINE_DESCENDER_RATIO
    });
    move |baseline: f64, bbox: &BoundingBox| match short_line_limit {
        Some(limit) => bbox.y_max - baseline > limit,
        None => baseline - bbox.y_max < -DESCENDER_RATIO * bbox.height(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(members: impl IntoIterator<Item = usize>) -> TextLine {
        TextLine {
            members: members.into_iter().collect(),
            center: 0.0,
        }
    }

    #[test]
    fn descender_hangs_below_baseline() {
        // four glyphs on a baseline at 100, a 'p' reaching down to 130
        let bboxes = [
            BoundingBox::new(0.0, 10.0, 60.0, 100.0),
            BoundingBox::new(20.0, 30.0, 80.0, 100.0),
            BoundingBox::new(40.0, 50.0, 80.0, 130.0),
            BoundingBox::new(60.0, 70.0, 60.0, 100.0),
            BoundingBox::new(80.0, 90.0, 80.0, 100.0),
        ];
        let metrics = measure_baselines(&bboxes, &[line(0..5)]);
        assert!(metrics.iter().all(|m| m.baseline == 100.0));
        let descenders: Vec<_> = metrics.iter().map(|m| m.is_descender).collect();
        assert_eq!(descenders, [false, false, true, false, false]);
        assert_eq!(metrics[2].adjustment, -30.0);
        assert_eq!(metrics[2].topline, 20.0);
        assert_eq!(metrics[2].bottomline, -30.0);
        assert_eq!(metrics[0].topline, 40.0);
        assert_eq!(metrics[0].adjustment, 0.0);
    }

    #[test]
    fn baseline_is_twentieth_percentile() {
        let bboxes = [
            BoundingBox::new(0.0, 10.0, 0.0, 100.0),
            BoundingBox::new(0.0, 10.0, 0.0, 102.0),
            BoundingBox::new(0.0, 10.0, 0.0, 104.0),
            BoundingBox::new(0.0, 10.0, 0.0, 106.0),
            BoundingBox::new(0.0, 10.0, 0.0, 108.0),
            BoundingBox::new(0.0, 10.0, 0.0, 110.0),
        ];
        // rank 0.2 * 5 = 1: exactly the second lowest bottom
        assert_eq!(line_baseline(&bboxes), Some(102.0));
        assert_eq!(line_baseline(&[]), None);
    }

    #[test]
    fn short_line_uses_mean_bottom() {
        let bboxes = [
            BoundingBox::new(0.0, 10.0, 0.0, 40.0),
            BoundingBox::new(20.0, 30.0, 20.0, 40.0),
            BoundingBox::new(40.0, 50.0, 20.0, 70.0),
        ];
        let metrics = measure_baselines(&bboxes, &[line(0..3)]);
        // mean bottom is 50; the tallest glyph is 50 high, so a descender
        // must reach more than 12.5 below the baseline
        assert_eq!(metrics[0].baseline, 50.0);
        assert!(!metrics[0].is_descender);
        assert!(metrics[2].is_descender);
        assert_eq!(metrics[2].adjustment, -20.0);
    }

    #[test]
    fn single_glyph_sits_on_its_own_baseline() {
        let bboxes = [BoundingBox::new(0.0, 10.0, 0.0, 10.0)];
        let metrics = measure_baselines(&bboxes, &[line([0])]);
        assert_eq!(
            metrics[0],
            BaselineMetrics {
                line: 0,
                baseline: 10.0,
                topline: 10.0,
                bottomline: 0.0,
                adjustment: 0.0,
                is_descender: false,
            }
        );
    }

    #[test]
    fn lines_are_measured_independently() {
        let bboxes = [
            BoundingBox::new(0.0, 10.0, 0.0, 10.0),
            BoundingBox::new(0.0, 10.0, 100.0, 120.0),
        ];
        let metrics = measure_baselines(&bboxes, &[line([0]), line([1])]);
        assert_eq!(metrics[1].line, 1);
        assert_eq!(metrics[1].baseline, 120.0);
        assert_eq!(metrics[1].topline, 20.0);
    }
}
