//! Per glyph measurements and the outlier and punctuation flags.

use crate::{baseline::BaselineMetrics, bbox::BoundingBox, reference::Cluster, stats};

/// Glyphs larger than the median by these factors are outliers.
const OUTLIER_AREA: f64 = 2.5;
const OUTLIER_HEIGHT: f64 = 1.5;
const OUTLIER_WIDTH: f64 = 2.0;
/// Glyphs smaller than the median by these factors may be punctuation.
const PUNCTUATION_AREA: f64 = 0.3;
const PUNCTUATION_HEIGHT: f64 = 0.3;
const PUNCTUATION_WIDTH: f64 = 0.2;
/// Punctuation is never taller than this fraction of the median height.
const PUNCTUATION_MAX_HEIGHT: f64 = 0.6;

/// Everything measured about a single glyph.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct GlyphMetrics {
    /// Index of the text line containing the glyph.
    pub line: usize,
    pub height: f64,
    pub width: f64,
    pub area: f64,
    /// Distance a descender hangs below the baseline, as a negative value.
    pub adjustment: f64,
    pub topline: f64,
    pub bottomline: f64,
    /// Height of the glyph above the baseline; for glyphs that sit on the
    /// baseline this is just the height.
    pub calculated_height: f64,
    pub is_descender: bool,
    pub is_outlier: bool,
    pub is_punctuation: bool,
    /// The typographic cluster, once cluster centers are known.
    pub cluster: Option<Cluster>,
}

impl GlyphMetrics {
    fn new(bbox: &BoundingBox, baseline: &BaselineMetrics) -> Self {
        let height = bbox.height();
        Self {
            line: baseline.line,
            height,
            width: bbox.width(),
            area: bbox.area(),
            adjustment: baseline.adjustment,
            topline: baseline.topline,
            bottomline: baseline.bottomline,
            calculated_height: height + baseline.adjustment,
            is_descender: baseline.is_descender,
            is_outlier: false,
            is_punctuation: false,
            cluster: None,
        }
    }

    /// True for glyphs that inform the typographic line estimate.
    pub fn is_regular(&self) -> bool {
        !(self.is_outlier || self.is_punctuation)
    }
}

/// Median glyph dimensions that outliers and punctuation are judged against.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct Medians {
    pub area: f64,
    pub height: f64,
    pub width: f64,
}

/// Measurements for every glyph on a sheet, indexed like the glyphs.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct MetricsTable {
    rows: Vec<GlyphMetrics>,
    medians: Medians,
}

impl MetricsTable {
    /// Measures every glyph and flags outliers and punctuation.
    ///
    /// `baselines` must be indexed like `bboxes`.
    pub fn classify(bboxes: &[BoundingBox], baselines: &[BaselineMetrics]) -> Self {
        debug_assert_eq!(bboxes.len(), baselines.len());
        let mut rows: Vec<_> = bboxes
            .iter()
            .zip(baselines)
            .map(|(bbox, baseline)| GlyphMetrics::new(bbox, baseline))
            .collect();
        let medians = Medians {
            area: median_of(&rows, |row| row.area),
            height: median_of(&rows, |row| row.height),
            width: median_of(&rows, |row| row.width),
        };
        log::debug!(
            "median area {:.2}, height {:.2}, width {:.2}",
            medians.area,
            medians.height,
            medians.width
        );
        for row in &mut rows {
            row.is_outlier = row.area > OUTLIER_AREA * medians.area
                || row.height > OUTLIER_HEIGHT * medians.height
                || row.width > OUTLIER_WIDTH * medians.width;
            // an oversized glyph is never treated as punctuation
            row.is_punctuation = !row.is_outlier
                && (row.area < PUNCTUATION_AREA * medians.area
                    || row.height < PUNCTUATION_HEIGHT * medians.height
                    || row.width < PUNCTUATION_WIDTH * medians.width)
                && row.height <= PUNCTUATION_MAX_HEIGHT * medians.height;
        }
        Self { rows, medians }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, ix: usize) -> Option<&GlyphMetrics> {
        self.rows.get(ix)
    }

    pub fn rows(&self) -> &[GlyphMetrics] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [GlyphMetrics] {
        &mut self.rows
    }

    pub fn medians(&self) -> Medians {
        self.medians
    }

    pub fn toplines(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|row| row.topline)
    }

    /// Toplines of the glyphs that are neither outliers nor punctuation.
    pub fn regular_toplines(&self) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|row| row.is_regular())
            .map(|row| row.topline)
            .collect()
    }

    pub fn outliers(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices_where(|row| row.is_outlier)
    }

    pub fn punctuation(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices_where(|row| row.is_punctuation)
    }

    pub fn descenders(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices_where(|row| row.is_descender)
    }

    fn indices_where<F>(&self, pred: F) -> impl Iterator<Item = usize> + '_
    where
        F: Fn(&GlyphMetrics) -> bool + 'static,
    {
        self.rows
            .iter()
            .enumerate()
            .filter_map(move |(ix, row)| pred(row).then_some(ix))
    }
}

fn median_of(rows: &[GlyphMetrics], field: impl Fn(&GlyphMetrics) -> f64) -> f64 {
    let values: Vec<_> = rows.iter().map(field).collect();
    stats::median(&values).unwrap_or_default()
}
