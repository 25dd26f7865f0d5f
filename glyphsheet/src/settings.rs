//! Tunable parameters for the pipeline.

/// Parameters controlling every stage of the pipeline.
///
/// The defaults reproduce the behavior the reference scale of existing jobs
/// was built with; changing them between the passes of a single job will
/// place regenerated glyphs on a different scale.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// Shapes at least this wide or tall are discarded as background noise.
    pub max_glyph_extent: f64,
    /// Minimum fraction of a shape's area that must lie inside another
    /// shape for the two to be merged.
    pub containment_ratio: f64,
    /// A glyph is a mark candidate when its height is below this fraction of
    /// the reference height.
    pub small_glyph_ratio: f64,
    /// Rank (as a fraction of the glyph count) of the sorted heights used as
    /// the reference height for mark attachment.
    pub reference_height_rank: f64,
    /// Maximum vertical gap and horizontal center offset, as a fraction of
    /// the reference height, between a mark and its base glyph.
    pub attach_distance_ratio: f64,
    /// Line grouping threshold used to order glyphs after merging, as a
    /// fraction of the mean glyph height.
    pub ordering_line_factor: f64,
    /// Line grouping threshold used when measuring baselines.
    pub baseline_line_factor: f64,
    /// Parameters for the height density model.
    pub density: DensitySettings,
    /// Scale factors outside of this range are reported as likely
    /// misclassifications.
    pub scale_warning_range: (f64, f64),
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_glyph_extent: 2000.0,
            containment_ratio: 0.4,
            small_glyph_ratio: 0.4,
            reference_height_rank: 0.8,
            attach_distance_ratio: 0.2,
            ordering_line_factor: 0.4,
            baseline_line_factor: 0.8,
            density: DensitySettings::default(),
            scale_warning_range: (0.6, 1.5),
        }
    }
}

/// Parameters for kernel density estimation and peak detection.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DensitySettings {
    /// Fewer samples than this skip density estimation entirely.
    pub min_samples: usize,
    /// Number of points on which the density is evaluated.
    pub grid_len: usize,
    /// Minimum index separation between two peaks.
    pub min_peak_distance: usize,
    /// Bandwidth factor and minimum prominence for the first fit.
    pub bandwidth: f64,
    pub prominence: f64,
    /// Bandwidth factor and minimum prominence for the retry performed when
    /// the first fit finds at most one peak.
    pub soft_bandwidth: f64,
    pub soft_prominence: f64,
}

impl Default for DensitySettings {
    fn default() -> Self {
        Self {
            min_samples: 4,
            grid_len: 100,
            min_peak_distance: 30,
            bandwidth: 0.25,
            prominence: 0.001,
            soft_bandwidth: 0.125,
            soft_prominence: 0.0005,
        }
    }
}
