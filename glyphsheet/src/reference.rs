//! Typographic reference lines recovered from the distribution of glyph
//! heights.

use crate::{
    density::{find_peaks, DensityCurve, DensityEstimator},
    metrics::MetricsTable,
    observer::{Event, Observer},
    settings::DensitySettings,
    stats,
};

/// Fraction of the tallest main center used as the punctuation center.
const PUNCTUATION_CENTER_RATIO: f64 = 0.2;

/// The typographic group a glyph is scaled to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Cluster {
    XHeight,
    CapHeight,
    /// Ascenders and capitals taller than the cap height.
    FullHeight,
    Punctuation,
    Outlier,
}

impl Cluster {
    /// Clusters in the order of their centers.
    pub const ALL: [Cluster; 5] = [
        Cluster::XHeight,
        Cluster::CapHeight,
        Cluster::FullHeight,
        Cluster::Punctuation,
        Cluster::Outlier,
    ];

    /// Position of the cluster among the five groups.
    pub fn index(self) -> usize {
        match self {
            Self::XHeight => 0,
            Self::CapHeight => 1,
            Self::FullHeight => 2,
            Self::Punctuation => 3,
            Self::Outlier => 4,
        }
    }

    /// Index of the center a glyph in this cluster is scaled to.
    ///
    /// There is no outlier center; outliers share the punctuation center.
    pub fn center_index(self) -> usize {
        self.index().min(3)
    }
}

/// Topline heights of the x-height, cap-height, full-height and punctuation
/// clusters.
///
/// These are computed once per job and reused unchanged by every later pass
/// so that all glyphs of a job share one scale.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ClusterCenters(pub [f64; 4]);

impl ClusterCenters {
    /// Creates centers from the three main heights, deriving the
    /// punctuation center.
    pub fn from_main(x_height: f64, cap_height: f64, full_height: f64) -> Self {
        let tallest = x_height.max(cap_height).max(full_height);
        Self([
            x_height,
            cap_height,
            full_height,
            tallest * PUNCTUATION_CENTER_RATIO,
        ])
    }

    pub fn x_height(&self) -> f64 {
        self.0[0]
    }

    pub fn cap_height(&self) -> f64 {
        self.0[1]
    }

    pub fn full_height(&self) -> f64 {
        self.0[2]
    }

    pub fn punctuation(&self) -> f64 {
        self.0[3]
    }

    /// The center a glyph in `cluster` is scaled to.
    pub fn for_cluster(&self, cluster: Cluster) -> f64 {
        self.0[cluster.center_index()]
    }

    /// The tallest of the three main centers.
    pub fn max_main(&self) -> f64 {
        self.x_height().max(self.cap_height()).max(self.full_height())
    }

    /// The cluster whose center is closest to `topline`; the first cluster
    /// wins ties.
    pub fn nearest(&self, topline: f64) -> Cluster {
        let mut best = (0, f64::INFINITY);
        for (ix, center) in self.0.iter().enumerate() {
            let distance = (topline - center).abs();
            if distance < best.1 {
                best = (ix, distance);
            }
        }
        Cluster::ALL[best.0]
    }

    /// Reference lines, measured down from the tallest main center.
    pub fn reference_lines(&self) -> ReferenceLines {
        let base_line = self.max_main();
        ReferenceLines {
            base_line,
            x_height: base_line - self.x_height(),
            cap_height: base_line - self.cap_height(),
            full_height: base_line - self.full_height(),
            punctuation_height: base_line - self.punctuation(),
        }
    }
}

impl From<[f64; 4]> for ClusterCenters {
    fn from(value: [f64; 4]) -> Self {
        Self(value)
    }
}

/// Vertical positions of the typographic lines of normalized glyphs.
///
/// Normalized glyphs are placed so that the top of the tallest main cluster
/// is at zero; each field is the offset of a line from that top.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceLines {
    pub base_line: f64,
    pub x_height: f64,
    pub cap_height: f64,
    pub full_height: f64,
    pub punctuation_height: f64,
}

/// Where the cluster centers of a pass came from.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CenterSource {
    /// Estimated from the glyphs of this pass.
    Computed,
    /// Loaded from the job, as established by an earlier pass.
    Stored,
}

/// Estimates cluster centers from the toplines of regular glyphs.
///
/// A density is fitted to the samples and its peaks become the centers. If
/// at most one peak is found the fit is repeated with a narrower bandwidth
/// and a lower prominence threshold. With too few samples, or when no peak
/// is found, the 20th and 80th percentiles of the samples stand in for the
/// x-height and cap-height.
pub fn estimate_centers(
    samples: &[f64],
    settings: &DensitySettings,
    estimator: &dyn DensityEstimator,
    observer: &mut dyn Observer,
) -> ClusterCenters {
    if samples.len() < settings.min_samples {
        log::warn!(
            "{} samples are too few for density estimation, using percentiles",
            samples.len()
        );
        return percentile_centers(samples);
    }
    let mut fit = fit_peaks(
        samples,
        settings,
        settings.bandwidth,
        settings.prominence,
        estimator,
    );
    if fit.as_ref().map_or(0, |(_, peaks)| peaks.len()) <= 1 {
        log::debug!("at most one peak found, retrying with a narrower bandwidth");
        fit = fit_peaks(
            samples,
            settings,
            settings.soft_bandwidth,
            settings.soft_prominence,
            estimator,
        );
    }
    let Some((curve, peaks)) = fit else {
        log::warn!("samples have no spread, using percentiles");
        return percentile_centers(samples);
    };
    observer.observe(&Event::DensityFitted {
        curve: &curve,
        peaks: &peaks,
    });
    centers_from_peaks(samples, &curve, &peaks)
}

fn fit_peaks(
    samples: &[f64],
    settings: &DensitySettings,
    bandwidth: f64,
    prominence: f64,
    estimator: &dyn DensityEstimator,
) -> Option<(DensityCurve, Vec<usize>)> {
    let curve = estimator.estimate(samples, bandwidth, settings.grid_len)?;
    let peaks = find_peaks(&curve.density, prominence, settings.min_peak_distance);
    log::debug!(
        "bandwidth {bandwidth}: peaks at {:?}",
        curve.points(&peaks).map(|(x, _)| x).collect::<Vec<_>>()
    );
    Some((curve, peaks))
}

fn centers_from_peaks(samples: &[f64], curve: &DensityCurve, peaks: &[usize]) -> ClusterCenters {
    let mut found: Vec<_> = curve.points(peaks).collect();
    match found.len() {
        0 => {
            log::warn!("no peaks in the height density, using percentiles");
            percentile_centers(samples)
        }
        1 => {
            log::warn!("only one peak in the height density");
            ClusterCenters::from_main(0.0, found[0].0, 0.0)
        }
        2 => ClusterCenters::from_main(found[0].0, found[1].0, 0.0),
        _ => {
            // keep the three strongest peaks, then order them by height
            found.sort_by(|a, b| b.1.total_cmp(&a.1));
            found.truncate(3);
            found.sort_by(|a, b| a.0.total_cmp(&b.0));
            ClusterCenters::from_main(found[0].0, found[1].0, found[2].0)
        }
    }
}

fn percentile_centers(samples: &[f64]) -> ClusterCenters {
    let x_height = stats::percentile(samples, 20.0).unwrap_or_default();
    let cap_height = stats::percentile(samples, 80.0).unwrap_or_default();
    ClusterCenters::from_main(x_height, cap_height, 0.0)
}

/// Assigns every glyph in `table` to a cluster.
///
/// Outliers and punctuation go to their own clusters; every other glyph
/// goes to the center nearest its topline.
pub fn assign_clusters(table: &mut MetricsTable, centers: &ClusterCenters) {
    for row in table.rows_mut() {
        row.cluster = Some(if row.is_outlier {
            Cluster::Outlier
        } else if row.is_punctuation {
            Cluster::Punctuation
        } else {
            centers.nearest(row.topline)
        });
    }
}
