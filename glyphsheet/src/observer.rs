//! Structured diagnostics emitted while a sheet is processed.
//!
//! Nothing in the pipeline depends on what an observer does with these
//! events; they exist so that tools can visualize merge decisions, line
//! grouping and the height distribution.

use crate::{
    bbox::BoundingBox,
    density::DensityCurve,
    lines::TextLine,
    merge::MergeRecord,
    metrics::MetricsTable,
    normalize::NormalizedGlyph,
    reference::{CenterSource, ClusterCenters},
};

/// A pipeline stage.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Stage {
    ContainmentMerge,
    ProximityMerge,
    LineSegmentation,
    Classification,
    DensityEstimation,
    ReferenceLines,
    Normalization,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ContainmentMerge => "containment_merge",
            Self::ProximityMerge => "proximity_merge",
            Self::LineSegmentation => "line_segmentation",
            Self::Classification => "classification",
            Self::DensityEstimation => "density_estimation",
            Self::ReferenceLines => "reference_lines",
            Self::Normalization => "normalization",
        }
    }
}

/// Values computed by a stage.
#[derive(Copy, Clone, Debug)]
pub enum Event<'a> {
    /// Two glyphs were fused.
    Merged(&'a MergeRecord),
    /// Glyphs were grouped into lines with the given threshold factor.
    LinesSegmented {
        factor: f64,
        bboxes: &'a [BoundingBox],
        lines: &'a [TextLine],
    },
    /// Per-glyph measurements and flags are available.
    Classified(&'a MetricsTable),
    /// A density curve was fitted to the glyph toplines.
    DensityFitted {
        curve: &'a DensityCurve,
        peaks: &'a [usize],
    },
    /// The cluster centers for the job were chosen.
    CentersResolved {
        centers: &'a ClusterCenters,
        source: CenterSource,
    },
    /// A glyph needed an unusually large or small scale, which usually
    /// means it was assigned to the wrong cluster. The scale is applied
    /// regardless.
    ScaleOutOfRange {
        glyph: usize,
        scale: f64,
        target_height: f64,
        current_height: f64,
    },
    /// Every glyph was transformed.
    Normalized(&'a [NormalizedGlyph]),
}

impl Event<'_> {
    /// The stage that produced this event.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Merged(record) => record.reason.stage(),
            Self::LinesSegmented { .. } => Stage::LineSegmentation,
            Self::Classified(_) => Stage::Classification,
            Self::DensityFitted { .. } => Stage::DensityEstimation,
            Self::CentersResolved { .. } => Stage::ReferenceLines,
            Self::ScaleOutOfRange { .. } | Self::Normalized(_) => Stage::Normalization,
        }
    }
}

/// Receives diagnostics from the pipeline.
pub trait Observer {
    fn observe(&mut self, event: &Event<'_>);
}

impl<F> Observer for F
where
    F: FnMut(&Event<'_>),
{
    fn observe(&mut self, event: &Event<'_>) {
        self(event)
    }
}

/// Observer that drops all events into the ether.
pub struct NullObserver;

impl Observer for NullObserver {
    fn observe(&mut self, _event: &Event<'_>) {}
}
