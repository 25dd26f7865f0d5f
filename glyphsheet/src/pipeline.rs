//! Running all stages for one pass of a job.

use crate::{
    baseline,
    bbox::BoundingBox,
    density::{DensityEstimator, GaussianKde},
    job::CenterStore,
    lines, merge,
    metrics::MetricsTable,
    normalize::{self, NormalizedGlyph},
    observer::{Event, NullObserver, Observer},
    path::PathGeometry,
    reference::{self, CenterSource, ClusterCenters, ReferenceLines},
    settings::Settings,
    store::GlyphStore,
    Error,
};

/// Which pass of a job is being run.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Pass {
    /// The first pass: cluster centers are estimated from this sheet and
    /// stored with the job.
    #[default]
    Initial,
    /// A later pass over regenerated glyphs: the stored centers are reused
    /// so that the new glyphs match the scale of the first pass.
    Regenerate,
}

/// The result of normalizing a sheet.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizedSheet {
    /// The merged glyphs in line order.
    pub glyphs: Vec<NormalizedGlyph>,
    pub reference_lines: ReferenceLines,
    pub centers: ClusterCenters,
    /// Mean scale applied to the glyphs that are neither outliers nor
    /// punctuation.
    pub scale: f64,
}

impl NormalizedSheet {
    /// Splits the result into bounding boxes, paths, reference lines and
    /// scale.
    pub fn into_parts(self) -> (Vec<BoundingBox>, Vec<PathGeometry>, ReferenceLines, f64) {
        let (bboxes, paths) = self
            .glyphs
            .into_iter()
            .map(|glyph| (glyph.bbox, glyph.path))
            .unzip();
        (bboxes, paths, self.reference_lines, self.scale)
    }
}

/// Normalizes traced sheets.
///
/// ```no_run
/// use glyphsheet::{GlyphStore, JobDir, Pass, Pipeline};
///
/// # fn main() -> Result<(), glyphsheet::Error> {
/// let store = GlyphStore::from_paths(vec!["M0,0 L10,0 L10,20 Z".into()]);
/// let mut job = JobDir::new("jobs/1234");
/// let sheet = Pipeline::default().run(store, &mut job, Pass::Initial)?;
/// println!("scaled by {}", sheet.scale);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    settings: Settings,
    estimator: Box<dyn DensityEstimator>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Pipeline {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            estimator: Box::new(GaussianKde),
        }
    }

    /// Replaces the density estimator used to find the cluster centers.
    pub fn with_estimator(mut self, estimator: impl DensityEstimator + 'static) -> Self {
        self.estimator = Box::new(estimator);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs one pass over `store`.
    pub fn run(
        &self,
        store: GlyphStore,
        centers: &mut dyn CenterStore,
        pass: Pass,
    ) -> Result<NormalizedSheet, Error> {
        self.run_with_observer(store, centers, pass, &mut NullObserver)
    }

    /// Runs one pass over `store`, reporting intermediate values to
    /// `observer`.
    pub fn run_with_observer(
        &self,
        mut store: GlyphStore,
        center_store: &mut dyn CenterStore,
        pass: Pass,
        observer: &mut dyn Observer,
    ) -> Result<NormalizedSheet, Error> {
        let settings = &self.settings;
        // fail before doing any work if the job has no centers
        let stored = match pass {
            Pass::Initial => None,
            Pass::Regenerate => Some(center_store.load()?),
        };

        store.retain_within(settings.max_glyph_extent, settings.max_glyph_extent);
        let glyphs = merge::merge_glyphs(store, settings, observer);

        let bboxes: Vec<_> = glyphs.iter().map(|glyph| glyph.bbox).collect();
        let text_lines = lines::segment_lines(&bboxes, settings.baseline_line_factor);
        observer.observe(&Event::LinesSegmented {
            factor: settings.baseline_line_factor,
            bboxes: &bboxes,
            lines: &text_lines,
        });
        log::debug!("{} glyphs on {} lines", glyphs.len(), text_lines.len());
        let baselines = baseline::measure_baselines(&bboxes, &text_lines);
        let mut table = MetricsTable::classify(&bboxes, &baselines);

        let (centers, source) = match stored {
            Some(centers) => (centers, CenterSource::Stored),
            None => {
                let centers = reference::estimate_centers(
                    &table.regular_toplines(),
                    &settings.density,
                    self.estimator.as_ref(),
                    observer,
                );
                center_store.store(&centers)?;
                (centers, CenterSource::Computed)
            }
        };
        log::info!("cluster centers {:?} ({source:?})", centers.0);
        observer.observe(&Event::CentersResolved {
            centers: &centers,
            source,
        });

        reference::assign_clusters(&mut table, &centers);
        observer.observe(&Event::Classified(&table));

        let glyphs = normalize::normalize_glyphs(glyphs, &table, &centers, settings, observer);
        let scale = normalize::mean_scale(&glyphs, &table);
        Ok(NormalizedSheet {
            glyphs,
            reference_lines: centers.reference_lines(),
            centers,
            scale,
        })
    }
}
