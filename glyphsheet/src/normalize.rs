//! Scaling and aligning glyphs to the reference lines.

use crate::{
    bbox::BoundingBox,
    metrics::{GlyphMetrics, MetricsTable},
    observer::{Event, Observer},
    path::{GlyphTransform, PathGeometry},
    reference::{Cluster, ClusterCenters},
    settings::Settings,
    store::GlyphCandidate,
};

/// A glyph scaled and shifted onto the reference lines of its job.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizedGlyph {
    /// Id of the glyph in the tracer output.
    pub id: usize,
    /// Bounds of the rewritten path.
    pub bbox: BoundingBox,
    pub path: PathGeometry,
    pub cluster: Cluster,
    pub scale: f64,
}

/// Computes the transform that brings a glyph to the height of its
/// cluster.
///
/// The glyph is scaled so that its height above the baseline matches the
/// cluster center, and shifted so that its top lands on the line of that
/// cluster when the top of the tallest cluster is at zero.
pub fn glyph_transform(
    bbox: &BoundingBox,
    metrics: &GlyphMetrics,
    cluster: Cluster,
    centers: &ClusterCenters,
) -> GlyphTransform {
    let center = centers.for_cluster(cluster);
    let target_height = center - metrics.adjustment;
    let current_height = metrics.topline - metrics.bottomline;
    let scale = if target_height != 0.0 && current_height != 0.0 {
        target_height / current_height
    } else {
        1.0
    };
    let shift = -bbox.y_min + (centers.max_main() - center);
    GlyphTransform::new(shift, scale)
}

/// Transforms every glyph onto the reference lines given by `centers`.
///
/// `table` must be indexed like `glyphs` and have clusters assigned. A glyph
/// whose path cannot be parsed keeps its original path and gets an empty
/// bounding box.
pub fn normalize_glyphs(
    glyphs: Vec<GlyphCandidate>,
    table: &MetricsTable,
    centers: &ClusterCenters,
    settings: &Settings,
    observer: &mut dyn Observer,
) -> Vec<NormalizedGlyph> {
    let (low, high) = settings.scale_warning_range;
    let normalized: Vec<_> = glyphs
        .into_iter()
        .zip(table.rows())
        .map(|(glyph, metrics)| {
            let cluster = metrics.cluster.unwrap_or_else(|| centers.nearest(metrics.topline));
            let transform = glyph_transform(&glyph.bbox, metrics, cluster, centers);
            let scale = transform.scale;
            if !(low..=high).contains(&scale) {
                let target_height = centers.for_cluster(cluster) - metrics.adjustment;
                let current_height = metrics.topline - metrics.bottomline;
                log::warn!(
                    "glyph {} ({cluster:?}) scaled by {scale:.3}: target height {target_height:.2}, current height {current_height:.2}",
                    glyph.id
                );
                observer.observe(&Event::ScaleOutOfRange {
                    glyph: glyph.id,
                    scale,
                    target_height,
                    current_height,
                });
            }
            let (path, bbox) = match glyph.path.transformed(transform) {
                Ok(rewritten) => rewritten,
                Err(e) => {
                    log::warn!("glyph {} left untransformed: {e}", glyph.id);
                    (glyph.path, BoundingBox::ZERO)
                }
            };
            NormalizedGlyph {
                id: glyph.id,
                bbox,
                path,
                cluster,
                scale,
            }
        })
        .collect();
    observer.observe(&Event::Normalized(&normalized));
    normalized
}

/// The mean scale of the glyphs that are neither outliers nor punctuation,
/// or 1.0 if there are none.
pub fn mean_scale(glyphs: &[NormalizedGlyph], table: &MetricsTable) -> f64 {
    let scales: Vec<_> = glyphs
        .iter()
        .zip(table.rows())
        .filter(|(_, metrics)| metrics.is_regular())
        .map(|(glyph, _)| glyph.scale)
        .collect();
    crate::stats::mean(&scales).unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{baseline::BaselineMetrics, observer::NullObserver, reference::assign_clusters};

    const CENTERS: ClusterCenters = ClusterCenters([50.0, 70.0, 0.0, 14.0]);

    fn table_for(bboxes: &[BoundingBox], baseline: f64) -> MetricsTable {
        let baselines: Vec<_> = bboxes
            .iter()
            .map(|bbox| {
                let descends = bbox.y_max > baseline;
                BaselineMetrics {
                    baseline,
                    topline: baseline - bbox.y_min,
                    bottomline: baseline - bbox.y_max,
                    adjustment: if descends { baseline - bbox.y_max } else { 0.0 },
                    is_descender: descends,
                    ..Default::default()
                }
            })
            .collect();
        let mut table = MetricsTable::classify(bboxes, &baselines);
        assign_clusters(&mut table, &CENTERS);
        table
    }

    fn rect_glyph(id: usize, bbox: BoundingBox) -> GlyphCandidate {
        let BoundingBox {
            x_min,
            x_max,
            y_min,
            y_max,
        } = bbox;
        let path = format!("M{x_min},{y_min} L{x_max},{y_min} L{x_max},{y_max} L{x_min},{y_max} Z");
        GlyphCandidate::new(id, bbox, path.into())
    }

    fn normalize(bboxes: &[BoundingBox]) -> (Vec<NormalizedGlyph>, MetricsTable) {
        let table = table_for(bboxes, 200.0);
        let glyphs = bboxes
            .iter()
            .enumerate()
            .map(|(id, bbox)| rect_glyph(id, *bbox))
            .collect();
        let normalized = normalize_glyphs(
            glyphs,
            &table,
            &CENTERS,
            &Settings::default(),
            &mut NullObserver,
        );
        (normalized, table)
    }

    #[test]
    fn x_height_glyph_lands_below_cap_line() {
        // 40 high on a baseline at 200; the x-height is 50
        let (glyphs, _) = normalize(&[
            BoundingBox::new(0.0, 20.0, 160.0, 200.0),
            BoundingBox::new(30.0, 50.0, 130.0, 200.0),
        ]);
        assert_eq!(glyphs[0].cluster, Cluster::XHeight);
        assert_eq!(glyphs[0].scale, 1.25);
        // shifted so the top is at 70 - 50 = 20, then scaled
        assert_eq!(glyphs[0].bbox, BoundingBox::new(0.0, 25.0, 25.0, 75.0));
        assert_eq!(
            glyphs[0].path.as_str(),
            "M0.00,25.00 L25.00,25.00 L25.00,75.00 L0.00,75.00 Z"
        );
        // the capital fits exactly and its top is at zero
        assert_eq!(glyphs[1].cluster, Cluster::CapHeight);
        assert_eq!(glyphs[1].scale, 1.0);
        assert_eq!(glyphs[1].bbox, BoundingBox::new(30.0, 50.0, 0.0, 70.0));
    }

    #[test]
    fn descender_is_scaled_by_its_height_above_baseline() {
        let bboxes = [
            BoundingBox::new(0.0, 20.0, 150.0, 200.0),
            BoundingBox::new(30.0, 50.0, 150.0, 220.0),
            BoundingBox::new(60.0, 80.0, 150.0, 200.0),
        ];
        let (glyphs, table) = normalize(&bboxes);
        let row = table.get(1).unwrap();
        assert!(row.is_descender);
        assert_eq!(row.adjustment, -20.0);
        // target 50 + 20 over a current height of 70
        assert_eq!(glyphs[1].scale, 1.0);
        assert_eq!(glyphs[1].bbox, BoundingBox::new(30.0, 50.0, 20.0, 90.0));
    }

    #[test]
    fn zero_height_keeps_unit_scale() {
        let bbox = BoundingBox::new(0.0, 10.0, 200.0, 200.0);
        let metrics = GlyphMetrics {
            topline: 0.0,
            bottomline: 0.0,
            ..table_for(&[bbox], 200.0).rows()[0]
        };
        let transform = glyph_transform(&bbox, &metrics, Cluster::XHeight, &CENTERS);
        assert_eq!(transform.scale, 1.0);
        let transform = glyph_transform(&bbox, &metrics, Cluster::FullHeight, &CENTERS);
        assert_eq!(transform.scale, 1.0);
        assert_eq!(transform.shift, -200.0 + 70.0);
    }

    #[test]
    fn malformed_path_is_passed_through() {
        let bbox = BoundingBox::new(0.0, 20.0, 160.0, 200.0);
        let table = table_for(&[bbox], 200.0);
        let glyph = GlyphCandidate::new(0, bbox, "M0,0 L nonsense".into());
        let glyphs = normalize_glyphs(
            vec![glyph],
            &table,
            &CENTERS,
            &Settings::default(),
            &mut NullObserver,
        );
        assert_eq!(glyphs[0].path.as_str(), "M0,0 L nonsense");
        assert_eq!(glyphs[0].bbox, BoundingBox::ZERO);
    }

    #[test]
    fn extreme_scale_is_reported_and_applied() {
        let mut reports = Vec::new();
        let mut observer = |event: &Event<'_>| {
            if let Event::ScaleOutOfRange { glyph, scale, .. } = event {
                reports.push((*glyph, *scale));
            }
        };
        // a short glyph whose topline is still closest to the x-height
        let bboxes = [
            BoundingBox::new(0.0, 20.0, 167.0, 200.0),
            BoundingBox::new(30.0, 50.0, 150.0, 200.0),
            BoundingBox::new(60.0, 80.0, 150.0, 200.0),
        ];
        let table = table_for(&bboxes, 200.0);
        let glyphs = bboxes
            .iter()
            .enumerate()
            .map(|(id, bbox)| rect_glyph(id, *bbox))
            .collect();
        let normalized =
            normalize_glyphs(glyphs, &table, &CENTERS, &Settings::default(), &mut observer);
        assert_eq!(reports, [(0, 50.0 / 33.0)]);
        assert_eq!(normalized[0].scale, 50.0 / 33.0);
        assert_eq!(normalized[1].scale, 1.0);
    }

    #[test]
    fn mean_scale_skips_flagged_glyphs() {
        let bboxes = [
            BoundingBox::new(0.0, 20.0, 160.0, 200.0),
            BoundingBox::new(30.0, 50.0, 150.0, 200.0),
            BoundingBox::new(60.0, 80.0, 160.0, 200.0),
            // period
            BoundingBox::new(90.0, 94.0, 196.0, 200.0),
        ];
        let (glyphs, table) = normalize(&bboxes);
        assert!(table.get(3).unwrap().is_punctuation);
        assert_eq!(mean_scale(&glyphs, &table), 3.5 / 3.0);
        assert_eq!(mean_scale(&[], &MetricsTable::default()), 1.0);
    }
}
