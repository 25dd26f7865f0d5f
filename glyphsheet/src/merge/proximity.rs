//! Attaching marks to the glyph they belong to.

use super::{MergeArena, MergeReason};
use crate::{bbox::BoundingBox, observer::Observer, settings::Settings, store::GlyphCandidate};

/// Attaches small glyphs (dots, accents, tittles) to a nearby base glyph.
///
/// The reference height is taken from the sorted glyph heights at rank
/// `reference_height_rank`, which ignores the few tallest shapes. Glyphs
/// shorter than `small_glyph_ratio` of it are marks; everything else is a
/// base. Each mark, in input order, joins the closest base that is
/// separated from it by a vertical gap and whose gap and horizontal center
/// offset are both within `attach_distance_ratio` of the reference height.
///
/// A base grows as marks are attached to it, and later marks are measured
/// against the grown box. Marks without a qualifying base are kept as
/// standalone glyphs.
pub fn attach_marks(
    glyphs: Vec<GlyphCandidate>,
    settings: &Settings,
    observer: &mut dyn Observer,
) -> Vec<GlyphCandidate> {
    let Some(reference) = reference_height(&glyphs, settings.reference_height_rank) else {
        return glyphs;
    };
    let small_limit = settings.small_glyph_ratio * reference;
    let distance_limit = settings.attach_distance_ratio * reference;
    log::debug!("mark attachment: reference height {reference:.2}, max distance {distance_limit:.2}");

    let (marks, bases): (Vec<usize>, Vec<usize>) =
        (0..glyphs.len()).partition(|&ix| glyphs[ix].bbox.height() < small_limit);
    let mut arena = MergeArena::new(glyphs);
    for mark in marks {
        let mark_bbox = arena.bbox(mark);
        let mut best: Option<(usize, f64)> = None;
        for &base in &bases {
            let Some(distance) = attachment_distance(&mark_bbox, &arena.bbox(base), distance_limit)
            else {
                continue;
            };
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((base, distance));
            }
        }
        if let Some((base, _)) = best {
            arena.merge(base, mark, MergeReason::Attachment, observer);
        }
    }
    arena.into_survivors()
}

/// Height at the given rank of the sorted glyph heights.
fn reference_height(glyphs: &[GlyphCandidate], rank: f64) -> Option<f64> {
    let mut heights: Vec<_> = glyphs.iter().map(|glyph| glyph.bbox.height()).collect();
    heights.sort_by(f64::total_cmp);
    let ix = ((heights.len() as f64 * rank) as usize).min(heights.len().checked_sub(1)?);
    Some(heights[ix])
}

/// Returns the distance between a mark and a base if the mark may attach to
/// it.
///
/// The vertical gap is measured between the nearest horizontal edges; a
/// mark that overlaps the base vertically (or touches it) never attaches.
fn attachment_distance(mark: &BoundingBox, base: &BoundingBox, limit: f64) -> Option<f64> {
    let vertical = (mark.y_max - base.y_min)
        .abs()
        .min((mark.y_min - base.y_max).abs());
    let horizontal = (mark.center_x() - base.center_x()).abs();
    (vertical > 0.0 && vertical <= limit && horizontal <= limit).then(|| vertical.hypot(horizontal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NullObserver;

    fn glyph(id: usize, bbox: [f64; 4]) -> GlyphCandidate {
        GlyphCandidate::new(id, bbox.into(), format!("M{},{} Z", bbox[0], bbox[2]).into())
    }

    fn attach(glyphs: Vec<GlyphCandidate>) -> Vec<GlyphCandidate> {
        attach_marks(glyphs, &Settings::default(), &mut NullObserver)
    }

    #[test]
    fn dot_above_stem_attaches() {
        // reference height 12, so marks are below 4.8 and may be 2.4 away
        let output = attach(vec![
            glyph(0, [4.0, 6.0, 0.0, 2.0]),
            glyph(1, [0.0, 10.0, 3.0, 15.0]),
        ]);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].id, 1);
        assert_eq!(output[0].bbox, BoundingBox::new(0.0, 10.0, 0.0, 15.0));
        assert_eq!(output[0].path.as_str(), "M0,3 Z M4,0 Z");
    }

    #[test]
    fn period_beside_glyph_stays_alone() {
        let output = attach(vec![
            glyph(0, [0.0, 10.0, 0.0, 20.0]),
            glyph(1, [20.0, 30.0, 0.0, 20.0]),
            glyph(2, [12.0, 14.0, 18.0, 20.0]),
        ]);
        assert_eq!(output.len(), 3);
        assert_eq!(output[2].bbox, BoundingBox::new(12.0, 14.0, 18.0, 20.0));
    }

    #[test]
    fn touching_mark_is_not_attached() {
        let output = attach(vec![
            glyph(0, [0.0, 10.0, 0.0, 20.0]),
            glyph(1, [4.0, 6.0, -2.0, 0.0]),
        ]);
        assert_eq!(output.len(), 2);
    }

    #[test]
    fn closest_base_wins() {
        // the mark sits between two stacked bases, closer to the lower one
        let mut records = Vec::new();
        let mut observer = |event: &crate::observer::Event<'_>| {
            if let crate::observer::Event::Merged(record) = event {
                records.push((record.primary, record.secondary, record.reason));
            }
        };
        let output = attach_marks(
            vec![
                glyph(0, [0.0, 10.0, 0.0, 20.0]),
                glyph(1, [0.0, 10.0, 24.0, 44.0]),
                glyph(2, [4.0, 6.0, 21.5, 23.0]),
            ],
            &Settings::default(),
            &mut observer,
        );
        assert_eq!(output.len(), 2);
        assert_eq!(records, [(1, 2, MergeReason::Attachment)]);
        assert_eq!(output[1].bbox, BoundingBox::new(0.0, 10.0, 21.5, 44.0));
    }

    #[test]
    fn no_glyphs() {
        assert!(attach(Vec::new()).is_empty());
    }
}
