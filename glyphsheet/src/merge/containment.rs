//! Fusing shapes that lie inside one another.

use super::{MergeArena, MergeReason};
use crate::{bbox::BoundingBox, observer::Observer, settings::Settings, store::GlyphCandidate};

/// Fuses glyphs whose bounding boxes are fully or substantially contained
/// in one another.
///
/// Glyphs are visited in input order and each one absorbs every later glyph
/// that it contains, that contains it, or that shares at least
/// `containment_ratio` of the smaller box's area with it. The earlier glyph
/// always survives, so output is deterministic for a given input order.
///
/// A glyph grows as it absorbs others and may come to overlap a glyph it was
/// already compared against, so passes repeat until one fuses nothing. The
/// output therefore contains no pair of glyphs that would merge again.
pub fn merge_contained(
    glyphs: Vec<GlyphCandidate>,
    settings: &Settings,
    observer: &mut dyn Observer,
) -> Vec<GlyphCandidate> {
    let mut arena = MergeArena::new(glyphs);
    let mut passes = 0;
    loop {
        passes += 1;
        let merged = containment_pass(&mut arena, settings.containment_ratio, observer);
        log::trace!("containment pass {passes} fused {merged} shapes");
        if merged == 0 {
            break;
        }
    }
    arena.into_survivors()
}

fn containment_pass(arena: &mut MergeArena, ratio: f64, observer: &mut dyn Observer) -> usize {
    let live = arena.live();
    let mut merged = 0;
    for (pos, &primary) in live.iter().enumerate() {
        if !arena.is_live(primary) {
            continue;
        }
        // compare against the box as it was before this glyph absorbed
        // anything in this pass
        let bbox = arena.bbox(primary);
        let absorbed: Vec<_> = live[pos + 1..]
            .iter()
            .filter(|&&other| arena.is_live(other))
            .filter_map(|&other| {
                containment_reason(&bbox, &arena.bbox(other), ratio).map(|reason| (other, reason))
            })
            .collect();
        for (other, reason) in absorbed {
            arena.merge(primary, other, reason, observer);
            merged += 1;
        }
    }
    merged
}

/// Returns the reason two boxes belong to the same glyph, if any.
pub fn containment_reason(a: &BoundingBox, b: &BoundingBox, ratio: f64) -> Option<MergeReason> {
    if a.contains(b) || b.contains(a) {
        Some(MergeReason::Containment)
    } else if b.contained_fraction(a) >= ratio || a.contained_fraction(b) >= ratio {
        Some(MergeReason::PartialContainment)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{merge::MergeRecord, observer::Event, observer::NullObserver};

    #[derive(Default)]
    struct Records(Vec<MergeRecord>);

    impl Observer for Records {
        fn observe(&mut self, event: &Event<'_>) {
            if let Event::Merged(record) = event {
                self.0.push((*record).clone());
            }
        }
    }

    fn glyphs(bboxes: &[[f64; 4]]) -> Vec<GlyphCandidate> {
        bboxes
            .iter()
            .enumerate()
            .map(|(id, &bbox)| {
                let bbox = BoundingBox::from(bbox);
                let path = format!("M{},{} Z", bbox.x_min, bbox.y_min);
                GlyphCandidate::new(id, bbox, path.into())
            })
            .collect()
    }

    fn merge(glyphs: Vec<GlyphCandidate>) -> Vec<GlyphCandidate> {
        merge_contained(glyphs, &Settings::default(), &mut NullObserver)
    }

    #[test]
    fn counter_merges_into_bowl() {
        // an 'o' traced as outer contour plus its counter, and an 'l'
        let input = glyphs(&[
            [0.0, 40.0, 0.0, 40.0],
            [10.0, 30.0, 10.0, 30.0],
            [60.0, 70.0, 0.0, 60.0],
        ]);
        let mut records = Records::default();
        let output = merge_contained(input, &Settings::default(), &mut records);
        assert_eq!(output.len(), 2);
        assert_eq!(output[0].path.as_str(), "M0,0 Z M10,10 Z");
        assert_eq!(output[0].bbox, BoundingBox::new(0.0, 40.0, 0.0, 40.0));
        assert_eq!(records.0.len(), 1);
        assert_eq!(records.0[0].primary, 0);
        assert_eq!(records.0[0].secondary, 1);
        assert_eq!(records.0[0].reason, MergeReason::Containment);
    }

    #[test]
    fn partial_overlap_at_threshold_merges() {
        // half of the second box lies inside the first
        let output = merge(glyphs(&[[0.0, 20.0, 0.0, 20.0], [10.0, 30.0, 0.0, 10.0]]));
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].bbox, BoundingBox::new(0.0, 30.0, 0.0, 20.0));
        // a third of it does not
        let output = merge(glyphs(&[[0.0, 20.0, 0.0, 20.0], [10.0, 40.0, 0.0, 10.0]]));
        assert_eq!(output.len(), 2);
    }

    #[test]
    fn lowest_index_is_primary() {
        // the small shape comes first and still survives as the composite
        let output = merge(glyphs(&[[10.0, 20.0, 10.0, 20.0], [0.0, 40.0, 0.0, 40.0]]));
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].id, 0);
        assert_eq!(output[0].path.as_str(), "M10,10 Z M0,0 Z");
        assert_eq!(output[0].bbox, BoundingBox::new(0.0, 40.0, 0.0, 40.0));
    }

    #[test]
    fn grown_glyph_absorbs_earlier_neighbor() {
        // 0 swallows 2 on the first pass; only the grown composite overlaps
        // 1, which is picked up by the second pass
        let input = glyphs(&[
            [0.0, 10.0, 0.0, 10.0],
            [30.0, 40.0, 0.0, 10.0],
            [-5.0, 38.0, -5.0, 15.0],
        ]);
        let output = merge(input);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].id, 0);
        assert_eq!(output[0].bbox, BoundingBox::new(-5.0, 40.0, -5.0, 15.0));
    }

    #[test]
    fn output_is_stable_under_another_merge() {
        let input = glyphs(&[
            [0.0, 40.0, 0.0, 40.0],
            [35.0, 60.0, 5.0, 30.0],
            [50.0, 90.0, 0.0, 40.0],
            [100.0, 130.0, 0.0, 40.0],
            [110.0, 120.0, 10.0, 20.0],
            [200.0, 210.0, 0.0, 5.0],
            [205.0, 230.0, 2.0, 30.0],
        ]);
        let once = merge(input);
        let mut records = Records::default();
        let twice = merge_contained(once.clone(), &Settings::default(), &mut records);
        assert!(records.0.is_empty());
        assert_eq!(once, twice);
        for (i, a) in once.iter().enumerate() {
            for b in once.iter().skip(i + 1) {
                assert_eq!(containment_reason(&a.bbox, &b.bbox, 0.4), None);
            }
        }
    }
}
