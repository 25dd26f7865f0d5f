//! Fusing traced shapes into whole characters.
//!
//! A single character is frequently traced as several shapes: the counter of
//! an `o` is its own contour, the dot of an `i` floats above the stem and
//! brush strokes may not connect. Two passes recover characters from shapes:
//! [`containment`] fuses shapes whose bounds overlap substantially and
//! [`proximity`] attaches small marks to the glyph they sit on.

pub mod containment;
pub mod proximity;

use crate::{
    bbox::BoundingBox,
    lines,
    observer::{Event, Observer, Stage},
    settings::Settings,
    store::{GlyphCandidate, GlyphStore},
};

/// Why two glyphs were fused.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum MergeReason {
    /// One box lies entirely inside the other.
    Containment,
    /// Enough of one box lies inside the other.
    PartialContainment,
    /// A small mark sits just above or below its base glyph.
    Attachment,
}

impl MergeReason {
    pub(crate) fn stage(&self) -> Stage {
        match self {
            Self::Containment | Self::PartialContainment => Stage::ContainmentMerge,
            Self::Attachment => Stage::ProximityMerge,
        }
    }
}

/// A single merge decision.
#[derive(Clone, PartialEq, Debug)]
pub struct MergeRecord {
    /// Id of the glyph that absorbed the other.
    pub primary: usize,
    /// Id of the glyph that was absorbed.
    pub secondary: usize,
    pub reason: MergeReason,
    /// Bounds of both glyphs at the time of the merge.
    pub primary_bbox: BoundingBox,
    pub secondary_bbox: BoundingBox,
}

/// Runs both merge passes and orders the resulting glyphs line by line.
pub fn merge_glyphs(
    store: GlyphStore,
    settings: &Settings,
    observer: &mut dyn Observer,
) -> Vec<GlyphCandidate> {
    let shape_count = store.len();
    let glyphs = containment::merge_contained(store.into_glyphs(), settings, observer);
    let glyphs = proximity::attach_marks(glyphs, settings, observer);
    log::debug!("merged {shape_count} shapes into {} glyphs", glyphs.len());
    order_by_line(glyphs, settings.ordering_line_factor, observer)
}

/// Reorders glyphs by flattening their text lines, top line first.
fn order_by_line(
    glyphs: Vec<GlyphCandidate>,
    factor: f64,
    observer: &mut dyn Observer,
) -> Vec<GlyphCandidate> {
    let bboxes: Vec<_> = glyphs.iter().map(|glyph| glyph.bbox).collect();
    let lines = lines::segment_lines(&bboxes, factor);
    observer.observe(&Event::LinesSegmented {
        factor,
        bboxes: &bboxes,
        lines: &lines,
    });
    let mut slots: Vec<Option<GlyphCandidate>> = glyphs.into_iter().map(Some).collect();
    lines
        .iter()
        .flat_map(|line| line.members.iter())
        .filter_map(|&ix| slots[ix].take())
        .collect()
}

/// Glyphs under merge, each with an optional merge parent.
///
/// A glyph whose parent is set has been absorbed into that parent and no
/// longer takes part in merging; its data has been moved to the parent.
struct MergeArena {
    glyphs: Vec<GlyphCandidate>,
    parent: Vec<Option<usize>>,
}

impl MergeArena {
    fn new(glyphs: Vec<GlyphCandidate>) -> Self {
        let parent = vec![None; glyphs.len()];
        Self { glyphs, parent }
    }

    fn len(&self) -> usize {
        self.glyphs.len()
    }

    fn is_live(&self, ix: usize) -> bool {
        self.parent[ix].is_none()
    }

    /// Indices of glyphs that have not been absorbed, in order.
    fn live(&self) -> Vec<usize> {
        (0..self.len()).filter(|&ix| self.is_live(ix)).collect()
    }

    fn bbox(&self, ix: usize) -> BoundingBox {
        self.glyphs[ix].bbox
    }

    /// Moves `secondary` into `primary`, reporting the decision.
    fn merge(
        &mut self,
        primary: usize,
        secondary: usize,
        reason: MergeReason,
        observer: &mut dyn Observer,
    ) {
        debug_assert!(self.is_live(primary) && self.is_live(secondary));
        let record = MergeRecord {
            primary: self.glyphs[primary].id,
            secondary: self.glyphs[secondary].id,
            reason,
            primary_bbox: self.bbox(primary),
            secondary_bbox: self.bbox(secondary),
        };
        log::trace!(
            "{reason:?}: glyph {} into glyph {}",
            record.secondary,
            record.primary
        );
        observer.observe(&Event::Merged(&record));
        let path = std::mem::take(&mut self.glyphs[secondary].path);
        let target = &mut self.glyphs[primary];
        target.path.append(&path);
        target.bbox = target.bbox.union(&record.secondary_bbox);
        self.parent[secondary] = Some(primary);
    }

    /// Returns the surviving glyphs in their original order.
    fn into_survivors(self) -> Vec<GlyphCandidate> {
        self.glyphs
            .into_iter()
            .zip(self.parent)
            .filter_map(|(glyph, parent)| parent.is_none().then_some(glyph))
            .collect()
    }
}
