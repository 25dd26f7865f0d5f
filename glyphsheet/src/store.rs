//! The raw tracer output.

use crate::{bbox::BoundingBox, path::PathGeometry, Error};

/// A traced shape and, after merging, a whole character.
#[derive(Clone, PartialEq, Debug)]
pub struct GlyphCandidate {
    /// Index of the shape in the tracer output. A composite keeps the id of
    /// the shape it was merged into.
    pub id: usize,
    pub bbox: BoundingBox,
    pub path: PathGeometry,
}

impl GlyphCandidate {
    pub fn new(id: usize, bbox: BoundingBox, path: PathGeometry) -> Self {
        Self { id, bbox, path }
    }
}

/// Index aligned bounding boxes and outlines produced by the tracer.
#[derive(Clone, Default, Debug)]
pub struct GlyphStore {
    glyphs: Vec<GlyphCandidate>,
}

impl GlyphStore {
    /// Creates a store from the tracer's parallel lists.
    pub fn from_traced(bboxes: Vec<BoundingBox>, paths: Vec<PathGeometry>) -> Result<Self, Error> {
        if bboxes.len() != paths.len() {
            return Err(Error::MismatchedInput {
                bboxes: bboxes.len(),
                paths: paths.len(),
            });
        }
        let glyphs = bboxes
            .into_iter()
            .zip(paths)
            .enumerate()
            .map(|(id, (bbox, path))| GlyphCandidate::new(id, bbox, path))
            .collect();
        Ok(Self { glyphs })
    }

    /// Creates a store measuring each bounding box from its path data.
    ///
    /// Paths that cannot be parsed get an empty box.
    pub fn from_paths(paths: Vec<PathGeometry>) -> Self {
        let glyphs = paths
            .into_iter()
            .enumerate()
            .map(|(id, path)| GlyphCandidate::new(id, path.bounds(), path))
            .collect();
        Self { glyphs }
    }

    /// Discards shapes that are at least `max_width` wide or `max_height`
    /// tall; these are the sheet border or background blotches rather than
    /// glyphs.
    pub fn retain_within(&mut self, max_width: f64, max_height: f64) {
        let before = self.glyphs.len();
        self.glyphs
            .retain(|glyph| glyph.bbox.width() < max_width && glyph.bbox.height() < max_height);
        if self.glyphs.len() != before {
            log::debug!("dropped {} oversized shapes", before - self.glyphs.len());
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyphs(&self) -> &[GlyphCandidate] {
        &self.glyphs
    }

    pub fn bboxes(&self) -> impl Iterator<Item = BoundingBox> + '_ {
        self.glyphs.iter().map(|glyph| glyph.bbox)
    }

    pub fn into_glyphs(self) -> Vec<GlyphCandidate> {
        self.glyphs
    }
}

impl FromIterator<GlyphCandidate> for GlyphStore {
    fn from_iter<T: IntoIterator<Item = GlyphCandidate>>(iter: T) -> Self {
        Self {
            glyphs: iter.into_iter().collect(),
        }
    }
}
