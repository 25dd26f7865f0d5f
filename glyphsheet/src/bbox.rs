//! Axis aligned bounding boxes in sheet coordinates.

use kurbo::Point;

/// An axis aligned rectangle in sheet (image) coordinates.
///
/// The y axis grows downward, so `y_min` is the visual top of a glyph and
/// `y_max` its bottom.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(from = "[f64; 4]", into = "[f64; 4]")
)]
pub struct BoundingBox {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl BoundingBox {
    /// The empty box used when geometry could not be measured.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a new box from `(xmin, xmax, ymin, ymax)` as produced by the
    /// tracer.
    pub const fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Returns the smallest box containing all of the given points, or
    /// `None` if the iterator is empty.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bbox = Self::new(first.x, first.x, first.y, first.y);
        for pt in points {
            bbox.x_min = bbox.x_min.min(pt.x);
            bbox.x_max = bbox.x_max.max(pt.x);
            bbox.y_min = bbox.y_min.min(pt.y);
            bbox.y_max = bbox.y_max.max(pt.y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f64 {
        (self.x_min + self.x_max) / 2.0
    }

    /// Vertical center.
    pub fn center_y(&self) -> f64 {
        (self.y_min + self.y_max) / 2.0
    }

    /// Returns the smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            x_min: self.x_min.min(other.x_min),
            x_max: self.x_max.max(other.x_max),
            y_min: self.y_min.min(other.y_min),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Returns true if `other` lies entirely inside `self` (edges included).
    pub fn contains(&self, other: &Self) -> bool {
        other.x_min >= self.x_min
            && other.x_max <= self.x_max
            && other.y_min >= self.y_min
            && other.y_max <= self.y_max
    }

    /// Area of the intersection of the two boxes, zero if they are disjoint.
    pub fn intersection_area(&self, other: &Self) -> f64 {
        let dx = (self.x_max.min(other.x_max) - self.x_min.max(other.x_min)).max(0.0);
        let dy = (self.y_max.min(other.y_max) - self.y_min.max(other.y_min)).max(0.0);
        dx * dy
    }

    /// The fraction of this box's area that lies inside `outer`.
    ///
    /// Degenerate (zero area) boxes report zero.
    pub fn contained_fraction(&self, outer: &Self) -> f64 {
        let area = self.area();
        if area == 0.0 {
            return 0.0;
        }
        self.intersection_area(outer) / area
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(value: [f64; 4]) -> Self {
        let [x_min, x_max, y_min, y_max] = value;
        Self::new(x_min, x_max, y_min, y_max)
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(value: BoundingBox) -> Self {
        [value.x_min, value.x_max, value.y_min, value.y_max]
    }
}
