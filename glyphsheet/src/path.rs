//! Traced outline geometry.

use core::fmt::{self, Write};

use kurbo::{BezPath, PathEl, Point, SvgParseError};

use crate::bbox::BoundingBox;

/// Number of digits written after the decimal point for rewritten
/// coordinates.
pub const COORD_PRECISION: usize = 2;

/// SVG path data for one traced shape or a composite of several.
///
/// The data is kept as the tracer produced it until the normalizer rewrites
/// it. Composite glyphs are formed by appending the data of each merged
/// shape as an independent subpath.
#[derive(Clone, Default, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PathGeometry(String);

/// The path data could not be parsed.
#[derive(Debug)]
pub struct PathError(SvgParseError);

impl PathGeometry {
    pub fn new(data: impl Into<String>) -> Self {
        Self(data.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Parses the path data.
    pub fn parse(&self) -> Result<BezPath, PathError> {
        BezPath::from_svg(&self.0).map_err(PathError)
    }

    /// Appends the subpaths of `other` to this path.
    pub fn append(&mut self, other: &PathGeometry) {
        if other.is_empty() {
            return;
        }
        if !self.is_empty() {
            self.0.push(' ');
        }
        self.0.push_str(&other.0);
    }

    /// Returns the bounds of every coordinate in the path, control points
    /// included.
    ///
    /// Geometry that fails to parse, or that has no coordinates, measures as
    /// [`BoundingBox::ZERO`].
    pub fn bounds(&self) -> BoundingBox {
        match self.parse() {
            Ok(path) => BoundingBox::from_points(path.elements().iter().flat_map(points))
                .unwrap_or(BoundingBox::ZERO),
            Err(e) => {
                log::warn!("unable to measure path data: {e}");
                BoundingBox::ZERO
            }
        }
    }

    /// Applies `transform` to every coordinate, returning the rewritten path
    /// and the bounds measured on the rewritten coordinates.
    pub fn transformed(&self, transform: GlyphTransform) -> Result<(Self, BoundingBox), PathError> {
        let path = self.parse()?;
        let mut writer = SvgWriter::with_precision(COORD_PRECISION);
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => writer.move_to(transform.apply(p)),
                PathEl::LineTo(p) => writer.line_to(transform.apply(p)),
                PathEl::QuadTo(p0, p1) => writer.quad_to(transform.apply(p0), transform.apply(p1)),
                PathEl::CurveTo(p0, p1, p2) => writer.curve_to(
                    transform.apply(p0),
                    transform.apply(p1),
                    transform.apply(p2),
                ),
                PathEl::ClosePath => writer.close(),
            }
        }
        let rewritten = Self(writer.into());
        // measure what was actually written so rounding never accumulates
        let bounds = rewritten.bounds();
        Ok((rewritten, bounds))
    }
}

fn points(el: &PathEl) -> impl Iterator<Item = Point> {
    let pts: [Option<Point>; 3] = match *el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => [Some(p), None, None],
        PathEl::QuadTo(p0, p1) => [Some(p0), Some(p1), None],
        PathEl::CurveTo(p0, p1, p2) => [Some(p0), Some(p1), Some(p2)],
        PathEl::ClosePath => [None; 3],
    };
    pts.into_iter().flatten()
}

impl From<String> for PathGeometry {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PathGeometry {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<PathGeometry> for String {
    fn from(value: PathGeometry) -> Self {
        value.0
    }
}

impl AsRef<str> for PathGeometry {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid path data: {}", self.0)
    }
}

impl std::error::Error for PathError {}

/// Vertical fit applied to a glyph's coordinates.
///
/// The shift is added before scaling: `y' = (y + shift) * scale` and
/// `x' = x * scale`. Folding this into an affine matrix would change the
/// rounding of the result.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct GlyphTransform {
    pub shift: f64,
    pub scale: f64,
}

impl GlyphTransform {
    pub fn new(shift: f64, scale: f64) -> Self {
        Self { shift, scale }
    }

    pub fn apply(&self, pt: Point) -> Point {
        Point::new(pt.x * self.scale, (pt.y + self.shift) * self.scale)
    }
}

/// Writes SVG path data with a fixed number of fractional digits.
#[derive(Clone, Default, Debug)]
struct SvgWriter(String, usize);

impl SvgWriter {
    fn with_precision(precision: usize) -> Self {
        Self(String::new(), precision)
    }

    fn maybe_push_space(&mut self) {
        if !self.0.is_empty() {
            self.0.push(' ');
        }
    }

    fn move_to(&mut self, p: Point) {
        self.maybe_push_space();
        let _ = write!(self.0, "M{:.prec$},{:.prec$}", p.x, p.y, prec = self.1);
    }

    fn line_to(&mut self, p: Point) {
        self.maybe_push_space();
        let _ = write!(self.0, "L{:.prec$},{:.prec$}", p.x, p.y, prec = self.1);
    }

    fn quad_to(&mut self, p0: Point, p1: Point) {
        self.maybe_push_space();
        let _ = write!(
            self.0,
            "Q{:.prec$},{:.prec$} {:.prec$},{:.prec$}",
            p0.x,
            p0.y,
            p1.x,
            p1.y,
            prec = self.1
        );
    }

    fn curve_to(&mut self, p0: Point, p1: Point, p2: Point) {
        self.maybe_push_space();
        let _ = write!(
            self.0,
            "C{:.prec$},{:.prec$} {:.prec$},{:.prec$} {:.prec$},{:.prec$}",
            p0.x,
            p0.y,
            p1.x,
            p1.y,
            p2.x,
            p2.y,
            prec = self.1
        );
    }

    fn close(&mut self) {
        self.maybe_push_space();
        self.0.push('Z');
    }
}

impl From<SvgWriter> for String {
    fn from(value: SvgWriter) -> Self {
        value.0
    }
}
