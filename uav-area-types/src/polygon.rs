//! Polygon and multipolygon traits.

use crate::contour::ClosedContour;

/// Polygon geometry. Polygon consists of one outer contour, and zero or more inner contours.
///
/// Inner contours represent *holes* in the polygon.
pub trait Polygon {
    /// Contour type.
    type Contour: ClosedContour;

    /// Outer contour of the polygon.
    fn outer_contour(&self) -> &Self::Contour;
    /// Iterates over inner contours.
    fn inner_contours(&self) -> impl Iterator<Item = &'_ Self::Contour>;

    /// Iterates over all contours of the polygon starting with the outer one.
    fn iter_contours(&self) -> impl Iterator<Item = &'_ Self::Contour> {
        std::iter::once(self.outer_contour()).chain(self.inner_contours())
    }
}

/// Geometry consisting of several polygons.
pub trait MultiPolygon {
    /// Polygon type.
    type Polygon: Polygon;

    /// Iterates over polygons.
    fn polygons(&self) -> impl Iterator<Item = &Self::Polygon>;
}
