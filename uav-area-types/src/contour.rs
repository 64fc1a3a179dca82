//! Point sequences that ring math runs on.
//!
//! A closed contour (a polygon ring) stores every vertex once: the segment from the last vertex back to the first is
//! implied. `geo-types` rings repeat their first point, so their implementations skip it and
//! [`Contour::iter_points_closing`] adds it back where the math needs the closing segment.

/// Sequence of points, open or closed.
pub trait Contour {
    /// Type of the points the contour is consisted of.
    type Point;

    /// Whether the contour is closed.
    fn is_closed(&self) -> bool;

    /// Iterate over the points of the contour, without repeating the first point for closed contours.
    fn iter_points(&self) -> impl Iterator<Item = &'_ Self::Point>;

    /// Same as [`Contour::iter_points`] but for closed contours repeats the first point again at the end.
    fn iter_points_closing(&self) -> impl Iterator<Item = &Self::Point> {
        let closing = if self.is_closed() {
            self.iter_points().next()
        } else {
            None
        };

        self.iter_points().chain(closing)
    }
}

/// Ring of points with an implied closing segment.
pub trait ClosedContour {
    /// Type of the points the contour is consisted of.
    type Point;

    /// Iterate over the points of the contour, without repeating the first point.
    fn iter_points(&self) -> impl Iterator<Item = &'_ Self::Point>;
}

impl<P, T: ClosedContour<Point = P>> Contour for T {
    type Point = P;

    fn is_closed(&self) -> bool {
        true
    }

    fn iter_points(&self) -> impl Iterator<Item = &'_ Self::Point> {
        ClosedContour::iter_points(self)
    }
}
