use geo_types::{Coord, CoordNum, LineString};

use crate::contour::ClosedContour;

/// `geo-types` rings repeat the first point at the end; the repeated point is skipped here.
impl<T: CoordNum> ClosedContour for LineString<T> {
    type Point = Coord<T>;

    fn iter_points(&self) -> impl Iterator<Item = &'_ Self::Point> {
        if self.is_closed() && self.0.len() > 1 {
            self.0[..self.0.len() - 1].iter()
        } else {
            self.0.iter()
        }
    }
}
