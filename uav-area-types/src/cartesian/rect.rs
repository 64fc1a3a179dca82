use crate::cartesian::CartesianPoint2d;
use nalgebra::{Point2, Scalar};
use num_traits::{FromPrimitive, Num, One};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, used as the extent of a geometry.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect<N = f64> {
    /// Minimum x.
    pub x_min: N,
    /// Minimum y.
    pub y_min: N,
    /// Maximum x.
    pub x_max: N,
    /// Maximum y.
    pub y_max: N,
}

impl<N: Num + Copy + PartialOrd + Scalar + FromPrimitive> Rect<N> {
    /// Creates a new rectangle.
    pub fn new(x_min: N, y_min: N, x_max: N, y_max: N) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Extent of the given points. Returns `None` for an empty iterator.
    pub fn from_points<'a, P: CartesianPoint2d<Num = N> + 'a>(
        mut points: impl Iterator<Item = &'a P>,
    ) -> Option<Self> {
        let first = points.next()?;
        let mut x_min = first.x();
        let mut y_min = first.y();
        let mut x_max = first.x();
        let mut y_max = first.y();

        for p in points {
            if x_min > p.x() {
                x_min = p.x();
            }
            if y_min > p.y() {
                y_min = p.y();
            }
            if x_max < p.x() {
                x_max = p.x();
            }
            if y_max < p.y() {
                y_max = p.y();
            }
        }

        Some(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Returns true if the point lies inside the rectangle or on its border.
    pub fn contains(&self, point: &impl CartesianPoint2d<Num = N>) -> bool {
        self.x_min <= point.x()
            && self.x_max >= point.x()
            && self.y_min <= point.y()
            && self.y_max >= point.y()
    }

    /// Returns true if `other` lies inside the rectangle, borders included.
    pub fn contains_rect(&self, other: &Self) -> bool {
        self.x_min <= other.x_min
            && self.y_min <= other.y_min
            && self.x_max >= other.x_max
            && self.y_max >= other.y_max
    }

    /// Center of the rectangle: `((x_min + x_max) / 2, (y_min + y_max) / 2)`.
    pub fn center(&self) -> Point2<N> {
        let two = N::one() + N::one();
        Point2::new(
            (self.x_min + self.x_max) / two,
            (self.y_min + self.y_max) / two,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::coord;

    #[test]
    fn from_points_and_center() {
        let points = [
            coord! { x: 10.0, y: -4.0 },
            coord! { x: 12.0, y: 6.0 },
            coord! { x: 11.0, y: 0.0 },
        ];
        let rect = Rect::from_points(points.iter()).expect("not empty");

        assert_eq!(rect, Rect::new(10.0, -4.0, 12.0, 6.0));
        assert_eq!(rect.center(), Point2::new(11.0, 1.0));
        assert!(rect.contains(&coord! { x: 12.0, y: 6.0 }));
        assert!(!rect.contains(&coord! { x: 12.1, y: 6.0 }));
    }

    #[test]
    fn from_no_points() {
        let points: [geo_types::Coord<f64>; 0] = [];
        assert!(Rect::from_points(points.iter()).is_none());
    }

    #[test]
    fn contains_rect() {
        let outer = Rect::new(0i64, 0, 10, 10);
        assert!(outer.contains_rect(&Rect::new(2, 3, 10, 4)));
        assert!(outer.contains_rect(&outer));
        assert!(!outer.contains_rect(&Rect::new(-1, 3, 4, 4)));
        assert!(!Rect::new(2, 3, 10, 4).contains_rect(&outer));
    }
}
