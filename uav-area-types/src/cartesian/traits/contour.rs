use crate::cartesian::traits::cartesian_point::CartesianPoint2d;
use crate::contour::{ClosedContour, Contour};
use num_traits::{One, Zero};

/// Planar math on closed contours. This trait is auto-implemented for all eligible types.
pub trait CartesianClosedContour {
    /// Type of the points of the contour.
    type Point: CartesianPoint2d;

    /// Shoelace area of the ring. Positive for counterclockwise rings (x to the right, y up).
    fn area_signed(&self) -> <Self::Point as CartesianPoint2d>::Num
    where
        Self: Sized;
}

impl<P, T> CartesianClosedContour for T
where
    P: CartesianPoint2d,
    T: ClosedContour<Point = P>,
{
    type Point = P;

    fn area_signed(&self) -> P::Num
    where
        Self: Sized,
    {
        let mut prev;
        let mut iter = self.iter_points_closing();
        if let Some(p) = iter.next() {
            prev = p;
        } else {
            return P::Num::zero();
        }

        let mut aggr = P::Num::zero();

        for p in iter {
            aggr = aggr + prev.x() * p.y() - p.x() * prev.y();
            prev = p;
        }

        aggr / (P::Num::one() + P::Num::one())
    }
}
