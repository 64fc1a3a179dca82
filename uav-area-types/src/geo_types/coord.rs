use geo_types::{coord, Coord, CoordNum};
use nalgebra::Scalar;
use num_traits::{Bounded, FromPrimitive};

use crate::cartesian::{CartesianPoint2d, NewCartesianPoint2d};

impl<T: CoordNum + Bounded + Scalar + FromPrimitive> CartesianPoint2d for Coord<T> {
    type Num = T;

    fn x(&self) -> Self::Num {
        self.x
    }

    fn y(&self) -> Self::Num {
        self.y
    }
}

impl<T: CoordNum + Bounded + Scalar + FromPrimitive> NewCartesianPoint2d<T> for Coord<T> {
    fn new(x: T, y: T) -> Self {
        coord!(x: x, y: y)
    }
}
