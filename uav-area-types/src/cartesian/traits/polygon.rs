use crate::cartesian::traits::cartesian_point::CartesianPoint2d;
use crate::cartesian::traits::contour::CartesianClosedContour;
use crate::contour::ClosedContour;
use crate::polygon::{MultiPolygon, Polygon};
use num_traits::{Float, Zero};

/// Polygon in 2d cartesian coordinates. This trait is auto-implemented for all eligible types.
pub trait CartesianPolygon {
    /// Type of the points of the polygon.
    type Point: CartesianPoint2d;

    /// Area of the polygon: the outer ring minus its holes, regardless of the rings' winding.
    fn area(&self) -> <Self::Point as CartesianPoint2d>::Num;
}

impl<P, C, T> CartesianPolygon for T
where
    P: CartesianPoint2d,
    P::Num: Float,
    C: ClosedContour<Point = P>,
    T: Polygon<Contour = C>,
{
    type Point = P;

    fn area(&self) -> P::Num {
        let outer = self.outer_contour().area_signed().abs();
        let holes = self
            .inner_contours()
            .fold(P::Num::zero(), |acc, c| acc + c.area_signed().abs());

        outer - holes
    }
}

/// Multipolygon in 2d cartesian coordinates. This trait is auto-implemented for all eligible types.
pub trait CartesianMultiPolygon {
    /// Type of the points of the multipolygon.
    type Point: CartesianPoint2d;

    /// Sum of the areas of the member polygons. Members are expected not to overlap.
    fn area(&self) -> <Self::Point as CartesianPoint2d>::Num;
}

impl<P, Poly, T> CartesianMultiPolygon for T
where
    P: CartesianPoint2d,
    P::Num: Float,
    Poly: Polygon + CartesianPolygon<Point = P>,
    T: MultiPolygon<Polygon = Poly>,
{
    type Point = P;

    fn area(&self) -> P::Num {
        self.polygons()
            .fold(P::Num::zero(), |acc, p| acc + CartesianPolygon::area(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{polygon, MultiPolygon as GeoMultiPolygon};

    #[test]
    fn polygon_area_subtracts_holes() {
        let polygon = polygon!(
            exterior: [
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 10.0),
                (x: 0.0, y: 10.0),
            ],
            interiors: [
                [
                    (x: 2.0, y: 2.0),
                    (x: 2.0, y: 4.0),
                    (x: 4.0, y: 4.0),
                    (x: 4.0, y: 2.0),
                ],
            ],
        );

        assert_eq!(CartesianPolygon::area(&polygon), 96.0);
    }

    #[test]
    fn polygon_area_ignores_winding() {
        let ccw = polygon![(x: 0.0, y: 0.0), (x: 3.0, y: 0.0), (x: 3.0, y: 2.0), (x: 0.0, y: 2.0)];
        let cw = polygon![(x: 0.0, y: 0.0), (x: 0.0, y: 2.0), (x: 3.0, y: 2.0), (x: 3.0, y: 0.0)];

        assert_eq!(CartesianPolygon::area(&ccw), 6.0);
        assert_eq!(CartesianPolygon::area(&cw), 6.0);
    }

    #[test]
    fn multipolygon_area() {
        let mp = GeoMultiPolygon::new(vec![
            polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)],
            polygon![(x: 5.0, y: 5.0), (x: 7.0, y: 5.0), (x: 7.0, y: 7.0), (x: 5.0, y: 7.0)],
        ]);

        assert_eq!(CartesianMultiPolygon::area(&mp), 5.0);
        assert_eq!(CartesianMultiPolygon::area(&GeoMultiPolygon::<f64>::new(vec![])), 0.0);
    }
}
