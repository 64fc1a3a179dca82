//! Minimum-area oriented bounding rectangle.

use crate::error::{MeasureError, MeasureResult};
use geo::ConvexHull;
use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use nalgebra::Vector2;
use serde::Serialize;
use uav_area_types::cartesian::{CartesianPoint2d, CartesianPoint2dFloat};

/// One of the first two sides of a [`RotatedRectangle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RectangleSide {
    /// Side from the first corner to the second one.
    First,
    /// Side from the second corner to the third one.
    Second,
}

/// Smallest rectangle of any orientation enclosing a geometry.
///
/// `width <= height` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RotatedRectangle {
    corners: [Coord; 4],
    width: f64,
    height: f64,
    width_edge: RectangleSide,
}

impl RotatedRectangle {
    /// The four corners in ring order.
    pub fn corners(&self) -> [Coord; 4] {
        self.corners
    }

    /// Closed ring of the corners. The first corner is repeated at the end.
    pub fn ring(&self) -> LineString {
        let mut ring = self.corners.to_vec();
        ring.push(self.corners[0]);
        LineString::new(ring)
    }

    /// Length of the shorter side.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Length of the longer side.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Which of the first two sides is the width side.
    pub fn width_edge(&self) -> RectangleSide {
        self.width_edge
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// End points of a side with the length of `width`.
    pub fn width_side(&self) -> (Coord, Coord) {
        self.side(self.width_edge)
    }

    /// End points of a side with the length of `height`.
    pub fn height_side(&self) -> (Coord, Coord) {
        match self.width_edge {
            RectangleSide::First => self.side(RectangleSide::Second),
            RectangleSide::Second => self.side(RectangleSide::First),
        }
    }

    /// The rectangle as a polygon.
    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(self.ring(), vec![])
    }

    fn side(&self, side: RectangleSide) -> (Coord, Coord) {
        let [c0, c1, c2, _] = self.corners;
        match side {
            RectangleSide::First => (c0, c1),
            RectangleSide::Second => (c1, c2),
        }
    }
}

/// Computes the minimum rotated rectangle of the geometry with rotating calipers over its convex hull.
///
/// One side of the minimum rectangle is collinear with an edge of the convex hull, so each hull edge is tried as the
/// base direction and the one giving the smallest area is kept. If several edges give the same area, the first one
/// wins.
///
/// Width and height are the shorter and the longer of the first two sides. If the two sides are equal within
/// `side_tolerance` (relative to the longer side), the first side is reported as the width side.
///
/// Fails with [`MeasureError::EmptyGeometry`] if the hull has no area (empty, single point or collinear input).
pub fn minimum_rotated_rectangle(
    geometry: &MultiPolygon,
    side_tolerance: f64,
) -> MeasureResult<RotatedRectangle> {
    let hull = geometry.convex_hull();
    let points: Vec<Coord> = {
        let ring = &hull.exterior().0;
        let open_len = if ring.len() > 1 && ring.first() == ring.last() {
            ring.len() - 1
        } else {
            ring.len()
        };
        ring[..open_len].to_vec()
    };

    if points.len() < 3 {
        return Err(MeasureError::EmptyGeometry);
    }

    let mut best: Option<(f64, [Coord; 4])> = None;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        let edge: Vector2<f64> = b.sub(&a);
        let length = edge.norm();
        if length == 0.0 {
            continue;
        }

        let u = edge / length;
        let v = Vector2::new(-u.y, u.x);

        let (mut min_u, mut max_u, mut min_v, mut max_v) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
        for p in &points {
            let d: Vector2<f64> = p.sub(&a);
            let pu = d.dot(&u);
            let pv = d.dot(&v);
            min_u = min_u.min(pu);
            max_u = max_u.max(pu);
            min_v = min_v.min(pv);
            max_v = max_v.max(pv);
        }

        let area = (max_u - min_u) * (max_v - min_v);
        if best.map(|(best_area, _)| area < best_area).unwrap_or(true) {
            let corner = |s: f64, t: f64| {
                let p = Vector2::new(a.x, a.y) + u * s + v * t;
                Coord { x: p.x, y: p.y }
            };
            best = Some((
                area,
                [
                    corner(min_u, min_v),
                    corner(max_u, min_v),
                    corner(max_u, max_v),
                    corner(min_u, max_v),
                ],
            ));
        }
    }

    let (area, corners) = best.ok_or(MeasureError::EmptyGeometry)?;

    let side1 = corners[1].distance(&corners[0]);
    let side2 = corners[2].distance(&corners[1]);
    let longest = side1.max(side2);
    if area.is_nan() || area <= f64::EPSILON * longest * longest {
        return Err(MeasureError::EmptyGeometry);
    }

    let width_edge = if side1 <= side2 || side1 - side2 <= side_tolerance * longest {
        RectangleSide::First
    } else {
        RectangleSide::Second
    };

    Ok(RotatedRectangle {
        corners,
        width: side1.min(side2),
        height: longest,
        width_edge,
    })
}
