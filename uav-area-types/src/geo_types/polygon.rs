use geo_types::{Coord, CoordNum, LineString, MultiPolygon, Polygon};

use crate::geo::Projection;

impl<T: CoordNum> crate::polygon::Polygon for Polygon<T> {
    type Contour = LineString<T>;

    fn outer_contour(&self) -> &Self::Contour {
        self.exterior()
    }

    fn inner_contours(&self) -> impl Iterator<Item = &'_ Self::Contour> {
        self.interiors().iter()
    }
}

/// Geometries whose coordinates can be moved into another coordinate system point by point.
///
/// Returns `None` if any of the points cannot be projected. The source geometry is never modified.
pub trait ProjectCoords: Sized {
    /// Projects all points of the geometry.
    fn project_coords<Proj>(&self, projection: &Proj) -> Option<Self>
    where
        Proj: Projection<InPoint = Coord, OutPoint = Coord> + ?Sized;

    /// Unprojects all points of the geometry.
    fn unproject_coords<Proj>(&self, projection: &Proj) -> Option<Self>
    where
        Proj: Projection<InPoint = Coord, OutPoint = Coord> + ?Sized;
}

fn map_line_string(
    line: &LineString,
    mut f: impl FnMut(&Coord) -> Option<Coord>,
) -> Option<LineString> {
    Some(LineString::new(
        line.0.iter().map(&mut f).collect::<Option<Vec<_>>>()?,
    ))
}

fn map_polygon(polygon: &Polygon, mut f: impl FnMut(&Coord) -> Option<Coord>) -> Option<Polygon> {
    let exterior = map_line_string(polygon.exterior(), &mut f)?;
    let interiors = polygon
        .interiors()
        .iter()
        .map(|ring| map_line_string(ring, &mut f))
        .collect::<Option<Vec<_>>>()?;

    Some(Polygon::new(exterior, interiors))
}

impl ProjectCoords for LineString {
    fn project_coords<Proj>(&self, projection: &Proj) -> Option<Self>
    where
        Proj: Projection<InPoint = Coord, OutPoint = Coord> + ?Sized,
    {
        map_line_string(self, |c| projection.project(c))
    }

    fn unproject_coords<Proj>(&self, projection: &Proj) -> Option<Self>
    where
        Proj: Projection<InPoint = Coord, OutPoint = Coord> + ?Sized,
    {
        map_line_string(self, |c| projection.unproject(c))
    }
}

impl ProjectCoords for Polygon {
    fn project_coords<Proj>(&self, projection: &Proj) -> Option<Self>
    where
        Proj: Projection<InPoint = Coord, OutPoint = Coord> + ?Sized,
    {
        map_polygon(self, |c| projection.project(c))
    }

    fn unproject_coords<Proj>(&self, projection: &Proj) -> Option<Self>
    where
        Proj: Projection<InPoint = Coord, OutPoint = Coord> + ?Sized,
    {
        map_polygon(self, |c| projection.unproject(c))
    }
}

impl ProjectCoords for MultiPolygon {
    fn project_coords<Proj>(&self, projection: &Proj) -> Option<Self>
    where
        Proj: Projection<InPoint = Coord, OutPoint = Coord> + ?Sized,
    {
        Some(MultiPolygon::new(
            self.0
                .iter()
                .map(|p| p.project_coords(projection))
                .collect::<Option<Vec<_>>>()?,
        ))
    }

    fn unproject_coords<Proj>(&self, projection: &Proj) -> Option<Self>
    where
        Proj: Projection<InPoint = Coord, OutPoint = Coord> + ?Sized,
    {
        Some(MultiPolygon::new(
            self.0
                .iter()
                .map(|p| p.unproject_coords(projection))
                .collect::<Option<Vec<_>>>()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Crs;
    use geo_types::polygon;

    #[test]
    fn project_keeps_structure() {
        let polygon = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)],
            interiors: [[(x: 0.5, y: 0.2), (x: 0.8, y: 0.2), (x: 0.8, y: 0.4)]],
        );
        let transformation = Crs::WGS84
            .transformation_to::<Coord>(&Crs::EPSG3857)
            .expect("known projections");

        let projected = polygon.project_coords(&transformation).expect("valid");
        assert_eq!(projected.exterior().0.len(), polygon.exterior().0.len());
        assert_eq!(projected.interiors().len(), 1);
        assert!(projected.exterior().0[1].x > 100_000.0);
        assert_eq!(polygon.exterior().0[1].x, 1.0);
    }

    #[test]
    fn project_fails_outside_of_domain() {
        let polygon = polygon![(x: 0.0, y: 89.0), (x: 1.0, y: 89.0), (x: 1.0, y: 89.5)];
        let transformation = Crs::WGS84
            .transformation_to::<Coord>(&Crs::EPSG3857)
            .expect("known projections");

        assert!(polygon.project_coords(&transformation).is_none());
    }
}
