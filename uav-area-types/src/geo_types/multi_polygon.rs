use geo_types::{CoordNum, MultiPolygon, Polygon};

impl<T: CoordNum> crate::polygon::MultiPolygon for MultiPolygon<T> {
    type Polygon = Polygon<T>;

    fn polygons(&self) -> impl Iterator<Item = &Self::Polygon> {
        self.0.iter()
    }
}
