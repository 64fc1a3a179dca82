mod cartesian_point;
mod contour;
mod polygon;

pub use cartesian_point::{CartesianPoint2d, CartesianPoint2dFloat, NewCartesianPoint2d};
pub use contour::CartesianClosedContour;
pub use polygon::{CartesianMultiPolygon, CartesianPolygon};
