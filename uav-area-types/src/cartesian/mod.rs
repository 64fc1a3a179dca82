//! Types and functions on geometries in cartesian coordinates.

mod rect;
mod traits;

pub use rect::Rect;
pub use traits::*;
