//! Conversion of a raster opacity mask into polygons.
//!
//! Opaque cells (sample `> 0`) are grouped into 4-connected components. The boundary of every component is traced
//! along the cell edges into closed rings in the grid index space, where vertex `(col, row)` is the upper-left corner
//! of cell `(row, col)`. Each component produces one polygon: its positively oriented ring is the exterior and the
//! negatively oriented rings are the holes.
//!
//! When two cells of a component touch only at a corner, the tracer passes through that corner from one cell to the
//! other. This keeps every ring simple: at such a vertex an exterior and a hole (or two holes) touch at one point but
//! never cross.

use crate::error::{MeasureError, MeasureResult};
use crate::geometry::CrsGeometry;
use crate::raster::{RasterMask, RasterSource};
use ahash::AHashMap;
use geo::orient::{Direction, Orient};
use geo_types::{Coord, LineString, Polygon};
use num_traits::Zero;
use std::collections::VecDeque;
use uav_area_types::cartesian::Rect;

/// Vertex of the cell grid, `(col, row)`.
type GridVertex = (i64, i64);

/// Closed ring in the grid index space. The first vertex is not repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRing {
    vertices: Vec<GridVertex>,
}

impl GridRing {
    /// Vertices of the ring.
    pub fn vertices(&self) -> &[GridVertex] {
        &self.vertices
    }

    /// Doubled signed area of the ring. Positive for the exterior of a component.
    pub fn doubled_area(&self) -> i64 {
        let n = self.vertices.len();
        (0..n)
            .map(|i| {
                let (x1, y1) = self.vertices[i];
                let (x2, y2) = self.vertices[(i + 1) % n];
                x1 * y2 - x2 * y1
            })
            .sum()
    }

    /// Extent of the ring in the grid index space.
    pub fn bounds(&self) -> Option<Rect<i64>> {
        let vertices: Vec<Coord<i64>> = self
            .vertices
            .iter()
            .map(|&(x, y)| Coord { x, y })
            .collect();
        Rect::from_points(vertices.iter())
    }
}

/// Polygon in the grid index space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPolygon {
    /// Outer boundary.
    pub exterior: GridRing,
    /// Boundaries of enclosed transparent regions.
    pub holes: Vec<GridRing>,
}

/// Traces opaque regions of a [`RasterMask`] into polygons.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaskPolygonizer;

impl MaskPolygonizer {
    /// Creates a new polygonizer.
    pub fn new() -> Self {
        Self
    }

    /// Reads the opacity band of the source and polygonizes it.
    ///
    /// Fails with [`MeasureError::MissingAlphaChannel`] before any geometry work if the source has no opacity band.
    pub fn polygonize_source<S>(&self, source: &S) -> MeasureResult<CrsGeometry>
    where
        S: RasterSource + ?Sized,
    {
        self.polygonize(&RasterMask::from_source(source)?)
    }

    /// Returns one polygon per connected opaque region, in the CRS of the mask.
    ///
    /// Grid vertices are mapped through the affine transform of the mask. Exterior rings are oriented
    /// counter-clockwise and holes clockwise in the target coordinates.
    pub fn polygonize<T>(&self, mask: &RasterMask<T>) -> MeasureResult<CrsGeometry>
    where
        T: Copy + PartialOrd + Zero,
    {
        let grid_polygons = self.trace(mask);
        if grid_polygons.is_empty() {
            return Err(MeasureError::NoOpaqueRegion);
        }

        let transform = mask.transform();
        let to_ring = |ring: &GridRing| -> LineString {
            let mut coords: Vec<_> = ring
                .vertices
                .iter()
                .map(|&(col, row)| transform.apply(col as f64, row as f64))
                .collect();
            coords.push(coords[0]);
            LineString::new(coords)
        };

        let polygons: Vec<_> = grid_polygons
            .iter()
            .map(|polygon| {
                Polygon::new(
                    to_ring(&polygon.exterior),
                    polygon.holes.iter().map(to_ring).collect(),
                )
                .orient(Direction::Default)
            })
            .collect();

        log::debug!(
            "Polygonized {} opaque regions with {} holes",
            polygons.len(),
            grid_polygons.iter().map(|p| p.holes.len()).sum::<usize>()
        );

        Ok(CrsGeometry::from_polygons(polygons, mask.crs()))
    }

    /// Traces the opaque regions in the grid index space. Components are returned in the row-major order of their
    /// first cell.
    pub fn trace<T>(&self, mask: &RasterMask<T>) -> Vec<GridPolygon>
    where
        T: Copy + PartialOrd + Zero,
    {
        label_components(mask)
            .iter()
            .filter_map(|cells| {
                let rings = trace_rings(mask, cells);
                assemble_polygon(rings)
            })
            .collect()
    }
}

/// Groups opaque cells into 4-connected components. Cells are `(row, col)`.
fn label_components<T>(mask: &RasterMask<T>) -> Vec<Vec<(usize, usize)>>
where
    T: Copy + PartialOrd + Zero,
{
    let (width, height) = (mask.width(), mask.height());
    let mut visited = vec![false; width * height];
    let mut components = vec![];
    let mut queue = VecDeque::new();

    for row in 0..height {
        for col in 0..width {
            if visited[row * width + col] || !mask.is_opaque(row, col) {
                continue;
            }

            let mut cells = vec![];
            visited[row * width + col] = true;
            queue.push_back((row, col));

            while let Some((r, c)) = queue.pop_front() {
                cells.push((r, c));

                let neighbours = [
                    (r.wrapping_sub(1), c),
                    (r + 1, c),
                    (r, c.wrapping_sub(1)),
                    (r, c + 1),
                ];
                for (nr, nc) in neighbours {
                    if nr < height
                        && nc < width
                        && !visited[nr * width + nc]
                        && mask.is_opaque(nr, nc)
                    {
                        visited[nr * width + nc] = true;
                        queue.push_back((nr, nc));
                    }
                }
            }

            components.push(cells);
        }
    }

    components
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    from: GridVertex,
    to: GridVertex,
}

impl Edge {
    fn direction(&self) -> GridVertex {
        (self.to.0 - self.from.0, self.to.1 - self.from.1)
    }
}

/// Traces the boundary of one component into closed rings.
fn trace_rings<T>(mask: &RasterMask<T>, cells: &[(usize, usize)]) -> Vec<GridRing>
where
    T: Copy + PartialOrd + Zero,
{
    let is_opaque = |row: i64, col: i64| {
        row >= 0 && col >= 0 && mask.is_opaque(row as usize, col as usize)
    };

    // Directed boundary edges with the component on the left in (col, row) space.
    let mut edges = vec![];
    for &(row, col) in cells {
        let (r, c) = (row as i64, col as i64);
        if !is_opaque(r - 1, c) {
            edges.push(Edge {
                from: (c, r),
                to: (c + 1, r),
            });
        }
        if !is_opaque(r, c + 1) {
            edges.push(Edge {
                from: (c + 1, r),
                to: (c + 1, r + 1),
            });
        }
        if !is_opaque(r + 1, c) {
            edges.push(Edge {
                from: (c + 1, r + 1),
                to: (c, r + 1),
            });
        }
        if !is_opaque(r, c - 1) {
            edges.push(Edge {
                from: (c, r + 1),
                to: (c, r),
            });
        }
    }

    let mut outgoing: AHashMap<GridVertex, Vec<usize>> = AHashMap::new();
    for (index, edge) in edges.iter().enumerate() {
        outgoing.entry(edge.from).or_default().push(index);
    }

    let successor = |index: usize| -> Option<usize> {
        let edge = edges[index];
        let candidates = outgoing.get(&edge.to)?;
        match candidates[..] {
            [single] => Some(single),
            // Pinch vertex: two cells touching diagonally. Turning towards the other cell joins them.
            [a, b] => {
                let d = edge.direction();
                let e = edges[a].direction();
                if d.0 * e.1 - d.1 * e.0 < 0 {
                    Some(a)
                } else {
                    Some(b)
                }
            }
            _ => None,
        }
    };

    let mut used = vec![false; edges.len()];
    let mut rings = vec![];
    for start in 0..edges.len() {
        if used[start] {
            continue;
        }

        let mut vertices = vec![];
        let mut current = start;
        loop {
            used[current] = true;
            vertices.push(edges[current].from);

            match successor(current) {
                Some(next) if next == start => break,
                Some(next) if !used[next] => current = next,
                _ => {
                    log::warn!("Boundary ring starting at {:?} is not closed", edges[start].from);
                    vertices.clear();
                    break;
                }
            }
        }

        if !vertices.is_empty() {
            rings.push(GridRing {
                vertices: merge_collinear(vertices),
            });
        }
    }

    rings
}

/// Removes vertices lying on a straight segment between their neighbours.
fn merge_collinear(vertices: Vec<GridVertex>) -> Vec<GridVertex> {
    let n = vertices.len();
    (0..n)
        .filter(|&i| {
            let prev = vertices[(i + n - 1) % n];
            let curr = vertices[i];
            let next = vertices[(i + 1) % n];
            let d1 = (curr.0 - prev.0, curr.1 - prev.1);
            let d2 = (next.0 - curr.0, next.1 - curr.1);
            d1.0 * d2.1 - d1.1 * d2.0 != 0
        })
        .map(|i| vertices[i])
        .collect()
}

/// Splits rings of a component into the exterior and holes by their orientation.
fn assemble_polygon(rings: Vec<GridRing>) -> Option<GridPolygon> {
    let (mut exteriors, holes): (Vec<_>, Vec<_>) =
        rings.into_iter().partition(|ring| ring.doubled_area() > 0);

    match exteriors.len() {
        0 => None,
        1 => exteriors.pop().map(|exterior| GridPolygon { exterior, holes }),
        _ => {
            // A connected component has exactly one outer boundary. Keep the largest one and the holes inside of it.
            log::warn!("Component traced into {} exterior rings", exteriors.len());
            exteriors.sort_by_key(|ring| std::cmp::Reverse(ring.doubled_area()));
            let exterior = exteriors.swap_remove(0);
            let bounds = exterior.bounds();
            let holes = holes
                .into_iter()
                .filter(|hole| match (&bounds, hole.bounds()) {
                    (Some(outer), Some(inner)) => outer.contains_rect(&inner),
                    _ => false,
                })
                .collect();

            Some(GridPolygon { exterior, holes })
        }
    }
}
