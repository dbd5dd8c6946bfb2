//! Grid cells and their corner vertices / boundary edges in pixel space.
//!
//! A [`GridCell`] lives on the unbounded integer lattice. [`GridConfig`] maps it
//! into the shared pixel space with `pixel = (grid + origin_offset) * cell_size`.
//! Every cell produces its corners in the same counter-clockwise order
//! (bottom-left, bottom-right, top-right, top-left), so two edge-adjacent cells
//! always emit their shared side as a pair of opposite directed edges.

use crate::error::{PerimeterError, Result};
use geo_types::{Coord, LineString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One unit square of the map lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i64,
    pub y: i64,
}

impl GridCell {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Orthogonal neighbours: left, right, up, down.
    pub fn neighbors(&self) -> [GridCell; 4] {
        [
            GridCell::new(self.x - 1, self.y),
            GridCell::new(self.x + 1, self.y),
            GridCell::new(self.x, self.y + 1),
            GridCell::new(self.x, self.y - 1),
        ]
    }
}

impl From<(i64, i64)> for GridCell {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for GridCell {
    type Err = PerimeterError;

    /// Parses the `"x,y"` key used by the tiles API and the coords line format.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split(',');
        let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(PerimeterError::InvalidCoordinate(s.to_string()));
        };
        let parse = |v: &str| {
            v.trim()
                .parse::<i64>()
                .map_err(|_| PerimeterError::InvalidCoordinate(s.to_string()))
        };
        Ok(GridCell::new(parse(x)?, parse(y)?))
    }
}

/// A corner point in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vertex {
    pub x: i64,
    pub y: i64,
}

impl Vertex {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<Vertex> for Coord<f64> {
    fn from(v: Vertex) -> Self {
        Coord {
            x: v.x as f64,
            y: v.y as f64,
        }
    }
}

/// Hash key of a directed edge: `(x1, y1, x2, y2)`.
pub type EdgeKey = (i64, i64, i64, i64);

/// A directed segment between two vertices. Direction matters for cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub start: Vertex,
    pub end: Vertex,
}

impl Edge {
    pub const fn new(start: Vertex, end: Vertex) -> Self {
        Self { start, end }
    }

    pub fn reversed(&self) -> Edge {
        Edge::new(self.end, self.start)
    }

    pub fn key(&self) -> EdgeKey {
        (self.start.x, self.start.y, self.end.x, self.end.y)
    }

    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    /// Largest x and largest y over both endpoints.
    pub fn max_corner(&self) -> Vertex {
        Vertex::new(self.start.x.max(self.end.x), self.start.y.max(self.end.y))
    }

    pub fn tip(&self, tip: Tip) -> Vertex {
        match tip {
            Tip::Start => self.start,
            Tip::End => self.end,
        }
    }
}

/// Which side of its owning cell an edge lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// One endpoint of a directed edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tip {
    Start,
    End,
}

/// Max x / max y over a cell's own four edges.
pub fn cell_max_corner(edges: &[Edge; 4]) -> Vertex {
    edges.iter().fold(edges[0].max_corner(), |acc, e| {
        let m = e.max_corner();
        Vertex::new(acc.x.max(m.x), acc.y.max(m.y))
    })
}

/// Classifies `edge` against the max corner of the cell that owns it.
pub fn edge_side(edge: &Edge, cell_max: Vertex) -> Side {
    if edge.is_vertical() {
        if edge.start.x == cell_max.x {
            Side::Right
        } else {
            Side::Left
        }
    } else if edge.start.y == cell_max.y {
        Side::Top
    } else {
        Side::Bottom
    }
}

/// Affine transform between the grid lattice and pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridConfig {
    /// Pixel length of one cell side.
    pub cell_size: i64,
    /// Added to grid coordinates before scaling so the map corner lands on (0, 0).
    pub origin_offset: i64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 40,
            origin_offset: 152,
        }
    }
}

impl GridConfig {
    pub fn new(cell_size: i64, origin_offset: i64) -> Result<Self> {
        let config = Self {
            cell_size,
            origin_offset,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cell_size <= 0 {
            return Err(PerimeterError::InvalidArgument(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        Ok(())
    }

    /// Fails with `InvalidCoordinate` when `cell`, its neighbours or an inset
    /// grown past its corners would leave the `i64` pixel range.
    pub fn check_cell(&self, cell: GridCell) -> Result<()> {
        let pixel = |v: i64, delta: i64| {
            v.checked_add(delta)
                .and_then(|v| v.checked_add(self.origin_offset))
                .and_then(|v| v.checked_mul(self.cell_size))
        };
        let fits = [cell.x, cell.y]
            .iter()
            .all(|&v| pixel(v, -1).is_some() && pixel(v, 2).is_some());
        if !fits {
            return Err(PerimeterError::InvalidCoordinate(format!(
                "cell {} is outside the pixel range of the grid",
                cell
            )));
        }
        Ok(())
    }

    pub fn check_cells(&self, cells: &[GridCell]) -> Result<()> {
        cells.iter().try_for_each(|&c| self.check_cell(c))
    }

    /// Bottom-left corner of `cell` in pixel space. Callers must have passed
    /// the cell through [`check_cell`](Self::check_cell).
    pub fn origin_of(&self, cell: GridCell) -> Vertex {
        Vertex::new(
            (cell.x + self.origin_offset) * self.cell_size,
            (cell.y + self.origin_offset) * self.cell_size,
        )
    }

    /// Corners in counter-clockwise order starting bottom-left.
    pub fn cell_to_vertices(&self, cell: GridCell) -> [Vertex; 4] {
        let Vertex { x, y } = self.origin_of(cell);
        let s = self.cell_size;
        [
            Vertex::new(x, y),
            Vertex::new(x + s, y),
            Vertex::new(x + s, y + s),
            Vertex::new(x, y + s),
        ]
    }

    /// Bottom, right, top, left: consecutive vertices, wrapping around.
    pub fn cell_to_edges(&self, cell: GridCell) -> [Edge; 4] {
        let v = self.cell_to_vertices(cell);
        [
            Edge::new(v[0], v[1]),
            Edge::new(v[1], v[2]),
            Edge::new(v[2], v[3]),
            Edge::new(v[3], v[0]),
        ]
    }

    /// The four cells sharing `vertex` as a corner, or `None` when the vertex
    /// is not a lattice corner.
    pub fn vertex_to_cells(&self, vertex: Vertex) -> Option<[GridCell; 4]> {
        if vertex.x % self.cell_size != 0 || vertex.y % self.cell_size != 0 {
            return None;
        }
        let x = vertex.x / self.cell_size - self.origin_offset;
        let y = vertex.y / self.cell_size - self.origin_offset;
        Some([
            GridCell::new(x, y),
            GridCell::new(x - 1, y),
            GridCell::new(x, y - 1),
            GridCell::new(x - 1, y - 1),
        ])
    }

    /// Closed CCW quad of a single cell.
    pub fn cell_ring(&self, cell: GridCell) -> LineString<f64> {
        let v = self.cell_to_vertices(cell);
        LineString::new(vec![
            v[0].into(),
            v[1].into(),
            v[2].into(),
            v[3].into(),
            v[0].into(),
        ])
    }
}
