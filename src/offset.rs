//! Corner classification and inward offsetting of a merged boundary.
//!
//! Every boundary edge is moved `margin` pixels towards the inside of the cell
//! that owns it. Where two perpendicular boundary edges meet, the tip is then
//! pulled back (`Shrink`) or pushed forward (`Grow`) by another `margin` along
//! the edge so neighbouring insets line up at the corner.

use crate::error::{PerimeterError, Result};
use crate::graph::{Boundary, BoundaryEdge, Corner, Perimeter};
use crate::grid::{Edge, GridCell, Side, Tip, Vertex};
use std::collections::HashMap;

/// An inset edge with the data it was derived from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffsetEdge {
    pub edge: Edge,
    pub owner: GridCell,
    pub side: Side,
}

/// Boundary after inward displacement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OffsetBoundary {
    pub margin: i64,
    pub edges: Vec<OffsetEdge>,
}

impl OffsetBoundary {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().map(|e| &e.edge)
    }
}

/// Annotates each tip where a perpendicular boundary edge meets it.
///
/// A tip touched by one perpendicular edge records whether both edges share an
/// owner. A tip touched by two or more is forced to `Shrink`.
pub fn annotate_corners(boundary: &mut Boundary) {
    for edge in boundary.values_mut() {
        edge.start_corner = None;
        edge.end_corner = None;
    }

    // vertex -> (edge index, tip)
    let mut at_vertex: HashMap<Vertex, Vec<(usize, Tip)>> = HashMap::new();
    let keys = boundary.keys();
    let mut meta = Vec::with_capacity(keys.len());
    for key in &keys {
        let Some(b) = boundary.get_by_key(key) else {
            continue;
        };
        let i = meta.len();
        meta.push((*key, b.edge.is_vertical(), b.owner));
        at_vertex.entry(b.edge.start).or_default().push((i, Tip::Start));
        at_vertex.entry(b.edge.end).or_default().push((i, Tip::End));
    }

    let mut meetings: Vec<(usize, Tip, GridCell)> = Vec::new();
    for tips in at_vertex.values() {
        for (a, &(i, tip_i)) in tips.iter().enumerate() {
            for &(j, tip_j) in &tips[a + 1..] {
                let (_, vertical_i, owner_i) = meta[i];
                let (_, vertical_j, owner_j) = meta[j];
                if vertical_i == vertical_j {
                    continue;
                }
                meetings.push((i, tip_i, owner_j));
                meetings.push((j, tip_j, owner_i));
            }
        }
    }

    for (i, tip, other_owner) in meetings {
        if let Some(b) = boundary.get_mut(&meta[i].0) {
            b.record_corner(tip, other_owner);
        }
    }
}

/// Moves one edge inward by `margin`, then adjusts each annotated tip along
/// the edge. The tip adjustment compares the tip against the edge's own max
/// coordinate on the axis the edge runs along.
pub fn offset_edge(b: &BoundaryEdge, margin: i64) -> OffsetEdge {
    let mut start = b.edge.start;
    let mut end = b.edge.end;

    match b.side {
        Side::Top => {
            start.y -= margin;
            end.y -= margin;
        }
        Side::Bottom => {
            start.y += margin;
            end.y += margin;
        }
        Side::Left => {
            start.x += margin;
            end.x += margin;
        }
        Side::Right => {
            start.x -= margin;
            end.x -= margin;
        }
    }

    let horizontal = matches!(b.side, Side::Top | Side::Bottom);
    for (tip, point) in [(Tip::Start, &mut start), (Tip::End, &mut end)] {
        let Some(corner) = b.corner(tip) else {
            continue;
        };
        let (coord, max) = if horizontal {
            (&mut point.x, b.max_corner.x)
        } else {
            (&mut point.y, b.max_corner.y)
        };
        let at_max = *coord == max;
        *coord += match (corner, at_max) {
            (Corner::Shrink, true) => -margin,
            (Corner::Shrink, false) => margin,
            (Corner::Grow, true) => margin,
            (Corner::Grow, false) => -margin,
        };
    }

    OffsetEdge {
        edge: Edge::new(start, end),
        owner: b.owner,
        side: b.side,
    }
}

/// Offsets every edge of an annotated boundary, in key order.
pub fn offset(boundary: &Boundary, margin: i64) -> OffsetBoundary {
    OffsetBoundary {
        margin,
        edges: boundary
            .sorted()
            .into_iter()
            .map(|b| offset_edge(b, margin))
            .collect(),
    }
}

impl Perimeter {
    pub fn annotate_corners(&mut self) {
        annotate_corners(&mut self.boundary);
    }

    /// Annotates the corners and returns the inset boundary. The margin must
    /// leave a gap inside every cell: `0 <= 2 * margin < cell_size`.
    pub fn offset(&mut self, margin: i64) -> Result<OffsetBoundary> {
        if margin < 0 || margin >= self.grid.cell_size - margin {
            return Err(PerimeterError::InvalidArgument(format!(
                "margin {} out of range for cell size {}",
                margin, self.grid.cell_size
            )));
        }
        self.annotate_corners();
        Ok(offset(&self.boundary, margin))
    }
}

#[cfg(test)]
#[path = "offset_tests.rs"]
mod tests;
