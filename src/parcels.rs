//! Scan-grid helpers for the parcel change tracker.
//!
//! The scanner walks a square of `(2 * radius + 1)^2` parcels centred on the
//! origin, and publishes changed parcels snapped to the renderer's coarser
//! unit grid as one line of `;`-separated coordinates per group.

use crate::export::TileGroup;
use crate::grid::GridCell;
use std::collections::HashSet;

/// Half-width of the map in parcels.
pub const MAP_RADIUS: i64 = 150;

/// Snap size of the renderer grid.
pub const RENDER_UNIT: i64 = 5;

/// Every coordinate of the scan square, x-major from `(-radius, -radius)`.
pub fn grid_coords(radius: i64) -> Vec<GridCell> {
    let side = (2 * radius + 1).max(0) as usize;
    let mut coords = Vec::with_capacity(side * side);
    for x in -radius..=radius {
        for y in -radius..=radius {
            coords.push(GridCell::new(x, y));
        }
    }
    coords
}

/// `all` without the coordinates already in `known`, order kept.
pub fn pending_coords(all: &[GridCell], known: &HashSet<GridCell>) -> Vec<GridCell> {
    all.iter().copied().filter(|c| !known.contains(c)).collect()
}

/// Drops everything before `at`. Unknown or first-position `at` leaves the
/// list untouched.
pub fn resume_at(coords: &mut Vec<GridCell>, at: GridCell) {
    if let Some(pos) = coords.iter().position(|&c| c == at) {
        coords.drain(..pos);
    }
}

// Nearest multiple of `unit`, halves rounding up. `None` on overflow.
fn round_half_up(v: i64, unit: i64) -> Option<i64> {
    let q = v.div_euclid(unit);
    let r = v.rem_euclid(unit);
    let q = if r >= unit - r { q.checked_add(1)? } else { q };
    q.checked_mul(unit)
}

/// Snaps `cell` to the unit grid. Returns `None` when the snapped coordinate
/// falls outside the map square.
pub fn round_to_unit(cell: GridCell, unit: i64, radius: i64) -> Option<GridCell> {
    if unit <= 0 {
        return None;
    }
    let x = round_half_up(cell.x, unit)?;
    let y = round_half_up(cell.y, unit)?;
    let map = -radius..=radius;
    if !map.contains(&x) || !map.contains(&y) {
        return None;
    }
    Some(GridCell::new(x, y))
}

/// Coords line format: one group per line, cells joined by `;`, repeated
/// cells within a line written once.
pub fn coords_lines(groups: &[TileGroup]) -> String {
    groups
        .iter()
        .map(|g| {
            let mut seen = HashSet::with_capacity(g.cells.len());
            g.cells
                .iter()
                .filter(|c| seen.insert(**c))
                .map(GridCell::to_string)
                .collect::<Vec<_>>()
                .join(";")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Snaps every cell of every group. Cells that fall off the map are dropped,
/// a snapped cell stays with the first group that reaches it, and groups left
/// empty disappear.
pub fn round_groups(groups: &[TileGroup], unit: i64, radius: i64) -> Vec<TileGroup> {
    let mut claimed = HashSet::new();
    groups
        .iter()
        .filter_map(|g| {
            let cells: Vec<GridCell> = g
                .cells
                .iter()
                .filter_map(|&c| round_to_unit(c, unit, radius))
                .filter(|&c| claimed.insert(c))
                .collect();
            if cells.is_empty() {
                return None;
            }
            Some(TileGroup {
                cells,
                ..g.clone()
            })
        })
        .collect()
}
