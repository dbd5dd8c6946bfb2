use crate::error::{PerimeterError, Result};
use crate::graph::arena::CellArena;
use crate::grid::{
    cell_max_corner, edge_side, Edge, EdgeKey, GridCell, GridConfig, Side, Tip, Vertex,
};
use log::debug;
use std::collections::{HashMap, HashSet};

/// How a boundary edge meets the perpendicular boundary edge at one of its tips.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    /// The meeting edge belongs to the same cell (or several edges meet there).
    Shrink,
    /// The meeting edge belongs to a different cell.
    Grow,
}

/// A directed boundary edge together with everything the offset pass needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryEdge {
    pub edge: Edge,
    /// The cell this side was contributed by.
    pub owner: GridCell,
    /// Side relative to the owner's own max corner.
    pub side: Side,
    /// Max x / max y of this edge alone.
    pub max_corner: Vertex,
    pub start_corner: Option<Corner>,
    pub end_corner: Option<Corner>,
}

impl BoundaryEdge {
    fn new(edge: Edge, owner: GridCell, cell_max: Vertex) -> Self {
        Self {
            edge,
            owner,
            side: edge_side(&edge, cell_max),
            max_corner: edge.max_corner(),
            start_corner: None,
            end_corner: None,
        }
    }

    pub fn corner(&self, tip: Tip) -> Option<Corner> {
        match tip {
            Tip::Start => self.start_corner,
            Tip::End => self.end_corner,
        }
    }

    /// Records a perpendicular edge meeting at `tip`. A second meeting on the
    /// same tip always resolves to `Shrink`.
    pub fn record_corner(&mut self, tip: Tip, other_owner: GridCell) {
        let slot = match tip {
            Tip::Start => &mut self.start_corner,
            Tip::End => &mut self.end_corner,
        };
        *slot = match slot {
            None if other_owner == self.owner => Some(Corner::Shrink),
            None => Some(Corner::Grow),
            Some(_) => Some(Corner::Shrink),
        };
    }
}

/// Unordered set of surviving directed edges, keyed by `(x1, y1, x2, y2)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Boundary {
    edges: HashMap<EdgeKey, BoundaryEdge>,
}

impl Boundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `edge` unless it or its reverse is already present, in which case
    /// both directions are dropped. Returns `true` when the edge cancelled.
    pub fn toggle(&mut self, edge: BoundaryEdge) -> bool {
        let key = edge.edge.key();
        let rev = edge.edge.reversed().key();
        let had_fwd = self.edges.remove(&key).is_some();
        let had_rev = self.edges.remove(&rev).is_some();
        if had_fwd || had_rev {
            return true;
        }
        self.edges.insert(key, edge);
        false
    }

    pub fn contains(&self, edge: &Edge) -> bool {
        self.edges.contains_key(&edge.key())
    }

    /// Present in either direction.
    pub fn contains_undirected(&self, edge: &Edge) -> bool {
        self.contains(edge) || self.contains(&edge.reversed())
    }

    pub fn get(&self, edge: &Edge) -> Option<&BoundaryEdge> {
        self.edges.get(&edge.key())
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundaryEdge> {
        self.edges.values()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut BoundaryEdge> {
        self.edges.values_mut()
    }

    pub fn get_by_key(&self, key: &EdgeKey) -> Option<&BoundaryEdge> {
        self.edges.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &EdgeKey) -> Option<&mut BoundaryEdge> {
        self.edges.get_mut(key)
    }

    /// Edge keys, sorted.
    pub fn keys(&self) -> Vec<EdgeKey> {
        let mut keys: Vec<EdgeKey> = self.edges.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Edges sorted by key, for stable output.
    pub fn sorted(&self) -> Vec<&BoundaryEdge> {
        let mut edges: Vec<&BoundaryEdge> = self.edges.values().collect();
        edges.sort_unstable_by_key(|e| e.edge.key());
        edges
    }
}

/// Merged boundary of one group.
#[derive(Clone, Debug)]
pub struct Perimeter {
    pub grid: GridConfig,
    /// Every cell of the group, interned.
    pub cells: CellArena,
    /// Corner vertices left after interior-vertex removal.
    pub vertices: HashSet<Vertex>,
    pub boundary: Boundary,
}

/// Builds [`Perimeter`]s by edge cancellation.
#[derive(Clone, Debug)]
pub struct PerimeterBuilder {
    pub grid: GridConfig,
    /// Reject groups that are not 4-connected instead of producing
    /// pinched or disjoint boundaries.
    pub check_connectivity: bool,
}

impl Default for PerimeterBuilder {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl PerimeterBuilder {
    pub fn new(grid: GridConfig) -> Self {
        Self {
            grid,
            check_connectivity: true,
        }
    }

    pub fn with_connectivity_check(mut self, check: bool) -> Self {
        self.check_connectivity = check;
        self
    }

    /// Merges `cells` into one boundary.
    pub fn merge(&self, cells: &[GridCell]) -> Result<Perimeter> {
        let label = cells.first().map(|c| c.to_string()).unwrap_or_default();
        self.merge_named(&label, cells)
    }

    /// Same as [`merge`](Self::merge), with `name` used in diagnostics.
    pub fn merge_named(&self, name: &str, cells: &[GridCell]) -> Result<Perimeter> {
        self.grid.validate()?;
        if cells.is_empty() {
            return Err(PerimeterError::InvalidArgument(format!(
                "group {} has no cells",
                name
            )));
        }
        self.grid.check_cells(cells)?;

        let arena = CellArena::from_cells(cells);
        if self.check_connectivity {
            let reached = arena.connected_count();
            if reached != arena.len() {
                return Err(PerimeterError::MalformedGroup {
                    group: name.to_string(),
                    cells: arena.len(),
                    reached,
                });
            }
        }

        let mut vertices = HashSet::with_capacity(arena.len() * 2 + 2);
        let mut boundary = Boundary::new();
        let mut cancelled = 0;

        for &cell in arena.cells() {
            vertices.extend(self.grid.cell_to_vertices(cell));

            let edges = self.grid.cell_to_edges(cell);
            let cell_max = cell_max_corner(&edges);
            for edge in edges {
                if boundary.toggle(BoundaryEdge::new(edge, cell, cell_max)) {
                    cancelled += 1;
                }
            }
        }

        self.remove_interior_vertices(&arena, &mut vertices)?;

        debug!(
            "merged group {}: {} cells, {} boundary edges, {} shared edges, {} vertices",
            name,
            arena.len(),
            boundary.len(),
            cancelled,
            vertices.len()
        );

        Ok(Perimeter {
            grid: self.grid,
            cells: arena,
            vertices,
            boundary,
        })
    }

    /// Drops every vertex whose four lattice neighbours are present and whose
    /// four surrounding cells all belong to the group. Single pass, not iterated.
    fn remove_interior_vertices(
        &self,
        arena: &CellArena,
        vertices: &mut HashSet<Vertex>,
    ) -> Result<()> {
        let s = self.grid.cell_size;
        let interior: Vec<Vertex> = vertices
            .iter()
            .filter(|v| {
                let neighbors = [
                    Vertex::new(v.x - s, v.y),
                    Vertex::new(v.x + s, v.y),
                    Vertex::new(v.x, v.y + s),
                    Vertex::new(v.x, v.y - s),
                ];
                neighbors.iter().all(|n| vertices.contains(n))
                    && self
                        .grid
                        .vertex_to_cells(**v)
                        .is_some_and(|cells| cells.iter().all(|c| arena.contains(c)))
            })
            .copied()
            .collect();

        for v in interior {
            if !vertices.remove(&v) {
                return Err(PerimeterError::InvariantViolation(format!(
                    "tried to remove missing vertex ({}, {})",
                    v.x, v.y
                )));
            }
        }
        Ok(())
    }
}
