use crate::grid::GridCell;
use std::collections::{HashMap, VecDeque};

// Index of a cell inside its arena
pub type CellId = usize;

/// Interned cells of one group. Each distinct coordinate gets a stable id in
/// insertion order; repeated coordinates resolve to the id they already have.
#[derive(Clone, Debug, Default)]
pub struct CellArena {
    cells: Vec<GridCell>,
    index: HashMap<GridCell, CellId>,
}

impl CellArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: &[GridCell]) -> Self {
        let mut arena = Self::new();
        for &cell in cells {
            arena.intern(cell);
        }
        arena
    }

    /// Returns the id of `cell`, adding it if it is new.
    pub fn intern(&mut self, cell: GridCell) -> CellId {
        if let Some(&id) = self.index.get(&cell) {
            return id;
        }
        let id = self.cells.len();
        self.cells.push(cell);
        self.index.insert(cell, id);
        id
    }

    pub fn id_of(&self, cell: &GridCell) -> Option<CellId> {
        self.index.get(cell).copied()
    }

    pub fn contains(&self, cell: &GridCell) -> bool {
        self.index.contains_key(cell)
    }

    pub fn get(&self, id: CellId) -> Option<GridCell> {
        self.cells.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Number of cells reachable from the first one through shared edges.
    pub fn connected_count(&self) -> usize {
        if self.cells.is_empty() {
            return 0;
        }
        let mut seen = vec![false; self.cells.len()];
        let mut queue = VecDeque::from([0]);
        seen[0] = true;
        let mut reached = 0;

        while let Some(id) = queue.pop_front() {
            reached += 1;
            for n in self.cells[id].neighbors() {
                if let Some(nid) = self.id_of(&n) {
                    if !seen[nid] {
                        seen[nid] = true;
                        queue.push_back(nid);
                    }
                }
            }
        }
        reached
    }
}
