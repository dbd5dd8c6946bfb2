pub mod arena;
pub mod perimeter;


pub use arena::{CellArena, CellId};
pub use perimeter::{Boundary, BoundaryEdge, Corner, Perimeter, PerimeterBuilder};
