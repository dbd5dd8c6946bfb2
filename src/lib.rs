pub mod error;
pub mod export;
pub mod graph;
pub mod grid;
pub mod offset;
pub mod parcels;
pub mod rings;
pub mod tiles;
pub mod utils;

pub use error::{PerimeterError, Result};
pub use export::{group_records, EstateExporter, FeatureKind, TileGroup, TileRecord};
pub use graph::{Boundary, BoundaryEdge, Corner, Perimeter, PerimeterBuilder};
pub use grid::{Edge, GridCell, GridConfig, Side, Tip, Vertex};
pub use offset::{OffsetBoundary, OffsetEdge};
pub use rings::Ring;
