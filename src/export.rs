//! Grouping of tile records and GeoJSON export of estate geometry.
//!
//! Records sharing a group id are merged into one estate; records without one
//! stay single-cell groups even when they touch each other. Each group then
//! becomes one feature:
//!
//! * `Perimeter` - the merged boundary, optionally inset, as a `MultiLineString`
//!   of unordered two-point segments,
//! * `Area` - one quad per cell as a `MultiPolygon`, no merging,
//! * `Outline` - the merged boundary chained into rings, as a `MultiPolygon`.

use crate::error::{PerimeterError, Result};
use crate::graph::{Perimeter, PerimeterBuilder};
use crate::grid::{Edge, GridCell, GridConfig};
use crate::utils::map_maybe_par;
use geo_types::{MultiPolygon, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Name carried in the collection-level `crs` member.
pub const CRS_NAME: &str = "ESTATES";

/// One tile as supplied by the data collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    pub coords: GridCell,
    /// `None` or empty for tiles that do not belong to an estate.
    pub group_id: Option<String>,
    pub category: String,
    pub name: String,
}

impl TileRecord {
    pub fn new(coords: GridCell, group_id: Option<&str>) -> Self {
        Self {
            coords,
            group_id: group_id.map(str::to_string),
            category: String::new(),
            name: String::new(),
        }
    }

    pub fn with_meta(mut self, category: &str, name: &str) -> Self {
        self.category = category.to_string();
        self.name = name.to_string();
        self
    }

    fn group_key(&self) -> Option<&str> {
        self.group_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Cells that are exported together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGroup {
    pub id: Option<String>,
    pub category: String,
    pub name: String,
    pub cells: Vec<GridCell>,
}

impl TileGroup {
    /// Group id, or the coordinate of a single ungrouped cell.
    pub fn label(&self) -> String {
        match (&self.id, self.cells.first()) {
            (Some(id), _) => id.clone(),
            (None, Some(cell)) => cell.to_string(),
            (None, None) => String::new(),
        }
    }
}

enum Slot<'a> {
    Group(&'a str),
    Single(usize),
}

/// Partitions records into groups, in order of first appearance.
///
/// A coordinate belongs to the first group that claims it; later records
/// for the same coordinate are dropped.
pub fn group_records(records: &[TileRecord]) -> Vec<TileGroup> {
    let mut order: Vec<Slot> = Vec::new();
    let mut members: HashMap<&str, Vec<usize>> = HashMap::new();

    for (i, record) in records.iter().enumerate() {
        match record.group_key() {
            Some(id) => {
                let entry = members.entry(id).or_default();
                if entry.is_empty() {
                    order.push(Slot::Group(id));
                }
                entry.push(i);
            }
            None => order.push(Slot::Single(i)),
        }
    }

    let mut taken: HashSet<GridCell> = HashSet::with_capacity(records.len());
    let mut groups = Vec::with_capacity(order.len());

    for slot in order {
        let (id, indices) = match slot {
            Slot::Group(id) => (Some(id.to_string()), members.remove(id).unwrap_or_default()),
            Slot::Single(i) => (None, vec![i]),
        };
        let kept: Vec<&TileRecord> = indices
            .into_iter()
            .map(|i| &records[i])
            .filter(|r| taken.insert(r.coords))
            .collect();
        let Some(first) = kept.first() else {
            continue;
        };
        groups.push(TileGroup {
            id,
            category: first.category.clone(),
            name: first.name.clone(),
            cells: kept.iter().map(|r| r.coords).collect(),
        });
    }

    groups
}

/// Which geometry a feature carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Perimeter,
    Area,
    Outline,
}

impl FeatureKind {
    pub fn feature_type(&self) -> &'static str {
        match self {
            FeatureKind::Perimeter => "estatePerimeter",
            FeatureKind::Area => "estateArea",
            FeatureKind::Outline => "estateOutline",
        }
    }
}

/// Turns tile groups into GeoJSON features.
#[derive(Clone, Debug)]
pub struct EstateExporter {
    pub grid: GridConfig,
    /// Inset applied to perimeter edges, in pixels.
    pub margin: i64,
    /// Export perimeters inset by `margin` instead of on the cell grid.
    pub offset_edges: bool,
    pub check_connectivity: bool,
    /// Log and leave out groups that fail instead of aborting the export.
    pub skip_failed_groups: bool,
}

impl Default for EstateExporter {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl EstateExporter {
    pub fn new(grid: GridConfig) -> Self {
        Self {
            grid,
            margin: 1,
            offset_edges: true,
            check_connectivity: true,
            skip_failed_groups: true,
        }
    }

    pub fn with_margin(mut self, margin: i64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_offset(mut self, offset: bool) -> Self {
        self.offset_edges = offset;
        self
    }

    pub fn with_connectivity_check(mut self, check: bool) -> Self {
        self.check_connectivity = check;
        self
    }

    pub fn with_skip_failed(mut self, skip: bool) -> Self {
        self.skip_failed_groups = skip;
        self
    }

    fn merge(&self, group: &TileGroup) -> Result<Perimeter> {
        PerimeterBuilder::new(self.grid)
            .with_connectivity_check(self.check_connectivity)
            .merge_named(&group.label(), &group.cells)
    }

    /// Boundary segments of `group`, inset when `offset_edges` is set.
    pub fn perimeter_edges(&self, group: &TileGroup) -> Result<Vec<Edge>> {
        let mut perimeter = self.merge(group)?;
        if self.offset_edges {
            Ok(perimeter.offset(self.margin)?.lines().copied().collect())
        } else {
            Ok(perimeter.boundary.sorted().iter().map(|b| b.edge).collect())
        }
    }

    pub fn feature(&self, group: &TileGroup, kind: FeatureKind) -> Result<Feature> {
        let value = match kind {
            FeatureKind::Perimeter => {
                let lines = self
                    .perimeter_edges(group)?
                    .iter()
                    .map(|e| {
                        vec![
                            vec![e.start.x as f64, e.start.y as f64],
                            vec![e.end.x as f64, e.end.y as f64],
                        ]
                    })
                    .collect();
                Value::MultiLineString(lines)
            }
            FeatureKind::Area => {
                if group.cells.is_empty() {
                    return Err(PerimeterError::InvalidArgument(format!(
                        "group {} has no cells",
                        group.label()
                    )));
                }
                self.grid.validate()?;
                self.grid.check_cells(&group.cells)?;
                let quads: MultiPolygon<f64> = group
                    .cells
                    .iter()
                    .map(|&c| Polygon::new(self.grid.cell_ring(c), vec![]))
                    .collect();
                Value::from(&quads)
            }
            FeatureKind::Outline => Value::from(&self.merge(group)?.outline()?),
        };

        Ok(Feature {
            bbox: None,
            geometry: Some(Geometry::new(value)),
            id: None,
            properties: Some(group_properties(group, kind)),
            foreign_members: None,
        })
    }

    /// One feature per group. Failed groups are skipped with a warning unless
    /// `skip_failed_groups` is off, in which case the first failure is returned.
    pub fn export(&self, groups: &[TileGroup], kind: FeatureKind) -> Result<FeatureCollection> {
        let results = map_maybe_par(groups, |g| self.feature(g, kind));

        let mut features = Vec::with_capacity(results.len());
        for (group, result) in groups.iter().zip(results) {
            match result {
                Ok(feature) => features.push(feature),
                Err(e) if self.skip_failed_groups => {
                    warn!("skipping group {}: {}", group.label(), e);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "exported {} {} features from {} groups",
            features.len(),
            kind.feature_type(),
            groups.len()
        );

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(crs_member()),
        })
    }

    pub fn export_records(
        &self,
        records: &[TileRecord],
        kind: FeatureKind,
    ) -> Result<FeatureCollection> {
        self.export(&group_records(records), kind)
    }
}

fn group_properties(group: &TileGroup, kind: FeatureKind) -> JsonObject {
    let mut props = JsonObject::new();
    props.insert(
        "estateId".to_string(),
        group.id.clone().map_or(JsonValue::Null, JsonValue::String),
    );
    props.insert("type".to_string(), JsonValue::String(group.category.clone()));
    props.insert("name".to_string(), JsonValue::String(group.name.clone()));
    props.insert(
        "featureType".to_string(),
        JsonValue::String(kind.feature_type().to_string()),
    );
    props
}

fn crs_member() -> JsonObject {
    let mut crs = JsonObject::new();
    crs.insert(
        "crs".to_string(),
        serde_json::json!({"type": "name", "properties": {"name": CRS_NAME}}),
    );
    crs
}

/// One plain `Polygon` feature per cell, e.g. for changed-parcel overlays.
pub fn parcel_collection(grid: &GridConfig, cells: &[GridCell]) -> Result<FeatureCollection> {
    grid.validate()?;
    grid.check_cells(cells)?;
    let features = cells
        .iter()
        .map(|&c| Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::from(&Polygon::new(
                grid.cell_ring(c),
                vec![],
            )))),
            id: None,
            properties: None,
            foreign_members: None,
        })
        .collect();

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
