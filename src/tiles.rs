//! Decoding of the tiles API payload into [`TileRecord`]s.
//!
//! The body looks like `{"ok": true, "data": {"x,y": {"x": .., "y": .., "type": ..,
//! "estateId": .., "name": ..}, ...}}`. Only the fields needed for estate
//! export are read; everything else is ignored.

use crate::error::{PerimeterError, Result};
use crate::export::TileRecord;
use crate::grid::GridCell;
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize)]
struct TilesResponse {
    data: HashMap<String, RawTile>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTile {
    x: i64,
    y: i64,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    estate_id: Option<IdValue>,
    #[serde(default)]
    name: Option<String>,
}

// The API has served estate ids both as strings and as numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdValue {
    Text(String),
    Number(i64),
}

impl IdValue {
    fn into_string(self) -> String {
        match self {
            IdValue::Text(s) => s,
            IdValue::Number(n) => n.to_string(),
        }
    }
}

/// Parses a tiles API body. Records come back sorted by coordinate.
///
/// A tile whose key disagrees with its own `x`/`y` fields is rejected.
pub fn parse_tiles(json: &str) -> Result<Vec<TileRecord>> {
    let response: TilesResponse = serde_json::from_str(json)?;

    let mut records = Vec::with_capacity(response.data.len());
    for (key, tile) in response.data {
        let coords = GridCell::new(tile.x, tile.y);
        if key.parse::<GridCell>()? != coords {
            return Err(PerimeterError::InvalidCoordinate(format!(
                "tile key {} does not match its coordinates {}",
                key, coords
            )));
        }
        records.push(TileRecord {
            coords,
            group_id: tile.estate_id.map(IdValue::into_string),
            category: tile.kind.unwrap_or_default(),
            name: tile.name.unwrap_or_default(),
        });
    }
    records.sort_unstable_by_key(|r| (r.coords.x, r.coords.y));

    debug!("parsed {} tiles", records.len());
    Ok(records)
}

/// Only the tiles that belong to an estate.
pub fn estate_records(records: Vec<TileRecord>) -> Vec<TileRecord> {
    records
        .into_iter()
        .filter(|r| r.group_id.as_deref().is_some_and(|id| !id.is_empty()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "ok": true,
        "data": {
            "1,0": {"x": 1, "y": 0, "type": "owned", "estateId": "44", "name": "Gallery", "owner": "0xabc"},
            "0,0": {"x": 0, "y": 0, "type": "owned", "estateId": "44", "name": "Gallery"},
            "-3,2": {"x": -3, "y": 2, "type": "road"},
            "5,5": {"x": 5, "y": 5, "type": "owned", "estateId": 9}
        }
    }"#;

    #[test]
    fn test_parse_tiles() {
        let records = parse_tiles(BODY).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].coords, GridCell::new(-3, 2));
        assert_eq!(records[0].group_id, None);
        assert_eq!(records[0].category, "road");
        assert_eq!(records[1].coords, GridCell::new(0, 0));
        assert_eq!(records[1].name, "Gallery");
        assert_eq!(records[3].group_id.as_deref(), Some("9"));
    }

    #[test]
    fn test_estate_records() {
        let estates = estate_records(parse_tiles(BODY).unwrap());
        assert_eq!(estates.len(), 3);
        assert!(estates.iter().all(|r| r.group_id.is_some()));
    }

    #[test]
    fn test_mismatched_key_rejected() {
        let body = r#"{"data": {"1,1": {"x": 2, "y": 1}}}"#;
        assert!(matches!(
            parse_tiles(body),
            Err(PerimeterError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(parse_tiles("{\"data\": 3}"), Err(PerimeterError::Json(_))));
    }
}
