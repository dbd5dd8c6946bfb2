use estate_perimeter::export::parcel_collection;
use estate_perimeter::tiles::{estate_records, parse_tiles};
use estate_perimeter::{
    group_records, Corner, EstateExporter, FeatureKind, GridCell, GridConfig, PerimeterBuilder,
    Vertex,
};
use geo::Area;
use geojson::{GeoJson, Value};

fn test_grid() -> GridConfig {
    GridConfig::new(40, 150).unwrap()
}

#[test]
fn test_single_cell_inset_square() {
    let mut perimeter = PerimeterBuilder::new(test_grid())
        .merge(&[GridCell::new(0, 0)])
        .unwrap();

    let vertices = &perimeter.vertices;
    assert!(vertices.contains(&Vertex::new(6000, 6000)));
    assert!(vertices.contains(&Vertex::new(6040, 6040)));

    let inset = perimeter.offset(1).unwrap();
    assert_eq!(inset.len(), 4);
    for e in inset.lines() {
        let len = (e.end.x - e.start.x).abs() + (e.end.y - e.start.y).abs();
        assert_eq!(len, 38);
        for v in [e.start, e.end] {
            assert!(v.x == 6001 || v.x == 6039);
            assert!(v.y == 6001 || v.y == 6039);
        }
    }
    assert!(perimeter
        .boundary
        .iter()
        .all(|b| b.start_corner == Some(Corner::Shrink) && b.end_corner == Some(Corner::Shrink)));
}

#[test]
fn test_estate_with_courtyard() {
    // 4x4 block with a 2x2 courtyard in the middle
    let cells: Vec<GridCell> = (0..4)
        .flat_map(|x| (0..4).map(move |y| GridCell::new(x, y)))
        .filter(|c| !((1..3).contains(&c.x) && (1..3).contains(&c.y)))
        .collect();
    let perimeter = PerimeterBuilder::new(test_grid()).merge(&cells).unwrap();
    assert_eq!(perimeter.boundary.len(), 16 + 8);

    let outline = perimeter.outline().unwrap();
    assert_eq!(outline.0.len(), 1);
    assert_eq!(outline.0[0].interiors().len(), 1);
    assert_eq!(outline.0[0].exterior().0.len(), 5);
    assert!((outline.unsigned_area() - 12.0 * 1600.0).abs() < 1e-6);
}

#[test]
fn test_tiles_payload_to_geojson() {
    let body = r#"{"ok": true, "data": {
        "0,0": {"x": 0, "y": 0, "type": "owned", "estateId": "1", "name": "Hub"},
        "1,0": {"x": 1, "y": 0, "type": "owned", "estateId": "1", "name": "Hub"},
        "0,1": {"x": 0, "y": 1, "type": "owned", "estateId": "1", "name": "Hub"},
        "7,7": {"x": 7, "y": 7, "type": "owned", "estateId": "2", "name": "Kiosk"},
        "3,3": {"x": 3, "y": 3, "type": "road"}
    }}"#;
    let records = estate_records(parse_tiles(body).unwrap());
    let groups = group_records(&records);
    assert_eq!(groups.len(), 2);

    let exporter = EstateExporter::new(test_grid());
    let perimeters = exporter.export(&groups, FeatureKind::Perimeter).unwrap();
    let areas = exporter.export(&groups, FeatureKind::Area).unwrap();
    assert_eq!(perimeters.features.len(), 2);
    assert_eq!(areas.features.len(), 2);

    let hub = perimeters
        .features
        .iter()
        .find(|f| f.properties.as_ref().unwrap()["estateId"] == "1")
        .unwrap();
    match &hub.geometry.as_ref().unwrap().value {
        Value::MultiLineString(lines) => assert_eq!(lines.len(), 8),
        other => panic!("unexpected geometry {:?}", other),
    }

    let text = GeoJson::FeatureCollection(perimeters).to_string();
    let reparsed: GeoJson = text.parse().unwrap();
    assert!(matches!(reparsed, GeoJson::FeatureCollection(ref fc) if fc.features.len() == 2));
}

#[test]
fn test_parcel_overlay_uses_default_grid() {
    let fc = parcel_collection(&GridConfig::default(), &[GridCell::new(-152, -152)]).unwrap();
    match &fc.features[0].geometry.as_ref().unwrap().value {
        Value::Polygon(rings) => {
            assert_eq!(rings[0][0], vec![0.0, 0.0]);
            assert_eq!(rings[0][2], vec![40.0, 40.0]);
        }
        other => panic!("unexpected geometry {:?}", other),
    }
}

#[test]
fn test_tile_far_off_the_map_is_skipped() {
    let body = r#"{"data": {
        "0,0": {"x": 0, "y": 0, "type": "owned", "estateId": "1"},
        "300000000000000000,0": {"x": 300000000000000000, "y": 0, "type": "owned", "estateId": "2"}
    }}"#;
    let records = estate_records(parse_tiles(body).unwrap());
    let fc = EstateExporter::default()
        .export_records(&records, FeatureKind::Perimeter)
        .unwrap();
    assert_eq!(fc.features.len(), 1);
}
