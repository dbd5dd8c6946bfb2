use super::*;
use crate::graph::PerimeterBuilder;
use crate::grid::GridConfig;
use std::collections::HashSet;

fn builder() -> PerimeterBuilder {
    PerimeterBuilder::new(GridConfig::new(40, 150).unwrap())
}

fn merge(coords: &[(i64, i64)]) -> Perimeter {
    let cells: Vec<GridCell> = coords.iter().map(|&c| GridCell::from(c)).collect();
    builder().merge(&cells).unwrap()
}

fn e(x1: i64, y1: i64, x2: i64, y2: i64) -> Edge {
    Edge::new(Vertex::new(x1, y1), Vertex::new(x2, y2))
}

fn edge_set(offset: &OffsetBoundary) -> HashSet<Edge> {
    offset.lines().copied().collect()
}

/// Every end point is the start of another edge.
fn is_closed(offset: &OffsetBoundary) -> bool {
    let starts: HashSet<Vertex> = offset.lines().map(|e| e.start).collect();
    offset.lines().all(|e| starts.contains(&e.end))
}

#[test]
fn test_single_cell_insets_to_smaller_square() {
    let mut perimeter = merge(&[(0, 0)]);
    let inset = perimeter.offset(1).unwrap();

    for b in perimeter.boundary.iter() {
        assert_eq!(b.start_corner, Some(Corner::Shrink));
        assert_eq!(b.end_corner, Some(Corner::Shrink));
    }

    let expected: HashSet<Edge> = [
        e(6001, 6001, 6039, 6001),
        e(6039, 6001, 6039, 6039),
        e(6039, 6039, 6001, 6039),
        e(6001, 6039, 6001, 6001),
    ]
    .into_iter()
    .collect();
    assert_eq!(edge_set(&inset), expected);
    assert!(is_closed(&inset));
}

#[test]
fn test_zero_margin_is_identity() {
    let mut perimeter = merge(&[(0, 0), (1, 0), (0, 1), (2, 0), (2, 1)]);
    let inset = perimeter.offset(0).unwrap();
    let raw: HashSet<Edge> = perimeter.boundary.iter().map(|b| b.edge).collect();
    assert_eq!(edge_set(&inset), raw);
}

#[test]
fn test_l_shape_concave_corner_grows() {
    let mut perimeter = merge(&[(0, 0), (1, 0), (0, 1)]);
    perimeter.annotate_corners();

    let top = perimeter.boundary.get(&e(6080, 6040, 6040, 6040)).unwrap();
    assert_eq!(top.owner, GridCell::new(1, 0));
    assert_eq!(top.side, Side::Top);
    assert_eq!(top.start_corner, Some(Corner::Shrink));
    assert_eq!(top.end_corner, Some(Corner::Grow));

    let right = perimeter.boundary.get(&e(6040, 6040, 6040, 6080)).unwrap();
    assert_eq!(right.owner, GridCell::new(0, 1));
    assert_eq!(right.start_corner, Some(Corner::Grow));
    assert_eq!(right.end_corner, Some(Corner::Shrink));

    // collinear joints between cells carry no annotation
    let bottom = perimeter.boundary.get(&e(6000, 6000, 6040, 6000)).unwrap();
    assert_eq!(bottom.start_corner, Some(Corner::Shrink));
    assert_eq!(bottom.end_corner, None);

    let inset = perimeter.offset(1).unwrap();
    let lines = edge_set(&inset);
    assert!(lines.contains(&e(6079, 6039, 6039, 6039)));
    assert!(lines.contains(&e(6039, 6039, 6039, 6079)));
    assert!(is_closed(&inset));
}

#[test]
fn test_pinch_point_forces_shrink() {
    let cells = [GridCell::new(0, 0), GridCell::new(1, 1)];
    let mut perimeter = builder()
        .with_connectivity_check(false)
        .merge(&cells)
        .unwrap();
    perimeter.annotate_corners();

    let pinch = Vertex::new(6040, 6040);
    for b in perimeter.boundary.iter() {
        if b.edge.start == pinch {
            assert_eq!(b.start_corner, Some(Corner::Shrink));
        }
        if b.edge.end == pinch {
            assert_eq!(b.end_corner, Some(Corner::Shrink));
        }
    }
}

#[test]
fn test_tip_table_left_side() {
    let base = BoundaryEdge {
        edge: e(6000, 6040, 6000, 6000),
        owner: GridCell::new(0, 0),
        side: Side::Left,
        max_corner: Vertex::new(6000, 6040),
        start_corner: None,
        end_corner: None,
    };

    let plain = offset_edge(&base, 2);
    assert_eq!(plain.edge, e(6002, 6040, 6002, 6000));

    let shrink = BoundaryEdge {
        start_corner: Some(Corner::Shrink),
        end_corner: Some(Corner::Shrink),
        ..base.clone()
    };
    assert_eq!(offset_edge(&shrink, 2).edge, e(6002, 6038, 6002, 6002));

    let grow = BoundaryEdge {
        start_corner: Some(Corner::Grow),
        end_corner: Some(Corner::Grow),
        ..base
    };
    assert_eq!(offset_edge(&grow, 2).edge, e(6002, 6042, 6002, 5998));
}

#[test]
fn test_tip_table_bottom_side() {
    let base = BoundaryEdge {
        edge: e(6000, 6000, 6040, 6000),
        owner: GridCell::new(0, 0),
        side: Side::Bottom,
        max_corner: Vertex::new(6040, 6000),
        start_corner: Some(Corner::Grow),
        end_corner: Some(Corner::Shrink),
    };
    assert_eq!(offset_edge(&base, 1).edge, e(5999, 6001, 6039, 6001));
}

#[test]
fn test_tip_table_all_orientations() {
    use Corner::{Grow, Shrink};
    use Tip::{End, Start};

    let bottom = e(6000, 6000, 6040, 6000);
    let right = e(6040, 6000, 6040, 6040);
    let cases = [
        // horizontal, tip away from max x
        (bottom, Side::Bottom, Start, Shrink, e(6002, 6002, 6040, 6002)),
        (bottom, Side::Bottom, Start, Grow, e(5998, 6002, 6040, 6002)),
        // horizontal, tip at max x
        (bottom, Side::Bottom, End, Shrink, e(6000, 6002, 6038, 6002)),
        (bottom, Side::Bottom, End, Grow, e(6000, 6002, 6042, 6002)),
        (bottom.reversed(), Side::Bottom, Start, Shrink, e(6038, 6002, 6000, 6002)),
        (bottom.reversed(), Side::Bottom, Start, Grow, e(6042, 6002, 6000, 6002)),
        // vertical, tip away from max y
        (right, Side::Right, Start, Shrink, e(6038, 6002, 6038, 6040)),
        (right, Side::Right, Start, Grow, e(6038, 5998, 6038, 6040)),
        // vertical, tip at max y
        (right, Side::Right, End, Shrink, e(6038, 6000, 6038, 6038)),
        (right, Side::Right, End, Grow, e(6038, 6000, 6038, 6042)),
        (right.reversed(), Side::Right, End, Shrink, e(6038, 6040, 6038, 6002)),
        (right.reversed(), Side::Right, End, Grow, e(6038, 6040, 6038, 5998)),
    ];

    for (edge, side, tip, corner, expected) in cases {
        let mut b = BoundaryEdge {
            edge,
            owner: GridCell::new(0, 0),
            side,
            max_corner: Vertex::new(edge.start.x.max(edge.end.x), edge.start.y.max(edge.end.y)),
            start_corner: None,
            end_corner: None,
        };
        match tip {
            Start => b.start_corner = Some(corner),
            End => b.end_corner = Some(corner),
        }
        assert_eq!(
            offset_edge(&b, 2).edge,
            expected,
            "{:?} {:?} {:?} {:?}",
            side,
            tip,
            corner,
            edge
        );
    }
}

#[test]
fn test_margin_out_of_range() {
    let mut perimeter = merge(&[(0, 0)]);
    assert!(matches!(
        perimeter.offset(20),
        Err(PerimeterError::InvalidArgument(_))
    ));
    assert!(perimeter.offset(-1).is_err());
}
