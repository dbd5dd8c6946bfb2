use crate::error::{PerimeterError, Result};
use crate::graph::Perimeter;
use crate::grid::{Edge, Vertex};
use geo::algorithm::contains::Contains;
use geo::bounding_rect::BoundingRect;
use geo::Area;
use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use rstar::{RTree, RTreeObject, AABB};
use std::collections::HashMap;

/// A closed chain of boundary vertices. The first vertex is not repeated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ring {
    pub vertices: Vec<Vertex>,
}

impl Ring {
    /// Twice the signed area. Positive for counter-clockwise rings.
    pub fn signed_area2(&self) -> i64 {
        let n = self.vertices.len();
        (0..n)
            .map(|i| {
                let a = self.vertices[i];
                let b = self.vertices[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum()
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area2() > 0
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = self.vertices.iter().map(|&v| v.into()).collect();
        if let Some(&first) = coords.first() {
            coords.push(first);
        }
        LineString::new(coords)
    }
}

// Turn preference when leaving a vertex: left, straight, right, back.
fn turn_rank(incoming: &Edge, outgoing: &Edge) -> u8 {
    let (dx0, dy0) = (
        (incoming.end.x - incoming.start.x).signum(),
        (incoming.end.y - incoming.start.y).signum(),
    );
    let (dx1, dy1) = (
        (outgoing.end.x - outgoing.start.x).signum(),
        (outgoing.end.y - outgoing.start.y).signum(),
    );
    let cross = dx0 * dy1 - dy0 * dx1;
    let dot = dx0 * dx1 + dy0 * dy1;
    match (cross.signum(), dot.signum()) {
        (1, _) => 0,
        (0, 1) => 1,
        (-1, _) => 2,
        _ => 3,
    }
}

/// Drops vertices lying on a straight run between their neighbours.
fn simplify(vertices: Vec<Vertex>) -> Vec<Vertex> {
    let n = vertices.len();
    if n < 4 {
        return vertices;
    }
    (0..n)
        .filter(|&i| {
            let prev = vertices[(i + n - 1) % n];
            let cur = vertices[i];
            let next = vertices[(i + 1) % n];
            (cur.x - prev.x) * (next.y - cur.y) - (cur.y - prev.y) * (next.x - cur.x) != 0
        })
        .map(|i| vertices[i])
        .collect()
}

/// Chains directed edges into closed rings.
///
/// At a vertex with several unused outgoing edges the walk takes the sharpest
/// left turn, so shapes touching at a single corner come out as separate rings.
pub fn trace_rings(edges: &[Edge]) -> Result<Vec<Ring>> {
    let mut outgoing: HashMap<Vertex, Vec<usize>> = HashMap::new();
    for (i, e) in edges.iter().enumerate() {
        outgoing.entry(e.start).or_default().push(i);
    }

    let mut visited = vec![false; edges.len()];
    let mut rings = Vec::new();

    for start in 0..edges.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut chain = vec![edges[start].start];
        let mut current = start;

        loop {
            let here = edges[current].end;
            let candidates = outgoing.get(&here).map(Vec::as_slice).unwrap_or(&[]);
            let next = candidates
                .iter()
                .copied()
                .filter(|&i| !visited[i] || i == start)
                .min_by_key(|&i| turn_rank(&edges[current], &edges[i]));

            match next {
                Some(i) if i == start => break,
                Some(i) => {
                    visited[i] = true;
                    chain.push(here);
                    current = i;
                }
                None => {
                    return Err(PerimeterError::InvariantViolation(format!(
                        "boundary does not close at ({}, {})",
                        here.x, here.y
                    )));
                }
            }
        }

        rings.push(Ring {
            vertices: simplify(chain),
        });
    }

    Ok(rings)
}

struct IndexedShell(Polygon<f64>, usize);

impl RTreeObject for IndexedShell {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        match self.0.bounding_rect() {
            Some(bbox) => AABB::from_corners(
                [bbox.min().x, bbox.min().y],
                [bbox.max().x, bbox.max().y],
            ),
            None => AABB::from_point([0.0, 0.0]),
        }
    }
}

/// Groups rings into polygons: counter-clockwise rings are shells, clockwise
/// rings are holes of the smallest shell containing them.
pub fn assemble_polygons(rings: Vec<Ring>) -> MultiPolygon<f64> {
    let (shells, holes): (Vec<Ring>, Vec<Ring>) = rings.into_iter().partition(Ring::is_ccw);

    let shells: Vec<Polygon<f64>> = shells
        .iter()
        .map(|r| Polygon::new(r.to_line_string(), vec![]))
        .collect();
    let tree = RTree::bulk_load(
        shells
            .iter()
            .enumerate()
            .map(|(i, p)| IndexedShell(p.clone(), i))
            .collect(),
    );

    let mut shell_holes: Vec<Vec<LineString<f64>>> = vec![vec![]; shells.len()];
    for hole in holes {
        let hole_poly = Polygon::new(hole.to_line_string(), vec![]);
        let Some(bbox) = hole_poly.bounding_rect() else {
            continue;
        };
        let aabb = AABB::from_corners([bbox.min().x, bbox.min().y], [bbox.max().x, bbox.max().y]);

        let owner = tree
            .locate_in_envelope_intersecting(&aabb)
            .filter(|cand| cand.0.contains(&hole_poly))
            .min_by(|a, b| a.0.unsigned_area().total_cmp(&b.0.unsigned_area()))
            .map(|cand| cand.1);

        match owner {
            Some(idx) => shell_holes[idx].push(hole_poly.exterior().clone()),
            None => log::warn!("dropping hole ring with no enclosing shell"),
        }
    }

    MultiPolygon::new(
        shells
            .into_iter()
            .zip(shell_holes)
            .map(|(shell, holes)| Polygon::new(shell.exterior().clone(), holes))
            .collect(),
    )
}

impl Perimeter {
    /// Ordered rings of the raw (not offset) boundary.
    pub fn rings(&self) -> Result<Vec<Ring>> {
        let edges: Vec<Edge> = self.boundary.sorted().iter().map(|b| b.edge).collect();
        trace_rings(&edges)
    }

    /// The merged group as polygons with holes.
    pub fn outline(&self) -> Result<MultiPolygon<f64>> {
        Ok(assemble_polygons(self.rings()?))
    }
}
