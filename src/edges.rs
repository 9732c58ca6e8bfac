//! Splits the rings of a polygon coverage into edges between nodes.
//!
//! A node is a vertex with anything other than two distinct neighbours over
//! all rings. Between two nodes every vertex has exactly two neighbours, so a
//! boundary shared by two polygons is the same chain of vertices in both rings
//! (possibly reversed) and ends up as a single `Edge`.

use std::collections::{HashMap, HashSet};

use geo::Coord;

/// Bit pattern of a coordinate, with -0.0 folded into 0.0.
pub(crate) type CoordKey = (u64, u64);

pub(crate) fn coord_key(c: Coord<f64>) -> CoordKey {
    let fold = |v: f64| if v == 0.0 { 0.0f64 } else { v };
    (fold(c.x).to_bits(), fold(c.y).to_bits())
}

#[derive(Debug, Clone)]
pub(crate) struct Edge {
    pub coords: Vec<Coord<f64>>,
    /// Rings using this edge, once per use.
    pub rings: Vec<usize>,
}

#[derive(Debug, Clone)]
pub(crate) struct EdgeUse {
    pub edge: usize,
    pub forward: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Ring {
    pub edges: Vec<EdgeUse>,
}

#[derive(Debug, Default)]
pub(crate) struct CoverageGraph {
    pub edges: Vec<Edge>,
    pub rings: Vec<Ring>,
}

impl CoverageGraph {
    /// `rings` must be closed, free of consecutive duplicates and have at
    /// least four coordinates.
    pub fn build(rings: &[Vec<Coord<f64>>]) -> Self {
        let nodes = find_nodes(rings);
        let mut graph = CoverageGraph::default();
        let mut by_key: HashMap<Vec<CoordKey>, usize> = HashMap::new();

        for (ring_id, ring) in rings.iter().enumerate() {
            let mut uses = Vec::new();
            for chain in split_at_nodes(ring, &nodes) {
                let forward: Vec<CoordKey> = chain.iter().map(|c| coord_key(*c)).collect();
                let backward: Vec<CoordKey> = forward.iter().rev().copied().collect();
                let is_forward = forward <= backward;
                let key = if is_forward { forward } else { backward };

                let edge = *by_key.entry(key).or_insert_with(|| {
                    let mut coords = chain.clone();
                    if !is_forward {
                        coords.reverse();
                    }
                    graph.edges.push(Edge { coords, rings: Vec::new() });
                    graph.edges.len() - 1
                });
                graph.edges[edge].rings.push(ring_id);
                uses.push(EdgeUse { edge, forward: is_forward });
            }
            graph.rings.push(Ring { edges: uses });
        }
        graph
    }

    /// Current coordinates of ring `ring_id`, closed.
    pub fn ring_coords(&self, ring_id: usize) -> Vec<Coord<f64>> {
        let mut coords: Vec<Coord<f64>> = Vec::new();
        for edge_use in &self.rings[ring_id].edges {
            let edge = &self.edges[edge_use.edge].coords;
            let chain: Box<dyn Iterator<Item = &Coord<f64>>> = if edge_use.forward {
                Box::new(edge.iter())
            } else {
                Box::new(edge.iter().rev())
            };
            let skip = usize::from(!coords.is_empty());
            coords.extend(chain.skip(skip));
        }
        coords
    }

    /// Coordinate count of ring `ring_id` as `ring_coords` would return it.
    pub fn ring_len(&self, ring_id: usize) -> usize {
        let edges = &self.rings[ring_id].edges;
        edges.iter().map(|u| self.edges[u.edge].coords.len() - 1).sum::<usize>() + 1
    }
}

fn find_nodes(rings: &[Vec<Coord<f64>>]) -> HashSet<CoordKey> {
    let mut neighbours: HashMap<CoordKey, Vec<CoordKey>> = HashMap::new();
    let mut link = |a: CoordKey, b: CoordKey| {
        let list = neighbours.entry(a).or_default();
        if !list.contains(&b) {
            list.push(b);
        }
    };
    for ring in rings {
        for pair in ring.windows(2) {
            let (a, b) = (coord_key(pair[0]), coord_key(pair[1]));
            link(a, b);
            link(b, a);
        }
    }
    neighbours
        .into_iter()
        .filter(|(_, list)| list.len() != 2)
        .map(|(key, _)| key)
        .collect()
}

/// Cuts a closed ring into chains that start and end on nodes. A ring with no
/// node is anchored at its smallest vertex and returned as one closed chain.
fn split_at_nodes(ring: &[Coord<f64>], nodes: &HashSet<CoordKey>) -> Vec<Vec<Coord<f64>>> {
    let open = &ring[..ring.len() - 1];
    let node_positions: Vec<usize> = open
        .iter()
        .enumerate()
        .filter(|(_, c)| nodes.contains(&coord_key(**c)))
        .map(|(i, _)| i)
        .collect();

    let start = match node_positions.first() {
        Some(&first) => first,
        None => smallest_vertex(open),
    };

    let mut rotated: Vec<Coord<f64>> = open[start..].iter().chain(&open[..start]).copied().collect();
    rotated.push(open[start]);

    let mut chains = Vec::new();
    let mut current = vec![rotated[0]];
    for c in &rotated[1..] {
        current.push(*c);
        if nodes.contains(&coord_key(*c)) {
            chains.push(std::mem::replace(&mut current, vec![*c]));
        }
    }
    if current.len() > 1 {
        chains.push(current);
    }
    chains
}

fn smallest_vertex(open: &[Coord<f64>]) -> usize {
    open.iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
