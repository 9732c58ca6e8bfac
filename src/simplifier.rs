//! Coverage-preserving simplification.
//!
//! Polygon rings are cut into edges at the points where neighbouring polygons
//! meet (see [`crate::edges`]). Every edge is simplified once with
//! Visvalingam-Whyatt, so two polygons sharing a boundary get the identical
//! simplified boundary and no gap or overlap can open between them. A
//! simplified edge is kept only if it does not collapse a ring, cross another
//! edge or sweep over another edge's vertex.

use geo::{Coord, Geometry, LineString, Polygon, SimplifyVwIdx};
use tracing::{debug, info};

use crate::config::validate_tolerance;
use crate::edges::CoverageGraph;
use crate::error::{Error, Result};
use crate::segment_index::SegmentIndex;

/// Closed ring with three distinct vertices.
const MIN_RING_LEN: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplifyReport {
    pub rings: usize,
    pub edges: usize,
    pub edges_simplified: usize,
    pub vertices_before: usize,
    pub vertices_after: usize,
}

/// Simplifies the polygonal parts of `geometries` as one coverage.
///
/// Items are `(feature index, geometry)`; the index only appears in errors.
/// `tolerance` is a distance in CRS units; vertices whose effective triangle
/// area is below `tolerance²` are dropped. Points and lines are left alone.
pub fn simplify_coverage<'a, I>(geometries: I, tolerance: f64) -> Result<SimplifyReport>
where
    I: IntoIterator<Item = (usize, &'a mut Geometry<f64>)>,
{
    validate_tolerance(tolerance)?;
    let mut geometries: Vec<(usize, &'a mut Geometry<f64>)> = geometries.into_iter().collect();

    let mut rings = Vec::new();
    let mut raw = Vec::new();
    for (feature, geometry) in &geometries {
        collect_rings(geometry, &mut raw);
        for ring in raw.drain(..) {
            rings.push(clean_ring(ring, *feature)?);
        }
    }

    let mut graph = CoverageGraph::build(&rings);
    let edges_simplified = simplify_edges(&mut graph, tolerance);

    let mut rebuilt = (0..graph.rings.len()).map(|id| LineString::from(graph.ring_coords(id)));
    let mut report = SimplifyReport {
        rings: rings.len(),
        edges: graph.edges.len(),
        edges_simplified,
        vertices_before: rings.iter().map(Vec::len).sum(),
        vertices_after: 0,
    };
    for (_, geometry) in geometries.iter_mut() {
        replace_rings(geometry, &mut rebuilt);
    }
    report.vertices_after = (0..graph.rings.len()).map(|id| graph.ring_len(id)).sum();

    info!(
        rings = report.rings,
        edges = report.edges,
        simplified = report.edges_simplified,
        before = report.vertices_before,
        after = report.vertices_after,
        "coverage simplified"
    );
    Ok(report)
}

fn simplify_edges(graph: &mut CoverageGraph, tolerance: f64) -> usize {
    let area = tolerance * tolerance;
    let mut index = SegmentIndex::new(graph.edges.iter().map(|e| e.coords.as_slice()));
    let mut ring_lens: Vec<usize> = (0..graph.rings.len()).map(|id| graph.ring_len(id)).collect();
    let mut simplified = 0;

    for edge_id in 0..graph.edges.len() {
        let edge = &graph.edges[edge_id];
        let kept = LineString::from(edge.coords.clone()).simplify_vw_idx(&area);
        if kept.len() >= edge.coords.len() {
            continue;
        }
        let removed = edge.coords.len() - kept.len();

        let collapses = edge.rings.iter().any(|ring| {
            let uses = edge.rings.iter().filter(|r| *r == ring).count();
            ring_lens[*ring] < MIN_RING_LEN + removed * uses
        });
        if collapses {
            debug!(edge = edge_id, "kept: simplification would collapse a ring");
            continue;
        }

        let candidate: Vec<Coord<f64>> = kept.iter().map(|&i| edge.coords[i]).collect();
        if !index.accepts(edge_id, &candidate) {
            debug!(edge = edge_id, "kept: simplified edge would intersect");
            continue;
        }
        let sweeps_vertex = kept.windows(2).filter(|w| w[1] > w[0] + 1).any(|w| {
            let mut region: Vec<Coord<f64>> = edge.coords[w[0]..=w[1]].to_vec();
            region.push(edge.coords[w[0]]);
            let region = Polygon::new(LineString::from(region), vec![]);
            !index.region_is_empty(edge_id, &region, &candidate)
        });
        if sweeps_vertex {
            debug!(edge = edge_id, "kept: simplified edge would jump over a vertex");
            continue;
        }

        for ring in &edge.rings {
            ring_lens[*ring] -= removed;
        }
        index.replace(edge_id, &candidate);
        graph.edges[edge_id].coords = candidate;
        simplified += 1;
    }
    simplified
}

fn collect_rings(geometry: &Geometry<f64>, out: &mut Vec<Vec<Coord<f64>>>) {
    match geometry {
        Geometry::Polygon(polygon) => push_polygon(polygon, out),
        Geometry::MultiPolygon(polygons) => {
            for polygon in polygons {
                push_polygon(polygon, out);
            }
        }
        Geometry::GeometryCollection(collection) => {
            for geometry in collection {
                collect_rings(geometry, out);
            }
        }
        _ => {}
    }
}

fn push_polygon(polygon: &Polygon<f64>, out: &mut Vec<Vec<Coord<f64>>>) {
    if polygon.exterior().0.is_empty() {
        return;
    }
    out.push(polygon.exterior().0.clone());
    for hole in polygon.interiors() {
        if !hole.0.is_empty() {
            out.push(hole.0.clone());
        }
    }
}

/// Must visit rings in the same order as `collect_rings`.
fn replace_rings<I>(geometry: &mut Geometry<f64>, rings: &mut I)
where
    I: Iterator<Item = LineString<f64>>,
{
    match geometry {
        Geometry::Polygon(polygon) => replace_polygon(polygon, rings),
        Geometry::MultiPolygon(polygons) => {
            for polygon in polygons.iter_mut() {
                replace_polygon(polygon, rings);
            }
        }
        Geometry::GeometryCollection(collection) => {
            for geometry in collection.iter_mut() {
                replace_rings(geometry, rings);
            }
        }
        _ => {}
    }
}

fn replace_polygon<I>(polygon: &mut Polygon<f64>, rings: &mut I)
where
    I: Iterator<Item = LineString<f64>>,
{
    if polygon.exterior().0.is_empty() {
        return;
    }
    let exterior = rings.next().unwrap_or_else(|| polygon.exterior().clone());
    let interiors = polygon
        .interiors()
        .iter()
        .map(|hole| {
            if hole.0.is_empty() {
                hole.clone()
            } else {
                rings.next().unwrap_or_else(|| hole.clone())
            }
        })
        .collect();
    *polygon = Polygon::new(exterior, interiors);
}

fn clean_ring(mut ring: Vec<Coord<f64>>, feature: usize) -> Result<Vec<Coord<f64>>> {
    if ring.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(Error::Geometry {
            feature,
            reason: "ring has a non-finite coordinate".to_string(),
        });
    }
    ring.dedup();
    if ring.first() != ring.last() {
        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }
    }
    if ring.len() < MIN_RING_LEN {
        return Err(Error::Geometry {
            feature,
            reason: format!("ring has {} distinct vertices, need at least 3", ring.len().saturating_sub(1)),
        });
    }
    Ok(ring)
}
