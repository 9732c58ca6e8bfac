//! R-tree over the live segments of all coverage edges.
//!
//! Replacing an edge bumps its generation; segments of older generations stay
//! in the tree but are skipped by every query.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Contains, Coord, Line, Point, Polygon};
use rstar::{RTree, RTreeObject, AABB};

#[derive(Debug, Clone, Copy)]
struct IndexedSegment {
    start: Coord<f64>,
    end: Coord<f64>,
    edge: usize,
    generation: u32,
}

impl RTreeObject for IndexedSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.start.x, self.start.y], [self.end.x, self.end.y])
    }
}

pub(crate) struct SegmentIndex {
    tree: RTree<IndexedSegment>,
    generations: Vec<u32>,
}

impl SegmentIndex {
    pub fn new<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = &'a [Coord<f64>]>,
    {
        let mut segments = Vec::new();
        let mut count = 0;
        for (edge, coords) in edges.into_iter().enumerate() {
            segments.extend(segments_of(coords, edge, 0));
            count = edge + 1;
        }
        SegmentIndex {
            tree: RTree::bulk_load(segments),
            generations: vec![0; count],
        }
    }

    pub fn replace(&mut self, edge: usize, coords: &[Coord<f64>]) {
        self.generations[edge] += 1;
        for segment in segments_of(coords, edge, self.generations[edge]) {
            self.tree.insert(segment);
        }
    }

    fn live_near(&self, envelope: AABB<[f64; 2]>) -> impl Iterator<Item = &IndexedSegment> {
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(move |s| s.generation == self.generations[s.edge])
    }

    /// True when `candidate` would replace `edge` without touching any other
    /// edge except at shared endpoints, and without crossing itself.
    pub fn accepts(&self, edge: usize, candidate: &[Coord<f64>]) -> bool {
        // `edge` holds the segment's position within the candidate here
        let own: Vec<IndexedSegment> = candidate
            .windows(2)
            .enumerate()
            .map(|(position, w)| IndexedSegment { start: w[0], end: w[1], edge: position, generation: 0 })
            .collect();
        let own_tree = RTree::bulk_load(own.clone());

        for (position, segment) in own.iter().enumerate() {
            let a = Line::new(segment.start, segment.end);
            let envelope = segment.envelope();

            let crosses_itself = own_tree
                .locate_in_envelope_intersecting(&envelope)
                .filter(|s| s.edge > position)
                .any(|s| conflicts(&a, &Line::new(s.start, s.end)));
            if crosses_itself {
                return false;
            }
            let crosses_other = self
                .live_near(envelope)
                .filter(|s| s.edge != edge)
                .any(|s| conflicts(&a, &Line::new(s.start, s.end)));
            if crosses_other {
                return false;
            }
        }
        true
    }

    /// False when a vertex of another edge, or one of `kept`, lies strictly
    /// inside `region`.
    pub fn region_is_empty(&self, edge: usize, region: &Polygon<f64>, kept: &[Coord<f64>]) -> bool {
        let Some(envelope) = envelope_of(region.exterior().0.iter()) else {
            return true;
        };
        let inside = |c: Coord<f64>| region.contains(&Point::from(c));

        if kept.iter().any(|c| inside(*c)) {
            return false;
        }
        !self
            .live_near(envelope)
            .filter(|s| s.edge != edge)
            .any(|s| inside(s.start) || inside(s.end))
    }
}

fn segments_of(coords: &[Coord<f64>], edge: usize, generation: u32) -> Vec<IndexedSegment> {
    coords
        .windows(2)
        .map(|w| IndexedSegment { start: w[0], end: w[1], edge, generation })
        .collect()
}

fn envelope_of<'a>(coords: impl Iterator<Item = &'a Coord<f64>>) -> Option<AABB<[f64; 2]>> {
    let points: Vec<[f64; 2]> = coords.map(|c| [c.x, c.y]).collect();
    if points.is_empty() {
        None
    } else {
        Some(AABB::from_points(&points))
    }
}

/// Segments may meet at a common endpoint; any other contact is a conflict.
fn conflicts(a: &Line<f64>, b: &Line<f64>) -> bool {
    let share_endpoint = a.start == b.start || a.start == b.end || a.end == b.start || a.end == b.end;
    match line_intersection(*a, *b) {
        None => false,
        Some(LineIntersection::Collinear { intersection }) => intersection.start != intersection.end,
        Some(LineIntersection::SinglePoint { .. }) => !share_endpoint,
    }
}
