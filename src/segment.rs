use itertools::Itertools;
use log::{debug, warn};
use std::{cmp::Ordering, collections::HashMap, mem};

use crate::area::SiteId;
use crate::error::{Error, Result};
use crate::geometry::{self, Point, Positioning};

/// Index of a [`Segment`] in its registry.
pub type SegmentId = usize;

/// A polygon edge, normalized so that it goes from left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub(crate) va: Point,
    pub(crate) vb: Point,
    pub(crate) left_site: Option<SiteId>,
    pub(crate) right_site: Option<SiteId>,
    pub(crate) degenerate: bool,
    true_va: Point,
    true_vb: Point,
}

impl Segment {
    #[cfg(test)]
    pub(crate) fn new(va: Point, vb: Point, left_site: Option<SiteId>, right_site: Option<SiteId>) -> Self {
        Self {
            va,
            vb,
            left_site,
            right_site,
            degenerate: va.x == vb.x,
            true_va: va,
            true_vb: vb,
        }
    }

    /// Left endpoint, as used by the map (possibly perturbed).
    pub fn va(&self) -> Point {
        self.va
    }

    /// Right endpoint, as used by the map (possibly perturbed).
    pub fn vb(&self) -> Point {
        self.vb
    }

    /// Endpoints as they were given in the input areas.
    pub fn true_endpoints(&self) -> (Point, Point) {
        (self.true_va, self.true_vb)
    }

    /// Site of the region lying above the segment (to the left of `va → vb`).
    pub fn site_above(&self) -> Option<SiteId> {
        self.left_site
    }

    /// Site of the region lying below the segment (to the right of `va → vb`).
    pub fn site_below(&self) -> Option<SiteId> {
        self.right_site
    }

    /// Whether the segment was vertical in the input.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Whether both segments stand for the same input edge, in either orientation.
    pub fn same_edge(&self, other: &Segment) -> bool {
        (self.true_va == other.true_va && self.true_vb == other.true_vb)
            || (self.true_va == other.true_vb && self.true_vb == other.true_va)
    }

    /// Ordinate of the segment's supporting line at abscissa `x`.
    pub fn y_at(&self, x: f64) -> f64 {
        geometry::y_at(self.va, self.vb, x)
    }

    /// Position of `point` with respect to the segment: `Left` is above, `Right` is below.
    pub fn position(&self, point: Point) -> Positioning {
        point.position(self.va, self.vb)
    }

    /// Whether the two segments meet at a single point lying strictly inside both of them.
    ///
    /// Segments touching at an endpoint do not cross.
    pub fn crosses(&self, other: &Segment) -> bool {
        fn straddles(line: &Segment, a: Point, b: Point) -> bool {
            matches!(
                (line.position(a), line.position(b)),
                (Positioning::Left, Positioning::Right) | (Positioning::Right, Positioning::Left)
            )
        }
        straddles(self, other.va, other.vb) && straddles(other, self.va, self.vb)
    }
}

type VertexKey = (u64, u64);

fn vertex_key(p: Point) -> VertexKey {
    // Adding zero folds -0.0 into 0.0
    ((p.x + 0.).to_bits(), (p.y + 0.).to_bits())
}

fn edge_key(a: Point, b: Point) -> (VertexKey, VertexKey) {
    let (ka, kb) = (vertex_key(a), vertex_key(b));
    if ka <= kb {
        (ka, kb)
    } else {
        (kb, ka)
    }
}

/// Registry of the segments of a set of areas.
///
/// Edges shared by two adjacent areas are stored once, with one site on each side. Vertices of
/// vertical edges are moved slightly to the right, and every segment touching such a vertex sees
/// the same displaced position.
#[derive(Debug)]
pub struct SegmentRegistry {
    segments: Vec<Segment>,
    edges: HashMap<(VertexKey, VertexKey), SegmentId>,
    displaced: HashMap<VertexKey, Point>,
    epsilon: f64,
}

impl SegmentRegistry {
    pub fn new(epsilon: f64) -> Self {
        Self {
            segments: Vec::new(),
            edges: HashMap::new(),
            displaced: HashMap::new(),
            epsilon,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub(crate) fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    /// Position of an input vertex in the map, taking displacements into account.
    pub fn placed(&self, vertex: Point) -> Point {
        self.displaced
            .get(&vertex_key(vertex))
            .copied()
            .unwrap_or(vertex)
    }

    fn bump(&self, x: f64) -> f64 {
        // The offset must survive rounding for large coordinates
        x + self.epsilon.max(x.abs() * f64::EPSILON * 4.)
    }

    /// Displaces one endpoint of every vertical edge of `rings`.
    ///
    /// This must run on all the areas before the first call to [`normalize`](Self::normalize), so
    /// that a vertex is never moved after a segment using it has been created.
    pub fn displace_vertical_edges(&mut self, rings: &[Vec<Point>]) {
        let max_rounds = rings.iter().map(Vec::len).sum::<usize>() + 1;
        for round in 0..max_rounds {
            let mut changed = false;
            for ring in rings {
                for (&a, &b) in ring.iter().circular_tuple_windows() {
                    if a == b {
                        continue;
                    }
                    let (pa, pb) = (self.placed(a), self.placed(b));
                    if pa.x == pb.x {
                        let bumped = Point::new(self.bump(pb.x), pb.y);
                        self.displaced.insert(vertex_key(b), bumped);
                        changed = true;
                    }
                }
            }
            if !changed {
                debug!(
                    "{} vertices displaced in {} round(s)",
                    self.displaced.len(),
                    round
                );
                return;
            }
        }
        warn!("vertical edges could not all be displaced");
    }

    /// Turns the boundary of an area into segments.
    ///
    /// Returns the ids of the segments that were not already in the registry. Shared edges are
    /// completed with `polygon_id` on the side the polygon lies on.
    pub fn normalize(&mut self, polygon_id: SiteId, vertices: &[Point]) -> Result<Vec<SegmentId>> {
        let mut fresh = Vec::with_capacity(vertices.len());
        for (&a, &b) in vertices.iter().circular_tuple_windows() {
            if a == b {
                continue;
            }

            let key = edge_key(a, b);
            if let Some(&id) = self.edges.get(&key) {
                let segment = &mut self.segments[id];
                let slot = if segment.true_va == a {
                    &mut segment.left_site
                } else {
                    &mut segment.right_site
                };
                if let Some(other) = slot {
                    return Err(Error::invalid_input(format!(
                        "areas {other} and {polygon_id} overlap along edge {a:?} - {b:?}"
                    )));
                }
                *slot = Some(polygon_id);
                continue;
            }

            let mut va = self.placed(a);
            let mut vb = self.placed(b);
            let degenerate = a.x == b.x || va.x == vb.x;
            if va.x == vb.x {
                vb.x = self.bump(vb.x);
                self.displaced.insert(vertex_key(b), vb);
            }

            let (mut true_va, mut true_vb) = (a, b);
            let (mut left_site, mut right_site) = (Some(polygon_id), None);
            if va.lex_cmp(&vb) == Ordering::Greater {
                mem::swap(&mut va, &mut vb);
                mem::swap(&mut true_va, &mut true_vb);
                mem::swap(&mut left_site, &mut right_site);
            }

            let id = self.segments.len();
            self.segments.push(Segment {
                va,
                vb,
                left_site,
                right_site,
                degenerate,
                true_va,
                true_vb,
            });
            self.edges.insert(key, id);
            fresh.push(id);
        }
        Ok(fresh)
    }
}
