use std::{collections::HashMap, fmt};

use log::warn;

use crate::area::{Area, BoundingBox, SiteId};
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::options::BuildOptions;
use crate::point_locator::PointLocator;
use crate::segment::Segment;
use crate::trapezoidal_map::builder::MapBuilder;
use crate::trapezoidal_map::dag::{Descent, Node, SearchDag};
use crate::trapezoidal_map::trapezoid::{Shape, TrapId, Trapezoid, TrapezoidStore};

/// Result of a point query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// The point lies inside the area with this id.
    Site(SiteId),
    /// The point is not covered by any area.
    Background,
    /// The point lies exactly on an edge or a vertex.
    OnBoundary,
}

impl Location {
    /// The id of the area containing the point, if any.
    pub fn site(self) -> Option<SiteId> {
        match self {
            Location::Site(site) => Some(site),
            Location::Background | Location::OnBoundary => None,
        }
    }
}

/// Trapezoidal map of a set of adjacent areas.
///
/// This is a planar subdivision of the bounding box obtained by extending vertical walls up and
/// down from every vertex until they hit an edge, coupled with a directed acyclic graph (a.k.a. a
/// DAG) whose nodes can be one of three kinds:
/// - an x-node (associated with a vertex)
/// - a y-node (associated with an edge)
/// - a leaf (associated with a trapezoid)
///
/// The map is built with a *randomized incremental* algorithm: edges are added one at a time, and
/// at each step the current DAG is used to find the trapezoids crossed by the new edge, which are
/// then divided into sub-trapezoids. With the edges in random order (see
/// [`InsertionOrder::Shuffled`](crate::InsertionOrder::Shuffled)) the construction takes
/// *O*(*n* \* log(*n*)) expected time and queries take *O*(log(*n*)) expected time (see
/// [De Berg et al.]).
///
/// A [`TrapMap`] is immutable once built, so it can be queried from several threads at once.
///
/// [De Berg et al.]: https://doi.org/10.1007/978-3-540-77974-2
#[derive(Debug)]
pub struct TrapMap {
    pub(crate) bbox: BoundingBox,
    pub(crate) segments: Vec<Segment>,
    pub(crate) store: TrapezoidStore,
    pub(crate) dag: SearchDag,
}

/// Statistics of a trapezoidal map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapStats {
    pub x_nodes: usize,
    pub y_nodes: usize,
    pub leaves: usize,
    pub trapezoids: usize,
    pub max_depth: usize,
    pub average_depth: f64,
}

impl fmt::Display for MapStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} X node(s), {} Y node(s), {} leaves, {} trapezoid(s), depth max {} average {:.2}",
            self.x_nodes,
            self.y_nodes,
            self.leaves,
            self.trapezoids,
            self.max_depth,
            self.average_depth
        )
    }
}

impl TrapMap {
    /// Builds the trapezoidal map of `areas` with the default [`BuildOptions`].
    pub fn new(areas: &[Area], bbox: BoundingBox) -> Result<Self> {
        Self::with_options(areas, bbox, BuildOptions::default())
    }

    /// Builds the trapezoidal map of `areas`.
    pub fn with_options(areas: &[Area], bbox: BoundingBox, options: BuildOptions) -> Result<Self> {
        let mut builder = MapBuilder::with_options(bbox, options)?;
        builder.add_areas(areas)?;
        builder.build()
    }

    /// Creates a map made of a single background trapezoid slightly wider than `bbox`.
    pub(crate) fn seeded(bbox: BoundingBox, segments: Vec<Segment>) -> Self {
        let mut store = TrapezoidStore::new();
        let root = store.insert(Shape {
            site: None,
            leftp: Point::new(bbox.xl - 1., bbox.ymin()),
            rightp: Point::new(bbox.xr + 2., bbox.ymin()),
            bottom: None,
            top: None,
        });
        Self {
            bbox,
            segments,
            store,
            dag: SearchDag::new(root),
        }
    }

    /// Locates a point.
    pub fn locate(&self, point: Point) -> Location {
        if !point.is_finite() {
            return Location::Background;
        }
        match self.dag.locate(point, &self.segments) {
            Descent::OnBoundary => Location::OnBoundary,
            Descent::Leaf(id) => match self.store.get(id) {
                Ok(trap) => trap.site.map_or(Location::Background, Location::Site),
                Err(err) => {
                    warn!("locating {point:?}: {err}");
                    Location::Background
                }
            },
        }
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// The segments of the map, indexed by [`SegmentId`](crate::SegmentId).
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterates over the live trapezoids.
    pub fn trapezoids(&self) -> impl Iterator<Item = &Trapezoid> {
        self.store.iter()
    }

    pub fn trapezoid(&self, id: TrapId) -> Option<&Trapezoid> {
        self.store.get(id).ok()
    }

    /// Corners of a trapezoid in counterclockwise order, starting from the lower left one.
    ///
    /// Sides lying on the bounding box use its horizontal sides.
    pub fn trapezoid_corners(&self, id: TrapId) -> Option<[Point; 4]> {
        let trap = self.trapezoid(id)?;
        let bottom = |x: f64| match trap.bottom {
            Some(s) => self.segments[s].y_at(x),
            None => self.bbox.ymin(),
        };
        let top = |x: f64| match trap.top {
            Some(s) => self.segments[s].y_at(x),
            None => self.bbox.ymax(),
        };
        let (xl, xr) = (trap.leftp.x, trap.rightp.x);
        Some([
            Point::new(xl, bottom(xl)),
            Point::new(xr, bottom(xr)),
            Point::new(xr, top(xr)),
            Point::new(xl, top(xl)),
        ])
    }

    /// Returns the number of x-nodes in the DAG.
    pub fn x_node_count(&self) -> usize {
        self.dag
            .iter()
            .filter(|&node| matches!(node, Node::X { .. }))
            .count()
    }

    /// Returns the number of y-nodes in the DAG.
    pub fn y_node_count(&self) -> usize {
        self.dag
            .iter()
            .filter(|&node| matches!(node, Node::Y { .. }))
            .count()
    }

    /// Returns the number of live trapezoids.
    pub fn trap_count(&self) -> usize {
        self.store.len()
    }

    /// Computes some statistics of the map.
    ///
    /// The depths are measured along the shortest path leading to each leaf for the average, and
    /// along the longest path of the DAG for the maximum.
    pub fn stats(&self) -> MapStats {
        let leaves = self.dag.reachable_leaves();
        let total: usize = leaves.iter().map(|&(_, _, depth)| depth).sum();
        MapStats {
            x_nodes: self.x_node_count(),
            y_nodes: self.y_node_count(),
            leaves: leaves.len(),
            trapezoids: self.trap_count(),
            max_depth: self.dag.height(),
            average_depth: total as f64 / leaves.len().max(1) as f64,
        }
    }

    /// Checks the invariants of the map.
    ///
    /// - every live trapezoid is reached through exactly one leaf of the DAG, and every reachable
    ///   leaf refers to a live trapezoid
    /// - neighbor links are symmetric and only refer to live trapezoids
    pub fn check(&self) -> Result<()> {
        let mut leaf_counts: HashMap<TrapId, usize> = HashMap::new();
        for (_, trap, _) in self.dag.reachable_leaves() {
            if !self.store.contains(trap) {
                return Err(Error::inconsistency(format!(
                    "a leaf refers to {trap}, which is not live"
                )));
            }
            *leaf_counts.entry(trap).or_default() += 1;
        }
        if let Some((trap, count)) = leaf_counts.iter().find(|(_, count)| **count != 1) {
            return Err(Error::inconsistency(format!(
                "{trap} is referred to by {count} leaves"
            )));
        }
        if leaf_counts.len() != self.store.len() {
            return Err(Error::inconsistency(format!(
                "{} trapezoids are reachable but {} are live",
                leaf_counts.len(),
                self.store.len()
            )));
        }

        for trap in self.store.iter() {
            for segment in [trap.top, trap.bottom].into_iter().flatten() {
                if segment >= self.segments.len() {
                    return Err(Error::inconsistency(format!(
                        "{} is bounded by unknown segment {segment}",
                        trap.id
                    )));
                }
            }
            let links: [(Option<TrapId>, fn(&Trapezoid) -> Option<TrapId>); 4] = [
                (trap.upper_right, |t: &Trapezoid| t.upper_left),
                (trap.lower_right, |t: &Trapezoid| t.lower_left),
                (trap.upper_left, |t: &Trapezoid| t.upper_right),
                (trap.lower_left, |t: &Trapezoid| t.lower_right),
            ];
            for (neighbor, back) in links {
                let Some(neighbor) = neighbor else {
                    continue;
                };
                let other = self.store.get(neighbor)?;
                if back(other) != Some(trap.id) {
                    return Err(Error::inconsistency(format!(
                        "{} links to {neighbor} but the link is not reciprocated",
                        trap.id
                    )));
                }
            }
        }

        Ok(())
    }
}

impl TrapMap {
    /// Checks that every trapezoid lies in a single area.
    ///
    /// The segment above a trapezoid and the segment below it must agree on the site between
    /// them. They disagree when an area lies inside another one or when two areas overlap.
    pub(crate) fn check_sites(&self) -> Result<()> {
        for trap in self.store.iter() {
            let from_top = trap.top.and_then(|s| self.segments[s].site_below());
            let from_bottom = trap.bottom.and_then(|s| self.segments[s].site_above());
            if from_top != from_bottom || trap.site != from_top {
                return Err(Error::invalid_input(format!(
                    "areas overlap or are nested between {:?} and {:?}: sites {from_top:?} above \
                     and {from_bottom:?} below",
                    trap.leftp, trap.rightp
                )));
            }
        }
        Ok(())
    }
}

impl PointLocator for TrapMap {
    fn locate_one(&self, point: &[f64; 2]) -> Option<usize> {
        self.locate(Point::from(point)).site()
    }
}
