use smallvec::{smallvec, SmallVec};
use std::{cmp::Ordering, collections::VecDeque};

use crate::error::{Error, Result};
use crate::geometry::{Point, Positioning};
use crate::segment::{Segment, SegmentId};
use crate::trapezoidal_map::trapezoid::{TrapId, Trapezoid};

/// Index of a node in the arena.
pub(crate) type NodeId = usize;

/// The root of the DAG always lives at index 0: substitutions rewrite nodes in place.
pub(crate) const ROOT: NodeId = 0;

/// A node of the search structure.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Node {
    /// Vertical split through a segment endpoint.
    X {
        at: Point,
        left: NodeId,
        right: NodeId,
    },
    /// Split by a segment.
    Y {
        segment: SegmentId,
        above: NodeId,
        below: NodeId,
    },
    Leaf(TrapId),
}

impl Node {
    pub(crate) fn children(&self) -> SmallVec<[NodeId; 2]> {
        match *self {
            Node::X { left, right, .. } => smallvec![left, right],
            Node::Y { above, below, .. } => smallvec![above, below],
            Node::Leaf(_) => SmallVec::new(),
        }
    }
}

/// Outcome of a point query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Descent {
    Leaf(TrapId),
    /// The point lies on a segment or on a segment endpoint.
    OnBoundary,
}

/// The search structure of a trapezoidal map.
///
/// A tree won't cut it because some nodes need to have multiple parents: when a segment crosses
/// several trapezoids, the fragment above (or below) it is often shared by the y-nodes that
/// replace each of them.
///
/// The graph is backed by an arena (a simple [`Vec`]) and nodes refer to their children by index.
/// Nodes are never removed: when a trapezoid is split, its leaf is rewritten in place into the
/// root of the small sub-DAG describing the split, so that every parent of the leaf, however it
/// was reached, now leads to the new fragments.
#[derive(Debug)]
pub(crate) struct SearchDag {
    arena: Vec<Node>,
}

impl SearchDag {
    /// Creates a DAG made of a single leaf.
    pub(crate) fn new(root: TrapId) -> Self {
        Self {
            arena: vec![Node::Leaf(root)],
        }
    }

    /// Adds a new node to the DAG and returns its index.
    pub(crate) fn add(&mut self, node: Node) -> NodeId {
        let idx = self.arena.len();
        self.arena.push(node);
        idx
    }

    #[cfg(test)]
    pub(crate) fn get(&self, idx: NodeId) -> Option<&Node> {
        self.arena.get(idx)
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.arena.iter()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }

    /// Rewrites the node at `idx`, which must be the leaf of `trap`.
    pub(crate) fn substitute(&mut self, idx: NodeId, trap: TrapId, node: Node) -> Result<()> {
        match self.arena.get_mut(idx) {
            Some(slot) if *slot == Node::Leaf(trap) => {
                *slot = node;
                Ok(())
            }
            other => Err(Error::inconsistency(format!(
                "node {idx} should be the leaf of {trap}, found {other:?}"
            ))),
        }
    }

    /// Finds the leaf containing `point`.
    pub(crate) fn locate(&self, point: Point, segments: &[Segment]) -> Descent {
        let mut idx = ROOT;
        loop {
            match self.arena[idx] {
                Node::Leaf(trap) => return Descent::Leaf(trap),
                Node::X { at, left, right } => match point.lex_cmp(&at) {
                    Ordering::Less => idx = left,
                    Ordering::Greater => idx = right,
                    Ordering::Equal => return Descent::OnBoundary,
                },
                Node::Y {
                    segment,
                    above,
                    below,
                } => match segments[segment].position(point) {
                    Positioning::Left => idx = above,
                    Positioning::Right => idx = below,
                    Positioning::On => return Descent::OnBoundary,
                },
            }
        }
    }

    /// Finds the trapezoid containing the beginning of a segment that is about to be inserted.
    ///
    /// When the left endpoint lies on a y-node's segment (the segments share that endpoint), the
    /// side is given by the right endpoint.
    pub(crate) fn find_first(&self, new: &Segment, segments: &[Segment]) -> Result<TrapId> {
        let mut idx = ROOT;
        loop {
            match self.arena[idx] {
                Node::Leaf(trap) => return Ok(trap),
                Node::X { at, left, right } => {
                    idx = if new.va.lex_cmp(&at) == Ordering::Less {
                        left
                    } else {
                        right
                    };
                }
                Node::Y {
                    segment,
                    above,
                    below,
                } => {
                    let other = &segments[segment];
                    let side = match other.position(new.va) {
                        Positioning::On if new.va != other.va && new.va != other.vb => {
                            return Err(Error::invalid_input(format!(
                                "vertex {:?} lies inside edge {:?} - {:?}",
                                new.va, other.va, other.vb
                            )));
                        }
                        Positioning::On => other.position(new.vb),
                        side => side,
                    };
                    idx = match side {
                        Positioning::Left => above,
                        Positioning::Right => below,
                        Positioning::On => {
                            return Err(Error::invalid_input(format!(
                                "edges {:?} - {:?} and {:?} - {:?} overlap",
                                new.va, new.vb, other.va, other.vb
                            )));
                        }
                    };
                }
            }
        }
    }

    /// Finds the leaf of a live trapezoid by descending from the root with its geometry.
    pub(crate) fn find_leaf(&self, trap: &Trapezoid, segments: &[Segment]) -> Result<NodeId> {
        let mut idx = ROOT;
        loop {
            match self.arena[idx] {
                Node::Leaf(id) if id == trap.id => return Ok(idx),
                Node::Leaf(id) => {
                    return Err(Error::inconsistency(format!(
                        "descent for {} ended in the leaf of {id}",
                        trap.id
                    )));
                }
                Node::X { at, left, right } => {
                    idx = if trap.leftp.lex_cmp(&at) == Ordering::Less {
                        left
                    } else {
                        right
                    };
                }
                Node::Y {
                    segment,
                    above,
                    below,
                } => {
                    idx = if trap.bottom == Some(segment) {
                        above
                    } else if trap.top == Some(segment) {
                        below
                    } else {
                        let other = &segments[segment];
                        let side = match other.position(trap.leftp) {
                            Positioning::On => other.position(trap.rightp),
                            side => side,
                        };
                        match side {
                            Positioning::Left => above,
                            Positioning::Right => below,
                            Positioning::On => {
                                return Err(Error::inconsistency(format!(
                                    "{} cannot be placed with respect to segment {segment}",
                                    trap.id
                                )));
                            }
                        }
                    };
                }
            }
        }
    }

    /// Leaves reachable from the root, with the length of the shortest path leading to them.
    pub(crate) fn reachable_leaves(&self) -> Vec<(NodeId, TrapId, usize)> {
        let mut seen = vec![false; self.arena.len()];
        let mut queue = VecDeque::from([(ROOT, 0)]);
        seen[ROOT] = true;
        let mut leaves = Vec::new();
        while let Some((idx, depth)) = queue.pop_front() {
            let node = &self.arena[idx];
            if let Node::Leaf(trap) = *node {
                leaves.push((idx, trap, depth));
            }
            for child in node.children() {
                if !seen[child] {
                    seen[child] = true;
                    queue.push_back((child, depth + 1));
                }
            }
        }
        leaves
    }

    /// Length of the longest path from the root to a leaf.
    pub(crate) fn height(&self) -> usize {
        let mut heights: Vec<Option<usize>> = vec![None; self.arena.len()];
        let mut stack = vec![(ROOT, false)];
        while let Some((idx, expanded)) = stack.pop() {
            if heights[idx].is_some() {
                continue;
            }
            let children = self.arena[idx].children();
            if expanded {
                heights[idx] = Some(
                    children
                        .iter()
                        .map(|&child| heights[child].map_or(0, |h| h + 1))
                        .max()
                        .unwrap_or(0),
                );
            } else {
                stack.push((idx, true));
                stack.extend(
                    children
                        .into_iter()
                        .filter(|&child| heights[child].is_none())
                        .map(|child| (child, false)),
                );
            }
        }
        heights[ROOT].unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    // A single horizontal segment splitting the unit square:
    //
    //   X(0, 0.5)
    //   ├── left:  Leaf(T1)
    //   └── right: X(1, 0.5)
    //       ├── left:  Y(0)
    //       │   ├── above: Leaf(T2)
    //       │   └── below: Leaf(T3)
    //       └── right: Leaf(T4)
    fn split_square() -> Result<(SearchDag, Vec<Segment>)> {
        let segments = vec![Segment::new(
            Point::new(0., 0.5),
            Point::new(1., 0.5),
            Some(0),
            None,
        )];
        let mut dag = SearchDag::new(TrapId(0));
        let t1 = dag.add(Node::Leaf(TrapId(1)));
        let t2 = dag.add(Node::Leaf(TrapId(2)));
        let t3 = dag.add(Node::Leaf(TrapId(3)));
        let t4 = dag.add(Node::Leaf(TrapId(4)));
        let y = dag.add(Node::Y {
            segment: 0,
            above: t2,
            below: t3,
        });
        let q = dag.add(Node::X {
            at: Point::new(1., 0.5),
            left: y,
            right: t4,
        });
        dag.substitute(
            ROOT,
            TrapId(0),
            Node::X {
                at: Point::new(0., 0.5),
                left: t1,
                right: q,
            },
        )?;
        Ok((dag, segments))
    }

    #[test]
    fn create_single_leaf() {
        let dag = SearchDag::new(TrapId(0));

        assert_eq!(dag.len(), 1);
        assert_eq!(dag.get(ROOT), Some(&Node::Leaf(TrapId(0))));
        assert_eq!(dag.height(), 0);
        assert_eq!(dag.reachable_leaves(), vec![(ROOT, TrapId(0), 0)]);
    }

    #[test]
    fn substitute_only_the_expected_leaf() {
        let mut dag = SearchDag::new(TrapId(0));

        assert!(dag.substitute(ROOT, TrapId(1), Node::Leaf(TrapId(2))).is_err());
        assert!(dag.substitute(5, TrapId(0), Node::Leaf(TrapId(2))).is_err());
        assert!(dag.substitute(ROOT, TrapId(0), Node::Leaf(TrapId(2))).is_ok());
        assert_eq!(dag.get(ROOT), Some(&Node::Leaf(TrapId(2))));
    }

    #[test]
    fn locate_points() -> Result<()> {
        let (dag, segments) = split_square()?;

        assert_eq!(dag.locate(Point::new(-1., 0.), &segments), Descent::Leaf(TrapId(1)));
        assert_eq!(dag.locate(Point::new(0.5, 0.7), &segments), Descent::Leaf(TrapId(2)));
        assert_eq!(dag.locate(Point::new(0.5, 0.2), &segments), Descent::Leaf(TrapId(3)));
        assert_eq!(dag.locate(Point::new(2., 0.2), &segments), Descent::Leaf(TrapId(4)));
        // Same abscissa as an endpoint, but below it
        assert_eq!(dag.locate(Point::new(0., 0.2), &segments), Descent::Leaf(TrapId(1)));
        assert_eq!(dag.locate(Point::new(0.5, 0.5), &segments), Descent::OnBoundary);
        assert_eq!(dag.locate(Point::new(1., 0.5), &segments), Descent::OnBoundary);

        Ok(())
    }

    #[test]
    fn depths() -> Result<()> {
        let (dag, _) = split_square()?;

        assert_eq!(dag.height(), 3);
        let mut leaves = dag.reachable_leaves();
        leaves.sort_by_key(|&(_, trap, _)| trap);
        let depths: Vec<_> = leaves.iter().map(|&(_, _, depth)| depth).collect();
        assert_eq!(depths, vec![1, 3, 3, 2]);

        Ok(())
    }

    #[test]
    fn find_first_uses_right_endpoint_at_shared_vertex() -> Result<()> {
        let (dag, segments) = split_square()?;
        let up = Segment::new(Point::new(0., 0.5), Point::new(0.5, 1.), Some(0), None);
        let down = Segment::new(Point::new(0., 0.5), Point::new(0.5, 0.), Some(0), None);
        let overlapping = Segment::new(Point::new(0., 0.5), Point::new(0.5, 0.5), None, None);

        assert_eq!(dag.find_first(&up, &segments)?, TrapId(2));
        assert_eq!(dag.find_first(&down, &segments)?, TrapId(3));
        assert!(dag.find_first(&overlapping, &segments).is_err());

        Ok(())
    }
}
