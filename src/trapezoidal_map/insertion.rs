use std::cmp::Ordering;

use log::trace;
use smallvec::{smallvec, SmallVec};

use crate::error::{Error, Result};
use crate::geometry::{Point, Positioning};
use crate::segment::{Segment, SegmentId};
use crate::trapezoidal_map::dag::{Node, NodeId};
use crate::trapezoidal_map::trap_map::TrapMap;
use crate::trapezoidal_map::trapezoid::{Shape, TrapId, Trapezoid};

/// A trapezoid created by the current insertion, along with its leaf in the DAG.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Fragment {
    trap: TrapId,
    leaf: NodeId,
}

impl TrapMap {
    /// Inserts a segment of the map.
    ///
    /// The segment must not cross any segment inserted before, and it can only touch them at
    /// their endpoints.
    pub(crate) fn insert_segment(&mut self, id: SegmentId) -> Result<()> {
        let segment = self
            .segments
            .get(id)
            .cloned()
            .ok_or_else(|| Error::inconsistency(format!("unknown segment {id}")))?;

        let crossed = self.follow_segment(&segment)?;
        trace!(
            "segment {id} from {:?} to {:?} crosses {} trapezoid(s)",
            segment.va,
            segment.vb,
            crossed.len()
        );

        match crossed.as_slice() {
            [single] => self.split_single(id, &segment, *single),
            _ => self.split_many(id, &segment, &crossed),
        }
    }

    /// Lists the trapezoids crossed by `segment`, from left to right.
    fn follow_segment(&self, segment: &Segment) -> Result<SmallVec<[TrapId; 8]>> {
        let first = self.dag.find_first(segment, &self.segments)?;
        let mut crossed: SmallVec<[TrapId; 8]> = smallvec![first];

        let mut trap = self.store.get(first)?;
        loop {
            self.reject_crossing(segment, trap)?;
            if segment.vb.lex_cmp(&trap.rightp) != Ordering::Greater {
                break;
            }
            let next = match segment.position(trap.rightp) {
                // The wall through rightp is above the segment
                Positioning::Left => trap.lower_right,
                Positioning::Right => trap.upper_right,
                Positioning::On => {
                    return Err(Error::invalid_input(format!(
                        "vertex {:?} lies inside the edge from {:?} to {:?}",
                        trap.rightp, segment.va, segment.vb
                    )))
                }
            };
            let next = next.ok_or_else(|| {
                Error::inconsistency(format!(
                    "{} has no neighbor to continue the segment from {:?} to {:?}",
                    trap.id, segment.va, segment.vb
                ))
            })?;
            crossed.push(next);
            trap = self.store.get(next)?;
        }

        Ok(crossed)
    }

    /// Fails if `segment` leaves `trap` through its top or its bottom.
    fn reject_crossing(&self, segment: &Segment, trap: &Trapezoid) -> Result<()> {
        for side in [trap.top, trap.bottom].into_iter().flatten() {
            let other = &self.segments[side];
            if segment.crosses(other) {
                return Err(Error::invalid_input(format!(
                    "edges {:?} - {:?} and {:?} - {:?} cross",
                    segment.va, segment.vb, other.va, other.vb
                )));
            }
        }
        Ok(())
    }

    fn add_fragment(&mut self, shape: Shape) -> Fragment {
        let trap = self.store.insert(shape);
        let leaf = self.dag.add(Node::Leaf(trap));
        Fragment { trap, leaf }
    }

    /// Splits the only trapezoid containing the segment into 2, 3 or 4 new trapezoids.
    fn split_single(&mut self, id: SegmentId, segment: &Segment, old: TrapId) -> Result<()> {
        let old = self.store.get(old)?.clone();
        let (p, q) = (segment.va, segment.vb);

        let above = self.add_fragment(Shape {
            site: segment.site_above(),
            leftp: p,
            rightp: q,
            bottom: Some(id),
            top: old.top,
        });
        let below = self.add_fragment(Shape {
            site: segment.site_below(),
            leftp: p,
            rightp: q,
            bottom: old.bottom,
            top: Some(id),
        });

        let left = self.split_left_end(&old, p, above, below)?;
        let right = self.split_right_end(&old, q, above, below)?;

        self.replace_leaf(&old, id, left, right, above, below)
    }

    /// Splits the trapezoids crossed by the segment.
    ///
    /// Consecutive fragments on the same side of the segment are merged when they share their
    /// other side.
    fn split_many(&mut self, id: SegmentId, segment: &Segment, crossed: &[TrapId]) -> Result<()> {
        let (p, q) = (segment.va, segment.vb);

        let first = self.store.get(crossed[0])?.clone();
        let mut above = self.add_fragment(Shape {
            site: segment.site_above(),
            leftp: p,
            rightp: first.rightp,
            bottom: Some(id),
            top: first.top,
        });
        let mut below = self.add_fragment(Shape {
            site: segment.site_below(),
            leftp: p,
            rightp: first.rightp,
            bottom: first.bottom,
            top: Some(id),
        });
        self.store.connect_lower(Some(below.trap), first.lower_right)?;
        self.store.connect_upper(Some(above.trap), first.upper_right)?;
        let left = self.split_left_end(&first, p, above, below)?;
        self.replace_leaf(&first, id, left, None, above, below)?;

        let mut previous = first.id;
        for (i, &old) in crossed.iter().enumerate().skip(1) {
            let old = self.store.get(old)?.clone();
            let is_last = i == crossed.len() - 1;
            let rightp = if is_last { q } else { old.rightp };

            let (left_above, left_below) = (above, below);
            below = if self.store.get(left_below.trap)?.bottom == old.bottom {
                self.store.get_mut(left_below.trap)?.rightp = rightp;
                left_below
            } else {
                self.add_fragment(Shape {
                    site: segment.site_below(),
                    leftp: old.leftp,
                    rightp,
                    bottom: old.bottom,
                    top: Some(id),
                })
            };
            above = if self.store.get(left_above.trap)?.top == old.top {
                self.store.get_mut(left_above.trap)?.rightp = rightp;
                left_above
            } else {
                self.add_fragment(Shape {
                    site: segment.site_above(),
                    leftp: old.leftp,
                    rightp,
                    bottom: Some(id),
                    top: old.top,
                })
            };

            if below != left_below {
                self.store
                    .connect_upper(Some(left_below.trap), Some(below.trap))?;
                let lower_left = if old.lower_left == Some(previous) {
                    Some(left_below.trap)
                } else {
                    old.lower_left
                };
                self.store.connect_lower(lower_left, Some(below.trap))?;
            }
            if above != left_above {
                self.store
                    .connect_lower(Some(left_above.trap), Some(above.trap))?;
                let upper_left = if old.upper_left == Some(previous) {
                    Some(left_above.trap)
                } else {
                    old.upper_left
                };
                self.store.connect_upper(upper_left, Some(above.trap))?;
            }

            let right = if is_last {
                self.split_right_end(&old, q, above, below)?
            } else {
                self.store.connect_lower(Some(below.trap), old.lower_right)?;
                self.store.connect_upper(Some(above.trap), old.upper_right)?;
                None
            };

            self.replace_leaf(&old, id, None, right, above, below)?;
            previous = old.id;
        }

        Ok(())
    }

    /// Creates the part of `old` lying left of `p`, if any, and links the left neighbors of `old`
    /// to the new trapezoids.
    fn split_left_end(
        &mut self,
        old: &Trapezoid,
        p: Point,
        above: Fragment,
        below: Fragment,
    ) -> Result<Option<Fragment>> {
        if p == old.leftp {
            self.store.connect_lower(old.lower_left, Some(below.trap))?;
            self.store.connect_upper(old.upper_left, Some(above.trap))?;
            return Ok(None);
        }

        let left = self.add_fragment(Shape {
            site: old.site,
            leftp: old.leftp,
            rightp: p,
            bottom: old.bottom,
            top: old.top,
        });
        self.store.connect_lower(old.lower_left, Some(left.trap))?;
        self.store.connect_upper(old.upper_left, Some(left.trap))?;
        self.store.connect_lower(Some(left.trap), Some(below.trap))?;
        self.store.connect_upper(Some(left.trap), Some(above.trap))?;
        Ok(Some(left))
    }

    /// Creates the part of `old` lying right of `q`, if any, and links the right neighbors of
    /// `old` to the new trapezoids.
    fn split_right_end(
        &mut self,
        old: &Trapezoid,
        q: Point,
        above: Fragment,
        below: Fragment,
    ) -> Result<Option<Fragment>> {
        if q == old.rightp {
            self.store.connect_lower(Some(below.trap), old.lower_right)?;
            self.store.connect_upper(Some(above.trap), old.upper_right)?;
            return Ok(None);
        }

        let right = self.add_fragment(Shape {
            site: old.site,
            leftp: q,
            rightp: old.rightp,
            bottom: old.bottom,
            top: old.top,
        });
        self.store.connect_lower(Some(right.trap), old.lower_right)?;
        self.store.connect_upper(Some(right.trap), old.upper_right)?;
        self.store.connect_lower(Some(below.trap), Some(right.trap))?;
        self.store.connect_upper(Some(above.trap), Some(right.trap))?;
        Ok(Some(right))
    }

    /// Replaces the leaf of `old` with the sub-DAG separating its fragments, and forgets `old`.
    ///
    /// The leaf is rewritten in place so that all of its parents see the new nodes.
    fn replace_leaf(
        &mut self,
        old: &Trapezoid,
        id: SegmentId,
        left: Option<Fragment>,
        right: Option<Fragment>,
        above: Fragment,
        below: Fragment,
    ) -> Result<()> {
        let leaf = self.dag.find_leaf(old, &self.segments)?;
        let (p, q) = (self.segments[id].va, self.segments[id].vb);

        let y = Node::Y {
            segment: id,
            above: above.leaf,
            below: below.leaf,
        };
        let node = match (left, right) {
            (None, None) => y,
            (None, Some(right)) => Node::X {
                at: q,
                left: self.dag.add(y),
                right: right.leaf,
            },
            (Some(left), None) => Node::X {
                at: p,
                left: left.leaf,
                right: self.dag.add(y),
            },
            (Some(left), Some(right)) => {
                let y = self.dag.add(y);
                let q_node = self.dag.add(Node::X {
                    at: q,
                    left: y,
                    right: right.leaf,
                });
                Node::X {
                    at: p,
                    left: left.leaf,
                    right: q_node,
                }
            }
        };

        self.dag.substitute(leaf, old.id, node)?;
        self.store.remove(old.id)?;
        Ok(())
    }
}
