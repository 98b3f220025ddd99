use std::fmt;

use crate::area::SiteId;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::segment::SegmentId;

/// Identifier of a trapezoid, assigned in creation order.
///
/// The trapezoid covering the whole bounding box before any insertion is `TrapId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrapId(pub(crate) usize);

impl TrapId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TrapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// A cell of the trapezoidal map.
///
/// The left and right walls are the vertical lines through `leftp` and `rightp`, and the top and
/// bottom sides are segments (`None` stands for the edge of the bounding box).
///
/// Upper neighbors share the `top` segment with the trapezoid and lower neighbors share its
/// `bottom` segment.
#[derive(Clone, Debug, PartialEq)]
pub struct Trapezoid {
    pub(crate) id: TrapId,
    pub(crate) site: Option<SiteId>,
    pub(crate) leftp: Point,
    pub(crate) rightp: Point,
    pub(crate) top: Option<SegmentId>,
    pub(crate) bottom: Option<SegmentId>,
    pub(crate) upper_left: Option<TrapId>,
    pub(crate) lower_left: Option<TrapId>,
    pub(crate) upper_right: Option<TrapId>,
    pub(crate) lower_right: Option<TrapId>,
}

impl Trapezoid {
    pub fn id(&self) -> TrapId {
        self.id
    }

    /// Site covering the trapezoid, `None` for the background.
    pub fn site(&self) -> Option<SiteId> {
        self.site
    }

    pub fn leftp(&self) -> Point {
        self.leftp
    }

    pub fn rightp(&self) -> Point {
        self.rightp
    }

    pub fn top(&self) -> Option<SegmentId> {
        self.top
    }

    pub fn bottom(&self) -> Option<SegmentId> {
        self.bottom
    }

    /// Neighbors in the order upper left, lower left, upper right, lower right.
    pub fn neighbors(&self) -> [Option<TrapId>; 4] {
        [
            self.upper_left,
            self.lower_left,
            self.upper_right,
            self.lower_right,
        ]
    }
}

/// Geometry of a trapezoid that is yet to be stored.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Shape {
    pub(crate) site: Option<SiteId>,
    pub(crate) leftp: Point,
    pub(crate) rightp: Point,
    pub(crate) bottom: Option<SegmentId>,
    pub(crate) top: Option<SegmentId>,
}

/// The live trapezoids of a map.
///
/// Trapezoids are stored in slots indexed by their id. Superseded trapezoids leave an empty slot
/// behind, so that ids are never reused.
#[derive(Debug, Default)]
pub(crate) struct TrapezoidStore {
    slots: Vec<Option<Trapezoid>>,
    live: usize,
}

impl TrapezoidStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores a new trapezoid without any neighbor and returns its id.
    pub(crate) fn insert(&mut self, shape: Shape) -> TrapId {
        let id = TrapId(self.slots.len());
        self.slots.push(Some(Trapezoid {
            id,
            site: shape.site,
            leftp: shape.leftp,
            rightp: shape.rightp,
            top: shape.top,
            bottom: shape.bottom,
            upper_left: None,
            lower_left: None,
            upper_right: None,
            lower_right: None,
        }));
        self.live += 1;
        id
    }

    pub(crate) fn get(&self, id: TrapId) -> Result<&Trapezoid> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| Error::inconsistency(format!("trapezoid {id} is not live")))
    }

    pub(crate) fn get_mut(&mut self, id: TrapId) -> Result<&mut Trapezoid> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::inconsistency(format!("trapezoid {id} is not live")))
    }

    pub(crate) fn contains(&self, id: TrapId) -> bool {
        matches!(self.slots.get(id.0), Some(Some(_)))
    }

    pub(crate) fn remove(&mut self, id: TrapId) -> Result<Trapezoid> {
        let trap = self
            .slots
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or_else(|| Error::inconsistency(format!("trapezoid {id} removed twice")))?;
        self.live -= 1;
        Ok(trap)
    }

    /// Number of live trapezoids.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Trapezoid> {
        self.slots.iter().flatten()
    }

    /// Links `left` and `right` as lower neighbors (they share their bottom segment).
    pub(crate) fn connect_lower(&mut self, left: Option<TrapId>, right: Option<TrapId>) -> Result<()> {
        if let Some(id) = right {
            self.get_mut(id)?.lower_left = left;
        }
        if let Some(id) = left {
            self.get_mut(id)?.lower_right = right;
        }
        Ok(())
    }

    /// Links `left` and `right` as upper neighbors (they share their top segment).
    pub(crate) fn connect_upper(&mut self, left: Option<TrapId>, right: Option<TrapId>) -> Result<()> {
        if let Some(id) = right {
            self.get_mut(id)?.upper_left = left;
        }
        if let Some(id) = left {
            self.get_mut(id)?.upper_right = right;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn shape(x0: f64, x1: f64) -> Shape {
        Shape {
            site: Some(1),
            leftp: Point::new(x0, 0.),
            rightp: Point::new(x1, 0.),
            bottom: None,
            top: None,
        }
    }

    #[test]
    fn insert_and_remove() -> Result<()> {
        let mut store = TrapezoidStore::new();

        let a = store.insert(shape(0., 1.));
        let b = store.insert(shape(1., 2.));

        assert_eq!((a, b), (TrapId(0), TrapId(1)));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(b)?.leftp(), Point::new(1., 0.));

        let removed = store.remove(a)?;
        assert_eq!(removed.id(), a);
        assert_eq!(store.len(), 1);
        assert!(!store.contains(a));
        assert!(store.get(a).is_err());
        assert!(store.remove(a).is_err());

        // Ids are never reused
        assert_eq!(store.insert(shape(2., 3.)), TrapId(2));

        Ok(())
    }

    #[test]
    fn connections_are_symmetric() -> Result<()> {
        let mut store = TrapezoidStore::new();
        let a = store.insert(shape(0., 1.));
        let b = store.insert(shape(1., 2.));
        let c = store.insert(shape(1., 2.));

        store.connect_upper(Some(a), Some(b))?;
        store.connect_lower(Some(a), Some(c))?;

        assert_eq!(store.get(a)?.neighbors(), [None, None, Some(b), Some(c)]);
        assert_eq!(store.get(b)?.upper_left, Some(a));
        assert_eq!(store.get(c)?.lower_left, Some(a));

        // Disconnecting only touches the given side
        store.connect_upper(None, Some(b))?;
        assert_eq!(store.get(b)?.upper_left, None);
        assert_eq!(store.get(a)?.upper_right, Some(b));

        Ok(())
    }
}
