//! Point location in a planar subdivision made of polygonal areas.
//!
//! The areas are simple polygons tagged with a [`SiteId`] that tile (part of) a bounding box, such
//! as the cells of a Voronoi diagram or of a mesh. They are indexed with a [`TrapMap`], the
//! trapezoidal map of their edges, which answers "which area contains this point?" in expected
//! *O*(log(*n*)) time.
//!
//! ```
//! use trapmap::{Area, BoundingBox, Location, Point, TrapMap};
//!
//! let areas = [
//!     Area::new(0, [[0., 0.], [2., 0.], [0., 2.]]),
//!     Area::new(1, [[2., 0.], [2., 2.], [0., 2.]]),
//! ];
//! let trap_map = TrapMap::new(&areas, BoundingBox::new(0., 2., 2., 0.))?;
//!
//! assert_eq!(trap_map.locate(Point::new(0.5, 0.5)), Location::Site(0));
//! assert_eq!(trap_map.locate(Point::new(1.5, 1.5)), Location::Site(1));
//! assert_eq!(trap_map.locate(Point::new(1., 1.)), Location::OnBoundary);
//! assert_eq!(trap_map.locate(Point::new(3., 1.)), Location::Background);
//! # Ok::<(), trapmap::Error>(())
//! ```
//!
//! Areas must be counterclockwise in a y-up frame unless [`Winding::Detect`] is used, and two
//! areas may only touch along whole edges. A vertex lying inside the edge of another area,
//! crossing edges, and overlapping or nested areas are rejected with [`Error::InvalidInput`].
//!
//! Several points can be located at once, possibly in parallel, through the [`PointLocator`]
//! trait.
mod area;
mod error;
mod geometry;
mod options;
mod point_locator;
mod segment;
mod trapezoidal_map;

pub use area::{Area, BoundingBox, SiteId};
pub use error::{Error, Result};
pub use geometry::{Point, Positioning};
pub use options::{BuildOptions, InsertionOrder, Winding};
pub use point_locator::PointLocator;
pub use segment::{Segment, SegmentId, SegmentRegistry};
pub use trapezoidal_map::{Location, MapBuilder, MapStats, TrapId, TrapMap, Trapezoid};

/// Locates a single point among `areas`.
///
/// This builds a [`TrapMap`] for one query, so build the map once with [`TrapMap::new`] when
/// several points need to be located.
pub fn locate(point: Point, areas: &[Area], bbox: BoundingBox) -> Result<Option<SiteId>> {
    let trap_map = TrapMap::new(areas, bbox)?;
    Ok(trap_map.locate(point).site())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn locate_single_point() -> Result<()> {
        let areas = [Area::new(4, [[0., 0.], [1., 0.], [1., 1.], [0., 1.]])];
        let bbox = BoundingBox::new(0., 1., 1., 0.);

        assert_eq!(locate(Point::new(0.5, 0.5), &areas, bbox)?, Some(4));
        assert_eq!(locate(Point::new(1.5, 0.5), &areas, bbox)?, None);
        assert!(locate(Point::new(0.5, 0.5), &areas, BoundingBox::new(0., 0.5, 1., 0.)).is_err());

        Ok(())
    }
}
