use log::{debug, log_enabled, Level};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::area::{Area, BoundingBox, SiteId};
use crate::error::Result;
use crate::geometry::Point;
use crate::options::{BuildOptions, InsertionOrder};
use crate::segment::SegmentRegistry;
use crate::trapezoidal_map::trap_map::TrapMap;

/// Collects areas and builds their [`TrapMap`].
///
/// Areas are validated as they are added, so that an invalid area is reported before any work is
/// done on the map.
///
/// # Example
///
/// ```
/// use trapmap::{Area, BoundingBox, MapBuilder};
///
/// let bbox = BoundingBox::new(0., 2., 1., 0.);
/// let mut builder = MapBuilder::new(bbox)?;
/// builder
///     .add_area(&Area::new(0, [[0., 0.], [1., 0.], [1., 1.], [0., 1.]]))?
///     .add_area(&Area::new(1, [[1., 0.], [2., 0.], [2., 1.], [1., 1.]]))?;
/// let trap_map = builder.build()?;
///
/// assert_eq!(trap_map.locate([1.5, 0.5].into()).site(), Some(1));
/// # Ok::<(), trapmap::Error>(())
/// ```
#[derive(Debug)]
pub struct MapBuilder {
    bbox: BoundingBox,
    options: BuildOptions,
    sites: Vec<SiteId>,
    rings: Vec<Vec<Point>>,
}

impl MapBuilder {
    pub fn new(bbox: BoundingBox) -> Result<Self> {
        Self::with_options(bbox, BuildOptions::default())
    }

    pub fn with_options(bbox: BoundingBox, options: BuildOptions) -> Result<Self> {
        bbox.validate()?;
        options.validate()?;
        Ok(Self {
            bbox,
            options,
            sites: Vec::new(),
            rings: Vec::new(),
        })
    }

    /// Adds an area to the map.
    ///
    /// Clockwise areas are rejected or reversed depending on [`BuildOptions::winding`].
    pub fn add_area(&mut self, area: &Area) -> Result<&mut Self> {
        let vertices = area.oriented_vertices(&self.bbox, self.options.winding)?;
        self.sites.push(area.id);
        self.rings.push(vertices);
        Ok(self)
    }

    pub fn add_areas<'a, I>(&mut self, areas: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = &'a Area>,
    {
        for area in areas {
            self.add_area(area)?;
        }
        Ok(self)
    }

    /// Builds the trapezoidal map of the areas added so far.
    pub fn build(self) -> Result<TrapMap> {
        let mut registry = SegmentRegistry::new(self.options.degenerate_epsilon);
        registry.displace_vertical_edges(&self.rings);

        let mut order = Vec::with_capacity(self.rings.iter().map(Vec::len).sum());
        for (&site, ring) in self.sites.iter().zip(&self.rings) {
            order.extend(registry.normalize(site, ring)?);
        }
        debug!(
            "{} area(s) turned into {} segment(s)",
            self.rings.len(),
            registry.len()
        );

        if let InsertionOrder::Shuffled { seed } = self.options.insertion_order {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            order.shuffle(&mut rng);
        }

        let mut trap_map = TrapMap::seeded(self.bbox, registry.into_segments());
        for id in order {
            trap_map.insert_segment(id)?;
        }
        trap_map.check_sites()?;

        if log_enabled!(Level::Debug) {
            debug!("trapezoidal map built: {}", trap_map.stats());
        }
        Ok(trap_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::trapezoidal_map::Location;
    use anyhow::Result;

    fn square(id: SiteId, x: f64) -> Area {
        Area::new(id, [[x, 0.], [x + 1., 0.], [x + 1., 1.], [x, 1.]])
    }

    #[test]
    fn build_empty_map() -> Result<()> {
        let trap_map = MapBuilder::new(BoundingBox::new(0., 1., 1., 0.))?.build()?;

        assert_eq!(trap_map.trap_count(), 1);
        assert_eq!(trap_map.locate([0.5, 0.5].into()), Location::Background);

        Ok(())
    }

    #[test]
    fn chain_areas() -> Result<()> {
        let mut builder = MapBuilder::new(BoundingBox::new(0., 3., 1., 0.))?;
        builder
            .add_area(&square(10, 0.))?
            .add_areas(&[square(11, 1.), square(12, 2.)])?;

        let trap_map = builder.build()?;
        trap_map.check()?;

        assert_eq!(trap_map.locate([0.5, 0.5].into()).site(), Some(10));
        assert_eq!(trap_map.locate([1.5, 0.5].into()).site(), Some(11));
        assert_eq!(trap_map.locate([2.5, 0.5].into()).site(), Some(12));

        Ok(())
    }

    #[test]
    fn invalid_builders() {
        assert!(matches!(
            MapBuilder::new(BoundingBox::new(1., 0., 1., 0.)),
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            MapBuilder::with_options(
                BoundingBox::new(0., 1., 1., 0.),
                BuildOptions::default().with_degenerate_epsilon(0.)
            ),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn invalid_area_is_reported_when_added() -> Result<()> {
        let mut builder = MapBuilder::new(BoundingBox::new(0., 1., 1., 0.))?;

        assert!(builder.add_area(&square(0, 5.)).is_err());
        // The builder is still usable
        builder.add_area(&square(0, 0.))?;
        assert_eq!(builder.build()?.locate([0.5, 0.5].into()).site(), Some(0));

        Ok(())
    }

    #[test]
    fn overlapping_areas_are_rejected() -> Result<()> {
        let mut builder = MapBuilder::new(BoundingBox::new(0., 1., 1., 0.))?;
        builder.add_area(&square(0, 0.))?.add_area(&square(1, 0.))?;

        assert!(matches!(builder.build(), Err(Error::InvalidInput { .. })));

        Ok(())
    }

    #[test]
    fn same_seed_gives_same_map() -> Result<()> {
        let areas: Vec<_> = (0..4).map(|i| square(i, i as f64)).collect();
        let bbox = BoundingBox::new(0., 4., 1., 0.);
        let build = |seed| -> Result<TrapMap> {
            let mut builder = MapBuilder::with_options(bbox, BuildOptions::default().shuffled(seed))?;
            builder.add_areas(&areas)?;
            Ok(builder.build()?)
        };

        let (a, b) = (build(5)?, build(5)?);

        assert_eq!(a.stats(), b.stats());
        assert!(a.trapezoids().eq(b.trapezoids()));

        Ok(())
    }
}
