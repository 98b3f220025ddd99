use crate::error::{Error, Result};
use crate::geometry::{signed_area, Point};
use crate::options::Winding;

/// Identifier of a region (an area) of the subdivision.
pub type SiteId = usize;

/// A simple polygon tagged with the identifier of the region it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub id: SiteId,
    pub points: Vec<Point>,
}

impl Area {
    /// Creates an area from its ordered boundary vertices.
    pub fn new<I, P>(id: SiteId, points: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        Self {
            id,
            points: points.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an area from the unordered vertices of a cell that is star-shaped with respect to
    /// `center` (e.g. a Voronoi cell and its site), sorting them counterclockwise around it.
    pub fn ordered_around<I, P>(id: SiteId, center: Point, points: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        let angle = |p: &Point| (p.y - center.y).atan2(p.x - center.x);
        let mut area = Self::new(id, points);
        area.points.sort_by(|a, b| angle(a).total_cmp(&angle(b)));
        area
    }

    /// Signed area of the polygon, positive when it is counterclockwise in a y-up frame.
    pub fn signed_area(&self) -> f64 {
        signed_area(self.points.iter().copied())
    }

    /// Brute force containment test based on the winding number.
    ///
    /// Left and bottom edges are considered inside, right and top edges outside.
    pub fn contains(&self, point: Point) -> bool {
        point.wn(self.points.iter().copied()) != 0
    }

    /// Validates the area and returns its vertices in counterclockwise order, without consecutive
    /// duplicates.
    pub(crate) fn oriented_vertices(&self, bbox: &BoundingBox, winding: Winding) -> Result<Vec<Point>> {
        if let Some(p) = self.points.iter().find(|p| !p.is_finite()) {
            return Err(Error::invalid_input(format!(
                "area {} has a non-finite vertex {p:?}",
                self.id
            )));
        }
        if let Some(p) = self.points.iter().find(|p| !bbox.contains(**p)) {
            return Err(Error::invalid_input(format!(
                "vertex {p:?} of area {} lies outside of {bbox:?}",
                self.id
            )));
        }

        let mut vertices: Vec<Point> = Vec::with_capacity(self.points.len());
        for &p in &self.points {
            if vertices.last() != Some(&p) {
                vertices.push(p);
            }
        }
        while vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(Error::invalid_input(format!(
                "area {} has fewer than 3 distinct vertices",
                self.id
            )));
        }

        let area = signed_area(vertices.iter().copied());
        if area == 0. {
            return Err(Error::invalid_input(format!(
                "area {} has a zero signed area",
                self.id
            )));
        }
        if area < 0. {
            match winding {
                Winding::CounterClockwise => {
                    return Err(Error::invalid_input(format!(
                        "area {} is wound clockwise",
                        self.id
                    )))
                }
                Winding::Detect => vertices.reverse(),
            }
        }

        Ok(vertices)
    }
}

/// Axis-aligned box containing all the areas.
///
/// `yt` and `yb` are the two horizontal sides, in any order, so that both y-up and y-down
/// conventions can be used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xl: f64,
    pub xr: f64,
    pub yt: f64,
    pub yb: f64,
}

impl BoundingBox {
    pub fn new(xl: f64, xr: f64, yt: f64, yb: f64) -> Self {
        Self { xl, xr, yt, yb }
    }

    /// Smallest box containing all the vertices of `areas`, enlarged by `margin` on each side.
    pub fn around(areas: &[Area], margin: f64) -> Option<Self> {
        let mut points = areas.iter().flat_map(|area| area.points.iter());
        let first = points.next()?;
        let mut bbox = Self::new(first.x, first.x, first.y, first.y);
        for p in points {
            bbox.xl = bbox.xl.min(p.x);
            bbox.xr = bbox.xr.max(p.x);
            bbox.yb = bbox.yb.min(p.y);
            bbox.yt = bbox.yt.max(p.y);
        }
        bbox.xl -= margin;
        bbox.xr += margin;
        bbox.yb -= margin;
        bbox.yt += margin;
        Some(bbox)
    }

    pub fn ymin(&self) -> f64 {
        self.yt.min(self.yb)
    }

    pub fn ymax(&self) -> f64 {
        self.yt.max(self.yb)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        (self.xl..=self.xr).contains(&point.x) && (self.ymin()..=self.ymax()).contains(&point.y)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let finite = [self.xl, self.xr, self.yt, self.yb]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.xl >= self.xr || self.yt == self.yb {
            return Err(Error::invalid_input(format!(
                "degenerate bounding box {self:?}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn bbox() -> BoundingBox {
        BoundingBox::new(0., 10., 10., 0.)
    }

    #[test]
    fn counterclockwise_area_is_kept() -> Result<()> {
        let area = Area::new(3, [[1., 1.], [2., 1.], [2., 2.], [1., 2.]]);

        let vertices = area.oriented_vertices(&bbox(), Winding::CounterClockwise)?;

        assert_eq!(vertices, area.points);
        assert_eq!(area.signed_area(), 1.);

        Ok(())
    }

    #[test]
    fn clockwise_area_is_rejected_or_reversed() -> Result<()> {
        let area = Area::new(0, [[1., 1.], [1., 2.], [2., 2.], [2., 1.]]);

        assert!(matches!(
            area.oriented_vertices(&bbox(), Winding::CounterClockwise),
            Err(Error::InvalidInput { .. })
        ));
        let vertices = area.oriented_vertices(&bbox(), Winding::Detect)?;
        assert!(signed_area(vertices) > 0.);

        Ok(())
    }

    #[test]
    fn repeated_vertices_are_dropped() -> Result<()> {
        let area = Area::new(0, [[1., 1.], [2., 1.], [2., 1.], [2., 2.], [1., 1.]]);

        let vertices = area.oriented_vertices(&bbox(), Winding::CounterClockwise)?;

        assert_eq!(vertices.len(), 3);

        Ok(())
    }

    #[test]
    fn invalid_areas() {
        let outside = Area::new(0, [[1., 1.], [12., 1.], [2., 2.]]);
        let flat = Area::new(0, [[1., 1.], [2., 2.], [3., 3.]]);
        let too_few = Area::new(0, [[1., 1.], [2., 2.], [1., 1.]]);
        let nan = Area::new(0, [[1., 1.], [2., f64::NAN], [1., 2.]]);

        for area in [outside, flat, too_few, nan] {
            assert!(matches!(
                area.oriented_vertices(&bbox(), Winding::Detect),
                Err(Error::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn order_vertices_around_center() {
        let area = Area::ordered_around(
            7,
            Point::new(0., 0.),
            [[1., 1.], [-1., -1.], [-1., 1.], [1., -1.]],
        );

        assert!(area.signed_area() > 0.);
        assert!(area.contains(Point::new(0.2, -0.3)));
        assert!(!area.contains(Point::new(2., 0.)));
    }

    #[test]
    fn bounding_box_around_areas() {
        let areas = [
            Area::new(0, [[0., 0.], [1., 0.], [0., 1.]]),
            Area::new(1, [[1., 0.], [3., 2.], [0., 1.]]),
        ];

        let bbox = BoundingBox::around(&areas, 0.5).expect("areas are not empty");

        assert_eq!(bbox, BoundingBox::new(-0.5, 3.5, 2.5, -0.5));
        assert!(bbox.contains(Point::new(3., 2.)));
        assert!(!bbox.contains(Point::new(4., 2.)));
        assert!(BoundingBox::around(&[], 1.).is_none());
    }

    #[test]
    fn degenerate_bounding_boxes() {
        assert!(bbox().validate().is_ok());
        assert!(BoundingBox::new(1., 1., 0., 1.).validate().is_err());
        assert!(BoundingBox::new(0., 1., 1., 1.).validate().is_err());
        assert!(BoundingBox::new(0., f64::INFINITY, 0., 1.).validate().is_err());
    }
}
