use rayon::prelude::*;

/// A trait to locate one or several query points among a set of areas.
pub trait PointLocator {
    /// Locates one query point.
    ///
    /// Returns the id of the area containing the point, or [`None`] if the point lies outside of
    /// every area or on a boundary.
    fn locate_one(&self, point: &[f64; 2]) -> Option<usize>;

    /// Locates several query points.
    fn locate_many(&self, points: &[[f64; 2]]) -> Vec<Option<usize>> {
        points.iter().map(|point| self.locate_one(point)).collect()
    }

    /// Locates several query points in parallel.
    fn par_locate_many(&self, points: &[[f64; 2]]) -> Vec<Option<usize>>
    where
        Self: Sync,
    {
        points
            .par_iter()
            .map(|point| self.locate_one(point))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Splits the plane at x = 0.
    struct HalfPlanes;

    impl PointLocator for HalfPlanes {
        fn locate_one(&self, point: &[f64; 2]) -> Option<usize> {
            match point[0] {
                x if x < 0. => Some(0),
                x if x > 0. => Some(1),
                _ => None,
            }
        }
    }

    #[test]
    fn provided_methods_agree() {
        let points = [[-1., 0.], [0., 3.], [2., -1.], [f64::NAN, 0.]];
        let expected = vec![Some(0), None, Some(1), None];

        assert_eq!(HalfPlanes.locate_many(&points), expected);
        assert_eq!(HalfPlanes.par_locate_many(&points), expected);
    }
}
