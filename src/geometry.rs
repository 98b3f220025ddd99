use itertools::Itertools;
use std::cmp::Ordering;

/// A point of the 2D plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<&Point> for [f64; 2] {
    fn from(val: &Point) -> Self {
        [val.x, val.y]
    }
}

impl From<Point> for [f64; 2] {
    fn from(val: Point) -> Self {
        (&val).into()
    }
}

impl From<&[f64; 2]> for Point {
    fn from(value: &[f64; 2]) -> Self {
        Self {
            x: value[0],
            y: value[1],
        }
    }
}

impl From<[f64; 2]> for Point {
    fn from(value: [f64; 2]) -> Self {
        Self::from(&value)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Positioning of a [`Point`] with respect to a directed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Positioning {
    Left,
    On,
    Right,
}

/// Cross product `(b - a) × (p - a)`.
///
/// Positive when `p` is to the left of the directed line `a → b` (above it if `a` is to the left
/// of `b` and the y axis points up).
pub(crate) fn cross(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Lexicographic comparison: `x` first, then `y`.
    ///
    /// This is the order in which the walls of the trapezoidal map are swept. Two distinct points
    /// sharing the same `x` still get distinct walls, which amounts to an infinitesimal shear of
    /// the plane.
    pub fn lex_cmp(&self, other: &Point) -> Ordering {
        (self.x, self.y)
            .partial_cmp(&(other.x, other.y))
            .unwrap_or(Ordering::Equal)
    }

    /// Tests if a point is Left|On|Right of an infinite 2D line defined by two points.
    pub fn position<T>(&self, p1: T, p2: T) -> Positioning
    where
        T: Into<Point>,
    {
        match cross(p1.into(), p2.into(), *self).partial_cmp(&0.) {
            Some(Ordering::Greater) => Positioning::Left,
            Some(Ordering::Less) => Positioning::Right,
            _ => Positioning::On,
        }
    }

    /// Computes the winding number for a [`Point`] in a polygon.
    ///
    /// This number can be:
    /// - `0` if the [`Point`] is not inside the polygon
    /// - `> 0` if the polygon winds counterclockwise around the [`Point`]
    /// - `< 0` if the polygon winds clockwise around the [`Point`]
    ///
    /// For more information, see <https://web.archive.org/web/20130126163405/http://geomalgorithms.com/a03-_inclusion.html>.
    pub fn wn<I>(&self, poly: I) -> isize
    where
        I: IntoIterator,
        <I as IntoIterator>::IntoIter: Clone + ExactSizeIterator,
        <I as IntoIterator>::Item: Into<Point> + Clone,
    {
        let mut wn = 0;
        for (a, b) in poly.into_iter().circular_tuple_windows() {
            let a: Point = a.into();
            let b: Point = b.into();
            if a.y <= self.y {
                if b.y > self.y && self.position(a, b) == Positioning::Left {
                    // an upward crossing
                    wn += 1;
                }
            } else if b.y <= self.y && self.position(a, b) == Positioning::Right {
                // a downward crossing
                wn -= 1;
            }
        }
        wn
    }
}

/// Signed area of a polygon (shoelace formula).
///
/// Positive for counterclockwise rings in a y-up frame.
pub fn signed_area<I>(poly: I) -> f64
where
    I: IntoIterator,
    <I as IntoIterator>::IntoIter: Clone + ExactSizeIterator,
    <I as IntoIterator>::Item: Into<Point> + Clone,
{
    poly.into_iter()
        .circular_tuple_windows()
        .map(|(a, b)| {
            let a: Point = a.into();
            let b: Point = b.into();
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        / 2.
}

/// Ordinate of the line through `a` and `b` at abscissa `x`.
///
/// Falls back to the lower endpoint for a vertical line.
pub(crate) fn y_at(a: Point, b: Point, x: f64) -> f64 {
    if a.x == b.x {
        return a.y.min(b.y);
    }
    let t = (x - a.x) / (b.x - a.x);
    a.y + t * (b.y - a.y)
}
