//! Plain 2D value types and the handful of formulas the editor needs for
//! hit-testing and arrowheads. Canvas coordinates grow right and down.

use std::ops::{Add, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f32 {
        (self - other).length()
    }

    /// Z component of the 3D cross product.
    pub fn cross(self, other: Point) -> f32 {
        self.x * other.y - self.y * other.x
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Axis-aligned rectangle stored as top-left corner plus size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(min: Point, size: Size) -> Self {
        Self { min, size }
    }

    pub fn max(self) -> Point {
        Point::new(self.min.x + self.size.width, self.min.y + self.size.height)
    }

    pub fn center(self) -> Point {
        Point::new(
            self.min.x + self.size.width * 0.5,
            self.min.y + self.size.height * 0.5,
        )
    }

    /// Edges count as inside.
    pub fn contains(self, p: Point) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x <= max.x && p.y >= self.min.y && p.y <= max.y
    }

    pub fn corners(self) -> [Point; 4] {
        let max = self.max();
        [
            self.min,
            Point::new(max.x, self.min.y),
            max,
            Point::new(self.min.x, max.y),
        ]
    }
}

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
///
/// Returns `None` when `a` and `b` coincide, since no line is defined.
pub fn distance_to_line(p: Point, a: Point, b: Point) -> Option<f32> {
    let ab = b - a;
    let len = ab.length();
    if len <= f32::EPSILON {
        return None;
    }
    Some(ab.cross(p - a).abs() / len)
}

/// Angle of the direction `from -> to`, in radians.
pub fn line_angle(from: Point, to: Point) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// The two outer points of an open arrowhead whose tip sits at `to`.
///
/// Each barb has length `length` and is rotated `spread` radians away from
/// the shaft on either side.
pub fn arrowhead(from: Point, to: Point, length: f32, spread: f32) -> [Point; 2] {
    let angle = line_angle(from, to);
    let barb = |a: f32| to - Point::new(a.cos(), a.sin()) * length;
    [barb(angle + spread), barb(angle - spread)]
}

/// Diamond inscribed in `rect`: top, right, bottom, left vertices.
pub fn diamond_points(rect: Rect) -> Vec<Point> {
    let c = rect.center();
    let hw = rect.size.width * 0.5;
    let hh = rect.size.height * 0.5;
    vec![
        Point::new(c.x, c.y - hh),
        Point::new(c.x + hw, c.y),
        Point::new(c.x, c.y + hh),
        Point::new(c.x - hw, c.y),
    ]
}

/// Parallelogram inside `rect` whose top edge starts `skew` in from the left
/// and whose bottom edge stops `skew` short of the right.
pub fn parallelogram_points(rect: Rect, skew: f32) -> Vec<Point> {
    let skew = skew.clamp(0.0, rect.size.width);
    let min = rect.min;
    let max = rect.max();
    vec![
        Point::new(min.x + skew, min.y),
        Point::new(max.x, min.y),
        Point::new(max.x - skew, max.y),
        Point::new(min.x, max.y),
    ]
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_distance_to_horizontal_line() {
        let d = distance_to_line(
            Point::new(5.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert_approx_eq!(f32, d.unwrap(), 3.0);
    }

    #[test]
    fn test_distance_measures_infinite_line() {
        // Beyond the end of the segment, still measured against the line.
        let d = distance_to_line(
            Point::new(50.0, 2.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert_approx_eq!(f32, d.unwrap(), 2.0);
    }

    #[test]
    fn test_distance_to_degenerate_line() {
        let a = Point::new(4.0, 4.0);
        assert_eq!(distance_to_line(Point::new(4.0, 4.0), a, a), None);
        assert_eq!(distance_to_line(Point::new(9.0, 1.0), a, a), None);
    }

    #[test]
    fn test_arrowhead_pointing_right() {
        let [a, b] = arrowhead(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            15.0,
            30f32.to_radians(),
        );
        let dx = 15.0 * 30f32.to_radians().cos();
        let dy = 15.0 * 30f32.to_radians().sin();
        assert_approx_eq!(f32, a.x, 100.0 - dx, epsilon = 1e-4);
        assert_approx_eq!(f32, a.y, -dy, epsilon = 1e-4);
        assert_approx_eq!(f32, b.x, 100.0 - dx, epsilon = 1e-4);
        assert_approx_eq!(f32, b.y, dy, epsilon = 1e-4);
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(Point::new(10.0, 10.0), Size::new(20.0, 10.0));
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(30.0, 20.0)));
        assert!(!r.contains(Point::new(30.1, 20.0)));
        assert!(!r.contains(Point::new(9.9, 15.0)));
    }

    #[test]
    fn test_parallelogram_stays_inside_rect() {
        let r = Rect::new(Point::new(0.0, 0.0), Size::new(130.0, 80.0));
        let pts = parallelogram_points(r, 10.0);
        assert_eq!(pts[0], Point::new(10.0, 0.0));
        assert_eq!(pts[1], Point::new(130.0, 0.0));
        assert_eq!(pts[2], Point::new(120.0, 80.0));
        assert_eq!(pts[3], Point::new(0.0, 80.0));
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    proptest! {
        #[test]
        fn distance_is_symmetric_in_line_direction(
            p in point_strategy(),
            a in point_strategy(),
            b in point_strategy(),
        ) {
            prop_assume!(a.distance(b) > 1.0);
            let forward = distance_to_line(p, a, b).unwrap();
            let backward = distance_to_line(p, b, a).unwrap();
            prop_assert!(approx_eq!(f32, forward, backward, epsilon = 0.01));
        }

        #[test]
        fn points_on_the_line_have_zero_distance(
            a in point_strategy(),
            b in point_strategy(),
            t in -2.0f32..3.0,
        ) {
            prop_assume!(a.distance(b) > 1.0);
            let p = a + (b - a) * t;
            let d = distance_to_line(p, a, b).unwrap();
            prop_assert!(d < 0.05, "distance {d} for t = {t}");
        }

        #[test]
        fn arrowhead_barbs_have_fixed_length(
            a in point_strategy(),
            b in point_strategy(),
        ) {
            prop_assume!(a.distance(b) > 1.0);
            for barb in arrowhead(a, b, 15.0, 30f32.to_radians()) {
                prop_assert!(approx_eq!(f32, barb.distance(b), 15.0, epsilon = 0.01));
            }
        }
    }
}
