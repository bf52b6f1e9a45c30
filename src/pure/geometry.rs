//! Geometry primitives
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An x,y coordinate pair.
///
/// Coordinates are signed: desktop scrolling and the off-screen parking
/// of hidden clients both place windows at negative positions relative
/// to the root window.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    /// An absolute x coordinate relative to the root window
    pub x: i32,
    /// An absolute y coordinate relative to the root window
    pub y: i32,
}

impl Point {
    /// Create a new Point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from(raw: (i32, i32)) -> Self {
        let (x, y) = raw;

        Self { x, y }
    }
}

/// An X window / screen position: top left corner + extent
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Rect {
    /// The x-coordinate of the top left corner of this rect
    pub x: i32,
    /// The y-coordinate of the top left corner of this rect
    pub y: i32,
    /// The width of this rect
    pub w: u32,
    /// The height of this rect
    pub h: u32,
}

impl Rect {
    /// Create a new Rect.
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Rect {
        Rect { x, y, w, h }
    }

    /// The x-coordinate one past the right hand edge of this rect.
    pub fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    /// The y-coordinate one past the bottom edge of this rect.
    pub fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    /// The midpoint of this rectangle.
    pub fn midpoint(&self) -> Point {
        Point {
            x: self.x + (self.w / 2) as i32,
            y: self.y + (self.h / 2) as i32,
        }
    }

    /// Check whether this Rect contains `other` as a sub-Rect
    pub fn contains(&self, other: &Rect) -> bool {
        match other {
            Rect { x, .. } if *x < self.x => false,
            Rect { x, w, .. } if (*x + *w as i32) > self.right() => false,
            Rect { y, .. } if *y < self.y => false,
            Rect { y, h, .. } if (*y + *h as i32) > self.bottom() => false,
            _ => true,
        }
    }

    /// Check whether this Rect contains `p`
    pub fn contains_point<P>(&self, p: P) -> bool
    where
        P: Into<Point>,
    {
        let p = p.into();

        (self.x..self.right()).contains(&p.x) && (self.y..self.bottom()).contains(&p.y)
    }

    /// The area of the overlap between this Rect and `other`, in pixels.
    ///
    /// Zero when the two do not intersect. Used to decide which monitor
    /// a rectangle "mostly" lives on.
    pub fn intersection_area(&self, other: &Rect) -> u32 {
        let dx = std::cmp::min(self.right(), other.right()) - std::cmp::max(self.x, other.x);
        let dy = std::cmp::min(self.bottom(), other.bottom()) - std::cmp::max(self.y, other.y);

        (std::cmp::max(0, dx) as u32) * (std::cmp::max(0, dy) as u32)
    }
}

impl From<(Point, (u32, u32))> for Rect {
    fn from((Point { x, y }, (w, h)): (Point, (u32, u32))) -> Self {
        Self { x, y, w, h }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(Rect::new(0, 0, 100, 100), Point::new(50, 50); "simple")]
    #[test_case(Rect::new(-100, -100, 50, 50), Point::new(-75, -75); "negative origin")]
    #[test_case(Rect::new(10, 20, 31, 41), Point::new(25, 40); "odd extent rounds down")]
    #[test]
    fn midpoint(r: Rect, expected: Point) {
        assert_eq!(r.midpoint(), expected);
    }

    #[test]
    fn contains_rect() {
        let r1 = Rect::new(10, 10, 50, 50);
        let r2 = Rect::new(0, 0, 100, 100);

        assert!(r2.contains(&r1));
        assert!(!r1.contains(&r2));
    }

    #[test_case(Point::new(0, 0), false; "outside")]
    #[test_case(Point::new(30, 20), true; "inside")]
    #[test_case(Point::new(10, 20), true; "top left")]
    #[test_case(Point::new(39, 59), true; "bottom right inside")]
    #[test_case(Point::new(40, 60), false; "bottom right corner is exclusive")]
    #[test]
    fn contains_point(p: Point, expected: bool) {
        let r = Rect::new(10, 20, 30, 40);

        assert_eq!(r.contains_point(p), expected);
    }

    #[test_case(Rect::new(0, 0, 100, 100), 2500; "overlapping")]
    #[test_case(Rect::new(50, 50, 50, 50), 2500; "contained")]
    #[test_case(Rect::new(500, 500, 10, 10), 0; "disjoint")]
    #[test_case(Rect::new(-20, -20, 30, 30), 100; "negative origin overlap")]
    #[test]
    fn intersection_area(other: Rect, expected: u32) {
        let r = Rect::new(0, 0, 50, 50);

        assert_eq!(r.intersection_area(&other), expected);
    }
}
