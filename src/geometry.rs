//! 2D geometry value types used throughout the editor.
//!
//! Everything here is plain data with value semantics: positions and sizes
//! are owned `f64` pairs, and rectangles are derived on demand from a node's
//! position and size.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point (or displacement) in logical canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate in logical units.
    pub x: f64,
    /// Vertical coordinate in logical units.
    pub y: f64,
}

impl Point {
    /// Creates a point from its coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this point scaled by a uniform factor.
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Manhattan distance between two points: `|dx| + |dy|`.
    pub fn manhattan_distance(a: Point, b: Point) -> f64 {
        (a.x - b.x).abs() + (a.y - b.y).abs()
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

/// A width/height pair in logical units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in logical units.
    pub width: f64,
    /// Height in logical units.
    pub height: f64,
}

impl Size {
    /// Creates a size from width and height.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle defined by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub pos: Point,
    /// Extent of the rectangle.
    pub size: Size,
}

impl Rect {
    /// Creates a rectangle from a top-left corner and a size.
    pub fn new(pos: Point, size: Size) -> Self {
        Self { pos, size }
    }

    /// Right edge x coordinate.
    pub fn right(&self) -> f64 {
        self.pos.x + self.size.width
    }

    /// Bottom edge y coordinate.
    pub fn bottom(&self) -> f64 {
        self.pos.y + self.size.height
    }

    /// Center of the rectangle.
    pub fn center(&self) -> Point {
        Point::new(
            self.pos.x + self.size.width / 2.0,
            self.pos.y + self.size.height / 2.0,
        )
    }

    /// Whether the rectangle contains the point (edges inclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.pos.x
            && point.x <= self.right()
            && point.y >= self.pos.y
            && point.y <= self.bottom()
    }

    /// The four arrow mount points on the rectangle's boundary.
    ///
    /// Indexed in the fixed order top-mid (0), right-mid (1), bottom-mid (2),
    /// left-mid (3). Even indices face vertically, odd indices horizontally;
    /// arrow routing relies on this parity.
    pub fn mount_points(&self) -> [Point; 4] {
        let center = self.center();
        [
            Point::new(center.x, self.pos.y),
            Point::new(self.right(), center.y),
            Point::new(center.x, self.bottom()),
            Point::new(self.pos.x, center.y),
        ]
    }

    /// Smallest rectangle containing every point in the slice.
    ///
    /// Returns a zero-sized rect at the origin for an empty slice.
    pub fn bounding(points: &[Point]) -> Rect {
        let Some(first) = points.first() else {
            return Rect::default();
        };
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Rect::new(min, Size::new(max.x - min.x, max.y - min.y))
    }
}
