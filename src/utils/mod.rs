use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

pub mod alarm;

/// A point in logical units.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Size in logical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

impl Size {
    pub const fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    pub fn is_landscape(self) -> bool {
        self.w > self.h
    }
}

/// Generator of unique ids, scoped to whoever owns it.
#[derive(Debug)]
pub struct IdCounter {
    value: u64,
}

impl IdCounter {
    pub const fn new() -> Self {
        Self { value: 1 }
    }

    pub fn next(&mut self) -> u64 {
        let id = self.value;
        self.value += 1;
        id
    }

    /// Makes sure ids handed out from now on are greater than `seen`.
    pub fn skip_past(&mut self, seen: u64) {
        self.value = self.value.max(seen.saturating_add(1));
    }
}
