//! Grid cells and compass headings
//!
//! The course lives on the display grid: x grows to the right, y grows
//! downward. Heading 0° points up the screen and headings increase to the
//! left (counter-clockwise as seen on the display).
//!
//! | Heading | Step (dx, dy) |
//! |---------|---------------|
//! | 0° | (0, -1) |
//! | 45° | (-1, -1) |
//! | 90° | (-1, 0) |
//! | 135° | (-1, 1) |
//! | 180° | (0, 1) |
//! | 225° | (1, 1) |
//! | 270° | (1, 0) |
//! | 315° | (1, -1) |

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One display cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell `n` steps along `heading`
    pub fn advance(self, heading: Heading, n: i32) -> Self {
        let (dx, dy) = heading.step();
        Self::new(self.x + dx * n, self.y + dy * n)
    }

    /// Euclidean distance to `other`, rounded to the nearest cell
    pub fn distance_to(self, other: Cell) -> u32 {
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        (dx.hypot(dy) + 0.5) as u32
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

const STEPS: [(i32, i32); 8] = [
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
];

/// Compass heading in 45° increments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Heading(u8);

impl Heading {
    pub const UP: Self = Self(0);

    pub fn from_degrees(degrees: u16) -> Result<Self> {
        if degrees % 45 != 0 || degrees >= 360 {
            return Err(Error::InvalidParameter(format!(
                "heading must be a multiple of 45 below 360, got {}",
                degrees
            )));
        }
        Ok(Self((degrees / 45) as u8))
    }

    pub fn degrees(self) -> u16 {
        u16::from(self.0) * 45
    }

    /// Rotate by `octants` × 45°, positive to the left
    pub fn rotate(self, octants: i8) -> Self {
        Self((i16::from(self.0) + i16::from(octants)).rem_euclid(8) as u8)
    }

    pub fn left(self) -> Self {
        self.rotate(1)
    }

    pub fn right(self) -> Self {
        self.rotate(-1)
    }

    pub fn step(self) -> (i32, i32) {
        STEPS[usize::from(self.0)]
    }

    pub fn is_diagonal(self) -> bool {
        self.0 % 2 == 1
    }
}
