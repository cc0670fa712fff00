//! Axial hex coordinates and their `"x:y"` key encoding.
//!
//! Map tiles and visibility entries are keyed by the string `"{x}:{y}"`.
//! [`Coord`] serializes to exactly that string so persisted colonies stay
//! interchangeable with other tooling reading the same documents.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A tile position on the hex map, in axial `(x, y)` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Coord {
    /// Axial column.
    pub x: i32,
    /// Axial row.
    pub y: i32,
}

/// A coordinate key that is not of the form `"x:y"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid coordinate key '{0}', expected \"x:y\"")]
pub struct CoordParseError(pub String);

impl Coord {
    /// Create a coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The `"x:y"` key for this coordinate.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Hex distance in axial coordinates.
    ///
    /// # Example
    ///
    /// ```
    /// use colony_core::coords::Coord;
    ///
    /// assert_eq!(Coord::new(0, 0).distance(Coord::new(3, 0)), 3);
    /// assert_eq!(Coord::new(0, 0).distance(Coord::new(2, -2)), 2);
    /// ```
    #[must_use]
    pub fn distance(self, other: Self) -> u32 {
        let dq = (self.x - other.x).unsigned_abs();
        let dr = (self.y - other.y).unsigned_abs();
        let ds = (self.x - other.x + self.y - other.y).unsigned_abs();
        (dq + dr + ds) / 2
    }

    /// Chebyshev (king-move) distance, used for square zones such as the
    /// spawn safe zone.
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    /// The four axial neighbours `(x±1, y)` and `(x, y±1)`.
    #[must_use]
    pub const fn axial_neighbors(self) -> [Self; 4] {
        [
            Self::new(self.x + 1, self.y),
            Self::new(self.x - 1, self.y),
            Self::new(self.x, self.y + 1),
            Self::new(self.x, self.y - 1),
        ]
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.x, self.y)
    }
}

impl FromStr for Coord {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(':')
            .ok_or_else(|| CoordParseError(s.to_string()))?;
        let x = x
            .trim()
            .parse()
            .map_err(|_| CoordParseError(s.to_string()))?;
        let y = y
            .trim()
            .parse()
            .map_err(|_| CoordParseError(s.to_string()))?;
        Ok(Self { x, y })
    }
}

impl From<Coord> for String {
    fn from(coord: Coord) -> Self {
        coord.to_string()
    }
}

impl TryFrom<String> for Coord {
    type Error = CoordParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
