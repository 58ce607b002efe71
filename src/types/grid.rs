use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell of the KMA short-term forecast grid (the `nx`/`ny` request parameters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub x: i32,
    pub y: i32,
}

impl GridCoordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Grid cell of the default station (충청남도 천안시서북구 부성동).
pub const DEFAULT_GRID: GridCoordinate = GridCoordinate::new(63, 111);

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
