use std::fmt;

/// An integer tile coordinate on a map grid.
///
/// `x` grows to the right, `y` grows downward. Linear indexes are row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPos {
    pub x: u32,
    pub y: u32,
}

/// Offsets for the 4-connected neighbourhood, in the order neighbours are visited
/// during region growth: up, down, left, right.
const TAXICAB_OFFSETS: [(i64, i64); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

impl GridPos {
    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another tile.
    #[inline]
    pub fn distance(&self, other: GridPos) -> f32 {
        (self.distance_squared(other) as f32).sqrt()
    }

    /// Squared Euclidean distance, exact in integers.
    #[inline]
    pub fn distance_squared(&self, other: GridPos) -> u64 {
        let dx = self.x.abs_diff(other.x) as u64;
        let dy = self.y.abs_diff(other.y) as u64;
        dx * dx + dy * dy
    }

    /// Offset by `(dx, dy)`, returning `None` when the result leaves a
    /// `width` x `height` grid.
    #[inline]
    pub fn checked_offset(&self, dx: i64, dy: i64, width: u32, height: u32) -> Option<GridPos> {
        let x = self.x as i64 + dx;
        let y = self.y as i64 + dy;
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            return None;
        }
        Some(GridPos::new(x as u32, y as u32))
    }

    /// The in-bounds 4-connected neighbours of this tile.
    #[inline]
    pub fn taxicab_neighbors(self, width: u32, height: u32) -> impl Iterator<Item = GridPos> {
        TAXICAB_OFFSETS
            .into_iter()
            .filter_map(move |(dx, dy)| self.checked_offset(dx, dy, width, height))
    }
}

impl From<(u32, u32)> for GridPos {
    fn from((x, y): (u32, u32)) -> Self {
        GridPos::new(x, y)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
