use std::convert::Infallible;
use std::fmt;

use thiserror::Error;

use crate::position::GridPos;
use crate::tile_map::TileMap;

/// Classification of a single map tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Terrain {
    /// Ground units can walk here and structures can be placed.
    Buildable,
    /// Ground units can walk here, nothing can be placed.
    Ground,
    /// Only air units can cross (cliffs, void).
    #[default]
    AirOnly,
    /// Blocks ground movement.
    Obstacle,
    /// Neutral resource such as a mineral field or gas geyser.
    Resource,
    /// Neutral destructible rocks or debris.
    Destructible,
}

impl Terrain {
    /// Whether ground units can stand on this tile.
    #[inline]
    pub fn is_traversable(self) -> bool {
        matches!(self, Terrain::Buildable | Terrain::Ground)
    }

    #[inline]
    pub fn is_obstacle(self) -> bool {
        !self.is_traversable()
    }

    /// The ASCII symbol used by [`TerrainMap::from_ascii`].
    pub fn symbol(self) -> char {
        match self {
            Terrain::Buildable => '.',
            Terrain::Ground => '-',
            Terrain::AirOnly => '~',
            Terrain::Obstacle => '#',
            Terrain::Resource => 'm',
            Terrain::Destructible => 'd',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Terrain> {
        Some(match symbol {
            '.' => Terrain::Buildable,
            '-' => Terrain::Ground,
            '~' => Terrain::AirOnly,
            '#' => Terrain::Obstacle,
            'm' => Terrain::Resource,
            'd' => Terrain::Destructible,
            _ => return None,
        })
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Supplies per-tile attributes of the map being analyzed.
///
/// Errors abort the analysis; no partial result is produced.
pub trait TerrainSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Grid size as `(width, height)`.
    fn dimensions(&self) -> (u32, u32);

    fn is_walkable(&self, pos: GridPos) -> Result<bool, Self::Error>;

    fn is_buildable(&self, pos: GridPos) -> Result<bool, Self::Error>;

    /// Classify a tile. The default only distinguishes what walkability and
    /// buildability can tell apart; sources that detect neutral objects should
    /// override it.
    fn classify(&self, pos: GridPos) -> Result<Terrain, Self::Error> {
        let walkable = self.is_walkable(pos)?;
        let buildable = self.is_buildable(pos)?;
        Ok(match (walkable, buildable) {
            (true, true) => Terrain::Buildable,
            (true, false) => Terrain::Ground,
            (false, true) => Terrain::Obstacle,
            (false, false) => Terrain::AirOnly,
        })
    }
}

/// Ground pathing distance between two tiles.
///
/// Must return `f32::INFINITY` for unreachable pairs rather than failing.
pub trait PathCostSource {
    fn ground_distance(&self, from: GridPos, to: GridPos) -> f32;
}

impl<F> PathCostSource for F where F: Fn(GridPos, GridPos) -> f32 {
    fn ground_distance(&self, from: GridPos, to: GridPos) -> f32 {
        self(from, to)
    }
}

/// An in-memory terrain snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMap {
    tiles: TileMap<Terrain>,
}

impl TerrainMap {
    pub fn new(tiles: TileMap<Terrain>) -> Self {
        Self { tiles }
    }

    /// Parse a map drawn with [`Terrain::symbol`] characters, one row per line.
    ///
    /// Blank leading and trailing lines and surrounding whitespace on each row
    /// are ignored. All rows must have the same length.
    pub fn from_ascii(text: &str) -> Result<Self, TerrainParseError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .skip_while(|row| row.is_empty())
            .collect();
        let rows: Vec<&str> = match rows.iter().rposition(|row| !row.is_empty()) {
            Some(last) => rows[..=last].to_vec(),
            None => Vec::new(),
        };

        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
        let mut values = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let len = row.chars().count();
            if len != width {
                return Err(TerrainParseError::RaggedRow { row: y, expected: width, found: len });
            }
            for (x, symbol) in row.chars().enumerate() {
                let terrain = Terrain::from_symbol(symbol)
                    .ok_or(TerrainParseError::UnknownSymbol { symbol, x, y })?;
                values.push(terrain);
            }
        }

        Ok(Self::new(TileMap::from_vec(width as u32, rows.len() as u32, values)))
    }

    pub fn get(&self, pos: GridPos) -> Option<Terrain> {
        self.tiles.get(pos).copied()
    }

    pub fn set(&mut self, pos: GridPos, terrain: Terrain) {
        self.tiles[pos] = terrain;
    }
}

impl TerrainSource for TerrainMap {
    type Error = Infallible;

    fn dimensions(&self) -> (u32, u32) {
        (self.tiles.width(), self.tiles.height())
    }

    fn is_walkable(&self, pos: GridPos) -> Result<bool, Infallible> {
        Ok(self.get(pos).is_some_and(Terrain::is_traversable))
    }

    fn is_buildable(&self, pos: GridPos) -> Result<bool, Infallible> {
        Ok(self.get(pos) == Some(Terrain::Buildable))
    }

    fn classify(&self, pos: GridPos) -> Result<Terrain, Infallible> {
        Ok(self.get(pos).unwrap_or_default())
    }
}

/// Errors from [`TerrainMap::from_ascii`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TerrainParseError {
    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("unknown terrain symbol {symbol:?} at ({x}, {y})")]
    UnknownSymbol { symbol: char, x: usize, y: usize },
}
