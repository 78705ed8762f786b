use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;

use tracing::debug;

use crate::error::AnalysisError;
use crate::position::GridPos;
use crate::region_analysis::RegionId;
use crate::spatial_index::SpatialIndex;
use crate::terrain::{PathCostSource, Terrain, TerrainSource};
use crate::tile_map::TileMap;

/// Orders clearances widest first.
///
/// This is the one ordering used everywhere tiles are processed by clearance:
/// region growth, region member lists and frontier clustering. Combined with a
/// stable sort over scan order it makes the analysis reproducible.
#[inline]
pub fn by_descending_clearance(a: &f32, b: &f32) -> Ordering {
    b.total_cmp(a)
}

/// Per-tile analysis state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tile {
    pub terrain: Terrain,
    /// Distance to the nearest obstacle, 0 for obstacles.
    pub clearance: f32,
    pub region: Option<RegionId>,
}

/// Dense grid of tiles with their clearance and region assignment.
///
/// Built once per analysis. Clearance and region ids are written by the
/// analysis pipeline and read-only for everyone else.
#[derive(Debug, Clone)]
pub struct TileGrid {
    tiles: TileMap<Tile>,
    obstacles: SpatialIndex<()>,
    traversal_order: Vec<GridPos>,
}

impl TileGrid {
    /// Load every tile from `source` and compute clearances.
    pub fn from_terrain<S: TerrainSource>(source: &S) -> Result<Self, AnalysisError> {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(AnalysisError::EmptyGrid { width, height });
        }

        let mut terrain = TileMap::new(width, height, Terrain::default());
        for pos in terrain.positions().collect::<Vec<_>>() {
            terrain[pos] = source.classify(pos).map_err(|err| AnalysisError::TerrainSource {
                pos,
                source: Box::new(err),
            })?;
        }

        Ok(Self::from_tiles(terrain))
    }

    /// Build from an already classified terrain snapshot and compute clearances.
    pub fn from_tiles(terrain: TileMap<Terrain>) -> Self {
        let (width, height) = (terrain.width(), terrain.height());
        let mut obstacles = SpatialIndex::new(width, height);
        let mut tiles = TileMap::new(width, height, Tile::default());

        // Obstacles are seeded with zero clearance and never searched for.
        for (pos, kind) in terrain.iter() {
            tiles[pos].terrain = *kind;
            if kind.is_obstacle() {
                obstacles.insert(pos, ());
            }
        }

        let mut grid = Self { tiles, obstacles, traversal_order: Vec::new() };
        grid.compute_clearances();
        grid
    }

    fn compute_clearances(&mut self) {
        let walkable: Vec<GridPos> = self
            .tiles
            .iter()
            .filter(|(_, tile)| tile.terrain.is_traversable())
            .map(|(pos, _)| pos)
            .collect();

        #[cfg(feature = "rayon")]
        let clearances: Vec<f32> = {
            use rayon::prelude::*;
            walkable.par_iter().map(|pos| self.nearest_obstacle_distance(*pos)).collect()
        };
        #[cfg(not(feature = "rayon"))]
        let clearances: Vec<f32> = walkable.iter().map(|pos| self.nearest_obstacle_distance(*pos)).collect();

        for (pos, clearance) in walkable.iter().zip(&clearances) {
            self.set_clearance(*pos, *clearance);
        }

        let mut order: Vec<(GridPos, f32)> = walkable.into_iter().zip(clearances).collect();
        order.sort_by(|a, b| by_descending_clearance(&a.1, &b.1));
        self.traversal_order = order.into_iter().map(|(pos, _)| pos).collect();

        debug!(
            walkable = self.traversal_order.len(),
            obstacles = self.obstacles.len(),
            "computed tile clearances"
        );
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.tiles.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.tiles.height()
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        self.tiles.in_bounds(pos)
    }

    /// Positions outside the grid read as [`Terrain::AirOnly`].
    pub fn terrain_at(&self, pos: GridPos) -> Terrain {
        self.tiles.get(pos).map(|tile| tile.terrain).unwrap_or(Terrain::AirOnly)
    }

    #[inline]
    pub fn is_traversable(&self, pos: GridPos) -> bool {
        self.terrain_at(pos).is_traversable()
    }

    pub fn clearance_at(&self, pos: GridPos) -> f32 {
        self.tiles.get(pos).map(|tile| tile.clearance).unwrap_or(0.0)
    }

    pub(crate) fn set_clearance(&mut self, pos: GridPos, clearance: f32) {
        self.tiles[pos].clearance = clearance;
    }

    /// Euclidean distance from `pos` to the nearest obstacle tile. The ring of
    /// tiles just outside the grid counts as obstacles.
    pub fn nearest_obstacle_distance(&self, pos: GridPos) -> f32 {
        let to_boundary = [
            pos.x as i64 + 1,
            pos.y as i64 + 1,
            self.width() as i64 - pos.x as i64,
            self.height() as i64 - pos.y as i64,
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
        .max(0) as f32;

        match self.obstacles.nearest(pos) {
            Some((_, _, dist)) => dist.min(to_boundary),
            None => to_boundary,
        }
    }

    pub fn region_of(&self, pos: GridPos) -> Option<RegionId> {
        self.tiles.get(pos).and_then(|tile| tile.region)
    }

    pub(crate) fn set_region(&mut self, pos: GridPos, region: RegionId) {
        self.tiles[pos].region = Some(region);
    }

    pub fn tile(&self, pos: GridPos) -> Option<&Tile> {
        self.tiles.get(pos)
    }

    /// All tiles in scan order.
    pub fn tiles(&self) -> impl Iterator<Item = (GridPos, &Tile)> + '_ {
        self.tiles.iter()
    }

    /// Traversable tiles sorted widest first, ties in scan order. This is the
    /// order region growth visits tiles in.
    pub fn traversal_order(&self) -> &[GridPos] {
        &self.traversal_order
    }

    /// The 4-connected traversable neighbours of `pos`.
    pub fn walkable_neighbors(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        pos.taxicab_neighbors(self.width(), self.height())
            .filter(move |adj| self.is_traversable(*adj))
    }

    /// A ground distance source walking this grid.
    pub fn path_cost(&self) -> GridPathCost<'_> {
        GridPathCost { grid: self }
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() {
            for x in 0..self.width() {
                let pos = GridPos::new(x, y);
                if x > 0 {
                    write!(f, " ")?;
                }
                match self.region_of(pos) {
                    Some(region) => write!(f, "{:>2}", region.get())?,
                    None if self.is_traversable(pos) => write!(f, " .")?,
                    None => write!(f, " #")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Ground distance by breadth-first search over a [`TileGrid`]'s traversable
/// tiles, one unit per orthogonal step.
#[derive(Debug, Clone, Copy)]
pub struct GridPathCost<'a> {
    grid: &'a TileGrid,
}

impl PathCostSource for GridPathCost<'_> {
    fn ground_distance(&self, from: GridPos, to: GridPos) -> f32 {
        if !self.grid.is_traversable(from) || !self.grid.is_traversable(to) {
            return f32::INFINITY;
        }

        let mut steps: TileMap<Option<u32>> = TileMap::new(self.grid.width(), self.grid.height(), None);
        let mut queue = VecDeque::from([from]);
        steps[from] = Some(0);

        while let Some(xy) = queue.pop_front() {
            let xy_steps = steps[xy].unwrap_or(0);
            if xy == to {
                return xy_steps as f32;
            }
            for adj in self.grid.walkable_neighbors(xy) {
                if steps[adj].is_none() {
                    steps[adj] = Some(xy_steps + 1);
                    queue.push_back(adj);
                }
            }
        }

        f32::INFINITY
    }
}
