use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::position::GridPos;
use crate::spatial_index::SpatialIndex;
use crate::terrain::{PathCostSource, TerrainSource};
use crate::tile_grid::TileGrid;

use super::frontier::FrontierClusterer;
use super::graph::RegionGraph;
use super::pathfinding::ChokePathFinder;
use super::region_builder::RegionBuilder;
use super::structs::{ChokePoint, ChokePointId, Region, RegionId};

/// The finished analysis of one map: every traversable tile assigned to a
/// region, and the chokepoints connecting those regions.
///
/// Read-only once built. Queries can be made from several threads at once.
#[derive(Debug)]
pub struct MapAnalysis {
    grid: TileGrid,
    regions: Vec<Region>,
    graph: RegionGraph,
    region_index: SpatialIndex<RegionId>,
    config: AnalysisConfig,
}

impl MapAnalysis {
    /// Run the whole pipeline over `terrain`.
    pub fn new<S: TerrainSource>(terrain: &S, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;

        let mut grid = TileGrid::from_terrain(terrain)?;
        let (mut regions, frontier) = RegionBuilder::new(config).build(&mut grid);
        let frontier_tiles = frontier.len();
        let chokepoints = FrontierClusterer::new(config).cluster_all(frontier);

        // Frontier tiles belong to the lower region of their pair.
        for chokepoint in &chokepoints {
            let owner = chokepoint.id().region_a();
            for &pos in chokepoint.tiles() {
                grid.set_region(pos, owner);
                regions[owner.index()].insert_member(pos, grid.clearance_at(pos));
            }
        }

        let graph = RegionGraph::new(regions.len(), chokepoints);

        let mut region_index = SpatialIndex::new(grid.width(), grid.height());
        for (pos, tile) in grid.tiles() {
            if let Some(region) = tile.region {
                region_index.insert(pos, region);
            }
        }
        debug!(indexed = region_index.len(), "indexed region tiles");

        info!(
            width = grid.width(),
            height = grid.height(),
            regions = regions.len(),
            chokepoints = graph.all_chokepoints().len(),
            frontier_tiles,
            "map analysis complete"
        );

        Ok(Self {
            grid,
            regions,
            graph,
            region_index,
            config: config.clone(),
        })
    }

    /// The region a tile belongs to. `None` for obstacles and for positions
    /// outside the map.
    #[inline]
    pub fn region_at(&self, pos: GridPos) -> Option<RegionId> {
        self.grid.region_of(pos)
    }

    /// The region of `pos` if it has one, otherwise the region of the nearest
    /// region tile. Works for positions outside the map too.
    pub fn nearest_region(&self, pos: GridPos) -> Option<RegionId> {
        self.region_at(pos)
            .or_else(|| self.region_index.nearest(pos).map(|(_, region, _)| *region))
    }

    /// Chokepoints between two regions, in either argument order.
    ///
    /// Panics if either id is not a region of this map.
    #[inline]
    pub fn chokepoints_between(&self, region_a: RegionId, region_b: RegionId) -> &[ChokePoint] {
        self.graph.adjacency(region_a, region_b)
    }

    /// Shortest sequence of chokepoints from `start` to `goal`, using
    /// `path_cost` for the ground distance between chokepoint mid points.
    ///
    /// `self.grid().path_cost()` gives a breadth-first ground distance over
    /// this map when no better pathing is at hand.
    pub fn shortest_chokepoint_path<P: PathCostSource + ?Sized>(
        &self,
        start: ChokePointId,
        goal: ChokePointId,
        path_cost: &P,
    ) -> Option<Vec<ChokePointId>> {
        ChokePathFinder::new(&self.graph, path_cost)
            .with_max_iterations(self.config.max_path_iterations)
            .shortest_path(start, goal)
    }

    /// All regions, ordered by id.
    #[inline]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    #[inline]
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    #[inline]
    pub fn num_regions(&self) -> usize {
        self.regions.len()
    }

    /// All chokepoints, ordered by id.
    #[inline]
    pub fn chokepoints(&self) -> &[ChokePoint] {
        self.graph.all_chokepoints()
    }

    #[inline]
    pub fn chokepoint(&self, id: ChokePointId) -> Option<&ChokePoint> {
        self.graph.chokepoint(id)
    }

    #[inline]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    #[inline]
    pub fn graph(&self) -> &RegionGraph {
        &self.graph
    }

    #[inline]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
}
