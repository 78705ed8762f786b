#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Splits a 2-D tile map into open regions and the chokepoints between them,
//! and answers region and chokepoint path queries over the result.

mod config;
mod error;
mod position;
mod spatial_index;
mod terrain;
mod tile_grid;
mod tile_map;

pub mod region_analysis;

pub use crate::config::AnalysisConfig;
pub use crate::error::{AnalysisError, ConfigError};
pub use crate::position::GridPos;
pub use crate::region_analysis::{
    ChokePathFinder, ChokePoint, ChokePointId, MapAnalysis, Region, RegionGraph, RegionId,
};
pub use crate::spatial_index::SpatialIndex;
pub use crate::terrain::{PathCostSource, Terrain, TerrainMap, TerrainParseError, TerrainSource};
pub use crate::tile_grid::{by_descending_clearance, GridPathCost, Tile, TileGrid};
pub use crate::tile_map::TileMap;

/// Analyze a map and build its region graph.
pub fn analyze_map<S: TerrainSource>(terrain: &S, config: &AnalysisConfig) -> Result<MapAnalysis, AnalysisError> {
    MapAnalysis::new(terrain, config)
}
