/// Holds the id, region and chokepoint types produced by region analysis
pub mod structs;

/// Holds the single-pass region growth over tiles sorted by clearance
pub mod region_builder;

/// Holds the grouping of frontier tiles into chokepoints
pub mod frontier;

/// Holds the region adjacency graph
pub mod graph;

/// Holds the A* search over chokepoints
pub mod pathfinding;

mod analysis;

pub use analysis::MapAnalysis;
pub use frontier::FrontierClusterer;
pub use graph::RegionGraph;
pub use pathfinding::ChokePathFinder;
pub use region_builder::RegionBuilder;
pub use structs::{ChokePoint, ChokePointId, FrontierTile, Region, RegionId};
