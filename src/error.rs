use thiserror::Error;

use crate::position::GridPos;

/// Errors that abort a map analysis. No partial analysis is ever returned.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The analysis parameters are unusable.
    #[error("invalid analysis config: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// The terrain source reported a grid without tiles.
    #[error("map has no tiles ({width}x{height})")]
    EmptyGrid {
        /// Grid width in tiles
        width: u32,
        /// Grid height in tiles
        height: u32,
    },
    /// The terrain source failed while the grid was being loaded.
    #[error("terrain source failed at {pos}")]
    TerrainSource {
        /// The tile being queried
        pos: GridPos,
        /// The collaborator's own error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// Errors from [`AnalysisConfig::validate`](crate::AnalysisConfig::validate).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("min_cluster_distance must be finite and >= 0, got {0}")]
    InvalidClusterDistance(f32),
    #[error("merge_ratio_threshold must be in (0, 1], got {0}")]
    RatioOutOfRange(f32),
    #[error("max_path_iterations must be positive when set")]
    ZeroPathIterations,
}
