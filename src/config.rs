use crate::error::ConfigError;

/// Tuning parameters for a map analysis run.
///
/// The defaults are the values the analysis was calibrated with on ladder maps.
/// They are empirical; maps with unusual scale may need different values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct AnalysisConfig {
    /// Regions with fewer tiles than this are merged into a neighbour as soon
    /// as region growth touches both. `[Units: tiles]`
    pub min_region_area: usize,

    /// Frontier tiles within this distance of either end of an existing
    /// cluster join that cluster; farther tiles start a new chokepoint.
    /// `[Limit: >= 0] [Units: tiles]`
    pub min_cluster_distance: f32,

    /// When a tile touching two regions has a clearance of at least this
    /// fraction of either region's largest clearance, the two regions are
    /// treated as one open space and merged. `[Limit: (0, 1]]`
    pub merge_ratio_threshold: f32,

    /// Upper bound on A* expansions per chokepoint path query. Hitting the cap
    /// reports "no path". `None` means unbounded.
    pub max_path_iterations: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_region_area: 80,
            min_cluster_distance: 17.0,
            merge_ratio_threshold: 0.90,
            max_path_iterations: None,
        }
    }
}

impl AnalysisConfig {
    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_cluster_distance.is_finite() || self.min_cluster_distance < 0.0 {
            return Err(ConfigError::InvalidClusterDistance(self.min_cluster_distance));
        }
        if !(self.merge_ratio_threshold > 0.0 && self.merge_ratio_threshold <= 1.0) {
            return Err(ConfigError::RatioOutOfRange(self.merge_ratio_threshold));
        }
        if self.max_path_iterations == Some(0) {
            return Err(ConfigError::ZeroPathIterations);
        }
        Ok(())
    }
}
