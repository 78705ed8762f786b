use std::collections::{BTreeMap, VecDeque};

use itertools::Itertools;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::position::GridPos;
use crate::tile_grid::by_descending_clearance;

use super::structs::{ChokePoint, ChokePointId, FrontierTile, RegionId};

/// Groups frontier tiles into chokepoints, one per physically separate
/// passage between a pair of regions.
pub struct FrontierClusterer<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> FrontierClusterer<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Cluster every region pair present in `frontier`. Pairs are processed in
    /// ascending canonical order, so chokepoints come out sorted by id.
    pub fn cluster_all(&self, frontier: Vec<FrontierTile>) -> Vec<ChokePoint> {
        let mut by_pair: BTreeMap<(RegionId, RegionId), Vec<(GridPos, f32)>> = BTreeMap::new();
        for tile in frontier {
            by_pair.entry(tile.regions).or_default().push((tile.pos, tile.clearance));
        }

        let chokepoints: Vec<ChokePoint> = by_pair
            .into_iter()
            .flat_map(|(pair, tiles)| self.cluster(pair, tiles))
            .collect();

        debug!(chokepoints = chokepoints.len(), "clustered frontier tiles");
        chokepoints
    }

    /// Cluster the frontier tiles between one pair of regions.
    ///
    /// Tiles are taken widest first. Each joins the first cluster whose front or
    /// back tile lies within `min_cluster_distance`, at whichever end is
    /// nearer; otherwise it starts a new cluster.
    pub fn cluster(&self, (region_a, region_b): (RegionId, RegionId), tiles: Vec<(GridPos, f32)>) -> Vec<ChokePoint> {
        let max_distance = self.config.min_cluster_distance;
        let mut clusters: Vec<VecDeque<(GridPos, f32)>> = Vec::new();

        for tile in tiles.into_iter().sorted_by(|a, b| by_descending_clearance(&a.1, &b.1)) {
            let mut placed = false;
            for cluster in clusters.iter_mut() {
                let (Some(front), Some(back)) = (cluster.front(), cluster.back()) else {
                    continue;
                };
                let dist_front = tile.0.distance(front.0);
                let dist_back = tile.0.distance(back.0);
                if dist_front.min(dist_back) <= max_distance {
                    if dist_front < dist_back {
                        cluster.push_front(tile);
                    } else {
                        cluster.push_back(tile);
                    }
                    placed = true;
                    break;
                }
            }

            if !placed {
                clusters.push(VecDeque::from([tile]));
            }
        }

        clusters
            .into_iter()
            .enumerate()
            .map(|(index, cluster)| {
                let id = ChokePointId::new(region_a, region_b, index as u32);
                ChokePoint::new(id, cluster.into_iter().collect())
            })
            .collect()
    }
}
