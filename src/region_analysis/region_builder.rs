use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::position::GridPos;
use crate::tile_grid::TileGrid;

use super::structs::{canonical_pair, FrontierTile, Region, RegionId};

/// A region while it is still being grown. Its provisional id is its position
/// in the working list plus one.
#[derive(Debug, Default)]
struct GrowingRegion {
    members: Vec<(GridPos, f32)>,
    largest_clearance: f32,
    mid_point: GridPos,
}

impl GrowingRegion {
    #[inline]
    fn area(&self) -> usize {
        self.members.len()
    }

    fn add_tile(&mut self, pos: GridPos, clearance: f32) {
        if self.largest_clearance < clearance {
            self.largest_clearance = clearance;
            self.mid_point = pos;
        }
        self.members.push((pos, clearance));
    }

    /// `clearance` relative to the widest tile of this region.
    #[inline]
    fn clearance_ratio(&self, clearance: f32) -> f32 {
        if self.largest_clearance > 0.0 {
            clearance / self.largest_clearance
        } else {
            f32::INFINITY
        }
    }
}

/// Grows regions outward from local clearance maxima and collects the tiles
/// left between them.
///
/// Tiles are visited widest first. A tile next to no region seeds a new one, a
/// tile next to one region joins it, and a tile next to two regions either
/// merges them or is set aside as a frontier tile.
pub struct RegionBuilder<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> RegionBuilder<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Partition the traversable tiles of `grid` into regions, stamping each
    /// member tile with its final region id.
    ///
    /// Returns the finalized regions (ids `1..=n` in order) and the frontier
    /// tiles keyed by the canonical pair of regions they separate. Frontier
    /// tiles are left unassigned on the grid.
    pub fn build(&self, grid: &mut TileGrid) -> (Vec<Region>, Vec<FrontierTile>) {
        let mut working: Vec<GrowingRegion> = Vec::new();
        let mut pending_frontier: Vec<(GridPos, f32)> = Vec::new();
        let mut merges = 0usize;

        let order = grid.traversal_order().to_vec();
        for pos in order {
            let clearance = grid.clearance_at(pos);
            match find_neighboring_regions(grid, pos) {
                (None, _) => {
                    working.push(GrowingRegion::default());
                    let id = RegionId::from_index(working.len() - 1);
                    add_tile(grid, &mut working, id, pos, clearance);
                }
                (Some(first), None) => {
                    add_tile(grid, &mut working, first, pos, clearance);
                }
                (Some(first), Some(second)) => {
                    let (mut smaller, mut larger) = (first, second);
                    if working[larger.index()].area() < working[smaller.index()].area() {
                        std::mem::swap(&mut smaller, &mut larger);
                    }

                    if self.should_merge(&working[smaller.index()], &working[larger.index()], clearance) {
                        add_tile(grid, &mut working, larger, pos, clearance);
                        let donor = std::mem::take(&mut working[smaller.index()].members);
                        for (member, member_clearance) in donor {
                            add_tile(grid, &mut working, larger, member, member_clearance);
                        }
                        merges += 1;
                    } else {
                        pending_frontier.push((pos, clearance));
                    }
                }
            }
        }

        let mut regions = compact_regions(grid, working);
        let frontier = resolve_frontier(grid, &mut regions, pending_frontier);

        debug!(
            regions = regions.len(),
            merges,
            frontier_tiles = frontier.len(),
            "grew regions"
        );

        (regions, frontier)
    }

    fn should_merge(&self, smaller: &GrowingRegion, larger: &GrowingRegion, clearance: f32) -> bool {
        let threshold = self.config.merge_ratio_threshold;
        smaller.area() < self.config.min_region_area
            || smaller.clearance_ratio(clearance) >= threshold
            || larger.clearance_ratio(clearance) >= threshold
    }
}

fn add_tile(grid: &mut TileGrid, working: &mut [GrowingRegion], id: RegionId, pos: GridPos, clearance: f32) {
    grid.set_region(pos, id);
    working[id.index()].add_tile(pos, clearance);
}

/// Drop emptied regions, hand out dense final ids in list order and restamp
/// every member tile.
fn compact_regions(grid: &mut TileGrid, working: Vec<GrowingRegion>) -> Vec<Region> {
    let mut regions = Vec::new();
    for growing in working.into_iter().filter(|region| region.area() > 0) {
        let id = RegionId::from_index(regions.len());
        for (pos, _) in &growing.members {
            grid.set_region(*pos, id);
        }
        regions.push(Region::new(id, growing.members, growing.largest_clearance, growing.mid_point));
    }
    regions
}

/// Re-derive each frontier tile's neighbouring regions from the final
/// assignment. Tiles now touching a single region are folded into it.
fn resolve_frontier(
    grid: &mut TileGrid,
    regions: &mut [Region],
    pending: Vec<(GridPos, f32)>,
) -> Vec<FrontierTile> {
    let mut frontier = Vec::with_capacity(pending.len());
    for (pos, clearance) in pending {
        match find_neighboring_regions(grid, pos) {
            (Some(a), Some(b)) => frontier.push(FrontierTile { pos, clearance, regions: canonical_pair(a, b) }),
            (Some(only), None) => {
                grid.set_region(pos, only);
                regions[only.index()].insert_member(pos, clearance);
            }
            (None, _) => {
                warn!(%pos, "frontier tile has no neighbouring region, dropping it");
            }
        }
    }
    frontier
}

/// Up to two distinct regions among the 4-connected neighbours of `pos`.
///
/// The first is the first region seen; the second is the lowest-valued of the
/// other regions seen, which is not necessarily the second one seen.
pub(crate) fn find_neighboring_regions(grid: &TileGrid, pos: GridPos) -> (Option<RegionId>, Option<RegionId>) {
    let mut first: Option<RegionId> = None;
    let mut second: Option<RegionId> = None;

    for adj in grid.walkable_neighbors(pos) {
        let Some(region) = grid.region_of(adj) else {
            continue;
        };
        match first {
            None => first = Some(region),
            Some(seen) if seen != region => {
                if second.map_or(true, |current| region < current) {
                    second = Some(region);
                }
            }
            Some(_) => (),
        }
    }

    (first, second)
}
