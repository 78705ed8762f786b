use std::fmt;
use std::num::NonZeroU32;

use crate::position::GridPos;
use crate::tile_grid::by_descending_clearance;

/// Identifies a finalized region. Ids are dense and start at 1.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionId(NonZeroU32);

impl RegionId {
    /// `None` for 0, which is reserved for "unassigned".
    #[inline]
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(RegionId)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Zero-based position of this region in dense per-region storage.
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0.get() as usize - 1
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        u32::try_from(index + 1)
            .ok()
            .and_then(NonZeroU32::new)
            .map(RegionId)
            .expect("region count exceeds u32")
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A connected area of the map grown from a local clearance maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    id: RegionId,
    // Sorted by descending clearance, ties in insertion order.
    members: Vec<(GridPos, f32)>,
    largest_clearance: f32,
    mid_point: GridPos,
}

impl Region {
    /// Finalize a region from its members in insertion order. The mid point is
    /// the first member with the largest clearance.
    pub(crate) fn new(id: RegionId, mut members: Vec<(GridPos, f32)>, largest_clearance: f32, mid_point: GridPos) -> Self {
        members.sort_by(|a, b| by_descending_clearance(&a.1, &b.1));
        Self { id, members, largest_clearance, mid_point }
    }

    /// Add a tile after finalization, keeping the member order.
    pub(crate) fn insert_member(&mut self, pos: GridPos, clearance: f32) {
        let at = self
            .members
            .partition_point(|(_, c)| by_descending_clearance(c, &clearance).is_le());
        self.members.insert(at, (pos, clearance));
        if self.largest_clearance < clearance {
            self.largest_clearance = clearance;
            self.mid_point = pos;
        }
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Number of tiles in the region.
    pub fn area(&self) -> usize {
        self.members.len()
    }

    /// Member tiles, widest first.
    pub fn tiles(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.members.iter().map(|(pos, _)| *pos)
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.members.iter().any(|(member, _)| *member == pos)
    }

    pub fn largest_clearance(&self) -> f32 {
        self.largest_clearance
    }

    /// The representative center tile: the widest spot of the region.
    pub fn mid_point(&self) -> GridPos {
        self.mid_point
    }
}

/// Identifies a chokepoint by the canonical pair of regions it separates and
/// its cluster index within that pair. `region_a < region_b` always holds.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ChokePointId {
    region_a: RegionId,
    region_b: RegionId,
    index: u32,
}

impl ChokePointId {
    /// The region arguments may come in either order.
    ///
    /// Panics when both regions are the same.
    pub fn new(region_a: RegionId, region_b: RegionId, index: u32) -> Self {
        assert_ne!(region_a, region_b, "a chokepoint must separate two distinct regions");
        let (region_a, region_b) = canonical_pair(region_a, region_b);
        Self { region_a, region_b, index }
    }

    pub fn region_a(&self) -> RegionId {
        self.region_a
    }

    pub fn region_b(&self) -> RegionId {
        self.region_b
    }

    pub fn regions(&self) -> (RegionId, RegionId) {
        (self.region_a, self.region_b)
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Whether this chokepoint borders `region`.
    pub fn touches(&self, region: RegionId) -> bool {
        self.region_a == region || self.region_b == region
    }
}

impl fmt::Display for ChokePointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}#{}", self.region_a, self.region_b, self.index)
    }
}

/// One physical narrow passage between two adjacent regions.
#[derive(Debug, Clone, PartialEq)]
pub struct ChokePoint {
    id: ChokePointId,
    tiles: Vec<GridPos>,
    mid_point: GridPos,
    mid_clearance: f32,
}

impl ChokePoint {
    /// Build from the cluster's tiles and their clearances, in cluster order.
    ///
    /// Panics on an empty cluster.
    pub fn new(id: ChokePointId, tiles: Vec<(GridPos, f32)>) -> Self {
        assert!(!tiles.is_empty(), "chokepoint {id} has no tiles");
        let (mid_point, mid_clearance) = tiles
            .iter()
            .copied()
            .reduce(|best, next| if next.1 > best.1 { next } else { best })
            .expect("checked non-empty above");
        Self {
            id,
            tiles: tiles.into_iter().map(|(pos, _)| pos).collect(),
            mid_point,
            mid_clearance,
        }
    }

    pub fn id(&self) -> ChokePointId {
        self.id
    }

    pub fn regions(&self) -> (RegionId, RegionId) {
        self.id.regions()
    }

    pub fn tiles(&self) -> &[GridPos] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// The widest tile of the passage.
    pub fn mid_point(&self) -> GridPos {
        self.mid_point
    }

    pub fn mid_clearance(&self) -> f32 {
        self.mid_clearance
    }
}

/// A walkable tile left between two regions by region growth. Consumed by
/// chokepoint clustering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontierTile {
    pub pos: GridPos,
    pub clearance: f32,
    /// Canonical `(lower, higher)` pair of the regions it separates.
    pub regions: (RegionId, RegionId),
}

#[inline]
pub(crate) fn canonical_pair(a: RegionId, b: RegionId) -> (RegionId, RegionId) {
    if a < b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid(value: u32) -> RegionId {
        RegionId::new(value).unwrap()
    }

    #[test]
    fn region_id_zero_is_unassigned() {
        assert_eq!(RegionId::new(0), None);
        assert_eq!(rid(3).get(), 3);
        assert_eq!(rid(3).index(), 2);
        assert_eq!(RegionId::from_index(2), rid(3));
    }

    #[test]
    fn chokepoint_ids_are_canonical() {
        let id = ChokePointId::new(rid(5), rid(2), 1);
        assert_eq!(id.regions(), (rid(2), rid(5)));
        assert_eq!(id, ChokePointId::new(rid(2), rid(5), 1));
        assert!(id.touches(rid(5)));
        assert!(!id.touches(rid(3)));
        assert_eq!(id.to_string(), "2-5#1");
    }

    #[test]
    fn chokepoint_mid_point_is_first_widest_tile() {
        let id = ChokePointId::new(rid(1), rid(2), 0);
        let cp = ChokePoint::new(
            id,
            vec![
                (GridPos::new(0, 0), 1.0),
                (GridPos::new(0, 1), 2.0),
                (GridPos::new(0, 2), 2.0),
                (GridPos::new(0, 3), 1.5),
            ],
        );
        assert_eq!(cp.mid_point(), GridPos::new(0, 1));
        assert_eq!(cp.mid_clearance(), 2.0);
        assert_eq!(cp.len(), 4);
    }

    #[test]
    fn region_members_stay_ordered_by_clearance() {
        let mut region = Region::new(
            rid(1),
            vec![(GridPos::new(0, 0), 1.0), (GridPos::new(1, 0), 3.0), (GridPos::new(2, 0), 2.0)],
            3.0,
            GridPos::new(1, 0),
        );
        region.insert_member(GridPos::new(3, 0), 2.0);
        let tiles: Vec<_> = region.tiles().collect();
        assert_eq!(
            tiles,
            vec![GridPos::new(1, 0), GridPos::new(2, 0), GridPos::new(3, 0), GridPos::new(0, 0)]
        );
        assert_eq!(region.mid_point(), GridPos::new(1, 0));
        assert_eq!(region.area(), 4);
    }
}
