use std::ops::Range;
use std::sync::OnceLock;

use super::structs::{ChokePoint, ChokePointId, RegionId};

/// Regions and the chokepoints connecting them.
///
/// Chokepoints are stored once, sorted by id, and indexed two ways: a
/// lower-triangular matrix over region pairs and a per-region list. Region ids
/// handed to the adjacency queries must be in `1..=num_regions`; anything else
/// is a caller bug and panics.
///
/// Immutable after construction and safe to share between threads.
#[derive(Debug)]
pub struct RegionGraph {
    num_regions: usize,
    chokepoints: Vec<ChokePoint>,
    // pair_ranges[b - 1][a - 1] for a < b: slice of `chokepoints` between a and b
    pair_ranges: Vec<Vec<Range<usize>>>,
    by_region: Vec<Vec<usize>>,
    distances: OnceLock<Vec<Vec<f32>>>,
}

impl RegionGraph {
    /// Index `chokepoints` for `num_regions` regions.
    ///
    /// Panics if a chokepoint refers to a region outside `1..=num_regions`.
    pub fn new(num_regions: usize, mut chokepoints: Vec<ChokePoint>) -> Self {
        chokepoints.sort_by_key(ChokePoint::id);

        let mut pair_ranges: Vec<Vec<Range<usize>>> =
            (0..num_regions).map(|b| vec![0..0; b]).collect();
        let mut by_region: Vec<Vec<usize>> = vec![Vec::new(); num_regions];

        for (idx, chokepoint) in chokepoints.iter().enumerate() {
            let (a, b) = chokepoint.regions();
            assert!(
                b.index() < num_regions,
                "chokepoint {} refers to region {b}, but there are only {num_regions} regions",
                chokepoint.id(),
            );

            let range = &mut pair_ranges[b.index()][a.index()];
            if range.start == range.end {
                *range = idx..idx + 1;
            } else {
                range.end = idx + 1;
            }
            by_region[a.index()].push(idx);
            by_region[b.index()].push(idx);
        }

        Self {
            num_regions,
            chokepoints,
            pair_ranges,
            by_region,
            distances: OnceLock::new(),
        }
    }

    #[inline]
    pub fn num_regions(&self) -> usize {
        self.num_regions
    }

    #[inline]
    pub fn is_valid(&self, region: RegionId) -> bool {
        region.index() < self.num_regions
    }

    #[inline]
    fn check(&self, region: RegionId) {
        assert!(
            self.is_valid(region),
            "region {region} is out of range, graph has {} regions",
            self.num_regions
        );
    }

    /// Chokepoints between two regions, in either argument order. Empty when
    /// the regions are not adjacent or are the same region.
    pub fn adjacency(&self, region_a: RegionId, region_b: RegionId) -> &[ChokePoint] {
        self.check(region_a);
        self.check(region_b);
        if region_a == region_b {
            return &[];
        }
        let (a, b) = if region_a < region_b { (region_a, region_b) } else { (region_b, region_a) };
        &self.chokepoints[self.pair_ranges[b.index()][a.index()].clone()]
    }

    /// Every chokepoint touching `region`.
    pub fn chokepoints_of(&self, region: RegionId) -> impl Iterator<Item = &ChokePoint> + '_ {
        self.check(region);
        self.by_region[region.index()].iter().map(move |idx| &self.chokepoints[*idx])
    }

    /// All chokepoints, each once, sorted by id.
    pub fn all_chokepoints(&self) -> &[ChokePoint] {
        &self.chokepoints
    }

    /// Look up a chokepoint. Unknown ids, including ids naming regions this
    /// graph does not have, resolve to `None`.
    pub fn chokepoint(&self, id: ChokePointId) -> Option<&ChokePoint> {
        if !self.is_valid(id.region_b()) {
            return None;
        }
        self.pair_ranges[id.region_b().index()][id.region_a().index()]
            .clone()
            .map(|idx| &self.chokepoints[idx])
            .find(|chokepoint| chokepoint.id() == id)
    }

    /// Regions sharing at least one chokepoint with `region`, ascending.
    pub fn neighbors(&self, region: RegionId) -> Vec<RegionId> {
        let mut neighbors: Vec<RegionId> = self
            .chokepoints_of(region)
            .map(|chokepoint| {
                let (a, b) = chokepoint.regions();
                if a == region { b } else { a }
            })
            .collect();
        neighbors.sort();
        neighbors.dedup();
        neighbors
    }

    /// 0 for the same region, 1 for adjacent regions, infinity otherwise.
    ///
    /// The underlying matrix is built on first use.
    pub fn region_distance(&self, region_a: RegionId, region_b: RegionId) -> f32 {
        self.check(region_a);
        self.check(region_b);
        let (a, b) = if region_a <= region_b { (region_a, region_b) } else { (region_b, region_a) };
        self.distances.get_or_init(|| self.build_distance_matrix())[b.index()][a.index()]
    }

    fn build_distance_matrix(&self) -> Vec<Vec<f32>> {
        (0..self.num_regions)
            .map(|b| {
                (0..=b)
                    .map(|a| {
                        if a == b {
                            0.0
                        } else if self.pair_ranges[b][a].start == self.pair_ranges[b][a].end {
                            f32::INFINITY
                        } else {
                            1.0
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Export as a `petgraph` graph: node `i` is region `i + 1`, one edge per
    /// chokepoint.
    #[cfg(feature = "petgraph")]
    pub fn to_petgraph(&self) -> petgraph::graph::UnGraph<RegionId, ChokePointId> {
        use petgraph::graph::{NodeIndex, UnGraph};

        let mut graph = UnGraph::with_capacity(self.num_regions, self.chokepoints.len());
        for idx in 0..self.num_regions {
            graph.add_node(RegionId::from_index(idx));
        }
        for chokepoint in &self.chokepoints {
            let (a, b) = chokepoint.regions();
            graph.add_edge(NodeIndex::new(a.index()), NodeIndex::new(b.index()), chokepoint.id());
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::GridPos;

    fn rid(value: u32) -> RegionId {
        RegionId::new(value).unwrap()
    }

    fn chokepoint(a: u32, b: u32, index: u32, x: u32) -> ChokePoint {
        ChokePoint::new(ChokePointId::new(rid(a), rid(b), index), vec![(GridPos::new(x, 0), 1.0)])
    }

    fn sample() -> RegionGraph {
        RegionGraph::new(
            4,
            vec![chokepoint(2, 3, 0, 1), chokepoint(1, 2, 0, 2), chokepoint(3, 2, 1, 3), chokepoint(4, 1, 0, 4)],
        )
    }

    #[test]
    fn adjacency_is_symmetric() {
        let graph = sample();
        assert_eq!(graph.adjacency(rid(2), rid(3)).len(), 2);
        assert_eq!(graph.adjacency(rid(2), rid(3)), graph.adjacency(rid(3), rid(2)));
        assert_eq!(graph.adjacency(rid(1), rid(4))[0].id(), ChokePointId::new(rid(1), rid(4), 0));
        assert!(graph.adjacency(rid(1), rid(3)).is_empty());
        assert!(graph.adjacency(rid(2), rid(2)).is_empty());
    }

    #[test]
    fn chokepoints_are_stored_once_but_listed_per_region() {
        let graph = sample();
        assert_eq!(graph.all_chokepoints().len(), 4);
        assert_eq!(graph.chokepoints_of(rid(2)).count(), 3);
        assert_eq!(graph.chokepoints_of(rid(4)).count(), 1);
        assert_eq!(graph.neighbors(rid(2)), vec![rid(1), rid(3)]);
        assert_eq!(graph.neighbors(rid(1)), vec![rid(2), rid(4)]);
    }

    #[test]
    fn region_distance_matrix() {
        let graph = sample();
        assert_eq!(graph.region_distance(rid(3), rid(3)), 0.0);
        assert_eq!(graph.region_distance(rid(3), rid(2)), 1.0);
        assert_eq!(graph.region_distance(rid(1), rid(3)), f32::INFINITY);
    }

    #[test]
    fn unknown_chokepoints_resolve_to_none() {
        let graph = sample();
        assert!(graph.chokepoint(ChokePointId::new(rid(2), rid(3), 1)).is_some());
        assert!(graph.chokepoint(ChokePointId::new(rid(2), rid(3), 2)).is_none());
        assert!(graph.chokepoint(ChokePointId::new(rid(1), rid(9), 0)).is_none());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_region_panics() {
        sample().adjacency(rid(1), rid(5));
    }

    #[cfg(feature = "petgraph")]
    #[test]
    fn exports_to_petgraph() {
        let graph = sample().to_petgraph();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 4);
    }
}
