use std::error::Error;
use std::io;

use map_regions::{
    analyze_map, AnalysisConfig, AnalysisError, ChokePointId, GridPos, MapAnalysis, Region, RegionId, TerrainMap,
    TerrainSource,
};

fn rid(value: u32) -> RegionId {
    RegionId::new(value).unwrap()
}

fn build_map(width: u32, height: u32, tile: impl Fn(u32, u32) -> char) -> TerrainMap {
    let text: String = (0..height)
        .map(|y| {
            let mut row: String = (0..width).map(|x| tile(x, y)).collect();
            row.push('\n');
            row
        })
        .collect();
    TerrainMap::from_ascii(&text).unwrap()
}

fn open_room() -> TerrainMap {
    build_map(10, 10, |_, _| '.')
}

/// Two 10x10 rooms joined by a one-tile corridor along row 4.
fn corridor() -> TerrainMap {
    build_map(25, 10, |x, y| if (10..15).contains(&x) && y != 4 { '#' } else { '.' })
}

/// Two rooms separated by a wall with gaps at rows 3 and 26.
fn two_gaps() -> TerrainMap {
    build_map(22, 30, |x, y| if (10..12).contains(&x) && y != 3 && y != 26 { '#' } else { '.' })
}

/// A room with a plus-shaped five-tile pocket behind a one-tile opening. The
/// pocket's centre is wider than the opening.
fn pocket() -> TerrainMap {
    build_map(25, 10, |x, y| match (x, y) {
        (0..=19, _) | (20, 4) | (21..=23, 4) | (22, 3) | (22, 5) => '.',
        _ => '#',
    })
}

/// Two long halls split only by one-tile stubs in the top and bottom walls.
fn stubbed_hall() -> TerrainMap {
    build_map(90, 22, |x, y| if x == 44 && (y == 0 || y == 21) { '#' } else { '.' })
}

fn analyze(terrain: &TerrainMap) -> MapAnalysis {
    analyze_map(terrain, &AnalysisConfig::default()).unwrap()
}

fn assert_total_partition(analysis: &MapAnalysis) {
    let grid = analysis.grid();
    let mut walkable = 0;
    for (pos, tile) in grid.tiles() {
        if tile.terrain.is_traversable() {
            walkable += 1;
            let region = analysis.region_at(pos).unwrap_or_else(|| panic!("{pos} has no region"));
            assert!(analysis.region(region).unwrap().contains(pos));
        } else {
            assert_eq!(analysis.region_at(pos), None);
        }
    }
    assert_eq!(analysis.regions().iter().map(Region::area).sum::<usize>(), walkable);
}

#[test]
fn open_room_is_a_single_region() {
    let analysis = analyze(&open_room());

    assert_eq!(analysis.num_regions(), 1);
    assert!(analysis.chokepoints().is_empty());
    for (pos, _) in analysis.grid().tiles() {
        assert_eq!(analysis.region_at(pos), Some(rid(1)));
    }
    assert_eq!(analysis.region_at(GridPos::new(10, 0)), None);

    let missing = ChokePointId::new(rid(1), rid(2), 0);
    let path_cost = analysis.grid().path_cost();
    assert_eq!(analysis.shortest_chokepoint_path(missing, missing, &path_cost), None);
}

#[test]
fn corridor_between_rooms_is_one_chokepoint() {
    let analysis = analyze(&corridor());

    assert_eq!(analysis.num_regions(), 2);
    assert_eq!(analysis.chokepoints().len(), 1);

    let chokepoint = &analysis.chokepoints()[0];
    assert_eq!(chokepoint.regions(), (rid(1), rid(2)));
    assert_eq!(chokepoint.mid_point(), GridPos::new(14, 4));
    assert_eq!(chokepoint.mid_clearance(), 1.0);
    assert_eq!(analysis.chokepoints_between(rid(2), rid(1)), analysis.chokepoints_between(rid(1), rid(2)));

    assert_ne!(analysis.region_at(GridPos::new(0, 0)), analysis.region_at(GridPos::new(24, 9)));
    assert_total_partition(&analysis);
}

#[test]
fn separate_gaps_are_separate_chokepoints() {
    let analysis = analyze(&two_gaps());

    assert_eq!(analysis.num_regions(), 2);
    let between = analysis.chokepoints_between(rid(1), rid(2));
    assert_eq!(between.len(), 2);
    assert_eq!(between[0].id(), ChokePointId::new(rid(1), rid(2), 0));
    assert_eq!(between[0].mid_point(), GridPos::new(11, 3));
    assert_eq!(between[1].id(), ChokePointId::new(rid(2), rid(1), 1));
    assert_eq!(between[1].mid_point(), GridPos::new(11, 26));
    assert_eq!(analysis.graph().region_distance(rid(1), rid(2)), 1.0);
    assert_eq!(analysis.graph().neighbors(rid(1)), vec![rid(2)]);

    let (upper, lower) = (between[0].id(), between[1].id());
    let path_cost = analysis.grid().path_cost();
    assert_eq!(analysis.shortest_chokepoint_path(upper, lower, &path_cost), Some(vec![upper, lower]));
    assert_eq!(analysis.shortest_chokepoint_path(upper, upper, &path_cost), Some(vec![upper]));

    assert_total_partition(&analysis);
}

#[test]
fn small_pocket_is_merged_into_its_room() {
    let analysis = analyze(&pocket());

    assert_eq!(analysis.num_regions(), 1);
    assert!(analysis.chokepoints().is_empty());
    assert_eq!(analysis.regions()[0].area(), 206);
    assert_eq!(analysis.region_at(GridPos::new(22, 5)), Some(rid(1)));
    assert_total_partition(&analysis);
}

#[test]
fn pocket_is_its_own_region_without_a_minimum_area() {
    let config = AnalysisConfig { min_region_area: 0, ..Default::default() };
    let analysis = analyze_map(&pocket(), &config).unwrap();

    assert_eq!(analysis.num_regions(), 2);
    assert_eq!(analysis.chokepoints().len(), 1);
    assert_eq!(analysis.chokepoints()[0].mid_point(), GridPos::new(21, 4));
    assert_eq!(analysis.region_at(GridPos::new(22, 4)), Some(rid(2)));
    assert_eq!(analysis.region(rid(2)).unwrap().area(), 4);
    assert_total_partition(&analysis);
}

#[test]
fn merge_ratio_threshold_decides_wide_gaps() {
    let analysis = analyze(&stubbed_hall());
    assert_eq!(analysis.num_regions(), 1);
    assert!(analysis.chokepoints().is_empty());

    let config = AnalysisConfig { merge_ratio_threshold: 0.95, ..Default::default() };
    let analysis = analyze_map(&stubbed_hall(), &config).unwrap();
    assert_eq!(analysis.num_regions(), 2);
    let between = analysis.chokepoints_between(rid(1), rid(2));
    assert_eq!(between.len(), 1);
    assert_eq!(between[0].len(), 20);
    assert_eq!(between[0].mid_point(), GridPos::new(44, 10));
    assert_ne!(analysis.region_at(GridPos::new(0, 10)), analysis.region_at(GridPos::new(89, 10)));
    assert_total_partition(&analysis);
}

#[test]
fn clearance_is_zero_exactly_on_obstacles() {
    for terrain in [open_room(), corridor(), two_gaps(), pocket()] {
        let analysis = analyze(&terrain);
        for (pos, tile) in analysis.grid().tiles() {
            if tile.terrain.is_traversable() {
                assert!(tile.clearance >= 1.0, "{pos} has clearance {}", tile.clearance);
            } else {
                assert_eq!(tile.clearance, 0.0, "{pos} is an obstacle");
            }
        }
    }
}

#[test]
fn chokepoints_join_distinct_existing_regions() {
    for terrain in [corridor(), two_gaps()] {
        let analysis = analyze(&terrain);
        for chokepoint in analysis.chokepoints() {
            let (a, b) = chokepoint.regions();
            assert!(a < b);
            assert!(analysis.region(a).is_some() && analysis.region(b).is_some());
            assert!(analysis.chokepoints_between(b, a).contains(chokepoint));
        }
    }
}

#[test]
fn analysis_is_reproducible() {
    let terrain = two_gaps();
    let first = analyze(&terrain);
    let second = analyze(&terrain);

    assert_eq!(first.regions(), second.regions());
    assert_eq!(first.chokepoints(), second.chokepoints());
    assert_eq!(first.grid().to_string(), second.grid().to_string());
}

struct FlakySource {
    width: u32,
    height: u32,
    broken: GridPos,
}

impl TerrainSource for FlakySource {
    type Error = io::Error;

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_walkable(&self, pos: GridPos) -> Result<bool, io::Error> {
        if pos == self.broken {
            return Err(io::Error::other("terrain sensor offline"));
        }
        Ok(true)
    }

    fn is_buildable(&self, _pos: GridPos) -> Result<bool, io::Error> {
        Ok(true)
    }
}

#[test]
fn terrain_source_errors_abort_the_analysis() {
    let source = FlakySource { width: 8, height: 8, broken: GridPos::new(3, 5) };
    let err = analyze_map(&source, &AnalysisConfig::default()).unwrap_err();

    match &err {
        AnalysisError::TerrainSource { pos, .. } => assert_eq!(*pos, GridPos::new(3, 5)),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.source().map(|source| source.to_string()), Some("terrain sensor offline".to_string()));

    let empty = FlakySource { width: 0, height: 4, broken: GridPos::new(0, 0) };
    assert!(matches!(
        analyze_map(&empty, &AnalysisConfig::default()),
        Err(AnalysisError::EmptyGrid { width: 0, height: 4 })
    ));
}

#[test]
fn iteration_cap_comes_from_the_config() {
    let config = AnalysisConfig { max_path_iterations: Some(1), ..Default::default() };
    let analysis = analyze_map(&two_gaps(), &config).unwrap();
    assert_eq!(analysis.config().max_path_iterations, Some(1));

    let between = analysis.chokepoints_between(rid(1), rid(2));
    let path_cost = analysis.grid().path_cost();
    // one expansion of the upper gap is enough to reach the lower one
    assert_eq!(
        analysis.shortest_chokepoint_path(between[0].id(), between[1].id(), &path_cost),
        Some(vec![between[0].id(), between[1].id()])
    );
}
