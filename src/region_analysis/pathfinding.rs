use std::cmp::Ordering;
use std::collections::BinaryHeap;

use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::terrain::PathCostSource;

use super::graph::RegionGraph;
use super::structs::{ChokePoint, ChokePointId};

/// Open-set entry, ordered so that `BinaryHeap` pops the lowest `f_score`
/// first. Equal scores pop the lower chokepoint id first.
#[derive(Clone, Copy, Debug, PartialEq)]
struct State {
    f_score: f32,
    node: ChokePointId,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f_score.total_cmp(&self.f_score)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* over chokepoints. Two chokepoints are neighbours when they border a
/// common region; the step cost is the ground distance between their mid
/// points and the heuristic is the straight-line distance to the goal.
pub struct ChokePathFinder<'a, P: PathCostSource + ?Sized> {
    graph: &'a RegionGraph,
    path_cost: &'a P,
    max_iterations: Option<usize>,
}

impl<'a, P: PathCostSource + ?Sized> ChokePathFinder<'a, P> {
    pub fn new(graph: &'a RegionGraph, path_cost: &'a P) -> Self {
        Self { graph, path_cost, max_iterations: None }
    }

    /// Give up after `max_iterations` expansions, reporting no path.
    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// The chokepoints from `start` to `goal`, both included.
    ///
    /// `None` when either id is unknown, the two are not connected, or the
    /// iteration cap was hit.
    pub fn shortest_path(&self, start: ChokePointId, goal: ChokePointId) -> Option<Vec<ChokePointId>> {
        self.shortest_path_with_cost(start, goal).map(|(path, _)| path)
    }

    /// Like [`shortest_path`](Self::shortest_path), also returning the summed
    /// ground distance along the path.
    pub fn shortest_path_with_cost(&self, start: ChokePointId, goal: ChokePointId) -> Option<(Vec<ChokePointId>, f32)> {
        let start_cp = self.graph.chokepoint(start)?;
        let goal_cp = self.graph.chokepoint(goal)?;
        let heuristic = |chokepoint: &ChokePoint| chokepoint.mid_point().distance(goal_cp.mid_point());

        let mut open_set = BinaryHeap::new();
        let mut closed_set: FxHashSet<ChokePointId> = FxHashSet::default();
        let mut came_from: FxHashMap<ChokePointId, ChokePointId> = FxHashMap::default();
        let mut g_score: FxHashMap<ChokePointId, f32> = FxHashMap::default();

        g_score.insert(start, 0.0);
        open_set.push(State { f_score: heuristic(start_cp), node: start });

        let mut iterations = 0usize;
        while let Some(State { node: current, .. }) = open_set.pop() {
            if current == goal {
                let cost = g_score.get(&current).copied().unwrap_or(0.0);
                debug!(%start, %goal, iterations, cost, "found chokepoint path");
                return Some((reconstruct_path(&came_from, current), cost));
            }
            if !closed_set.insert(current) {
                continue;
            }

            iterations += 1;
            if self.max_iterations.is_some_and(|max| iterations > max) {
                warn!(%start, %goal, iterations, "chokepoint A* hit its iteration cap");
                return None;
            }

            let Some(current_cp) = self.graph.chokepoint(current) else {
                continue;
            };
            let current_g = g_score.get(&current).copied().unwrap_or(f32::INFINITY);

            for neighbor in neighbors(self.graph, current_cp) {
                let neighbor_id = neighbor.id();
                if closed_set.contains(&neighbor_id) {
                    continue;
                }

                let step = self.path_cost.ground_distance(current_cp.mid_point(), neighbor.mid_point());
                if !step.is_finite() || step < 0.0 {
                    debug!(from = %current, to = %neighbor_id, step, "skipping unusable ground distance");
                    continue;
                }

                let tentative_g = current_g + step;
                if tentative_g < g_score.get(&neighbor_id).copied().unwrap_or(f32::INFINITY) {
                    came_from.insert(neighbor_id, current);
                    g_score.insert(neighbor_id, tentative_g);
                    open_set.push(State { f_score: tentative_g + heuristic(neighbor), node: neighbor_id });
                }
            }
        }

        debug!(%start, %goal, iterations, "no chokepoint path");
        None
    }
}

/// Chokepoints sharing a region with `chokepoint`, each once.
fn neighbors<'g>(graph: &'g RegionGraph, chokepoint: &ChokePoint) -> impl Iterator<Item = &'g ChokePoint> + 'g {
    let (region_a, region_b) = chokepoint.regions();
    let id = chokepoint.id();
    graph
        .chokepoints_of(region_a)
        .chain(graph.chokepoints_of(region_b))
        .filter(move |other| other.id() != id)
        .unique_by(|other| other.id())
}

fn reconstruct_path(came_from: &FxHashMap<ChokePointId, ChokePointId>, mut current: ChokePointId) -> Vec<ChokePointId> {
    let mut path = vec![current];
    while let Some(prev) = came_from.get(&current) {
        current = *prev;
        path.push(current);
    }
    path.reverse();
    path
}
