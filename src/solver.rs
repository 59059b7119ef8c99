use crate::engine::{is_solvable, Direction, State};
use crate::error::PuzzleError;
use crate::frontier::{Frontier, NodeId, SearchNode, VisitedRegistry};
use crate::heuristics::Heuristic;
use log::{debug, trace};

/// How far past the best solution cost a node's `f` may be and still get expanded.
///
/// Keeping one extra level lets the search collect solutions that tie with, or
/// are one move longer than, the best one found when the bound tightened.
pub const SUBOPTIMALITY_SLACK: u32 = 1;

/// A move sequence that takes the start state to the goal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// Directions the blank travels, in order.
    pub moves: Vec<Direction>,
    /// Every state along the path, start and goal included.
    pub states: Vec<State>,
    /// Number of moves.
    pub cost: u32,
}

impl Solution {
    /// Replays `moves` on `start` and returns the resulting state.
    pub fn replay(&self, start: &State) -> Result<State, PuzzleError> {
        let mut state = *start;
        for &direction in &self.moves {
            state.apply_move(direction)?;
        }
        Ok(state)
    }

    /// Compact listing such as `ULLD`.
    pub fn move_string(&self) -> String {
        self.moves.iter().map(|d| d.to_char()).collect()
    }
}

/// Why the search loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The frontier emptied without any goal being reached.
    Exhausted,
    /// At least one solution was found and every node within the bound was processed.
    BoundTightened,
}

/// Lifecycle of a `Solver`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Validating,
    Searching,
    Done(Termination),
}

/// Counters collected while searching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes whose neighbours were generated.
    pub expanded: u64,
    /// Valid, non-reversing neighbour states produced.
    pub generated: u64,
    /// Neighbours dropped because an equal or cheaper path was already known.
    pub duplicates: u64,
    /// Registry entries replaced by a cheaper path.
    pub evictions: u64,
    /// Popped nodes skipped because a cheaper path superseded them.
    pub stale: u64,
    /// Popped nodes skipped because their `f` lies outside the bound.
    pub pruned: u64,
    pub frontier_high_water: usize,
    pub registry_size: usize,
}

/// A* search over 15-puzzle states.
///
/// The solver owns the start state, the node arena, the frontier and the
/// visited registry. Nodes are addressed by `NodeId`.
///
/// A node evicted from the registry is not released on eviction. It stays in
/// the arena because nodes generated from it still link through it as their
/// parent, and it is freed together with the rest of the arena when the solver
/// is dropped. Nothing in the registry refers to it afterwards, and its
/// frontier entry is skipped when popped.
///
/// # Examples
/// ```
/// use fifteen_solver::engine::{State, Direction};
/// use fifteen_solver::heuristics::Heuristic;
/// use fifteen_solver::solver::Solver;
///
/// let start = State::new([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 0, 15]).unwrap();
/// let mut solver = Solver::new(start, Heuristic::LinearConflict);
/// let solutions = solver.solve().unwrap();
/// assert_eq!(solutions.len(), 1);
/// assert_eq!(solutions[0].moves, vec![Direction::Right]);
/// ```
#[derive(Debug)]
pub struct Solver {
    initial: State,
    heuristic: Heuristic,
    expansion_limit: Option<u64>,
    nodes: Vec<SearchNode>,
    frontier: Frontier,
    registry: VisitedRegistry,
    phase: Phase,
    stats: SearchStats,
    solutions: Vec<Solution>,
}

impl Solver {
    /// Creates a solver for `initial`. No work happens until `solve` is called.
    pub fn new(initial: State, heuristic: Heuristic) -> Self {
        Solver {
            initial,
            heuristic,
            expansion_limit: None,
            nodes: Vec::new(),
            frontier: Frontier::new(),
            registry: VisitedRegistry::new(),
            phase: Phase::Uninitialized,
            stats: SearchStats::default(),
            solutions: Vec::new(),
        }
    }

    /// Caps the number of node expansions; `solve` fails with
    /// `PuzzleError::BudgetExhausted` once the cap is hit.
    pub fn with_expansion_limit(mut self, limit: u64) -> Self {
        self.expansion_limit = Some(limit);
        self
    }

    pub fn initial(&self) -> &State {
        &self.initial
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Looks up a node in the arena.
    pub fn node(&self, id: NodeId) -> Option<&SearchNode> {
        self.nodes.get(id.index())
    }

    /// Nodes currently held by the visited registry.
    pub fn registered_nodes(&self) -> impl Iterator<Item = (NodeId, &SearchNode)> + '_ {
        self.registry
            .node_ids()
            .map(move |id| (id, &self.nodes[id.index()]))
    }

    /// Runs the search and returns every solution recorded, in discovery order.
    ///
    /// The first call does the work; later calls return the same solutions
    /// without searching again.
    ///
    /// # Errors
    /// - `PuzzleError::Unsolvable` if the start state fails the parity check.
    ///   No node is expanded in that case.
    /// - `PuzzleError::BudgetExhausted` if an expansion limit was set and reached.
    pub fn solve(&mut self) -> Result<Vec<Solution>, PuzzleError> {
        if let Phase::Done(_) = self.phase {
            return Ok(self.solutions.clone());
        }

        self.phase = Phase::Validating;
        if !is_solvable(&self.initial) {
            debug!("rejecting unsolvable start state:\n{}", self.initial);
            self.phase = Phase::Uninitialized;
            return Err(PuzzleError::Unsolvable);
        }

        self.reset();
        self.phase = Phase::Searching;
        let goal_ids = self.search()?;

        self.solutions = goal_ids.into_iter().map(|id| self.extract(id)).collect();
        let termination = if self.solutions.is_empty() {
            Termination::Exhausted
        } else {
            Termination::BoundTightened
        };
        self.phase = Phase::Done(termination);
        self.stats.registry_size = self.registry.len();
        self.stats.frontier_high_water = self.frontier.high_water();

        debug!(
            "search finished ({:?}): {} solution(s), expanded {}, generated {}, registry {}",
            termination,
            self.solutions.len(),
            self.stats.expanded,
            self.stats.generated,
            self.stats.registry_size
        );
        Ok(self.solutions.clone())
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.frontier = Frontier::new();
        self.registry = VisitedRegistry::new();
        self.stats = SearchStats::default();
        self.solutions.clear();
    }

    fn alloc(&mut self, node: SearchNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// The A* loop. Returns the handles of every goal node recorded.
    fn search(&mut self) -> Result<Vec<NodeId>, PuzzleError> {
        let root = SearchNode::root(self.initial, self.heuristic.estimate(&self.initial));
        let root_id = self.alloc(root);
        self.registry.record(self.initial, root_id, 0);
        self.frontier.push(root_id, &self.nodes[root_id.index()]);

        let mut goals = Vec::new();
        let mut best: Option<u32> = None;

        while let Some(id) = self.frontier.pop() {
            let node = &self.nodes[id.index()];

            if !self.registry.is_current(&node.state, id) {
                self.stats.stale += 1;
                continue;
            }
            if best.is_some_and(|bound| node.f() > bound + SUBOPTIMALITY_SLACK) {
                self.stats.pruned += 1;
                continue;
            }

            trace!("pop g={} h={} f={}", node.g, node.h, node.f());

            if node.state.is_goal() {
                let cost = node.g;
                debug!("found a solution candidate with {} moves", cost);
                goals.push(id);
                best = Some(best.map_or(cost, |b| b.min(cost)));
            }

            if let Some(limit) = self.expansion_limit {
                if self.stats.expanded >= limit {
                    return Err(PuzzleError::BudgetExhausted {
                        expanded: self.stats.expanded,
                    });
                }
            }
            self.expand(id)?;
        }

        Ok(goals)
    }

    /// Generates every non-reversing neighbour of `id` and reconciles it with the registry.
    fn expand(&mut self, id: NodeId) -> Result<(), PuzzleError> {
        self.stats.expanded += 1;
        let parent = &self.nodes[id.index()];
        let (parent_state, parent_g, back) =
            (parent.state, parent.g, parent.direction_to_parent());

        for direction in Direction::ALL {
            if Some(direction) == back {
                continue;
            }

            let mut state = parent_state;
            match state.apply_move(direction) {
                Ok(_) => {}
                Err(PuzzleError::InvalidMove { .. }) => continue,
                Err(e) => return Err(e),
            }
            self.stats.generated += 1;

            let g = parent_g + 1;
            if !self.registry.improves(&state, g) {
                self.stats.duplicates += 1;
                continue;
            }

            let child = SearchNode {
                state,
                g,
                h: self.heuristic.estimate(&state),
                parent: Some(id),
                direction: Some(direction),
            };
            let child_id = self.alloc(child);
            if let Some(evicted) = self.registry.record(state, child_id, g) {
                self.stats.evictions += 1;
                trace!("node {:?} superseded by {:?} at g={}", evicted, child_id, g);
            }
            self.frontier.push(child_id, &self.nodes[child_id.index()]);
        }
        Ok(())
    }

    /// Walks parent links from `goal` back to the root.
    fn extract(&self, goal: NodeId) -> Solution {
        let mut moves = Vec::new();
        let mut states = Vec::new();
        let mut cursor = Some(goal);
        while let Some(id) = cursor {
            let node = &self.nodes[id.index()];
            states.push(node.state);
            if let Some(direction) = node.direction {
                moves.push(direction);
            }
            cursor = node.parent;
        }
        moves.reverse();
        states.reverse();
        Solution {
            cost: moves.len() as u32,
            moves,
            states,
        }
    }
}

/// Solves `initial` with `heuristic` and returns every solution found.
///
/// Convenience wrapper around `Solver::new(..).solve()`.
pub fn solve(initial: State, heuristic: Heuristic) -> Result<Vec<Solution>, PuzzleError> {
    Solver::new(initial, heuristic).solve()
}

/// Smallest cost among `solutions`, if any.
pub fn shortest(solutions: &[Solution]) -> Option<&Solution> {
    solutions.iter().min_by_key(|s| s.cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::apply;
    use crate::utils::{bfs_distances, random_walk};

    fn swapped_goal() -> State {
        State::new([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 15, 14, 0]).unwrap()
    }

    #[test]
    fn test_goal_start_returns_single_empty_solution() {
        let mut solver = Solver::new(State::goal(), Heuristic::LinearConflict);
        let solutions = solver.solve().unwrap();
        assert_eq!(solutions.len(), 1);
        assert!(solutions[0].moves.is_empty());
        assert_eq!(solutions[0].cost, 0);
        assert_eq!(solutions[0].states, vec![State::goal()]);
        assert_eq!(solver.phase(), Phase::Done(Termination::BoundTightened));
    }

    #[test]
    fn test_one_move_from_goal() {
        let start = apply(&State::goal(), Direction::Left).unwrap();
        for heuristic in Heuristic::ALL {
            let solutions = solve(start, heuristic).unwrap();
            assert_eq!(solutions.len(), 1, "{}", heuristic);
            assert_eq!(solutions[0].moves, vec![Direction::Right], "{}", heuristic);
            assert_eq!(solutions[0].cost, 1);
        }
    }

    #[test]
    fn test_unsolvable_start_expands_nothing() {
        let mut solver = Solver::new(swapped_goal(), Heuristic::Manhattan);
        assert_eq!(solver.solve(), Err(PuzzleError::Unsolvable));
        assert_eq!(solver.stats().expanded, 0);
        assert_eq!(solver.registered_nodes().count(), 0);
        assert_eq!(solver.phase(), Phase::Uninitialized);
    }

    #[test]
    fn test_solutions_replay_to_goal() {
        for seed in 0..8 {
            let start = random_walk(seed, 12);
            for heuristic in Heuristic::ALL {
                let solutions = solve(start, heuristic).unwrap();
                assert!(!solutions.is_empty(), "seed {} {}", seed, heuristic);
                for solution in &solutions {
                    let end = solution.replay(&start).unwrap();
                    assert!(end.is_goal(), "seed {} {}", seed, heuristic);
                    assert_eq!(solution.states.first(), Some(&start));
                    assert_eq!(solution.states.last(), Some(&State::goal()));
                    assert_eq!(solution.states.len(), solution.moves.len() + 1);
                    assert_eq!(solution.cost as usize, solution.moves.len());
                }
            }
        }
    }

    #[test]
    fn test_admissible_heuristics_find_optimal_cost() {
        let distances = bfs_distances(&State::goal(), 10);
        for seed in 0..10 {
            let start = random_walk(seed, 10);
            let optimal = distances[&start];
            for heuristic in Heuristic::ALL.into_iter().filter(|h| h.is_admissible()) {
                let solutions = solve(start, heuristic).unwrap();
                let best = shortest(&solutions).unwrap();
                assert_eq!(best.cost, optimal, "seed {} {}", seed, heuristic);
            }
        }
    }

    #[test]
    fn test_later_solutions_are_strictly_cheaper() {
        // A goal node is only recorded while it is the registry's entry, so a
        // second recording means a cheaper path replaced the first one.
        for heuristic in Heuristic::ALL {
            let start = random_walk(3, 12);
            let solutions = solve(start, heuristic).unwrap();
            for pair in solutions.windows(2) {
                assert!(pair[1].cost < pair[0].cost, "{}", heuristic);
            }
            let best = shortest(&solutions).unwrap().cost;
            assert_eq!(solutions.last().unwrap().cost, best);
        }
    }

    #[test]
    fn test_solve_is_idempotent() {
        let start = random_walk(11, 12);
        let mut solver = Solver::new(start, Heuristic::Manhattan);
        let first = solver.solve().unwrap();
        let stats = solver.stats();
        let second = solver.solve().unwrap();
        assert_eq!(first, second);
        assert_eq!(solver.stats(), stats, "second call must not search again");

        let fresh = solve(start, Heuristic::Manhattan).unwrap();
        assert_eq!(
            shortest(&fresh).unwrap().cost,
            shortest(&first).unwrap().cost
        );
    }

    #[test]
    fn test_registry_paths_are_legal() {
        let start = random_walk(5, 12);
        let mut solver = Solver::new(start, Heuristic::LinearConflict);
        solver.solve().unwrap();

        let mut checked = 0;
        for (id, node) in solver.registered_nodes() {
            let mut cursor = id;
            let mut current = node;
            while let Some(parent_id) = current.parent {
                let parent = solver.node(parent_id).unwrap();
                let direction = current.direction.unwrap();
                assert_eq!(apply(&parent.state, direction).unwrap(), current.state);
                assert_eq!(parent.g + 1, current.g);
                cursor = parent_id;
                current = parent;
            }
            assert_eq!(cursor, NodeId(0));
            assert_eq!(current.state, start);
            checked += 1;
        }
        assert_eq!(checked, solver.stats().registry_size);
    }

    #[test]
    fn test_registry_holds_one_entry_per_state() {
        use std::collections::HashSet;
        let start = random_walk(9, 12);
        let mut solver = Solver::new(start, Heuristic::InversionDistance);
        solver.solve().unwrap();
        let states: HashSet<State> = solver.registered_nodes().map(|(_, n)| n.state).collect();
        assert_eq!(states.len(), solver.registered_nodes().count());
    }

    #[test]
    fn test_expansion_limit() {
        let mut start = State::goal();
        for direction in [
            Direction::Up,
            Direction::Up,
            Direction::Left,
            Direction::Left,
            Direction::Down,
        ] {
            start.apply_move(direction).unwrap();
        }
        let mut solver =
            Solver::new(start, Heuristic::InversionDistance).with_expansion_limit(3);
        assert_eq!(
            solver.solve(),
            Err(PuzzleError::BudgetExhausted { expanded: 3 })
        );
    }

    #[test]
    fn test_stats_are_consistent() {
        let start = random_walk(7, 12);
        let mut solver = Solver::new(start, Heuristic::Manhattan);
        solver.solve().unwrap();
        let stats = solver.stats();
        assert!(stats.expanded > 0);
        assert!(stats.generated >= stats.duplicates);
        // Root plus every child that passed the registry check.
        assert_eq!(
            solver.nodes.len() as u64,
            1 + stats.generated - stats.duplicates
        );
        assert_eq!(
            stats.registry_size as u64,
            solver.nodes.len() as u64 - stats.evictions
        );
        assert!(stats.frontier_high_water > 0);
    }

    #[test]
    fn test_superseded_nodes_are_skipped_when_popped() {
        let distances = bfs_distances(&State::goal(), 14);
        let mut evictions = 0;
        let mut stale = 0;
        for seed in 0..16 {
            let start = random_walk(seed, 14);
            let mut solver = Solver::new(start, Heuristic::LinearConflict);
            let solutions = solver.solve().unwrap();
            let stats = solver.stats();

            // Only an evicted node can fail the registry check at pop time.
            assert!(stats.stale <= stats.evictions, "seed {}", seed);
            assert_eq!(
                shortest(&solutions).unwrap().cost,
                distances[&start],
                "seed {}",
                seed
            );
            evictions += stats.evictions;
            stale += stats.stale;
        }
        assert!(evictions > 0);
        assert!(stale > 0);
    }
}
