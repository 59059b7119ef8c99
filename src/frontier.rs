//! Search nodes, the best-first frontier and the visited registry.
//!
//! Nodes live in an arena owned by the solver and refer to their parent by
//! `NodeId`. The frontier and the registry only ever hold handles, never nodes.
use crate::engine::{Direction, State};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

/// Stable handle of a node inside the solver's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One discovered path to a state.
#[derive(Clone, Debug)]
pub struct SearchNode {
    pub state: State,
    /// Moves from the root.
    pub g: u32,
    /// Cached heuristic estimate of the remaining moves.
    pub h: u32,
    /// `None` for the root.
    pub parent: Option<NodeId>,
    /// Direction the blank moved to produce this node; `None` for the root.
    pub direction: Option<Direction>,
}

impl SearchNode {
    pub fn root(state: State, h: u32) -> Self {
        SearchNode {
            state,
            g: 0,
            h,
            parent: None,
            direction: None,
        }
    }

    pub fn f(&self) -> u32 {
        self.g + self.h
    }

    /// Direction that leads straight back to the parent, if any.
    pub fn direction_to_parent(&self) -> Option<Direction> {
        self.direction.map(Direction::opposite)
    }
}

/// Frontier ordering: lower `f` first, then lower `h`, then older nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrontierKey {
    pub f: u32,
    pub h: u32,
    pub id: NodeId,
}

impl PartialOrd for FrontierKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f
            .cmp(&other.f)
            .then(self.h.cmp(&other.h))
            .then(self.id.cmp(&other.id))
    }
}

/// Best-first frontier over node handles.
///
/// `BinaryHeap` is a max-heap, so keys are wrapped in `Reverse` to pop the
/// smallest `FrontierKey` first.
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<Reverse<FrontierKey>>,
    high_water: usize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: NodeId, node: &SearchNode) {
        self.heap.push(Reverse(FrontierKey {
            f: node.f(),
            h: node.h,
            id,
        }));
        self.high_water = self.high_water.max(self.heap.len());
    }

    /// Pops the best pending node.
    pub fn pop(&mut self) -> Option<NodeId> {
        self.heap.pop().map(|Reverse(key)| key.id)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Largest size the frontier reached.
    pub fn high_water(&self) -> usize {
        self.high_water
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RegistryEntry {
    id: NodeId,
    g: u32,
}

/// Cheapest known node for every state content seen so far.
///
/// Keys are the tile content of the state, so two nodes reaching the same
/// arrangement by different paths share one entry.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    entries: HashMap<State, RegistryEntry>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path cost of the best known node for `state`.
    pub fn best_cost(&self, state: &State) -> Option<u32> {
        self.entries.get(state).map(|e| e.g)
    }

    /// Whether a candidate reaching `state` in `g` moves beats the known path.
    pub fn improves(&self, state: &State, g: u32) -> bool {
        self.best_cost(state).map_or(true, |known| g < known)
    }

    /// Makes `id` the best node for `state`.
    ///
    /// Returns the handle it replaced, if any. Callers must check `improves`
    /// first; recording a path that is not cheaper is a logic error.
    pub fn record(&mut self, state: State, id: NodeId, g: u32) -> Option<NodeId> {
        debug_assert!(self.improves(&state, g));
        self.entries
            .insert(state, RegistryEntry { id, g })
            .map(|evicted| evicted.id)
    }

    /// Whether `id` is still the registered node for `state`.
    ///
    /// A node that lost its entry to a cheaper path is stale; the solver
    /// skips it when it comes off the frontier.
    pub fn is_current(&self, state: &State, id: NodeId) -> bool {
        self.entries.get(state).is_some_and(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handles of every registered node, in no particular order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.values().map(|e| e.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::apply;

    fn node(g: u32, h: u32) -> SearchNode {
        SearchNode {
            state: State::goal(),
            g,
            h,
            parent: None,
            direction: None,
        }
    }

    #[test]
    fn test_pop_returns_lowest_f_first() {
        let mut frontier = Frontier::new();
        frontier.push(NodeId(0), &node(10, 0));
        frontier.push(NodeId(1), &node(5, 0));
        frontier.push(NodeId(2), &node(15, 0));

        assert_eq!(frontier.pop(), Some(NodeId(1)));
        assert_eq!(frontier.pop(), Some(NodeId(0)));
        assert_eq!(frontier.pop(), Some(NodeId(2)));
        assert_eq!(frontier.pop(), None);
    }

    #[test]
    fn test_f_tie_broken_by_lower_h() {
        let mut frontier = Frontier::new();
        frontier.push(NodeId(0), &node(2, 6));
        frontier.push(NodeId(1), &node(6, 2));
        assert_eq!(frontier.pop(), Some(NodeId(1)), "closer estimate pops first");
    }

    #[test]
    fn test_full_tie_broken_by_creation_order() {
        let mut frontier = Frontier::new();
        frontier.push(NodeId(7), &node(3, 3));
        frontier.push(NodeId(4), &node(3, 3));
        assert_eq!(frontier.pop(), Some(NodeId(4)));
        assert_eq!(frontier.pop(), Some(NodeId(7)));
    }

    #[test]
    fn test_high_water_tracks_peak() {
        let mut frontier = Frontier::new();
        for i in 0..5 {
            frontier.push(NodeId(i), &node(1, 1));
        }
        frontier.pop();
        frontier.pop();
        assert_eq!(frontier.len(), 3);
        assert_eq!(frontier.high_water(), 5);
    }

    #[test]
    fn test_registry_keeps_cheapest_path() {
        let mut registry = VisitedRegistry::new();
        let state = apply(&State::goal(), Direction::Up).unwrap();

        assert!(registry.improves(&state, 7));
        assert_eq!(registry.record(state, NodeId(3), 7), None);
        assert!(!registry.improves(&state, 7), "equal cost is not an improvement");
        assert!(!registry.improves(&state, 9));
        assert!(registry.improves(&state, 5));

        assert_eq!(registry.record(state, NodeId(8), 5), Some(NodeId(3)));
        assert_eq!(registry.best_cost(&state), Some(5));
        assert!(registry.is_current(&state, NodeId(8)));
        assert!(!registry.is_current(&state, NodeId(3)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_keys_on_content() {
        let mut registry = VisitedRegistry::new();
        let a = apply(&State::goal(), Direction::Left).unwrap();
        let mut b = State::goal();
        b.apply_move(Direction::Left).unwrap();
        registry.record(a, NodeId(0), 1);
        assert_eq!(registry.best_cost(&b), Some(1));
        assert!(!registry.is_current(&State::goal(), NodeId(0)));
    }

    #[test]
    fn test_direction_to_parent() {
        let mut child = node(1, 0);
        assert_eq!(child.direction_to_parent(), None);
        child.direction = Some(Direction::Left);
        assert_eq!(child.direction_to_parent(), Some(Direction::Right));
    }
}
