//! Cost-to-goal estimators for the 15-puzzle.
//!
//! Every estimator maps a `State` to a non-negative number of moves. The goal
//! index of tile `v` is `v - 1`, so tile 1 belongs in the top-left corner and the
//! blank in the bottom-right one.
use crate::engine::{count_inversions, State, BLANK, GRID_SIZE};
use std::fmt;

/// Selects which estimator a `Solver` evaluates on every node.
///
/// `Manhattan`, `LinearConflict` and `InversionDistance` never overestimate, so
/// the solver returns optimal paths with them. `WalkingDistance` weights
/// displacement by 3/2 and can overestimate; it usually expands fewer nodes
/// but gives up the optimality guarantee.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum Heuristic {
    Manhattan,
    #[default]
    LinearConflict,
    WalkingDistance,
    InversionDistance,
}

impl Heuristic {
    /// All estimators, in the order reports list them.
    pub const ALL: [Heuristic; 4] = [
        Heuristic::Manhattan,
        Heuristic::LinearConflict,
        Heuristic::WalkingDistance,
        Heuristic::InversionDistance,
    ];

    /// Evaluates this estimator on `state`.
    ///
    /// ```
    /// use fifteen_solver::engine::State;
    /// use fifteen_solver::heuristics::Heuristic;
    /// for heuristic in Heuristic::ALL {
    ///     assert_eq!(heuristic.estimate(&State::goal()), 0);
    /// }
    /// ```
    pub fn estimate(self, state: &State) -> u32 {
        match self {
            Heuristic::Manhattan => manhattan(state),
            Heuristic::LinearConflict => manhattan_with_linear_conflict(state),
            Heuristic::WalkingDistance => walking_distance(state),
            Heuristic::InversionDistance => inversion_distance(state),
        }
    }

    /// Whether the estimator is a lower bound on the true distance.
    pub fn is_admissible(self) -> bool {
        !matches!(self, Heuristic::WalkingDistance)
    }

    pub fn name(self) -> &'static str {
        match self {
            Heuristic::Manhattan => "manhattan",
            Heuristic::LinearConflict => "linear-conflict",
            Heuristic::WalkingDistance => "walking-distance",
            Heuristic::InversionDistance => "inversion-distance",
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signed (x, y) of a linear index. Callers only pass indices of a valid state.
fn point(index: usize) -> (i32, i32) {
    ((index % GRID_SIZE) as i32, (index / GRID_SIZE) as i32)
}

/// Goal index of a non-blank tile value.
fn goal_index(tile: u8) -> usize {
    tile as usize - 1
}

/// Halved sum of Manhattan distances of all non-blank tiles.
///
/// The halving keeps this estimator on the same scale as the other variants
/// and must stay exactly as is for their values to be comparable.
///
/// # Examples
/// ```
/// use fifteen_solver::engine::State;
/// use fifteen_solver::heuristics::manhattan;
/// let state = State::new([2, 1, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 0]).unwrap();
/// assert_eq!(manhattan(&state), 1); // (1 + 1) / 2
/// ```
pub fn manhattan(state: &State) -> u32 {
    manhattan_sum(state) / 2
}

fn manhattan_sum(state: &State) -> u32 {
    let mut sum = 0;
    for (i, &tile) in state.tiles().iter().enumerate() {
        if tile == BLANK {
            continue;
        }
        let (x, y) = point(i);
        let (gx, gy) = point(goal_index(tile));
        sum += x.abs_diff(gx) + y.abs_diff(gy);
    }
    sum
}

/// Manhattan estimate plus 2 per linear conflict.
///
/// Two tiles are in linear conflict when both sit in their goal row (or goal
/// column) but in reversed order: one of them has to step out of the line and
/// back. Every reversed pair in a line counts.
///
/// # Examples
/// ```
/// use fifteen_solver::engine::State;
/// use fifteen_solver::heuristics::manhattan_with_linear_conflict;
/// let state = State::new([2, 1, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 0]).unwrap();
/// assert_eq!(manhattan_with_linear_conflict(&state), 3); // 1 + 2
/// ```
pub fn manhattan_with_linear_conflict(state: &State) -> u32 {
    let tiles = state.tiles();
    let mut conflicts = 0;

    for row in 0..GRID_SIZE {
        let goal_columns: Vec<usize> = (0..GRID_SIZE)
            .map(|col| tiles[row * GRID_SIZE + col])
            .filter(|&tile| tile != BLANK && goal_index(tile) / GRID_SIZE == row)
            .map(|tile| goal_index(tile) % GRID_SIZE)
            .collect();
        conflicts += reversed_pairs(&goal_columns);
    }

    for col in 0..GRID_SIZE {
        let goal_rows: Vec<usize> = (0..GRID_SIZE)
            .map(|row| tiles[row * GRID_SIZE + col])
            .filter(|&tile| tile != BLANK && goal_index(tile) % GRID_SIZE == col)
            .map(|tile| goal_index(tile) / GRID_SIZE)
            .collect();
        conflicts += reversed_pairs(&goal_rows);
    }

    manhattan(state) + 2 * conflicts
}

/// Pairs `(i, j)` with `i < j` whose goal positions are in the opposite order.
fn reversed_pairs(goal_positions: &[usize]) -> u32 {
    let mut pairs = 0;
    for (i, &earlier) in goal_positions.iter().enumerate() {
        pairs += goal_positions[i + 1..]
            .iter()
            .filter(|&&later| later < earlier)
            .count() as u32;
    }
    pairs
}

/// Displacement estimate that also charges for the blank being on the wrong side.
///
/// Each unit of vertical or horizontal displacement costs 3. On top of that a
/// tile pays +2 on an axis when the blank is at least as far from the tile's goal
/// as the tile itself, and:
/// - vertically, the blank and the tile sit on opposite sides of the goal row;
/// - horizontally, they sit on the same side of the goal column.
///
/// The total is halved.
///
/// Not admissible: two tiles one step from home already score 3.
pub fn walking_distance(state: &State) -> u32 {
    let (bx, by) = point(state.blank());
    let mut sum: i32 = 0;

    for (i, &tile) in state.tiles().iter().enumerate() {
        if tile == BLANK {
            continue;
        }
        let (sx, sy) = point(i);
        let (gx, gy) = point(goal_index(tile));
        let vertical = (gy - sy).abs();
        let horizontal = (gx - sx).abs();

        if vertical != 0 {
            sum += vertical * 3;
            if (gy - by) * (gy - sy) < 0 && (gy - by).abs() >= vertical {
                sum += 2;
            }
        }
        if horizontal != 0 {
            sum += horizontal * 3;
            if (gx - bx) * (gx - sx) > 0 && (gx - bx).abs() >= horizontal {
                sum += 2;
            }
        }
    }

    (sum / 2) as u32
}

/// Inversion count divided by 3, rounded up.
///
/// A vertical move changes the inversion count by at most 3 and a horizontal
/// move not at all, so this never overestimates. It is cheap and loose.
pub fn inversion_distance(state: &State) -> u32 {
    count_inversions(state.tiles()).div_ceil(3)
}
