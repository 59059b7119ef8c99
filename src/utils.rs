use crate::engine::{apply, is_solvable, Direction, State, TILE_COUNT};
use crate::error::PuzzleError;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Parses a state from text holding `TILE_COUNT` numbers.
///
/// Numbers may be separated by whitespace (including newlines) and/or commas,
/// so both a single line and a 4×4 grid layout are accepted. `0` is the blank.
///
/// # Errors
/// Returns `PuzzleError::MalformedState` if a token is not a number, the count is
/// wrong, or the numbers do not form a valid permutation.
///
/// # Examples
/// ```
/// use fifteen_solver::utils::parse_state;
/// use fifteen_solver::engine::State;
///
/// let grid = "1 2 3 4\n5 6 7 8\n9 10 11 12\n13 14 15 0";
/// assert_eq!(parse_state(grid).unwrap(), State::goal());
///
/// let line = "1,2,3,4,5,6,7,8,9,10,11,12,13,14,15,0";
/// assert_eq!(parse_state(line).unwrap(), State::goal());
///
/// assert!(parse_state("1 2 3").is_err());
/// assert!(parse_state("1 2 x 4 5 6 7 8 9 10 11 12 13 14 15 0").is_err());
/// ```
pub fn parse_state(s: &str) -> Result<State, PuzzleError> {
    let mut tiles = Vec::with_capacity(TILE_COUNT);
    for token in s
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        let value = token.parse::<u8>().map_err(|_| {
            PuzzleError::malformed(format!("unrecognized tile '{}'", token))
        })?;
        tiles.push(value);
    }
    State::from_slice(&tiles)
}

/// Scrambles the goal by `depth` random legal moves of the blank.
///
/// The blank never immediately undoes its previous move, so short walks do not
/// collapse back onto the goal. The result is always solvable and at most
/// `depth` moves from the goal. The same `seed` always gives the same state.
pub fn random_walk(seed: u64, depth: usize) -> State {
    random_walk_with_moves(seed, depth).0
}

/// Like `random_walk`, also returning the directions the blank took.
pub fn random_walk_with_moves(seed: u64, depth: usize) -> (State, Vec<Direction>) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut state = State::goal();
    let mut moves = Vec::with_capacity(depth);
    let mut previous: Option<Direction> = None;

    for _ in 0..depth {
        let options: Vec<Direction> = state
            .valid_moves()
            .filter(|&d| Some(d.opposite()) != previous)
            .collect();
        // Every cell has at least two neighbours, so one option always survives.
        let direction = options[rng.gen_range(0..options.len())];
        state = match apply(&state, direction) {
            Ok(next) => next,
            Err(_) => unreachable!("valid_moves yielded an invalid direction"),
        };
        moves.push(direction);
        previous = Some(direction);
    }
    (state, moves)
}

/// A uniformly shuffled permutation of all tiles. Half of these are unsolvable.
pub fn random_permutation(seed: u64) -> State {
    let mut rng = SmallRng::seed_from_u64(seed);
    random_permutation_from(&mut rng)
}

/// A uniformly shuffled permutation that passes the solvability check.
///
/// Reshuffles with the same generator until the parity is right.
pub fn random_solvable(seed: u64) -> State {
    let mut rng = SmallRng::seed_from_u64(seed);
    loop {
        let state = random_permutation_from(&mut rng);
        if is_solvable(&state) {
            return state;
        }
    }
}

fn random_permutation_from(rng: &mut impl Rng) -> State {
    let mut tiles = *State::goal().tiles();
    tiles.shuffle(rng);
    match State::new(tiles) {
        Ok(state) => state,
        Err(_) => unreachable!("a shuffled goal is still a permutation"),
    }
}

/// Breadth-first distances from `origin` to every state within `max_depth` moves.
#[cfg(test)]
pub(crate) fn bfs_distances(
    origin: &State,
    max_depth: u32,
) -> std::collections::HashMap<State, u32> {
    use std::collections::{HashMap, VecDeque};

    let mut distances = HashMap::new();
    let mut queue = VecDeque::new();
    distances.insert(*origin, 0);
    queue.push_back(*origin);

    while let Some(state) = queue.pop_front() {
        let depth = distances[&state];
        if depth == max_depth {
            continue;
        }
        for direction in state.valid_moves() {
            let next = apply(&state, direction).unwrap();
            if !distances.contains_key(&next) {
                distances.insert(next, depth + 1);
                queue.push_back(next);
            }
        }
    }
    distances
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state_grid_layout() {
        let grid = "\
            2 10  8  7
            1  4 14  3
            6  5  0 12
            9 13 15 11";
        let state = parse_state(grid).unwrap();
        assert_eq!(state.blank(), 10);
        assert_eq!(state.tile_at(0), 2);
        assert_eq!(state.tile_at(15), 11);
    }

    #[test]
    fn test_parse_state_rejects_wrong_count() {
        let result = parse_state("1 2 3 4 5 6 7 8 9 10 11 12 13 14 15");
        assert!(matches!(result, Err(PuzzleError::MalformedState { .. })));
    }

    #[test]
    fn test_parse_state_rejects_bad_token() {
        let result = parse_state("1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 -1");
        match result {
            Err(PuzzleError::MalformedState { reason }) => assert!(reason.contains("'-1'")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_parse_state_rejects_missing_blank() {
        let result = parse_state("1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 15");
        assert!(result.is_err());
    }

    #[test]
    fn test_random_walk_is_deterministic() {
        assert_eq!(random_walk(42, 30), random_walk(42, 30));
        assert_ne!(random_walk(1, 30), random_walk(2, 30));
        assert_eq!(random_walk(99, 0), State::goal());
    }

    #[test]
    fn test_random_walk_moves_replay() {
        let (state, moves) = random_walk_with_moves(7, 25);
        assert_eq!(moves.len(), 25);
        for pair in moves.windows(2) {
            assert_ne!(pair[1], pair[0].opposite(), "walk must not backtrack");
        }
        let mut replayed = State::goal();
        for &direction in &moves {
            replayed.apply_move(direction).unwrap();
        }
        assert_eq!(replayed, state);
        assert!(is_solvable(&state));
    }

    #[test]
    fn test_random_walk_within_bfs_distance() {
        let distances = bfs_distances(&State::goal(), 8);
        for seed in 0..20 {
            let state = random_walk(seed, 8);
            assert!(distances[&state] <= 8);
        }
    }

    #[test]
    fn test_random_solvable_passes_parity() {
        for seed in 0..20 {
            let state = random_solvable(seed);
            assert!(is_solvable(&state));
            assert_eq!(random_solvable(seed), state);
        }
    }

    #[test]
    fn test_random_permutation_covers_both_parities() {
        let solvable = (0..40)
            .map(random_permutation)
            .filter(is_solvable)
            .count();
        assert!(solvable > 0 && solvable < 40);
    }

    #[test]
    fn test_solvability_matches_reachability() {
        // Every state reachable from the goal is solvable, and swapping two
        // non-blank tiles of a reachable state makes it unreachable.
        let distances = bfs_distances(&State::goal(), 8);
        for state in distances.keys() {
            assert!(is_solvable(state));

            let mut tiles = *state.tiles();
            let (a, b) = if state.blank() < 2 { (2, 3) } else { (0, 1) };
            tiles.swap(a, b);
            let swapped = State::new(tiles).unwrap();
            assert!(!is_solvable(&swapped));
            assert!(!distances.contains_key(&swapped));
        }
    }
}
