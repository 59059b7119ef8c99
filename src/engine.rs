//! Board model and move rules for the 15-puzzle.
//!
//! This module defines the puzzle's fundamental components:
//! - `Direction`: The four directions the blank can slide in.
//! - `Coordinate`: A cell position derived from a linear index.
//! - `State`: A tile arrangement together with its cached blank index.
//!
//! It also hosts the move rules (`is_valid_move`, `State::apply_move`, `apply`)
//! and the parity-based solvability check.
use crate::error::PuzzleError;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Width and height of the board. The puzzle is always square.
pub const GRID_SIZE: usize = 4;

/// Number of cells on the board, blank included.
pub const TILE_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// The value that marks the blank cell.
pub const BLANK: u8 = 0;

/// A direction the blank slides in.
///
/// Moving the blank `Up` swaps it with the tile directly above it, so that
/// tile visually slides down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Every direction, in the order the solver expands them.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Offset of the destination from the origin in linear index space.
    pub fn offset(self) -> isize {
        match self {
            Direction::Up => -(GRID_SIZE as isize),
            Direction::Down => GRID_SIZE as isize,
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    /// The direction that undoes this one.
    ///
    /// ```
    /// use fifteen_solver::engine::Direction;
    /// assert_eq!(Direction::Up.opposite(), Direction::Down);
    /// assert_eq!(Direction::Left.opposite(), Direction::Right);
    /// ```
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Single-letter form used in compact move listings.
    pub fn to_char(self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// Column (`x`) and row (`y`) of a cell, both 0-based from the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

/// Converts a linear index into its board coordinate.
///
/// # Errors
/// Returns `PuzzleError::OutOfRange` if `index >= TILE_COUNT`.
///
/// # Examples
/// ```
/// use fifteen_solver::engine::{coordinate_of, Coordinate};
/// assert_eq!(coordinate_of(6).unwrap(), Coordinate { x: 2, y: 1 });
/// assert!(coordinate_of(16).is_err());
/// ```
pub fn coordinate_of(index: usize) -> Result<Coordinate, PuzzleError> {
    if index >= TILE_COUNT {
        return Err(PuzzleError::OutOfRange { index });
    }
    Ok(Coordinate {
        x: index % GRID_SIZE,
        y: index / GRID_SIZE,
    })
}

/// Index the blank would land on when sliding from `origin` in `direction`.
///
/// Returns `None` when the destination leaves the board or when a horizontal
/// move would wrap onto a neighbouring row.
pub fn destination(origin: usize, direction: Direction) -> Option<usize> {
    if origin >= TILE_COUNT {
        return None;
    }
    let target = origin as isize + direction.offset();
    if target < 0 || target >= TILE_COUNT as isize {
        return None;
    }
    let target = target as usize;
    match direction {
        Direction::Left | Direction::Right if target / GRID_SIZE != origin / GRID_SIZE => None,
        _ => Some(target),
    }
}

/// Whether the blank at `origin` can slide in `direction`.
///
/// Both the bounds check and the row-adjacency check must pass.
///
/// # Examples
/// ```
/// use fifteen_solver::engine::{is_valid_move, Direction};
/// assert!(is_valid_move(5, Direction::Left));
/// assert!(!is_valid_move(4, Direction::Left)); // would wrap onto row 0
/// assert!(!is_valid_move(15, Direction::Down));
/// ```
pub fn is_valid_move(origin: usize, direction: Direction) -> bool {
    destination(origin, direction).is_some()
}

/// Locates the blank in a tile sequence.
///
/// # Errors
/// Returns `PuzzleError::MalformedState` if no cell holds `BLANK`.
pub fn find_blank(tiles: &[u8]) -> Result<usize, PuzzleError> {
    tiles
        .iter()
        .position(|&t| t == BLANK)
        .ok_or_else(|| PuzzleError::malformed("no blank tile found"))
}

/// Counts unordered pairs of non-blank tiles that appear in the wrong relative order.
pub fn count_inversions(tiles: &[u8]) -> u32 {
    let mut inversions = 0;
    for i in 0..tiles.len() {
        if tiles[i] == BLANK {
            continue;
        }
        for j in (i + 1)..tiles.len() {
            if tiles[j] != BLANK && tiles[i] > tiles[j] {
                inversions += 1;
            }
        }
    }
    inversions
}

/// A tile arrangement on the 4×4 board.
///
/// Tiles are stored row-major; value `0` is the blank and every value in
/// `0..TILE_COUNT` appears exactly once. The blank index is cached. Equality and
/// hashing look at the tiles only, so two states are the same key whenever their
/// content matches.
#[derive(Clone, Copy, Debug)]
pub struct State {
    tiles: [u8; TILE_COUNT],
    blank: usize,
}

impl State {
    /// Builds a state from a full tile array, validating the permutation.
    ///
    /// # Errors
    /// Returns `PuzzleError::MalformedState` if a value is out of range, repeated,
    /// or the blank is missing.
    pub fn new(tiles: [u8; TILE_COUNT]) -> Result<Self, PuzzleError> {
        let mut seen = [false; TILE_COUNT];
        for &tile in &tiles {
            let value = tile as usize;
            if value >= TILE_COUNT {
                return Err(PuzzleError::malformed(format!(
                    "tile value {} is outside 0..{}",
                    tile, TILE_COUNT
                )));
            }
            if seen[value] {
                return Err(PuzzleError::malformed(format!(
                    "tile value {} appears more than once",
                    tile
                )));
            }
            seen[value] = true;
        }
        let blank = find_blank(&tiles)?;
        Ok(State { tiles, blank })
    }

    /// Builds a state from a slice that must hold exactly `TILE_COUNT` values.
    ///
    /// # Errors
    /// Returns `PuzzleError::MalformedState` on a length mismatch or an invalid permutation.
    pub fn from_slice(tiles: &[u8]) -> Result<Self, PuzzleError> {
        let array: [u8; TILE_COUNT] = tiles.try_into().map_err(|_| {
            PuzzleError::malformed(format!(
                "expected {} tiles, found {}",
                TILE_COUNT,
                tiles.len()
            ))
        })?;
        State::new(array)
    }

    /// The solved arrangement: `1..=15` in reading order, blank in the bottom-right corner.
    ///
    /// ```
    /// use fifteen_solver::engine::State;
    /// let goal = State::goal();
    /// assert!(goal.is_goal());
    /// assert_eq!(goal.blank(), 15);
    /// ```
    pub fn goal() -> Self {
        let mut tiles = [BLANK; TILE_COUNT];
        for (i, tile) in tiles.iter_mut().enumerate().take(TILE_COUNT - 1) {
            *tile = (i + 1) as u8;
        }
        State {
            tiles,
            blank: TILE_COUNT - 1,
        }
    }

    pub fn tiles(&self) -> &[u8; TILE_COUNT] {
        &self.tiles
    }

    /// Linear index of the blank.
    pub fn blank(&self) -> usize {
        self.blank
    }

    /// Returns the tile at `index`.
    ///
    /// # Panics
    /// Panics if `index >= TILE_COUNT`.
    pub fn tile_at(&self, index: usize) -> u8 {
        self.tiles[index]
    }

    /// Whether every non-blank tile sits on its sorted target position.
    pub fn is_goal(&self) -> bool {
        self.tiles[..TILE_COUNT - 1]
            .iter()
            .enumerate()
            .all(|(i, &tile)| tile as usize == i + 1)
    }

    /// Slides the blank one cell in `direction`, mutating this state.
    ///
    /// Callers that still need the previous arrangement must copy it first.
    ///
    /// # Returns
    /// The new index of the blank.
    ///
    /// # Errors
    /// Returns `PuzzleError::InvalidMove` if the blank cannot move that way.
    pub fn apply_move(&mut self, direction: Direction) -> Result<usize, PuzzleError> {
        let origin = self.blank;
        let target = destination(origin, direction)
            .ok_or(PuzzleError::InvalidMove { origin, direction })?;
        self.tiles.swap(origin, target);
        self.blank = target;
        Ok(target)
    }

    /// Directions the blank can currently slide in.
    pub fn valid_moves(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |&d| is_valid_move(self.blank, d))
    }

    /// Row of the blank, 0-based from the top.
    pub fn blank_row(&self) -> usize {
        self.blank / GRID_SIZE
    }

    /// Renders the board with row and column numbers, optionally highlighting one cell.
    ///
    /// The highlighted cell is drawn with ANSI reverse video, which is how the
    /// interactive player marks the tile that just moved.
    pub fn to_string_with_highlight(&self, highlight: Option<usize>) -> String {
        let mut output = String::from("   ");
        for c in 0..GRID_SIZE {
            output.push_str(&format!("{:>3}", c));
        }
        output.push('\n');

        for r in 0..GRID_SIZE {
            output.push_str(&format!("{:<3}", r));
            for c in 0..GRID_SIZE {
                let index = r * GRID_SIZE + c;
                let cell = match self.tiles[index] {
                    BLANK => "  .".to_string(),
                    tile => format!("{:>3}", tile),
                };
                if highlight == Some(index) {
                    output.push_str(&format!("\x1b[7m{}\x1b[0m", cell));
                } else {
                    output.push_str(&cell);
                }
            }
            if r + 1 < GRID_SIZE {
                output.push('\n');
            }
        }
        output
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.tiles == other.tiles
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tiles.hash(state);
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(None))
    }
}

/// Returns a copy of `state` with the blank moved in `direction`.
///
/// This is the move primitive for anything that manufactures states outside the
/// solver, such as the random-walk shuffler.
///
/// # Errors
/// Returns `PuzzleError::InvalidMove` if the blank cannot move that way.
///
/// # Examples
/// ```
/// use fifteen_solver::engine::{apply, Direction, State};
/// let goal = State::goal();
/// let moved = apply(&goal, Direction::Left).unwrap();
/// assert_eq!(moved.blank(), 14);
/// assert!(apply(&goal, Direction::Right).is_err());
/// ```
pub fn apply(state: &State, direction: Direction) -> Result<State, PuzzleError> {
    let mut next = *state;
    next.apply_move(direction)?;
    Ok(next)
}

/// Parity test for the even-width board.
///
/// A state is solvable iff `inversions + blank_row` is odd, with the blank row
/// counted from the top starting at 0.
///
/// ```
/// use fifteen_solver::engine::{is_solvable, State};
/// assert!(is_solvable(&State::goal()));
/// let swapped = State::new([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 15, 14, 0]).unwrap();
/// assert!(!is_solvable(&swapped));
/// ```
pub fn is_solvable(state: &State) -> bool {
    (count_inversions(&state.tiles) as usize + state.blank_row()) % 2 == 1
}
