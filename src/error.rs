//! Error taxonomy shared by the engine, the heuristics and the solver.

use crate::engine::Direction;
use thiserror::Error;

/// Everything that can go wrong while building, moving or solving a puzzle.
///
/// Only [`PuzzleError::InvalidMove`] is part of normal control flow: the solver
/// hits it constantly at the board edges and simply skips that direction.
/// Every other variant aborts the operation it occurs in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    /// A linear index does not address a cell of the board.
    #[error("index {index} is outside the board")]
    OutOfRange { index: usize },

    /// The tile sequence is not a permutation with exactly one blank.
    #[error("malformed state: {reason}")]
    MalformedState { reason: String },

    /// The blank cannot slide in the requested direction.
    #[error("cannot move the blank {direction} from index {origin}")]
    InvalidMove { origin: usize, direction: Direction },

    /// The permutation has the wrong parity to ever reach the goal.
    #[error("starting permutation is not solvable")]
    Unsolvable,

    /// The caller-imposed expansion budget ran out before the frontier emptied.
    #[error("search stopped after expanding {expanded} nodes")]
    BudgetExhausted { expanded: u64 },
}

impl PuzzleError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        PuzzleError::MalformedState {
            reason: reason.into(),
        }
    }
}
