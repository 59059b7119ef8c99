//! # Fifteen Solver Library
//!
//! This library provides the board model for the 15-puzzle (the 4×4 sliding tile
//! puzzle) and an A* solver that finds minimal move sequences back to the goal
//! arrangement `1..=15` with the blank in the bottom-right corner.
//!
//! It is used by three binaries:
//! - `human_player`: Lets you slide tiles interactively, with undo and solver hints.
//! - `ai_solver`: Loads or generates a start state and prints every solution found.
//! - `heuristic_evaluator`: Compares the heuristics on seeded random instances.
//!
//! ## Modules
//! - `engine`: Board representation (`State`), move rules (`Direction`, `apply`)
//!   and the solvability check.
//! - `heuristics`: The four cost estimators and the `Heuristic` selector.
//! - `frontier`: Search nodes, the best-first frontier and the visited registry.
//! - `solver`: The A* loop (`Solver`), solution extraction and search statistics.
//! - `utils`: Parsing states from text and seeded random instance generators.
//! - `error`: The `PuzzleError` taxonomy.

pub mod engine;
pub mod error;
pub mod frontier;
pub mod heuristics;
pub mod solver;
pub mod utils;

pub use crate::error::PuzzleError;
pub use crate::heuristics::Heuristic;
pub use crate::solver::{solve, Solution, Solver};
