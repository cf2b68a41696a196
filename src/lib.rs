//! Optimal solver for the n×n sliding tile puzzle.
//!
//! [`PuzzleState`] models a board and its moves, [`Solver`] runs A* on the
//! board and on its twin side by side to tell an optimal solution apart from
//! an unsolvable board.

pub mod puzzle;
mod search;
pub mod solver;

pub use puzzle::{BoardError, Move, PuzzleState};
pub use solver::{Heuristic, Pruning, SearchStats, Solver, SolverConfig, SolverError};
