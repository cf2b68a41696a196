use crate::puzzle::{Move, PuzzleState};
use crate::search::{Search, Step};
use log::{debug, info, trace};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

const PROGRESS_INTERVAL: u64 = 100_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Lower bound on the moves left, used to order the frontier. All of them are
/// admissible, so every choice yields an optimal solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heuristic {
    /// Tiles out of place
    Hamming,
    /// Sum of tile distances to their goal cells
    #[default]
    Manhattan,
    /// Manhattan plus linear conflicts
    LinearConflict,
}

impl Heuristic {
    pub fn estimate(self, board: &PuzzleState) -> usize {
        match self {
            Heuristic::Hamming => board.hamming(),
            Heuristic::Manhattan => board.manhattan(),
            Heuristic::LinearConflict => board.linear_conflict(),
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Heuristic::Hamming => write!(f, "hamming"),
            Heuristic::Manhattan => write!(f, "manhattan"),
            Heuristic::LinearConflict => write!(f, "linear-conflict"),
        }
    }
}

impl FromStr for Heuristic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "hamming" => Ok(Heuristic::Hamming),
            "manhattan" => Ok(Heuristic::Manhattan),
            "linear-conflict" | "linear" => Ok(Heuristic::LinearConflict),
            _ => Err(format!(
                "Unknown heuristic: '{}'. Valid options: hamming, manhattan, linear-conflict",
                s
            )),
        }
    }
}

/// Which freshly generated boards are dropped before they reach the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pruning {
    /// Only the board the expanded node was reached from. Earlier ancestors
    /// may be generated again.
    #[default]
    Predecessor,
    /// Additionally any board already generated with the same or fewer moves.
    BestCost,
}

impl fmt::Display for Pruning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pruning::Predecessor => write!(f, "predecessor"),
            Pruning::BestCost => write!(f, "best-cost"),
        }
    }
}

impl FromStr for Pruning {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "predecessor" | "parent" => Ok(Pruning::Predecessor),
            "best-cost" | "closed" => Ok(Pruning::BestCost),
            _ => Err(format!(
                "Unknown pruning: '{}'. Valid options: predecessor, best-cost",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolverConfig {
    pub heuristic: Heuristic,
    pub pruning: Pruning,
}

/// Counters from a finished solve.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Nodes removed from the original board's frontier
    pub expanded: u64,
    /// Nodes created for the original board
    pub generated: usize,
    /// Nodes removed from the twin's frontier
    pub twin_expanded: u64,
    /// Nodes created for the twin
    pub twin_generated: usize,
    pub elapsed: Duration,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expanded {} / generated {} (twin: expanded {} / generated {}) in {:.2?}",
            self.expanded, self.generated, self.twin_expanded, self.twin_generated, self.elapsed
        )
    }
}

enum Outcome {
    Solved(usize),
    Unsolvable,
}

/// Optimal solver for the n-puzzle that also decides solvability.
///
/// Two A* searches advance in lockstep, one from the initial board and one
/// from its [twin](PuzzleState::twin). Exactly one of the two boards can reach
/// the goal, so whichever search gets there first settles the question: the
/// original finishing yields an optimal solution, the twin finishing proves
/// the initial board unsolvable.
pub struct Solver {
    solution: Option<Vec<PuzzleState>>,
    stats: SearchStats,
}

impl Solver {
    /// Solves `initial` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvalidArgument`] if no board is given or the
    /// board is smaller than 2×2.
    pub fn new(initial: Option<PuzzleState>) -> Result<Self, SolverError> {
        let initial = initial.ok_or(SolverError::InvalidArgument("no initial board"))?;
        Self::with_config(initial, SolverConfig::default())
    }

    /// # Errors
    ///
    /// Returns [`SolverError::InvalidArgument`] if the board is smaller than
    /// 2×2, which leaves no twin to race against.
    pub fn with_config(initial: PuzzleState, config: SolverConfig) -> Result<Self, SolverError> {
        let twin = initial
            .twin()
            .ok_or(SolverError::InvalidArgument("board must be at least 2x2"))?;

        info!(
            "Solving {0}x{0} board with {1} heuristic and {2} pruning",
            initial.dimension(),
            config.heuristic,
            config.pruning
        );
        let start = Instant::now();

        let mut search = Search::new(initial, config);
        let mut twin_search = Search::new(twin, config);
        let outcome = race(&mut search, &mut twin_search);

        let stats = SearchStats {
            expanded: search.expanded(),
            generated: search.generated(),
            twin_expanded: twin_search.expanded(),
            twin_generated: twin_search.generated(),
            elapsed: start.elapsed(),
        };

        let solution = match outcome {
            Outcome::Solved(goal) => {
                let path = search.path(goal);
                info!("Solved in {} moves, {}", path.len() - 1, stats);
                Some(path)
            }
            Outcome::Unsolvable => {
                info!("Board is unsolvable, {}", stats);
                None
            }
        };

        Ok(Self { solution, stats })
    }

    pub fn is_unsolvable(&self) -> bool {
        self.solution.is_none()
    }

    /// Length of the optimal solution, `None` if the board is unsolvable.
    pub fn min_moves(&self) -> Option<usize> {
        self.solution.as_ref().map(|path| path.len() - 1)
    }

    /// Boards from the initial board to the goal, both included.
    pub fn solution(&self) -> Option<&[PuzzleState]> {
        self.solution.as_deref()
    }

    /// The blank's slides along the solution.
    pub fn solution_moves(&self) -> Option<Vec<Move>> {
        let path = self.solution.as_ref()?;
        path.windows(2)
            .map(|pair| Move::between(&pair[0], &pair[1]))
            .collect()
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }
}

/// Advances both searches one expansion at a time until one of them has a
/// goal at the front of its frontier. The twin is checked first, so a tie
/// counts as unsolvable.
fn race(search: &mut Search, twin: &mut Search) -> Outcome {
    if let Some(goal) = search.peek_goal() {
        return Outcome::Solved(goal);
    }
    if twin.peek_goal().is_some() {
        trace!("Twin starts at the goal");
        return Outcome::Unsolvable;
    }

    let mut twin_running = true;
    loop {
        let step = search.step();
        let twin_step = if twin_running {
            twin.step()
        } else {
            Step::Exhausted
        };

        if let Step::Goal(_) = twin_step {
            trace!("Twin reached the goal after {} expansions", twin.expanded());
            return Outcome::Unsolvable;
        }
        match step {
            Step::Goal(goal) => return Outcome::Solved(goal),
            Step::Exhausted => {
                trace!("Frontier exhausted without reaching the goal");
                return Outcome::Unsolvable;
            }
            Step::Running => {}
        }
        if twin_running && twin_step == Step::Exhausted {
            trace!("Twin frontier exhausted, continuing alone");
            twin_running = false;
        }

        if search.expanded() % PROGRESS_INTERVAL == 0 {
            debug!(
                "Expanded {} nodes, frontier holds {} (twin: {} / {})",
                search.expanded(),
                search.frontier_len(),
                twin.expanded(),
                twin.frontier_len()
            );
        }
    }
}
