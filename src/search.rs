use crate::puzzle::PuzzleState;
use crate::solver::{Heuristic, Pruning, SolverConfig};
use std::cmp::Reverse;
use std::collections::{hash_map::Entry, BinaryHeap, HashMap};

/// A frontier entry. Nodes live in the arena of the `Search` that created
/// them and point at their predecessor by arena index, so a chain of parents
/// always leads back to the root of that search.
pub(crate) struct SearchNode {
    pub(crate) board: PuzzleState,
    pub(crate) moves: usize,
    pub(crate) heuristic: usize,
    pub(crate) parent: Option<usize>,
}

impl SearchNode {
    fn priority(&self) -> usize {
        self.moves + self.heuristic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Running,
    /// The frontier minimum after the step is a goal, at this arena index.
    Goal(usize),
    /// Nothing left to expand.
    Exhausted,
}

/// One best-first search over boards.
///
/// The heap is keyed on `(moves + h, h, arena index)` and popped smallest
/// first, so ties on estimated cost go to the node closer to the goal and
/// then to the one inserted first.
pub(crate) struct Search {
    nodes: Vec<SearchNode>,
    frontier: BinaryHeap<Reverse<(usize, usize, usize)>>,
    heuristic: Heuristic,
    pruning: Pruning,
    best_moves: HashMap<PuzzleState, usize>,
    expanded: u64,
}

impl Search {
    pub(crate) fn new(root: PuzzleState, config: SolverConfig) -> Self {
        let mut search = Self {
            nodes: Vec::new(),
            frontier: BinaryHeap::new(),
            heuristic: config.heuristic,
            pruning: config.pruning,
            best_moves: HashMap::new(),
            expanded: 0,
        };
        search.insert(root, 0, None);
        search
    }

    fn insert(&mut self, board: PuzzleState, moves: usize, parent: Option<usize>) {
        if self.pruning == Pruning::BestCost {
            match self.best_moves.entry(board.clone()) {
                Entry::Occupied(mut seen) => {
                    if *seen.get() <= moves {
                        return;
                    }
                    seen.insert(moves);
                }
                Entry::Vacant(slot) => {
                    slot.insert(moves);
                }
            }
        }

        let node = SearchNode {
            heuristic: self.heuristic.estimate(&board),
            board,
            moves,
            parent,
        };
        let index = self.nodes.len();
        self.frontier
            .push(Reverse((node.priority(), node.heuristic, index)));
        self.nodes.push(node);
    }

    /// Arena index of the frontier minimum, if that node holds a goal board.
    pub(crate) fn peek_goal(&self) -> Option<usize> {
        let &Reverse((_, _, index)) = self.frontier.peek()?;
        self.nodes[index].board.is_goal().then_some(index)
    }

    /// Removes the frontier minimum, queues its neighbors except the board it
    /// was reached from, and reports whether the new minimum is a goal.
    pub(crate) fn step(&mut self) -> Step {
        let Some(Reverse((_, _, index))) = self.frontier.pop() else {
            return Step::Exhausted;
        };
        self.expanded += 1;

        let node = &self.nodes[index];
        let moves = node.moves + 1;
        let previous = node.parent.map(|parent| &self.nodes[parent].board);
        let children: Vec<PuzzleState> = node
            .board
            .neighbors()
            .filter(|board| Some(board) != previous)
            .collect();

        for child in children {
            self.insert(child, moves, Some(index));
        }

        match self.peek_goal() {
            Some(goal) => Step::Goal(goal),
            None if self.frontier.is_empty() => Step::Exhausted,
            None => Step::Running,
        }
    }

    /// Boards from the root to `goal`, inclusive.
    pub(crate) fn path(&self, goal: usize) -> Vec<PuzzleState> {
        let mut path = Vec::with_capacity(self.nodes[goal].moves + 1);
        let mut cursor = Some(goal);
        while let Some(index) = cursor {
            let node = &self.nodes[index];
            path.push(node.board.clone());
            cursor = node.parent;
        }
        path.reverse();
        path
    }

    pub(crate) fn expanded(&self) -> u64 {
        self.expanded
    }

    pub(crate) fn generated(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn frontier_len(&self) -> usize {
        self.frontier.len()
    }
}
