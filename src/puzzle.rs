use rand::{seq::SliceRandom, Rng};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Direction the blank travels in a single slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Left,
    Right,
    Up,
    Down,
}

impl Move {
    /// Every move, in the order `PuzzleState::neighbors` tries them.
    pub const ALL: [Move; 4] = [Move::Left, Move::Right, Move::Up, Move::Down];

    /// `(row, col)` offset applied to the blank.
    pub fn as_offset(&self) -> (isize, isize) {
        match self {
            Move::Left => (0, -1),
            Move::Right => (0, 1),
            Move::Up => (-1, 0),
            Move::Down => (1, 0),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }

    /// The move that turns `from` into `to`, if the two boards are one slide
    /// apart.
    pub fn between(from: &PuzzleState, to: &PuzzleState) -> Option<Self> {
        Move::ALL
            .into_iter()
            .find(|&direction| from.slide(direction).as_ref() == Some(to))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Move::Up => "Up",
            Move::Left => "Left",
            Move::Down => "Down",
            Move::Right => "Right",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Board has no tiles")]
    Empty,
    #[error("Board is not square, expected {expected} tiles in row {row} but got {actual}")]
    NotSquare {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Tile out of range, expected a value below {bound} but got {value}")]
    TileOutOfRange { value: u32, bound: usize },
    #[error("Tile {0} appears more than once")]
    DuplicateTile(u32),
    #[error("Missing board dimension")]
    MissingDimension,
    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),
    #[error("Invalid tile count, expected {expected} tiles but got {actual}")]
    WrongTileCount { expected: usize, actual: usize },
}

/// One configuration of an n×n sliding tile puzzle.
///
/// Tiles are stored row-major; `0` is the blank. Every constructor checks that
/// the cells hold each of `0..n*n` exactly once, and every derived board
/// (neighbors, twin) is a fresh value produced by a single swap, so the
/// invariant holds for the lifetime of the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PuzzleState {
    size: usize,
    tiles: Vec<u32>,
    blank: usize,
}

impl PuzzleState {
    /// Builds a board from its rows, where `rows[row][col]` is the tile at
    /// `(row, col)`.
    pub fn new(rows: Vec<Vec<u32>>) -> Result<Self, BoardError> {
        let size = rows.len();
        let mut tiles = Vec::with_capacity(size * size);

        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != size {
                return Err(BoardError::NotSquare {
                    row,
                    expected: size,
                    actual: cells.len(),
                });
            }
            tiles.extend(cells);
        }

        Self::from_tiles(size, tiles)
    }

    fn from_tiles(size: usize, tiles: Vec<u32>) -> Result<Self, BoardError> {
        if size == 0 {
            return Err(BoardError::Empty);
        }
        let cells = size * size;
        if tiles.len() != cells {
            return Err(BoardError::WrongTileCount {
                expected: cells,
                actual: tiles.len(),
            });
        }

        let mut seen = vec![false; cells];
        let mut blank = 0;
        for (i, &value) in tiles.iter().enumerate() {
            let slot = seen
                .get_mut(value as usize)
                .ok_or(BoardError::TileOutOfRange {
                    value,
                    bound: cells,
                })?;
            if *slot {
                return Err(BoardError::DuplicateTile(value));
            }
            *slot = true;
            if value == 0 {
                blank = i;
            }
        }

        Ok(Self { size, tiles, blank })
    }

    /// The solved board: tiles in ascending order, blank last.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn goal(size: usize) -> Self {
        assert!(size > 0, "a board needs at least one cell");
        let cells = size * size;
        let tiles = (0..cells).map(|i| Self::goal_value(i, cells)).collect();

        Self {
            size,
            tiles,
            blank: cells - 1,
        }
    }

    fn goal_value(index: usize, cells: usize) -> u32 {
        if index + 1 == cells {
            0
        } else {
            (index + 1) as u32
        }
    }

    /// A uniformly random solvable board.
    pub fn shuffled<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let mut state = Self::goal(size);

        loop {
            state.tiles.shuffle(rng);
            state.blank = state.tiles.iter().position(|&t| t == 0).unwrap_or(0);

            if state.is_solvable() {
                return state;
            }
        }
    }

    /// The goal board after `moves` random slides of the blank, never undoing
    /// the previous slide. The optimal solution is at most `moves` long.
    pub fn scrambled<R: Rng + ?Sized>(size: usize, moves: usize, rng: &mut R) -> Self {
        let mut state = Self::goal(size);
        let mut last: Option<Move> = None;

        for _ in 0..moves {
            let candidates: Vec<(Move, PuzzleState)> = Move::ALL
                .into_iter()
                .filter(|direction| last != Some(direction.opposite()))
                .filter_map(|direction| state.slide(direction).map(|next| (direction, next)))
                .collect();

            let Some((direction, next)) = candidates.choose(rng).cloned() else {
                break;
            };
            state = next;
            last = Some(direction);
        }

        state
    }

    pub fn dimension(&self) -> usize {
        self.size
    }

    pub fn tile(&self, row: usize, col: usize) -> u32 {
        self.tiles[row * self.size + col]
    }

    /// Row-major tiles.
    pub fn tiles(&self) -> &[u32] {
        &self.tiles
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        self.tiles.chunks(self.size)
    }

    /// `(row, col)` of the blank.
    pub fn blank(&self) -> (usize, usize) {
        (self.blank / self.size, self.blank % self.size)
    }

    pub fn is_goal(&self) -> bool {
        let cells = self.tiles.len();
        self.tiles
            .iter()
            .enumerate()
            .all(|(i, &value)| value == Self::goal_value(i, cells))
    }

    /// Number of tiles out of place. The blank is never counted.
    pub fn hamming(&self) -> usize {
        self.tiles
            .iter()
            .enumerate()
            .filter(|&(i, &value)| value != 0 && value as usize != i + 1)
            .count()
    }

    /// Sum of the grid distances between each tile and its goal cell.
    pub fn manhattan(&self) -> usize {
        let mut distance = 0;
        for (i, &value) in self.tiles.iter().enumerate() {
            if value != 0 {
                let target = value as usize - 1;
                distance += (i / self.size).abs_diff(target / self.size);
                distance += (i % self.size).abs_diff(target % self.size);
            }
        }
        distance
    }

    /// Manhattan distance plus two moves for every tile that has to leave its
    /// goal row or column so the others in that line can pass each other.
    pub fn linear_conflict(&self) -> usize {
        let n = self.size;
        let mut conflicts = 0;

        for line in 0..n {
            // Goal columns of the tiles already sitting in their goal row.
            let in_row: Vec<usize> = (0..n)
                .map(|col| self.tile(line, col) as usize)
                .filter(|&value| value != 0 && (value - 1) / n == line)
                .map(|value| (value - 1) % n)
                .collect();
            conflicts += in_row.len() - longest_increasing_run(&in_row);

            let in_col: Vec<usize> = (0..n)
                .map(|row| self.tile(row, line) as usize)
                .filter(|&value| value != 0 && (value - 1) % n == line)
                .map(|value| (value - 1) / n)
                .collect();
            conflicts += in_col.len() - longest_increasing_run(&in_col);
        }

        self.manhattan() + 2 * conflicts
    }

    /// The board reached by sliding the blank one cell, if that stays on the
    /// grid.
    pub fn slide(&self, direction: Move) -> Option<Self> {
        let (dr, dc) = direction.as_offset();
        let (row, col) = self.blank();

        let row = row.checked_add_signed(dr).filter(|&r| r < self.size)?;
        let col = col.checked_add_signed(dc).filter(|&c| c < self.size)?;

        Some(self.swapped(self.blank, row * self.size + col))
    }

    /// Every board one slide away, in `Move::ALL` order.
    pub fn neighbors(&self) -> impl Iterator<Item = PuzzleState> + '_ {
        Move::ALL
            .into_iter()
            .filter_map(move |direction| self.slide(direction))
    }

    /// The board with the first two cells of the topmost row that holds no
    /// blank in those cells swapped: row 0, or row 1 when the blank sits in
    /// `[0][0]` or `[0][1]`. Exactly one of a board and its twin is solvable.
    ///
    /// Returns `None` for a 1×1 board, which has no pair of tiles to swap.
    pub fn twin(&self) -> Option<Self> {
        if self.size < 2 {
            return None;
        }

        let row = (0..self.size).find(|&row| self.tile(row, 0) != 0 && self.tile(row, 1) != 0)?;
        let first = row * self.size;

        Some(self.swapped(first, first + 1))
    }

    fn swapped(&self, a: usize, b: usize) -> Self {
        let mut tiles = self.tiles.clone();
        tiles.swap(a, b);

        let blank = if self.blank == a {
            b
        } else if self.blank == b {
            a
        } else {
            self.blank
        };

        Self {
            size: self.size,
            tiles,
            blank,
        }
    }

    /// Inversion-parity test for whether the goal is reachable.
    pub fn is_solvable(&self) -> bool {
        let inversions = Self::count_inversions(&self.tiles);
        let (empty_row, _) = self.blank();

        if self.size % 2 == 1 {
            // Odd width: every slide keeps the inversion parity
            inversions % 2 == 0
        } else {
            // Even width: vertical slides flip it along with the blank row
            (inversions + empty_row) % 2 == 1
        }
    }

    fn count_inversions(flattened: &[u32]) -> usize {
        flattened
            .iter()
            .enumerate()
            .filter(|&(_, &val)| val != 0)
            .map(|(i, &val)| {
                flattened[i + 1..]
                    .iter()
                    .filter(|&&next| next != 0 && next < val)
                    .count()
            })
            .sum()
    }

    /// Characters needed for the widest tile.
    pub fn tile_width(&self) -> usize {
        (self.tiles.len() - 1).to_string().len()
    }
}

/// Length of the longest strictly increasing subsequence of distinct values.
fn longest_increasing_run(values: &[usize]) -> usize {
    let mut tails: Vec<usize> = Vec::with_capacity(values.len());
    for &value in values {
        match tails.binary_search(&value) {
            Ok(_) => {}
            Err(i) if i == tails.len() => tails.push(value),
            Err(i) => tails[i] = value,
        }
    }
    tails.len()
}

/// Parses the dimension `n` followed by `n*n` tiles, all separated by
/// whitespace.
impl FromStr for PuzzleState {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut numbers = s.split_whitespace().map(|token| {
            token
                .parse::<u32>()
                .map_err(|_| BoardError::InvalidNumber(token.to_string()))
        });

        let size = numbers.next().ok_or(BoardError::MissingDimension)?? as usize;
        let tiles = numbers.collect::<Result<Vec<u32>, _>>()?;

        Self::from_tiles(size, tiles)
    }
}

impl fmt::Display for PuzzleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.tile_width();
        writeln!(f, "{}", self.size)?;
        for row in self.rows() {
            for &val in row {
                write!(f, " {:>width$}", val)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[&[u32]]) -> PuzzleState {
        PuzzleState::new(rows.iter().map(|row| row.to_vec()).collect()).unwrap()
    }

    #[test]
    fn goal_board_is_goal() {
        for size in 1..=5 {
            let goal = PuzzleState::goal(size);
            assert!(goal.is_goal());
            assert_eq!(goal.hamming(), 0);
            assert_eq!(goal.manhattan(), 0);
            assert_eq!(goal.linear_conflict(), 0);
            assert_eq!(goal.blank(), (size - 1, size - 1));
        }
    }

    #[test]
    fn distances_of_textbook_board() {
        let state = board(&[&[8, 1, 3], &[4, 0, 2], &[7, 6, 5]]);
        assert_eq!(state.hamming(), 5);
        assert_eq!(state.manhattan(), 10);
        assert!(!state.is_goal());
    }

    #[test]
    fn hamming_ignores_blank() {
        // Only the blank and 8 are swapped; 8 is the one tile out of place.
        let state = board(&[&[1, 2, 3], &[4, 5, 6], &[7, 0, 8]]);
        assert_eq!(state.hamming(), 1);
        assert_eq!(state.manhattan(), 1);
    }

    #[test]
    fn linear_conflict_counts_reversed_row() {
        let state = board(&[&[3, 2, 1], &[4, 5, 6], &[7, 8, 0]]);
        assert_eq!(state.manhattan(), 4);
        assert_eq!(state.linear_conflict(), 8);

        let state = board(&[&[2, 1], &[3, 0]]);
        assert_eq!(state.manhattan(), 2);
        assert_eq!(state.linear_conflict(), 4);
    }

    #[test]
    fn linear_conflict_uses_longest_run() {
        // 3 has to leave row 0, 1 and 2 are already ordered.
        let state = board(&[&[3, 1, 2], &[4, 5, 6], &[7, 8, 0]]);
        assert_eq!(state.manhattan(), 4);
        assert_eq!(state.linear_conflict(), 6);
    }

    #[test]
    fn neighbors_in_fixed_order() {
        let state = board(&[&[1, 2, 3], &[4, 0, 5], &[6, 7, 8]]);
        let neighbors: Vec<PuzzleState> = state.neighbors().collect();
        assert_eq!(
            neighbors,
            vec![
                board(&[&[1, 2, 3], &[0, 4, 5], &[6, 7, 8]]),
                board(&[&[1, 2, 3], &[4, 5, 0], &[6, 7, 8]]),
                board(&[&[1, 0, 3], &[4, 2, 5], &[6, 7, 8]]),
                board(&[&[1, 2, 3], &[4, 7, 5], &[6, 0, 8]]),
            ]
        );
    }

    #[test]
    fn neighbor_count_depends_on_blank_position() {
        let corner = PuzzleState::goal(3);
        assert_eq!(corner.neighbors().count(), 2);

        let edge = board(&[&[1, 2, 3], &[4, 5, 0], &[7, 8, 6]]);
        assert_eq!(edge.neighbors().count(), 3);

        let center = board(&[&[1, 2, 3], &[4, 0, 5], &[7, 8, 6]]);
        assert_eq!(center.neighbors().count(), 4);

        assert_eq!(PuzzleState::goal(1).neighbors().count(), 0);
    }

    #[test]
    fn slide_tracks_blank() {
        let state = PuzzleState::goal(3);
        assert_eq!(state.slide(Move::Right), None);
        assert_eq!(state.slide(Move::Down), None);

        let up = state.slide(Move::Up).unwrap();
        assert_eq!(up.blank(), (1, 2));
        assert_eq!(up.tile(2, 2), 6);
        assert_eq!(up.slide(Move::Down), Some(state.clone()));
        assert_eq!(Move::between(&state, &up), Some(Move::Up));
        assert_eq!(Move::between(&up, &state), Some(Move::Down));
        assert_eq!(Move::between(&state, &state), None);
    }

    #[test]
    fn twin_swaps_first_row_when_blank_elsewhere() {
        let state = board(&[&[1, 2, 3], &[4, 0, 5], &[6, 7, 8]]);
        assert_eq!(
            state.twin().unwrap(),
            board(&[&[2, 1, 3], &[4, 0, 5], &[6, 7, 8]])
        );

        // Blank in row 0 but past the first two cells.
        let state = board(&[&[1, 2, 0], &[3, 4, 5], &[6, 7, 8]]);
        assert_eq!(
            state.twin().unwrap(),
            board(&[&[2, 1, 0], &[3, 4, 5], &[6, 7, 8]])
        );
    }

    #[test]
    fn twin_moves_to_second_row_when_blank_leads() {
        let state = board(&[&[0, 1, 2], &[3, 4, 5], &[6, 7, 8]]);
        assert_eq!(
            state.twin().unwrap(),
            board(&[&[0, 1, 2], &[4, 3, 5], &[6, 7, 8]])
        );

        let state = board(&[&[1, 0, 2], &[3, 4, 5], &[6, 7, 8]]);
        assert_eq!(
            state.twin().unwrap(),
            board(&[&[1, 0, 2], &[4, 3, 5], &[6, 7, 8]])
        );

        let state = board(&[&[0, 1], &[2, 3]]);
        assert_eq!(state.twin().unwrap(), board(&[&[0, 1], &[3, 2]]));
    }

    #[test]
    fn twin_flips_solvability() {
        let state = board(&[&[8, 1, 3], &[4, 0, 2], &[7, 6, 5]]);
        let twin = state.twin().unwrap();
        assert_ne!(state.is_solvable(), twin.is_solvable());
        assert_eq!(twin.twin().unwrap(), state);
        assert_eq!(PuzzleState::goal(1).twin(), None);
    }

    #[test]
    fn solvability_parity() {
        assert!(PuzzleState::goal(4).is_solvable());
        assert!(!board(&[&[1, 2, 3], &[4, 5, 6], &[8, 7, 0]]).is_solvable());
        assert!(!board(&[&[0, 1], &[2, 3]]).is_solvable());
        assert!(board(&[&[1, 2], &[0, 3]]).is_solvable());
    }

    #[test]
    fn rejects_malformed_grids() {
        assert_eq!(PuzzleState::new(vec![]), Err(BoardError::Empty));
        assert_eq!(
            PuzzleState::new(vec![vec![1, 2], vec![0]]),
            Err(BoardError::NotSquare {
                row: 1,
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            PuzzleState::new(vec![vec![1, 2], vec![0, 4]]),
            Err(BoardError::TileOutOfRange { value: 4, bound: 4 })
        );
        assert_eq!(
            PuzzleState::new(vec![vec![1, 1], vec![0, 2]]),
            Err(BoardError::DuplicateTile(1))
        );
    }

    #[test]
    fn parses_text_format() {
        let state: PuzzleState = "3\n 0  1  3\n 4  2  5\n 7  8  6\n".parse().unwrap();
        assert_eq!(state, board(&[&[0, 1, 3], &[4, 2, 5], &[7, 8, 6]]));
        assert_eq!(state.blank(), (0, 0));

        assert_eq!("".parse::<PuzzleState>(), Err(BoardError::MissingDimension));
        assert_eq!(
            "2\n1 x\n0 3".parse::<PuzzleState>(),
            Err(BoardError::InvalidNumber("x".to_string()))
        );
        assert_eq!(
            "2\n1 2 0".parse::<PuzzleState>(),
            Err(BoardError::WrongTileCount {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!("0".parse::<PuzzleState>(), Err(BoardError::Empty));
    }

    #[test]
    fn display_pads_tiles() {
        let state = board(&[&[1, 2, 3, 4], &[5, 6, 7, 8], &[9, 10, 11, 12], &[13, 14, 15, 0]]);
        let text = state.to_string();
        assert_eq!(
            text,
            "4\n  1  2  3  4\n  5  6  7  8\n  9 10 11 12\n 13 14 15  0\n"
        );
        assert_eq!(text.parse::<PuzzleState>().unwrap(), state);
    }

    #[test]
    fn random_boards_are_solvable() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            assert!(PuzzleState::shuffled(3, &mut rng).is_solvable());
            let scrambled = PuzzleState::scrambled(4, 25, &mut rng);
            assert!(scrambled.is_solvable());
            assert!(scrambled.manhattan() <= 25);
        }
    }
}
