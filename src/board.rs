use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

use rand::Rng;

use crate::data::{Cell, Pos, DIRECTIONS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardError {
    SizeTooSmall(u8),
    CellCnt { expected: usize, got: usize },
    TileOutOfRange(u16),
    DuplicateTile(u16),
    MultipleEmpty,
    NoEmpty,
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            BoardError::SizeTooSmall(size) => write!(f, "Board size {} is smaller than 2", size),
            BoardError::CellCnt { expected, got } => {
                write!(f, "Expected {} cells, got {}", expected, got)
            }
            BoardError::TileOutOfRange(id) => write!(f, "Tile id {} is out of range", id),
            BoardError::DuplicateTile(id) => write!(f, "Tile id {} appears more than once", id),
            BoardError::MultipleEmpty => write!(f, "More than one empty cell"),
            BoardError::NoEmpty => write!(f, "No empty cell"),
        }
    }
}

impl Error for BoardError {}

/// One configuration of the N×N sliding puzzle.
///
/// A board always holds every tile id in `1..N²-1` exactly once plus exactly
/// one empty cell - both constructors reject anything else. Boards are value
/// types: `clone` is a deep copy and equality is exact cell-by-cell
/// comparison, which is what the solver's duplicate detection relies on.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: u8,
    cells: Vec<Cell>, // row-major
}

impl Board {
    /// The canonical solved configuration: `1, 2, ..., N²-1` in row-major
    /// order with the empty cell bottom-right.
    pub fn goal(size: u8) -> Result<Board, BoardError> {
        if size < 2 {
            return Err(BoardError::SizeTooSmall(size));
        }
        let cell_cnt = usize::from(size) * usize::from(size);
        let mut cells = Vec::with_capacity(cell_cnt);
        for id in 1..cell_cnt {
            cells.push(Cell::Tile(id as u16));
        }
        cells.push(Cell::Empty);
        Ok(Board { size, cells })
    }

    /// An arbitrary snapshot, e.g. an edited board. Validates the invariant.
    pub fn from_cells(size: u8, cells: Vec<Cell>) -> Result<Board, BoardError> {
        if size < 2 {
            return Err(BoardError::SizeTooSmall(size));
        }
        let cell_cnt = usize::from(size) * usize::from(size);
        if cells.len() != cell_cnt {
            return Err(BoardError::CellCnt {
                expected: cell_cnt,
                got: cells.len(),
            });
        }
        // slot 0 tracks the empty cell, slots 1.. the tile ids
        let mut seen = vec![false; cell_cnt];
        for &cell in &cells {
            match cell {
                Cell::Empty => {
                    if seen[0] {
                        return Err(BoardError::MultipleEmpty);
                    }
                    seen[0] = true;
                }
                Cell::Tile(id) => {
                    if id == 0 || usize::from(id) >= cell_cnt {
                        return Err(BoardError::TileOutOfRange(id));
                    }
                    if seen[usize::from(id)] {
                        return Err(BoardError::DuplicateTile(id));
                    }
                    seen[usize::from(id)] = true;
                }
            }
        }
        if !seen[0] {
            return Err(BoardError::NoEmpty);
        }
        Ok(Board { size, cells })
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn cell_cnt(&self) -> usize {
        self.cells.len()
    }

    fn is_within_bounds(&self, pos: Pos) -> bool {
        let size = i32::from(self.size);
        pos.x >= 0 && pos.x < size && pos.y >= 0 && pos.y < size
    }

    fn index(&self, pos: Pos) -> usize {
        pos.y as usize * usize::from(self.size) + pos.x as usize
    }

    /// Cell contents, `None` out of bounds.
    pub fn tile_at(&self, pos: Pos) -> Option<Cell> {
        if !self.is_within_bounds(pos) {
            return None;
        }
        Some(self.cells[self.index(pos)])
    }

    /// Position of the given cell value. Row-major scan, values are unique
    /// per the invariant.
    pub fn coordinates_of(&self, cell: Cell) -> Option<Pos> {
        for (i, &c) in self.cells.iter().enumerate() {
            if c == cell {
                let size = usize::from(self.size);
                return Some(Pos::new((i % size) as i32, (i / size) as i32));
            }
        }
        None
    }

    /// Positions of the tiles that can slide into the empty cell, in the
    /// fixed up, right, down, left order (out-of-bounds neighbors skipped).
    /// Empty if the board somehow has no empty cell.
    pub fn available_moves(&self) -> Vec<Pos> {
        let mut moves = Vec::new();
        let empty = match self.coordinates_of(Cell::Empty) {
            Some(pos) => pos,
            None => return moves,
        };
        for &dir in &DIRECTIONS {
            let neighbor = empty + dir;
            if self.is_within_bounds(neighbor) {
                moves.push(neighbor);
            }
        }
        moves
    }

    /// Exchanges two cells in place, adjacency not required - this is the
    /// edit-mode mutation. False without touching the board if either
    /// position is out of bounds.
    pub fn swap(&mut self, a: Pos, b: Pos) -> bool {
        if !self.is_within_bounds(a) || !self.is_within_bounds(b) {
            return false;
        }
        let (ia, ib) = (self.index(a), self.index(b));
        self.cells.swap(ia, ib);
        true
    }

    /// Slides the tile at `pos` into the empty cell. False without touching
    /// the board unless `pos` is one of `available_moves`.
    pub fn move_tile(&mut self, pos: Pos) -> bool {
        if !self.available_moves().contains(&pos) {
            return false;
        }
        let empty = match self.coordinates_of(Cell::Empty) {
            Some(pos) => pos,
            None => return false,
        };
        self.swap(pos, empty)
    }

    /// Applies `moves` random legal moves. Only legal moves are used, so the
    /// result stays reachable from the starting configuration.
    pub fn scramble<R: Rng>(&mut self, moves: usize, rng: &mut R) {
        for _ in 0..moves {
            let available = self.available_moves();
            if available.is_empty() {
                return;
            }
            self.move_tile(available[rng.gen_range(0..available.len())]);
        }
    }

    /// Whether this configuration can reach the canonical goal via legal
    /// moves, by inversion-count parity. Odd sizes are solvable iff the
    /// inversion count is even, even sizes iff inversions plus the empty
    /// cell's row index is odd.
    pub fn is_solvable(&self) -> bool {
        let inversions = self.count_inversions();
        if self.size % 2 == 1 {
            inversions % 2 == 0
        } else {
            let empty_row = match self.coordinates_of(Cell::Empty) {
                Some(pos) => pos.y as usize,
                None => return false,
            };
            (inversions + empty_row) % 2 == 1
        }
    }

    fn count_inversions(&self) -> usize {
        let mut inversions = 0;
        for (i, &cell) in self.cells.iter().enumerate() {
            if let Cell::Tile(id) = cell {
                for &later in &self.cells[i + 1..] {
                    if let Cell::Tile(later_id) = later {
                        if later_id < id {
                            inversions += 1;
                        }
                    }
                }
            }
        }
        inversions
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let width = (self.cell_cnt() - 1).to_string().len();
        for row in self.cells.chunks(usize::from(self.size)) {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{:>width$}", cell.to_string())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Debug for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
