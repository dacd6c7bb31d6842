//! The 5x5 board and its coordinates.

use crate::types::{Owner, Piece, PieceKind};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of rows and columns on the board.
pub const BOARD_SIZE: usize = 5;

/// Left-to-right order of each side's home rank.
pub const HOME_RANK: [PieceKind; BOARD_SIZE] = [
    PieceKind::P1,
    PieceKind::H1,
    PieceKind::H2,
    PieceKind::P2,
    PieceKind::P3,
];

/// A cell address on the board.
///
/// Only built through [`Coord::new`] or [`Coord::step`], so it always lies
/// on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("({row},{col})")]
pub struct Coord {
    row: usize,
    col: usize,
}

impl Coord {
    /// Creates a coordinate, or `None` if it lies off the board.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < BOARD_SIZE && col < BOARD_SIZE).then_some(Self { row, col })
    }

    /// Row index, 0 is player A's home rank.
    pub fn row(self) -> usize {
        self.row
    }

    /// Column index, 0 is the leftmost column.
    pub fn col(self) -> usize {
        self.col
    }

    /// Moves `distance` times along the unit offset `(dr, dc)`.
    ///
    /// Returns `None` when the destination is off the board.
    pub fn step(self, (dr, dc): (isize, isize), distance: usize) -> Option<Self> {
        let distance = isize::try_from(distance).ok()?;
        let row = self.row.checked_add_signed(dr.checked_mul(distance)?)?;
        let col = self.col.checked_add_signed(dc.checked_mul(distance)?)?;
        Self::new(row, col)
    }

    /// Iterates every cell in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Coord { row, col }))
    }
}

/// Fixed 5x5 grid of optional pieces.
///
/// Serializes as a 5x5 array of `null` or `"<owner>-<kind>"` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates the canonical start layout.
    ///
    /// Row 0 holds A's pieces `P1 H1 H2 P2 P3`, row 4 holds B's in the
    /// same order, rows 1-3 are empty.
    #[instrument]
    pub fn new() -> Self {
        let mut board = Self::empty();
        for (col, kind) in HOME_RANK.into_iter().enumerate() {
            board.cells[0][col] = Some(Piece::new(Owner::A, kind));
            board.cells[BOARD_SIZE - 1][col] = Some(Piece::new(Owner::B, kind));
        }
        board
    }

    /// Creates a board with no pieces.
    pub fn empty() -> Self {
        Self {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Gets the content of a cell.
    pub fn get(&self, at: Coord) -> Option<Piece> {
        self.cells[at.row][at.col]
    }

    /// Writes a piece (or clears the cell with `None`).
    ///
    /// Returns whatever the cell held before.
    pub fn place(&mut self, at: Coord, piece: Option<Piece>) -> Option<Piece> {
        std::mem::replace(&mut self.cells[at.row][at.col], piece)
    }

    /// Finds the cell holding `owner`'s piece of the given kind.
    pub fn locate(&self, owner: Owner, kind: PieceKind) -> Option<Coord> {
        let wanted = Piece::new(owner, kind);
        Coord::all().find(|&at| self.get(at) == Some(wanted))
    }

    /// Counts the pieces `owner` has left.
    pub fn count_pieces(&self, owner: Owner) -> usize {
        self.pieces().filter(|(_, p)| p.owner == owner).count()
    }

    /// Iterates occupied cells in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Coord, Piece)> + '_ {
        Coord::all().filter_map(|at| self.get(at).map(|p| (at, p)))
    }

    /// Returns the raw rows.
    pub fn rows(&self) -> &[[Option<Piece>; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Some(piece) => piece.to_string(),
                    None => " .  ".to_string(),
                })
                .collect();
            write!(f, "{}", line.join(" "))?;
            if i + 1 < BOARD_SIZE {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
