//! Core domain types for Hitwicket.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// Side of the board a piece belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Owner {
    /// Player A (home rank is row 0, moves first).
    A,
    /// Player B (home rank is row 4).
    B,
}

impl Owner {
    /// Returns the opposing side.
    pub fn opponent(self) -> Self {
        match self {
            Owner::A => Owner::B,
            Owner::B => Owner::A,
        }
    }
}

/// The five piece kinds each side starts with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum PieceKind {
    /// First pawn.
    P1,
    /// Second pawn.
    P2,
    /// Third pawn.
    P3,
    /// Orthogonal hero.
    H1,
    /// Diagonal hero.
    H2,
}

impl PieceKind {
    /// Returns the movement class of this kind.
    pub fn class(self) -> PieceClass {
        match self {
            PieceKind::P1 | PieceKind::P2 | PieceKind::P3 => PieceClass::Pawn,
            PieceKind::H1 => PieceClass::Orthogonal,
            PieceKind::H2 => PieceClass::Diagonal,
        }
    }
}

/// Movement class shared by one or more piece kinds.
///
/// | class      | distance | directions      |
/// |------------|----------|-----------------|
/// | Pawn       | 1        | all eight       |
/// | Orthogonal | 2        | `L`, `R`, `F`, `B` |
/// | Diagonal   | 2        | `FL`, `FR`, `BL`, `BR` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceClass {
    /// One step in any direction.
    Pawn,
    /// Two steps along a row or column.
    Orthogonal,
    /// Two steps along a diagonal.
    Diagonal,
}

impl PieceClass {
    /// Number of cells travelled by one move.
    pub fn distance(self) -> usize {
        match self {
            PieceClass::Pawn => 1,
            PieceClass::Orthogonal | PieceClass::Diagonal => 2,
        }
    }

    /// Checks whether pieces of this class may travel in `direction`.
    pub fn allows(self, direction: Direction) -> bool {
        match self {
            PieceClass::Pawn => true,
            PieceClass::Orthogonal => !direction.is_diagonal(),
            PieceClass::Diagonal => direction.is_diagonal(),
        }
    }
}

/// Direction of travel, in board coordinates for both sides.
///
/// Forward decreases the row and back increases it. Left decreases the
/// column and right increases it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Direction {
    /// Left.
    #[strum(serialize = "L")]
    #[serde(rename = "L")]
    Left,
    /// Right.
    #[strum(serialize = "R")]
    #[serde(rename = "R")]
    Right,
    /// Forward.
    #[strum(serialize = "F")]
    #[serde(rename = "F")]
    Forward,
    /// Back.
    #[strum(serialize = "B")]
    #[serde(rename = "B")]
    Back,
    /// Forward-left.
    #[strum(serialize = "FL")]
    #[serde(rename = "FL")]
    ForwardLeft,
    /// Forward-right.
    #[strum(serialize = "FR")]
    #[serde(rename = "FR")]
    ForwardRight,
    /// Back-left.
    #[strum(serialize = "BL")]
    #[serde(rename = "BL")]
    BackLeft,
    /// Back-right.
    #[strum(serialize = "BR")]
    #[serde(rename = "BR")]
    BackRight,
}

impl Direction {
    /// Unit `(row, col)` offset for one step in this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Forward => (-1, 0),
            Direction::Back => (1, 0),
            Direction::ForwardLeft => (-1, -1),
            Direction::ForwardRight => (-1, 1),
            Direction::BackLeft => (1, -1),
            Direction::BackRight => (1, 1),
        }
    }

    /// Returns true for the four compound directions.
    pub fn is_diagonal(self) -> bool {
        let (dr, dc) = self.delta();
        dr != 0 && dc != 0
    }
}

/// A piece on the board, identified by its owner and kind.
///
/// The text form is `"<owner>-<kind>"`, e.g. `"A-H1"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("{owner}-{kind}")]
#[serde(into = "String", try_from = "String")]
pub struct Piece {
    /// Side the piece belongs to.
    pub owner: Owner,
    /// Kind of the piece.
    pub kind: PieceKind,
}

impl Piece {
    /// Creates a new piece.
    pub fn new(owner: Owner, kind: PieceKind) -> Self {
        Self { owner, kind }
    }
}

/// Error parsing a piece string.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Invalid piece: {:?}", input)]
pub struct PieceParseError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for Piece {
    type Err = PieceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PieceParseError {
            input: s.to_string(),
        };
        let (owner, kind) = s.split_once('-').ok_or_else(err)?;
        Ok(Piece {
            owner: owner.parse().map_err(|_| err())?,
            kind: kind.parse().map_err(|_| err())?,
        })
    }
}

impl From<Piece> for String {
    fn from(piece: Piece) -> Self {
        piece.to_string()
    }
}

impl TryFrom<String> for Piece {
    type Error = PieceParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
