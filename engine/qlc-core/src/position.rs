//! Board geometry and the classical-position collaborator trait.
//!
//! The quantum board never inspects chess rules itself. Everything it needs
//! from a single concrete position goes through [`ClassicalPosition`], so any
//! rules engine that can answer these questions can sit underneath it.
//!
//! # Coordinates
//!
//! Callers address squares by `(row, col)`:
//! ```text
//! row 0: a8 b8 c8 d8 e8 f8 g8 h8   <- Black's back rank
//! row 1: a7 ...
//!  ...
//! row 7: a1 b1 c1 d1 e1 f1 g1 h1   <- White's back rank
//!        col 0 .. col 7
//! ```
//! Internally squares are indexed `0..64` with `a1 = 0` and `h8 = 63`.

use std::fmt;

use thiserror::Error;

/// Number of files (and ranks) on the board.
pub const BOARD_WIDTH: u8 = 8;

/// Side to move / piece color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    pub const fn to_code(self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [Self; 6] = [
        Self::Pawn,
        Self::Knight,
        Self::Bishop,
        Self::Rook,
        Self::Queen,
        Self::King,
    ];

    /// Lowercase FEN letter.
    pub const fn fen_code(self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    pub const fn from_fen_code(code: char) -> Option<Self> {
        match code {
            'p' => Some(Self::Pawn),
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            'r' => Some(Self::Rook),
            'q' => Some(Self::Queen),
            'k' => Some(Self::King),
            _ => None,
        }
    }
}

/// A piece standing on a square: kind plus color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Occupant {
    pub kind: PieceKind,
    pub side: Side,
}

impl Occupant {
    pub const fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }

    /// FEN symbol: uppercase for White, lowercase for Black.
    pub fn symbol(self) -> char {
        let code = self.kind.fen_code();
        match self.side {
            Side::White => code.to_ascii_uppercase(),
            Side::Black => code,
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        let kind = PieceKind::from_fen_code(symbol.to_ascii_lowercase())?;
        let side = if symbol.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        Some(Self { kind, side })
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Board square, `a1 = 0` through `h8 = 63`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub const fn new(index: u8) -> Option<Self> {
        if index < BOARD_WIDTH * BOARD_WIDTH {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn from_file_rank(file: u8, rank: u8) -> Option<Self> {
        if file < BOARD_WIDTH && rank < BOARD_WIDTH {
            Some(Self(rank * BOARD_WIDTH + file))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// File index, 0 = a.
    #[inline]
    pub const fn file(self) -> u8 {
        self.0 % BOARD_WIDTH
    }

    /// Rank index, 0 = rank 1.
    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 / BOARD_WIDTH
    }

    pub const fn to_coord(self) -> Coord {
        Coord {
            row: (BOARD_WIDTH - 1 - self.rank()) as i32,
            col: self.file() as i32,
        }
    }

    /// Parse algebraic notation such as `e4`.
    pub fn parse(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank)
        {
            return None;
        }
        Self::from_file_rank(file as u8 - b'a', rank as u8 - b'1')
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file()) as char,
            (b'1' + self.rank()) as char
        )
    }
}

/// Caller-facing `(row, col)` coordinate. Row 0 is rank 8.
///
/// Components are signed so that off-board input from a UI can be represented
/// and rejected instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn to_square(self) -> Option<Square> {
        let width = i32::from(BOARD_WIDTH);
        if !(0..width).contains(&self.row) || !(0..width).contains(&self.col) {
            return None;
        }
        Square::from_file_rank(self.col as u8, (width - 1 - self.row) as u8)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A move described by squares only, independent of any rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoveSpec {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl fmt::Display for MoveSpec {
    /// UCI notation, e.g. `e7e8q`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.fen_code())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Ongoing,
}

impl GameResult {
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::WhiteWins => "1-0",
            Self::BlackWins => "0-1",
            Self::Draw => "1/2-1/2",
            Self::Ongoing => "*",
        };
        f.write_str(text)
    }
}

/// Errors raised by a rules-engine collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("Invalid canonical position key: {0}")]
    InvalidKey(String),
}

/// One concrete classical position, supplied by a rules engine.
///
/// `Clone` is the value-semantics copy used when a branch splits: two clones
/// must be able to diverge without sharing mutable state.
pub trait ClassicalPosition: Clone + fmt::Debug {
    /// Rules-engine move handle, only valid for the position that produced it.
    type Move: Clone + fmt::Debug;

    /// The standard starting position.
    fn initial() -> Self;

    fn piece_at(&self, square: Square) -> Option<Occupant>;

    fn side_to_move(&self) -> Side;

    /// Look up a legal move by squares. When `promotion` is `None` and the
    /// move is a pawn reaching the last rank, the rules engine's default
    /// promotion piece (queen) is used.
    fn find_legal_move(
        &self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Option<Self::Move>;

    fn is_capture(&self, mv: &Self::Move) -> bool;

    /// Apply a move handle produced by [`find_legal_move`](Self::find_legal_move).
    fn apply(&self, mv: &Self::Move) -> Self;

    /// Null half-turn: same placement, other side to move.
    ///
    /// Returns `None` when the rules engine cannot represent the result, e.g.
    /// the side to move is in check.
    fn pass(&self) -> Option<Self>;

    fn legal_moves(&self) -> Vec<MoveSpec>;

    /// Stable, total encoding of placement, side to move, castling rights and
    /// en-passant target. Equal keys mean interchangeable positions.
    fn canonical_key(&self) -> String;

    fn from_canonical_key(key: &str) -> Result<Self, PositionError>;

    fn outcome(&self) -> GameResult;
}
