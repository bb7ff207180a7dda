//! Standard chess rules for the qlc quantum board
//!
//! [`StandardPosition`] wraps a [`chess::Board`] and implements
//! [`ClassicalPosition`], so the quantum board can ask it about legality,
//! captures, null half-turns and terminal status.
//!
//! # Usage
//!
//! ```rust
//! use qlc_chess::{StandardBoard, Coord};
//! use qlc_core::QuantumConfig;
//!
//! let mut board = StandardBoard::new(QuantumConfig::default().with_seed(7));
//!
//! // Pawn e2 to e3 and e4 at once
//! assert!(board.apply_split(Coord::new(6, 4), Coord::new(5, 4), Coord::new(4, 4)));
//! assert_eq!(board.branch_count(), 2);
//! ```

use std::str::FromStr;

use chess::{Board, BoardStatus, ChessMove, Color, File, MoveGen, Piece, Rank};
use qlc_config::{load_config, EngineConfig};
use qlc_core::{
    ClassicalPosition, GameResult, MoveSpec, Occupant, PieceKind, PositionError, QuantumBoard,
    QuantumConfig, Side, Square,
};
use rand::Rng;
use tracing::{debug, info};

pub use qlc_core::Coord;

/// Quantum board over standard chess positions.
pub type StandardBoard = QuantumBoard<StandardPosition>;

/// Number of FEN fields that identify a position: placement, side to move,
/// castling rights and en-passant target. Move counters are not part of it.
const KEY_FIELDS: usize = 4;

fn to_chess_square(square: Square) -> chess::Square {
    chess::Square::make_square(
        Rank::from_index(usize::from(square.rank())),
        File::from_index(usize::from(square.file())),
    )
}

fn from_chess_square(square: chess::Square) -> Option<Square> {
    Square::new(square.to_int())
}

fn to_side(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

fn to_kind(piece: Piece) -> PieceKind {
    match piece {
        Piece::Pawn => PieceKind::Pawn,
        Piece::Knight => PieceKind::Knight,
        Piece::Bishop => PieceKind::Bishop,
        Piece::Rook => PieceKind::Rook,
        Piece::Queen => PieceKind::Queen,
        Piece::King => PieceKind::King,
    }
}

fn to_piece(kind: PieceKind) -> Piece {
    match kind {
        PieceKind::Pawn => Piece::Pawn,
        PieceKind::Knight => Piece::Knight,
        PieceKind::Bishop => Piece::Bishop,
        PieceKind::Rook => Piece::Rook,
        PieceKind::Queen => Piece::Queen,
        PieceKind::King => Piece::King,
    }
}

/// One classical chess position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StandardPosition(Board);

impl StandardPosition {
    /// Parse a FEN string. Move counters, if present, are ignored.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < KEY_FIELDS {
            return Err(PositionError::InvalidKey(fen.to_string()));
        }
        let full = format!("{} 0 1", fields[..KEY_FIELDS].join(" "));
        Board::from_str(&full)
            .map(Self)
            .map_err(|_| PositionError::InvalidKey(fen.to_string()))
    }

    pub fn board(&self) -> &Board {
        &self.0
    }

    /// Whether the side to move is in check.
    pub fn in_check(&self) -> bool {
        self.0.checkers().popcnt() > 0
    }
}

impl Default for StandardPosition {
    fn default() -> Self {
        Self(Board::default())
    }
}

impl From<Board> for StandardPosition {
    fn from(board: Board) -> Self {
        Self(board)
    }
}

impl ClassicalPosition for StandardPosition {
    type Move = ChessMove;

    fn initial() -> Self {
        Self::default()
    }

    fn piece_at(&self, square: Square) -> Option<Occupant> {
        let square = to_chess_square(square);
        let piece = self.0.piece_on(square)?;
        let color = self.0.color_on(square)?;
        Some(Occupant::new(to_kind(piece), to_side(color)))
    }

    fn side_to_move(&self) -> Side {
        to_side(self.0.side_to_move())
    }

    fn find_legal_move(
        &self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Option<ChessMove> {
        let source = to_chess_square(from);
        let dest = to_chess_square(to);

        let last_rank = to.rank() == 0 || to.rank() == 7;
        let promotion = match self.0.piece_on(source) {
            Some(Piece::Pawn) if last_rank => Some(promotion.map_or(Piece::Queen, to_piece)),
            _ => None,
        };

        let mv = ChessMove::new(source, dest, promotion);
        self.0.legal(mv).then_some(mv)
    }

    fn is_capture(&self, mv: &ChessMove) -> bool {
        let dest = mv.get_dest();
        if self.0.piece_on(dest).is_some() {
            return true;
        }
        // En passant: a pawn changing file onto an empty square
        self.0.piece_on(mv.get_source()) == Some(Piece::Pawn)
            && mv.get_source().get_file() != dest.get_file()
    }

    fn apply(&self, mv: &ChessMove) -> Self {
        Self(self.0.make_move_new(*mv))
    }

    fn pass(&self) -> Option<Self> {
        self.0.null_move().map(Self)
    }

    fn legal_moves(&self) -> Vec<MoveSpec> {
        MoveGen::new_legal(&self.0)
            .filter_map(|mv| {
                Some(MoveSpec {
                    from: from_chess_square(mv.get_source())?,
                    to: from_chess_square(mv.get_dest())?,
                    promotion: mv.get_promotion().map(to_kind),
                })
            })
            .collect()
    }

    fn canonical_key(&self) -> String {
        let fen = self.0.to_string();
        fen.split_whitespace()
            .take(KEY_FIELDS)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn from_canonical_key(key: &str) -> Result<Self, PositionError> {
        Self::from_fen(key)
    }

    fn outcome(&self) -> GameResult {
        match self.0.status() {
            BoardStatus::Ongoing => GameResult::Ongoing,
            BoardStatus::Stalemate => GameResult::Draw,
            BoardStatus::Checkmate => match self.0.side_to_move() {
                Color::White => GameResult::BlackWins,
                Color::Black => GameResult::WhiteWins,
            },
        }
    }
}

/// Engine settings from the central configuration. Draws a fresh seed when
/// none is configured.
pub fn quantum_config(engine: &EngineConfig) -> QuantumConfig {
    let seed = match engine.seed {
        Some(seed) => seed,
        None => {
            let seed = rand::thread_rng().gen();
            info!("No engine seed configured, using {}", seed);
            seed
        }
    };
    QuantumConfig::default()
        .with_max_branches(engine.max_branches)
        .with_epsilon(engine.epsilon)
        .with_seed(seed)
}

/// Standard board at the starting position, configured from config.toml.
pub fn board_from_config() -> StandardBoard {
    let config = load_config();
    debug!(
        "Engine config: max_branches={}, epsilon={:e}, log_level={}",
        config.engine.max_branches, config.engine.epsilon, config.common.log_level
    );
    StandardBoard::new(quantum_config(&config.engine))
}
