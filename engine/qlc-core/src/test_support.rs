//! Minimal rules engine for exercising the quantum board without real chess.
//!
//! Any piece of the side to move may jump to any square not held by its own
//! side; landing on an enemy piece captures it. A side without a king has
//! lost. An optional token makes otherwise identical positions distinct.
//!
//! [`FlickerPosition`] is a deliberately inconsistent engine whose answer
//! about one square alternates between calls, so measurements never settle.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::position::{
    ClassicalPosition, GameResult, MoveSpec, Occupant, PieceKind, PositionError, Side, Square,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ToyPosition {
    pieces: BTreeMap<Square, Occupant>,
    side: Side,
    token: String,
    can_pass: bool,
}

pub(crate) fn sq(name: &str) -> Square {
    Square::parse(name).expect("valid square name")
}

impl ToyPosition {
    pub(crate) fn empty(side: Side) -> Self {
        Self {
            pieces: BTreeMap::new(),
            side,
            token: String::new(),
            can_pass: true,
        }
    }

    pub(crate) fn with_token(token: &str) -> Self {
        let mut position = Self::empty(Side::White);
        position.token = token.to_string();
        position
    }

    pub(crate) fn with_piece(mut self, square: &str, symbol: char) -> Self {
        let occupant = Occupant::from_symbol(symbol).expect("valid piece symbol");
        self.pieces.insert(sq(square), occupant);
        self
    }

    pub(crate) fn blocking_pass(mut self) -> Self {
        self.can_pass = false;
        self
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }
}

impl ClassicalPosition for ToyPosition {
    type Move = MoveSpec;

    fn initial() -> Self {
        Self::empty(Side::White)
            .with_piece("e1", 'K')
            .with_piece("b1", 'N')
            .with_piece("e8", 'k')
            .with_piece("g8", 'n')
    }

    fn piece_at(&self, square: Square) -> Option<Occupant> {
        self.pieces.get(&square).copied()
    }

    fn side_to_move(&self) -> Side {
        self.side
    }

    fn find_legal_move(
        &self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Option<MoveSpec> {
        let mover = self.pieces.get(&from)?;
        if mover.side != self.side || from == to {
            return None;
        }
        if self.pieces.get(&to).is_some_and(|target| target.side == self.side) {
            return None;
        }
        Some(MoveSpec {
            from,
            to,
            promotion,
        })
    }

    fn is_capture(&self, mv: &MoveSpec) -> bool {
        self.pieces
            .get(&mv.to)
            .is_some_and(|target| target.side != self.side)
    }

    fn apply(&self, mv: &MoveSpec) -> Self {
        let mut next = self.clone();
        if let Some(mut piece) = next.pieces.remove(&mv.from) {
            if let Some(kind) = mv.promotion {
                piece.kind = kind;
            }
            next.pieces.insert(mv.to, piece);
        }
        next.side = self.side.opponent();
        next
    }

    fn pass(&self) -> Option<Self> {
        if !self.can_pass {
            return None;
        }
        let mut next = self.clone();
        next.side = self.side.opponent();
        Some(next)
    }

    fn legal_moves(&self) -> Vec<MoveSpec> {
        let mut moves = Vec::new();
        for (&from, piece) in &self.pieces {
            if piece.side != self.side {
                continue;
            }
            for index in 0..64u8 {
                let Some(to) = Square::new(index) else {
                    continue;
                };
                if let Some(mv) = self.find_legal_move(from, to, None) {
                    moves.push(mv);
                }
            }
        }
        moves
    }

    fn canonical_key(&self) -> String {
        let pieces: Vec<String> = self
            .pieces
            .iter()
            .map(|(square, piece)| format!("{}@{}", piece.symbol(), square))
            .collect();
        format!(
            "{}|{}|{}|{}",
            self.token,
            self.side.to_code(),
            pieces.join(","),
            if self.can_pass { "p" } else { "-" }
        )
    }

    fn from_canonical_key(key: &str) -> Result<Self, PositionError> {
        let invalid = || PositionError::InvalidKey(key.to_string());
        let fields: Vec<&str> = key.split('|').collect();
        if fields.len() != 4 {
            return Err(invalid());
        }
        let side = match fields[1] {
            "w" => Side::White,
            "b" => Side::Black,
            _ => return Err(invalid()),
        };
        let mut position = Self::empty(side);
        position.token = fields[0].to_string();
        position.can_pass = fields[3] == "p";
        for entry in fields[2].split(',').filter(|entry| !entry.is_empty()) {
            let (symbol, square) = entry.split_once('@').ok_or_else(invalid)?;
            let symbol = symbol.chars().next().ok_or_else(invalid)?;
            let occupant = Occupant::from_symbol(symbol).ok_or_else(invalid)?;
            let square = Square::parse(square).ok_or_else(invalid)?;
            position.pieces.insert(square, occupant);
        }
        Ok(position)
    }

    fn outcome(&self) -> GameResult {
        let has_king = |side: Side| {
            self.pieces
                .values()
                .any(|piece| piece.kind == PieceKind::King && piece.side == side)
        };
        match (has_king(Side::White), has_king(Side::Black)) {
            (true, false) => GameResult::WhiteWins,
            (false, true) => GameResult::BlackWins,
            _ => GameResult::Ongoing,
        }
    }
}

/// Square whose occupant flickers in [`FlickerPosition`].
pub(crate) const FLICKER_SQUARE: &str = "d4";

/// Position that reports an own pawn on [`FLICKER_SQUARE`] on every other
/// query. The query counter is shared by all clones, so however the branches
/// are partitioned the next classification disagrees again.
#[derive(Debug, Clone)]
pub(crate) struct FlickerPosition {
    token: u32,
    side: Side,
    queries: Rc<Cell<u64>>,
}

impl FlickerPosition {
    pub(crate) fn with_token(token: u32, queries: &Rc<Cell<u64>>) -> Self {
        Self {
            token,
            side: Side::White,
            queries: Rc::clone(queries),
        }
    }

    fn flipped(&self) -> Self {
        let mut next = self.clone();
        next.side = self.side.opponent();
        next
    }
}

impl ClassicalPosition for FlickerPosition {
    type Move = MoveSpec;

    fn initial() -> Self {
        Self::with_token(0, &Rc::new(Cell::new(0)))
    }

    fn piece_at(&self, square: Square) -> Option<Occupant> {
        if square != sq(FLICKER_SQUARE) {
            return None;
        }
        let n = self.queries.get();
        self.queries.set(n + 1);
        (n % 2 == 0).then(|| Occupant::new(PieceKind::Pawn, self.side))
    }

    fn side_to_move(&self) -> Side {
        self.side
    }

    fn find_legal_move(
        &self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Option<MoveSpec> {
        (from != to).then_some(MoveSpec {
            from,
            to,
            promotion,
        })
    }

    fn is_capture(&self, _mv: &MoveSpec) -> bool {
        false
    }

    fn apply(&self, _mv: &MoveSpec) -> Self {
        self.flipped()
    }

    fn pass(&self) -> Option<Self> {
        Some(self.flipped())
    }

    fn legal_moves(&self) -> Vec<MoveSpec> {
        Vec::new()
    }

    fn canonical_key(&self) -> String {
        format!("flicker|{}|{}", self.token, self.side.to_code())
    }

    fn from_canonical_key(key: &str) -> Result<Self, PositionError> {
        Err(PositionError::InvalidKey(key.to_string()))
    }

    fn outcome(&self) -> GameResult {
        GameResult::Ongoing
    }
}
