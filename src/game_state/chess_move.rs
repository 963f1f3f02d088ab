use std::fmt;

use crate::game_state::chess_types::{PieceKind, Square};
use crate::game_state::piece::PieceId;
use crate::game_state::undo_state::UndoState;

/// Shape of a move beyond its from/to squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Normal,
    /// King move of two files; the rook on the mover's back row travels
    /// between the given columns.
    Castling { rook_from_col: u8, rook_to_col: u8 },
    /// Pawn capture whose victim is not on the destination square.
    EnPassant { captured: Square },
    Promotion(PieceKind),
}

/// A candidate or applied move.
///
/// A move is single-use: `make_move` attaches its undo record and
/// `undo_move` takes it back off. Applying an already-applied move is an
/// error, as is undoing one that was never applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
    /// Captured piece, filled at generation time and refreshed on apply.
    pub captured: Option<PieceId>,
    pub(crate) undo: Option<UndoState>,
}

impl Move {
    pub const fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Self {
            from,
            to,
            kind,
            captured: None,
            undo: None,
        }
    }

    pub fn with_capture(mut self, captured: Option<PieceId>) -> Self {
        self.captured = captured;
        self
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some() || matches!(self.kind, MoveKind::EnPassant { .. })
    }

    #[inline]
    pub fn promotion(&self) -> Option<PieceKind> {
        match self.kind {
            MoveKind::Promotion(kind) => Some(kind),
            _ => None,
        }
    }

    #[inline]
    pub fn is_castling(&self) -> bool {
        matches!(self.kind, MoveKind::Castling { .. })
    }

    /// Captures and promotions; the move set searched in quiescence.
    #[inline]
    pub fn is_tactical(&self) -> bool {
        self.is_capture() || self.promotion().is_some()
    }

    #[inline]
    pub fn is_applied(&self) -> bool {
        self.undo.is_some()
    }

    /// True when both moves describe the same action on the board,
    /// regardless of generation metadata or applied state.
    #[inline]
    pub fn same_action(&self, other: &Move) -> bool {
        self.from == other.from && self.to == other.to && self.kind == other.kind
    }

    /// Copy without undo data, suitable for storing in search tables.
    pub fn detached(&self) -> Move {
        Move {
            undo: None,
            ..self.clone()
        }
    }
}

impl fmt::Display for Move {
    /// Long algebraic notation, for example `e2e4` or `e7e8q`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion() {
            write!(f, "{}", kind.symbol())?;
        }
        Ok(())
    }
}
