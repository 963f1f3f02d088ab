//! Per-piece pseudo-legal move generation.
//!
//! Movement rules are dispatched through a table indexed by
//! [`PieceKind::index`]. Generated moves respect board edges, blocking, and
//! capture rules but are not filtered for king safety.

use crate::game_state::board::Board;
use crate::game_state::chess_move::{Move, MoveKind};
use crate::game_state::chess_types::{PieceKind, Square};
use crate::game_state::piece::{Piece, PieceId};
use crate::move_generation::legal_moves_king::generate_king_moves;
use crate::move_generation::legal_moves_knight::generate_knight_moves;
use crate::move_generation::legal_moves_pawn::generate_pawn_moves;
use crate::move_generation::legal_moves_sliders::{
    generate_bishop_moves, generate_queen_moves, generate_rook_moves,
};

pub type PieceMoveGenerator = fn(&Board, &Piece, &mut Vec<Move>);

const GENERATORS: [PieceMoveGenerator; 6] = [
    generate_pawn_moves,
    generate_knight_moves,
    generate_bishop_moves,
    generate_rook_moves,
    generate_queen_moves,
    generate_king_moves,
];

#[inline]
pub fn generator_for(kind: PieceKind) -> PieceMoveGenerator {
    GENERATORS[kind.index()]
}

impl Board {
    /// Append the pseudo-legal moves of piece `id` to `out`. Pieces that are
    /// no longer on the board produce nothing.
    pub fn pseudo_legal_moves(&self, id: PieceId, out: &mut Vec<Move>) {
        if !self.is_live(id) {
            return;
        }
        let piece = self.arena[id];
        generator_for(piece.kind)(self, &piece, out);
    }
}

/// Result of looking at a single destination square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Landing {
    Empty,
    Capture,
    Blocked,
}

/// Push a normal move (quiet or capture) onto `to` when the square is empty
/// or holds an enemy, and report what was found there.
pub(crate) fn push_step(board: &Board, piece: &Piece, to: Square, out: &mut Vec<Move>) -> Landing {
    match board.piece_at(to) {
        None => {
            out.push(Move::new(piece.square(), to, MoveKind::Normal));
            Landing::Empty
        }
        Some(target) if board.arena[target].color != piece.color => {
            out.push(Move::new(piece.square(), to, MoveKind::Normal).with_capture(Some(target)));
            Landing::Capture
        }
        Some(_) => Landing::Blocked,
    }
}
