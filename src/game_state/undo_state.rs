use crate::game_state::chess_types::{CastlingRights, Color, Square};
use crate::game_state::piece::PieceId;

/// Single undo record for `make_move` / `undo_move`.
///
/// Attached to the move while it is applied; `undo_move` consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoState {
    pub mover: PieceId,
    pub prev_mover_has_moved: bool,
    /// Rook id and its previous `has_moved` flag, for castling moves.
    pub prev_rook: Option<(PieceId, bool)>,
    /// Index the captured piece held in its color's list.
    pub captured_list_index: Option<usize>,
    /// Arena id of the piece a pawn promoted into.
    pub promoted: Option<PieceId>,

    pub prev_en_passant: Option<Square>,
    pub prev_castling_rights: CastlingRights,
    pub prev_zobrist_key: u64,
    pub prev_eval: i32,
    pub prev_side_to_move: Color,
}

/// Undo record for a null move (side switch without moving a piece).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullMoveUndo {
    pub prev_side_to_move: Color,
    pub prev_en_passant: Option<Square>,
    pub prev_zobrist_key: u64,
}
