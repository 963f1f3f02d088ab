use crate::game_state::board::Board;
use crate::game_state::chess_move::Move;
use crate::game_state::chess_rules::KNIGHT_OFFSETS;
use crate::game_state::piece::Piece;
use crate::move_generation::pseudo_legal::push_step;

pub fn generate_knight_moves(board: &Board, piece: &Piece, out: &mut Vec<Move>) {
    let from = piece.square();
    for (dr, dc) in KNIGHT_OFFSETS {
        if let Some(to) = from.offset(dr, dc) {
            push_step(board, piece, to, out);
        }
    }
}
