//! Bishop, rook, and queen rays.

use crate::game_state::board::Board;
use crate::game_state::chess_move::Move;
use crate::game_state::chess_rules::{BISHOP_DIRECTIONS, QUEEN_DIRECTIONS, ROOK_DIRECTIONS};
use crate::game_state::piece::Piece;
use crate::move_generation::pseudo_legal::{push_step, Landing};

pub fn generate_bishop_moves(board: &Board, piece: &Piece, out: &mut Vec<Move>) {
    generate_ray_moves(board, piece, &BISHOP_DIRECTIONS, out);
}

pub fn generate_rook_moves(board: &Board, piece: &Piece, out: &mut Vec<Move>) {
    generate_ray_moves(board, piece, &ROOK_DIRECTIONS, out);
}

pub fn generate_queen_moves(board: &Board, piece: &Piece, out: &mut Vec<Move>) {
    generate_ray_moves(board, piece, &QUEEN_DIRECTIONS, out);
}

/// Walk each direction until the edge or the first occupied square, which
/// is captured when it holds an enemy.
fn generate_ray_moves(board: &Board, piece: &Piece, directions: &[(i32, i32)], out: &mut Vec<Move>) {
    let from = piece.square();
    for (dr, dc) in directions {
        let mut cursor = from;
        while let Some(to) = cursor.offset(*dr, *dc) {
            if push_step(board, piece, to, out) != Landing::Empty {
                break;
            }
            cursor = to;
        }
    }
}
