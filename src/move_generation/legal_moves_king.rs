use crate::game_state::board::Board;
use crate::game_state::chess_move::{Move, MoveKind};
use crate::game_state::chess_rules::{KING_HOME_COL, KING_OFFSETS};
use crate::game_state::chess_types::{Color, PieceKind, Square};
use crate::game_state::piece::Piece;
use crate::move_generation::legal_move_checks::{is_king_in_check, is_square_attacked};
use crate::move_generation::pseudo_legal::push_step;

pub fn generate_king_moves(board: &Board, piece: &Piece, out: &mut Vec<Move>) {
    let from = piece.square();
    for (dr, dc) in KING_OFFSETS {
        if let Some(to) = from.offset(dr, dc) {
            push_step(board, piece, to, out);
        }
    }
    generate_castling_moves(board, piece, out);
}

/// Castling candidates: king unmoved on its home square and not in check,
/// an unmoved rook of the same color in the corner, empty squares between
/// them, and no attacked square on the king's path.
fn generate_castling_moves(board: &Board, piece: &Piece, out: &mut Vec<Move>) {
    let color = piece.color;
    let row = color.back_row();
    if piece.has_moved || piece.square() != Square::new(row, KING_HOME_COL) {
        return;
    }
    if is_king_in_check(board, color) {
        return;
    }

    let enemy = color.opposite();
    let rook_ready = |col: u8| {
        board.piece_on(Square::new(row, col)).is_some_and(|p| {
            p.color == color && p.kind == PieceKind::Rook && !p.has_moved
        })
    };

    if rook_ready(7) && row_empty(board, row, &[5, 6]) && row_safe(board, row, &[5, 6], enemy) {
        out.push(Move::new(
            piece.square(),
            Square::new(row, 6),
            MoveKind::Castling {
                rook_from_col: 7,
                rook_to_col: 5,
            },
        ));
    }
    if rook_ready(0) && row_empty(board, row, &[1, 2, 3]) && row_safe(board, row, &[3, 2], enemy)
    {
        out.push(Move::new(
            piece.square(),
            Square::new(row, 2),
            MoveKind::Castling {
                rook_from_col: 0,
                rook_to_col: 3,
            },
        ));
    }
}

fn row_empty(board: &Board, row: u8, cols: &[u8]) -> bool {
    cols.iter().all(|c| board.piece_at(Square::new(row, *c)).is_none())
}

fn row_safe(board: &Board, row: u8, cols: &[u8], enemy: Color) -> bool {
    cols.iter()
        .all(|c| !is_square_attacked(board, Square::new(row, *c), enemy))
}
