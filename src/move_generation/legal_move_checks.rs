use crate::game_state::board::Board;
use crate::game_state::chess_rules::{BISHOP_DIRECTIONS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRECTIONS};
use crate::game_state::chess_types::*;

/// False when `color` has no king on the board.
#[inline]
pub fn is_king_in_check(board: &Board, color: Color) -> bool {
    let Some(king_sq) = board.king_square(color) else {
        return false;
    };
    is_square_attacked(board, king_sq, color.opposite())
}

pub fn is_square_attacked(board: &Board, square: Square, attacker_color: Color) -> bool {
    let holds = |sq: Square, kinds: &[PieceKind]| {
        board
            .piece_on(sq)
            .is_some_and(|p| p.color == attacker_color && kinds.contains(&p.kind))
    };

    // An attacking pawn sits one step behind the target from its own side.
    let back = -attacker_color.forward();
    for dc in [-1, 1] {
        if let Some(sq) = square.offset(back, dc) {
            if holds(sq, &[PieceKind::Pawn]) {
                return true;
            }
        }
    }

    for (dr, dc) in KNIGHT_OFFSETS {
        if let Some(sq) = square.offset(dr, dc) {
            if holds(sq, &[PieceKind::Knight]) {
                return true;
            }
        }
    }

    for (dr, dc) in KING_OFFSETS {
        if let Some(sq) = square.offset(dr, dc) {
            if holds(sq, &[PieceKind::King]) {
                return true;
            }
        }
    }

    ray_hits(board, square, &ROOK_DIRECTIONS, attacker_color, PieceKind::Rook)
        || ray_hits(board, square, &BISHOP_DIRECTIONS, attacker_color, PieceKind::Bishop)
}

/// Cast rays from `square`; the first occupied square on each ray attacks
/// it when it is an enemy `slider` or queen.
fn ray_hits(
    board: &Board,
    square: Square,
    directions: &[(i32, i32)],
    attacker_color: Color,
    slider: PieceKind,
) -> bool {
    for (dr, dc) in directions {
        let mut cursor = square;
        while let Some(sq) = cursor.offset(*dr, *dc) {
            if let Some(p) = board.piece_on(sq) {
                if p.color == attacker_color && (p.kind == slider || p.kind == PieceKind::Queen) {
                    return true;
                }
                break;
            }
            cursor = sq;
        }
    }
    false
}

impl Board {
    #[inline]
    pub fn is_king_in_check(&self, color: Color) -> bool {
        is_king_in_check(self, color)
    }

    #[inline]
    pub fn is_square_attacked(&self, row: u8, col: u8, by_color: Color) -> bool {
        is_square_attacked(self, Square::new(row, col), by_color)
    }
}
