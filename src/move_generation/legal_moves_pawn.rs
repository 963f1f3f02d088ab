use crate::game_state::board::Board;
use crate::game_state::chess_move::{Move, MoveKind};
use crate::game_state::chess_types::{Color, PieceKind, Square};
use crate::game_state::piece::{Piece, PieceId};

pub fn generate_pawn_moves(board: &Board, piece: &Piece, out: &mut Vec<Move>) {
    let color = piece.color;
    let from = piece.square();
    let forward = color.forward();

    if let Some(one) = from.offset(forward, 0) {
        if board.piece_at(one).is_none() {
            push_pawn_move(color, from, one, None, out);

            if from.row == color.pawn_start_row() && !piece.has_moved {
                if let Some(two) = one.offset(forward, 0) {
                    if board.piece_at(two).is_none() {
                        out.push(Move::new(from, two, MoveKind::Normal));
                    }
                }
            }
        }
    }

    for dc in [-1, 1] {
        let Some(to) = from.offset(forward, dc) else {
            continue;
        };
        match board.piece_at(to) {
            Some(target) if board.arena[target].color != color => {
                push_pawn_move(color, from, to, Some(target), out);
            }
            Some(_) => {}
            None if board.en_passant() == Some(to) => {
                let victim_square = Square::new(from.row, to.col);
                let victim = board
                    .piece_at(victim_square)
                    .filter(|id| {
                        let p = &board.arena[*id];
                        p.color != color && p.kind == PieceKind::Pawn
                    });
                if victim.is_some() {
                    out.push(
                        Move::new(
                            from,
                            to,
                            MoveKind::EnPassant {
                                captured: victim_square,
                            },
                        )
                        .with_capture(victim),
                    );
                }
            }
            None => {}
        }
    }
}

/// Push a pawn move, expanding arrivals on the last rank into the four
/// promotion choices.
fn push_pawn_move(
    color: Color,
    from: Square,
    to: Square,
    captured: Option<PieceId>,
    out: &mut Vec<Move>,
) {
    if to.row == color.promotion_row() {
        for kind in PieceKind::PROMOTIONS {
            out.push(Move::new(from, to, MoveKind::Promotion(kind)).with_capture(captured));
        }
    } else {
        out.push(Move::new(from, to, MoveKind::Normal).with_capture(captured));
    }
}
