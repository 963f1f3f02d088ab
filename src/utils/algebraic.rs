//! Square and move conversions for algebraic coordinates.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and board
//! squares, and resolves long algebraic move text (`e2e4`, `e7e8q`) against
//! the legal moves of a position.

use crate::errors::ChessResult;
use crate::game_state::board::Board;
use crate::game_state::chess_move::Move;
use crate::game_state::chess_types::{PieceKind, Square};

/// Convert algebraic notation (for example: "e4") to a board square.
#[inline]
pub fn algebraic_to_square(square: &str) -> Result<Square, String> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(format!("Invalid algebraic square: {square}"));
    }

    let file = bytes[0];
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) {
        return Err(format!("Invalid algebraic file: {}", file as char));
    }
    if !(b'1'..=b'8').contains(&rank) {
        return Err(format!("Invalid algebraic rank: {}", rank as char));
    }

    Ok(Square::new(b'8' - rank, file - b'a'))
}

#[inline]
pub fn square_to_algebraic(square: Square) -> String {
    square.to_string()
}

fn promotion_from_char(ch: char) -> Option<PieceKind> {
    match ch.to_ascii_lowercase() {
        'q' => Some(PieceKind::Queen),
        'r' => Some(PieceKind::Rook),
        'b' => Some(PieceKind::Bishop),
        'n' => Some(PieceKind::Knight),
        _ => None,
    }
}

/// Resolve long algebraic text to a legal move of the piece on the source
/// square. Malformed text, an empty source, or an illegal move give `None`.
pub fn long_algebraic_to_move(board: &mut Board, lan: &str) -> ChessResult<Option<Move>> {
    let lan = lan.trim();
    if !(4..=5).contains(&lan.len()) || !lan.is_ascii() {
        return Ok(None);
    }
    let (Ok(from), Ok(to)) = (algebraic_to_square(&lan[0..2]), algebraic_to_square(&lan[2..4]))
    else {
        return Ok(None);
    };
    let promotion = match lan.chars().nth(4) {
        Some(ch) => match promotion_from_char(ch) {
            Some(kind) => Some(kind),
            None => return Ok(None),
        },
        None => None,
    };
    let Some(id) = board.piece_at(from) else {
        return Ok(None);
    };
    board.legal_move_or_none(id, to, promotion)
}
