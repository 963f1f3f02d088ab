//! Pluggable board evaluation interfaces and baseline implementations.
//!
//! Search remains modular by delegating static position scoring to this trait,
//! allowing alternate heuristics to be swapped without altering search code.
//! All scorers compute a white-minus-black value and flip its sign for Black,
//! so `score(b, White) == -score(b, Black)` always holds.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;

pub const CHECKMATE_SCORE: i32 = 100_000;
/// Scores at or beyond this magnitude encode a forced mate.
pub const MATE_THRESHOLD: i32 = CHECKMATE_SCORE - 1000;

pub const ISOLATED_PAWN_PENALTY: i32 = 20;
pub const PASSED_PAWN_FACTOR: i32 = 10;
pub const PAWN_SHIELD_BONUS: i32 = 20;
pub const OPEN_FILE_NEAR_KING_PENALTY: i32 = 10;

pub trait BoardScorer: Send + Sync {
    /// Score from the perspective of `perspective`.
    fn score(&self, board: &Board, perspective: Color) -> i32;
}

/// Material + piece-square tables, read straight from the incremental
/// accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialScorer;

impl BoardScorer for MaterialScorer {
    fn score(&self, board: &Board, perspective: Color) -> i32 {
        perspective.sign() * board.evaluation_accumulator()
    }
}

/// Accumulator plus pawn structure and king safety.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScorer;

impl BoardScorer for StandardScorer {
    fn score(&self, board: &Board, perspective: Color) -> i32 {
        let white_minus_black = board.evaluation_accumulator()
            + pawn_structure(board, Color::White)
            - pawn_structure(board, Color::Black)
            + king_safety(board, Color::White)
            - king_safety(board, Color::Black);
        perspective.sign() * white_minus_black
    }
}

impl Board {
    /// Full static evaluation from `perspective`.
    pub fn evaluate_board(&self, perspective: Color) -> i32 {
        StandardScorer.score(self, perspective)
    }
}

/// Pawn squares of `color`.
fn pawn_squares(board: &Board, color: Color) -> impl Iterator<Item = Square> + '_ {
    board.pieces(color).iter().filter_map(move |id| {
        board
            .piece(*id)
            .filter(|p| p.kind == PieceKind::Pawn)
            .map(|p| p.square())
    })
}

fn pawns_per_file(board: &Board, color: Color) -> [u8; 8] {
    let mut files = [0u8; 8];
    for sq in pawn_squares(board, color) {
        files[sq.col as usize] += 1;
    }
    files
}

/// Isolated-pawn penalties and passed-pawn bonuses for one side.
pub fn pawn_structure(board: &Board, color: Color) -> i32 {
    let own_files = pawns_per_file(board, color);
    let enemy: Vec<Square> = pawn_squares(board, color.opposite()).collect();
    let mut score = 0;

    for sq in pawn_squares(board, color) {
        let col = sq.col as usize;
        let left = col.checked_sub(1).map_or(0, |c| own_files[c]);
        let right = own_files.get(col + 1).copied().unwrap_or(0);
        if left == 0 && right == 0 {
            score -= ISOLATED_PAWN_PENALTY;
        }

        let blocked = enemy.iter().any(|e| {
            e.col.abs_diff(sq.col) <= 1
                && match color {
                    Color::White => e.row < sq.row,
                    Color::Black => e.row > sq.row,
                }
        });
        if !blocked {
            let advance = i32::from(color.pawn_start_row().abs_diff(sq.row));
            score += advance * advance * PASSED_PAWN_FACTOR;
        }
    }
    score
}

/// Pawn shield and open-file terms, applied only when the king has left
/// the central files.
pub fn king_safety(board: &Board, color: Color) -> i32 {
    let Some(king) = board.king_square(color) else {
        return 0;
    };
    if (2..=5).contains(&king.col) {
        return 0;
    }

    let own_files = pawns_per_file(board, color);
    let mut score = 0;
    for dc in -1..=1 {
        let Some(file_sq) = king.offset(0, dc) else {
            continue;
        };
        if own_files[file_sq.col as usize] == 0 {
            score -= OPEN_FILE_NEAR_KING_PENALTY;
        }
        if let Some(shield) = king.offset(color.forward(), dc) {
            let covered = board
                .piece_on(shield)
                .is_some_and(|p| p.color == color && p.kind == PieceKind::Pawn);
            if covered {
                score += PAWN_SHIELD_BONUS;
            }
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::piece::Piece;

    fn board_with(pieces: &[(Color, PieceKind, u8, u8)]) -> Board {
        let mut board = Board::new();
        for (color, kind, row, col) in pieces {
            board
                .place_piece(Piece::new(*color, *kind, *row, *col))
                .expect("empty square");
        }
        board
    }

    #[test]
    fn starting_position_scores_zero() {
        let board = Board::starting_position();
        assert_eq!(board.evaluate_board(Color::White), 0);
        assert_eq!(MaterialScorer.score(&board, Color::Black), 0);
    }

    #[test]
    fn evaluation_is_zero_sum() {
        let board = board_with(&[
            (Color::White, PieceKind::King, 7, 6),
            (Color::White, PieceKind::Pawn, 6, 6),
            (Color::White, PieceKind::Pawn, 3, 2),
            (Color::Black, PieceKind::King, 0, 3),
            (Color::Black, PieceKind::Queen, 4, 4),
            (Color::Black, PieceKind::Pawn, 1, 7),
        ]);
        let scorers: [&dyn BoardScorer; 2] = [&StandardScorer, &MaterialScorer];
        for scorer in scorers {
            assert_eq!(
                scorer.score(&board, Color::White),
                -scorer.score(&board, Color::Black)
            );
        }
    }

    #[test]
    fn isolated_and_passed_pawns() {
        // Lone white pawn on d4: isolated, passed, advanced two rows.
        let board = board_with(&[(Color::White, PieceKind::Pawn, 4, 3)]);
        assert_eq!(
            pawn_structure(&board, Color::White),
            -ISOLATED_PAWN_PENALTY + 4 * PASSED_PAWN_FACTOR
        );

        // An enemy pawn ahead on an adjacent file stops it being passed.
        let board = board_with(&[
            (Color::White, PieceKind::Pawn, 4, 3),
            (Color::Black, PieceKind::Pawn, 1, 4),
        ]);
        assert_eq!(pawn_structure(&board, Color::White), -ISOLATED_PAWN_PENALTY);
    }

    #[test]
    fn black_passed_pawn_counts_rows_from_its_start() {
        let board = board_with(&[
            (Color::Black, PieceKind::Pawn, 5, 0),
            (Color::Black, PieceKind::Pawn, 5, 1),
        ]);
        assert_eq!(pawn_structure(&board, Color::Black), 2 * 16 * PASSED_PAWN_FACTOR);
    }

    #[test]
    fn castled_king_with_full_shield() {
        let board = board_with(&[
            (Color::White, PieceKind::King, 7, 6),
            (Color::White, PieceKind::Pawn, 6, 5),
            (Color::White, PieceKind::Pawn, 6, 6),
            (Color::White, PieceKind::Pawn, 6, 7),
        ]);
        assert_eq!(king_safety(&board, Color::White), 3 * PAWN_SHIELD_BONUS);
    }

    #[test]
    fn exposed_corner_king_is_penalised() {
        let board = board_with(&[(Color::Black, PieceKind::King, 0, 7)]);
        // Files g and h are both open; there is no i-file.
        assert_eq!(
            king_safety(&board, Color::Black),
            -2 * OPEN_FILE_NEAR_KING_PENALTY
        );
    }

    #[test]
    fn central_king_has_no_safety_term() {
        let board = board_with(&[(Color::White, PieceKind::King, 7, 4)]);
        assert_eq!(king_safety(&board, Color::White), 0);
    }
}
