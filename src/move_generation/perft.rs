//! Perft node counting for move generator regression checks.

use crate::errors::ChessResult;
use crate::game_state::board::Board;
use crate::game_state::chess_move::{Move, MoveKind};
use crate::game_state::chess_types::Color;
use crate::move_generation::legal_move_checks::is_king_in_check;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
    }

    fn count_leaf(&mut self, mv: &Move, gives_check: bool) {
        self.nodes += 1;
        if mv.is_capture() {
            self.captures += 1;
        }
        if matches!(mv.kind, MoveKind::EnPassant { .. }) {
            self.en_passant += 1;
        }
        if mv.is_castling() {
            self.castles += 1;
        }
        if mv.promotion().is_some() {
            self.promotions += 1;
        }
        if gives_check {
            self.checks += 1;
        }
    }
}

/// Count leaf nodes of the legal move tree `depth` plies deep, with `color`
/// to move first. The board is restored before returning.
pub fn perft(board: &mut Board, color: Color, depth: u8) -> ChessResult<PerftCounts> {
    if depth == 0 {
        return Ok(PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        });
    }

    let mut total = PerftCounts::default();
    for mut mv in board.legal_moves(color)? {
        board.make_move(&mut mv)?;
        if depth == 1 {
            let gives_check = is_king_in_check(board, color.opposite());
            total.count_leaf(&mv, gives_check);
        } else {
            total.merge(perft(board, color.opposite(), depth - 1)?);
        }
        board.undo_move(&mut mv)?;
    }
    Ok(total)
}

/// Per-root-move node counts, useful when bisecting a perft mismatch.
pub fn perft_divide(board: &mut Board, color: Color, depth: u8) -> ChessResult<Vec<(String, u64)>> {
    let mut out = Vec::new();
    if depth == 0 {
        return Ok(out);
    }
    for mut mv in board.legal_moves(color)? {
        board.make_move(&mut mv)?;
        let counts = perft(board, color.opposite(), depth - 1)?;
        board.undo_move(&mut mv)?;
        out.push((mv.to_string(), counts.nodes));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::PieceKind;
    use crate::game_state::piece::Piece;

    #[test]
    fn perft_depth_zero_counts_single_node() {
        let mut board = Board::starting_position();
        let counts = perft(&mut board, Color::White, 0).expect("perft should run");
        assert_eq!(counts.nodes, 1);
    }

    #[test]
    fn starting_position_counts() {
        let mut board = Board::starting_position();
        let expected = [20u64, 400, 8902];
        for (idx, nodes) in expected.iter().enumerate() {
            let counts =
                perft(&mut board, Color::White, idx as u8 + 1).expect("perft should run");
            assert_eq!(counts.nodes, *nodes, "depth {}", idx + 1);
        }
        assert_eq!(board, Board::starting_position());
    }

    #[test]
    fn starting_position_depth_three_leaf_metrics() {
        let mut board = Board::starting_position();
        let counts = perft(&mut board, Color::White, 3).expect("perft should run");
        assert_eq!(counts.captures, 34);
        assert_eq!(counts.checks, 12);
        assert_eq!(counts.castles, 0);
    }

    #[test]
    fn divide_sums_to_total() {
        let mut board = Board::starting_position();
        let split = perft_divide(&mut board, Color::White, 2).expect("divide should run");
        assert_eq!(split.len(), 20);
        assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), 400);
    }

    #[test]
    fn castling_position_counts_both_castles() {
        let mut board = Board::new();
        for (color, kind, row, col) in [
            (Color::White, PieceKind::King, 7, 4),
            (Color::White, PieceKind::Rook, 7, 0),
            (Color::White, PieceKind::Rook, 7, 7),
            (Color::Black, PieceKind::King, 0, 4),
        ] {
            board
                .place_piece(Piece::new(color, kind, row, col))
                .expect("empty square");
        }
        let counts = perft(&mut board, Color::White, 1).expect("perft should run");
        assert_eq!(counts.castles, 2);
        // Five king steps, two castles, ten squares for the a-rook, nine for the h-rook.
        assert_eq!(counts.nodes, 26);
    }
}
