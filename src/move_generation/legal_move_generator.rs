//! Legal move generation by make / test / undo filtering.
//!
//! Every pseudo-legal candidate is applied, the mover's king is tested for
//! check, and the move is undone. The board is restored exactly after each
//! call. Errors only surface when a board contract is broken mid-filter.

use crate::errors::ChessResult;
use crate::game_state::board::Board;
use crate::game_state::chess_move::Move;
use crate::game_state::chess_types::*;
use crate::game_state::piece::PieceId;
use crate::move_generation::legal_move_checks::is_king_in_check;

impl Board {
    /// All legal moves of `color`, grouped by piece in list order.
    pub fn legal_moves(&mut self, color: Color) -> ChessResult<Vec<Move>> {
        self.filtered_moves(color, |_| true)
    }

    /// Legal captures and promotions of `color`.
    pub fn captures(&mut self, color: Color) -> ChessResult<Vec<Move>> {
        self.filtered_moves(color, Move::is_tactical)
    }

    /// Legal moves of a single piece; empty when the piece is not on the
    /// board any more.
    pub fn legal_moves_of_piece(&mut self, id: PieceId) -> ChessResult<Vec<Move>> {
        let mut candidates = Vec::new();
        self.pseudo_legal_moves(id, &mut candidates);
        let Some(color) = self.piece(id).map(|p| p.color) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::with_capacity(candidates.len());
        self.retain_legal(color, candidates, &mut out)?;
        Ok(out)
    }

    /// The legal move of piece `id` landing on `to`, or `None`.
    ///
    /// With `promotion` set, only that promotion matches; otherwise the first
    /// generated candidate wins, which is the queen for promotions.
    pub fn legal_move_or_none(
        &mut self,
        id: PieceId,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> ChessResult<Option<Move>> {
        let moves = self.legal_moves_of_piece(id)?;
        Ok(moves.into_iter().find(|mv| {
            mv.to == to && (promotion.is_none() || mv.promotion() == promotion)
        }))
    }

    pub fn has_legal_move(&mut self, color: Color) -> ChessResult<bool> {
        let ids = self.pieces(color).to_vec();
        let mut candidates = Vec::with_capacity(32);
        for id in ids {
            candidates.clear();
            self.pseudo_legal_moves(id, &mut candidates);
            for mut mv in candidates.drain(..) {
                if self.is_legal_candidate(color, &mut mv)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Game status with `color` to move.
    pub fn evaluate_game_state(&mut self, color: Color) -> ChessResult<GameStatus> {
        if self.has_legal_move(color)? {
            return Ok(GameStatus::Continue);
        }
        if is_king_in_check(self, color) {
            Ok(match color {
                Color::White => GameStatus::CheckmateBlackWins,
                Color::Black => GameStatus::CheckmateWhiteWins,
            })
        } else {
            Ok(GameStatus::Stalemate)
        }
    }

    fn filtered_moves(
        &mut self,
        color: Color,
        keep: impl Fn(&Move) -> bool,
    ) -> ChessResult<Vec<Move>> {
        let ids = self.pieces(color).to_vec();
        let mut candidates = Vec::with_capacity(64);
        for id in ids {
            self.pseudo_legal_moves(id, &mut candidates);
        }
        candidates.retain(|mv| keep(mv));
        let mut out = Vec::with_capacity(candidates.len());
        self.retain_legal(color, candidates, &mut out)?;
        Ok(out)
    }

    fn retain_legal(
        &mut self,
        color: Color,
        candidates: Vec<Move>,
        out: &mut Vec<Move>,
    ) -> ChessResult<()> {
        for mut mv in candidates {
            if self.is_legal_candidate(color, &mut mv)? {
                out.push(mv);
            }
        }
        Ok(())
    }

    fn is_legal_candidate(&mut self, color: Color, mv: &mut Move) -> ChessResult<bool> {
        self.make_move(mv)?;
        let safe = !is_king_in_check(self, color);
        self.undo_move(mv)?;
        Ok(safe)
    }
}

#[cfg(test)]
mod tests {
    use crate::game_state::board::Board;
    use crate::game_state::chess_move::{Move, MoveKind};
    use crate::game_state::chess_types::*;
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

    fn play(board: &mut Board, from: (u8, u8), to: (u8, u8)) {
        let id = board
            .piece_at(Square::new(from.0, from.1))
            .expect("piece on source");
        let mut mv = board
            .legal_move_or_none(id, Square::new(to.0, to.1), None)
            .expect("generation runs")
            .expect("move is legal");
        board.make_move(&mut mv).expect("move applies");
    }

    #[test]
    fn starting_position_has_twenty_moves() {
        let mut board = Board::starting_position();
        let before = board.clone();
        assert_eq!(board.legal_moves(Color::White).expect("gen").len(), 20);
        assert_eq!(board.legal_moves(Color::Black).expect("gen").len(), 20);
        assert_eq!(board, before);
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        let mut board = board_with(&[
            (Color::White, PieceKind::King, 7, 4),
            (Color::White, PieceKind::Bishop, 6, 4),
            (Color::Black, PieceKind::Rook, 0, 4),
            (Color::Black, PieceKind::King, 0, 0),
        ]);
        let bishop = board.piece_at(Square::new(6, 4)).expect("bishop");
        assert!(board.legal_moves_of_piece(bishop).expect("gen").is_empty());
    }

    #[test]
    fn back_rank_mate_is_detected() {
        let mut board = board_with(&[
            (Color::White, PieceKind::King, 7, 6),
            (Color::White, PieceKind::Pawn, 6, 5),
            (Color::White, PieceKind::Pawn, 6, 6),
            (Color::White, PieceKind::Pawn, 6, 7),
            (Color::Black, PieceKind::Rook, 7, 0),
            (Color::Black, PieceKind::King, 0, 4),
        ]);
        assert_eq!(
            board.evaluate_game_state(Color::White).expect("status"),
            GameStatus::CheckmateBlackWins
        );
    }

    #[test]
    fn stalemate_is_detected() {
        let mut board = board_with(&[
            (Color::Black, PieceKind::King, 0, 0),
            (Color::White, PieceKind::King, 5, 1),
            (Color::White, PieceKind::Queen, 2, 1),
        ]);
        assert_eq!(
            board.evaluate_game_state(Color::Black).expect("status"),
            GameStatus::Stalemate
        );
        assert_eq!(
            board.evaluate_game_state(Color::White).expect("status"),
            GameStatus::Continue
        );
    }

    #[test]
    fn fools_mate_ends_the_game() {
        let mut board = Board::starting_position();
        play(&mut board, (6, 5), (5, 5));
        play(&mut board, (1, 4), (3, 4));
        play(&mut board, (6, 6), (4, 6));
        play(&mut board, (0, 3), (4, 7));
        assert_eq!(
            board.evaluate_game_state(Color::White).expect("status"),
            GameStatus::CheckmateBlackWins
        );
    }

    #[test]
    fn captured_piece_has_no_moves() {
        let mut board = board_with(&[
            (Color::White, PieceKind::King, 7, 4),
            (Color::Black, PieceKind::King, 0, 4),
            (Color::White, PieceKind::Rook, 4, 0),
            (Color::Black, PieceKind::Knight, 4, 5),
        ]);
        let knight = board.piece_at(Square::new(4, 5)).expect("knight");
        let rook = board.piece_at(Square::new(4, 0)).expect("rook");
        let mut capture = board
            .legal_move_or_none(rook, Square::new(4, 5), None)
            .expect("gen")
            .expect("capture is legal");
        board.make_move(&mut capture).expect("capture applies");
        assert!(board.legal_moves_of_piece(knight).expect("gen").is_empty());
        assert!(board
            .legal_move_or_none(knight, Square::new(2, 4), None)
            .expect("gen")
            .is_none());
    }

    #[test]
    fn captures_only_returns_tactical_moves() {
        let mut board = board_with(&[
            (Color::White, PieceKind::King, 7, 4),
            (Color::Black, PieceKind::King, 0, 4),
            (Color::White, PieceKind::Rook, 4, 0),
            (Color::Black, PieceKind::Knight, 4, 5),
            (Color::White, PieceKind::Pawn, 1, 7),
        ]);
        let captures = board.captures(Color::White).expect("gen");
        assert!(captures.iter().all(Move::is_tactical));
        // Rook takes knight plus four promotions on h8.
        assert_eq!(captures.len(), 5);
    }

    #[test]
    fn explicit_promotion_choice_is_honoured() {
        let mut board = board_with(&[
            (Color::White, PieceKind::King, 7, 4),
            (Color::Black, PieceKind::King, 0, 4),
            (Color::White, PieceKind::Pawn, 1, 0),
        ]);
        let pawn = board.piece_at(Square::new(1, 0)).expect("pawn");
        let knight = board
            .legal_move_or_none(pawn, Square::new(0, 0), Some(PieceKind::Knight))
            .expect("gen")
            .expect("legal");
        assert_eq!(knight.kind, MoveKind::Promotion(PieceKind::Knight));
        let default = board
            .legal_move_or_none(pawn, Square::new(0, 0), None)
            .expect("gen")
            .expect("legal");
        assert_eq!(default.kind, MoveKind::Promotion(PieceKind::Queen));
    }
}
