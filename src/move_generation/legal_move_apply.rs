//! In-place move application and exact reversal.
//!
//! `make_move` mutates the board and attaches an [`UndoState`] to the move;
//! `undo_move` consumes it. Calls nest strictly LIFO. Hash and evaluation
//! are updated incrementally through `lift` / `drop_at`, which keep the grid,
//! Zobrist key, and accumulator in step for a single piece.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::chess_move::{Move, MoveKind};
use crate::game_state::chess_rules::signed_piece_score;
use crate::game_state::chess_types::*;
use crate::game_state::piece::{Piece, PieceId};
use crate::game_state::undo_state::{NullMoveUndo, UndoState};

impl Board {
    /// Remove a piece's grid, hash, and evaluation contributions at its
    /// current coordinates.
    fn lift(&mut self, id: PieceId) {
        let p = self.arena[id];
        self.grid[p.row as usize][p.col as usize] = None;
        self.zobrist_key ^= self.keys.piece_square(p.color, p.kind, p.square());
        self.eval -= signed_piece_score(p.kind, p.color, p.row, p.col);
    }

    /// Place a piece on `square`, adding its grid, hash, and evaluation
    /// contributions.
    fn drop_at(&mut self, id: PieceId, square: Square) {
        self.arena[id].set_square(square);
        let p = self.arena[id];
        self.grid[square.row as usize][square.col as usize] = Some(id);
        self.zobrist_key ^= self.keys.piece_square(p.color, p.kind, square);
        self.eval += signed_piece_score(p.kind, p.color, p.row, p.col);
    }

    /// Apply `mv` in place. Fails if the move is already applied or its
    /// source square is empty; the board is untouched in both cases.
    pub fn make_move(&mut self, mv: &mut Move) -> ChessResult<()> {
        if mv.is_applied() {
            return Err(ChessError::MoveAlreadyApplied {
                from: mv.from,
                to: mv.to,
            });
        }
        let mover_id = self
            .piece_at(mv.from)
            .ok_or(ChessError::EmptySource(mv.from))?;
        let mover = self.arena[mover_id];
        let color = mover.color;

        let mut undo = UndoState {
            mover: mover_id,
            prev_mover_has_moved: mover.has_moved,
            prev_rook: None,
            captured_list_index: None,
            promoted: None,
            prev_en_passant: self.en_passant,
            prev_castling_rights: self.castling_rights,
            prev_zobrist_key: self.zobrist_key,
            prev_eval: self.eval,
            prev_side_to_move: self.side_to_move,
        };

        self.set_en_passant(None);

        let capture_square = match mv.kind {
            MoveKind::EnPassant { captured } => Some(captured),
            _ => Some(mv.to),
        };
        mv.captured = None;
        if let Some(victim_id) = capture_square.and_then(|sq| self.piece_at(sq)) {
            if self.arena[victim_id].color != color {
                let victim = self.arena[victim_id];
                self.lift(victim_id);
                let list = &mut self.pieces[victim.color.index()];
                if let Some(idx) = list.iter().position(|id| *id == victim_id) {
                    list.remove(idx);
                    undo.captured_list_index = Some(idx);
                }
                if victim.kind == PieceKind::King {
                    self.kings[victim.color.index()] = None;
                }
                mv.captured = Some(victim_id);
            }
        }

        self.lift(mover_id);
        match mv.kind {
            MoveKind::Promotion(kind) => {
                let promoted_id = self.arena.len();
                let mut promoted = Piece::new(color, kind, mv.to.row, mv.to.col);
                promoted.has_moved = true;
                self.arena.push(promoted);
                if let Some(slot) = self.pieces[color.index()]
                    .iter_mut()
                    .find(|id| **id == mover_id)
                {
                    *slot = promoted_id;
                }
                self.drop_at(promoted_id, mv.to);
                undo.promoted = Some(promoted_id);
            }
            _ => {
                self.drop_at(mover_id, mv.to);
                self.arena[mover_id].has_moved = true;
            }
        }

        if let MoveKind::Castling {
            rook_from_col,
            rook_to_col,
        } = mv.kind
        {
            let row = mv.from.row;
            if let Some(rook_id) = self.piece_at(Square::new(row, rook_from_col)) {
                undo.prev_rook = Some((rook_id, self.arena[rook_id].has_moved));
                self.lift(rook_id);
                self.drop_at(rook_id, Square::new(row, rook_to_col));
                self.arena[rook_id].has_moved = true;
            }
        }

        if mover.kind == PieceKind::Pawn && mv.from.row.abs_diff(mv.to.row) == 2 {
            let passed = Square::new((mv.from.row + mv.to.row) / 2, mv.from.col);
            self.set_en_passant(Some(passed));
        }

        self.refresh_castling_rights();
        self.set_side_to_move(color.opposite());
        mv.undo = Some(undo);
        Ok(())
    }

    /// Reverse a move applied by [`Board::make_move`], restoring the exact
    /// prior board.
    pub fn undo_move(&mut self, mv: &mut Move) -> ChessResult<()> {
        let undo = mv.undo.take().ok_or(ChessError::MoveNotApplied {
            from: mv.from,
            to: mv.to,
        })?;
        let mover_id = undo.mover;

        if let (
            MoveKind::Castling {
                rook_from_col,
                rook_to_col,
            },
            Some((rook_id, had_moved)),
        ) = (mv.kind, undo.prev_rook)
        {
            let row = mv.from.row;
            self.grid[row as usize][rook_to_col as usize] = None;
            self.grid[row as usize][rook_from_col as usize] = Some(rook_id);
            self.arena[rook_id].col = rook_from_col;
            self.arena[rook_id].has_moved = had_moved;
        }

        self.grid[mv.to.row as usize][mv.to.col as usize] = None;
        if let Some(promoted_id) = undo.promoted {
            let color = self.arena[mover_id].color;
            if let Some(slot) = self.pieces[color.index()]
                .iter_mut()
                .find(|id| **id == promoted_id)
            {
                *slot = mover_id;
            }
            if self.arena.len() == promoted_id + 1 {
                self.arena.pop();
            }
        }
        self.arena[mover_id].set_square(mv.from);
        self.arena[mover_id].has_moved = undo.prev_mover_has_moved;
        self.grid[mv.from.row as usize][mv.from.col as usize] = Some(mover_id);

        if let Some(victim_id) = mv.captured {
            let victim = self.arena[victim_id];
            self.grid[victim.row as usize][victim.col as usize] = Some(victim_id);
            let list = &mut self.pieces[victim.color.index()];
            match undo.captured_list_index {
                Some(idx) if idx <= list.len() => list.insert(idx, victim_id),
                _ => list.push(victim_id),
            }
            if victim.kind == PieceKind::King {
                self.kings[victim.color.index()] = Some(victim_id);
            }
        }

        self.en_passant = undo.prev_en_passant;
        self.castling_rights = undo.prev_castling_rights;
        self.zobrist_key = undo.prev_zobrist_key;
        self.eval = undo.prev_eval;
        self.side_to_move = undo.prev_side_to_move;
        Ok(())
    }

    /// Pass the turn without moving. Clears the en-passant target.
    pub fn make_null_move(&mut self) -> NullMoveUndo {
        let undo = NullMoveUndo {
            prev_side_to_move: self.side_to_move,
            prev_en_passant: self.en_passant,
            prev_zobrist_key: self.zobrist_key,
        };
        self.set_en_passant(None);
        self.set_side_to_move(self.side_to_move.opposite());
        undo
    }

    pub fn undo_null_move(&mut self, undo: NullMoveUndo) {
        self.side_to_move = undo.prev_side_to_move;
        self.en_passant = undo.prev_en_passant;
        self.zobrist_key = undo.prev_zobrist_key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(pieces: &[(Color, PieceKind, u8, u8)]) -> Board {
        let mut board = Board::new();
        for (color, kind, row, col) in pieces {
            board
                .place_piece(Piece::new(*color, *kind, *row, *col))
                .expect("empty square");
        }
        board
    }

    fn assert_incremental_state(board: &Board) {
        assert_eq!(board.zobrist_key(), board.recompute_hash());
        assert_eq!(board.evaluation_accumulator(), board.recompute_evaluation());
        assert!(board.is_consistent());
    }

    #[test]
    fn quiet_move_round_trip() {
        let mut board = Board::starting_position();
        let before = board.clone();
        let mut mv = Move::new(Square::new(7, 6), Square::new(5, 5), MoveKind::Normal);
        board.make_move(&mut mv).expect("move applies");
        assert_incremental_state(&board);
        assert_eq!(board.side_to_move(), Color::Black);
        board.undo_move(&mut mv).expect("move undoes");
        assert_eq!(board, before);
    }

    #[test]
    fn double_push_sets_and_next_move_clears_en_passant() {
        let mut board = Board::starting_position();
        let mut push = Move::new(Square::new(6, 4), Square::new(4, 4), MoveKind::Normal);
        board.make_move(&mut push).expect("move applies");
        assert_eq!(board.en_passant(), Some(Square::new(5, 4)));
        assert_incremental_state(&board);

        let mut reply = Move::new(Square::new(0, 6), Square::new(2, 5), MoveKind::Normal);
        board.make_move(&mut reply).expect("move applies");
        assert_eq!(board.en_passant(), None);
        assert_incremental_state(&board);

        board.undo_move(&mut reply).expect("undo");
        assert_eq!(board.en_passant(), Some(Square::new(5, 4)));
        board.undo_move(&mut push).expect("undo");
        assert_eq!(board, Board::starting_position());
    }

    #[test]
    fn capture_restores_list_position() {
        let mut board = board_with(&[
            (Color::White, PieceKind::King, 7, 4),
            (Color::Black, PieceKind::King, 0, 4),
            (Color::Black, PieceKind::Knight, 3, 3),
            (Color::Black, PieceKind::Pawn, 1, 0),
            (Color::White, PieceKind::Rook, 3, 0),
        ]);
        let before = board.clone();
        let victim = board.piece_at(Square::new(3, 3)).expect("knight");
        let mut mv = Move::new(Square::new(3, 0), Square::new(3, 3), MoveKind::Normal);
        board.make_move(&mut mv).expect("capture applies");
        assert_eq!(mv.captured, Some(victim));
        assert!(!board.pieces(Color::Black).contains(&victim));
        assert_incremental_state(&board);

        board.undo_move(&mut mv).expect("undo");
        assert_eq!(board, before);
    }

    #[test]
    fn castling_moves_rook_and_drops_rights() {
        let mut board = board_with(&[
            (Color::White, PieceKind::King, 7, 4),
            (Color::White, PieceKind::Rook, 7, 7),
            (Color::White, PieceKind::Rook, 7, 0),
            (Color::Black, PieceKind::King, 0, 4),
        ]);
        let before = board.clone();
        assert_eq!(
            board.castling_rights(),
            CASTLE_WHITE_KINGSIDE | CASTLE_WHITE_QUEENSIDE
        );

        let mut castle = Move::new(
            Square::new(7, 4),
            Square::new(7, 6),
            MoveKind::Castling {
                rook_from_col: 7,
                rook_to_col: 5,
            },
        );
        board.make_move(&mut castle).expect("castle applies");
        let rook = board.piece_on(Square::new(7, 5)).expect("rook on f1");
        assert_eq!(rook.kind, PieceKind::Rook);
        assert!(rook.has_moved);
        assert!(board.piece_at(Square::new(7, 7)).is_none());
        assert_eq!(board.castling_rights(), 0);
        assert_incremental_state(&board);

        board.undo_move(&mut castle).expect("undo");
        assert_eq!(board, before);
    }

    #[test]
    fn en_passant_round_trip() {
        let mut board = board_with(&[
            (Color::White, PieceKind::King, 7, 4),
            (Color::Black, PieceKind::King, 0, 4),
            (Color::White, PieceKind::Pawn, 3, 4),
            (Color::Black, PieceKind::Pawn, 1, 3),
        ]);
        board.set_side_to_move(Color::Black);
        let mut push = Move::new(Square::new(1, 3), Square::new(3, 3), MoveKind::Normal);
        board.make_move(&mut push).expect("double push");
        let before = board.clone();

        let victim = board.piece_at(Square::new(3, 3)).expect("d5 pawn");
        let mut ep = Move::new(
            Square::new(3, 4),
            Square::new(2, 3),
            MoveKind::EnPassant {
                captured: Square::new(3, 3),
            },
        );
        board.make_move(&mut ep).expect("en passant applies");
        assert_eq!(ep.captured, Some(victim));
        assert!(board.piece_at(Square::new(3, 3)).is_none());
        assert_incremental_state(&board);

        board.undo_move(&mut ep).expect("undo");
        assert_eq!(board, before);
    }

    #[test]
    fn promotion_with_capture_round_trip() {
        let mut board = board_with(&[
            (Color::White, PieceKind::King, 7, 4),
            (Color::Black, PieceKind::King, 0, 4),
            (Color::White, PieceKind::Pawn, 1, 6),
            (Color::Black, PieceKind::Rook, 0, 7),
        ]);
        let before = board.clone();
        let pawn = board.piece_at(Square::new(1, 6)).expect("pawn");
        let mut promo = Move::new(
            Square::new(1, 6),
            Square::new(0, 7),
            MoveKind::Promotion(PieceKind::Queen),
        );
        board.make_move(&mut promo).expect("promotion applies");

        let queen = board.piece_on(Square::new(0, 7)).expect("queen");
        assert_eq!(queen.kind, PieceKind::Queen);
        assert_eq!(queen.color, Color::White);
        assert!(!board.is_live(pawn));
        assert_eq!(board.pieces(Color::Black).len(), 1);
        assert_incremental_state(&board);

        board.undo_move(&mut promo).expect("undo");
        assert_eq!(board, before);
        assert!(board.is_live(pawn));
    }

    #[test]
    fn moves_are_single_use() {
        let mut board = Board::starting_position();
        let mut mv = Move::new(Square::new(6, 0), Square::new(5, 0), MoveKind::Normal);
        assert!(matches!(
            board.undo_move(&mut mv),
            Err(ChessError::MoveNotApplied { .. })
        ));
        board.make_move(&mut mv).expect("first apply");
        assert!(matches!(
            board.make_move(&mut mv),
            Err(ChessError::MoveAlreadyApplied { .. })
        ));
        board.undo_move(&mut mv).expect("undo");
        assert_eq!(board, Board::starting_position());
    }

    #[test]
    fn empty_source_is_rejected() {
        let mut board = Board::starting_position();
        let mut mv = Move::new(Square::new(4, 4), Square::new(3, 4), MoveKind::Normal);
        assert_eq!(
            board.make_move(&mut mv),
            Err(ChessError::EmptySource(Square::new(4, 4)))
        );
        assert_eq!(board, Board::starting_position());
    }

    #[test]
    fn null_move_restores_key_and_clears_en_passant() {
        let mut board = Board::starting_position();
        let mut push = Move::new(Square::new(6, 3), Square::new(4, 3), MoveKind::Normal);
        board.make_move(&mut push).expect("push");
        let before = board.clone();

        let undo = board.make_null_move();
        assert_eq!(board.side_to_move(), Color::White);
        assert_eq!(board.en_passant(), None);
        assert_eq!(board.zobrist_key(), board.recompute_hash());

        board.undo_null_move(undo);
        assert_eq!(board, before);
    }
}
