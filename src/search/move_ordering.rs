//! Move ordering heuristics: TT move, MVV-LVA captures, promotions,
//! killer moves, and the history table.

use std::cmp::Reverse;

use crate::game_state::board::Board;
use crate::game_state::chess_move::Move;
use crate::game_state::chess_rules::{piece_value, pst_value};
use crate::search::iterative_deepening::MAX_PLY;

pub const TT_MOVE_SCORE: i32 = 4_000_000;
pub const CAPTURE_BASE_SCORE: i32 = 1_000_000;
pub const PROMOTION_SCORE: i32 = 900_000;
pub const KILLER_SCORES: [i32; 2] = [9_000, 8_000];
/// Once any history entry passes this, the whole table is halved.
pub const HISTORY_LIMIT: i32 = 200_000;

type HistoryTable = [[i32; 64]; 64];

/// Killer slots per ply and the `[from][to]` history table. Lives on the
/// search engine so it carries over between searches.
#[derive(Debug, Clone)]
pub struct SearchHeuristics {
    killers: Vec<[Option<Move>; 2]>,
    history: Box<HistoryTable>,
}

impl Default for SearchHeuristics {
    fn default() -> Self {
        Self {
            killers: vec![[None, None]; MAX_PLY + 1],
            history: Box::new([[0; 64]; 64]),
        }
    }
}

impl SearchHeuristics {
    /// Forget killers and age history before a new root search.
    pub fn new_search(&mut self) {
        self.killers.fill([None, None]);
        for row in self.history.iter_mut() {
            for entry in row.iter_mut() {
                *entry /= 8;
            }
        }
    }

    #[inline]
    pub fn killers_at(&self, ply: usize) -> &[Option<Move>; 2] {
        &self.killers[ply.min(MAX_PLY)]
    }

    pub fn is_killer(&self, ply: usize, mv: &Move) -> Option<usize> {
        self.killers_at(ply)
            .iter()
            .position(|k| k.as_ref().is_some_and(|k| k.same_action(mv)))
    }

    /// Remember a quiet move that caused a beta cutoff at `ply`. The newest
    /// killer takes slot 0 and the previous one shifts to slot 1.
    pub fn record_killer(&mut self, ply: usize, mv: &Move) {
        let slots = &mut self.killers[ply.min(MAX_PLY)];
        if slots[0].as_ref().is_some_and(|k| k.same_action(mv)) {
            return;
        }
        slots[1] = slots[0].take();
        slots[0] = Some(mv.detached());
    }

    pub fn record_history(&mut self, mv: &Move, depth: i32) {
        let entry = &mut self.history[mv.from.index()][mv.to.index()];
        *entry += depth * depth;
        if *entry > HISTORY_LIMIT {
            for row in self.history.iter_mut() {
                for value in row.iter_mut() {
                    *value /= 2;
                }
            }
        }
    }

    #[inline]
    pub fn history_score(&self, mv: &Move) -> i32 {
        self.history[mv.from.index()][mv.to.index()]
    }
}

/// Most valuable victim, least valuable attacker.
pub fn mvv_lva(board: &Board, mv: &Move) -> i32 {
    let victim = mv
        .captured
        .and_then(|id| board.piece(id))
        .map_or(0, |p| piece_value(p.kind));
    let attacker = board.piece_on(mv.from).map_or(0, |p| piece_value(p.kind));
    10 * victim - attacker
}

/// Ordering score; higher is searched first.
pub fn score_move(
    board: &Board,
    mv: &Move,
    tt_move: Option<&Move>,
    heuristics: &SearchHeuristics,
    ply: usize,
) -> i32 {
    if tt_move.is_some_and(|t| t.same_action(mv)) {
        return TT_MOVE_SCORE;
    }

    // Capture and promotion bases dominate; killer, history and PST terms
    // are added on top as tie-breaks.
    let mut score = 0;
    if mv.is_capture() {
        score += CAPTURE_BASE_SCORE + mvv_lva(board, mv);
    }
    if mv.promotion().is_some() {
        score += PROMOTION_SCORE;
    }

    if let Some(slot) = heuristics.is_killer(ply, mv) {
        score += KILLER_SCORES[slot];
    }
    score += heuristics.history_score(mv);
    if let Some(p) = board.piece_on(mv.from) {
        score += pst_value(p.kind, p.color, mv.to.row, mv.to.col)
            - pst_value(p.kind, p.color, mv.from.row, mv.from.col);
    }
    score
}

pub fn order_moves(
    board: &Board,
    moves: &mut [Move],
    tt_move: Option<&Move>,
    heuristics: &SearchHeuristics,
    ply: usize,
) {
    moves.sort_by_cached_key(|mv| Reverse(score_move(board, mv, tt_move, heuristics, ply)));
}

/// Captures and promotions only, MVV-LVA first; used in quiescence.
pub fn order_tactical_moves(board: &Board, moves: &mut [Move]) {
    moves.sort_by_cached_key(|mv| {
        let promotion = mv.promotion().map_or(0, piece_value);
        Reverse(mvv_lva(board, mv) + promotion)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_move::MoveKind;
    use crate::game_state::chess_types::{Color, PieceKind, Square};
    use crate::game_state::piece::Piece;

    fn quiet(from: (u8, u8), to: (u8, u8)) -> Move {
        Move::new(Square::new(from.0, from.1), Square::new(to.0, to.1), MoveKind::Normal)
    }

    #[test]
    fn killer_slots_shift_and_skip_duplicates() {
        let mut h = SearchHeuristics::default();
        let a = quiet((6, 0), (5, 0));
        let b = quiet((6, 1), (5, 1));
        h.record_killer(3, &a);
        h.record_killer(3, &a);
        assert_eq!(h.is_killer(3, &a), Some(0));
        assert!(h.killers_at(3)[1].is_none());

        h.record_killer(3, &b);
        assert_eq!(h.is_killer(3, &b), Some(0));
        assert_eq!(h.is_killer(3, &a), Some(1));
        assert_eq!(h.is_killer(4, &a), None);
    }

    #[test]
    fn history_grows_by_depth_squared_and_halves_past_limit() {
        let mut h = SearchHeuristics::default();
        let a = quiet((7, 6), (5, 5));
        let b = quiet((7, 1), (5, 2));
        h.record_history(&b, 10);
        h.record_history(&a, 4);
        assert_eq!(h.history_score(&a), 16);

        for _ in 0..(HISTORY_LIMIT / 400) {
            h.record_history(&a, 20);
        }
        h.record_history(&a, 20);
        assert!(h.history_score(&a) <= HISTORY_LIMIT);
        assert_eq!(h.history_score(&b), 50);
    }

    #[test]
    fn new_search_clears_killers_and_ages_history() {
        let mut h = SearchHeuristics::default();
        let a = quiet((7, 6), (5, 5));
        h.record_killer(0, &a);
        h.record_history(&a, 8);
        h.new_search();
        assert_eq!(h.is_killer(0, &a), None);
        assert_eq!(h.history_score(&a), 8);
    }

    #[test]
    fn capture_score_includes_quiet_tie_breaks() {
        let mut board = Board::new();
        for (color, kind, row, col) in [
            (Color::White, PieceKind::King, 7, 4),
            (Color::Black, PieceKind::King, 0, 4),
            (Color::White, PieceKind::Rook, 4, 0),
            (Color::Black, PieceKind::Knight, 4, 3),
        ] {
            board
                .place_piece(Piece::new(color, kind, row, col))
                .expect("empty square");
        }
        let capture = board
            .legal_moves(Color::White)
            .expect("gen")
            .into_iter()
            .find(|m| m.is_capture())
            .expect("rook takes knight");

        let mut h = SearchHeuristics::default();
        let plain = score_move(&board, &capture, None, &h, 2);
        let pst_delta = pst_value(PieceKind::Rook, Color::White, 4, 3)
            - pst_value(PieceKind::Rook, Color::White, 4, 0);
        assert_eq!(plain, CAPTURE_BASE_SCORE + mvv_lva(&board, &capture) + pst_delta);

        h.record_killer(2, &capture);
        h.record_history(&capture, 5);
        assert_eq!(
            score_move(&board, &capture, None, &h, 2),
            plain + KILLER_SCORES[0] + 25
        );
    }

    #[test]
    fn ordering_puts_tt_move_then_captures_first() {
        let mut board = Board::new();
        for (color, kind, row, col) in [
            (Color::White, PieceKind::King, 7, 4),
            (Color::Black, PieceKind::King, 0, 4),
            (Color::White, PieceKind::Rook, 4, 0),
            (Color::White, PieceKind::Pawn, 5, 4),
            (Color::Black, PieceKind::Queen, 4, 5),
            (Color::Black, PieceKind::Knight, 4, 3),
        ] {
            board
                .place_piece(Piece::new(color, kind, row, col))
                .expect("empty square");
        }
        let mut moves = board.legal_moves(Color::White).expect("gen");
        let tt_move = quiet((7, 4), (7, 3));
        let h = SearchHeuristics::default();
        order_moves(&board, &mut moves, Some(&tt_move), &h, 0);

        assert!(moves[0].same_action(&tt_move));
        // Pawn takes queen beats pawn takes knight beats rook takes knight.
        assert_eq!(moves[1].to, Square::new(4, 5));
        assert_eq!(moves[2].to, Square::new(4, 3));
        assert_eq!(moves[2].from, Square::new(5, 4));
        assert_eq!(moves[3].from, Square::new(4, 0));
        assert!(!moves[4].is_capture());
    }
}
