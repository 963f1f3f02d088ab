//! Iterative deepening search with negamax alpha-beta pruning.
//!
//! Heuristics:
//! - Transposition table probe/store with ply-normalized mate scores.
//! - Check extension (one ply, bounded by `MAX_PLY`).
//! - Null-move pruning with a non-pawn-material zugzwang guard.
//! - Principal Variation Search with Late Move Reductions for quiet moves.
//! - Killer/history move ordering, MVV-LVA captures.
//! - Capture/promotion quiescence with stand-pat.
//!
//! The deepest fully completed iteration wins; a stopped iteration is
//! discarded. Time is polled every 2048 nodes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;

use crate::errors::ChessResult;
use crate::game_state::board::Board;
use crate::game_state::chess_move::Move;
use crate::game_state::chess_types::Color;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::search::board_scoring::{BoardScorer, StandardScorer, CHECKMATE_SCORE, MATE_THRESHOLD};
use crate::search::move_ordering::{order_moves, order_tactical_moves, SearchHeuristics};
use crate::search::transposition_table::{Bound, TTStats, TranspositionTable, DEFAULT_TT_ENTRIES};

pub const MAX_PLY: usize = 100;
pub const DEFAULT_TIME_LIMIT_MS: u64 = 6000;
const NODE_CHECK_MASK: u64 = 2047;
const INFINITY: i32 = CHECKMATE_SCORE + 1;

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub max_depth: u8,
    pub time_limit_ms: Option<u64>,
    pub max_nodes: Option<u64>,
    pub stop_flag: Option<Arc<AtomicBool>>,
    pub tt_entries: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            time_limit_ms: Some(DEFAULT_TIME_LIMIT_MS),
            max_nodes: None,
            stop_flag: None,
            tt_entries: DEFAULT_TT_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub best_score: i32,
    pub reached_depth: u8,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub nps: u64,
    pub tt_stats: TTStats,
}

/// Owns the search tables for the lifetime of a game. The transposition
/// table and history persist across calls; killers are reset per search.
#[derive(Debug)]
pub struct SearchEngine<S: BoardScorer = StandardScorer> {
    config: SearchConfig,
    tt: TranspositionTable,
    heuristics: SearchHeuristics,
    scorer: S,
}

impl Default for SearchEngine<StandardScorer> {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl SearchEngine<StandardScorer> {
    pub fn new(config: SearchConfig) -> Self {
        Self::with_scorer(config, StandardScorer)
    }
}

impl<S: BoardScorer> SearchEngine<S> {
    pub fn with_scorer(config: SearchConfig, scorer: S) -> Self {
        Self {
            tt: TranspositionTable::new(config.tt_entries),
            heuristics: SearchHeuristics::default(),
            config,
            scorer,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SearchConfig {
        &mut self.config
    }

    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Drop everything learned so far; use between unrelated games.
    pub fn reset(&mut self) {
        self.tt.clear();
        self.heuristics = SearchHeuristics::default();
    }

    /// Best move for `color` searched up to `max_depth`, or `None` when
    /// `color` has no legal move. The board is restored before returning.
    pub fn find_best_move(
        &mut self,
        board: &mut Board,
        color: Color,
        max_depth: u8,
    ) -> ChessResult<Option<Move>> {
        Ok(self.search_to_depth(board, color, max_depth)?.best_move)
    }

    /// Search to the configured depth and report statistics.
    pub fn search(&mut self, board: &mut Board, color: Color) -> ChessResult<SearchResult> {
        self.search_to_depth(board, color, self.config.max_depth)
    }

    pub fn search_to_depth(
        &mut self,
        board: &mut Board,
        color: Color,
        max_depth: u8,
    ) -> ChessResult<SearchResult> {
        let prev_side = board.side_to_move();
        board.set_side_to_move(color);
        let outcome = self.run(board, color, max_depth);
        board.set_side_to_move(prev_side);
        outcome
    }

    fn run(&mut self, board: &mut Board, color: Color, max_depth: u8) -> ChessResult<SearchResult> {
        let started_at = Instant::now();
        let deadline = self
            .config
            .time_limit_ms
            .map(|ms| started_at + Duration::from_millis(ms));
        self.heuristics.new_search();

        let mut root_moves = board.legal_moves(color)?;
        if root_moves.is_empty() {
            let best_score = if is_king_in_check(board, color) {
                -CHECKMATE_SCORE
            } else {
                0
            };
            return Ok(SearchResult {
                best_score,
                tt_stats: self.tt.stats(),
                ..SearchResult::default()
            });
        }

        let root_key = board.zobrist_key();
        let tt_move = self.tt.best_move(root_key).cloned();
        order_moves(board, &mut root_moves, tt_move.as_ref(), &self.heuristics, 0);

        let mut searcher = Searcher {
            tt: &mut self.tt,
            heuristics: &mut self.heuristics,
            scorer: &self.scorer,
            nodes: 0,
            deadline,
            max_nodes: self.config.max_nodes.filter(|n| *n > 0),
            stop_flag: self.config.stop_flag.as_deref(),
            stopped: false,
        };

        let mut result = SearchResult::default();
        for depth in 1..=max_depth {
            let Some((best_move, best_score)) =
                searcher.search_root(board, &mut root_moves, i32::from(depth))?
            else {
                debug!(
                    "search stopped during depth {depth} after {} nodes",
                    searcher.nodes
                );
                break;
            };

            result.best_move = Some(best_move);
            result.best_score = best_score;
            result.reached_depth = depth;
            debug!(
                "depth {depth} score {best_score} best {} nodes {} time {}ms",
                result.best_move.as_ref().map_or_else(String::new, Move::to_string),
                searcher.nodes,
                started_at.elapsed().as_millis()
            );

            if best_score > MATE_THRESHOLD {
                debug!("mate found at depth {depth}, stopping");
                break;
            }
        }

        if result.best_move.is_none() {
            debug!("no iteration completed, falling back to first ordered move");
            result.best_move = root_moves.first().map(Move::detached);
        }

        result.nodes = searcher.nodes;
        result.elapsed_ms = started_at.elapsed().as_millis() as u64;
        result.nps = if result.elapsed_ms == 0 {
            0
        } else {
            result.nodes.saturating_mul(1000) / result.elapsed_ms
        };
        result.tt_stats = self.tt.stats();
        Ok(result)
    }
}

/// One-shot search with a default engine.
pub fn find_best_move(board: &mut Board, color: Color, max_depth: u8) -> ChessResult<Option<Move>> {
    SearchEngine::default().find_best_move(board, color, max_depth)
}

/// Per-call search state borrowing the engine's tables.
struct Searcher<'a, S: BoardScorer> {
    tt: &'a mut TranspositionTable,
    heuristics: &'a mut SearchHeuristics,
    scorer: &'a S,
    nodes: u64,
    deadline: Option<Instant>,
    max_nodes: Option<u64>,
    stop_flag: Option<&'a AtomicBool>,
    stopped: bool,
}

impl<S: BoardScorer> Searcher<'_, S> {
    fn limits_reached(&self) -> bool {
        self.max_nodes.is_some_and(|cap| self.nodes >= cap)
            || self.deadline.is_some_and(|limit| Instant::now() >= limit)
            || self.stop_flag.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Node-cap check on every call; clock and stop flag every 2048 nodes.
    fn should_stop(&mut self) -> bool {
        if !self.stopped {
            let cap_hit = self.max_nodes.is_some_and(|cap| self.nodes >= cap);
            self.stopped = cap_hit || (self.nodes & NODE_CHECK_MASK == 0 && self.limits_reached());
        }
        self.stopped
    }

    /// Search every root move at `depth`; `None` when stopped part-way.
    /// Leaves the best move first in `moves` for the next iteration.
    fn search_root(
        &mut self,
        board: &mut Board,
        moves: &mut [Move],
        depth: i32,
    ) -> ChessResult<Option<(Move, i32)>> {
        let key = board.zobrist_key();
        let mut alpha = -INFINITY;
        let beta = INFINITY;
        let mut best: Option<(usize, i32)> = None;
        if self.stopped || self.limits_reached() {
            self.stopped = true;
            return Ok(None);
        }
        self.nodes += 1;

        for i in 0..moves.len() {
            board.make_move(&mut moves[i])?;
            let score = if i == 0 {
                self.child(board, depth - 1, alpha, beta, 1)?
            } else {
                match self.child(board, depth - 1, alpha, alpha + 1, 1)? {
                    Some(s) if s > alpha && s < beta => self.child(board, depth - 1, alpha, beta, 1)?,
                    other => other,
                }
            };
            board.undo_move(&mut moves[i])?;

            let Some(score) = score else {
                return Ok(None);
            };
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((i, score));
            }
            alpha = alpha.max(score);
        }

        let Some((idx, score)) = best else {
            return Ok(None);
        };
        moves[..=idx].rotate_right(1);
        self.tt.store(key, depth, score, Bound::Exact, Some(&moves[0]), 0);
        Ok(Some((moves[0].detached(), score)))
    }

    /// Negated child search with window `(alpha, beta)` from the parent's
    /// point of view.
    #[inline]
    fn child(
        &mut self,
        board: &mut Board,
        depth: i32,
        alpha: i32,
        beta: i32,
        ply: usize,
    ) -> ChessResult<Option<i32>> {
        Ok(self.negamax(board, depth, -beta, -alpha, ply, true)?.map(|s| -s))
    }

    fn negamax(
        &mut self,
        board: &mut Board,
        depth: i32,
        mut alpha: i32,
        beta: i32,
        ply: usize,
        allow_null: bool,
    ) -> ChessResult<Option<i32>> {
        if self.should_stop() {
            return Ok(None);
        }
        let side = board.side_to_move();
        if ply >= MAX_PLY {
            return Ok(Some(self.scorer.score(board, side)));
        }

        let key = board.zobrist_key();
        let alpha_orig = alpha;
        if let Some(score) = self.tt.lookup(key, depth, alpha, beta, ply as i32) {
            return Ok(Some(score));
        }

        if depth <= 0 {
            return self.quiescence(board, alpha, beta, ply);
        }
        self.nodes += 1;

        let in_check = is_king_in_check(board, side);
        let extended = extends_check(in_check, ply, depth);
        let search_depth = if extended { depth + 1 } else { depth };

        if allow_null && null_move_allowed(board, side, depth, ply, in_check) {
            let reduction = null_move_reduction(depth);
            let undo = board.make_null_move();
            let score = self.negamax(board, depth - 1 - reduction, -beta, -beta + 1, ply + 1, false)?;
            board.undo_null_move(undo);
            let Some(score) = score else {
                return Ok(None);
            };
            if -score >= beta {
                return Ok(Some(beta));
            }
        }

        let mut moves = board.legal_moves(side)?;
        if moves.is_empty() {
            let score = if in_check {
                -(CHECKMATE_SCORE - ply as i32)
            } else {
                0
            };
            return Ok(Some(score));
        }

        let tt_move = self.tt.best_move(key).cloned();
        order_moves(board, &mut moves, tt_move.as_ref(), &*self.heuristics, ply);

        let mut best_score = -INFINITY;
        let mut best_idx = None;
        for i in 0..moves.len() {
            let quiet = !moves[i].is_tactical();
            board.make_move(&mut moves[i])?;
            let score =
                self.search_move(board, i, search_depth, alpha, beta, ply, quiet && !in_check && !extended)?;
            board.undo_move(&mut moves[i])?;

            let Some(score) = score else {
                return Ok(None);
            };
            if score > best_score {
                best_score = score;
                best_idx = Some(i);
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                if quiet {
                    self.heuristics.record_killer(ply, &moves[i]);
                    self.heuristics.record_history(&moves[i], depth);
                }
                break;
            }
        }

        let bound = if best_score <= alpha_orig {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(
            key,
            depth,
            best_score,
            bound,
            best_idx.map(|i| &moves[i]),
            ply as i32,
        );
        Ok(Some(best_score))
    }

    /// Search the move just made at index `index`: full window for the
    /// first move, otherwise a (possibly reduced) zero-window probe with
    /// re-searches when it beats alpha.
    #[allow(clippy::too_many_arguments)]
    fn search_move(
        &mut self,
        board: &mut Board,
        index: usize,
        depth: i32,
        alpha: i32,
        beta: i32,
        ply: usize,
        reducible: bool,
    ) -> ChessResult<Option<i32>> {
        let child_ply = ply + 1;
        if index == 0 {
            return self.child(board, depth - 1, alpha, beta, child_ply);
        }

        let reduction = if reducible && depth >= 3 {
            late_move_reduction(index)
        } else {
            0
        };

        let Some(mut score) = self.child(board, depth - 1 - reduction, alpha, alpha + 1, child_ply)?
        else {
            return Ok(None);
        };
        if reduction > 0 && score > alpha {
            let Some(s) = self.child(board, depth - 1, alpha, alpha + 1, child_ply)? else {
                return Ok(None);
            };
            score = s;
        }
        if score > alpha && score < beta {
            return self.child(board, depth - 1, alpha, beta, child_ply);
        }
        Ok(Some(score))
    }

    fn quiescence(
        &mut self,
        board: &mut Board,
        mut alpha: i32,
        beta: i32,
        ply: usize,
    ) -> ChessResult<Option<i32>> {
        if self.should_stop() {
            return Ok(None);
        }
        self.nodes += 1;

        let side = board.side_to_move();
        if ply >= MAX_PLY {
            return Ok(Some(self.scorer.score(board, side).min(beta)));
        }

        // In check there is no stand-pat: every evasion is searched and a
        // position without one is mate.
        let mut moves = if is_king_in_check(board, side) {
            let mut evasions = board.legal_moves(side)?;
            if evasions.is_empty() {
                return Ok(Some(-(CHECKMATE_SCORE - ply as i32)));
            }
            order_moves(board, &mut evasions, None, &*self.heuristics, ply);
            evasions
        } else {
            let stand_pat = self.scorer.score(board, side);
            if stand_pat >= beta {
                return Ok(Some(beta));
            }
            alpha = alpha.max(stand_pat);
            let mut captures = board.captures(side)?;
            order_tactical_moves(board, &mut captures);
            captures
        };
        for mv in moves.iter_mut() {
            board.make_move(mv)?;
            let score = self.quiescence(board, -beta, -alpha, ply + 1)?;
            board.undo_move(mv)?;

            let Some(score) = score else {
                return Ok(None);
            };
            let score = -score;
            if score >= beta {
                return Ok(Some(beta));
            }
            alpha = alpha.max(score);
        }
        Ok(Some(alpha))
    }
}

/// One-ply check extension, refused when the extended node would pass
/// `MAX_PLY`.
#[inline]
fn extends_check(in_check: bool, ply: usize, depth: i32) -> bool {
    in_check && ply + (depth.max(0) as usize) < MAX_PLY
}

/// Null move needs remaining depth, a non-root node, no check, and a
/// piece other than pawns and king so zugzwang positions are not pruned.
fn null_move_allowed(board: &Board, side: Color, depth: i32, ply: usize, in_check: bool) -> bool {
    depth >= 3 && !in_check && ply > 0 && board.has_non_pawn_material(side)
}

#[inline]
fn null_move_reduction(depth: i32) -> i32 {
    if depth > 6 {
        3
    } else {
        2
    }
}

/// Reduction for the move at `index` (number of moves already searched).
#[inline]
fn late_move_reduction(index: usize) -> i32 {
    if index > 10 {
        2
    } else if index > 4 {
        1
    } else {
        0
    }
}
