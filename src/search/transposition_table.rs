//! Fixed-size transposition table keyed by Zobrist hash.
//!
//! One entry per slot, indexed by `key % capacity`, with depth-preferred
//! replacement. Mate scores are stored relative to the node that stored them
//! and converted back on lookup, so a mate found at one ply reads correctly
//! at another.

use crate::game_state::chess_move::Move;
use crate::search::board_scoring::MATE_THRESHOLD;

pub const DEFAULT_TT_ENTRIES: usize = 131_072;

/// How a stored score relates to the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// Fail-high: the true score is at least the stored one.
    Lower,
    /// Fail-low: the true score is at most the stored one.
    Upper,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TTEntry {
    pub key: u64,
    pub depth: i32,
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TTStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
}

#[derive(Debug, Clone)]
pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    stats: TTStats,
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(DEFAULT_TT_ENTRIES)
    }
}

impl TranspositionTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity.max(1)],
            stats: TTStats::default(),
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.stats = TTStats::default();
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn stats(&self) -> TTStats {
        self.stats
    }

    #[inline]
    fn idx(&self, key: u64) -> usize {
        (key % self.entries.len() as u64) as usize
    }

    /// Raw entry for `key`, ignoring depth and bound.
    pub fn probe(&self, key: u64) -> Option<&TTEntry> {
        self.entries[self.idx(key)].as_ref().filter(|e| e.key == key)
    }

    /// Usable score for a node searched to `depth` with window
    /// `(alpha, beta)` at `ply`, or `None` when the entry is missing, too
    /// shallow, or its bound does not decide the window.
    pub fn lookup(&mut self, key: u64, depth: i32, alpha: i32, beta: i32, ply: i32) -> Option<i32> {
        self.stats.probes += 1;
        let entry = self.probe(key)?;
        if entry.depth < depth {
            return None;
        }
        let score = score_from_tt(entry.score, ply);
        let usable = match entry.bound {
            Bound::Exact => true,
            Bound::Upper => score <= alpha,
            Bound::Lower => score >= beta,
        };
        if usable {
            self.stats.hits += 1;
            Some(score)
        } else {
            None
        }
    }

    /// Stored best move for `key` regardless of depth or bound.
    pub fn best_move(&self, key: u64) -> Option<&Move> {
        self.probe(key).and_then(|e| e.best_move.as_ref())
    }

    /// Store a search result. Replaces the slot when it is empty or the
    /// resident entry was searched no deeper than `depth`.
    pub fn store(
        &mut self,
        key: u64,
        depth: i32,
        score: i32,
        bound: Bound,
        best_move: Option<&Move>,
        ply: i32,
    ) {
        let idx = self.idx(key);
        let replace = match &self.entries[idx] {
            None => true,
            Some(existing) => existing.depth <= depth,
        };
        if !replace {
            return;
        }
        self.stats.stores += 1;
        self.entries[idx] = Some(TTEntry {
            key,
            depth,
            score: score_to_tt(score, ply),
            bound,
            best_move: best_move.map(Move::detached),
        });
    }
}

/// Convert a root-relative mate score into a node-relative one for storage.
#[inline]
pub fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply
    } else if score <= -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

#[inline]
pub fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply
    } else if score <= -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}
