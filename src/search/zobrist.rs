//! Zobrist hashing support for fast position identity.
//!
//! Keys are drawn from a seeded `StdRng`, so hashes are deterministic across
//! runs, which is useful for testing and debugging. A board holds an `Arc`
//! to the key set it was built with; `ZobristKeys::shared` hands out one
//! process-wide default set.

use std::fmt;
use std::sync::{Arc, OnceLock};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game_state::board::Board;
use crate::game_state::chess_rules::KING_HOME_COL;
use crate::game_state::chess_types::*;

#[derive(Clone, PartialEq, Eq)]
pub struct ZobristKeys {
    piece_square: [[[u64; 64]; 6]; 2],
    castling: [u64; 16],
    en_passant_file: [u64; 8],
    side_to_move: u64,
}

static SHARED: OnceLock<Arc<ZobristKeys>> = OnceLock::new();

impl ZobristKeys {
    pub const DEFAULT_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

    pub fn from_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut piece_square = [[[0u64; 64]; 6]; 2];
        for color in &mut piece_square {
            for piece in color {
                for sq in piece {
                    *sq = rng.random();
                }
            }
        }

        let mut castling = [0u64; 16];
        for key in &mut castling {
            *key = rng.random();
        }

        let mut en_passant_file = [0u64; 8];
        for key in &mut en_passant_file {
            *key = rng.random();
        }

        Self {
            piece_square,
            castling,
            en_passant_file,
            side_to_move: rng.random(),
        }
    }

    /// Process-wide default key set.
    pub fn shared() -> Arc<ZobristKeys> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(ZobristKeys::from_seed(Self::DEFAULT_SEED))))
    }

    /// Key for a `(color, piece, square)` occupancy term.
    #[inline]
    pub fn piece_square(&self, color: Color, kind: PieceKind, square: Square) -> u64 {
        self.piece_square[color.index()][kind.index()][square.index()]
    }

    /// Key contribution for castling rights mask (`0..=15`).
    #[inline]
    pub fn castling(&self, rights: CastlingRights) -> u64 {
        self.castling[(rights & 0x0F) as usize]
    }

    #[inline]
    pub fn en_passant_file(&self, col: u8) -> u64 {
        self.en_passant_file[(col & 7) as usize]
    }

    /// Side-to-move toggle (xor in when Black is to move).
    #[inline]
    pub fn side_to_move(&self) -> u64 {
        self.side_to_move
    }
}

impl fmt::Debug for ZobristKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZobristKeys")
            .field("side_to_move", &format_args!("{:#018x}", self.side_to_move))
            .finish_non_exhaustive()
    }
}

/// Derive the castling mask from king and rook `has_moved` flags on their
/// home squares.
pub fn castling_mask(board: &Board) -> CastlingRights {
    let mut rights = 0;
    for (color, kingside, queenside) in [
        (Color::White, CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE),
        (Color::Black, CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE),
    ] {
        let row = color.back_row();
        if !is_unmoved(board, Square::new(row, KING_HOME_COL), color, PieceKind::King) {
            continue;
        }
        if is_unmoved(board, Square::new(row, 7), color, PieceKind::Rook) {
            rights |= kingside;
        }
        if is_unmoved(board, Square::new(row, 0), color, PieceKind::Rook) {
            rights |= queenside;
        }
    }
    rights
}

fn is_unmoved(board: &Board, square: Square, color: Color, kind: PieceKind) -> bool {
    board
        .piece_on(square)
        .is_some_and(|p| p.color == color && p.kind == kind && !p.has_moved)
}

/// Compute the full position key from scratch: pieces, castling mask,
/// en-passant file, and side to move.
pub fn compute_hash(board: &Board, side_to_move: Color) -> u64 {
    let keys = board.keys();
    let mut key = 0u64;

    for row in 0..8u8 {
        for col in 0..8u8 {
            let square = Square::new(row, col);
            if let Some(piece) = board.piece_on(square) {
                key ^= keys.piece_square(piece.color, piece.kind, square);
            }
        }
    }

    key ^= keys.castling(castling_mask(board));

    if let Some(ep) = board.en_passant() {
        key ^= keys.en_passant_file(ep.col);
    }

    if side_to_move == Color::Black {
        key ^= keys.side_to_move();
    }

    key
}
