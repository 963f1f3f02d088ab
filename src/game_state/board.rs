//! Mailbox board with incremental state.
//!
//! `Board` owns every piece in an arena and refers to them by [`PieceId`].
//! Alongside the 8x8 grid it keeps per-color piece lists, king references,
//! the en-passant target, the castling mask, a Zobrist key, and a
//! white-positive material + piece-square accumulator. `make_move` /
//! `undo_move` (see `move_generation::legal_move_apply`) keep all of these in
//! step with the grid.

use std::sync::Arc;

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::{signed_piece_score, BACK_RANK};
use crate::game_state::chess_types::*;
use crate::game_state::piece::{Piece, PieceId};
use crate::search::zobrist::{castling_mask, compute_hash, ZobristKeys};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) grid: [[Option<PieceId>; 8]; 8],
    pub(crate) arena: Vec<Piece>,
    pub(crate) pieces: [Vec<PieceId>; 2],
    pub(crate) kings: [Option<PieceId>; 2],
    pub(crate) en_passant: Option<Square>,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) zobrist_key: u64,
    pub(crate) side_to_move: Color,
    pub(crate) eval: i32,
    pub(crate) keys: Arc<ZobristKeys>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Empty board, White to move, using the shared key set.
    pub fn new() -> Self {
        Self::with_keys(ZobristKeys::shared())
    }

    pub fn with_keys(keys: Arc<ZobristKeys>) -> Self {
        let zobrist_key = keys.castling(0);
        Self {
            grid: [[None; 8]; 8],
            arena: Vec::with_capacity(32),
            pieces: [Vec::with_capacity(16), Vec::with_capacity(16)],
            kings: [None, None],
            en_passant: None,
            castling_rights: 0,
            zobrist_key,
            side_to_move: Color::White,
            eval: 0,
            keys,
        }
    }

    pub fn starting_position() -> Self {
        let mut board = Self::new();
        board.initialize_board();
        board
    }

    /// Reset to the standard starting layout, keeping this board's key set.
    pub fn initialize_board(&mut self) {
        *self = Self::with_keys(Arc::clone(&self.keys));
        for color in [Color::Black, Color::White] {
            let back = color.back_row();
            for (col, kind) in BACK_RANK.iter().enumerate() {
                self.insert_piece(Piece::new(color, *kind, back, col as u8));
            }
            for col in 0..8u8 {
                self.insert_piece(Piece::new(color, PieceKind::Pawn, color.pawn_start_row(), col));
            }
        }
    }

    /// Register a piece during setup.
    ///
    /// Fails on an out-of-range or occupied square and on a second king of
    /// the same color. Folds the piece into the hash and evaluation, then
    /// recomputes the castling mask.
    pub fn place_piece(&mut self, piece: Piece) -> ChessResult<PieceId> {
        if piece.row >= 8 || piece.col >= 8 {
            return Err(ChessError::OutOfBounds {
                row: i32::from(piece.row),
                col: i32::from(piece.col),
            });
        }
        if self.grid[piece.row as usize][piece.col as usize].is_some() {
            return Err(ChessError::OccupiedSquare(piece.square()));
        }
        if piece.kind == PieceKind::King && self.kings[piece.color.index()].is_some() {
            return Err(ChessError::DuplicateKing(piece.color));
        }
        Ok(self.insert_piece(piece))
    }

    fn insert_piece(&mut self, piece: Piece) -> PieceId {
        let id = self.arena.len();
        self.arena.push(piece);
        self.grid[piece.row as usize][piece.col as usize] = Some(id);
        self.pieces[piece.color.index()].push(id);
        if piece.kind == PieceKind::King {
            self.kings[piece.color.index()] = Some(id);
        }
        self.zobrist_key ^= self
            .keys
            .piece_square(piece.color, piece.kind, piece.square());
        self.eval += signed_piece_score(piece.kind, piece.color, piece.row, piece.col);
        self.refresh_castling_rights();
        id
    }

    /// Setup helper; re-hashes the side-to-move term.
    pub fn set_side_to_move(&mut self, color: Color) {
        if self.side_to_move != color {
            self.side_to_move = color;
            self.zobrist_key ^= self.keys.side_to_move();
        }
    }

    /// Setup helper for positions reached after a double pawn push.
    pub fn set_en_passant(&mut self, target: Option<Square>) {
        if let Some(old) = self.en_passant {
            self.zobrist_key ^= self.keys.en_passant_file(old.col);
        }
        self.en_passant = target;
        if let Some(new) = target {
            self.zobrist_key ^= self.keys.en_passant_file(new.col);
        }
    }

    /// Recompute the castling mask from `has_moved` flags and swap its key.
    pub(crate) fn refresh_castling_rights(&mut self) {
        let rights = castling_mask(self);
        if rights != self.castling_rights {
            self.zobrist_key ^= self.keys.castling(self.castling_rights);
            self.zobrist_key ^= self.keys.castling(rights);
            self.castling_rights = rights;
        }
    }

    #[inline]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.arena.get(id)
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<PieceId> {
        self.grid[square.row as usize][square.col as usize]
    }

    #[inline]
    pub fn piece_on(&self, square: Square) -> Option<&Piece> {
        self.piece_at(square).map(|id| &self.arena[id])
    }

    /// True when the piece is on the grid at its own coordinates; captured
    /// pieces keep their last coordinates but no longer own the cell.
    #[inline]
    pub fn is_live(&self, id: PieceId) -> bool {
        self.arena
            .get(id)
            .is_some_and(|p| self.piece_at(p.square()) == Some(id))
    }

    /// Live piece ids of `color`, in list order.
    #[inline]
    pub fn pieces(&self, color: Color) -> &[PieceId] {
        &self.pieces[color.index()]
    }

    #[inline]
    pub fn king(&self, color: Color) -> Option<PieceId> {
        self.kings[color.index()]
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.king(color).map(|id| self.arena[id].square())
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    pub fn zobrist_key(&self) -> u64 {
        self.zobrist_key
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// White-positive material + piece-square sum, maintained incrementally.
    #[inline]
    pub fn evaluation_accumulator(&self) -> i32 {
        self.eval
    }

    #[inline]
    pub fn keys(&self) -> &Arc<ZobristKeys> {
        &self.keys
    }

    /// From-scratch recomputation of the accumulator.
    pub fn recompute_evaluation(&self) -> i32 {
        [Color::White, Color::Black]
            .iter()
            .flat_map(|color| self.pieces(*color))
            .map(|id| {
                let p = &self.arena[*id];
                signed_piece_score(p.kind, p.color, p.row, p.col)
            })
            .sum()
    }

    /// From-scratch recomputation of the Zobrist key.
    pub fn recompute_hash(&self) -> u64 {
        compute_hash(self, self.side_to_move)
    }

    /// True when the side owns anything besides pawns and its king.
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        self.pieces(color).iter().any(|id| {
            !matches!(self.arena[*id].kind, PieceKind::Pawn | PieceKind::King)
        })
    }

    /// Debug check of the grid/list/coordinate agreement.
    pub fn is_consistent(&self) -> bool {
        let mut seen = 0usize;
        for color in [Color::White, Color::Black] {
            for id in self.pieces(color) {
                let Some(piece) = self.arena.get(*id) else {
                    return false;
                };
                if piece.color != color || self.piece_at(piece.square()) != Some(*id) {
                    return false;
                }
                seen += 1;
            }
        }
        let occupied = self.grid.iter().flatten().filter(|c| c.is_some()).count();
        occupied == seen
    }
}
