//! Crate root module declarations for the mailbox chess engine core.
//!
//! Exposes the position model (board, pieces, moves, undo records), legal
//! move generation, evaluation, and the iterative-deepening search so
//! front ends, binaries, and benchmarks can import stable module paths.

pub mod errors;

pub mod game_state {
    pub mod board;
    pub mod chess_move;
    pub mod chess_rules;
    pub mod chess_types;
    pub mod piece;
    pub mod undo_state;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod legal_moves_king;
    pub mod legal_moves_knight;
    pub mod legal_moves_pawn;
    pub mod legal_moves_sliders;
    pub mod perft;
    pub mod pseudo_legal;
}

pub mod search {
    pub mod board_scoring;
    pub mod iterative_deepening;
    pub mod move_ordering;
    pub mod transposition_table;
    pub mod zobrist;
}

pub mod utils {
    pub mod algebraic;
    pub mod render_board;
}

pub use errors::{ChessError, ChessResult};
pub use game_state::board::Board;
pub use game_state::chess_move::{Move, MoveKind};
pub use game_state::chess_types::{Color, GameStatus, PieceKind, Square};
pub use game_state::piece::{Piece, PieceId};
pub use search::iterative_deepening::{find_best_move, SearchConfig, SearchEngine, SearchResult};
