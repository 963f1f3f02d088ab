//! Error type shared by board mutation, move generation, and search.
//!
//! Illegal user input is never reported through this type: stale pieces and
//! unreachable destinations produce empty move lists or `None`. An error here
//! means a caller broke a board contract (placing onto an occupied square,
//! applying a move twice, undoing out of order).

use thiserror::Error;

use crate::game_state::chess_types::{Color, Square};

pub type ChessResult<T> = Result<T, ChessError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("square {0} is already occupied")]
    OccupiedSquare(Square),
    #[error("coordinates ({row}, {col}) are outside the board")]
    OutOfBounds { row: i32, col: i32 },
    #[error("{0:?} already has a king on the board")]
    DuplicateKing(Color),
    #[error("no piece on source square {0}")]
    EmptySource(Square),
    #[error("move {from}->{to} is already applied")]
    MoveAlreadyApplied { from: Square, to: Square },
    #[error("move {from}->{to} was never applied")]
    MoveNotApplied { from: Square, to: Square },
    #[error("piece id {0} does not exist on this board")]
    UnknownPiece(usize),
}
