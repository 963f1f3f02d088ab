use crate::game_state::chess_types::{Color, PieceKind, Square};

/// Stable handle into a board's piece arena. Grid cells and color lists store
/// ids so that captured pieces can be restored without copying.
pub type PieceId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
    pub row: u8,
    pub col: u8,
    pub has_moved: bool,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind, row: u8, col: u8) -> Self {
        Self {
            color,
            kind,
            row,
            col,
            has_moved: false,
        }
    }

    #[inline]
    pub const fn square(&self) -> Square {
        Square::new(self.row, self.col)
    }

    #[inline]
    pub fn set_square(&mut self, square: Square) {
        self.row = square.row;
        self.col = square.col;
    }

    /// Upper-case for White, lower-case for Black.
    pub fn symbol(&self) -> char {
        let ch = self.kind.symbol();
        match self.color {
            Color::White => ch.to_ascii_uppercase(),
            Color::Black => ch,
        }
    }
}
