//! Core value types shared by the board, effect table and session layers.
//!
//! Squares are `0..=63` with `0 == a1`, `rank = index / 8`, `file = index % 8`.
//! Rank 0 is the light side's home rank.

use serde::{Deserialize, Serialize};

pub use crate::game_state::game_state::GameState;

/// Side to move, or the owner of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::Light => 0,
            Color::Dark => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }

    /// Sign used by the signed piece encoding: light is positive.
    #[inline]
    pub const fn sign(self) -> i8 {
        match self {
            Color::Light => 1,
            Color::Dark => -1,
        }
    }

    /// Rank step of a forward pawn push for this side.
    #[inline]
    pub const fn forward(self) -> i8 {
        self.sign()
    }
}

/// Piece kind. Discriminants follow the wire encoding (king = 1 .. pawn = 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    King = 1,
    Queen = 2,
    Bishop = 3,
    Knight = 4,
    Rook = 5,
    Pawn = 6,
}

impl PieceKind {
    #[inline]
    pub const fn code(self) -> i8 {
        self as i8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(PieceKind::King),
            2 => Some(PieceKind::Queen),
            3 => Some(PieceKind::Bishop),
            4 => Some(PieceKind::Knight),
            5 => Some(PieceKind::Rook),
            6 => Some(PieceKind::Pawn),
            _ => None,
        }
    }

    /// Lowercase FEN letter for this kind.
    pub const fn fen_char(self) -> char {
        match self {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Rook => 'r',
            PieceKind::Pawn => 'p',
        }
    }

    pub const fn from_fen_char(ch: char) -> Option<Self> {
        match ch.to_ascii_lowercase() {
            'k' => Some(PieceKind::King),
            'q' => Some(PieceKind::Queen),
            'b' => Some(PieceKind::Bishop),
            'n' => Some(PieceKind::Knight),
            'r' => Some(PieceKind::Rook),
            'p' => Some(PieceKind::Pawn),
            _ => None,
        }
    }
}

/// A piece on the board: owner plus kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    #[inline]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Signed small-int encoding: `kind * sign`, `0` is reserved for empty.
    #[inline]
    pub const fn code(self) -> i8 {
        self.kind.code() * self.color.sign()
    }

    pub const fn from_code(code: i8) -> Option<Self> {
        let color = if code > 0 { Color::Light } else { Color::Dark };
        match PieceKind::from_code(code.unsigned_abs()) {
            Some(kind) => Some(Piece::new(color, kind)),
            None => None,
        }
    }

    pub const fn fen_char(self) -> char {
        let ch = self.kind.fen_char();
        match self.color {
            Color::Light => ch.to_ascii_uppercase(),
            Color::Dark => ch,
        }
    }
}

/// Encode an optional piece for snapshots (`0` for empty).
#[inline]
pub fn piece_code(piece: Option<Piece>) -> i8 {
    piece.map_or(0, Piece::code)
}

pub const CASTLE_LIGHT_KINGSIDE: CastlingRights = 1 << 0;
pub const CASTLE_LIGHT_QUEENSIDE: CastlingRights = 1 << 1;
pub const CASTLE_DARK_KINGSIDE: CastlingRights = 1 << 2;
pub const CASTLE_DARK_QUEENSIDE: CastlingRights = 1 << 3;
pub type CastlingRights = u8;

/// Board square index (`0..=63`).
pub type Square = u8;

#[inline]
pub const fn square_at(rank: u8, file: u8) -> Square {
    rank * 8 + file
}

#[inline]
pub const fn rank_of(square: Square) -> u8 {
    square / 8
}

#[inline]
pub const fn file_of(square: Square) -> u8 {
    square % 8
}

#[inline]
pub const fn square_bit(square: Square) -> u64 {
    1u64 << square
}

/// Step from `square` by `(d_file, d_rank)`, or `None` when it leaves the board.
#[inline]
pub const fn offset_square(square: Square, d_file: i8, d_rank: i8) -> Option<Square> {
    let file = file_of(square) as i8 + d_file;
    let rank = rank_of(square) as i8 + d_rank;
    if file < 0 || file > 7 || rank < 0 || rank > 7 {
        None
    } else {
        Some(square_at(rank as u8, file as u8))
    }
}

/// Iterate the squares set in a mask, lowest index first.
pub fn squares_in(mut mask: u64) -> impl Iterator<Item = Square> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let square = mask.trailing_zeros() as Square;
        mask &= mask - 1;
        Some(square)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_codes_are_signed_by_color() {
        assert_eq!(Piece::new(Color::Light, PieceKind::King).code(), 1);
        assert_eq!(Piece::new(Color::Dark, PieceKind::Pawn).code(), -6);
        assert_eq!(
            Piece::from_code(-5),
            Some(Piece::new(Color::Dark, PieceKind::Rook))
        );
        assert_eq!(Piece::from_code(0), None);
        assert_eq!(piece_code(None), 0);
    }

    #[test]
    fn offset_square_rejects_wraparound() {
        assert_eq!(offset_square(7, 1, 0), None, "h1 has no east neighbour");
        assert_eq!(offset_square(8, -1, 0), None, "a2 has no west neighbour");
        assert_eq!(offset_square(12, 0, 2), Some(28));
    }

    #[test]
    fn squares_in_walks_bits_in_order() {
        let squares: Vec<Square> = squares_in(square_bit(3) | square_bit(40) | square_bit(63)).collect();
        assert_eq!(squares, vec![3, 40, 63]);
    }
}
