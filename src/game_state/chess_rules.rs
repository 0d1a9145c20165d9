//! Canonical chess-rule constants.
//!
//! Starting position, pawn ranks, and the castling geometry table used by
//! both move generation and move application.

use crate::game_state::chess_types::*;

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[inline]
pub const fn pawn_start_rank(color: Color) -> u8 {
    match color {
        Color::Light => 1,
        Color::Dark => 6,
    }
}

#[inline]
pub const fn promotion_rank(color: Color) -> u8 {
    match color {
        Color::Light => 7,
        Color::Dark => 0,
    }
}

/// One castling option: the right it needs and the squares involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlePath {
    pub color: Color,
    pub right: CastlingRights,
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
    /// Squares between king and rook that must be empty.
    pub between: u64,
    /// King start, transit and destination; none may be attacked.
    pub king_path: u64,
}

pub const CASTLE_PATHS: [CastlePath; 4] = [
    CastlePath {
        color: Color::Light,
        right: CASTLE_LIGHT_KINGSIDE,
        king_from: 4,
        king_to: 6,
        rook_from: 7,
        rook_to: 5,
        between: square_bit(5) | square_bit(6),
        king_path: square_bit(4) | square_bit(5) | square_bit(6),
    },
    CastlePath {
        color: Color::Light,
        right: CASTLE_LIGHT_QUEENSIDE,
        king_from: 4,
        king_to: 2,
        rook_from: 0,
        rook_to: 3,
        between: square_bit(1) | square_bit(2) | square_bit(3),
        king_path: square_bit(4) | square_bit(3) | square_bit(2),
    },
    CastlePath {
        color: Color::Dark,
        right: CASTLE_DARK_KINGSIDE,
        king_from: 60,
        king_to: 62,
        rook_from: 63,
        rook_to: 61,
        between: square_bit(61) | square_bit(62),
        king_path: square_bit(60) | square_bit(61) | square_bit(62),
    },
    CastlePath {
        color: Color::Dark,
        right: CASTLE_DARK_QUEENSIDE,
        king_from: 60,
        king_to: 58,
        rook_from: 56,
        rook_to: 59,
        between: square_bit(57) | square_bit(58) | square_bit(59),
        king_path: square_bit(60) | square_bit(59) | square_bit(58),
    },
];

/// Castling rights lost when anything leaves or lands on `square`.
#[inline]
pub const fn rights_cleared_by(square: Square) -> CastlingRights {
    match square {
        0 => CASTLE_LIGHT_QUEENSIDE,
        4 => CASTLE_LIGHT_KINGSIDE | CASTLE_LIGHT_QUEENSIDE,
        7 => CASTLE_LIGHT_KINGSIDE,
        56 => CASTLE_DARK_QUEENSIDE,
        60 => CASTLE_DARK_KINGSIDE | CASTLE_DARK_QUEENSIDE,
        63 => CASTLE_DARK_KINGSIDE,
        _ => 0,
    }
}

/// The castling option whose king move is `from -> to`, if any.
pub fn castle_path_for(from: Square, to: Square) -> Option<&'static CastlePath> {
    CASTLE_PATHS
        .iter()
        .find(|path| path.king_from == from && path.king_to == to)
}
