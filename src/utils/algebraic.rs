//! Coordinate conversions between algebraic names (`e4`), rank/file pairs
//! as clients send them, and internal square indices.

use crate::errors::BoardError;
use crate::game_state::chess_types::{file_of, rank_of, square_at, Square};

/// Convert algebraic notation (for example: "e4") to a square index.
pub fn algebraic_to_square(square: &str) -> Result<Square, BoardError> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(BoardError::InvalidAlgebraic(square.to_owned()));
    }

    let file = bytes[0];
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(BoardError::InvalidAlgebraic(square.to_owned()));
    }

    Ok(square_at(rank - b'1', file - b'a'))
}

/// Convert a square index (`0..=63`) to algebraic notation.
pub fn square_to_algebraic(square: Square) -> Result<String, BoardError> {
    if square > 63 {
        return Err(BoardError::SquareOutOfRange(square));
    }

    let file_char = char::from(b'a' + file_of(square));
    let rank_char = char::from(b'1' + rank_of(square));
    Ok(format!("{file_char}{rank_char}"))
}

/// Validate a client-supplied `(rank, file)` pair.
pub fn rank_file_to_square(rank: u8, file: u8) -> Result<Square, BoardError> {
    if rank > 7 {
        return Err(BoardError::SquareOutOfRange(rank));
    }
    if file > 7 {
        return Err(BoardError::SquareOutOfRange(file));
    }
    Ok(square_at(rank, file))
}
