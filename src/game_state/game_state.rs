//! Core board state representation.
//!
//! `GameState` is the value snapshot the rules engine works on. It is a plain
//! fixed-size mailbox plus per-side occupancy masks, so legality checks can
//! clone it per candidate move and throw the copy away.

use crate::errors::BoardError;
use crate::game_state::chess_rules::{promotion_rank, rights_cleared_by, STARTING_POSITION_FEN};
use crate::game_state::chess_types::*;
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    // --- Placement ---
    pub squares: [Option<Piece>; 64],

    // Occupancy caches, kept in sync by the mutators below.
    pub occupancy_by_color: [u64; 2],

    /// Tiles taken out of play by spells. Nothing may enter or cross them.
    pub removed_tiles: u64,

    // --- Side and state flags ---
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<Square>,

    // --- Clocks / move counters ---
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            squares: [None; 64],
            occupancy_by_color: [0; 2],
            removed_tiles: 0,

            side_to_move: Color::Light,
            castling_rights: 0,
            en_passant_square: None,

            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

impl GameState {
    #[inline]
    pub fn new_empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn new_game() -> Self {
        parse_fen(STARTING_POSITION_FEN).expect("starting FEN should always parse")
    }

    #[inline]
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        parse_fen(fen)
    }

    #[inline]
    pub fn get_fen(&self) -> String {
        generate_fen(self)
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square as usize]
    }

    #[inline]
    pub fn occupancy_all(&self) -> u64 {
        self.occupancy_by_color[0] | self.occupancy_by_color[1]
    }

    #[inline]
    pub fn pieces_of(&self, color: Color) -> u64 {
        self.occupancy_by_color[color.index()]
    }

    #[inline]
    pub fn is_removed(&self, square: Square) -> bool {
        self.removed_tiles & square_bit(square) != 0
    }

    /// Empty and still in play.
    #[inline]
    pub fn is_open(&self, square: Square) -> bool {
        self.piece_at(square).is_none() && !self.is_removed(square)
    }

    /// Put `piece` on `square`, replacing whatever stood there.
    pub fn place_piece(&mut self, square: Square, piece: Piece) {
        self.take_piece(square);
        self.squares[square as usize] = Some(piece);
        self.occupancy_by_color[piece.color.index()] |= square_bit(square);
    }

    /// Remove and return the piece on `square`.
    pub fn take_piece(&mut self, square: Square) -> Option<Piece> {
        let piece = self.squares[square as usize].take()?;
        self.occupancy_by_color[piece.color.index()] &= !square_bit(square);
        Some(piece)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        let king = Piece::new(color, PieceKind::King);
        squares_in(self.pieces_of(color)).find(|&sq| self.piece_at(sq) == Some(king))
    }

    #[inline]
    pub fn has_king(&self, color: Color) -> bool {
        self.king_square(color).is_some()
    }

    /// Move a piece onto an open square without any chess side effects other
    /// than castling-rights loss and promotion. Used by displacement spells.
    pub fn displace_piece(&mut self, from: Square, to: Square) -> Result<Piece, BoardError> {
        if self.is_removed(to) {
            return Err(BoardError::RemovedTile(to));
        }
        // Displacement never captures.
        if self.piece_at(to).is_some() {
            return Err(BoardError::SquareOccupied(to));
        }
        let mut piece = self.take_piece(from).ok_or(BoardError::EmptySquare(from))?;
        if piece.kind == PieceKind::Pawn && rank_of(to) == promotion_rank(piece.color) {
            piece.kind = PieceKind::Queen;
        }
        self.castling_rights &= !(rights_cleared_by(from) | rights_cleared_by(to));
        self.place_piece(to, piece);
        Ok(piece)
    }

    pub fn remove_tile(&mut self, square: Square) {
        self.removed_tiles |= square_bit(square);
    }

    pub fn repair_tile(&mut self, square: Square) {
        self.removed_tiles &= !square_bit(square);
    }

    /// Rebuild the occupancy masks from the mailbox.
    pub fn recalc_occupancy(&mut self) {
        self.occupancy_by_color = [0; 2];
        for (index, piece) in self.squares.iter().enumerate() {
            if let Some(piece) = piece {
                self.occupancy_by_color[piece.color.index()] |= 1u64 << index;
            }
        }
    }

    /// Signed piece codes for all 64 squares, `a1` first.
    pub fn board_codes(&self) -> Vec<i8> {
        self.squares.iter().map(|piece| piece_code(*piece)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::GameState;
    use crate::game_state::chess_types::*;

    #[test]
    fn new_game_has_both_kings_and_full_rights() {
        let state = GameState::new_game();
        assert_eq!(state.king_square(Color::Light), Some(4));
        assert_eq!(state.king_square(Color::Dark), Some(60));
        assert_eq!(state.castling_rights, 0b1111);
        assert_eq!(state.occupancy_all().count_ones(), 32);
    }

    #[test]
    fn place_and_take_keep_occupancy_in_sync() {
        let mut state = GameState::new_empty();
        state.place_piece(27, Piece::new(Color::Dark, PieceKind::Knight));
        assert_eq!(state.pieces_of(Color::Dark), square_bit(27));

        state.place_piece(27, Piece::new(Color::Light, PieceKind::Rook));
        assert_eq!(state.pieces_of(Color::Dark), 0, "replaced piece should leave occupancy");
        assert_eq!(state.pieces_of(Color::Light), square_bit(27));

        let taken = state.take_piece(27).expect("rook should be there");
        assert_eq!(taken.kind, PieceKind::Rook);
        assert_eq!(state.occupancy_all(), 0);
    }

    #[test]
    fn displacing_a_rook_off_its_home_square_clears_that_right() {
        let mut state =
            GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN should parse");
        state.displace_piece(7, 15).expect("h2 is open");
        assert_eq!(state.castling_rights & CASTLE_LIGHT_KINGSIDE, 0);
        assert_ne!(state.castling_rights & CASTLE_LIGHT_QUEENSIDE, 0);
    }

    #[test]
    fn displacement_refuses_removed_tiles() {
        let mut state = GameState::new_game();
        state.remove_tile(20);
        assert!(state.displace_piece(12, 20).is_err());
        assert!(state.piece_at(12).is_some(), "pawn should not have moved");
    }
}
