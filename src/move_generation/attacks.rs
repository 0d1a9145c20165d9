//! Attack reach used for king safety and castling checks.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::offsets::{
    king_attacks, knight_attacks, pawn_attacks, slider_attacks, BISHOP_DIRECTIONS,
    QUEEN_DIRECTIONS, ROOK_DIRECTIONS,
};

/// Union of the raw attack reach of every piece `side` owns.
///
/// Sliders reach through to and including the first blocker of either
/// colour. Pawns attack only their diagonals. Removed tiles are never
/// attacked and block rays.
pub fn attacked_squares(game_state: &GameState, side: Color) -> u64 {
    let occupancy = game_state.occupancy_all();
    let removed = game_state.removed_tiles;
    let mut attacked = 0u64;

    for from in squares_in(game_state.pieces_of(side)) {
        let Some(piece) = game_state.piece_at(from) else {
            continue;
        };
        attacked |= match piece.kind {
            PieceKind::Pawn => pawn_attacks(piece.color, from),
            PieceKind::Knight => knight_attacks(from),
            PieceKind::King => king_attacks(from),
            PieceKind::Bishop => slider_attacks(from, &BISHOP_DIRECTIONS, occupancy, removed),
            PieceKind::Rook => slider_attacks(from, &ROOK_DIRECTIONS, occupancy, removed),
            PieceKind::Queen => slider_attacks(from, &QUEEN_DIRECTIONS, occupancy, removed),
        };
    }

    attacked & !removed
}

#[inline]
pub fn is_square_attacked(game_state: &GameState, square: Square, attacker: Color) -> bool {
    attacked_squares(game_state, attacker) & square_bit(square) != 0
}

/// Whether `color`'s king stands attacked. A side without a king is never
/// in check; the turn controller treats that as a loss instead.
#[inline]
pub fn is_king_in_check(game_state: &GameState, color: Color) -> bool {
    let Some(king_sq) = game_state.king_square(color) else {
        return false;
    };
    is_square_attacked(game_state, king_sq, color.opposite())
}

#[cfg(test)]
mod tests {
    use super::{attacked_squares, is_king_in_check};
    use crate::game_state::{chess_types::*, game_state::GameState};

    #[test]
    fn starting_position_attacks_ranks_three_and_six() {
        let state = GameState::new_game();
        let light = attacked_squares(&state, Color::Light);
        for square in 16..24u8 {
            assert!(light & square_bit(square) != 0, "light should attack square {square}");
        }
        assert_eq!(light & (0xFFu64 << 24), 0, "nothing reaches rank 4 yet");

        let dark = attacked_squares(&state, Color::Dark);
        for square in 40..48u8 {
            assert!(dark & square_bit(square) != 0, "dark should attack square {square}");
        }
    }

    #[test]
    fn sliders_include_own_blockers_in_reach() {
        // Rook a1 with own pawn on a3: a2 and a3 are attacked, a4 is not.
        let state = GameState::from_fen("4k3/8/8/8/8/P7/8/R3K3 w - - 0 1").expect("FEN should parse");
        let light = attacked_squares(&state, Color::Light);
        assert!(light & square_bit(8) != 0);
        assert!(light & square_bit(16) != 0);
        assert_eq!(light & square_bit(24), 0, "a3 pawn only attacks b4");
    }

    #[test]
    fn pawn_pushes_are_not_attacks() {
        let state = GameState::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").expect("FEN should parse");
        let light = attacked_squares(&state, Color::Light);
        assert_eq!(light & square_bit(20), 0, "e3 is a push target, not an attack");
        assert!(light & square_bit(21) != 0, "e2 pawn attacks f3");
        assert!(light & square_bit(19) != 0, "e2 pawn attacks d3");
    }

    #[test]
    fn removed_tile_shields_the_king() {
        let mut state = GameState::from_fen("4k3/8/8/8/8/8/8/r3K3 w - - 0 1").expect("FEN should parse");
        assert!(is_king_in_check(&state, Color::Light));
        state.remove_tile(2);
        assert!(!is_king_in_check(&state, Color::Light));
    }
}
