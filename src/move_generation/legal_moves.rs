//! Legal destination generation by simulate-then-filter.
//!
//! Every pseudo-legal destination is played on a scratch copy of the board
//! (en-passant removal and castling rook included) and dropped if the
//! acting side's king ends up attacked.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::apply_move::apply_move;
use crate::move_generation::attacks::is_king_in_check;
use crate::move_generation::pseudo_legal::pseudo_legal_destinations;

/// Legal destinations for the piece on `from` when moved by `actor`.
///
/// An empty square yields the empty set; whether `actor` may pick the piece
/// up at all is decided by the effect table, not here.
pub fn legal_destinations(game_state: &GameState, from: Square, actor: Color) -> u64 {
    let mut legal = 0u64;

    for to in squares_in(pseudo_legal_destinations(game_state, from, actor)) {
        let mut scratch = game_state.clone();
        if let Err(err) = apply_move(&mut scratch, from, to) {
            log::error!("pseudo-legal move {from}->{to} failed to apply: {err}");
            continue;
        }
        if !is_king_in_check(&scratch, actor) {
            legal |= square_bit(to);
        }
    }

    legal
}

/// Every legal `(from, to)` pair for the pieces `side` owns.
pub fn all_legal_moves(game_state: &GameState, side: Color) -> Vec<(Square, Square)> {
    let mut moves = Vec::new();
    for from in squares_in(game_state.pieces_of(side)) {
        for to in squares_in(legal_destinations(game_state, from, side)) {
            moves.push((from, to));
        }
    }
    moves
}

#[cfg(test)]
mod tests {
    use super::{all_legal_moves, legal_destinations};
    use crate::game_state::{chess_types::*, game_state::GameState};
    use crate::move_generation::apply_move::apply_move;
    use crate::move_generation::attacks::is_king_in_check;

    #[test]
    fn pinned_piece_cannot_leave_the_pin_line() {
        // Light bishop on e2 pinned by the dark rook on e8.
        let state = GameState::from_fen("4r1k1/8/8/8/8/8/4B3/4K3 w - - 0 1").expect("FEN should parse");
        assert_eq!(legal_destinations(&state, 12, Color::Light), 0);
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let state = GameState::from_fen("4k3/8/8/8/8/8/r7/4K3 w - - 0 1").expect("FEN should parse");
        let moves = legal_destinations(&state, 4, Color::Light);
        assert_eq!(moves, square_bit(3) | square_bit(5), "second rank is covered by the rook");
    }

    #[test]
    fn en_passant_that_exposes_the_king_is_filtered() {
        // Capturing d6 would open the fifth rank between the h5 rook and the a5 king.
        let state = GameState::from_fen("4k3/8/8/K2pP2r/8/8/8/8 w - d6 0 1").expect("FEN should parse");
        let moves = legal_destinations(&state, 36, Color::Light);
        assert_eq!(moves & square_bit(43), 0);
        assert!(moves & square_bit(44) != 0, "plain push stays legal");
    }

    #[test]
    fn empty_square_has_no_moves() {
        let state = GameState::new_game();
        assert_eq!(legal_destinations(&state, 27, Color::Light), 0);
    }

    #[test]
    fn legal_moves_never_leave_the_king_attacked() {
        let positions = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        ];
        for fen in positions {
            let state = GameState::from_fen(fen).expect("FEN should parse");
            let side = state.side_to_move;
            for (from, to) in all_legal_moves(&state, side) {
                let mut next = state.clone();
                apply_move(&mut next, from, to).expect("legal move should apply");
                assert!(
                    !is_king_in_check(&next, side),
                    "{from}->{to} leaves the king attacked in {fen}"
                );
            }
        }
    }
}
