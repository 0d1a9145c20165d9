//! Perft node counting over the legal move generator.

use crate::game_state::game_state::GameState;
use crate::move_generation::apply_move::apply_move;
use crate::move_generation::legal_moves::all_legal_moves;

/// Count leaf nodes `depth` plies below `game_state`.
///
/// Promotions are always to a queen, so positions with promotions inside the
/// horizon count fewer nodes than orthodox perft tables.
pub fn perft(game_state: &GameState, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let side = game_state.side_to_move;
    let moves = all_legal_moves(game_state, side);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for (from, to) in moves {
        let mut next = game_state.clone();
        if apply_move(&mut next, from, to).is_err() {
            continue;
        }
        next.side_to_move = side.opposite();
        nodes += perft(&next, depth - 1);
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::perft;
    use crate::game_state::game_state::GameState;

    #[test]
    fn perft_start_position() {
        let state = GameState::new_game();
        assert_eq!(perft(&state, 1), 20);
        assert_eq!(perft(&state, 2), 400);
        assert_eq!(perft(&state, 3), 8902);
    }

    #[test]
    fn perft_kiwipete_shallow() {
        let state = GameState::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .expect("FEN should parse");
        assert_eq!(perft(&state, 1), 48);
        assert_eq!(perft(&state, 2), 2039);
    }

    #[test]
    fn perft_rook_endgame_with_en_passant() {
        let state =
            GameState::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").expect("FEN should parse");
        assert_eq!(perft(&state, 1), 14);
        assert_eq!(perft(&state, 2), 191);
        assert_eq!(perft(&state, 3), 2812);
    }
}
