//! Pseudo-legal destination generation.
//!
//! `actor` is the side moving the piece, which is not always the owner: a
//! piece under `control` is moved by its owner's opponent. Friend and enemy
//! are judged from the actor, pawn direction from the piece's own colour.

use crate::game_state::chess_rules::{pawn_start_rank, CASTLE_PATHS};
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::attacks::attacked_squares;
use crate::moves::offsets::{
    king_attacks, knight_attacks, pawn_attacks, slider_attacks, BISHOP_DIRECTIONS,
    QUEEN_DIRECTIONS, ROOK_DIRECTIONS,
};

/// Destinations for the piece on `from` obeying movement rules only.
pub fn pseudo_legal_destinations(game_state: &GameState, from: Square, actor: Color) -> u64 {
    let Some(piece) = game_state.piece_at(from) else {
        return 0;
    };

    let friendly = game_state.pieces_of(actor);
    let occupancy = game_state.occupancy_all();
    let removed = game_state.removed_tiles;

    let reach = match piece.kind {
        PieceKind::Pawn => return pawn_destinations(game_state, from, piece, actor),
        PieceKind::Knight => knight_attacks(from),
        PieceKind::King => {
            king_attacks(from) | castling_destinations(game_state, from, piece, actor)
        }
        PieceKind::Bishop => slider_attacks(from, &BISHOP_DIRECTIONS, occupancy, removed),
        PieceKind::Rook => slider_attacks(from, &ROOK_DIRECTIONS, occupancy, removed),
        PieceKind::Queen => slider_attacks(from, &QUEEN_DIRECTIONS, occupancy, removed),
    };

    reach & !friendly & !removed
}

fn pawn_destinations(game_state: &GameState, from: Square, pawn: Piece, actor: Color) -> u64 {
    let mut destinations = 0u64;
    let step = pawn.color.forward();

    if let Some(one) = offset_square(from, 0, step) {
        if game_state.is_open(one) {
            destinations |= square_bit(one);

            if rank_of(from) == pawn_start_rank(pawn.color) {
                if let Some(two) = offset_square(one, 0, step) {
                    if game_state.is_open(two) {
                        destinations |= square_bit(two);
                    }
                }
            }
        }
    }

    let enemies = game_state.pieces_of(actor.opposite());
    let mut targets = enemies;
    if let Some(ep) = game_state.en_passant_square {
        if en_passant_victim(game_state, from, ep, actor).is_some() {
            targets |= square_bit(ep);
        }
    }

    destinations | (pawn_attacks(pawn.color, from) & targets & !game_state.removed_tiles)
}

/// Square of the pawn an en-passant capture from `from` onto `target` would
/// take, if such a pawn is really there.
pub fn en_passant_victim(
    game_state: &GameState,
    from: Square,
    target: Square,
    actor: Color,
) -> Option<Square> {
    if game_state.piece_at(target).is_some() || file_of(from) == file_of(target) {
        return None;
    }
    let victim = square_at(rank_of(from), file_of(target));
    match game_state.piece_at(victim) {
        Some(piece) if piece.kind == PieceKind::Pawn && piece.color != actor => Some(victim),
        _ => None,
    }
}

fn castling_destinations(game_state: &GameState, from: Square, king: Piece, actor: Color) -> u64 {
    // Only the owner castles.
    if king.color != actor {
        return 0;
    }

    let occupancy = game_state.occupancy_all();
    let rook = Piece::new(king.color, PieceKind::Rook);
    let mut enemy_attacks: Option<u64> = None;
    let mut destinations = 0u64;

    for path in CASTLE_PATHS.iter().filter(|path| path.color == king.color) {
        if path.king_from != from
            || game_state.castling_rights & path.right == 0
            || (occupancy | game_state.removed_tiles) & path.between != 0
            || game_state.piece_at(path.rook_from) != Some(rook)
        {
            continue;
        }

        let attacks = *enemy_attacks
            .get_or_insert_with(|| attacked_squares(game_state, king.color.opposite()));
        if attacks & path.king_path == 0 {
            destinations |= square_bit(path.king_to);
        }
    }

    destinations
}
