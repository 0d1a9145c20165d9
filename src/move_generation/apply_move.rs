//! Board move application: placement, rights, en passant, promotion.
//!
//! The side to move is left alone; flipping it is the turn controller's job
//! (perft flips it itself).

use serde::Serialize;

use crate::errors::BoardError;
use crate::game_state::chess_rules::{castle_path_for, promotion_rank, rights_cleared_by};
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::pseudo_legal::en_passant_victim;

/// What a board move did, for effect relocation and animation replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppliedMove {
    pub from: Square,
    pub to: Square,
    /// Signed code of the moving piece before promotion.
    pub piece: i8,
    /// Square a captured piece was removed from (differs from `to` for en passant).
    pub captured: Option<Square>,
    /// Castling rook relocation.
    pub rook: Option<(Square, Square)>,
    pub promoted: bool,
}

/// Apply `from -> to` in place. The caller is responsible for legality; this
/// only refuses moves that cannot be expressed at all.
pub fn apply_move(
    game_state: &mut GameState,
    from: Square,
    to: Square,
) -> Result<AppliedMove, BoardError> {
    let piece = game_state.piece_at(from).ok_or(BoardError::EmptySquare(from))?;
    if game_state.is_removed(to) {
        return Err(BoardError::RemovedTile(to));
    }

    // The actor of an en-passant capture is whoever the victim is not.
    let en_passant_capture = match (piece.kind, game_state.en_passant_square) {
        (PieceKind::Pawn, Some(ep)) if ep == to => {
            game_state
                .piece_at(square_at(rank_of(from), file_of(to)))
                .and_then(|victim| en_passant_victim(game_state, from, to, victim.color.opposite()))
        }
        _ => None,
    };

    let mut rook = None;
    if piece.kind == PieceKind::King {
        if let Some(path) = castle_path_for(from, to) {
            let castling_rook = game_state.take_piece(path.rook_from);
            if let Some(castling_rook) = castling_rook {
                game_state.place_piece(path.rook_to, castling_rook);
                rook = Some((path.rook_from, path.rook_to));
            }
        }
    }

    let mut captured = None;
    if let Some(victim) = en_passant_capture {
        game_state.take_piece(victim);
        captured = Some(victim);
    } else if game_state.take_piece(to).is_some() {
        captured = Some(to);
    }

    game_state.take_piece(from);
    let promoted = piece.kind == PieceKind::Pawn && rank_of(to) == promotion_rank(piece.color);
    let placed = if promoted {
        Piece::new(piece.color, PieceKind::Queen)
    } else {
        piece
    };
    game_state.place_piece(to, placed);

    game_state.castling_rights &= !(rights_cleared_by(from) | rights_cleared_by(to));

    let double_step = piece.kind == PieceKind::Pawn && rank_of(from).abs_diff(rank_of(to)) == 2;
    game_state.en_passant_square = if double_step {
        Some((from + to) / 2)
    } else {
        None
    };

    if piece.kind == PieceKind::Pawn || captured.is_some() {
        game_state.halfmove_clock = 0;
    } else {
        game_state.halfmove_clock = game_state.halfmove_clock.saturating_add(1);
    }

    Ok(AppliedMove {
        from,
        to,
        piece: piece.code(),
        captured,
        rook,
        promoted,
    })
}
