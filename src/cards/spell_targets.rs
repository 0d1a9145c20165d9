//! Target projection for cards before they are queued.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::cards::card_catalog::{SpellEffect, TargetClass};
use crate::game_state::{chess_types::*, game_state::GameState};

/// Squares a card may be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastTargets {
    NoTarget,
    Single(u64),
    /// Two picks: the piece to move, then an empty destination.
    Pair { pieces: u64, destinations: u64 },
}

impl CastTargets {
    /// Whether the chosen squares fit this target set.
    pub fn accepts(&self, target: Option<Square>, second_target: Option<Square>) -> bool {
        let contains = |mask: u64, square: Option<Square>| {
            square.is_some_and(|square| square < 64 && mask & square_bit(square) != 0)
        };
        match *self {
            CastTargets::NoTarget => true,
            CastTargets::Single(mask) => contains(mask, target),
            CastTargets::Pair {
                pieces,
                destinations,
            } => contains(pieces, target) && contains(destinations, second_target),
        }
    }
}

/// Legal targets of `effect` when cast by `caster` on the current board.
pub fn cast_targets(game_state: &GameState, caster: Color, effect: &SpellEffect) -> CastTargets {
    let own = game_state.pieces_of(caster);
    let enemy = game_state.pieces_of(caster.opposite());
    let occupancy = game_state.occupancy_all();
    let removed = game_state.removed_tiles;
    let open = !occupancy & !removed;

    match effect.target_class() {
        TargetClass::None => CastTargets::NoTarget,
        TargetClass::OwnPiece => CastTargets::Single(own),
        TargetClass::EnemyPiece => CastTargets::Single(enemy),
        TargetClass::AnyPiece => CastTargets::Single(occupancy),
        TargetClass::AnySquare => CastTargets::Single(!removed),
        TargetClass::EmptySquare => CastTargets::Single(open),
        TargetClass::RemovedSquare => CastTargets::Single(removed),
        TargetClass::Slide { forward, distance } => CastTargets::Single(
            squares_in(occupancy)
                .filter(|&square| {
                    slide_destination(game_state, square, caster, forward, distance).is_some()
                })
                .fold(0u64, |acc, square| acc | square_bit(square)),
        ),
        TargetClass::PieceAndDestination => CastTargets::Pair {
            pieces: own,
            destinations: open,
        },
    }
}

/// Furthest open square up to `distance` steps along the caster's forward
/// (or backward) file direction, stopping before the first obstacle.
pub fn slide_destination(
    game_state: &GameState,
    from: Square,
    caster: Color,
    forward: bool,
    distance: u8,
) -> Option<Square> {
    let step = if forward {
        caster.forward()
    } else {
        -caster.forward()
    };

    let mut current = from;
    let mut moved = false;
    for _ in 0..distance {
        match offset_square(current, 0, step) {
            Some(next) if game_state.is_open(next) => {
                current = next;
                moved = true;
            }
            _ => break,
        }
    }

    moved.then_some(current)
}

/// A uniformly chosen open square within `distance` king steps, if any.
pub fn random_destination<R: Rng + ?Sized>(
    game_state: &GameState,
    from: Square,
    distance: u8,
    rng: &mut R,
) -> Option<Square> {
    let candidates: Vec<Square> = (0..64u8)
        .filter(|&square| {
            let reach = rank_of(square)
                .abs_diff(rank_of(from))
                .max(file_of(square).abs_diff(file_of(from)));
            (1..=distance).contains(&reach) && game_state.is_open(square)
        })
        .collect();
    candidates.choose(rng).copied()
}
