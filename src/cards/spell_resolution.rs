//! Applying a resolved card to the board and effect table.

use rand::Rng;
use serde::Serialize;

use crate::cards::card_catalog::SpellEffect;
use crate::cards::hand_state::Coin;
use crate::cards::spell_targets::{random_destination, slide_destination};
use crate::effects::effect_kind::{Effect, EffectDuration, EffectKind, PlaceholderEffect};
use crate::effects::effect_table::EffectTable;
use crate::game_state::{chess_types::*, game_state::GameState};

/// What a coin did when it resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SpellOutcome {
    Displaced { from: Square, to: Square },
    /// A displacement found nowhere to go.
    Stayed { square: Square },
    EffectApplied { square: Square, effect: &'static str },
    SideEffectApplied { side: Color, effect: &'static str },
    TileRemoved { square: Square },
    /// Echo: hand a card back to its caster. `None` when there is nothing to
    /// recall; the turn controller fills in the card.
    Recalled { card_id: Option<String> },
    NotYetSpecified { effect: &'static str },
    Fizzled { reason: &'static str },
}

/// Piece debuffs tick once on the turn they land, so they are applied with
/// one extra turn to last for `turns` full turns afterwards.
fn lingering(kind: EffectKind, turns: u8, caster: Color) -> Effect {
    Effect::new(kind, EffectDuration::Turns(turns.saturating_add(1)), caster)
}

fn end_of_resolution(kind: EffectKind, caster: Color) -> Effect {
    Effect::new(kind, EffectDuration::EndOfResolution, caster)
}

/// Resolve one coin. Targets were checked when the coin was queued, but the
/// board may have changed since; a coin whose target is no longer valid
/// fizzles without touching anything.
pub fn resolve_coin<R: Rng + ?Sized>(
    coin: &Coin,
    effect: &SpellEffect,
    game_state: &mut GameState,
    effects: &mut EffectTable,
    rng: &mut R,
) -> SpellOutcome {
    let caster = coin.caster;
    let target = coin.target.filter(|&square| square < 64);

    match *effect {
        SpellEffect::Reveal { turns } => {
            let revealed = caster.opposite();
            effects.apply_side(
                revealed,
                Effect::new(EffectKind::Reveal, EffectDuration::Turns(turns), caster),
            );
            SpellOutcome::SideEffectApplied {
                side: revealed,
                effect: EffectKind::Reveal.name(),
            }
        }
        SpellEffect::Echo => SpellOutcome::Recalled { card_id: None },
        SpellEffect::Placeholder { effect } => resolve_placeholder(effect, target, caster, effects),
        _ => {
            let Some(square) = target else {
                return SpellOutcome::Fizzled { reason: "no_target" };
            };
            resolve_targeted(coin, effect, square, game_state, effects, rng)
        }
    }
}

fn resolve_targeted<R: Rng + ?Sized>(
    coin: &Coin,
    effect: &SpellEffect,
    square: Square,
    game_state: &mut GameState,
    effects: &mut EffectTable,
    rng: &mut R,
) -> SpellOutcome {
    let caster = coin.caster;
    let occupant = game_state.piece_at(square);

    let piece_effect = |kind: EffectKind, effect: Effect, effects: &mut EffectTable| {
        if occupant.is_none() {
            return SpellOutcome::Fizzled { reason: "target_gone" };
        }
        effects.apply(square, effect);
        SpellOutcome::EffectApplied {
            square,
            effect: kind.name(),
        }
    };

    match *effect {
        SpellEffect::Death => {
            effects.apply(square, end_of_resolution(EffectKind::Death, caster));
            SpellOutcome::EffectApplied {
                square,
                effect: EffectKind::Death.name(),
            }
        }
        SpellEffect::AreaAttack { radius } => {
            let kind = EffectKind::AreaAttack { radius };
            effects.apply(square, end_of_resolution(kind, caster));
            SpellOutcome::EffectApplied {
                square,
                effect: kind.name(),
            }
        }
        SpellEffect::Shield => piece_effect(
            EffectKind::Shield,
            end_of_resolution(EffectKind::Shield, caster),
            effects,
        ),
        SpellEffect::CannotMove { turns } => piece_effect(
            EffectKind::CannotMove,
            lingering(EffectKind::CannotMove, turns, caster),
            effects,
        ),
        SpellEffect::Control { turns } => piece_effect(
            EffectKind::Control,
            lingering(EffectKind::Control, turns, caster),
            effects,
        ),
        SpellEffect::Shrink { turns } => piece_effect(
            EffectKind::Shrink,
            lingering(EffectKind::Shrink, turns, caster),
            effects,
        ),
        SpellEffect::Grow { turns } => piece_effect(
            EffectKind::Grow,
            lingering(EffectKind::Grow, turns, caster),
            effects,
        ),
        SpellEffect::RemoveSquare => {
            if !game_state.is_open(square) {
                return SpellOutcome::Fizzled {
                    reason: "square_not_empty",
                };
            }
            game_state.remove_tile(square);
            effects.apply(
                square,
                Effect::new(EffectKind::RemoveSquare, EffectDuration::Permanent, caster),
            );
            SpellOutcome::TileRemoved { square }
        }
        SpellEffect::Repair => {
            if !game_state.is_removed(square) {
                return SpellOutcome::Fizzled {
                    reason: "square_not_removed",
                };
            }
            effects.apply(square, end_of_resolution(EffectKind::Repair, caster));
            SpellOutcome::EffectApplied {
                square,
                effect: EffectKind::Repair.name(),
            }
        }
        SpellEffect::MoveForward { distance } | SpellEffect::MoveBack { distance } => {
            if occupant.is_none() {
                return SpellOutcome::Fizzled { reason: "target_gone" };
            }
            let forward = matches!(effect, SpellEffect::MoveForward { .. });
            match slide_destination(game_state, square, caster, forward, distance) {
                Some(to) => displace(game_state, effects, square, to),
                None => SpellOutcome::Stayed { square },
            }
        }
        SpellEffect::MoveRandom { distance } => {
            if occupant.is_none() {
                return SpellOutcome::Fizzled { reason: "target_gone" };
            }
            match random_destination(game_state, square, distance, rng) {
                Some(to) => displace(game_state, effects, square, to),
                None => SpellOutcome::Stayed { square },
            }
        }
        SpellEffect::MoveAnywhere => {
            if occupant.map(|piece| piece.color) != Some(caster) {
                return SpellOutcome::Fizzled { reason: "target_gone" };
            }
            match coin.second_target.filter(|&to| to < 64 && game_state.is_open(to)) {
                Some(to) => displace(game_state, effects, square, to),
                None => SpellOutcome::Fizzled {
                    reason: "destination_blocked",
                },
            }
        }
        SpellEffect::Reveal { .. } | SpellEffect::Echo | SpellEffect::Placeholder { .. } => {
            log::error!("untargeted spell {} routed to targeted resolution", effect.effect_id());
            SpellOutcome::Fizzled { reason: "no_target" }
        }
    }
}

fn displace(game_state: &mut GameState, effects: &mut EffectTable, from: Square, to: Square) -> SpellOutcome {
    match game_state.displace_piece(from, to) {
        Ok(_) => {
            effects.relocate(from, to);
            SpellOutcome::Displaced { from, to }
        }
        Err(err) => {
            log::debug!("displacement {from}->{to} refused: {err}");
            SpellOutcome::Fizzled {
                reason: "destination_blocked",
            }
        }
    }
}

fn resolve_placeholder(
    effect: PlaceholderEffect,
    target: Option<Square>,
    caster: Color,
    effects: &mut EffectTable,
) -> SpellOutcome {
    let kind = EffectKind::Placeholder { effect };
    log::warn!("{} has no settled resolution rule; recording it only", kind.name());

    match effect {
        PlaceholderEffect::Backfire => {
            let side = caster.opposite();
            effects.apply_side(side, Effect::new(kind, EffectDuration::Permanent, caster));
            SpellOutcome::SideEffectApplied {
                side,
                effect: kind.name(),
            }
        }
        PlaceholderEffect::Expelliarmus | PlaceholderEffect::Break => {
            if let Some(square) = target {
                effects.apply(square, end_of_resolution(kind, caster));
            }
            SpellOutcome::NotYetSpecified { effect: kind.name() }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::cards::card_catalog::Speed;

    fn coin(caster: Color, target: Option<Square>, second_target: Option<Square>) -> Coin {
        Coin {
            caster,
            card_id: "test".to_owned(),
            speed: Speed::Fast,
            target,
            second_target,
        }
    }

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(5)
    }

    #[test]
    fn move_forward_carries_piece_effects() {
        let mut state = GameState::new_game();
        let mut effects = EffectTable::new();
        effects.apply(12, lingering(EffectKind::Shrink, 2, Color::Dark));

        let outcome = resolve_coin(
            &coin(Color::Light, Some(12), None),
            &SpellEffect::MoveForward { distance: 2 },
            &mut state,
            &mut effects,
            &mut seeded(),
        );
        assert_eq!(outcome, SpellOutcome::Displaced { from: 12, to: 28 });
        assert!(effects.has_effect(28, "shrink"));
        assert!(state.piece_at(12).is_none());
    }

    #[test]
    fn a_boxed_in_piece_stays_put() {
        let mut state = GameState::new_game();
        let mut effects = EffectTable::new();
        let outcome = resolve_coin(
            &coin(Color::Dark, Some(1), None),
            &SpellEffect::MoveRandom { distance: 1 },
            &mut state,
            &mut effects,
            &mut seeded(),
        );
        assert_eq!(outcome, SpellOutcome::Stayed { square: 1 });
        assert_eq!(state, GameState::new_game());
    }

    #[test]
    fn debuffs_outlast_the_turn_they_land_on() {
        let mut state = GameState::new_game();
        let mut effects = EffectTable::new();
        resolve_coin(
            &coin(Color::Dark, Some(12), None),
            &SpellEffect::CannotMove { turns: 1 },
            &mut state,
            &mut effects,
            &mut seeded(),
        );
        effects.resolve_end_of_turn(&state, &mut seeded());
        assert!(effects.has_effect(12, "cannot_move"), "still blocked on the next turn");
        effects.resolve_end_of_turn(&state, &mut seeded());
        assert!(!effects.has_effect(12, "cannot_move"));
    }

    #[test]
    fn piece_effects_fizzle_on_an_empty_square() {
        let mut state = GameState::new_game();
        let mut effects = EffectTable::new();
        let outcome = resolve_coin(
            &coin(Color::Light, Some(28), None),
            &SpellEffect::Control { turns: 1 },
            &mut state,
            &mut effects,
            &mut seeded(),
        );
        assert_eq!(outcome, SpellOutcome::Fizzled { reason: "target_gone" });
        assert!(effects.effects_at(28).next().is_none());
    }

    #[test]
    fn remove_square_takes_the_tile_out_of_play() {
        let mut state = GameState::new_game();
        let mut effects = EffectTable::new();
        let outcome = resolve_coin(
            &coin(Color::Light, Some(27), None),
            &SpellEffect::RemoveSquare,
            &mut state,
            &mut effects,
            &mut seeded(),
        );
        assert_eq!(outcome, SpellOutcome::TileRemoved { square: 27 });
        assert!(state.is_removed(27));
        assert!(effects.has_effect(27, "remove_square"));

        let again = resolve_coin(
            &coin(Color::Dark, Some(12), None),
            &SpellEffect::RemoveSquare,
            &mut state,
            &mut effects,
            &mut seeded(),
        );
        assert_eq!(again, SpellOutcome::Fizzled { reason: "square_not_empty" });
    }

    #[test]
    fn move_anywhere_needs_an_open_destination() {
        let mut state = GameState::new_game();
        let mut effects = EffectTable::new();
        let blocked = resolve_coin(
            &coin(Color::Light, Some(6), Some(12)),
            &SpellEffect::MoveAnywhere,
            &mut state,
            &mut effects,
            &mut seeded(),
        );
        assert_eq!(blocked, SpellOutcome::Fizzled { reason: "destination_blocked" });

        let moved = resolve_coin(
            &coin(Color::Light, Some(6), Some(35)),
            &SpellEffect::MoveAnywhere,
            &mut state,
            &mut effects,
            &mut seeded(),
        );
        assert_eq!(moved, SpellOutcome::Displaced { from: 6, to: 35 });
    }

    #[test]
    fn reveal_and_backfire_land_on_the_opponent() {
        let mut state = GameState::new_game();
        let mut effects = EffectTable::new();
        let reveal = resolve_coin(
            &coin(Color::Light, None, None),
            &SpellEffect::Reveal { turns: 1 },
            &mut state,
            &mut effects,
            &mut seeded(),
        );
        assert_eq!(
            reveal,
            SpellOutcome::SideEffectApplied {
                side: Color::Dark,
                effect: "reveal"
            }
        );
        assert!(effects.has_side_effect(Color::Dark, "reveal"));

        resolve_coin(
            &coin(Color::Dark, None, None),
            &SpellEffect::Placeholder {
                effect: PlaceholderEffect::Backfire,
            },
            &mut state,
            &mut effects,
            &mut seeded(),
        );
        assert!(effects.has_side_effect(Color::Light, "backfire"));
    }

    #[test]
    fn outcomes_serialize_with_a_tag() {
        let json = serde_json::to_value(SpellOutcome::Displaced { from: 12, to: 28 })
            .expect("outcome should serialize");
        assert_eq!(json["outcome"], "displaced");
        assert_eq!(json["to"], 28);
    }
}
