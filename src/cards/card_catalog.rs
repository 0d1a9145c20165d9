//! Immutable card data.
//!
//! The catalog is built once at start-up and shared by every session through
//! an `Arc`; nothing mutates it afterwards.

use serde::Serialize;

use crate::effects::effect_kind::PlaceholderEffect;

/// When a card resolves relative to the board move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    /// Resolves as soon as it is queued; takes no target.
    Instant,
    /// Lands before the board move.
    Fast,
    /// Lands after the board move.
    Slow,
}

impl Speed {
    pub const fn code(self) -> u8 {
        match self {
            Speed::Instant => 0,
            Speed::Fast => 1,
            Speed::Slow => 2,
        }
    }
}

/// What playing a card does. Parameters live on the variant that needs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "spell", rename_all = "snake_case")]
pub enum SpellEffect {
    Death,
    AreaAttack { radius: u8 },
    Shield,
    CannotMove { turns: u8 },
    Control { turns: u8 },
    Shrink { turns: u8 },
    Grow { turns: u8 },
    RemoveSquare,
    Repair,
    MoveForward { distance: u8 },
    MoveBack { distance: u8 },
    MoveRandom { distance: u8 },
    MoveAnywhere,
    Reveal { turns: u8 },
    Echo,
    Placeholder { effect: PlaceholderEffect },
}

/// Which squares a card may be aimed at, from the caster's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetClass {
    None,
    OwnPiece,
    EnemyPiece,
    AnyPiece,
    AnySquare,
    EmptySquare,
    RemovedSquare,
    /// A piece with at least one clear step in the slide direction.
    Slide { forward: bool, distance: u8 },
    /// A piece to move plus an empty destination.
    PieceAndDestination,
}

impl SpellEffect {
    /// Effect id in `name@level` form, as shown to clients.
    pub fn effect_id(&self) -> String {
        match self {
            SpellEffect::Death => "death".to_owned(),
            SpellEffect::AreaAttack { radius } => format!("area_attack@{radius}"),
            SpellEffect::Shield => "shield".to_owned(),
            SpellEffect::CannotMove { turns } => format!("cannot_move@{turns}"),
            SpellEffect::Control { turns } => format!("control@{turns}"),
            SpellEffect::Shrink { turns } => format!("shrink@{turns}"),
            SpellEffect::Grow { turns } => format!("grow@{turns}"),
            SpellEffect::RemoveSquare => "remove_square".to_owned(),
            SpellEffect::Repair => "repair".to_owned(),
            SpellEffect::MoveForward { distance } => format!("move_forward@{distance}"),
            SpellEffect::MoveBack { distance } => format!("move_back@{distance}"),
            SpellEffect::MoveRandom { distance } => format!("move_random@{distance}"),
            SpellEffect::MoveAnywhere => "move_anywhere".to_owned(),
            SpellEffect::Reveal { turns } => format!("reveal@{turns}"),
            SpellEffect::Echo => "echo".to_owned(),
            SpellEffect::Placeholder { effect } => match effect {
                PlaceholderEffect::Backfire => "backfire".to_owned(),
                PlaceholderEffect::Expelliarmus => "expelliarmus".to_owned(),
                PlaceholderEffect::Break => "break".to_owned(),
            },
        }
    }

    pub const fn target_class(&self) -> TargetClass {
        match self {
            SpellEffect::Death
            | SpellEffect::CannotMove { .. }
            | SpellEffect::Control { .. }
            | SpellEffect::Shrink { .. } => TargetClass::EnemyPiece,
            SpellEffect::Shield | SpellEffect::Grow { .. } => TargetClass::OwnPiece,
            SpellEffect::AreaAttack { .. } => TargetClass::AnySquare,
            SpellEffect::RemoveSquare => TargetClass::EmptySquare,
            SpellEffect::Repair => TargetClass::RemovedSquare,
            SpellEffect::MoveForward { distance } => TargetClass::Slide {
                forward: true,
                distance: *distance,
            },
            SpellEffect::MoveBack { distance } => TargetClass::Slide {
                forward: false,
                distance: *distance,
            },
            SpellEffect::MoveRandom { .. } => TargetClass::AnyPiece,
            SpellEffect::MoveAnywhere => TargetClass::PieceAndDestination,
            SpellEffect::Reveal { .. } | SpellEffect::Echo => TargetClass::None,
            SpellEffect::Placeholder { effect } => match effect {
                PlaceholderEffect::Backfire => TargetClass::None,
                PlaceholderEffect::Expelliarmus | PlaceholderEffect::Break => TargetClass::AnyPiece,
            },
        }
    }

    /// Displacement spells resolve after the other fast spells.
    pub const fn is_displacement(&self) -> bool {
        matches!(
            self,
            SpellEffect::MoveForward { .. }
                | SpellEffect::MoveBack { .. }
                | SpellEffect::MoveRandom { .. }
                | SpellEffect::MoveAnywhere
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardSpec {
    pub id: &'static str,
    pub effect: SpellEffect,
    pub speed: Speed,
    /// 1 (common) to 5 (rarest).
    pub rarity: u8,
}

const fn card(id: &'static str, effect: SpellEffect, speed: Speed, rarity: u8) -> CardSpec {
    CardSpec {
        id,
        effect,
        speed,
        rarity,
    }
}

const STANDARD_CARDS: &[CardSpec] = &[
    card("avada_kedavra", SpellEffect::Death, Speed::Slow, 5),
    card("apparate", SpellEffect::MoveAnywhere, Speed::Fast, 5),
    card("imperius", SpellEffect::Control { turns: 1 }, Speed::Slow, 4),
    card("bombarda_maxima", SpellEffect::AreaAttack { radius: 2 }, Speed::Slow, 4),
    card("priori_incantatem", SpellEffect::Echo, Speed::Instant, 4),
    card("confringo", SpellEffect::AreaAttack { radius: 1 }, Speed::Slow, 3),
    card("engorgio", SpellEffect::Grow { turns: 3 }, Speed::Slow, 3),
    card("deprimo", SpellEffect::RemoveSquare, Speed::Fast, 3),
    card(
        "expelliarmus",
        SpellEffect::Placeholder {
            effect: PlaceholderEffect::Expelliarmus,
        },
        Speed::Fast,
        3,
    ),
    card(
        "finite_incantatem",
        SpellEffect::Placeholder {
            effect: PlaceholderEffect::Break,
        },
        Speed::Slow,
        3,
    ),
    card("cruciatus", SpellEffect::CannotMove { turns: 2 }, Speed::Slow, 2),
    card("reducio", SpellEffect::Shrink { turns: 3 }, Speed::Slow, 2),
    card("protego", SpellEffect::Shield, Speed::Fast, 2),
    card("tarantallegra", SpellEffect::MoveRandom { distance: 1 }, Speed::Fast, 2),
    card("legilimens", SpellEffect::Reveal { turns: 1 }, Speed::Instant, 2),
    card("petrificus_totalus", SpellEffect::CannotMove { turns: 1 }, Speed::Slow, 1),
    card("reparo", SpellEffect::Repair, Speed::Fast, 1),
    card("flipendo", SpellEffect::MoveForward { distance: 1 }, Speed::Fast, 1),
    card("depulso", SpellEffect::MoveForward { distance: 2 }, Speed::Fast, 1),
    card("accio", SpellEffect::MoveBack { distance: 2 }, Speed::Fast, 1),
    card(
        "confundo",
        SpellEffect::Placeholder {
            effect: PlaceholderEffect::Backfire,
        },
        Speed::Instant,
        1,
    ),
];

#[derive(Debug, Clone)]
pub struct CardCatalog {
    cards: Vec<CardSpec>,
}

impl CardCatalog {
    /// The built-in card set.
    pub fn standard() -> Self {
        Self {
            cards: STANDARD_CARDS.to_vec(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&CardSpec> {
        self.cards.iter().find(|spec| spec.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardSpec> {
        self.cards.iter()
    }

    pub fn ids_with_rarity(&self, rarity: u8) -> Vec<&'static str> {
        self.cards
            .iter()
            .filter(|spec| spec.rarity == rarity)
            .map(|spec| spec.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rarity_has_at_least_one_card() {
        let catalog = CardCatalog::standard();
        for rarity in 1..=5 {
            assert!(
                !catalog.ids_with_rarity(rarity).is_empty(),
                "rarity {rarity} should have cards"
            );
        }
    }

    #[test]
    fn ids_are_unique() {
        let catalog = CardCatalog::standard();
        let mut ids: Vec<&str> = catalog.iter().map(|spec| spec.id).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn effect_ids_carry_their_level() {
        assert_eq!(SpellEffect::MoveForward { distance: 2 }.effect_id(), "move_forward@2");
        assert_eq!(SpellEffect::AreaAttack { radius: 1 }.effect_id(), "area_attack@1");
        assert_eq!(SpellEffect::Death.effect_id(), "death");
    }

    #[test]
    fn instant_cards_take_no_target() {
        let catalog = CardCatalog::standard();
        for spec in catalog.iter().filter(|spec| spec.speed == Speed::Instant) {
            assert_eq!(spec.effect.target_class(), TargetClass::None, "{} is instant", spec.id);
        }
    }
}
