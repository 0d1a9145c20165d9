//! Status effect kinds and durations.

use serde::Serialize;

use crate::game_state::chess_types::Color;

/// Effects whose resolution rule has not been settled. They are accepted and
/// tracked but never mutate the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderEffect {
    Backfire,
    Expelliarmus,
    Break,
}

/// Every status effect the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum EffectKind {
    /// Removes the occupant of its tile at end of turn.
    Death,
    /// Removes one random enemy piece within `radius` orthogonal steps.
    AreaAttack { radius: u8 },
    /// Absorbs one end-of-turn removal of its piece.
    Shield,
    /// The owner may not pick the piece up.
    CannotMove,
    /// The owner's opponent picks the piece up instead of the owner.
    Control,
    /// The piece may not capture.
    Shrink,
    /// The piece takes a random adjacent enemy at end of turn.
    Grow,
    /// The tile is out of play.
    RemoveSquare,
    /// Cancels `RemoveSquare` on the same tile.
    Repair,
    /// The bearer's hand is visible to the opponent.
    Reveal,
    Placeholder { effect: PlaceholderEffect },
}

/// Where an effect lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectBinding {
    /// Follows its piece on every move and displacement.
    Piece,
    /// Stays on its square.
    Tile,
    /// Global to one side.
    Side,
}

impl EffectKind {
    pub const fn name(&self) -> &'static str {
        match self {
            EffectKind::Death => "death",
            EffectKind::AreaAttack { .. } => "area_attack",
            EffectKind::Shield => "shield",
            EffectKind::CannotMove => "cannot_move",
            EffectKind::Control => "control",
            EffectKind::Shrink => "shrink",
            EffectKind::Grow => "grow",
            EffectKind::RemoveSquare => "remove_square",
            EffectKind::Repair => "repair",
            EffectKind::Reveal => "reveal",
            EffectKind::Placeholder { effect } => match effect {
                PlaceholderEffect::Backfire => "backfire",
                PlaceholderEffect::Expelliarmus => "expelliarmus",
                PlaceholderEffect::Break => "break",
            },
        }
    }

    pub const fn binding(&self) -> EffectBinding {
        match self {
            EffectKind::Death
            | EffectKind::AreaAttack { .. }
            | EffectKind::RemoveSquare
            | EffectKind::Repair => EffectBinding::Tile,
            EffectKind::Reveal
            | EffectKind::Placeholder {
                effect: PlaceholderEffect::Backfire,
            } => EffectBinding::Side,
            EffectKind::Shield
            | EffectKind::CannotMove
            | EffectKind::Control
            | EffectKind::Shrink
            | EffectKind::Grow
            | EffectKind::Placeholder { .. } => EffectBinding::Piece,
        }
    }
}

/// Remaining lifetime of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectDuration {
    /// Never removed by decay.
    Permanent,
    /// Dropped by the decay pass of the current resolution.
    EndOfResolution,
    /// Decremented once per completed turn, dropped when it reaches zero.
    Turns(u8),
}

impl EffectDuration {
    /// Wire form: `-1` permanent, `0` end of resolution, `N` turns left.
    pub const fn as_raw(self) -> i16 {
        match self {
            EffectDuration::Permanent => -1,
            EffectDuration::EndOfResolution => 0,
            EffectDuration::Turns(turns) => turns as i16,
        }
    }

    /// One end-of-turn tick. `None` means the effect is gone.
    pub const fn decremented(self) -> Option<Self> {
        match self {
            EffectDuration::Permanent => Some(EffectDuration::Permanent),
            EffectDuration::EndOfResolution | EffectDuration::Turns(0 | 1) => None,
            EffectDuration::Turns(turns) => Some(EffectDuration::Turns(turns - 1)),
        }
    }
}

/// An effect instance: what it does, how long it lasts, and who cast it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub kind: EffectKind,
    pub duration: EffectDuration,
    pub caster: Color,
}

impl Effect {
    #[inline]
    pub const fn new(kind: EffectKind, duration: EffectDuration, caster: Color) -> Self {
        Self {
            kind,
            duration,
            caster,
        }
    }
}

/// Serializable view of an effect for board snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectView {
    #[serde(flatten)]
    pub kind: EffectKind,
    pub duration: i16,
    pub caster: Color,
}

impl From<&Effect> for EffectView {
    fn from(effect: &Effect) -> Self {
        Self {
            kind: effect.kind,
            duration: effect.duration.as_raw(),
            caster: effect.caster,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_n_survives_n_minus_one_ticks() {
        let mut duration = Some(EffectDuration::Turns(3));
        let mut ticks = 0;
        while let Some(current) = duration {
            duration = current.decremented();
            ticks += 1;
        }
        assert_eq!(ticks, 3, "a three-turn effect is removed on the third decrement");
    }

    #[test]
    fn permanent_never_decays_and_zero_expires_immediately() {
        let mut permanent = EffectDuration::Permanent;
        for _ in 0..100 {
            permanent = permanent.decremented().expect("permanent effects stay");
        }
        assert_eq!(permanent.as_raw(), -1);
        assert_eq!(EffectDuration::EndOfResolution.decremented(), None);
    }

    #[test]
    fn area_attack_carries_its_radius_in_snapshots() {
        let effect = Effect::new(
            EffectKind::AreaAttack { radius: 2 },
            EffectDuration::EndOfResolution,
            Color::Dark,
        );
        let json = serde_json::to_value(EffectView::from(&effect)).expect("view should serialize");
        assert_eq!(json["name"], "area_attack");
        assert_eq!(json["radius"], 2);
        assert_eq!(json["duration"], 0);
        assert_eq!(json["caster"], "dark");
    }
}
