//! Ordered descriptors of what happened during a resolution, for clients to
//! play back.

use serde::Serialize;

use crate::cards::spell_resolution::SpellOutcome;
use crate::effects::effect_table::CounterPair;
use crate::game_state::chess_types::{Color, Square};
use crate::move_generation::apply_move::AppliedMove;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnimationStep {
    SpellCast {
        caster: Color,
        card_id: String,
        effect_id: String,
        target: Option<Square>,
        second_target: Option<Square>,
        result: SpellOutcome,
    },
    BoardMove {
        side: Color,
        applied: AppliedMove,
    },
    MoveFizzled {
        side: Color,
        from: Square,
        to: Square,
    },
    CounterSpell {
        square: Square,
        pair: CounterPair,
    },
    SummonCard {
        side: Color,
        card_id: String,
        loop_length: usize,
    },
    PieceRemoved {
        square: Square,
        piece: i8,
    },
    Shielded {
        square: Square,
    },
    TurnEnded {
        next_side: Color,
    },
}
