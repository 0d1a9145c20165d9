//! Phase state machine for one match.
//!
//! `Main`: the side to move picks up pieces, locks in one move and may queue
//! cards. `Response`: only the other side acts, with cards. Ending the
//! response phase resolves the turn and hands the move to the responder.

use std::sync::Arc;

use rand::rngs::StdRng;
use serde::Serialize;

use crate::cards::card_catalog::{CardCatalog, Speed};
use crate::cards::hand_state::{summon_card, CardPlay, Coin, HandState};
use crate::cards::spell_resolution::{resolve_coin, SpellOutcome};
use crate::cards::spell_targets::{cast_targets, CastTargets};
use crate::effects::effect_table::{CounterPair, EffectTable};
use crate::errors::{RejectReason, RequestResult};
use crate::game_state::chess_rules::rights_cleared_by;
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::apply_move::apply_move;
use crate::move_generation::legal_moves::legal_destinations;
use crate::session::animation::AnimationStep;
use crate::utils::render_game_state::render_game_state;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Main,
    Response,
}

impl Phase {
    pub const fn code(self) -> u8 {
        match self {
            Phase::Main => 0,
            Phase::Response => 1,
        }
    }
}

/// How a finished match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Winner(Color),
    Draw,
}

#[derive(Debug, Clone)]
pub struct TurnController {
    game_state: GameState,
    effects: EffectTable,
    hands: [HandState; 2],
    catalog: Arc<CardCatalog>,
    phase: Phase,
    picked: Option<Square>,
    queued_move: Option<(Square, Square)>,
    /// Most recently resolved card, for echo.
    last_resolved: Option<String>,
    outcome: Option<Outcome>,
    rng: StdRng,
}

impl TurnController {
    pub fn new(game_state: GameState, hands: [HandState; 2], catalog: Arc<CardCatalog>, rng: StdRng) -> Self {
        Self {
            game_state,
            effects: EffectTable::new(),
            hands,
            catalog,
            phase: Phase::Main,
            picked: None,
            queued_move: None,
            last_resolved: None,
            outcome: None,
            rng,
        }
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn effects(&self) -> &EffectTable {
        &self.effects
    }

    pub fn hand(&self, side: Color) -> &HandState {
        &self.hands[side.index()]
    }

    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn side_to_move(&self) -> Color {
        self.game_state.side_to_move
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn queued_move(&self) -> Option<(Square, Square)> {
        self.queued_move
    }

    /// Whether `side` is the one allowed to act in the current phase.
    pub fn is_turn(&self, side: Color) -> bool {
        match self.phase {
            Phase::Main => side == self.side_to_move(),
            Phase::Response => side != self.side_to_move(),
        }
    }

    fn ensure_turn(&self, side: Color) -> RequestResult<()> {
        if self.outcome.is_some() {
            return Err(RejectReason::GameOver);
        }
        if !self.is_turn(side) {
            log::debug!("{side:?} acted out of turn in {:?}", self.phase);
            return Err(RejectReason::NotYourTurn);
        }
        Ok(())
    }

    fn ensure_mover(&self, side: Color) -> RequestResult<()> {
        self.ensure_turn(side)?;
        if self.phase != Phase::Main {
            return Err(RejectReason::NotYourTurn);
        }
        Ok(())
    }

    /// Destinations for the piece on `from` when `actor` moves it, with
    /// effect restrictions applied.
    fn destinations(&self, from: Square, actor: Color) -> u64 {
        let legal = legal_destinations(&self.game_state, from, actor);
        self.effects.filter_destinations(&self.game_state, from, legal)
    }

    /// Whether any piece `side` may pick up has somewhere to go.
    fn has_any_move(&self, side: Color) -> bool {
        squares_in(self.effects.moveable_pieces(&self.game_state, side))
            .any(|square| self.destinations(square, side) != 0)
    }

    /// Squares whose pieces `side` may pick up this phase.
    pub fn moveable_pieces(&self, side: Color) -> RequestResult<u64> {
        if self.phase != Phase::Main || !self.is_turn(side) {
            return Err(RejectReason::NotYourTurn);
        }
        Ok(self.effects.moveable_pieces(&self.game_state, side))
    }

    /// Destinations of the piece picked up this phase.
    pub fn possible_moves(&self, side: Color) -> RequestResult<u64> {
        if self.phase != Phase::Main || !self.is_turn(side) {
            return Err(RejectReason::NotYourTurn);
        }
        let from = self.picked.ok_or(RejectReason::NoPieceSelected)?;
        Ok(self.destinations(from, side))
    }

    pub fn pickup_piece(&mut self, side: Color, square: Square) -> RequestResult<u64> {
        self.ensure_mover(side)?;
        if square >= 64 {
            return Err(RejectReason::BadRequest);
        }
        if !self.effects.can_pick_up(&self.game_state, square, side) {
            log::debug!("{side:?} may not pick up square {square}");
            return Err(RejectReason::PieceNotMoveable);
        }
        self.picked = Some(square);
        Ok(self.destinations(square, side))
    }

    /// Queue the picked piece's move to `to`, replacing any earlier one.
    pub fn lock_in_move(&mut self, side: Color, to: Square) -> RequestResult<(Square, Square)> {
        self.ensure_mover(side)?;
        let from = self.picked.ok_or(RejectReason::NoPieceSelected)?;
        if to >= 64 || self.destinations(from, side) & square_bit(to) == 0 {
            return Err(RejectReason::InvalidMove);
        }
        self.queued_move = Some((from, to));
        Ok((from, to))
    }

    /// Legal targets for the card at `card_index` of `side`'s hand.
    pub fn begin_cast(&self, side: Color, card_index: usize) -> RequestResult<CastTargets> {
        self.ensure_turn(side)?;
        let card_id = self.hands[side.index()]
            .card(card_index)
            .ok_or(RejectReason::CardNotInHand)?;
        let spec = self.catalog.get(card_id).ok_or(RejectReason::CardNotInHand)?;
        Ok(cast_targets(&self.game_state, side, &spec.effect))
    }

    /// Queue card plays. Instant cards resolve on the spot; their steps are
    /// returned.
    pub fn queue_cards(&mut self, side: Color, plays: &[CardPlay]) -> RequestResult<Vec<AnimationStep>> {
        self.ensure_turn(side)?;

        let game_state = &self.game_state;
        let coins = self.hands[side.index()].queue_cards(side, plays, &self.catalog, |spec, play| {
            cast_targets(game_state, side, &spec.effect).accepts(play.target, play.second_target)
        })?;

        Ok(coins
            .iter()
            .filter(|coin| coin.speed == Speed::Instant)
            .map(|coin| self.resolve_one(coin))
            .collect())
    }

    pub fn unqueue_card(&mut self, side: Color, queue_index: usize) -> RequestResult<Coin> {
        self.ensure_turn(side)?;
        self.hands[side.index()].unqueue(queue_index)
    }

    /// Finish the current phase. Main hands over to the response; the
    /// response runs the resolution. A mover with no legal move passes.
    pub fn end_phase(&mut self, side: Color) -> RequestResult<Vec<AnimationStep>> {
        self.ensure_turn(side)?;
        match self.phase {
            Phase::Main => {
                if self.queued_move.is_none() {
                    if self.has_any_move(side) {
                        return Err(RejectReason::MoveNotMade);
                    }
                    log::info!("{side:?} has no legal move and passes");
                }
                self.phase = Phase::Response;
                log::info!("{side:?} locked in; response phase");
                Ok(Vec::new())
            }
            Phase::Response => Ok(self.resolve_turn()),
        }
    }

    #[inline]
    pub fn lock_in(&mut self, side: Color) -> RequestResult<Vec<AnimationStep>> {
        self.end_phase(side)
    }

    fn is_displacement(&self, coin: &Coin) -> bool {
        self.catalog
            .get(&coin.card_id)
            .is_some_and(|spec| spec.effect.is_displacement())
    }

    fn resolve_one(&mut self, coin: &Coin) -> AnimationStep {
        let Some(effect) = self.catalog.get(&coin.card_id).map(|spec| spec.effect) else {
            log::error!("queued card {} is not in the catalog", coin.card_id);
            debug_assert!(false, "coins are only built from catalog cards");
            return AnimationStep::SpellCast {
                caster: coin.caster,
                card_id: coin.card_id.clone(),
                effect_id: String::new(),
                target: coin.target,
                second_target: coin.second_target,
                result: SpellOutcome::Fizzled { reason: "unknown_card" },
            };
        };

        let mut result = resolve_coin(coin, &effect, &mut self.game_state, &mut self.effects, &mut self.rng);
        if matches!(result, SpellOutcome::Recalled { .. }) {
            let recalled = self.last_resolved.clone();
            if let Some(card_id) = &recalled {
                self.hands[coin.caster.index()].grant(card_id.clone());
            }
            result = SpellOutcome::Recalled { card_id: recalled };
        } else {
            self.last_resolved = Some(coin.card_id.clone());
        }

        AnimationStep::SpellCast {
            caster: coin.caster,
            card_id: coin.card_id.clone(),
            effect_id: effect.effect_id(),
            target: coin.target,
            second_target: coin.second_target,
            result,
        }
    }

    fn play_queued_move(&mut self, mover: Color, from: Square, to: Square, steps: &mut Vec<AnimationStep>) {
        let still_legal = self.effects.can_pick_up(&self.game_state, from, mover)
            && self.destinations(from, mover) & square_bit(to) != 0;
        if !still_legal {
            log::debug!("{mover:?} move {from}->{to} fizzled");
            self.game_state.en_passant_square = None;
            steps.push(AnimationStep::MoveFizzled { side: mover, from, to });
            return;
        }

        let applied = match apply_move(&mut self.game_state, from, to) {
            Ok(applied) => applied,
            Err(err) => {
                log::error!("validated move {from}->{to} failed to apply: {err}");
                debug_assert!(false, "validated moves always apply");
                steps.push(AnimationStep::MoveFizzled { side: mover, from, to });
                return;
            }
        };
        if let Some(captured) = applied.captured.filter(|&captured| captured != to) {
            self.effects.clear_piece(captured);
        }
        self.effects.relocate(from, to);
        if let Some((rook_from, rook_to)) = applied.rook {
            self.effects.relocate(rook_from, rook_to);
        }
        steps.push(AnimationStep::BoardMove { side: mover, applied });

        if let Some(loop_length) = self.hands[mover.index()].record_move(from, to) {
            if let Some(card_id) = summon_card(&self.catalog, loop_length, &mut self.rng) {
                log::info!("{mover:?} closed a loop of {loop_length} and summoned {card_id}");
                self.hands[mover.index()].grant(card_id.to_owned());
                steps.push(AnimationStep::SummonCard {
                    side: mover,
                    card_id: card_id.to_owned(),
                    loop_length,
                });
            }
        }
    }

    /// Run the whole resolution: fast cards (responder first, displacements
    /// last), the board move, slow cards, counter pairs, end-of-turn
    /// removals and decay, then the side switch.
    fn resolve_turn(&mut self) -> Vec<AnimationStep> {
        let mover = self.side_to_move();
        let responder = mover.opposite();
        let mut steps = Vec::new();

        let mut coins = self.hands[responder.index()].drain_queue();
        coins.extend(self.hands[mover.index()].drain_queue());

        let (fast, slow): (Vec<Coin>, Vec<Coin>) =
            coins.into_iter().partition(|coin| coin.speed != Speed::Slow);
        let (displacements, fast): (Vec<Coin>, Vec<Coin>) =
            fast.into_iter().partition(|coin| self.is_displacement(coin));

        for coin in fast.iter().chain(displacements.iter()) {
            let step = self.resolve_one(coin);
            steps.push(step);
        }

        if let Some((from, to)) = self.queued_move.take() {
            self.play_queued_move(mover, from, to, &mut steps);
        }

        for coin in &slow {
            let step = self.resolve_one(coin);
            steps.push(step);
        }

        for (square, pair) in self.effects.cancel_counter_pairs() {
            if pair == CounterPair::RepairRemoveSquare {
                self.game_state.repair_tile(square);
            }
            steps.push(AnimationStep::CounterSpell { square, pair });
        }

        let report = self.effects.resolve_end_of_turn(&self.game_state, &mut self.rng);
        for square in report.shielded {
            steps.push(AnimationStep::Shielded { square });
        }
        for square in report.removals {
            if let Some(piece) = self.game_state.take_piece(square) {
                self.game_state.castling_rights &= !rights_cleared_by(square);
                self.effects.clear_piece(square);
                steps.push(AnimationStep::PieceRemoved {
                    square,
                    piece: piece.code(),
                });
            }
        }

        self.outcome = match (
            self.game_state.has_king(Color::Light),
            self.game_state.has_king(Color::Dark),
        ) {
            (true, true) => None,
            (true, false) => Some(Outcome::Winner(Color::Light)),
            (false, true) => Some(Outcome::Winner(Color::Dark)),
            (false, false) => Some(Outcome::Draw),
        };
        if let Some(outcome) = self.outcome {
            log::info!("match finished: {outcome:?}");
        }

        if mover == Color::Dark {
            self.game_state.fullmove_number = self.game_state.fullmove_number.saturating_add(1);
        }
        self.game_state.side_to_move = responder;
        self.phase = Phase::Main;
        self.picked = None;
        steps.push(AnimationStep::TurnEnded { next_side: responder });
        log::info!("turn resolved; {responder:?} to move");
        log::trace!("\n{}", render_game_state(&self.game_state));

        steps
    }
}
