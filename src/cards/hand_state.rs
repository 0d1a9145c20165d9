//! One side's cards, queued plays ("coins"), and movement chain.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cards::card_catalog::{CardCatalog, CardSpec, Speed};
use crate::errors::{RejectReason, RequestResult};
use crate::game_state::chess_types::{Color, Square};

/// Summon odds by rarity (index 0 is rarity 1), in percent.
pub const BASE_RATES_BY_RARITY: [u32; 5] = [80, 10, 5, 4, 1];
/// Added per move of the loop that triggered the summon.
pub const CUMULATIVE_RATES_BY_RARITY: [u32; 5] = [50, 10, 5, 3, 2];

/// A queued card play awaiting its resolution slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coin {
    pub caster: Color,
    pub card_id: String,
    pub speed: Speed,
    pub target: Option<Square>,
    pub second_target: Option<Square>,
}

/// A request to play the card at `card_index` of the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CardPlay {
    pub card_index: usize,
    pub target: Option<Square>,
    pub second_target: Option<Square>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandState {
    cards: Vec<String>,
    queue: Vec<Coin>,
    move_chain: Vec<Square>,
}

impl HandState {
    pub fn new(cards: Vec<String>) -> Self {
        Self {
            cards,
            ..Self::default()
        }
    }

    pub fn cards(&self) -> &[String] {
        &self.cards
    }

    pub fn queue(&self) -> &[Coin] {
        &self.queue
    }

    pub fn card(&self, index: usize) -> Option<&str> {
        self.cards.get(index).map(String::as_str)
    }

    pub fn grant(&mut self, card_id: String) {
        self.cards.push(card_id);
    }

    /// Validate and record `plays` all at once; nothing changes if any play
    /// is rejected. Instant coins are returned for immediate resolution and
    /// are not added to the queue. Returns every coin created, in play order.
    pub fn queue_cards<F>(
        &mut self,
        caster: Color,
        plays: &[CardPlay],
        catalog: &CardCatalog,
        mut accepts: F,
    ) -> RequestResult<Vec<Coin>>
    where
        F: FnMut(&CardSpec, &CardPlay) -> bool,
    {
        let mut indices: Vec<usize> = plays.iter().map(|play| play.card_index).collect();
        indices.sort_unstable();
        indices.dedup();
        if indices.len() != plays.len() {
            return Err(RejectReason::BadRequest);
        }

        let mut coins = Vec::with_capacity(plays.len());
        for play in plays {
            let card_id = self.card(play.card_index).ok_or(RejectReason::CardNotInHand)?;
            let spec = catalog.get(card_id).ok_or(RejectReason::CardNotInHand)?;
            if !accepts(spec, play) {
                return Err(RejectReason::InvalidTarget);
            }
            coins.push(Coin {
                caster,
                card_id: spec.id.to_owned(),
                speed: spec.speed,
                target: play.target,
                second_target: play.second_target,
            });
        }

        for &index in indices.iter().rev() {
            self.cards.remove(index);
        }
        self.queue.extend(
            coins
                .iter()
                .filter(|coin| coin.speed != Speed::Instant)
                .cloned(),
        );

        Ok(coins)
    }

    /// Withdraw a queued coin and put its card back in the hand.
    pub fn unqueue(&mut self, queue_index: usize) -> RequestResult<Coin> {
        if queue_index >= self.queue.len() {
            return Err(RejectReason::NothingQueued);
        }
        let coin = self.queue.remove(queue_index);
        self.cards.push(coin.card_id.clone());
        Ok(coin)
    }

    pub fn drain_queue(&mut self) -> Vec<Coin> {
        std::mem::take(&mut self.queue)
    }

    /// Extend the movement chain with a board move. When the chain closes a
    /// loop, returns the loop length (in moves) and restarts the chain.
    pub fn record_move(&mut self, from: Square, to: Square) -> Option<usize> {
        if self.move_chain.last() == Some(&from) {
            self.move_chain.push(to);
        } else {
            self.move_chain = vec![from, to];
        }

        let last = *self.move_chain.last()?;
        let head = &self.move_chain[..self.move_chain.len() - 1];
        let start = head.iter().position(|&square| square == last)?;
        let loop_length = self.move_chain.len() - start - 1;
        self.move_chain = vec![last];
        Some(loop_length)
    }
}

/// Rarity of a summoned card for a loop of `loop_length` moves, given a
/// uniform `roll` in `[0, 1)`. Longer loops shift the odds toward rare cards.
pub fn summon_rarity(loop_length: usize, roll: f64) -> u8 {
    let mut allotted = 0u32;
    for rarity in (1..=5u8).rev() {
        let index = usize::from(rarity - 1);
        let rate = BASE_RATES_BY_RARITY[index]
            .saturating_add(CUMULATIVE_RATES_BY_RARITY[index].saturating_mul(loop_length as u32));
        allotted += rate.min(100 - allotted);
        if roll * 100.0 < f64::from(allotted) {
            return rarity;
        }
    }
    1
}

/// Draw a card id for a closed movement loop.
pub fn summon_card<R: Rng + ?Sized>(
    catalog: &CardCatalog,
    loop_length: usize,
    rng: &mut R,
) -> Option<&'static str> {
    let rarity = summon_rarity(loop_length, rng.random::<f64>());
    catalog.ids_with_rarity(rarity).choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn hand(cards: &[&str]) -> HandState {
        HandState::new(cards.iter().map(|id| (*id).to_owned()).collect())
    }

    fn play(card_index: usize, target: Option<Square>) -> CardPlay {
        CardPlay {
            card_index,
            target,
            second_target: None,
        }
    }

    #[test]
    fn queueing_moves_cards_from_hand_to_queue() {
        let catalog = CardCatalog::standard();
        let mut hand = hand(&["cruciatus", "protego", "legilimens"]);
        let coins = hand
            .queue_cards(Color::Dark, &[play(0, Some(12)), play(2, None)], &catalog, |_, _| true)
            .expect("plays should queue");

        assert_eq!(coins.len(), 2);
        assert_eq!(hand.cards(), ["protego".to_owned()]);
        assert_eq!(hand.queue().len(), 1, "instant coins are not queued");
        assert_eq!(hand.queue()[0].card_id, "cruciatus");
    }

    #[test]
    fn a_rejected_play_leaves_the_hand_untouched() {
        let catalog = CardCatalog::standard();
        let mut hand = hand(&["cruciatus", "protego"]);
        let before = hand.clone();

        let result = hand.queue_cards(Color::Light, &[play(0, Some(52)), play(1, Some(9))], &catalog, |spec, _| {
            spec.id != "protego"
        });
        assert_eq!(result, Err(RejectReason::InvalidTarget));
        assert_eq!(hand, before);

        assert_eq!(
            hand.queue_cards(Color::Light, &[play(5, None)], &catalog, |_, _| true),
            Err(RejectReason::CardNotInHand)
        );
        assert_eq!(
            hand.queue_cards(Color::Light, &[play(0, None), play(0, None)], &catalog, |_, _| true),
            Err(RejectReason::BadRequest)
        );
    }

    #[test]
    fn unqueue_returns_the_card() {
        let catalog = CardCatalog::standard();
        let mut hand = hand(&["reducio"]);
        hand.queue_cards(Color::Light, &[play(0, Some(52))], &catalog, |_, _| true)
            .expect("play should queue");
        let coin = hand.unqueue(0).expect("coin should be withdrawn");
        assert_eq!(coin.card_id, "reducio");
        assert_eq!(hand.cards(), ["reducio".to_owned()]);
        assert_eq!(hand.unqueue(0), Err(RejectReason::NothingQueued));
    }

    #[test]
    fn movement_chain_detects_a_knight_round_trip() {
        let mut hand = HandState::default();
        assert_eq!(hand.record_move(6, 21), None);
        assert_eq!(hand.record_move(21, 6), Some(2));
        // The chain restarts from the current square.
        assert_eq!(hand.record_move(6, 21), None);
        assert_eq!(hand.record_move(12, 20), None, "a different piece starts a new chain");
    }

    #[test]
    fn summon_rarity_follows_capped_rates() {
        // No loop: 1% rarity 5, 4% rarity 4, 5% rarity 3, 10% rarity 2, rest rarity 1.
        assert_eq!(summon_rarity(0, 0.0), 5);
        assert_eq!(summon_rarity(0, 0.02), 4);
        assert_eq!(summon_rarity(0, 0.5), 1);
        // Loop of two: rarity 5 gets 5%, rarity 4 10%, rarity 3 15%, rarity 2 30%.
        assert_eq!(summon_rarity(2, 0.04), 5);
        assert_eq!(summon_rarity(2, 0.10), 4);
        assert_eq!(summon_rarity(2, 0.55), 2);
        assert_eq!(summon_rarity(2, 0.99), 1);
    }

    #[test]
    fn summoned_cards_exist_in_the_catalog() {
        let catalog = CardCatalog::standard();
        let mut rng = StdRng::seed_from_u64(11);
        for loop_length in 0..6 {
            let id = summon_card(&catalog, loop_length, &mut rng).expect("every rarity has cards");
            assert!(catalog.contains(id));
        }
    }
}
