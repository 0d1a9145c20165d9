//! Per-square and per-side status effects.
//!
//! Piece-bound effects follow their piece (see `relocate`); tile-bound ones
//! stay put. The table never removes pieces itself: `resolve_end_of_turn`
//! reports which squares must be cleared and the caller does it.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;

use crate::effects::effect_kind::{Effect, EffectBinding, EffectDuration, EffectKind, EffectView};
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::offsets::{king_attacks, orthogonal_area};

/// Two effects that cancel each other when they meet on one square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterPair {
    RepairRemoveSquare,
    GrowShrink,
}

/// Outcome of the end-of-turn pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndOfTurn {
    /// Squares whose pieces must be removed, in board order.
    pub removals: Vec<Square>,
    /// Squares that were marked but saved by a shield.
    pub shielded: Vec<Square>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectTable {
    piece_effects: [Vec<Effect>; 64],
    tile_effects: [Vec<Effect>; 64],
    side_effects: [Vec<Effect>; 2],
}

impl Default for EffectTable {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectTable {
    pub fn new() -> Self {
        Self {
            piece_effects: std::array::from_fn(|_| Vec::new()),
            tile_effects: std::array::from_fn(|_| Vec::new()),
            side_effects: [Vec::new(), Vec::new()],
        }
    }

    /// Whether an effect called `name` sits on `square` (piece- or tile-bound).
    pub fn has_effect(&self, square: Square, name: &str) -> bool {
        self.effects_at(square).any(|effect| effect.kind.name() == name)
    }

    pub fn has_side_effect(&self, side: Color, name: &str) -> bool {
        self.side_effects[side.index()]
            .iter()
            .any(|effect| effect.kind.name() == name)
    }

    /// Piece-bound effects first, then tile-bound ones.
    pub fn effects_at(&self, square: Square) -> impl Iterator<Item = &Effect> {
        self.piece_effects[square as usize]
            .iter()
            .chain(self.tile_effects[square as usize].iter())
    }

    pub fn side_effects(&self, side: Color) -> &[Effect] {
        &self.side_effects[side.index()]
    }

    /// Attach `effect` to `square`, to its occupant or to the tile depending
    /// on the kind. Side-bound kinds belong in `apply_side`.
    pub fn apply(&mut self, square: Square, effect: Effect) {
        match effect.kind.binding() {
            EffectBinding::Piece => self.piece_effects[square as usize].push(effect),
            EffectBinding::Tile => self.tile_effects[square as usize].push(effect),
            EffectBinding::Side => {
                log::error!("side effect {} applied to square {square}", effect.kind.name());
                debug_assert!(false, "side effects are applied with apply_side");
            }
        }
    }

    pub fn apply_side(&mut self, side: Color, effect: Effect) {
        self.side_effects[side.index()].push(effect);
    }

    /// Move the piece-bound effects on `from` to `to`. Whatever was bound to
    /// a piece on `to` (a captured piece) is dropped.
    pub fn relocate(&mut self, from: Square, to: Square) {
        if from == to {
            return;
        }
        self.piece_effects[to as usize] = std::mem::take(&mut self.piece_effects[from as usize]);
    }

    /// Drop the piece-bound effects of a piece that left the board.
    pub fn clear_piece(&mut self, square: Square) {
        self.piece_effects[square as usize].clear();
    }

    fn has_piece_kind(&self, square: Square, kind: EffectKind) -> bool {
        self.piece_effects[square as usize]
            .iter()
            .any(|effect| effect.kind == kind)
    }

    /// The side allowed to pick up the piece on `square`, if any.
    pub fn controller(&self, game_state: &GameState, square: Square) -> Option<Color> {
        let piece = game_state.piece_at(square)?;
        if self.has_piece_kind(square, EffectKind::CannotMove) {
            None
        } else if self.has_piece_kind(square, EffectKind::Control) {
            Some(piece.color.opposite())
        } else {
            Some(piece.color)
        }
    }

    #[inline]
    pub fn can_pick_up(&self, game_state: &GameState, square: Square, side: Color) -> bool {
        self.controller(game_state, square) == Some(side)
    }

    /// Squares holding pieces `side` may pick up.
    pub fn moveable_pieces(&self, game_state: &GameState, side: Color) -> u64 {
        squares_in(game_state.occupancy_all())
            .filter(|&square| self.can_pick_up(game_state, square, side))
            .fold(0u64, |acc, square| acc | square_bit(square))
    }

    /// Apply movement restrictions to a legal destination set. A shrunk
    /// piece keeps only its non-capturing destinations.
    pub fn filter_destinations(&self, game_state: &GameState, from: Square, destinations: u64) -> u64 {
        if !self.has_piece_kind(from, EffectKind::Shrink) {
            return destinations;
        }
        let mut quiet = destinations & !game_state.occupancy_all();
        if game_state.piece_at(from).map(|piece| piece.kind) == Some(PieceKind::Pawn) {
            // Diagonal pawn steps onto empty squares are en-passant captures.
            quiet = squares_in(quiet)
                .filter(|&to| file_of(to) == file_of(from))
                .fold(0u64, |acc, to| acc | square_bit(to));
        }
        quiet
    }

    /// Drop both halves of every counter pair sharing a square.
    pub fn cancel_counter_pairs(&mut self) -> Vec<(Square, CounterPair)> {
        let mut cancelled = Vec::new();

        for square in 0..64u8 {
            let tiles = &mut self.tile_effects[square as usize];
            if remove_pair(tiles, EffectKind::RemoveSquare, EffectKind::Repair) {
                cancelled.push((square, CounterPair::RepairRemoveSquare));
            }
            let pieces = &mut self.piece_effects[square as usize];
            if remove_pair(pieces, EffectKind::Grow, EffectKind::Shrink) {
                cancelled.push((square, CounterPair::GrowShrink));
            }
        }

        cancelled
    }

    /// End-of-turn pass: collect pending removals, let shields absorb them,
    /// then decay every duration.
    pub fn resolve_end_of_turn<R: Rng + ?Sized>(
        &mut self,
        game_state: &GameState,
        rng: &mut R,
    ) -> EndOfTurn {
        let marked = self.collect_removals(game_state, rng);
        let mut report = self.absorb_removals(marked);
        self.decay();
        report.removals.retain(|&square| game_state.piece_at(square).is_some());
        report
    }

    fn collect_removals<R: Rng + ?Sized>(&mut self, game_state: &GameState, rng: &mut R) -> Vec<Square> {
        let mut marked = Vec::new();
        let mut mark = |square: Square| {
            if !marked.contains(&square) {
                marked.push(square);
            }
        };

        for square in 0..64u8 {
            for effect in &self.tile_effects[square as usize] {
                match effect.kind {
                    EffectKind::Death => mark(square),
                    EffectKind::AreaAttack { radius } => {
                        let area = orthogonal_area(square, radius);
                        let candidates: Vec<Square> =
                            squares_in(area & game_state.pieces_of(effect.caster.opposite())).collect();
                        if let Some(&target) = candidates.choose(rng) {
                            mark(target);
                        }
                    }
                    _ => {}
                }
            }

            let Some(bearer) = game_state.piece_at(square) else {
                continue;
            };
            if self.has_piece_kind(square, EffectKind::Grow) {
                let candidates: Vec<Square> =
                    squares_in(king_attacks(square) & game_state.pieces_of(bearer.color.opposite()))
                        .collect();
                if let Some(&target) = candidates.choose(rng) {
                    mark(target);
                }
            }
        }

        for tiles in self.tile_effects.iter_mut() {
            tiles.retain(|effect| !matches!(effect.kind, EffectKind::AreaAttack { .. }));
        }

        marked
    }

    /// Drop marked squares protected by a shield, consuming that shield.
    pub fn absorb_removals(&mut self, marked: Vec<Square>) -> EndOfTurn {
        let mut report = EndOfTurn::default();
        for square in marked {
            let effects = &mut self.piece_effects[square as usize];
            match effects.iter().position(|effect| effect.kind == EffectKind::Shield) {
                Some(index) => {
                    effects.remove(index);
                    report.shielded.push(square);
                }
                None => report.removals.push(square),
            }
        }
        report
    }

    /// One tick of every duration in the table.
    pub fn decay(&mut self) {
        let lists = self
            .piece_effects
            .iter_mut()
            .chain(self.tile_effects.iter_mut())
            .chain(self.side_effects.iter_mut());
        for effects in lists {
            effects.retain_mut(|effect| match effect.duration.decremented() {
                Some(next) => {
                    effect.duration = next;
                    true
                }
                None => false,
            });
        }
    }

    /// Snapshot of every square's effects, `a1` first.
    pub fn square_views(&self) -> Vec<Vec<EffectView>> {
        (0..64u8)
            .map(|square| self.effects_at(square).map(EffectView::from).collect())
            .collect()
    }

    pub fn side_views(&self, side: Color) -> Vec<EffectView> {
        self.side_effects[side.index()].iter().map(EffectView::from).collect()
    }
}

fn remove_pair(effects: &mut Vec<Effect>, first: EffectKind, second: EffectKind) -> bool {
    let first_at = effects.iter().position(|effect| effect.kind == first);
    let second_at = effects.iter().position(|effect| effect.kind == second);
    match (first_at, second_at) {
        (Some(a), Some(b)) => {
            effects.remove(a.max(b));
            effects.remove(a.min(b));
            true
        }
        _ => false,
    }
}

/// Shorthand used by spell resolution and tests.
pub fn timed(kind: EffectKind, turns: u8, caster: Color) -> Effect {
    Effect::new(kind, EffectDuration::Turns(turns), caster)
}
