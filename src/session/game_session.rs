//! One match: the turn controller plus the request/response contract.

use std::sync::Arc;

use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::cards::card_catalog::CardCatalog;
use crate::cards::hand_state::{CardPlay, Coin, HandState};
use crate::cards::spell_targets::CastTargets;
use crate::effects::effect_kind::EffectView;
use crate::errors::{ConfigError, RejectReason, RequestResult};
use crate::game_state::chess_rules::STARTING_POSITION_FEN;
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::session::animation::AnimationStep;
use crate::session::turn_controller::{Outcome, Phase, TurnController};
use crate::utils::algebraic::rank_file_to_square;

/// Everything needed to start a match. Shared read-only by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub fen: String,
    /// Starting hands, light first.
    pub hands: [Vec<String>; 2],
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fen: STARTING_POSITION_FEN.to_owned(),
            hands: [
                vec!["avada_kedavra".to_owned()],
                vec!["cruciatus".to_owned(), "imperius".to_owned()],
            ],
            seed: None,
        }
    }
}

/// A client request against one match, on behalf of one side.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "endpoint", rename_all = "snake_case")]
pub enum SessionRequest {
    Board,
    Hand,
    MyTurn,
    MoveablePieces,
    PossibleMoves,
    CardQueue,
    CastTargets { card_index: usize },
    PickupPiece { rank: u8, file: u8 },
    LockInMove { rank: u8, file: u8 },
    QueueCard(CardPlay),
    QueueCards { plays: Vec<CardPlay> },
    UnqueueCard { queue_index: usize },
    LockIn,
    EndPhase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    /// Signed piece codes, `a1` first.
    pub board: Vec<i8>,
    pub fen: String,
    pub effects: Vec<Vec<EffectView>>,
    /// Side effects, light first.
    pub side_effects: [Vec<EffectView>; 2],
    pub occupancy: [u64; 2],
    pub removed_tiles: Vec<Square>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandView {
    pub my_hand: Vec<String>,
    pub opponent_hand_count: usize,
    /// Only present while the opponent is revealed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_hand: Option<Vec<String>>,
    pub my_coins: Vec<Coin>,
    pub opponent_coins: Vec<Coin>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TurnView {
    pub my_turn: bool,
    pub phase: u8,
    pub side_to_move: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Outcome>,
}

/// Persistable state of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub created_at: String,
    pub board: BoardSnapshot,
    pub hands: [Vec<String>; 2],
    pub queues: [Vec<Coin>; 2],
    pub phase: Phase,
    pub side_to_move: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Outcome>,
}

/// Successful request payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionReply {
    Board(BoardSnapshot),
    Hand(HandView),
    Turn(TurnView),
    Squares { squares: Vec<Square> },
    CastTargets {
        targets: Vec<Square>,
        #[serde(skip_serializing_if = "Option::is_none")]
        destinations: Option<Vec<Square>>,
    },
    Queue { queue: Vec<Coin> },
    MoveQueued { from: Square, to: Square },
    Animation { steps: Vec<AnimationStep> },
}

#[derive(Debug, Clone)]
pub struct GameSession {
    created_at: DateTime<Local>,
    controller: TurnController,
}

impl GameSession {
    pub fn new(config: &SessionConfig, catalog: Arc<CardCatalog>) -> Result<Self, ConfigError> {
        let game_state = GameState::from_fen(&config.fen)?;
        if let Some(unknown) = config.hands.iter().flatten().find(|id| !catalog.contains(id)) {
            return Err(ConfigError::UnknownCard(unknown.clone()));
        }
        let hands = config.hands.clone().map(HandState::new);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        Ok(Self {
            created_at: Local::now(),
            controller: TurnController::new(game_state, hands, catalog, rng),
        })
    }

    pub fn controller(&self) -> &TurnController {
        &self.controller
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// Apply one request. A rejected request leaves the match untouched.
    pub fn handle(&mut self, side: Color, request: SessionRequest) -> RequestResult<SessionReply> {
        let result = self.dispatch(side, &request);
        if let Err(reason) = &result {
            log::debug!("{side:?} {request:?} rejected: {reason}");
        }
        result
    }

    fn dispatch(&mut self, side: Color, request: &SessionRequest) -> RequestResult<SessionReply> {
        let controller = &mut self.controller;
        match request {
            SessionRequest::Board => Ok(SessionReply::Board(self.board_snapshot())),
            SessionRequest::Hand => Ok(SessionReply::Hand(self.hand_view(side))),
            SessionRequest::MyTurn => Ok(SessionReply::Turn(self.turn_view(side))),
            SessionRequest::MoveablePieces => Ok(squares_reply(controller.moveable_pieces(side)?)),
            SessionRequest::PossibleMoves => Ok(squares_reply(controller.possible_moves(side)?)),
            SessionRequest::CardQueue => Ok(SessionReply::Queue {
                queue: controller.hand(side).queue().to_vec(),
            }),
            SessionRequest::CastTargets { card_index } => {
                Ok(match controller.begin_cast(side, *card_index)? {
                    CastTargets::NoTarget => SessionReply::CastTargets {
                        targets: Vec::new(),
                        destinations: None,
                    },
                    CastTargets::Single(mask) => SessionReply::CastTargets {
                        targets: squares_in(mask).collect(),
                        destinations: None,
                    },
                    CastTargets::Pair {
                        pieces,
                        destinations,
                    } => SessionReply::CastTargets {
                        targets: squares_in(pieces).collect(),
                        destinations: Some(squares_in(destinations).collect()),
                    },
                })
            }
            SessionRequest::PickupPiece { rank, file } => {
                let square = client_square(*rank, *file)?;
                Ok(squares_reply(controller.pickup_piece(side, square)?))
            }
            SessionRequest::LockInMove { rank, file } => {
                let square = client_square(*rank, *file)?;
                let (from, to) = controller.lock_in_move(side, square)?;
                Ok(SessionReply::MoveQueued { from, to })
            }
            SessionRequest::QueueCard(play) => queue_reply(controller, side, std::slice::from_ref(play)),
            SessionRequest::QueueCards { plays } => queue_reply(controller, side, plays),
            SessionRequest::UnqueueCard { queue_index } => {
                controller.unqueue_card(side, *queue_index)?;
                Ok(SessionReply::Queue {
                    queue: controller.hand(side).queue().to_vec(),
                })
            }
            SessionRequest::LockIn | SessionRequest::EndPhase => Ok(SessionReply::Animation {
                steps: controller.end_phase(side)?,
            }),
        }
    }

    pub fn board_snapshot(&self) -> BoardSnapshot {
        let game_state = self.controller.game_state();
        let effects = self.controller.effects();
        BoardSnapshot {
            board: game_state.board_codes(),
            fen: game_state.get_fen(),
            effects: effects.square_views(),
            side_effects: [effects.side_views(Color::Light), effects.side_views(Color::Dark)],
            occupancy: game_state.occupancy_by_color,
            removed_tiles: squares_in(game_state.removed_tiles).collect(),
        }
    }

    /// `side`'s view of both hands. The opponent's card ids are hidden
    /// unless the opponent is under reveal.
    pub fn hand_view(&self, side: Color) -> HandView {
        let opponent = side.opposite();
        let own = self.controller.hand(side);
        let theirs = self.controller.hand(opponent);
        let revealed = self.controller.effects().has_side_effect(opponent, "reveal");

        HandView {
            my_hand: own.cards().to_vec(),
            opponent_hand_count: theirs.cards().len(),
            opponent_hand: revealed.then(|| theirs.cards().to_vec()),
            my_coins: own.queue().to_vec(),
            opponent_coins: theirs.queue().to_vec(),
        }
    }

    pub fn turn_view(&self, side: Color) -> TurnView {
        let outcome = self.controller.outcome();
        TurnView {
            my_turn: outcome.is_none() && self.controller.is_turn(side),
            phase: self.controller.phase().code(),
            side_to_move: self.controller.side_to_move(),
            winner: outcome,
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let hand = |side: Color| self.controller.hand(side);
        GameSnapshot {
            created_at: self.created_at.to_rfc3339(),
            board: self.board_snapshot(),
            hands: [hand(Color::Light).cards().to_vec(), hand(Color::Dark).cards().to_vec()],
            queues: [hand(Color::Light).queue().to_vec(), hand(Color::Dark).queue().to_vec()],
            phase: self.controller.phase(),
            side_to_move: self.controller.side_to_move(),
            winner: self.controller.outcome(),
        }
    }
}

fn client_square(rank: u8, file: u8) -> RequestResult<Square> {
    rank_file_to_square(rank, file).map_err(|err| {
        log::debug!("bad square from client: {err}");
        RejectReason::BadRequest
    })
}

fn squares_reply(mask: u64) -> SessionReply {
    SessionReply::Squares {
        squares: squares_in(mask).collect(),
    }
}

fn queue_reply(controller: &mut TurnController, side: Color, plays: &[CardPlay]) -> RequestResult<SessionReply> {
    let steps = controller.queue_cards(side, plays)?;
    if steps.is_empty() {
        Ok(SessionReply::Queue {
            queue: controller.hand(side).queue().to_vec(),
        })
    } else {
        Ok(SessionReply::Animation { steps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(hands: [&[&str]; 2]) -> GameSession {
        let config = SessionConfig {
            hands: hands.map(|ids| ids.iter().map(|id| (*id).to_owned()).collect()),
            seed: Some(3),
            ..SessionConfig::default()
        };
        GameSession::new(&config, Arc::new(CardCatalog::standard())).expect("config should be valid")
    }

    #[test]
    fn default_config_deals_the_opening_hands() {
        let session = GameSession::new(&SessionConfig::default(), Arc::new(CardCatalog::standard()))
            .expect("default config should be valid");
        assert_eq!(session.hand_view(Color::Light).my_hand, vec!["avada_kedavra".to_owned()]);
        assert_eq!(session.hand_view(Color::Light).opponent_hand_count, 2);
        assert_eq!(session.hand_view(Color::Light).opponent_hand, None);
    }

    #[test]
    fn unknown_cards_and_bad_fens_are_config_errors() {
        let catalog = Arc::new(CardCatalog::standard());
        let config = SessionConfig {
            hands: [vec!["wingardium".to_owned()], Vec::new()],
            ..SessionConfig::default()
        };
        assert_eq!(
            GameSession::new(&config, Arc::clone(&catalog)).map(|_| ()),
            Err(ConfigError::UnknownCard("wingardium".to_owned()))
        );

        let config = SessionConfig {
            fen: "not a fen".to_owned(),
            ..SessionConfig::default()
        };
        assert!(matches!(
            GameSession::new(&config, catalog).map(|_| ()),
            Err(ConfigError::Board(_))
        ));
    }

    #[test]
    fn requests_drive_a_full_turn() {
        let mut session = session([&[], &[]]);
        let reply = session
            .handle(Color::Light, SessionRequest::PickupPiece { rank: 1, file: 4 })
            .expect("e2 pawn is moveable");
        assert_eq!(reply, SessionReply::Squares { squares: vec![20, 28] });

        session
            .handle(Color::Light, SessionRequest::LockInMove { rank: 3, file: 4 })
            .expect("e4 is legal");
        session.handle(Color::Light, SessionRequest::LockIn).expect("move is queued");
        assert_eq!(
            session.handle(Color::Light, SessionRequest::EndPhase),
            Err(RejectReason::NotYourTurn)
        );

        let reply = session.handle(Color::Dark, SessionRequest::EndPhase).expect("dark ends the response");
        assert!(matches!(reply, SessionReply::Animation { .. }));
        let turn = session.turn_view(Color::Dark);
        assert!(turn.my_turn);
        assert_eq!(turn.phase, 0);
        assert_eq!(session.controller().game_state().en_passant_square, Some(20));
    }

    #[test]
    fn out_of_range_squares_are_bad_requests() {
        let mut session = session([&[], &[]]);
        assert_eq!(
            session.handle(Color::Light, SessionRequest::PickupPiece { rank: 9, file: 0 }),
            Err(RejectReason::BadRequest)
        );
    }

    #[test]
    fn reveal_exposes_the_opponent_hand() {
        let mut session = session([&["legilimens"], &["protego", "reparo"]]);
        assert_eq!(session.hand_view(Color::Light).opponent_hand, None);

        session
            .handle(
                Color::Light,
                SessionRequest::QueueCard(CardPlay {
                    card_index: 0,
                    target: None,
                    second_target: None,
                }),
            )
            .expect("legilimens is instant");
        assert_eq!(
            session.hand_view(Color::Light).opponent_hand,
            Some(vec!["protego".to_owned(), "reparo".to_owned()])
        );
        assert_eq!(session.hand_view(Color::Dark).opponent_hand, None);
    }

    #[test]
    fn requests_deserialize_from_endpoint_tags() {
        let request: SessionRequest =
            serde_json::from_str(r#"{"endpoint":"pickup_piece","rank":1,"file":4}"#).expect("should parse");
        assert_eq!(request, SessionRequest::PickupPiece { rank: 1, file: 4 });

        let request: SessionRequest =
            serde_json::from_str(r#"{"endpoint":"queue_card","card_index":0,"target":12}"#).expect("should parse");
        assert_eq!(
            request,
            SessionRequest::QueueCard(CardPlay {
                card_index: 0,
                target: Some(12),
                second_target: None,
            })
        );
    }

    #[test]
    fn snapshots_serialize() {
        let session = session([&["protego"], &[]]);
        let json = serde_json::to_value(session.snapshot()).expect("snapshot should serialize");
        assert_eq!(json["side_to_move"], "light");
        assert_eq!(json["phase"], "main");
        assert_eq!(json["hands"][0][0], "protego");
        assert_eq!(json["board"]["board"][4], 1);
    }
}
