//! Errors used throughout the rules engine.
//!
//! Two families live here. `BoardError` covers failures while building or
//! mutating a position (bad FEN, moving from an empty square, entering a
//! removed tile). `RejectReason` is the short status a client sees when a
//! request is refused; it never carries internal state across the request
//! boundary.

use std::error::Error;
use std::fmt;

use serde::Serialize;

use crate::game_state::chess_types::Square;

/// Failures raised by position construction and move application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// No piece stands on the square a move starts from.
    EmptySquare(Square),

    /// The destination tile has been removed from play.
    RemovedTile(Square),

    /// A displacement tried to land on an occupied square.
    SquareOccupied(Square),

    /// A square index outside `0..=63`, or a rank/file outside `0..=7`.
    SquareOutOfRange(u8),

    /// A FEN string failed to parse. Payload is a human-readable reason.
    InvalidFen(String),

    /// An algebraic coordinate such as `e4` failed to parse.
    InvalidAlgebraic(String),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::EmptySquare(square) => write!(f, "no piece on square {square}"),
            BoardError::RemovedTile(square) => write!(f, "square {square} has been removed"),
            BoardError::SquareOccupied(square) => write!(f, "square {square} is occupied"),
            BoardError::SquareOutOfRange(value) => write!(f, "square index out of range: {value}"),
            BoardError::InvalidFen(reason) => write!(f, "invalid FEN: {reason}"),
            BoardError::InvalidAlgebraic(reason) => write!(f, "invalid algebraic square: {reason}"),
        }
    }
}

impl Error for BoardError {}

/// Why a client request was refused. No request rejection mutates state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    #[serde(rename = "not_my_turn")]
    NotYourTurn,
    GameOver,
    PieceNotMoveable,
    NoPieceSelected,
    InvalidMove,
    MoveNotMade,
    CardNotInHand,
    InvalidTarget,
    NothingQueued,
    UnknownMatch,
    MatchFull,
    MatchUnavailable,
    BadRequest,
}

impl RejectReason {
    /// Wire status string for this rejection.
    pub const fn status(self) -> &'static str {
        match self {
            RejectReason::NotYourTurn => "not_my_turn",
            RejectReason::GameOver => "game_over",
            RejectReason::PieceNotMoveable => "piece_not_moveable",
            RejectReason::NoPieceSelected => "no_piece_selected",
            RejectReason::InvalidMove => "invalid_move",
            RejectReason::MoveNotMade => "move_not_made",
            RejectReason::CardNotInHand => "card_not_in_hand",
            RejectReason::InvalidTarget => "invalid_target",
            RejectReason::NothingQueued => "nothing_queued",
            RejectReason::UnknownMatch => "unknown_match",
            RejectReason::MatchFull => "match_full",
            RejectReason::MatchUnavailable => "match_unavailable",
            RejectReason::BadRequest => "bad_request",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status())
    }
}

impl Error for RejectReason {}

pub type RequestResult<T> = Result<T, RejectReason>;

/// A session could not be built from its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Board(BoardError),
    /// A starting hand names a card the catalog does not have.
    UnknownCard(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Board(err) => write!(f, "bad starting position: {err}"),
            ConfigError::UnknownCard(id) => write!(f, "unknown card in starting hand: {id}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Board(err) => Some(err),
            ConfigError::UnknownCard(_) => None,
        }
    }
}

impl From<BoardError> for ConfigError {
    fn from(err: BoardError) -> Self {
        ConfigError::Board(err)
    }
}

/// Failures of the line protocol itself, as opposed to refused requests.
#[derive(Debug)]
pub enum ProtocolError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Io(err) => write!(f, "i/o error: {err}"),
            ProtocolError::Json(err) => write!(f, "malformed message: {err}"),
        }
    }
}

impl Error for ProtocolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProtocolError::Io(err) => Some(err),
            ProtocolError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ProtocolError {
    fn from(err: std::io::Error) -> Self {
        ProtocolError::Io(err)
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::Json(err)
    }
}
