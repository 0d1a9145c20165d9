//! Line-oriented JSON front end: one command per input line, one response
//! per output line.

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::errors::{ProtocolError, RejectReason};
use crate::game_state::chess_types::Color;
use crate::session::game_session::{SessionReply, SessionRequest};
use crate::session::match_registry::{MatchId, MatchRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Create,
    Join {
        match_id: MatchId,
    },
    Close {
        match_id: MatchId,
    },
    Request {
        match_id: MatchId,
        side: Color,
        request: SessionRequest,
    },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<MatchId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<SessionReply>,
}

impl Response {
    fn success() -> Self {
        Self {
            status: "success",
            match_id: None,
            side: None,
            reply: None,
        }
    }

    fn rejected(reason: RejectReason) -> Self {
        Self {
            status: reason.status(),
            ..Self::success()
        }
    }
}

/// Execute one command against the registry.
pub fn execute(registry: &MatchRegistry, command: Command) -> Response {
    let result = match command {
        Command::Create => registry.create().map(|(match_id, side)| Response {
            match_id: Some(match_id),
            side: Some(side),
            ..Response::success()
        }),
        Command::Join { match_id } => registry.join(match_id).map(|side| Response {
            match_id: Some(match_id),
            side: Some(side),
            ..Response::success()
        }),
        Command::Close { match_id } => registry.close(match_id).map(|()| Response::success()),
        Command::Request {
            match_id,
            side,
            request,
        } => registry.request(match_id, side, request).map(|reply| Response {
            reply: Some(reply),
            ..Response::success()
        }),
        Command::Quit => Ok(Response::success()),
    };
    result.unwrap_or_else(Response::rejected)
}

/// Handle one input line and write its response. Returns `false` once the
/// client asks to quit.
pub fn handle_line<W: Write>(registry: &MatchRegistry, line: &str, out: &mut W) -> Result<bool, ProtocolError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(true);
    }

    let (response, keep_going) = match serde_json::from_str::<Command>(line) {
        Ok(command) => {
            let quit = command == Command::Quit;
            (execute(registry, command), !quit)
        }
        Err(err) => {
            log::debug!("unparseable command {line:?}: {err}");
            (Response::rejected(RejectReason::BadRequest), true)
        }
    };

    serde_json::to_writer(&mut *out, &response)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(keep_going)
}

/// Serve commands from stdin until EOF or `quit`.
pub fn run_stdio_loop(registry: &MatchRegistry) -> Result<(), ProtocolError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        if !handle_line(registry, &line?, &mut out)? {
            break;
        }
    }
    Ok(())
}
