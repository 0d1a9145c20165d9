//! Live matches keyed by id.
//!
//! The map lock is held only to look up, insert or remove a slot; each match
//! has its own mutex so independent matches never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cards::card_catalog::CardCatalog;
use crate::errors::{ConfigError, RejectReason, RequestResult};
use crate::game_state::chess_types::Color;
use crate::session::game_session::{GameSession, SessionConfig, SessionReply, SessionRequest};

pub type MatchId = u32;

/// Upper bound on concurrently open matches.
pub const MAX_MATCHES: usize = 100;

#[derive(Debug)]
struct MatchSlot {
    session: Arc<Mutex<GameSession>>,
    dark_joined: bool,
}

#[derive(Debug)]
pub struct MatchRegistry {
    config: SessionConfig,
    catalog: Arc<CardCatalog>,
    matches: Mutex<HashMap<MatchId, MatchSlot>>,
}

impl MatchRegistry {
    pub fn new(config: SessionConfig, catalog: Arc<CardCatalog>) -> Self {
        Self {
            config,
            catalog,
            matches: Mutex::new(HashMap::new()),
        }
    }

    fn lock_matches(&self) -> RequestResult<MutexGuard<'_, HashMap<MatchId, MatchSlot>>> {
        self.matches.lock().map_err(|_| {
            log::error!("match registry lock poisoned");
            RejectReason::MatchUnavailable
        })
    }

    /// Open a new match. The creator plays light.
    pub fn create(&self) -> RequestResult<(MatchId, Color)> {
        let session = GameSession::new(&self.config, Arc::clone(&self.catalog)).map_err(|err: ConfigError| {
            log::error!("cannot start a match: {err}");
            RejectReason::MatchUnavailable
        })?;

        let mut matches = self.lock_matches()?;
        if matches.len() >= MAX_MATCHES {
            return Err(RejectReason::MatchUnavailable);
        }
        let match_id = (0..)
            .find(|id| !matches.contains_key(id))
            .ok_or(RejectReason::MatchUnavailable)?;
        matches.insert(
            match_id,
            MatchSlot {
                session: Arc::new(Mutex::new(session)),
                dark_joined: false,
            },
        );
        log::info!("match {match_id} created");
        Ok((match_id, Color::Light))
    }

    /// Join an open match as dark.
    pub fn join(&self, match_id: MatchId) -> RequestResult<Color> {
        let mut matches = self.lock_matches()?;
        let slot = matches.get_mut(&match_id).ok_or(RejectReason::UnknownMatch)?;
        if slot.dark_joined {
            return Err(RejectReason::MatchFull);
        }
        slot.dark_joined = true;
        log::info!("match {match_id} joined");
        Ok(Color::Dark)
    }

    pub fn close(&self, match_id: MatchId) -> RequestResult<()> {
        let mut matches = self.lock_matches()?;
        matches.remove(&match_id).ok_or(RejectReason::UnknownMatch)?;
        log::info!("match {match_id} closed");
        Ok(())
    }

    pub fn session(&self, match_id: MatchId) -> RequestResult<Arc<Mutex<GameSession>>> {
        let matches = self.lock_matches()?;
        matches
            .get(&match_id)
            .map(|slot| Arc::clone(&slot.session))
            .ok_or(RejectReason::UnknownMatch)
    }

    /// Run one request against a match under its lock.
    pub fn request(&self, match_id: MatchId, side: Color, request: SessionRequest) -> RequestResult<SessionReply> {
        let session = self.session(match_id)?;
        let mut session = session.lock().map_err(|_| {
            log::error!("match {match_id} lock poisoned");
            RejectReason::MatchUnavailable
        })?;
        session.handle(side, request)
    }

    pub fn len(&self) -> usize {
        self.lock_matches().map_or(0, |matches| matches.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn registry() -> MatchRegistry {
        let config = SessionConfig {
            seed: Some(1),
            ..SessionConfig::default()
        };
        MatchRegistry::new(config, Arc::new(CardCatalog::standard()))
    }

    #[test]
    fn create_join_close_lifecycle() {
        let registry = registry();
        let (first, side) = registry.create().expect("registry has room");
        assert_eq!(side, Color::Light);
        let (second, _) = registry.create().expect("registry has room");
        assert_ne!(first, second);

        assert_eq!(registry.join(first), Ok(Color::Dark));
        assert_eq!(registry.join(first), Err(RejectReason::MatchFull));
        assert_eq!(registry.join(99), Err(RejectReason::UnknownMatch));

        registry.close(first).expect("match exists");
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.request(first, Color::Light, SessionRequest::Board),
            Err(RejectReason::UnknownMatch)
        );
    }

    #[test]
    fn ids_are_reused_after_close() {
        let registry = registry();
        let (first, _) = registry.create().expect("registry has room");
        registry.close(first).expect("match exists");
        let (again, _) = registry.create().expect("registry has room");
        assert_eq!(first, again);
    }

    #[test]
    fn matches_run_independently_across_threads() {
        let registry = Arc::new(registry());
        let ids: Vec<MatchId> = (0..4)
            .map(|_| registry.create().expect("registry has room").0)
            .collect();

        let handles: Vec<_> = ids
            .iter()
            .map(|&match_id| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry
                        .request(match_id, Color::Light, SessionRequest::PickupPiece { rank: 1, file: 4 })
                        .expect("e2 pawn is moveable");
                    registry
                        .request(match_id, Color::Light, SessionRequest::LockInMove { rank: 3, file: 4 })
                        .expect("e4 is legal");
                    registry
                        .request(match_id, Color::Light, SessionRequest::LockIn)
                        .expect("move is queued");
                    registry
                        .request(match_id, Color::Dark, SessionRequest::EndPhase)
                        .expect("dark ends the response");
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker should not panic");
        }

        for match_id in ids {
            let session = registry.session(match_id).expect("match exists");
            let session = session.lock().expect("lock is healthy");
            assert_eq!(session.controller().side_to_move(), Color::Dark);
        }
    }
}
