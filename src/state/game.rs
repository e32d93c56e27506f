//! The round lifecycle state machine.
//!
//! Every external input maps to one guarded event method here. An event fired
//! in the wrong phase returns `GameError::InvalidPhase` and mutates nothing.

use chrono::Utc;

use super::{score, summary, AppState, GameError};
use crate::discovery::DiscoveryOutcome;
use crate::types::{
    Coordinate, GamePhase, GameSession, Mode, Place, RoundResult, SessionSummary,
};

/// What `advance` led to: another round, or the end of the session.
#[derive(Debug, Clone)]
pub enum AdvanceOutcome {
    NextRound(GameSession),
    Complete(SessionSummary),
}

impl AppState {
    /// Idle → ModeSelected. Stores and persists the mode preference.
    ///
    /// Rejected while a session is being played; allowed again once it
    /// completes.
    pub async fn choose_mode(&self, mode: Mode) -> Result<(), GameError> {
        let phase = self.current_phase().await;
        if !matches!(
            phase,
            GamePhase::Idle | GamePhase::ModeSelected | GamePhase::SessionComplete
        ) {
            return Err(GameError::InvalidPhase(phase));
        }

        *self.mode.write().await = Some(mode);
        if let Err(e) = self.prefs.save(mode) {
            tracing::warn!("Could not persist mode preference: {}", e);
        }
        Ok(())
    }

    /// ModeSelected → Discovering → AwaitingGuess.
    ///
    /// Creates a fresh session (discarding a completed one) and runs the
    /// first discovery synchronously. On `Exhausted` the session is torn down
    /// again and the error is retryable.
    pub async fn start_session(&self) -> Result<GameSession, GameError> {
        let phase = self.current_phase().await;
        if !matches!(
            phase,
            GamePhase::Idle | GamePhase::ModeSelected | GamePhase::SessionComplete
        ) {
            return Err(GameError::InvalidPhase(phase));
        }

        let mode = self.mode.read().await.ok_or(GameError::NoModeSelected)?;

        // Anything left over from a previous session is stale
        *self.pending_next.write().await = None;

        let session = GameSession {
            id: ulid::Ulid::new().to_string(),
            mode,
            phase: GamePhase::Discovering,
            round_index: 0,
            total_score: 0,
            history: Vec::new(),
            active: None,
            started_at: Utc::now(),
            elapsed_ms: None,
        };
        *self.session.write().await = Some(session);

        match self.discovery.discover().await {
            DiscoveryOutcome::Found(record) => {
                let mut guard = self.session.write().await;
                let session = guard.as_mut().ok_or(GameError::NoSession)?;
                tracing::info!("Round 1: discovered {}", record.ip);
                session.active = Some(record);
                session.phase = GamePhase::AwaitingGuess;
                Ok(session.clone())
            }
            DiscoveryOutcome::Exhausted => {
                *self.session.write().await = None;
                Err(GameError::DiscoveryExhausted)
            }
        }
    }

    /// AwaitingGuess → Reviewing.
    ///
    /// Resolves the guessed coordinate to a place, scores the guess, appends
    /// the `RoundResult` and schedules a prefetch if rounds remain. A reverse
    /// geocoding failure leaves the machine in AwaitingGuess with nothing
    /// recorded, so the operator can guess again.
    pub async fn submit_guess(&self, guess: Coordinate) -> Result<RoundResult, GameError> {
        let record = {
            let guard = self.session.read().await;
            let session = guard.as_ref().ok_or(GameError::NoSession)?;
            if session.phase != GamePhase::AwaitingGuess {
                return Err(GameError::InvalidPhase(session.phase));
            }
            session.active.clone().ok_or(GameError::NoSession)?
        };

        let guessed_place = self.reverse.resolve(guess).await?;

        let distance_km = score::haversine_km(guess, record.coordinate);
        let points = score::score_from_distance(distance_km, &self.config.scoring);

        let unknown = || "Unknown".to_string();
        let result = RoundResult {
            ip: record.ip.clone(),
            distance_km,
            score: points,
            guessed_coordinate: guess,
            actual_coordinate: record.coordinate,
            guessed_place,
            actual_place: Place {
                city: record.city.clone().unwrap_or_else(unknown),
                region: record.region.clone().unwrap_or_else(unknown),
                country: record.country.clone().unwrap_or_else(unknown),
            },
            organization: Some(record.organization.clone()),
        };

        let (rounds_remain, session_id) = {
            let mut guard = self.session.write().await;
            let session = guard.as_mut().ok_or(GameError::NoSession)?;
            if session.phase != GamePhase::AwaitingGuess {
                return Err(GameError::InvalidPhase(session.phase));
            }

            session.history.push(result.clone());
            session.total_score += points;
            session.round_index += 1;
            session.phase = GamePhase::Reviewing;

            tracing::info!(
                "Round {} scored: {:.1} km away, {} points (total {})",
                session.round_index,
                distance_km,
                points,
                session.total_score
            );

            (session.round_index < self.config.rounds, session.id.clone())
        };

        if rounds_remain {
            self.schedule_prefetch(session_id);
        }

        Ok(result)
    }

    /// Reviewing → Discovering → AwaitingGuess, or Reviewing → SessionComplete.
    ///
    /// Consumes the prefetch slot when populated; otherwise discovers
    /// synchronously. `Exhausted` re-enters Reviewing so the operator can
    /// retry without losing score or history.
    pub async fn advance(&self) -> Result<AdvanceOutcome, GameError> {
        {
            let mut guard = self.session.write().await;
            let session = guard.as_mut().ok_or(GameError::NoSession)?;
            if session.phase != GamePhase::Reviewing {
                return Err(GameError::InvalidPhase(session.phase));
            }

            if session.round_index >= self.config.rounds {
                session.phase = GamePhase::SessionComplete;
                session.active = None;
                session.elapsed_ms =
                    Some((Utc::now() - session.started_at).num_milliseconds().max(0) as u64);
                tracing::info!(
                    "Session complete: {} points over {} rounds",
                    session.total_score,
                    session.round_index
                );
                return Ok(AdvanceOutcome::Complete(summary::summarize(
                    session,
                    &self.config.scoring,
                )));
            }

            session.phase = GamePhase::Discovering;
            session.active = None;
        }

        // Take the slot and release its lock before discovering, so the
        // background prefetch writer is never blocked on this await
        let prefetched = self.pending_next.write().await.take();
        let outcome = match prefetched {
            Some(prefetched) => {
                tracing::debug!("Consuming prefetched discovery result");
                prefetched
            }
            None => self.discovery.discover().await,
        };

        match outcome {
            DiscoveryOutcome::Found(record) => {
                let mut guard = self.session.write().await;
                let session = guard.as_mut().ok_or(GameError::NoSession)?;
                tracing::info!(
                    "Round {}: discovered {}",
                    session.round_index + 1,
                    record.ip
                );
                session.active = Some(record);
                session.phase = GamePhase::AwaitingGuess;
                Ok(AdvanceOutcome::NextRound(session.clone()))
            }
            DiscoveryOutcome::Exhausted => {
                let mut guard = self.session.write().await;
                let session = guard.as_mut().ok_or(GameError::NoSession)?;
                session.phase = GamePhase::Reviewing;
                Err(GameError::DiscoveryExhausted)
            }
        }
    }

    /// Aggregate statistics, available once the session is complete.
    pub async fn summary(&self) -> Result<SessionSummary, GameError> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(GameError::NoSession)?;
        if session.phase != GamePhase::SessionComplete {
            return Err(GameError::InvalidPhase(session.phase));
        }
        Ok(summary::summarize(session, &self.config.scoring))
    }
}
