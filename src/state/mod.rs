mod game;
mod prefetch;
pub mod score;
pub mod summary;

pub use game::AdvanceOutcome;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::GameConfig;
use crate::discovery::{Discovery, DiscoveryOutcome, Validator};
use crate::geo::{GeoError, GeoLookup, ReverseGeocode};
use crate::prefs::ModeStore;
use crate::types::{GamePhase, GameSession, Mode};

/// Errors surfaced by state-machine transitions.
///
/// None of these are fatal; every one leaves the session in a well-defined
/// state with score and history intact.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Not allowed while in phase {0:?}")]
    InvalidPhase(GamePhase),

    #[error("Select a mode before starting")]
    NoModeSelected,

    #[error("No session in progress")]
    NoSession,

    #[error("Could not find a playable IP, try again")]
    DiscoveryExhausted,

    #[error("Reverse geocoding failed: {0}")]
    ReverseGeocode(#[from] GeoError),
}

impl GameError {
    /// Stable machine-readable code for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InvalidPhase(_) => "INVALID_PHASE",
            GameError::NoModeSelected => "NO_MODE_SELECTED",
            GameError::NoSession => "NO_SESSION",
            GameError::DiscoveryExhausted => "DISCOVERY_EXHAUSTED",
            GameError::ReverseGeocode(_) => "REVERSE_GEOCODE_FAILED",
        }
    }

    /// Whether retrying the same event can succeed without other input.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GameError::DiscoveryExhausted | GameError::ReverseGeocode(_)
        )
    }
}

/// Shared application state, used behind an `Arc`.
pub struct AppState {
    pub config: GameConfig,
    /// The one session the process plays at a time
    pub session: Arc<RwLock<Option<GameSession>>>,
    /// Persisted mode preference, survives sessions
    pub mode: Arc<RwLock<Option<Mode>>>,
    /// Single-writer prefetch slot; consumed at round start
    pub pending_next: Arc<RwLock<Option<DiscoveryOutcome>>>,
    /// Guarantees at most one outstanding prefetch
    pub(crate) prefetch_inflight: Arc<AtomicBool>,
    pub(crate) discovery: Arc<Discovery>,
    pub(crate) reverse: Arc<dyn ReverseGeocode>,
    pub(crate) prefs: ModeStore,
}

impl AppState {
    pub fn new(
        config: GameConfig,
        lookup: Arc<dyn GeoLookup>,
        reverse: Arc<dyn ReverseGeocode>,
    ) -> Self {
        let validator = Validator::new(lookup, config.excluded_asns.clone());
        let discovery = Arc::new(Discovery::new(
            validator,
            config.batch_size,
            config.batch_count,
        ));
        let prefs = ModeStore::new(config.prefs_path.clone());

        let mode = prefs.load();
        if let Some(m) = mode {
            tracing::info!("Restored mode preference: {}", m.as_str());
        }

        Self {
            config,
            session: Arc::new(RwLock::new(None)),
            mode: Arc::new(RwLock::new(mode)),
            pending_next: Arc::new(RwLock::new(None)),
            prefetch_inflight: Arc::new(AtomicBool::new(false)),
            discovery,
            reverse,
            prefs,
        }
    }

    /// Get a snapshot of the current session.
    pub async fn session(&self) -> Option<GameSession> {
        self.session.read().await.clone()
    }

    /// The machine's current phase. Before a session exists the phase is
    /// derived from whether a mode preference is set.
    pub async fn current_phase(&self) -> GamePhase {
        if let Some(session) = self.session.read().await.as_ref() {
            return session.phase;
        }
        if self.mode.read().await.is_some() {
            GamePhase::ModeSelected
        } else {
            GamePhase::Idle
        }
    }
}
