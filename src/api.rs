//! HTTP API endpoints.
//!
//! Each route is a thin wrapper over one state-machine event; the map UI is
//! an external collaborator that drives these and renders the JSON it gets
//! back.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::MapDefaults;
use crate::state::{AdvanceOutcome, AppState, GameError};
use crate::types::{
    Coordinate, GamePhase, GameSession, Mode, RoundResult, SessionSummary,
};

/// JSON error body with a stable machine-readable code.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: &'static str,
    pub msg: String,
    pub retryable: bool,
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = match &self {
            GameError::InvalidPhase(_)
            | GameError::NoModeSelected
            | GameError::NoSession => StatusCode::CONFLICT,
            GameError::DiscoveryExhausted => StatusCode::SERVICE_UNAVAILABLE,
            GameError::ReverseGeocode(_) => StatusCode::BAD_GATEWAY,
        };

        let body = ApiError {
            code: self.code(),
            msg: self.to_string(),
            retryable: self.is_retryable(),
        };
        (status, Json(body)).into_response()
    }
}

/// What the UI may see of the active record.
///
/// The actual coordinate is withheld until the guess has been scored, and
/// hard mode hides the hostname hint.
#[derive(Debug, Serialize)]
pub struct ActiveIpView {
    pub ip: String,
    pub organization: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: String,
    pub mode: Mode,
    pub phase: GamePhase,
    pub round_index: u32,
    pub total_rounds: u32,
    pub total_score: u32,
    pub history: Vec<RoundResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<ActiveIpView>,
    pub elapsed_ms: u64,
}

impl SessionView {
    fn from_session(session: GameSession, total_rounds: u32) -> Self {
        let reveal = session.phase == GamePhase::Reviewing
            || session.phase == GamePhase::SessionComplete;
        let show_hostname = session.mode == Mode::Normal;

        let active = session.active.map(|record| ActiveIpView {
            ip: record.ip,
            organization: record.organization,
            hostname: record.hostname.filter(|_| show_hostname),
            coordinate: reveal.then_some(record.coordinate),
        });

        let elapsed_ms = session.elapsed_ms.unwrap_or_else(|| {
            (chrono::Utc::now() - session.started_at)
                .num_milliseconds()
                .max(0) as u64
        });

        Self {
            id: session.id,
            mode: session.mode,
            phase: session.phase,
            round_index: session.round_index,
            total_rounds,
            total_score: session.total_score,
            history: session.history,
            active,
            elapsed_ms,
        }
    }
}

/// Top-level state view, valid in every phase.
#[derive(Debug, Serialize)]
pub struct StateView {
    pub phase: GamePhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionView>,
    pub map: MapDefaults,
}

/// GET /api/session
pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<StateView> {
    let session = state
        .session()
        .await
        .map(|s| SessionView::from_session(s, state.config.rounds));

    Json(StateView {
        phase: state.current_phase().await,
        mode: *state.mode.read().await,
        session,
        map: state.config.map,
    })
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: Mode,
}

/// POST /api/mode
pub async fn post_mode(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ModeRequest>,
) -> Result<StatusCode, GameError> {
    state.choose_mode(body.mode).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/start
pub async fn post_start(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionView>, GameError> {
    let session = state.start_session().await?;
    Ok(Json(SessionView::from_session(session, state.config.rounds)))
}

#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    pub lat: f64,
    pub lon: f64,
}

/// POST /api/guess
pub async fn post_guess(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GuessRequest>,
) -> Result<Json<RoundResult>, GameError> {
    let result = state
        .submit_guess(Coordinate::new(body.lat, body.lon))
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SessionSummary>,
}

/// POST /api/advance
pub async fn post_advance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AdvanceResponse>, GameError> {
    let response = match state.advance().await? {
        AdvanceOutcome::NextRound(session) => AdvanceResponse {
            done: false,
            session: Some(SessionView::from_session(session, state.config.rounds)),
            summary: None,
        },
        AdvanceOutcome::Complete(summary) => AdvanceResponse {
            done: true,
            session: None,
            summary: Some(summary),
        },
    };
    Ok(Json(response))
}

/// GET /api/summary
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionSummary>, GameError> {
    Ok(Json(state.summary().await?))
}
