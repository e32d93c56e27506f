//! Aggregate statistics over a finished session.

use crate::config::ScoringConfig;
use crate::types::{GameSession, SessionSummary};

/// Build the summary view from a session's history.
pub fn summarize(session: &GameSession, scoring: &ScoringConfig) -> SessionSummary {
    let rounds = session.history.clone();

    let average_distance_km = if rounds.is_empty() {
        0.0
    } else {
        rounds.iter().map(|r| r.distance_km).sum::<f64>() / rounds.len() as f64
    };

    let top = scoring.top_points();
    let perfect_guesses = rounds.iter().filter(|r| r.score == top).count() as u32;

    let best = rounds
        .iter()
        .min_by(|a, b| a.distance_km.total_cmp(&b.distance_km))
        .cloned();

    let elapsed_ms = session.elapsed_ms.unwrap_or_else(|| {
        (chrono::Utc::now() - session.started_at).num_milliseconds().max(0) as u64
    });

    SessionSummary {
        total_score: session.total_score,
        average_distance_km,
        perfect_guesses,
        elapsed_ms,
        best,
        rounds,
    }
}
