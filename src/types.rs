use serde::{Deserialize, Serialize};

/// Opaque ID type for sessions
pub type SessionId = String;

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A validated geolocation record for a discovered IP.
///
/// Only the Geolocation Validator produces these: anything bogon, locationless
/// or org-less never makes it into a `GeoRecord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoRecord {
    pub ip: String,
    pub coordinate: Coordinate,
    /// "AS<digits> <name>", e.g. "AS15169 Google LLC"
    pub organization: String,
    pub hostname: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl GeoRecord {
    /// The "AS<digits>" prefix of the organization string.
    pub fn asn(&self) -> &str {
        self.organization
            .split_whitespace()
            .next()
            .unwrap_or(&self.organization)
    }
}

/// A resolved place name from reverse geocoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub city: String,
    pub region: String,
    /// Two-letter country code, upper-cased
    pub country: String,
}

impl Place {
    pub fn unknown() -> Self {
        Self {
            city: "Unknown".to_string(),
            region: "Unknown".to_string(),
            country: "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Idle,
    ModeSelected,
    Discovering,
    AwaitingGuess,
    Reviewing,
    SessionComplete,
}

/// Difficulty mode. Normal shows the hostname hint, Hard hides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Normal,
    Hard,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Hard => "hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "normal" => Some(Mode::Normal),
            "hard" => Some(Mode::Hard),
            _ => None,
        }
    }
}

/// One completed round, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResult {
    pub ip: String,
    pub distance_km: f64,
    pub score: u32,
    pub guessed_coordinate: Coordinate,
    pub actual_coordinate: Coordinate,
    pub guessed_place: Place,
    pub actual_place: Place,
    pub organization: Option<String>,
}

/// The one session the process plays at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub id: SessionId,
    pub mode: Mode,
    pub phase: GamePhase,
    /// Number of completed rounds; equals `history.len()` at all times
    pub round_index: u32,
    pub total_score: u32,
    pub history: Vec<RoundResult>,
    /// The record the operator is currently guessing against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<GeoRecord>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// Frozen when the session completes, otherwise derived from `started_at`
    pub elapsed_ms: Option<u64>,
}

/// Aggregate view over a finished session, derived from `history`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub total_score: u32,
    pub average_distance_km: f64,
    /// Rounds scoring the top tier
    pub perfect_guesses: u32,
    pub elapsed_ms: u64,
    pub best: Option<RoundResult>,
    pub rounds: Vec<RoundResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_wire_format() {
        assert_eq!(
            serde_json::to_value(GamePhase::AwaitingGuess).unwrap(),
            "AWAITING_GUESS"
        );
        assert_eq!(
            serde_json::to_value(GamePhase::SessionComplete).unwrap(),
            "SESSION_COMPLETE"
        );
    }

    #[test]
    fn test_mode_wire_format() {
        assert_eq!(serde_json::to_string(&Mode::Hard).unwrap(), "\"hard\"");
        let parsed: Mode = serde_json::from_str("\"normal\"").unwrap();
        assert_eq!(parsed, Mode::Normal);
    }

    #[test]
    fn test_coordinate_roundtrip() {
        let json = serde_json::json!({ "lat": 52.52, "lon": 13.405 });
        let coord: Coordinate = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(coord, Coordinate::new(52.52, 13.405));
        assert_eq!(serde_json::to_value(coord).unwrap(), json);
    }

    #[test]
    fn test_asn_extraction() {
        let record = GeoRecord {
            ip: "8.8.8.8".to_string(),
            coordinate: Coordinate::new(37.386, -122.0838),
            organization: "AS15169 Google LLC".to_string(),
            hostname: None,
            city: None,
            region: None,
            country: None,
        };
        assert_eq!(record.asn(), "AS15169");
    }
}
