use std::path::PathBuf;

use crate::types::Coordinate;

/// One scoring tier: guesses closer than `max_km` earn `points`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreTier {
    pub max_km: f64,
    pub points: u32,
}

/// Tiered scoring table, ordered by ascending distance boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub tiers: Vec<ScoreTier>,
    /// Points for any distance past the last tier boundary
    pub fallback_points: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                ScoreTier { max_km: 100.0, points: 100 },
                ScoreTier { max_km: 500.0, points: 75 },
                ScoreTier { max_km: 1000.0, points: 50 },
                ScoreTier { max_km: 2000.0, points: 25 },
            ],
            fallback_points: 10,
        }
    }
}

impl ScoringConfig {
    /// The best score attainable, i.e. the first tier's points.
    pub fn top_points(&self) -> u32 {
        self.tiers
            .first()
            .map(|t| t.points)
            .unwrap_or(self.fallback_points)
    }
}

/// Initial map view handed to the (external) map UI.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MapDefaults {
    pub center: Coordinate,
    pub zoom: u8,
    pub max_zoom: u8,
}

/// Immutable per-session game configuration.
///
/// Loaded once at startup; nothing here is mutable mid-session.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Rounds per session
    pub rounds: u32,
    /// Concurrent validations per discovery batch (B)
    pub batch_size: usize,
    /// Sequential batches per discovery attempt (N)
    pub batch_count: usize,
    pub scoring: ScoringConfig,
    /// ASN prefixes ("AS<digits>") whose networks are never served
    pub excluded_asns: Vec<String>,
    pub map: MapDefaults,
    /// Geolocation lookup endpoint
    pub ipinfo_base_url: String,
    /// Reverse geocoding endpoint
    pub nominatim_base_url: String,
    /// Where the persisted mode preference lives
    pub prefs_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rounds: 5,
            batch_size: 5,
            batch_count: 3,
            scoring: ScoringConfig::default(),
            excluded_asns: vec!["AS5307".to_string(), "AS749".to_string()],
            map: MapDefaults {
                center: Coordinate::new(20.0, 0.0),
                zoom: 3,
                max_zoom: 18,
            },
            ipinfo_base_url: "https://ipinfo.io".to_string(),
            nominatim_base_url: "https://nominatim.openstreetmap.org".to_string(),
            prefs_path: PathBuf::from(".ipguessr_mode"),
        }
    }
}

impl GameConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let rounds = env_parse("IPGUESSR_ROUNDS").unwrap_or(defaults.rounds);
        let batch_size = env_parse("IPGUESSR_BATCH_SIZE").unwrap_or(defaults.batch_size);
        let batch_count = env_parse("IPGUESSR_BATCH_COUNT").unwrap_or(defaults.batch_count);

        let excluded_asns = std::env::var("IPGUESSR_EXCLUDED_ASNS")
            .ok()
            .map(|list| {
                list.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.excluded_asns);

        let ipinfo_base_url = env_nonempty("IPGUESSR_IPINFO_URL")
            .unwrap_or(defaults.ipinfo_base_url);
        let nominatim_base_url = env_nonempty("IPGUESSR_NOMINATIM_URL")
            .unwrap_or(defaults.nominatim_base_url);

        let prefs_path = env_nonempty("IPGUESSR_PREFS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.prefs_path);

        Self {
            rounds,
            batch_size,
            batch_count,
            scoring: defaults.scoring,
            excluded_asns,
            map: defaults.map,
            ipinfo_base_url,
            nominatim_base_url,
            prefs_path,
        }
    }

    /// Maximum lookups a single discovery attempt may issue (B×N).
    pub fn attempt_budget(&self) -> usize {
        self.batch_size * self.batch_count
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
