use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::matching::score::{MatchWeights, DEFAULT_MIN_SCORE};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    /// Ranking threshold when a request gives none.
    pub min_match_score: u32,
    pub match_weights: MatchWeights,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = MatchWeights::default();
        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: optional_env("DB_MAX_CONNECTIONS", 10)?,
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            min_match_score: optional_env("MIN_MATCH_SCORE", DEFAULT_MIN_SCORE)?,
            match_weights: MatchWeights {
                exact_match: optional_env("MATCH_WEIGHT_EXACT", defaults.exact_match)?,
                proficiency: optional_env("MATCH_WEIGHT_PROFICIENCY", defaults.proficiency)?,
                experience: optional_env("MATCH_WEIGHT_EXPERIENCE", defaults.experience)?,
                primary_bonus: optional_env("MATCH_WEIGHT_PRIMARY", defaults.primary_bonus)?,
                ..defaults
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects thresholds and weightings the calculator cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.min_match_score > 100 {
            bail!(
                "MIN_MATCH_SCORE must be between 0 and 100, got {}",
                self.min_match_score
            );
        }
        let w = &self.match_weights;
        if [w.exact_match, w.proficiency, w.experience, w.primary_bonus]
            .iter()
            .any(|v| *v < 0.0)
        {
            bail!("Match weights must not be negative: {w:?}");
        }
        let total = w.total();
        if (total - 100.0).abs() > 1e-9 {
            bail!("Match weights must sum to 100, got {total}");
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(key, std::env::var(key).ok(), default)
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{v}'")),
        None => Ok(default),
    }
}
