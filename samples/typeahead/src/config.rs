//! Typeahead configuration loaded from the environment.
//!
//! # Environment Variables
//!
//! - `TYPEAHEAD_DEBOUNCE_MS`: quiet period before a search runs (default: 300)
//! - `TYPEAHEAD_THROTTLE_MS`: minimum spacing between draft saves (default: 1000)
//! - `TYPEAHEAD_THROTTLE_EDGE`: `leading` or `trailing` (default: trailing)
//!
//! # Example
//!
//! ```rust,ignore
//! use typeahead::config::AppConfig;
//!
//! let config = AppConfig::from_env()?;
//! println!("search after {:?}", config.search.delay());
//! ```

use std::env;
use std::num::ParseIntError;

use fnadapt::rate::{Edge, RateLimit};

/// Configuration error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The name of the environment variable.
        key: String,
        /// Description of why the value is invalid.
        message: String,
    },
}

/// Rate limits used by the typeahead session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Debounce window for running searches.
    pub search: RateLimit,
    /// Throttle window and edge for saving drafts.
    pub autosave: RateLimit,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search: RateLimit {
                delay_ms: 300,
                edge: Edge::Trailing,
            },
            autosave: RateLimit {
                delay_ms: 1_000,
                edge: Edge::Trailing,
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment variables, after reading a
    /// `.env` file if one is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a value is present but invalid.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let search_ms = parse_millis(&lookup, "TYPEAHEAD_DEBOUNCE_MS", defaults.search.delay_ms)?;
        let autosave_ms =
            parse_millis(&lookup, "TYPEAHEAD_THROTTLE_MS", defaults.autosave.delay_ms)?;
        let edge = parse_edge(&lookup, "TYPEAHEAD_THROTTLE_EDGE", defaults.autosave.edge)?;

        Ok(Self {
            search: RateLimit {
                delay_ms: search_ms,
                edge: Edge::Trailing,
            },
            autosave: RateLimit {
                delay_ms: autosave_ms,
                edge,
            },
        })
    }
}

fn parse_millis<L>(lookup: &L, key: &str, default: u64) -> Result<u64, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    lookup(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|error: ParseIntError| ConfigError::InvalidValue {
                key: key.to_string(),
                message: error.to_string(),
            })
    })
}

fn parse_edge<L>(lookup: &L, key: &str, default: Edge) -> Result<Edge, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::trim) {
        None => Ok(default),
        Some(value) if value.eq_ignore_ascii_case("leading") => Ok(Edge::Leading),
        Some(value) if value.eq_ignore_ascii_case("trailing") => Ok(Edge::Trailing),
        Some(value) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected `leading` or `trailing`, found `{value}`"),
        }),
    }
}
