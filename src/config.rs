//! Environment-backed configuration.
//!
//! All settings come from environment variables (a `.env` file is loaded
//! by the binary via `dotenvy` before this runs). `DATABASE_URL` is the
//! only mandatory variable; everything else has a default.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::chunk::{DEFAULT_MAX_CHUNK_SIZE, DEFAULT_MIN_CHUNK_SIZE};
use crate::provider::ProviderKind;

/// Default timeout applied to every provider round-trip.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the SQLite database file holding the vector store.
    pub database_path: PathBuf,
    /// Which LLM provider serves both embedding and generation.
    pub provider: ProviderKind,
    pub google_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
    /// Per-request timeout for provider HTTP calls, in seconds.
    pub timeout_secs: u64,
}

impl Config {
    /// Build a configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails when `DATABASE_URL` is absent, when `LLM_PROVIDER` names an
    /// unknown provider, or when the chunk-size bounds are inconsistent.
    pub fn from_env() -> Result<Self> {
        let database_path = std::env::var("DATABASE_URL")
            .map(PathBuf::from)
            .context("DATABASE_URL must be set (path of the SQLite database file)")?;

        let provider = match std::env::var("LLM_PROVIDER") {
            Ok(raw) => raw
                .parse::<ProviderKind>()
                .with_context(|| format!("invalid LLM_PROVIDER '{}'", raw))?,
            Err(_) => ProviderKind::Gemini,
        };

        let config = Self {
            database_path,
            provider,
            google_api_key: std::env::var("GOOGLE_API_KEY").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            min_chunk_size: parse_env("MIN_CHUNK_SIZE", DEFAULT_MIN_CHUNK_SIZE)?,
            max_chunk_size: parse_env("MAX_CHUNK_SIZE", DEFAULT_MAX_CHUNK_SIZE)?,
            timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            bail!("MAX_CHUNK_SIZE must be > 0");
        }
        if self.min_chunk_size > self.max_chunk_size {
            bail!(
                "MIN_CHUNK_SIZE ({}) must not exceed MAX_CHUNK_SIZE ({})",
                self.min_chunk_size,
                self.max_chunk_size
            );
        }
        if self.timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be > 0");
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("invalid {} '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}
