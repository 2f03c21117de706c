use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use turnstile_credentials::{CLEANUP_INTERVAL, DEFAULT_CREDENTIAL_VALIDITY};
use turnstile_verification::{DEFAULT_EXTRACTION_TIMEOUT, DEFAULT_MATCH_TOLERANCE};

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Path to RocksDB database
    pub database_path: PathBuf,

    /// Lifetime of issued and rotated credentials
    pub credential_validity: Duration,

    /// Period of the expiry sweep and purge
    pub cleanup_interval: Duration,

    /// Upper bound on one feature extraction
    pub biometric_timeout: Duration,

    /// Euclidean distance at or under which faces match
    pub match_tolerance: f64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup("DATABASE_PATH")
            .unwrap_or_else(|| "./data/turnstile.db".to_string())
            .into();

        let credential_validity = Duration::from_secs(parse_or(
            &lookup,
            "CREDENTIAL_VALIDITY_SECONDS",
            DEFAULT_CREDENTIAL_VALIDITY.as_secs(),
        )?);

        let cleanup_interval = Duration::from_secs(parse_or(
            &lookup,
            "CLEANUP_INTERVAL_SECONDS",
            CLEANUP_INTERVAL.as_secs(),
        )?);
        if cleanup_interval.is_zero() {
            bail!("CLEANUP_INTERVAL_SECONDS must be greater than zero");
        }

        let biometric_timeout = Duration::from_millis(parse_or(
            &lookup,
            "BIOMETRIC_TIMEOUT_MS",
            DEFAULT_EXTRACTION_TIMEOUT.as_millis() as u64,
        )?);
        if biometric_timeout.is_zero() {
            bail!("BIOMETRIC_TIMEOUT_MS must be greater than zero");
        }

        let match_tolerance: f64 = parse_or(&lookup, "MATCH_TOLERANCE", DEFAULT_MATCH_TOLERANCE)?;
        if !match_tolerance.is_finite() || match_tolerance <= 0.0 {
            bail!("MATCH_TOLERANCE must be a positive number");
        }

        Ok(Config {
            database_path,
            credential_validity,
            cleanup_interval,
            biometric_timeout,
            match_tolerance,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {}: {:?}", name, raw)),
        None => Ok(default),
    }
}
