//! Node configuration: a TOML file layered with `AVAPROOF__` environment variables.

#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

use core::fmt;
use core::str::FromStr;
use std::path::Path;

use avaproof_core_types::{
    Amount, ProofParams, DEFAULT_MAX_DELEGATION_LEVELS, MAX_PROOF_STAKES, PROOF_DUST_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod utils;

/// Prefix of the environment variables overriding the configuration file.
pub const ENV_PREFIX: &str = "AVAPROOF";

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Node configuration options
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// A custom human-readable name for this node
    pub moniker: String,

    /// Log configuration options
    pub logging: LoggingConfig,

    /// Avalanche proof and admission options
    pub avalanche: AvalancheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            moniker: "avaproof-node".to_string(),
            logging: LoggingConfig::default(),
            avalanche: AvalancheConfig::default(),
        }
    }
}

/// Logging configuration options
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            e => Err(format!("Invalid log level: {e}")),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(LogFormat::Plain),
            "json" => Ok(LogFormat::Json),
            e => Err(format!("Invalid log format: {e}")),
        }
    }
}

/// Avalanche proof and admission options
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvalancheConfig {
    /// Hex-encoded proof this node stakes with
    #[serde(deserialize_with = "utils::non_empty_string")]
    pub proof: Option<String>,

    /// Private key of the proof master, as WIF or hex
    #[serde(deserialize_with = "utils::non_empty_string")]
    pub master_key: Option<String>,

    /// Private key used to sign avalanche messages, generated when absent
    #[serde(deserialize_with = "utils::non_empty_string")]
    pub session_key: Option<String>,

    /// Minimum stake amount, in units
    #[serde(deserialize_with = "utils::u64_from_anything")]
    pub dust_threshold: u64,

    /// Maximum number of stakes per proof
    #[serde(deserialize_with = "utils::usize_from_anything")]
    pub max_proof_stakes: usize,

    /// Maximum number of levels per delegation
    #[serde(deserialize_with = "utils::usize_from_anything")]
    pub max_delegation_levels: usize,
}

impl Default for AvalancheConfig {
    fn default() -> Self {
        Self {
            proof: None,
            master_key: None,
            session_key: None,
            dust_threshold: PROOF_DUST_THRESHOLD.units(),
            max_proof_stakes: MAX_PROOF_STAKES,
            max_delegation_levels: DEFAULT_MAX_DELEGATION_LEVELS,
        }
    }
}

impl AvalancheConfig {
    pub fn proof_params(&self) -> ProofParams {
        ProofParams {
            dust_threshold: Amount::from_units(self.dust_threshold),
            max_stakes: self.max_proof_stakes,
            max_delegation_levels: self.max_delegation_levels,
        }
    }
}

/// Load the configuration from an optional file, overridden by environment variables.
///
/// Variables are named after the option path, e.g. `AVAPROOF__AVALANCHE__PROOF`
/// for `avalanche.proof`. A missing file is an error when a path is given.
pub fn load_config(path: Option<&Path>, prefix: Option<&str>) -> Result<Config, ConfigError> {
    let environment =
        config::Environment::with_prefix(prefix.unwrap_or(ENV_PREFIX)).separator("__");

    build_config(path, environment)
}

fn build_config(
    path: Option<&Path>,
    environment: config::Environment,
) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let config: Config = builder
        .add_source(environment)
        .build()?
        .try_deserialize()?;

    tracing::debug!(
        moniker = %config.moniker,
        has_proof = config.avalanche.proof.is_some(),
        "Loaded configuration"
    );

    Ok(config)
}
