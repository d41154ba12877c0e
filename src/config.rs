use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::topics::model::{DEFAULT_EXTENDED_TOP_TERMS, DEFAULT_TOP_TERMS};
use crate::validation::MeasureId;

/// Default number of decimal places for displayed scores.
pub const DEFAULT_PRECISION: u32 = 3;
/// Most decimal places an f64 score can meaningfully carry.
pub const MAX_PRECISION: u32 = 15;
/// Default number of neighbors returned by embedding queries.
pub const DEFAULT_NUM_NEIGHBORS: usize = 10;
/// Default metadata sidecar extension.
pub const DEFAULT_META_EXTENSION: &str = ".meta";

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// setting has a default, so an empty environment is a valid configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned (recursively) for embedding and topic model sidecars
    pub core_dir: PathBuf,
    /// Descriptor length used for validation
    pub top_terms: usize,
    /// Descriptor length for the extended listing
    pub extended_top_terms: usize,
    /// Decimal places for displayed scores
    pub precision: u32,
    /// Neighbors returned by `neighbors` queries
    pub num_neighbors: usize,
    /// Sidecar file extension, including the dot
    pub meta_extension: String,
    /// Measure shown when none is requested
    pub default_measure: MeasureId,
    /// Load every embedding when the registry opens
    pub preload_embeddings: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core_dir: default_core_dir(),
            top_terms: DEFAULT_TOP_TERMS,
            extended_top_terms: DEFAULT_EXTENDED_TOP_TERMS,
            precision: DEFAULT_PRECISION,
            num_neighbors: DEFAULT_NUM_NEIGHBORS,
            meta_extension: DEFAULT_META_EXTENSION.to_string(),
            default_measure: MeasureId::Coherence,
            preload_embeddings: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let default_measure = match env::var("TOPICSCAN_DEFAULT_MEASURE") {
            Ok(id) => id
                .parse::<MeasureId>()
                .context("TOPICSCAN_DEFAULT_MEASURE is not a known measure")?,
            Err(_) => defaults.default_measure,
        };

        let config = Self {
            core_dir: env::var("TOPICSCAN_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.core_dir),
            top_terms: parse_var("TOPICSCAN_TOP_TERMS", defaults.top_terms)?,
            extended_top_terms: parse_var(
                "TOPICSCAN_EXTENDED_TOP_TERMS",
                defaults.extended_top_terms,
            )?,
            precision: parse_var("TOPICSCAN_PRECISION", defaults.precision)?,
            num_neighbors: parse_var("TOPICSCAN_NUM_NEIGHBORS", defaults.num_neighbors)?,
            meta_extension: env::var("TOPICSCAN_META_EXTENSION")
                .unwrap_or(defaults.meta_extension),
            default_measure,
            preload_embeddings: parse_var("TOPICSCAN_PRELOAD", defaults.preload_embeddings)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the settings that would make validation meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.top_terms == 0 {
            anyhow::bail!("TOPICSCAN_TOP_TERMS must be at least 1");
        }
        if self.extended_top_terms < self.top_terms {
            anyhow::bail!(
                "TOPICSCAN_EXTENDED_TOP_TERMS ({}) must not be smaller than TOPICSCAN_TOP_TERMS ({})",
                self.extended_top_terms,
                self.top_terms
            );
        }
        if self.precision > MAX_PRECISION {
            anyhow::bail!(
                "TOPICSCAN_PRECISION ({}) must not exceed {}",
                self.precision,
                MAX_PRECISION
            );
        }
        if self.meta_extension.is_empty() {
            anyhow::bail!("TOPICSCAN_META_EXTENSION must not be empty");
        }
        Ok(())
    }
}

/// Returns the default core directory.
/// Uses the platform data directory: ~/.local/share/topicscan/ on Linux.
pub fn default_core_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("topicscan")
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{name} has an invalid value: {value}")),
        Err(_) => Ok(default),
    }
}
