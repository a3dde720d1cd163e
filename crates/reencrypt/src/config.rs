//! Configuration loading and validation for the re-encryption job.
//!
//! The key itself (`ENCRYPTION_KEY`) is read by the codec, not here.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated job configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// JSON dump to migrate. **Required.**
    pub dump_path: PathBuf,

    /// Where to write the migrated dump. Defaults to rewriting `dump_path`.
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// Re-encrypt values that are already in the current format.
    #[serde(default)]
    pub force_reencrypt: bool,

    /// Report what would change without writing anything.
    #[serde(default)]
    pub dry_run: bool,

    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build reencrypt configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise reencrypt configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The file the migrated dump is written to.
    pub fn output_path(&self) -> &Path {
        self.output_path.as_deref().unwrap_or(&self.dump_path)
    }

    fn validate(&self) -> Result<()> {
        if self.dump_path.as_os_str().is_empty() {
            anyhow::bail!("DUMP_PATH is required and must not be empty");
        }
        if matches!(&self.output_path, Some(p) if p.as_os_str().is_empty()) {
            anyhow::bail!("OUTPUT_PATH must not be empty when set");
        }
        Ok(())
    }
}
