//! `reencrypt` — batch job entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`](config::Config) from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Build the [`FieldCodec`] from `ENCRYPTION_KEY`; a bad key stops here.
//! 4. Load the table dump, re-encrypt every non-current column, write it back.
//!    Nothing is written if any column fails to open under the key.

mod config;
mod store;
mod telemetry;

use anyhow::{Context, Result};
use field_crypt::{migrate, FieldCodec};
use tracing::{info, warn};

use store::JsonDumpStore;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: reencrypt configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        dump = %cfg.dump_path.display(),
        force = cfg.force_reencrypt,
        dry_run = cfg.dry_run,
        "reencrypt starting"
    );

    // -----------------------------------------------------------------------
    // 3. Key
    // -----------------------------------------------------------------------
    let codec = FieldCodec::from_env().context("encryption key unavailable")?;

    // -----------------------------------------------------------------------
    // 4. Migration
    // -----------------------------------------------------------------------
    let mut store = JsonDumpStore::load(&cfg.dump_path).await?;
    let opts = migrate::MigrateOptions {
        force: cfg.force_reencrypt,
        dry_run: cfg.dry_run,
    };
    let (store, report) = tokio::task::spawn_blocking(move || {
        let report = migrate::run(&codec, &mut store, opts);
        (store, report)
    })
    .await
    .context("re-encryption task panicked")?;
    let report = report?;

    if report.fields_undecryptable > 0 {
        // Usually a mistyped or foreign ENCRYPTION_KEY. Writing now would seal
        // the plaintext rows under that key as well.
        warn!(
            undecryptable = report.fields_undecryptable,
            "encrypted columns did not open under the configured key; dump left untouched"
        );
        anyhow::bail!(
            "{} columns could not be decrypted; check ENCRYPTION_KEY",
            report.fields_undecryptable
        );
    }

    if cfg.dry_run {
        info!(would_update = report.rows_updated, "dry run; dump left untouched");
    } else if report.rows_updated > 0 || cfg.output_path.is_some() {
        store.save(cfg.output_path()).await?;
    }

    if report.rows_failed > 0 {
        warn!(failed = report.rows_failed, "some rows could not be rewritten");
        anyhow::bail!("{} rows failed to re-encrypt", report.rows_failed);
    }
    Ok(())
}
