//! Telemetry initialisation for the re-encryption job.
//!
//! Structured JSON logs on stderr, one flat object per event. The job opens no
//! spans, so span context is left out of the output. Events carry row ids,
//! formats and counters, never column values or key material.

use anyhow::{Context, Result};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Initialise the tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise `log_level` applies to
/// every target.
///
/// # Errors
///
/// Returns an error if `log_level` is not a level name or the subscriber has
/// already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref(), log_level)?;

    tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise reencrypt tracing subscriber: {e}"))
}

/// `EnvFilter` parses a bare word as a target name, so a typo such as
/// `LOG_LEVEL=verbose` would otherwise silence the job. Only level names are
/// accepted here.
fn build_filter(rust_log: Option<&str>, log_level: &str) -> Result<EnvFilter> {
    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
        return EnvFilter::try_new(directives).context("invalid RUST_LOG");
    }
    let level: LevelFilter = log_level
        .trim()
        .parse()
        .with_context(|| format!("LOG_LEVEL {log_level:?} is not a log level"))?;
    EnvFilter::try_new(level.to_string()).context("invalid LOG_LEVEL")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_sets_max_level() {
        let filter = build_filter(None, "debug").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        let filter = build_filter(None, "WARN").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn unknown_level_is_rejected() {
        assert!(build_filter(None, "verbose").is_err());
    }

    #[test]
    fn rust_log_wins() {
        let filter = build_filter(Some("trace"), "verbose").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn blank_rust_log_is_ignored() {
        let filter = build_filter(Some("  "), "error").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }
}
