//! Diagnostic logging.
//!
//! Logs go to stderr so stdout stays free for the build summary. The filter
//! comes from `SIMPLE_SITE_LOG`, then `RUST_LOG`, then defaults to `info`:
//!
//! ```text
//! SIMPLE_SITE_LOG=debug simple-site ./my-site        # every unit of work
//! SIMPLE_SITE_LOG=simple_site::pages=debug ...       # one module
//! ```

use std::env;
use std::io;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "SIMPLE_SITE_LOG";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid logging filter: {0}")]
    Filter(#[from] ParseError),
    #[error("failed to install logging subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging() -> Result<(), LoggingError> {
    let filter = build_filter(env::var(LOG_ENV).ok().as_deref())?;
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()?;
    Ok(())
}

/// Resolve the filter from an explicit directive string, `RUST_LOG`, or the default.
fn build_filter(spec: Option<&str>) -> Result<EnvFilter, ParseError> {
    if let Some(spec) = spec.filter(|s| !s.trim().is_empty()) {
        return EnvFilter::try_new(spec);
    }
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new("info"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_spec_wins() {
        let filter = build_filter(Some("simple_site=debug")).unwrap();
        assert_eq!(filter.to_string(), "simple_site=debug");
    }

    #[test]
    fn blank_spec_falls_back() {
        assert!(build_filter(Some("   ")).is_ok());
        assert!(build_filter(None).is_ok());
    }

    #[test]
    fn malformed_spec_is_error() {
        assert!(build_filter(Some("simple_site=notalevel")).is_err());
    }
}
