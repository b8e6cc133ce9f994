//! Structured logging setup.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job. Events never carry resolved filesystem paths.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";

/// Build the filter from `RUST_LOG`, falling back to `default`.
pub fn env_filter(default: &str) -> EnvFilter {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_or_default(from_env.as_deref(), default)
}

/// An unset or unparseable directive string yields `default`.
fn filter_or_default(directives: Option<&str>, default: &str) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

/// Install a stderr fmt subscriber. Returns `false` if one was already set.
pub fn init_subscriber(default: &str) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(default))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .is_ok()
}
