//! crates/logging/src/tracing_bridge.rs
//! Installs a `tracing` subscriber driven by [`VerbosityConfig`].
//!
//! Events are formatted by `tracing-subscriber`'s fmt layer and written to
//! standard error, so they never mix with a tool's regular output. Which
//! events pass is decided by an `EnvFilter` built from the verbosity flags;
//! a `RUST_LOG` value in the environment replaces those directives entirely.
//!
//! # Usage
//!
//! ```rust,ignore
//! use logging::{VerbosityConfig, init_tracing};
//!
//! init_tracing(VerbosityConfig::from_verbose_level(2))?;
//! tracing::debug!(target: "cli", "scanning seed");
//! ```

use std::error::Error;

use tracing_subscriber::EnvFilter;

use super::config::VerbosityConfig;

/// Builds the filter for `config`, ignoring the environment.
#[must_use]
pub fn filter_for(config: &VerbosityConfig) -> EnvFilter {
    EnvFilter::new(config.filter_directives())
}

/// Builds the filter from `RUST_LOG` when it is set and valid, otherwise
/// from `config`.
#[must_use]
pub fn env_filter(config: &VerbosityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for(config))
}

/// Installs the global subscriber.
///
/// Fails when a global subscriber has already been set.
pub fn init_tracing(config: VerbosityConfig) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config))
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time()
        .try_init()
}

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::*;

    #[test]
    fn quiet_config_only_passes_warnings() {
        let filter = filter_for(&VerbosityConfig::from_verbose_level(0));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn most_verbose_flag_sets_the_hint() {
        let filter = filter_for(&VerbosityConfig::from_verbose_level(3));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }
}
