#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` maps the command line's verbosity controls onto `tracing`
//! filters. Each instrumented subsystem (digest table generation, index
//! construction, stream scanning and the command-line driver) has a
//! [`DebugFlag`] with its own level, so `-vv` can be combined with
//! `--debug scan3` to look closely at one part without drowning in the rest.
//!
//! # Design
//!
//! [`VerbosityConfig`] holds one level per flag. It is built from the number
//! of `-v` flags with [`VerbosityConfig::from_verbose_level`] and refined
//! with flag tokens such as `scan2`. With the `tracing` feature enabled,
//! `init_tracing` turns the configuration into an `EnvFilter` and installs a
//! fmt subscriber writing to standard error. Library crates only emit events;
//! installing a subscriber is left to binaries.
//!
//! # Examples
//!
//! ```
//! use logging::{DebugFlag, VerbosityConfig};
//!
//! let mut config = VerbosityConfig::from_verbose_level(1);
//! config.apply_debug_flag("scan2").unwrap();
//!
//! assert_eq!(config.debug.get(DebugFlag::Scan), 2);
//! assert_eq!(
//!     config.filter_directives(),
//!     "warn,signature=info,matching::engine=debug,cli=info"
//! );
//! ```

mod config;
mod levels;
#[cfg(feature = "tracing")]
mod tracing_bridge;

pub use config::VerbosityConfig;
pub use levels::{DebugFlag, DebugLevels, level_name};
#[cfg(feature = "tracing")]
pub use tracing_bridge::{env_filter, filter_for, init_tracing};
