//! crates/cli/src/error.rs
//!
//! Failures surfaced by the command-line driver.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use matching::MatchError;
use signature::{LayoutError, SignatureError};

/// Exit status for malformed invocations.
pub(crate) const EXIT_USAGE: i32 = 1;
/// Exit status for failures while reconstructing.
pub(crate) const EXIT_FAILURE: i32 = 2;

/// Errors raised while running a reconstruction.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input file could not be opened or inspected.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        /// File that could not be opened.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// Reading blocks back from the target failed.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The output file could not be created or sized.
    #[error("failed to create output {}: {source}", path.display())]
    CreateOutput {
        /// Requested output path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The digest table of the target could not be generated.
    #[error("failed to build block digests for {}: {source}", path.display())]
    Signature {
        /// Target path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: SignatureError,
    },
    /// No layout fits the target.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// The matcher failed.
    #[error(transparent)]
    Match(#[from] MatchError),
}

impl CliError {
    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }
}
