//! crates/match/src/error.rs
//!
//! Errors surfaced by the matcher.

use std::collections::TryReserveError;
use std::io;

use checksums::RollingError;
use signature::BlockId;
use thiserror::Error;

use crate::config::ConfigError;

/// Failure to grow index, window or range storage.
///
/// The operation that hit it fails; the matcher keeps its previous state.
pub type AllocationError = TryReserveError;

/// Errors returned by [`MatchEngine`](crate::MatchEngine) operations.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The layout cannot drive a matcher.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Storage for the index, window or covered ranges could not be allocated.
    #[error("failed to allocate matcher storage: {0}")]
    Allocation(#[from] AllocationError),
    /// The output sink rejected an accepted block.
    #[error("failed to write block {block} to the output: {source}")]
    Sink {
        /// Block being written.
        block: BlockId,
        /// Error reported by the sink.
        #[source]
        source: io::Error,
    },
    /// Reading source data failed.
    #[error("failed to read source data: {0}")]
    Io(#[source] io::Error),
    /// Submitted block data does not match the block's strong checksum.
    #[error("data submitted for block {block} does not match its checksum")]
    BlockMismatch {
        /// First block that failed verification.
        block: BlockId,
    },
    /// Submitted block data is shorter than the block it claims to be.
    #[error("data submitted for block {block} has {len} byte(s), expected {expected}")]
    ShortBlock {
        /// Block with too little data.
        block: BlockId,
        /// Bytes supplied.
        len: usize,
        /// Bytes the block holds in the target.
        expected: usize,
    },
    /// A block range reaches past the end of the target.
    #[error("{count} block(s) starting at {first} exceed the target's {blocks} block(s)")]
    BlockOutOfRange {
        /// First block of the range.
        first: BlockId,
        /// Number of blocks in the range.
        count: usize,
        /// Blocks in the target.
        blocks: BlockId,
    },
    /// The rolling checksum window could not slide.
    #[error(transparent)]
    Rolling(#[from] RollingError),
}
