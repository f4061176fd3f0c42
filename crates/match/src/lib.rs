#![deny(unsafe_code)]

//! Block matching against a per-block digest table.
//!
//! Given the weak and strong checksums of every block of a target file, this
//! crate finds which parts of an arbitrary local byte stream are copies of
//! those blocks, writes them to an output sink at the right offsets, and
//! tracks which blocks are still missing:
//!
//! - [`MatchEngine`] slides a rolling checksum over submitted bytes, probes
//!   the index, verifies candidates with MD4 and records matches
//! - [`RollingChecksumIndex`] is the weak-checksum hash table with its bit
//!   filter for fast negative lookups
//! - [`CoverageTracker`] keeps the merged ranges of blocks already present
//! - [`BlockSink`] receives accepted block data
//!
//! # Design
//!
//! The engine is single-threaded and synchronous: every operation takes
//! `&mut self` and works on in-memory buffers. Fetching missing ranges and
//! driving the overall reconstruction belong to the caller, which consults
//! [`MatchEngine::missing_ranges`] to decide what to fetch and hands fetched
//! bytes back through [`MatchEngine::submit_blocks`].
//!
//! # Example
//!
//! ```
//! use matching::{MatchEngine, MemorySink};
//! use signature::{DigestLayout, generate_digest_table};
//!
//! let target: Vec<u8> = (0..4096u32).map(|i| (i * 7 % 251) as u8).collect();
//! let layout = DigestLayout::new(1024, target.len() as u64, 32, 16);
//! let table = generate_digest_table(target.as_slice(), layout).unwrap();
//!
//! let mut engine = MatchEngine::new(table).unwrap();
//! let mut sink = MemorySink::new(target.len());
//!
//! // Local data holding the second half of the target at an odd offset.
//! let mut local = vec![0xAA; 13];
//! local.extend_from_slice(&target[2048..]);
//! engine.submit(&local, &mut sink).unwrap();
//!
//! assert_eq!(engine.covered_ranges(), &[2..4]);
//! assert_eq!(engine.missing_ranges(0..4), vec![0..2]);
//! ```

mod config;
mod coverage;
mod engine;
mod error;
mod index;
mod sink;
mod stats;
mod window;

pub use config::{ConfigError, DEFAULT_FILTER_DENSITY_BITS, EngineConfig, EngineOptions};
pub use coverage::CoverageTracker;
pub use engine::{MatchEngine, MatchHint};
pub use error::{AllocationError, MatchError};
pub use index::{Candidates, RollingChecksumIndex};
pub use signature::BlockId;
pub use sink::{BlockSink, DiscardSink, MemorySink, SeekSink};
pub use stats::{MatchStats, SubmitOutcome};
