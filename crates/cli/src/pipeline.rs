//! crates/cli/src/pipeline.rs
//!
//! Reconstruction pipeline: digest the target, scan each seed, then
//! optionally fetch the remaining blocks straight from the target.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::num::NonZeroU32;
use std::ops::Range;
use std::path::{Path, PathBuf};

use matching::{BlockId, BlockSink, DiscardSink, MatchEngine, MatchStats, SeekSink};
use signature::{DigestLayout, calculate_layout, generate_digest_table};

use crate::error::CliError;

/// Inputs of one reconstruction.
#[derive(Clone, Debug)]
pub(crate) struct Request {
    pub(crate) target: PathBuf,
    pub(crate) seeds: Vec<PathBuf>,
    pub(crate) block_size: Option<NonZeroU32>,
    pub(crate) output: Option<PathBuf>,
    pub(crate) fetch: bool,
}

/// Blocks one seed contributed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct SeedOutcome {
    pub(crate) path: PathBuf,
    pub(crate) matched: usize,
}

/// Result of a completed run.
#[derive(Clone, Debug)]
pub(crate) struct Summary {
    pub(crate) layout: DigestLayout,
    pub(crate) seeds: Vec<SeedOutcome>,
    pub(crate) fetched: usize,
    pub(crate) covered: Vec<Range<BlockId>>,
    pub(crate) missing: Vec<Range<BlockId>>,
    pub(crate) stats: MatchStats,
    pub(crate) complete: bool,
}

/// Destination of accepted blocks.
enum OutputSink {
    File(SeekSink<File>),
    Discard(DiscardSink),
}

impl OutputSink {
    fn open(path: Option<&Path>, length: u64) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::Discard(DiscardSink));
        };
        let create_err = |source| CliError::CreateOutput {
            path: path.to_path_buf(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(path)
            .map_err(create_err)?;
        file.set_len(length).map_err(create_err)?;
        Ok(Self::File(SeekSink::new(file)))
    }
}

impl BlockSink for OutputSink {
    fn write_block(&mut self, block: BlockId, offset: u64, data: &[u8]) -> io::Result<()> {
        match self {
            Self::File(sink) => sink.write_block(block, offset, data),
            Self::Discard(sink) => sink.write_block(block, offset, data),
        }
    }
}

fn open(path: &Path) -> Result<File, CliError> {
    File::open(path).map_err(|source| CliError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs the whole reconstruction described by `request`.
pub(crate) fn reconstruct(request: &Request) -> Result<Summary, CliError> {
    let target = open(&request.target)?;
    let length = target
        .metadata()
        .map_err(|source| CliError::Open {
            path: request.target.clone(),
            source,
        })?
        .len();

    let layout = calculate_layout(length, request.block_size)?;
    let table = generate_digest_table(BufReader::new(target), layout).map_err(|source| {
        CliError::Signature {
            path: request.target.clone(),
            source,
        }
    })?;
    tracing::info!(
        target: "cli",
        blocks = layout.block_count(),
        block_size = layout.block_size(),
        rsum_bits = layout.rsum_bits(),
        checksum_bytes = layout.checksum_bytes(),
        "digested target"
    );

    let mut engine = MatchEngine::new(table)?;
    let mut sink = OutputSink::open(request.output.as_deref(), length)?;

    let mut seeds = Vec::with_capacity(request.seeds.len());
    for path in &request.seeds {
        let matched = if engine.is_complete() {
            0
        } else {
            let file = open(path)?;
            engine.submit_reader(file, &mut sink)?
        };
        tracing::info!(target: "cli", seed = %path.display(), matched, "scanned seed");
        seeds.push(SeedOutcome {
            path: path.clone(),
            matched,
        });
    }

    let fetched = if request.fetch {
        fetch_missing(&mut engine, &request.target, &mut sink)?
    } else {
        0
    };

    let blocks = BlockId::try_from(layout.block_count()).unwrap_or(BlockId::MAX);
    Ok(Summary {
        layout,
        seeds,
        fetched,
        covered: engine.covered_ranges().to_vec(),
        missing: engine.missing_ranges(0..blocks),
        stats: engine.stats(),
        complete: engine.is_complete(),
    })
}

/// Copies every uncovered range from the target itself, verifying each block
/// on the way in.
fn fetch_missing<S: BlockSink>(
    engine: &mut MatchEngine,
    target: &Path,
    sink: &mut S,
) -> Result<usize, CliError> {
    let layout = engine.table().layout();
    let blocks = BlockId::try_from(layout.block_count()).unwrap_or(BlockId::MAX);
    let missing = engine.missing_ranges(0..blocks);
    if missing.is_empty() {
        return Ok(0);
    }

    let read_err = |source| CliError::Read {
        path: target.to_path_buf(),
        source,
    };
    let mut file = open(target)?;
    let mut buffer = Vec::new();
    let mut fetched = 0;
    for range in missing {
        let start = layout.block_offset(range.start);
        let end = layout
            .block_offset(range.end)
            .min(layout.target_length());
        let len = usize::try_from(end - start)
            .map_err(|_| read_err(io::Error::from(io::ErrorKind::OutOfMemory)))?;

        buffer.clear();
        buffer.resize(len, 0);
        file.seek(SeekFrom::Start(start)).map_err(read_err)?;
        file.read_exact(&mut buffer).map_err(read_err)?;

        let added = engine.submit_blocks(range.start, &buffer, sink)?;
        tracing::debug!(
            target: "cli",
            first = range.start,
            end = range.end,
            added,
            "fetched range"
        );
        fetched += added;
    }
    tracing::info!(target: "cli", fetched, "fetched missing blocks");
    Ok(fetched)
}
