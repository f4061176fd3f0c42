//! crates/match/src/engine.rs
//!
//! Rolling-window scanner that finds target blocks inside local data.

use std::io::{ErrorKind, Read};
use std::ops::Range;

use checksums::RollingChecksum;
use checksums::strong::{Md4, truncated_eq};
use signature::{BlockDigestTable, BlockId};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::config::{EngineConfig, EngineOptions};
use crate::coverage::CoverageTracker;
use crate::error::MatchError;
use crate::index::RollingChecksumIndex;
use crate::sink::BlockSink;
use crate::stats::{MatchStats, SubmitOutcome};
use crate::window::MatchWindow;

/// Zero bytes fed after a stream ends and used to pad short fetched blocks.
const ZERO_CHUNK: [u8; 4096] = [0; 4096];

/// Number of blocks read per call by [`MatchEngine::submit_reader`].
const READ_BLOCKS: usize = 16;

/// Block expected to match the next window, kept after a sequential match.
///
/// `next_known` is the first covered block at or after `next_match` (or the
/// block count) at the time the hint was made; it lets a chain of sequential
/// matches skip the coverage search.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MatchHint {
    next_match: BlockId,
    next_known: BlockId,
}

impl MatchHint {
    /// Block tested first at the next window.
    #[inline]
    #[must_use]
    pub const fn next_match(&self) -> BlockId {
        self.next_match
    }

    /// First covered block at or after [`next_match`](Self::next_match).
    #[inline]
    #[must_use]
    pub const fn next_known(&self) -> BlockId {
        self.next_known
    }
}

/// Finds target blocks in local byte streams and records which are present.
///
/// Bytes are slid one at a time through a one-block window. Each window
/// position is tested against a pending [`MatchHint`] first, then against the
/// [`RollingChecksumIndex`]; weak matches are confirmed with MD4 before the
/// block is written to the sink and recorded as covered. After a match the
/// window restarts empty, so the next test happens one full block later.
///
/// Stream state (window, rolling checksum, hint) carries across
/// [`submit`](Self::submit) calls, so a stream may be split arbitrarily.
/// Call [`finish_stream`](Self::finish_stream) or
/// [`reset_stream`](Self::reset_stream) before submitting an unrelated stream.
#[derive(Debug)]
pub struct MatchEngine {
    table: BlockDigestTable,
    config: EngineConfig,
    index: RollingChecksumIndex,
    coverage: CoverageTracker,
    window: MatchWindow,
    rolling: RollingChecksum,
    hint: Option<MatchHint>,
    stats: MatchStats,
    verified: Vec<BlockId>,
}

impl MatchEngine {
    /// Creates a matcher for a complete digest table with default options.
    pub fn new(table: BlockDigestTable) -> Result<Self, MatchError> {
        Self::with_options(table, EngineOptions::default())
    }

    /// Creates a matcher for a complete digest table.
    ///
    /// Fails with [`MatchError::Config`] when the table's layout cannot be
    /// matched against and with [`MatchError::Allocation`] when the index
    /// does not fit in memory.
    #[cfg_attr(
        feature = "tracing",
        instrument(skip(table), fields(blocks = table.len()), name = "match_engine_new")
    )]
    pub fn with_options(
        table: BlockDigestTable,
        options: EngineOptions,
    ) -> Result<Self, MatchError> {
        let config = EngineConfig::new(table.layout(), table.len(), options)?;
        let index = RollingChecksumIndex::build(&table, &config)?;
        let window = MatchWindow::with_capacity(config.block_size())?;

        Ok(Self {
            coverage: CoverageTracker::new(config.blocks()),
            table,
            config,
            index,
            window,
            rolling: RollingChecksum::new(),
            hint: None,
            stats: MatchStats::default(),
            verified: Vec::new(),
        })
    }

    /// Scans `data` as the continuation of the current stream.
    ///
    /// Every byte is consumed. Accepted blocks are written to `sink` before
    /// they are recorded as covered; a sink failure aborts the call with the
    /// block left uncovered.
    ///
    /// On error the returned count is lost, but blocks accepted earlier in
    /// the same call stay written and covered. Consult
    /// [`covered_ranges`](Self::covered_ranges) or
    /// [`blocks_todo`](Self::blocks_todo) after an `Err` to see what was kept.
    pub fn submit<S: BlockSink + ?Sized>(
        &mut self,
        data: &[u8],
        sink: &mut S,
    ) -> Result<SubmitOutcome, MatchError> {
        let mut outcome = SubmitOutcome {
            consumed: data.len(),
            matched: 0,
        };

        let mut pos = 0;
        while pos < data.len() && !self.index.is_empty() {
            if self.window.is_full() {
                let incoming = data[pos];
                pos += 1;
                if let Some(outgoing) = self.window.push_back(incoming) {
                    match self.config.blockshift() {
                        Some(shift) => self.rolling.roll_pow2(outgoing, incoming, shift),
                        None => self.rolling.roll(outgoing, incoming)?,
                    }
                }
            } else {
                pos += self.window.fill_from(&data[pos..]);
                if !self.window.is_full() {
                    break;
                }
                let (head, tail) = self.window.as_slices();
                self.rolling.update_from_block(head);
                self.rolling.update(tail);
            }

            outcome.matched += self.check_window(sink)?;
        }

        Ok(outcome)
    }

    /// Feeds `block_size - 1` zero bytes, so a final target block that was
    /// zero-padded in the manifest can match the end of the stream, then
    /// resets the stream. Returns the number of blocks matched.
    pub fn finish_stream<S: BlockSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<usize, MatchError> {
        let mut remaining = self.config.block_size() - 1;
        let mut matched = 0;
        while remaining > 0 && !self.index.is_empty() {
            let step = remaining.min(ZERO_CHUNK.len());
            matched += self.submit(&ZERO_CHUNK[..step], sink)?.matched;
            remaining -= step;
        }
        self.reset_stream();
        Ok(matched)
    }

    /// Forgets the window, the skip state and the hint; the next byte starts
    /// a new stream.
    pub fn reset_stream(&mut self) {
        self.window.clear();
        self.rolling.reset();
        self.hint = None;
    }

    /// Scans everything `reader` yields as one stream and finishes it.
    ///
    /// Stops reading early once every block is covered. Returns the number of
    /// blocks matched.
    #[cfg_attr(
        feature = "tracing",
        instrument(skip(self, reader, sink), name = "submit_reader")
    )]
    pub fn submit_reader<R, S>(&mut self, mut reader: R, sink: &mut S) -> Result<usize, MatchError>
    where
        R: Read,
        S: BlockSink + ?Sized,
    {
        let chunk_len = self.config.block_size().saturating_mul(READ_BLOCKS);
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(chunk_len)?;
        buffer.resize(chunk_len, 0);

        let mut matched = 0;
        while !self.is_complete() {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(MatchError::Io(err)),
            };
            matched += self.submit(&buffer[..n], sink)?.matched;
        }
        matched += self.finish_stream(sink)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(matched, remaining = self.blocks_todo(), "finished source stream");

        Ok(matched)
    }

    /// Verifies and stores consecutive blocks obtained elsewhere.
    ///
    /// `data` holds the target bytes of blocks `first`, `first + 1`, ... in
    /// order; the final target block may be supplied without its padding.
    /// Blocks are checked one by one against their strong checksum. Each
    /// verified block is written and marked covered; the first mismatch stops
    /// the call with [`MatchError::BlockMismatch`], leaving earlier blocks
    /// in place. Returns the number of newly covered blocks.
    pub fn submit_blocks<S: BlockSink + ?Sized>(
        &mut self,
        first: BlockId,
        data: &[u8],
        sink: &mut S,
    ) -> Result<usize, MatchError> {
        let block_size = self.config.block_size();
        let blocks = self.config.blocks();
        let count = data.len().div_ceil(block_size);
        if u64::from(first) + count as u64 > u64::from(blocks) {
            return Err(MatchError::BlockOutOfRange {
                first,
                count,
                blocks,
            });
        }

        let layout = self.table.layout();
        let mut added = 0;
        for (block, chunk) in (first..).zip(data.chunks(block_size)) {
            let expected = layout.block_len(block);
            if chunk.len() < expected {
                return Err(MatchError::ShortBlock {
                    block,
                    len: chunk.len(),
                    expected,
                });
            }
            let content = &chunk[..expected];

            let mut hasher = Md4::new();
            hasher.update(content);
            let mut padding = block_size - expected;
            while padding > 0 {
                let step = padding.min(ZERO_CHUNK.len());
                hasher.update(&ZERO_CHUNK[..step]);
                padding -= step;
            }
            self.stats.checksummed += 1;
            if !self.strong_matches(block, &hasher.finalize()) {
                return Err(MatchError::BlockMismatch { block });
            }

            if self.coverage.is_covered(block) {
                continue;
            }
            sink.write_block(block, layout.block_offset(block), content)
                .map_err(|source| MatchError::Sink { block, source })?;
            self.coverage.mark_covered(block)?;
            self.index.remove(block);
            added += 1;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(first, count, added, "stored fetched blocks");

        Ok(added)
    }

    /// Tests the current full window and accepts every verified block.
    ///
    /// A pending hint is tested first. Whether or not it verifies, the
    /// general lookup still runs for the same window so blocks sharing its
    /// content are accepted too; the window digest is computed at most once.
    /// A hinted match keeps the hint it produced.
    fn check_window<S: BlockSink + ?Sized>(&mut self, sink: &mut S) -> Result<usize, MatchError> {
        let key = self.config.weak_key(self.rolling.digest());
        let mut strong = None;
        let mut tested = None;
        let mut hinted = None;

        if let Some(hint) = self.hint.take() {
            if self.index.key_of(hint.next_match) == Some(key) {
                self.stats.checksummed += 1;
                let computed = window_digest(&self.window);
                strong = Some(computed);
                tested = Some(hint.next_match);
                if self.strong_matches(hint.next_match, &computed) {
                    self.accept(hint.next_match, Some(hint.next_known), sink)?;
                    hinted = Some(self.hint);
                } else {
                    self.stats.weakhit += 1;
                }
            }
        }

        self.verified.clear();
        if let Some(candidates) = self.index.lookup(self.config.rhash(key), key) {
            if hinted.is_none() {
                self.stats.hashhit += 1;
            }
            for block in candidates {
                if tested == Some(block) {
                    continue;
                }
                let computed = match strong {
                    Some(digest) => digest,
                    None => {
                        self.stats.checksummed += 1;
                        let digest = window_digest(&self.window);
                        strong = Some(digest);
                        digest
                    }
                };
                if self.strong_matches(block, &computed) {
                    self.verified.try_reserve(1)?;
                    self.verified.push(block);
                } else {
                    self.stats.weakhit += 1;
                }
            }
        }

        let accepted = std::mem::take(&mut self.verified);
        for &block in &accepted {
            self.accept(block, None, sink)?;
        }
        let count = accepted.len() + usize::from(hinted.is_some());
        self.verified = accepted;

        if let Some(hint) = hinted {
            self.hint = hint;
        }
        if count > 0 {
            self.skip_window();
        }
        Ok(count)
    }

    fn strong_matches(&self, block: BlockId, computed: &[u8; Md4::LEN]) -> bool {
        self.table.get(block).is_some_and(|digest| {
            truncated_eq(digest.strong(), computed, self.config.checksum_bytes())
        })
    }

    /// Writes the window as `block`, records it and sets the next hint.
    fn accept<S: BlockSink + ?Sized>(
        &mut self,
        block: BlockId,
        next_known: Option<BlockId>,
        sink: &mut S,
    ) -> Result<(), MatchError> {
        let layout = self.table.layout();
        let offset = layout.block_offset(block);
        let len = layout.block_len(block);
        let data = self.window.as_slice();
        sink.write_block(block, offset, &data[..len])
            .map_err(|source| MatchError::Sink { block, source })?;

        self.coverage.mark_covered(block)?;
        self.index.remove(block);
        self.stats.stronghit += 1;

        let next = block + 1;
        let next_known = next_known.unwrap_or_else(|| self.coverage.next_covered_from(next));
        self.hint = (next < next_known).then_some(MatchHint {
            next_match: next,
            next_known,
        });

        #[cfg(feature = "tracing")]
        tracing::trace!(block, offset, len, hint = ?self.hint, "accepted block");

        Ok(())
    }

    /// Drops the matched window so the next test starts a block later.
    fn skip_window(&mut self) {
        self.window.clear();
        self.rolling.reset();
    }

    /// Covered block ranges in ascending order.
    #[inline]
    #[must_use]
    pub fn covered_ranges(&self) -> &[Range<BlockId>] {
        self.coverage.ranges()
    }

    /// Uncovered block ranges inside `range`, clamped to the target.
    #[must_use]
    pub fn missing_ranges(&self, range: Range<BlockId>) -> Vec<Range<BlockId>> {
        self.coverage.missing_ranges(range)
    }

    /// Number of blocks still missing.
    #[inline]
    #[must_use]
    pub const fn blocks_todo(&self) -> BlockId {
        self.coverage.blocks_todo()
    }

    /// Reports whether every block is covered.
    #[inline]
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.coverage.is_complete()
    }

    /// Activity counters.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> MatchStats {
        self.stats
    }

    /// Pending hint, if the last accepted block has an uncovered successor.
    #[inline]
    #[must_use]
    pub const fn hint(&self) -> Option<MatchHint> {
        self.hint
    }

    /// Covered-block bookkeeping.
    #[inline]
    #[must_use]
    pub const fn coverage(&self) -> &CoverageTracker {
        &self.coverage
    }

    /// Validated parameters.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Digest table the matcher was built from.
    #[inline]
    #[must_use]
    pub const fn table(&self) -> &BlockDigestTable {
        &self.table
    }

    /// Weak-checksum index of the blocks still missing.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> &RollingChecksumIndex {
        &self.index
    }

    /// Consumes the matcher and returns its digest table.
    #[must_use]
    pub fn into_table(self) -> BlockDigestTable {
        self.table
    }
}

fn window_digest(window: &MatchWindow) -> [u8; Md4::LEN] {
    let (head, tail) = window.as_slices();
    let mut hasher = Md4::new();
    hasher.update(head);
    hasher.update(tail);
    hasher.finalize()
}
