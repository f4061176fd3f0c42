//! crates/match/src/coverage.rs
//!
//! Sorted, merged ranges of blocks already present in the output.

use std::collections::TryReserveError;
use std::ops::Range;

use signature::BlockId;

/// Set of covered blocks kept as sorted, disjoint, non-adjacent half-open
/// ranges.
///
/// Adjacent ranges are merged on insertion, so the representation of a given
/// set is unique and `gotblocks` always equals the summed range lengths.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CoverageTracker {
    ranges: Vec<Range<BlockId>>,
    gotblocks: BlockId,
    blocks: BlockId,
}

impl CoverageTracker {
    /// Creates an empty tracker for a target of `blocks` blocks.
    #[must_use]
    pub const fn new(blocks: BlockId) -> Self {
        Self {
            ranges: Vec::new(),
            gotblocks: 0,
            blocks,
        }
    }

    /// Records `block` as covered.
    ///
    /// Returns `Ok(true)` when the block was newly added and `Ok(false)` when
    /// it was already covered or lies outside the target. On allocation
    /// failure the tracker is unchanged.
    pub fn mark_covered(&mut self, block: BlockId) -> Result<bool, TryReserveError> {
        if block >= self.blocks {
            return Ok(false);
        }

        // First range that could contain `block` or end right before it.
        let idx = self.ranges.partition_point(|range| range.end < block);

        if let Some(range) = self.ranges.get(idx) {
            if range.contains(&block) {
                return Ok(false);
            }
        }

        let joins_left = self.ranges.get(idx).is_some_and(|range| range.end == block);
        if joins_left {
            self.ranges[idx].end += 1;
            let merges_next = self
                .ranges
                .get(idx + 1)
                .is_some_and(|next| next.start == block + 1);
            if merges_next {
                let next = self.ranges.remove(idx + 1);
                self.ranges[idx].end = next.end;
            }
        } else if let Some(range) = self
            .ranges
            .get_mut(idx)
            .filter(|range| range.start == block + 1)
        {
            range.start = block;
        } else {
            self.ranges.try_reserve(1)?;
            self.ranges.insert(idx, block..block + 1);
        }

        self.gotblocks += 1;
        Ok(true)
    }

    /// Reports whether `block` is covered.
    #[must_use]
    pub fn is_covered(&self, block: BlockId) -> bool {
        let idx = self.ranges.partition_point(|range| range.end <= block);
        self.ranges
            .get(idx)
            .is_some_and(|range| range.start <= block)
    }

    /// Returns the first covered block at or after `block`, or the block
    /// count when none is.
    #[must_use]
    pub fn next_covered_from(&self, block: BlockId) -> BlockId {
        if block >= self.blocks {
            return self.blocks;
        }
        let idx = self.ranges.partition_point(|range| range.end <= block);
        self.ranges
            .get(idx)
            .map_or(self.blocks, |range| range.start.max(block))
    }

    /// Returns the first uncovered block at or after `block`, if any.
    #[must_use]
    pub fn next_uncovered_from(&self, block: BlockId) -> Option<BlockId> {
        if block >= self.blocks {
            return None;
        }
        let idx = self.ranges.partition_point(|range| range.end <= block);
        let candidate = match self.ranges.get(idx) {
            Some(range) if range.start <= block => range.end,
            _ => block,
        };
        (candidate < self.blocks).then_some(candidate)
    }

    /// Returns the uncovered sub-ranges of `range`, clamped to the target.
    #[must_use]
    pub fn missing_ranges(&self, range: Range<BlockId>) -> Vec<Range<BlockId>> {
        let end = range.end.min(self.blocks);
        let mut cursor = range.start;
        let mut missing = Vec::new();
        if cursor >= end {
            return missing;
        }

        let first = self.ranges.partition_point(|covered| covered.end <= cursor);
        for covered in &self.ranges[first..] {
            if covered.start >= end {
                break;
            }
            if covered.start > cursor {
                missing.push(cursor..covered.start);
            }
            cursor = cursor.max(covered.end);
            if cursor >= end {
                return missing;
            }
        }
        missing.push(cursor..end);
        missing
    }

    /// Covered ranges in ascending order.
    #[inline]
    #[must_use]
    pub fn ranges(&self) -> &[Range<BlockId>] {
        &self.ranges
    }

    /// Number of covered blocks.
    #[inline]
    #[must_use]
    pub const fn gotblocks(&self) -> BlockId {
        self.gotblocks
    }

    /// Number of blocks in the target.
    #[inline]
    #[must_use]
    pub const fn blocks(&self) -> BlockId {
        self.blocks
    }

    /// Number of blocks still missing.
    #[inline]
    #[must_use]
    pub const fn blocks_todo(&self) -> BlockId {
        self.blocks - self.gotblocks
    }

    /// Reports whether every block is covered.
    #[inline]
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.gotblocks == self.blocks
    }
}
