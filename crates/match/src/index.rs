//! crates/match/src/index.rs
//!
//! Weak-checksum hash table over the target's blocks.
//!
//! Buckets hold the head of an intrusive, doubly linked chain threaded
//! through one entry per block, so removing an accepted block is O(1)
//! and the table never allocates after construction. A bit filter with
//! several bits per bucket rejects most non-matching windows before any chain
//! is touched.

use std::collections::TryReserveError;

use signature::{BlockDigestTable, BlockId};

use crate::config::EngineConfig;

#[derive(Clone, Copy, Debug)]
struct HashEntry {
    key: u32,
    bucket: u32,
    next: Option<BlockId>,
    prev: Option<BlockId>,
    linked: bool,
}

/// Hash table from weak checksum to the blocks that carry it.
///
/// Chains list blocks in reverse insertion order, so for equal weak
/// checksums the highest block id is offered first. Blocks leave the index
/// once they are covered and never return.
#[derive(Clone, Debug)]
pub struct RollingChecksumIndex {
    entries: Vec<HashEntry>,
    buckets: Vec<Option<BlockId>>,
    filter: Vec<u8>,
    hashmask: u64,
    bithashmask: u64,
    live: usize,
}

impl RollingChecksumIndex {
    /// Indexes every block of `table` using the parameters in `config`.
    pub fn build(table: &BlockDigestTable, config: &EngineConfig) -> Result<Self, TryReserveError> {
        let hashmask = config.hashmask();
        let bithashmask = config.bithashmask();
        // Both masks were checked to be addressable when the config was built.
        let bucket_count = (hashmask + 1) as usize;
        let filter_len = ((bithashmask + 1) >> 3).max(1) as usize;

        let mut buckets = Vec::new();
        buckets.try_reserve_exact(bucket_count)?;
        buckets.resize(bucket_count, None);

        let mut filter = Vec::new();
        filter.try_reserve_exact(filter_len)?;
        filter.resize(filter_len, 0u8);

        let mut entries: Vec<HashEntry> = Vec::new();
        entries.try_reserve_exact(table.len())?;

        for (id, block) in table.iter() {
            let key = config.weak_key(block.rolling());
            let hash = config.rhash(key);
            let bucket = (hash & hashmask) as usize;

            let head = buckets[bucket];
            if let Some(head) = head {
                entries[head as usize].prev = Some(id);
            }
            entries.push(HashEntry {
                key,
                bucket: bucket as u32,
                next: head,
                prev: None,
                linked: true,
            });
            buckets[bucket] = Some(id);

            let bit = hash & bithashmask;
            filter[(bit >> 3) as usize] |= 1 << (bit & 7);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            blocks = entries.len(),
            buckets = bucket_count,
            filter_bytes = filter_len,
            "built rolling checksum index"
        );

        Ok(Self {
            live: entries.len(),
            entries,
            buckets,
            filter,
            hashmask,
            bithashmask,
        })
    }

    /// Checks the bit filter for `hash`.
    ///
    /// A clear bit proves no indexed block has this hash; a set bit only
    /// means one might.
    #[inline]
    #[must_use]
    pub fn might_contain(&self, hash: u64) -> bool {
        let bit = hash & self.bithashmask;
        self.filter[(bit >> 3) as usize] & (1 << (bit & 7)) != 0
    }

    /// Returns the blocks whose weak key equals `key`, or `None` when the
    /// filter or an empty bucket rules them out.
    #[inline]
    #[must_use]
    pub fn lookup(&self, hash: u64, key: u32) -> Option<Candidates<'_>> {
        if !self.might_contain(hash) {
            return None;
        }
        let head = self.buckets[(hash & self.hashmask) as usize]?;
        Some(Candidates {
            entries: &self.entries,
            cursor: Some(head),
            key,
        })
    }

    /// Unlinks `block` from its chain. Returns `false` if it was not indexed.
    pub fn remove(&mut self, block: BlockId) -> bool {
        let Some(entry) = self.entries.get(block as usize).copied() else {
            return false;
        };
        if !entry.linked {
            return false;
        }

        match entry.prev {
            Some(prev) => self.entries[prev as usize].next = entry.next,
            None => self.buckets[entry.bucket as usize] = entry.next,
        }
        if let Some(next) = entry.next {
            self.entries[next as usize].prev = entry.prev;
        }

        let slot = &mut self.entries[block as usize];
        slot.next = None;
        slot.prev = None;
        slot.linked = false;
        self.live -= 1;
        true
    }

    /// Weak key of `block` while it is still indexed.
    #[inline]
    #[must_use]
    pub fn key_of(&self, block: BlockId) -> Option<u32> {
        self.entries
            .get(block as usize)
            .filter(|entry| entry.linked)
            .map(|entry| entry.key)
    }

    /// Reports whether `block` is still indexed.
    #[inline]
    #[must_use]
    pub fn contains(&self, block: BlockId) -> bool {
        self.key_of(block).is_some()
    }

    /// Number of blocks still indexed.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Reports whether every block has been removed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of hash buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of filter bits.
    #[must_use]
    pub fn filter_bits(&self) -> usize {
        self.filter.len() * 8
    }
}

/// Iterator over the indexed blocks sharing one weak key.
#[derive(Clone, Debug)]
pub struct Candidates<'a> {
    entries: &'a [HashEntry],
    cursor: Option<BlockId>,
    key: u32,
}

impl Iterator for Candidates<'_> {
    type Item = BlockId;

    fn next(&mut self) -> Option<BlockId> {
        while let Some(id) = self.cursor {
            let entry = &self.entries[id as usize];
            self.cursor = entry.next;
            if entry.key == self.key {
                return Some(id);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use checksums::RollingDigest;
    use signature::DigestLayout;

    use super::*;
    use crate::config::EngineOptions;

    fn build(digests: &[RollingDigest]) -> (RollingChecksumIndex, EngineConfig) {
        let layout = DigestLayout::new(4, digests.len() as u64 * 4, 32, 4);
        let mut table = BlockDigestTable::new(layout);
        for digest in digests {
            table.push(*digest, &[0; 4]).expect("push");
        }
        let config =
            EngineConfig::new(layout, table.len(), EngineOptions::default()).expect("config");
        let index = RollingChecksumIndex::build(&table, &config).expect("index");
        (index, config)
    }

    fn candidates_of(
        index: &RollingChecksumIndex,
        config: &EngineConfig,
        digest: RollingDigest,
    ) -> Vec<BlockId> {
        let key = config.weak_key(digest);
        index
            .lookup(config.rhash(key), key)
            .map(Iterator::collect)
            .unwrap_or_default()
    }

    #[test]
    fn lookup_returns_equal_keys_newest_first() {
        let shared = RollingDigest::new(10, 20, 4);
        let other = RollingDigest::new(11, 20, 4);
        let (index, config) = build(&[shared, other, shared]);
        assert_eq!(candidates_of(&index, &config, shared), vec![2, 0]);
        assert_eq!(candidates_of(&index, &config, other), vec![1]);
        assert!(candidates_of(&index, &config, RollingDigest::new(99, 99, 4)).is_empty());
    }

    #[test]
    fn every_indexed_block_passes_the_filter() {
        let digests: Vec<RollingDigest> = (0..500u16)
            .map(|i| RollingDigest::new(i.wrapping_mul(7919), i.wrapping_mul(39_208), 4))
            .collect();
        let (index, config) = build(&digests);
        for digest in &digests {
            assert!(index.might_contain(config.rhash(config.weak_key(*digest))));
        }
        assert_eq!(index.bucket_count(), 512);
        assert_eq!(index.filter_bits(), 512 * 8);
    }

    #[test]
    fn remove_unlinks_from_any_chain_position() {
        let shared = RollingDigest::new(1, 2, 4);
        let (mut index, config) = build(&[shared, shared, shared]);

        assert!(index.remove(1));
        assert_eq!(candidates_of(&index, &config, shared), vec![2, 0]);
        assert!(index.remove(2));
        assert_eq!(candidates_of(&index, &config, shared), vec![0]);
        assert!(!index.remove(2));
        assert!(index.remove(0));
        assert!(candidates_of(&index, &config, shared).is_empty());
        assert!(index.is_empty());
        assert_eq!(index.key_of(0), None);
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let (mut index, _) = build(&[RollingDigest::new(1, 1, 4)]);
        assert!(!index.remove(7));
        assert_eq!(index.len(), 1);
        assert!(index.contains(0));
    }
}
