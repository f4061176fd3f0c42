//! crates/signature/src/table.rs
//!
//! Immutable per-target array of block digests.

use std::collections::TryReserveError;

use checksums::RollingDigest;
use thiserror::Error;

use crate::block::{BlockDigest, BlockId};
use crate::layout::DigestLayout;

/// Errors raised while populating a [`BlockDigestTable`].
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TableError {
    /// More blocks were pushed than the layout's target length allows.
    #[error("digest table already holds all {blocks} blocks of the target")]
    Full {
        /// Number of blocks the layout describes.
        blocks: u64,
    },
    /// A strong checksum carried fewer bytes than the layout declares.
    #[error("block {block} strong checksum has {len} byte(s), layout requires {required}")]
    StrongTooShort {
        /// Block whose checksum was rejected.
        block: BlockId,
        /// Bytes supplied.
        len: usize,
        /// Bytes required by the layout.
        required: usize,
    },
    /// Growing the block array failed.
    #[error("failed to grow digest table: {0}")]
    Allocation(#[from] TryReserveError),
}

/// Weak and strong checksums of every block of one target, indexed by
/// [`BlockId`].
///
/// Blocks are appended in id order. Once every block named by the layout has
/// been pushed the table is [complete](Self::is_complete) and can seed a
/// matcher.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlockDigestTable {
    layout: DigestLayout,
    blocks: Vec<BlockDigest>,
}

impl BlockDigestTable {
    /// Creates an empty table for `layout`.
    #[must_use]
    pub const fn new(layout: DigestLayout) -> Self {
        Self {
            layout,
            blocks: Vec::new(),
        }
    }

    /// Appends the digests of the next block and returns its id.
    ///
    /// `strong` must hold at least `checksum_bytes` bytes; anything past a
    /// full MD4 digest is ignored.
    pub fn push(&mut self, rolling: RollingDigest, strong: &[u8]) -> Result<BlockId, TableError> {
        let expected = self.layout.block_count();
        if self.blocks.len() as u64 >= expected {
            return Err(TableError::Full { blocks: expected });
        }

        let id = self.blocks.len() as BlockId;
        let required = usize::from(self.layout.checksum_bytes());
        if strong.len() < required {
            return Err(TableError::StrongTooShort {
                block: id,
                len: strong.len(),
                required,
            });
        }

        self.blocks.try_reserve(1)?;
        self.blocks.push(BlockDigest::new(rolling, strong));
        Ok(id)
    }

    /// Returns the layout the table was created with.
    #[inline]
    #[must_use]
    pub const fn layout(&self) -> DigestLayout {
        self.layout
    }

    /// Returns the digests of `block`, if present.
    #[inline]
    #[must_use]
    pub fn get(&self, block: BlockId) -> Option<&BlockDigest> {
        self.blocks.get(block as usize)
    }

    /// Returns all blocks in id order.
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &[BlockDigest] {
        &self.blocks
    }

    /// Iterates over `(id, digest)` pairs in id order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (BlockId, &BlockDigest)> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| (index as BlockId, block))
    }

    /// Number of blocks pushed so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Reports whether no block has been pushed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Reports whether every block the layout describes is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.blocks.len() as u64 == self.layout.block_count()
    }
}
