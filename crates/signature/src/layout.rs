//! crates/signature/src/layout.rs
//!
//! Manifest parameters and the heuristics that choose them for a target.

use core::num::NonZeroU32;

use thiserror::Error;

use crate::block::BlockId;

/// Block size used for targets smaller than [`LARGE_TARGET_THRESHOLD`].
const SMALL_BLOCK_SIZE: u32 = 2048;
/// Block size used for larger targets.
const LARGE_BLOCK_SIZE: u32 = 4096;
/// Target length at which the larger block size is preferred.
const LARGE_TARGET_THRESHOLD: u64 = 100_000_000;
/// Full width of the weak checksum, in bytes.
const MAX_RSUM_BYTES: f64 = 4.0;
/// Shortest weak checksum worth storing, in bytes.
const MIN_RSUM_BYTES: f64 = 2.0;
/// Full width of an MD4 digest, in bytes.
const MAX_CHECKSUM_BYTES: f64 = 16.0;

/// Parameters a manifest declares for its target file.
///
/// Values are stored as declared. [`calculate_layout`] only produces valid
/// combinations; layouts decoded from elsewhere are validated when a matcher
/// is constructed from them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DigestLayout {
    block_size: usize,
    target_length: u64,
    rsum_bits: u8,
    checksum_bytes: u8,
}

impl DigestLayout {
    /// Creates a layout from raw manifest values.
    #[must_use]
    pub const fn new(
        block_size: usize,
        target_length: u64,
        rsum_bits: u8,
        checksum_bytes: u8,
    ) -> Self {
        Self {
            block_size,
            target_length,
            rsum_bits,
            checksum_bytes,
        }
    }

    /// Bytes per block.
    #[inline]
    #[must_use]
    pub const fn block_size(self) -> usize {
        self.block_size
    }

    /// Length of the target file in bytes.
    #[inline]
    #[must_use]
    pub const fn target_length(self) -> u64 {
        self.target_length
    }

    /// Number of significant bits of each stored weak checksum.
    #[inline]
    #[must_use]
    pub const fn rsum_bits(self) -> u8 {
        self.rsum_bits
    }

    /// Number of significant bytes of each stored strong checksum.
    #[inline]
    #[must_use]
    pub const fn checksum_bytes(self) -> u8 {
        self.checksum_bytes
    }

    /// Number of blocks needed to cover the target, the last one possibly
    /// partial. Zero when the block size is zero.
    #[must_use]
    pub const fn block_count(self) -> u64 {
        if self.block_size == 0 {
            return 0;
        }
        self.target_length.div_ceil(self.block_size as u64)
    }

    /// Byte offset of `block` within the target.
    #[inline]
    #[must_use]
    pub const fn block_offset(self, block: BlockId) -> u64 {
        block as u64 * self.block_size as u64
    }

    /// Number of target bytes inside `block`; shorter than the block size
    /// only for the final block.
    #[must_use]
    pub fn block_len(self, block: BlockId) -> usize {
        let offset = self.block_offset(block);
        let remaining = self.target_length.saturating_sub(offset);
        usize::try_from(remaining).map_or(self.block_size, |rem| rem.min(self.block_size))
    }
}

/// Errors produced while choosing a layout.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum LayoutError {
    /// The target needs more blocks than a [`BlockId`] can address.
    #[error("target of {length} bytes needs {blocks} blocks of {block_size} bytes, more than block ids can address")]
    BlockCountOverflow {
        /// Target length in bytes.
        length: u64,
        /// Block size that was tried.
        block_size: u32,
        /// Resulting block count.
        blocks: u64,
    },
}

/// Chooses block size and checksum widths for a target of `target_length`
/// bytes.
///
/// The block size defaults to 2 KiB below 100 MB and 4 KiB above. The weak
/// checksum keeps enough bits that a random window rarely survives the weak
/// test; the strong checksum keeps enough bytes that a false accept over the
/// whole target is improbable (about 2^-20).
#[doc(alias = "zsyncmake")]
pub fn calculate_layout(
    target_length: u64,
    forced_block_size: Option<NonZeroU32>,
) -> Result<DigestLayout, LayoutError> {
    let block_size = forced_block_size.map_or_else(
        || {
            if target_length < LARGE_TARGET_THRESHOLD {
                SMALL_BLOCK_SIZE
            } else {
                LARGE_BLOCK_SIZE
            }
        },
        NonZeroU32::get,
    );

    let blocks = target_length.div_ceil(u64::from(block_size));
    if blocks >= u64::from(BlockId::MAX) {
        return Err(LayoutError::BlockCountOverflow {
            length: target_length,
            block_size,
            blocks,
        });
    }

    let len = target_length.max(1) as f64;
    let bs = f64::from(block_size);

    let rsum_bytes = (((len.log2() + bs.log2()) - 8.6) / 8.0)
        .ceil()
        .clamp(MIN_RSUM_BYTES, MAX_RSUM_BYTES);

    let per_target = ((20.0 + (len.log2() + (1.0 + len / bs).log2())) / 8.0).ceil();
    let per_block = ((7.9 + (20.0 + (1.0 + len / bs).log2())) / 8.0).floor();
    let checksum_bytes = per_target.max(per_block).min(MAX_CHECKSUM_BYTES);

    Ok(DigestLayout::new(
        block_size as usize,
        target_length,
        (rsum_bytes as u8) * 8,
        checksum_bytes as u8,
    ))
}
