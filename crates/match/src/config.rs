//! crates/match/src/config.rs
//!
//! Validated matcher parameters derived from a digest layout.

use checksums::RollingDigest;
use checksums::strong::Md4;
use signature::{BlockId, DigestLayout};
use thiserror::Error;

/// Default log2 of filter bits per hash bucket.
///
/// Eight filter bits per bucket keep the filter at one byte per bucket while
/// letting most non-matching windows fail without touching a hash chain.
pub const DEFAULT_FILTER_DENSITY_BITS: u8 = 3;

/// Largest accepted filter density (256 bits per bucket).
const MAX_FILTER_DENSITY_BITS: u8 = 8;

/// The hash table never shrinks below 2^4 buckets.
const MIN_HASH_BITS: u32 = 4;

/// Width of the `b` half of the weak checksum.
const RSUM_HALF_BITS: u8 = 16;

/// Errors raised when a layout cannot drive a matcher.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ConfigError {
    /// The layout declares zero bytes per block.
    #[error("block size must be non-zero")]
    ZeroBlockSize,
    /// The one-block context does not fit the 32-bit rolling window.
    #[error("block size {block_size} exceeds the 32-bit rolling window limit")]
    BlockSizeTooLarge {
        /// Declared block size.
        block_size: usize,
    },
    /// The weak checksum width is outside `1..=32` bits.
    #[error("weak checksum width of {bits} bit(s) is outside 1..=32")]
    InvalidRsumBits {
        /// Declared width.
        bits: u8,
    },
    /// The strong checksum width is outside `1..=16` bytes.
    #[error("strong checksum width of {bytes} byte(s) is outside 1..=16")]
    InvalidChecksumBytes {
        /// Declared width.
        bytes: u8,
    },
    /// The filter density exceeds the supported maximum.
    #[error("filter density of {bits} bit(s) per bucket exceeds 8")]
    InvalidFilterDensity {
        /// Requested density.
        bits: u8,
    },
    /// The target has more blocks than block ids can address.
    #[error("target has {blocks} blocks, more than block ids can address")]
    TooManyBlocks {
        /// Block count implied by the layout.
        blocks: u64,
    },
    /// The digest table does not hold every block the layout describes.
    #[error("digest table holds {actual} of {expected} block(s)")]
    IncompleteTable {
        /// Block count implied by the layout.
        expected: u64,
        /// Blocks present in the table.
        actual: usize,
    },
    /// The hash table or filter would not be addressable on this platform.
    #[error("index for {blocks} blocks with filter density {density} is not addressable")]
    IndexTooLarge {
        /// Block count implied by the layout.
        blocks: u64,
        /// Requested filter density.
        density: u8,
    },
}

/// Tunables that do not come from the manifest.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EngineOptions {
    filter_density_bits: u8,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineOptions {
    /// Creates options with the default filter density.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            filter_density_bits: DEFAULT_FILTER_DENSITY_BITS,
        }
    }

    /// Sets log2 of the number of filter bits per hash bucket.
    ///
    /// Each extra bit doubles the filter's memory and roughly halves the share
    /// of non-matching windows that get past the filter into a chain walk.
    #[must_use]
    pub const fn with_filter_density_bits(mut self, bits: u8) -> Self {
        self.filter_density_bits = bits;
        self
    }

    /// Returns log2 of the number of filter bits per hash bucket.
    #[inline]
    #[must_use]
    pub const fn filter_density_bits(self) -> u8 {
        self.filter_density_bits
    }
}

/// Matcher parameters, validated once at construction.
///
/// Besides the manifest values this carries the derived hashing parameters:
/// the masks that reduce a weak checksum to its significant bits, the shift
/// used to fold both halves into a bucket number, and the bucket and filter
/// masks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    block_size: usize,
    blockshift: Option<u32>,
    blocks: BlockId,
    rsum_bits: u8,
    rsum_a_mask: u16,
    rsum_b_mask: u16,
    hash_func_shift: u32,
    checksum_bytes: usize,
    context: u32,
    hashmask: u64,
    bithashmask: u64,
}

impl EngineConfig {
    /// Validates `layout` for a table holding `table_len` blocks.
    pub fn new(
        layout: DigestLayout,
        table_len: usize,
        options: EngineOptions,
    ) -> Result<Self, ConfigError> {
        let block_size = layout.block_size();
        if block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        let context = u32::try_from(block_size)
            .map_err(|_| ConfigError::BlockSizeTooLarge { block_size })?;

        let rsum_bits = layout.rsum_bits();
        if !(1..=32).contains(&rsum_bits) {
            return Err(ConfigError::InvalidRsumBits { bits: rsum_bits });
        }

        let checksum_bytes = layout.checksum_bytes();
        if checksum_bytes == 0 || usize::from(checksum_bytes) > Md4::LEN {
            return Err(ConfigError::InvalidChecksumBytes {
                bytes: checksum_bytes,
            });
        }

        let density = options.filter_density_bits();
        if density > MAX_FILTER_DENSITY_BITS {
            return Err(ConfigError::InvalidFilterDensity { bits: density });
        }

        let block_count = layout.block_count();
        let blocks = BlockId::try_from(block_count)
            .ok()
            .filter(|&blocks| blocks < BlockId::MAX)
            .ok_or(ConfigError::TooManyBlocks {
                blocks: block_count,
            })?;
        if table_len as u64 != block_count {
            return Err(ConfigError::IncompleteTable {
                expected: block_count,
                actual: table_len,
            });
        }

        let hash_bits = u64::from(blocks)
            .next_power_of_two()
            .trailing_zeros()
            .max(MIN_HASH_BITS);
        let filter_bits = hash_bits + u32::from(density);
        let too_large = ConfigError::IndexTooLarge {
            blocks: block_count,
            density,
        };
        // Filter bytes = 2^(filter_bits - 3) and buckets = 2^hash_bits must be addressable.
        if usize::try_from(1u64 << hash_bits).is_err()
            || usize::try_from(1u64 << (filter_bits - 3)).is_err()
        {
            return Err(too_large);
        }

        let a_bits = u32::from(rsum_bits.saturating_sub(RSUM_HALF_BITS));
        let b_bits = u32::from(rsum_bits.min(RSUM_HALF_BITS));

        Ok(Self {
            block_size,
            blockshift: block_size
                .is_power_of_two()
                .then_some(block_size.trailing_zeros()),
            blocks,
            rsum_bits,
            rsum_a_mask: low_bits(a_bits),
            rsum_b_mask: low_bits(b_bits),
            hash_func_shift: hash_bits.saturating_sub(a_bits),
            checksum_bytes: usize::from(checksum_bytes),
            context,
            hashmask: (1u64 << hash_bits) - 1,
            bithashmask: (1u64 << filter_bits) - 1,
        })
    }

    /// Reduces a weak checksum to its significant bits, packed as
    /// `(a << 16) | b`.
    #[inline]
    #[must_use]
    pub fn weak_key(&self, digest: RollingDigest) -> u32 {
        (u32::from(digest.sum1() & self.rsum_a_mask) << 16)
            | u32::from(digest.sum2() & self.rsum_b_mask)
    }

    /// Folds a weak key into a hash value; the bucket is
    /// `hash & hashmask` and the filter slot `hash & bithashmask`.
    #[inline]
    #[must_use]
    pub const fn rhash(&self, key: u32) -> u64 {
        let b = (key & 0xffff) as u64;
        let a = (key >> 16) as u64;
        b ^ (a << self.hash_func_shift)
    }

    /// Bytes per block.
    #[inline]
    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    /// `log2(block_size)` when the block size is a power of two.
    #[inline]
    #[must_use]
    pub const fn blockshift(&self) -> Option<u32> {
        self.blockshift
    }

    /// Number of blocks in the target.
    #[inline]
    #[must_use]
    pub const fn blocks(&self) -> BlockId {
        self.blocks
    }

    /// Significant bits of each weak checksum.
    #[inline]
    #[must_use]
    pub const fn rsum_bits(&self) -> u8 {
        self.rsum_bits
    }

    /// Mask applied to the `a` half of a weak checksum.
    #[inline]
    #[must_use]
    pub const fn rsum_a_mask(&self) -> u16 {
        self.rsum_a_mask
    }

    /// Mask applied to the `b` half of a weak checksum.
    #[inline]
    #[must_use]
    pub const fn rsum_b_mask(&self) -> u16 {
        self.rsum_b_mask
    }

    /// Shift applied to `a` before it is folded into the hash.
    #[inline]
    #[must_use]
    pub const fn hash_func_shift(&self) -> u32 {
        self.hash_func_shift
    }

    /// Significant bytes of each strong checksum.
    #[inline]
    #[must_use]
    pub const fn checksum_bytes(&self) -> usize {
        self.checksum_bytes
    }

    /// Bytes of input needed to test one window.
    #[inline]
    #[must_use]
    pub const fn context(&self) -> u32 {
        self.context
    }

    /// Bucket count minus one.
    #[inline]
    #[must_use]
    pub const fn hashmask(&self) -> u64 {
        self.hashmask
    }

    /// Filter bit count minus one.
    #[inline]
    #[must_use]
    pub const fn bithashmask(&self) -> u64 {
        self.bithashmask
    }
}

const fn low_bits(bits: u32) -> u16 {
    if bits >= 16 {
        u16::MAX
    } else {
        ((1u32 << bits) - 1) as u16
    }
}
