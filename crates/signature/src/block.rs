//! crates/signature/src/block.rs
//!
//! Digest pair describing a single target block.

use checksums::RollingDigest;
use checksums::strong::Md4;

/// Ordinal of a block within the target file.
pub type BlockId = u32;

/// Weak and strong checksum of one target block.
///
/// The strong checksum is stored in a fixed-width buffer. When the manifest
/// carries fewer bytes than a full digest the remaining bytes are zero and are
/// never compared.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlockDigest {
    rolling: RollingDigest,
    strong: [u8; Md4::LEN],
}

impl BlockDigest {
    /// Creates a block descriptor, keeping at most [`Md4::LEN`] strong bytes.
    #[must_use]
    pub fn new(rolling: RollingDigest, strong: &[u8]) -> Self {
        let mut stored = [0u8; Md4::LEN];
        let len = strong.len().min(Md4::LEN);
        stored[..len].copy_from_slice(&strong[..len]);
        Self {
            rolling,
            strong: stored,
        }
    }

    /// Computes both digests for a full (already padded) block of data.
    #[must_use]
    pub fn from_block(data: &[u8]) -> Self {
        Self {
            rolling: RollingDigest::from_bytes(data),
            strong: Md4::digest(data),
        }
    }

    /// Returns the weak rolling checksum of the block.
    #[inline]
    #[must_use]
    pub const fn rolling(&self) -> RollingDigest {
        self.rolling
    }

    /// Returns the stored strong checksum bytes.
    #[inline]
    #[must_use]
    pub const fn strong(&self) -> &[u8; Md4::LEN] {
        &self.strong
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strong_checksum_is_zero_extended() {
        let block = BlockDigest::new(RollingDigest::from_bytes(b"abcd"), &[9, 8, 7]);
        assert_eq!(&block.strong()[..3], &[9, 8, 7]);
        assert!(block.strong()[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn from_block_matches_separate_digests() {
        let data = b"block contents";
        let block = BlockDigest::from_block(data);
        assert_eq!(block.rolling(), RollingDigest::from_bytes(data));
        assert_eq!(block.strong(), &Md4::digest(data));
    }
}
