//! crates/checksums/src/strong/mod.rs
//!
//! Strong block digests used to confirm weak checksum candidates.

mod md4;

pub use md4::Md4;

/// Streaming digest interface shared by strong checksum implementations.
pub trait StrongDigest: Sized {
    /// Fixed-size output of the digest.
    type Digest: AsRef<[u8]> + Copy + Eq;

    /// Length of [`Self::Digest`] in bytes.
    const DIGEST_LEN: usize;

    /// Creates a hasher with an empty state.
    fn new() -> Self;

    /// Feeds bytes into the hasher.
    fn update(&mut self, data: &[u8]);

    /// Consumes the hasher and returns the digest.
    fn finalize(self) -> Self::Digest;

    /// Computes the digest of `data` in one shot.
    fn digest(data: &[u8]) -> Self::Digest {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

/// Compares the first `len` bytes of two digests.
///
/// Manifests may carry a truncated strong checksum; only the stored prefix
/// takes part in the comparison. Returns `false` when either side is shorter
/// than `len`.
#[inline]
#[must_use]
pub fn truncated_eq(stored: &[u8], computed: &[u8], len: usize) -> bool {
    match (stored.get(..len), computed.get(..len)) {
        (Some(lhs), Some(rhs)) => lhs == rhs,
        _ => false,
    }
}
