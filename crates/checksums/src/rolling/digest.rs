use super::checksum::RollingChecksum;

/// Snapshot of a [`RollingChecksum`] window.
///
/// Manifests store one digest per target block. Only `sum1`/`sum2` take part
/// in matching; `len` records how many bytes produced the digest.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct RollingDigest {
    a: u16,
    b: u16,
    len: usize,
}

impl RollingDigest {
    /// Creates a digest from its components.
    #[must_use]
    pub const fn new(sum1: u16, sum2: u16, len: usize) -> Self {
        Self {
            a: sum1,
            b: sum2,
            len,
        }
    }

    /// Computes the digest of `data` in one pass.
    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut checksum = RollingChecksum::new();
        checksum.update(data);
        checksum.digest()
    }

    /// Rebuilds a digest from the packed `(b << 16) | a` representation.
    #[must_use]
    pub const fn from_value(value: u32, len: usize) -> Self {
        Self::new(value as u16, (value >> 16) as u16, len)
    }

    /// Byte sum of the window (`a`).
    #[inline]
    #[must_use]
    pub const fn sum1(&self) -> u16 {
        self.a
    }

    /// Sum of prefix sums of the window (`b`).
    #[inline]
    #[must_use]
    pub const fn sum2(&self) -> u16 {
        self.b
    }

    /// Number of bytes that contributed to the digest.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Reports whether the digest covers no bytes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed `(b << 16) | a` representation.
    #[must_use]
    pub const fn value(&self) -> u32 {
        ((self.b as u32) << 16) | (self.a as u32)
    }
}

impl From<&RollingChecksum> for RollingDigest {
    #[inline]
    fn from(checksum: &RollingChecksum) -> Self {
        checksum.digest()
    }
}
