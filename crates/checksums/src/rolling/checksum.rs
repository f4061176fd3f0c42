use super::digest::RollingDigest;
use super::error::RollingError;

/// Weak rolling checksum over a sliding window (often called `rsum`).
///
/// `a` accumulates the byte sum of the window and `b` accumulates the prefix
/// sums, both truncated to 16 bits after every update. The packed value and
/// the [`RollingDigest`] layout match what block manifests store.
#[doc(alias = "rsum")]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RollingChecksum {
    a: u32,
    b: u32,
    len: usize,
}

impl RollingChecksum {
    /// Creates a new rolling checksum with zeroed state.
    #[must_use]
    pub const fn new() -> Self {
        Self { a: 0, b: 0, len: 0 }
    }

    /// Resets the checksum back to its initial state.
    pub const fn reset(&mut self) {
        self.a = 0;
        self.b = 0;
        self.len = 0;
    }

    /// Returns the number of bytes covered by the current window.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no bytes have been observed yet.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `chunk` to the window.
    pub fn update(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }

        let mut a = self.a;
        let mut b = self.b;

        let mut quads = chunk.chunks_exact(4);
        for quad in &mut quads {
            a = a.wrapping_add(u32::from(quad[0]));
            b = b.wrapping_add(a);
            a = a.wrapping_add(u32::from(quad[1]));
            b = b.wrapping_add(a);
            a = a.wrapping_add(u32::from(quad[2]));
            b = b.wrapping_add(a);
            a = a.wrapping_add(u32::from(quad[3]));
            b = b.wrapping_add(a);
        }
        for &byte in quads.remainder() {
            a = a.wrapping_add(u32::from(byte));
            b = b.wrapping_add(a);
        }

        self.a = a & 0xffff;
        self.b = b & 0xffff;
        self.len = self.len.saturating_add(chunk.len());
    }

    /// Recomputes the state from scratch for a fresh window.
    pub fn update_from_block(&mut self, block: &[u8]) {
        self.reset();
        self.update(block);
    }

    /// Slides the window by one byte: `outgoing` leaves, `incoming` enters.
    ///
    /// # Errors
    ///
    /// Returns [`RollingError::EmptyWindow`] before the window has been primed
    /// and [`RollingError::WindowTooLarge`] when the window length does not fit
    /// in 32 bits.
    #[inline]
    pub fn roll(&mut self, outgoing: u8, incoming: u8) -> Result<(), RollingError> {
        if self.len == 0 {
            return Err(RollingError::EmptyWindow);
        }
        let window =
            u32::try_from(self.len).map_err(|_| RollingError::WindowTooLarge { len: self.len })?;

        let out = u32::from(outgoing);
        self.a = self.a.wrapping_sub(out).wrapping_add(u32::from(incoming)) & 0xffff;
        self.b = self
            .b
            .wrapping_sub(window.wrapping_mul(out))
            .wrapping_add(self.a)
            & 0xffff;
        Ok(())
    }

    /// Slides a window whose length is exactly `1 << shift` bytes.
    ///
    /// Replaces the multiplication of [`roll`](Self::roll) with a shift. The
    /// caller guarantees the window is primed with `1 << shift` bytes.
    #[inline]
    pub fn roll_pow2(&mut self, outgoing: u8, incoming: u8, shift: u32) {
        debug_assert_eq!(self.len, 1usize << shift);

        let out = u32::from(outgoing);
        self.a = self.a.wrapping_sub(out).wrapping_add(u32::from(incoming)) & 0xffff;
        self.b = self
            .b
            .wrapping_sub(out.wrapping_shl(shift))
            .wrapping_add(self.a)
            & 0xffff;
    }

    /// Returns the checksum packed as `(b << 16) | a`.
    #[must_use]
    pub const fn value(&self) -> u32 {
        (self.b << 16) | self.a
    }

    /// Returns the current state as a structured digest.
    #[must_use]
    pub const fn digest(&self) -> RollingDigest {
        RollingDigest::new(self.a as u16, self.b as u16, self.len)
    }
}
