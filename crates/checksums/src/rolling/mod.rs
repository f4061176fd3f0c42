//! crates/checksums/src/rolling/mod.rs
//!
//! Rolling checksum used to locate candidate blocks in an unaligned stream.
//!
//! The checksum keeps two 16-bit accumulators: `a` is the plain byte sum of the
//! window and `b` is the sum of the running prefix sums, which weights every
//! byte by its distance from the end of the window. Sliding the window by one
//! byte only needs the byte that leaves and the byte that enters.

mod checksum;
mod digest;
mod error;

pub use checksum::RollingChecksum;
pub use digest::RollingDigest;
pub use error::RollingError;

#[cfg(test)]
mod tests;
