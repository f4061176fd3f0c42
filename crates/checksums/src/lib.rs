#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksums` provides the two checksum primitives the block matcher is
//! built on:
//!
//! - [`RollingChecksum`], the Adler-style weak checksum (`rsum`) that can be
//!   slid across a byte stream one byte at a time in O(1).
//! - [`strong::Md4`], the strong digest used to confirm weak candidates.
//!
//! Both are pure functions over byte buffers. Neither allocates on the hot
//! path and neither can fail once the rolling window is primed.
//!
//! # Examples
//!
//! ```
//! use checksums::RollingChecksum;
//!
//! let data = b"abcdefgh";
//! let mut rolling = RollingChecksum::new();
//! rolling.update(&data[..4]);
//! rolling.roll(data[0], data[4]).unwrap();
//!
//! let mut fresh = RollingChecksum::new();
//! fresh.update(&data[1..5]);
//! assert_eq!(rolling.digest(), fresh.digest());
//! ```

mod rolling;
pub mod strong;

pub use rolling::{RollingChecksum, RollingDigest, RollingError};
