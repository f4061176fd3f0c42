#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Per-block digest tables describing a target file.
//!
//! A target file is cut into fixed-size blocks. For every block the manifest
//! records a weak rolling checksum and a (possibly truncated) strong MD4
//! checksum. This crate models that description:
//!
//! - [`DigestLayout`] carries the manifest parameters: block size, target
//!   length and how many bits/bytes of each checksum are significant.
//! - [`BlockDigestTable`] is the immutable array of [`BlockDigest`]s indexed by
//!   [`BlockId`].
//! - [`calculate_layout`] picks parameters for a target of a given length.
//! - [`generate_digest_table`] computes a table from the target bytes.
//!
//! Parsing a manifest from disk is left to the caller, who feeds decoded
//! values into [`BlockDigestTable::push`].

mod block;
mod generation;
mod layout;
mod table;

pub use block::{BlockDigest, BlockId};
pub use generation::{SignatureError, generate_digest_table};
pub use layout::{DigestLayout, LayoutError, calculate_layout};
pub use table::{BlockDigestTable, TableError};
