//! crates/signature/src/generation.rs
//!
//! Digest table generation from target contents.

use std::io::{self, Read};

use thiserror::Error;
#[cfg(feature = "tracing")]
use tracing::instrument;

use checksums::RollingDigest;
use checksums::strong::Md4;

use crate::block::BlockId;
use crate::layout::DigestLayout;
use crate::table::{BlockDigestTable, TableError};

/// Errors returned when generating a digest table.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Underlying I/O failure raised while reading the target.
    #[error("failed to read target while generating digests: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
    /// The reader yielded more bytes than the layout's target length.
    #[error("target contained trailing data beyond the declared {expected} byte(s)")]
    TrailingData {
        /// Target length declared by the layout.
        expected: u64,
    },
    /// The layout cannot describe a usable table.
    #[error("layout has a zero block size but a non-empty target")]
    ZeroBlockSize,
    /// The layout implies more blocks than a [`BlockId`] can address.
    #[error("layout implies {blocks} blocks, more than block ids can address")]
    TooManyBlocks {
        /// Block count implied by the layout.
        blocks: u64,
    },
    /// A computed block was rejected by the table.
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Reads exactly `layout.target_length()` bytes and returns their digest
/// table.
///
/// The final partial block is zero-padded to the full block size before both
/// checksums are computed, so a matcher sees the same padding when it flushes
/// the tail of a stream.
///
/// # Errors
///
/// - [`SignatureError::Io`] when the reader fails or ends early.
/// - [`SignatureError::TrailingData`] when the reader holds more bytes.
/// - [`SignatureError::Table`] when the layout asks for more strong bytes
///   than MD4 provides.
#[cfg_attr(
    feature = "tracing",
    instrument(skip(reader), fields(blocks = layout.block_count()), name = "generate_digest_table")
)]
pub fn generate_digest_table<R: Read>(
    mut reader: R,
    layout: DigestLayout,
) -> Result<BlockDigestTable, SignatureError> {
    let block_size = layout.block_size();
    if block_size == 0 && layout.target_length() > 0 {
        return Err(SignatureError::ZeroBlockSize);
    }

    let strong_len = usize::from(layout.checksum_bytes()).min(Md4::LEN);
    let mut table = BlockDigestTable::new(layout);
    let mut buffer = vec![0u8; block_size];

    let block_count = layout.block_count();
    let blocks = BlockId::try_from(block_count)
        .ok()
        .filter(|&blocks| blocks < BlockId::MAX)
        .ok_or(SignatureError::TooManyBlocks {
            blocks: block_count,
        })?;

    for block in 0..blocks {
        let len = layout.block_len(block);
        reader.read_exact(&mut buffer[..len])?;
        buffer[len..].fill(0);

        let rolling = RollingDigest::from_bytes(&buffer);
        let strong = Md4::digest(&buffer);
        table.push(rolling, &strong[..strong_len])?;
    }

    let mut extra = [0u8; 1];
    if reader.read(&mut extra)? != 0 {
        return Err(SignatureError::TrailingData {
            expected: layout.target_length(),
        });
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(blocks = table.len(), block_size, "generated digest table");

    Ok(table)
}
