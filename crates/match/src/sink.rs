//! crates/match/src/sink.rs
//!
//! Destinations for accepted block data.

use std::io::{self, Seek, SeekFrom, Write};

use signature::BlockId;

/// Receives the target bytes of every accepted block.
///
/// `offset` is the block's position in the target and `data` holds exactly the
/// target bytes of the block, so the final block is never padded.
pub trait BlockSink {
    /// Stores `data` at `offset` in the reconstructed target.
    fn write_block(&mut self, block: BlockId, offset: u64, data: &[u8]) -> io::Result<()>;
}

impl<S: BlockSink + ?Sized> BlockSink for &mut S {
    #[inline]
    fn write_block(&mut self, block: BlockId, offset: u64, data: &[u8]) -> io::Result<()> {
        (**self).write_block(block, offset, data)
    }
}

/// Sink that drops every block; useful when only coverage is wanted.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardSink;

impl BlockSink for DiscardSink {
    fn write_block(&mut self, _block: BlockId, _offset: u64, _data: &[u8]) -> io::Result<()> {
        Ok(())
    }
}

/// Sink assembling the target in a zero-initialised buffer.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemorySink {
    buffer: Vec<u8>,
}

impl MemorySink {
    /// Creates a buffer of `target_len` zero bytes.
    #[must_use]
    pub fn new(target_len: usize) -> Self {
        Self {
            buffer: vec![0; target_len],
        }
    }

    /// Returns the assembled bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the sink and returns the assembled bytes.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl BlockSink for MemorySink {
    fn write_block(&mut self, block: BlockId, offset: u64, data: &[u8]) -> io::Result<()> {
        let range = usize::try_from(offset)
            .ok()
            .and_then(|start| Some(start..start.checked_add(data.len())?))
            .filter(|range| range.end <= self.buffer.len())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "block {block} at offset {offset} ({} bytes) exceeds {}-byte target",
                        data.len(),
                        self.buffer.len()
                    ),
                )
            })?;
        self.buffer[range].copy_from_slice(data);
        Ok(())
    }
}

/// Sink writing blocks into a seekable writer such as an output file.
#[derive(Debug)]
pub struct SeekSink<W> {
    inner: W,
}

impl<W: Write + Seek> SeekSink<W> {
    /// Wraps `inner`.
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Returns a reference to the wrapped writer.
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Seek> BlockSink for SeekSink<W> {
    fn write_block(&mut self, _block: BlockId, offset: u64, data: &[u8]) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        self.inner.write_all(data)
    }
}
