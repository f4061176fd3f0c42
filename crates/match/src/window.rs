//! Fixed-capacity ring buffer holding the bytes of the current match window.
//!
//! The matcher needs exactly one block of context to test a position. While
//! the window is filling, bytes are copied in bulk; once full, every new byte
//! evicts the oldest one and the evicted byte feeds the rolling checksum.
//! A contiguous view is only needed when a candidate must be hashed or
//! written, so rotation is deferred until then.

use std::collections::TryReserveError;

/// Sliding window of at most one block of source bytes.
#[derive(Clone, Debug)]
pub(crate) struct MatchWindow {
    /// Backing storage, always exactly `capacity` bytes.
    buffer: Vec<u8>,
    /// Position of the oldest byte.
    head: usize,
    /// Number of bytes currently held.
    len: usize,
}

impl MatchWindow {
    /// Allocates a window of `capacity` bytes.
    pub(crate) fn with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(capacity)?;
        buffer.resize(capacity, 0);
        Ok(Self {
            buffer,
            head: 0,
            len: 0,
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.len == self.buffer.len()
    }

    /// Drops all held bytes.
    #[inline]
    pub(crate) fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Copies as much of `data` as fits without evicting anything and
    /// returns the number of bytes taken.
    pub(crate) fn fill_from(&mut self, data: &[u8]) -> usize {
        let take = data.len().min(self.buffer.len() - self.len);
        if take == 0 {
            return 0;
        }
        // A partially filled window is always contiguous from `head`, which
        // is zero after every clear.
        if self.head != 0 {
            self.buffer.rotate_left(self.head);
            self.head = 0;
        }
        self.buffer[self.len..self.len + take].copy_from_slice(&data[..take]);
        self.len += take;
        take
    }

    /// Appends a byte, returning the evicted oldest byte when the window was
    /// full.
    #[inline]
    pub(crate) fn push_back(&mut self, byte: u8) -> Option<u8> {
        let capacity = self.buffer.len();
        if self.len < capacity {
            let pos = (self.head + self.len) % capacity;
            self.buffer[pos] = byte;
            self.len += 1;
            None
        } else {
            let outgoing = self.buffer[self.head];
            self.buffer[self.head] = byte;
            self.head = (self.head + 1) % capacity;
            Some(outgoing)
        }
    }

    /// Returns the held bytes as two slices, oldest first.
    pub(crate) fn as_slices(&self) -> (&[u8], &[u8]) {
        let end = self.head + self.len;
        if end <= self.buffer.len() {
            (&self.buffer[self.head..end], &[])
        } else {
            let second_len = end - self.buffer.len();
            (&self.buffer[self.head..], &self.buffer[..second_len])
        }
    }

    /// Returns the held bytes contiguously, rotating storage if the window
    /// has wrapped.
    pub(crate) fn as_slice(&mut self) -> &[u8] {
        let end = self.head + self.len;
        if end <= self.buffer.len() {
            return &self.buffer[self.head..end];
        }
        self.buffer.rotate_left(self.head);
        self.head = 0;
        &self.buffer[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(capacity: usize) -> MatchWindow {
        MatchWindow::with_capacity(capacity).expect("allocate window")
    }

    #[test]
    fn new_window_is_empty() {
        let win = window(8);
        assert_eq!(win.len(), 0);
        assert_eq!(win.buffer.len(), 8);
        assert!(!win.is_full());
    }

    #[test]
    fn fill_from_stops_at_capacity() {
        let mut win = window(4);
        assert_eq!(win.fill_from(b"ab"), 2);
        assert_eq!(win.fill_from(b"cdef"), 2);
        assert!(win.is_full());
        assert_eq!(win.fill_from(b"g"), 0);
        assert_eq!(win.as_slice(), b"abcd");
    }

    #[test]
    fn push_when_full_returns_outgoing() {
        let mut win = window(3);
        win.fill_from(&[1, 2, 3]);
        assert_eq!(win.push_back(4), Some(1));
        assert_eq!(win.push_back(5), Some(2));
        assert_eq!(win.as_slices(), (&[3u8][..], &[4u8, 5][..]));
        assert_eq!(win.as_slice(), &[3, 4, 5]);
    }

    #[test]
    fn sliding_window_keeps_last_bytes() {
        let mut win = window(4);
        let mut outgoing = Vec::new();
        for &byte in b"hello world" {
            if let Some(out) = win.push_back(byte) {
                outgoing.push(out);
            }
        }
        assert_eq!(win.as_slice(), b"orld");
        assert_eq!(outgoing, b"hello w");
    }

    #[test]
    fn clear_then_fill_after_wrap() {
        let mut win = window(3);
        win.fill_from(b"abc");
        win.push_back(b'd');
        win.clear();
        assert_eq!(win.fill_from(b"xy"), 2);
        assert_eq!(win.push_back(b'z'), None);
        assert_eq!(win.as_slice(), b"xyz");
    }
}
