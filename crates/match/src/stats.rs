//! crates/match/src/stats.rs
//!
//! Counters describing matcher work.

/// Monotonic counters of matcher activity.
///
/// `hashhit` counts windows whose weak checksum reached a non-empty hash
/// chain, `weakhit` counts weak matches that failed strong verification,
/// `stronghit` counts accepted blocks and `checksummed` counts strong digests
/// computed over a window.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MatchStats {
    /// Windows that reached a hash chain.
    pub hashhit: u64,
    /// Weak matches rejected by the strong checksum.
    pub weakhit: u64,
    /// Blocks accepted after strong verification.
    pub stronghit: u64,
    /// Strong digests computed.
    pub checksummed: u64,
}

/// Result of one [`MatchEngine::submit`](crate::MatchEngine::submit) call.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SubmitOutcome {
    /// Bytes consumed from the input; always the full input length.
    pub consumed: usize,
    /// Blocks newly accepted during the call.
    pub matched: usize,
}
