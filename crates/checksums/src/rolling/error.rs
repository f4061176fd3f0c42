use core::fmt;

/// Errors that can occur while sliding the rolling checksum window.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RollingError {
    /// The window is empty, so there is no outgoing byte to remove.
    EmptyWindow,
    /// The window length exceeds what can be represented in 32 bits.
    WindowTooLarge {
        /// Number of bytes present in the window when the error was raised.
        len: usize,
    },
}

impl fmt::Display for RollingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyWindow => write!(f, "rolling checksum requires a non-empty window"),
            Self::WindowTooLarge { len } => write!(
                f,
                "rolling checksum window of {len} bytes exceeds 32-bit limit"
            ),
        }
    }
}

impl std::error::Error for RollingError {}
