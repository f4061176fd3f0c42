//! crates/logging/src/levels.rs
//! Debug flags and their per-flag levels.

/// Diagnostic categories, one per instrumented subsystem.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DebugFlag {
    /// Digest table generation.
    Table,
    /// Weak-checksum index construction.
    Index,
    /// Stream scanning, accepted matches and fetched blocks.
    Scan,
    /// Command-line driver.
    Cli,
}

impl DebugFlag {
    /// Every flag, in display order.
    pub const ALL: [Self; 4] = [Self::Table, Self::Index, Self::Scan, Self::Cli];

    /// Name accepted by [`VerbosityConfig::apply_debug_flag`](crate::VerbosityConfig::apply_debug_flag).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Index => "index",
            Self::Scan => "scan",
            Self::Cli => "cli",
        }
    }

    /// Tracing target prefix whose events the flag controls.
    #[must_use]
    pub const fn target(self) -> &'static str {
        match self {
            Self::Table => "signature",
            Self::Index => "matching::index",
            Self::Scan => "matching::engine",
            Self::Cli => "cli",
        }
    }

    /// Looks a flag up by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.name() == name)
    }
}

/// Debug verbosity levels for each flag.
///
/// Level 0 keeps only warnings, 1 adds info, 2 adds debug and 3 or more adds
/// trace events.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebugLevels {
    /// Digest table generation level.
    pub table: u8,
    /// Index construction level.
    pub index: u8,
    /// Stream scanning level.
    pub scan: u8,
    /// Command-line driver level.
    pub cli: u8,
}

impl DebugLevels {
    /// Get the level for a specific flag.
    pub const fn get(&self, flag: DebugFlag) -> u8 {
        match flag {
            DebugFlag::Table => self.table,
            DebugFlag::Index => self.index,
            DebugFlag::Scan => self.scan,
            DebugFlag::Cli => self.cli,
        }
    }

    /// Set the level for a specific flag.
    pub const fn set(&mut self, flag: DebugFlag, level: u8) {
        match flag {
            DebugFlag::Table => self.table = level,
            DebugFlag::Index => self.index = level,
            DebugFlag::Scan => self.scan = level,
            DebugFlag::Cli => self.cli = level,
        }
    }

    /// Set all flags to the specified level.
    pub const fn set_all(&mut self, level: u8) {
        self.table = level;
        self.index = level;
        self.scan = level;
        self.cli = level;
    }
}

/// Tracing level name enabled by a flag level, or `None` for level 0.
#[must_use]
pub const fn level_name(level: u8) -> Option<&'static str> {
    match level {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for flag in DebugFlag::ALL {
            assert_eq!(DebugFlag::from_name(flag.name()), Some(flag));
        }
        assert_eq!(DebugFlag::from_name("flist"), None);
    }

    #[test]
    fn get_reflects_set() {
        let mut levels = DebugLevels::default();
        levels.set(DebugFlag::Scan, 3);
        assert_eq!(levels.get(DebugFlag::Scan), 3);
        assert_eq!(levels.get(DebugFlag::Index), 0);

        levels.set_all(1);
        assert!(DebugFlag::ALL.iter().all(|&flag| levels.get(flag) == 1));
    }

    #[test]
    fn level_names_saturate_at_trace() {
        assert_eq!(level_name(0), None);
        assert_eq!(level_name(1), Some("info"));
        assert_eq!(level_name(2), Some("debug"));
        assert_eq!(level_name(9), Some("trace"));
    }
}
