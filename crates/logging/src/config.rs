//! crates/logging/src/config.rs
//! Verbosity configuration derived from `-v` counts and flag tokens.

use std::fmt::Write as _;

use super::levels::{DebugFlag, DebugLevels, level_name};

/// Directive applied to every target not named by a flag.
const BASE_DIRECTIVE: &str = "warn";

/// Per-flag verbosity configuration.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerbosityConfig {
    /// Debug flag levels.
    pub debug: DebugLevels,
}

impl VerbosityConfig {
    /// Create a new configuration from a verbose level (the number of `-v`).
    ///
    /// One `-v` reports the driver's progress and table generation, two add
    /// index and scan summaries, three add per-match detail and four or more
    /// enable trace output everywhere.
    pub const fn from_verbose_level(level: u8) -> Self {
        let mut config = Self {
            debug: DebugLevels {
                table: 0,
                index: 0,
                scan: 0,
                cli: 0,
            },
        };

        match level {
            0 => {}
            1 => {
                config.debug.cli = 1;
                config.debug.table = 1;
            }
            2 => {
                config.debug.cli = 2;
                config.debug.table = 2;
                config.debug.index = 2;
                config.debug.scan = 2;
            }
            3 => {
                config.debug.cli = 2;
                config.debug.table = 2;
                config.debug.index = 2;
                config.debug.scan = 3;
            }
            _ => config.debug.set_all(3),
        }

        config
    }

    /// Apply a single debug flag token (e.g., "scan3", "index").
    pub fn apply_debug_flag(&mut self, token: &str) -> Result<(), String> {
        let (name, level) = parse_flag_token(token)?;
        let flag = DebugFlag::from_name(name).ok_or_else(|| format!("unknown debug flag: {name}"))?;
        self.debug.set(flag, level);
        Ok(())
    }

    /// Renders the configuration as `EnvFilter` directives, e.g.
    /// `warn,cli=info,signature=info`.
    #[must_use]
    pub fn filter_directives(&self) -> String {
        let mut directives = String::from(BASE_DIRECTIVE);
        for flag in DebugFlag::ALL {
            if let Some(level) = level_name(self.debug.get(flag)) {
                let _ = write!(directives, ",{}={level}", flag.target());
            }
        }
        directives
    }
}

/// Parse a flag token like "scan2" into ("scan", 2) or "index" into ("index", 1).
fn parse_flag_token(token: &str) -> Result<(&str, u8), String> {
    if token.is_empty() {
        return Err("empty flag token".to_string());
    }

    match token.find(|c: char| c.is_ascii_digit()) {
        Some(pos) => {
            let name = &token[..pos];
            let level = token[pos..]
                .parse::<u8>()
                .map_err(|_| format!("invalid level in flag: {token}"))?;
            Ok((name, level))
        }
        None => Ok((token, 1)),
    }
}
