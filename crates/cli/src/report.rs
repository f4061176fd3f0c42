//! crates/cli/src/report.rs
//!
//! Human-readable summary printed after a run.

use std::io::{self, Write};
use std::ops::Range;

use matching::BlockId;

use crate::pipeline::Summary;

/// Formats a number with thousands separators.
pub(crate) fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}

/// Formats block ranges as `a-b` (inclusive) or `a` for single blocks.
pub(crate) fn format_ranges(ranges: &[Range<BlockId>]) -> String {
    if ranges.is_empty() {
        return "none".to_owned();
    }
    ranges
        .iter()
        .map(|range| {
            let last = range.end - 1;
            if last == range.start {
                range.start.to_string()
            } else {
                format!("{}-{last}", range.start)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Writes the run summary.
pub(crate) fn write_summary<W: Write + ?Sized>(out: &mut W, summary: &Summary) -> io::Result<()> {
    let layout = summary.layout;
    writeln!(
        out,
        "target: {} bytes in {} blocks of {} bytes",
        format_number(layout.target_length()),
        format_number(layout.block_count()),
        format_number(layout.block_size() as u64),
    )?;
    writeln!(
        out,
        "checksums: {} weak bits, {} strong bytes",
        layout.rsum_bits(),
        layout.checksum_bytes()
    )?;
    for seed in &summary.seeds {
        writeln!(
            out,
            "seed {}: {} blocks matched",
            seed.path.display(),
            format_number(seed.matched as u64)
        )?;
    }
    if summary.fetched > 0 {
        writeln!(
            out,
            "fetched: {} blocks",
            format_number(summary.fetched as u64)
        )?;
    }
    writeln!(out, "covered: {}", format_ranges(&summary.covered))?;
    writeln!(out, "missing: {}", format_ranges(&summary.missing))?;

    let stats = summary.stats;
    writeln!(
        out,
        "lookups: {} hash hits, {} weak hits, {} strong hits, {} strong checksums",
        format_number(stats.hashhit),
        format_number(stats.weakhit),
        format_number(stats.stronghit),
        format_number(stats.checksummed),
    )?;
    writeln!(
        out,
        "complete: {}",
        if summary.complete { "yes" } else { "no" }
    )
}
