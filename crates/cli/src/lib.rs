#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the command-line front-end of the `rcksum` workspace. Given a
//! target file and any number of seed files it computes the target's block
//! digest table, scans every seed for blocks of the target and reports which
//! blocks were found. Matched blocks can be written to an output file, and
//! `--fetch` copies the blocks no seed provided straight from the target so
//! the output ends up byte-identical.
//!
//! # Design
//!
//! [`run`] accepts an iterator of arguments together with handles for standard
//! output and error, which keeps the binary a thin wrapper and lets tests
//! drive the whole pipeline in-process. Parsing uses a `clap` builder with
//! the built-in help and version flags disabled so both are rendered here.
//! Diagnostics flow through `tracing`; `-v` and `--debug FLAG` pick the
//! filter via the `logging` crate.
//!
//! # Errors
//!
//! Argument errors print a diagnostic and return exit code `1`. Failures while
//! reading inputs, writing the output or verifying blocks return `2`.
//!
//! # Examples
//!
//! ```
//! use cli::run;
//!
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let exit_code = run(["rcksum", "--version"], &mut stdout, &mut stderr);
//!
//! assert_eq!(exit_code, 0);
//! assert!(String::from_utf8(stdout).unwrap().starts_with("rcksum "));
//! ```

use std::ffi::OsString;
use std::io::Write;

use logging::VerbosityConfig;

mod arguments;
mod error;
mod pipeline;
mod report;

pub use error::CliError;

use arguments::{PROGRAM_NAME, ParsedArgs, parse_args, render_help};
use error::{EXIT_FAILURE, EXIT_USAGE};
use pipeline::{Request, reconstruct};

/// Maximum exit code representable by a Unix process.
const MAX_EXIT_CODE: i32 = u8::MAX as i32;

/// Runs the command-line interface with the provided arguments and handles.
///
/// Returns the process exit status: `0` on success, `1` for usage errors and
/// `2` when the reconstruction fails. An incomplete reconstruction is not an
/// error; the summary reports which blocks are still missing.
#[must_use]
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    match parse_args(arguments) {
        Ok(parsed) => execute(parsed, stdout, stderr),
        Err(error) => {
            let _ = write!(stderr, "{PROGRAM_NAME}: {error}");
            EXIT_USAGE
        }
    }
}

fn execute<Out, Err>(parsed: ParsedArgs, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    if parsed.show_help {
        return match stdout.write_all(render_help().as_bytes()) {
            Ok(()) => 0,
            Err(_) => EXIT_FAILURE,
        };
    }
    if parsed.show_version {
        return match writeln!(stdout, "{PROGRAM_NAME} {}", env!("CARGO_PKG_VERSION")) {
            Ok(()) => 0,
            Err(_) => EXIT_FAILURE,
        };
    }

    let mut verbosity = VerbosityConfig::from_verbose_level(parsed.verbosity);
    for token in &parsed.debug_flags {
        if let Err(message) = verbosity.apply_debug_flag(token) {
            let _ = writeln!(stderr, "{PROGRAM_NAME}: {message}");
            return EXIT_USAGE;
        }
    }
    // A subscriber installed by an embedding process takes precedence.
    let _ = logging::init_tracing(verbosity);

    let Some(target) = parsed.target else {
        let _ = writeln!(
            stderr,
            "{PROGRAM_NAME}: missing TARGET operand\nTry '{PROGRAM_NAME} --help' for more information."
        );
        return EXIT_USAGE;
    };

    let request = Request {
        target,
        seeds: parsed.seeds,
        block_size: parsed.block_size,
        output: parsed.output,
        fetch: parsed.fetch,
    };

    match reconstruct(&request) {
        Ok(summary) => match report::write_summary(stdout, &summary) {
            Ok(()) => 0,
            Err(_) => EXIT_FAILURE,
        },
        Err(error) => {
            tracing::debug!(target: "cli", ?error, "reconstruction failed");
            let _ = writeln!(stderr, "{PROGRAM_NAME}: {error}");
            error.exit_code()
        }
    }
}

/// Converts a numeric exit code into an [`std::process::ExitCode`].
#[must_use]
pub fn exit_code_from(status: i32) -> std::process::ExitCode {
    let clamped = status.clamp(0, MAX_EXIT_CODE);
    std::process::ExitCode::from(clamped as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_with(args: &[&str]) -> (i32, String, String) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(args.iter().copied(), &mut stdout, &mut stderr);
        (
            code,
            String::from_utf8(stdout).expect("utf8 stdout"),
            String::from_utf8(stderr).expect("utf8 stderr"),
        )
    }

    #[test]
    fn help_is_written_to_stdout() {
        let (code, stdout, stderr) = run_with(&["rcksum", "--help"]);
        assert_eq!(code, 0);
        assert!(stdout.contains("Usage: rcksum"));
        assert!(stderr.is_empty());
    }

    #[test]
    fn missing_target_is_a_usage_error() {
        let (code, stdout, stderr) = run_with(&["rcksum"]);
        assert_eq!(code, EXIT_USAGE);
        assert!(stdout.is_empty());
        assert!(stderr.contains("missing TARGET"));
    }

    #[test]
    fn unknown_option_is_a_usage_error() {
        let (code, _, stderr) = run_with(&["rcksum", "--no-such-option", "target"]);
        assert_eq!(code, EXIT_USAGE);
        assert!(stderr.starts_with("rcksum: "));
    }

    #[test]
    fn unknown_debug_flag_is_a_usage_error() {
        let (code, _, stderr) = run_with(&["rcksum", "--debug", "bogus2", "target"]);
        assert_eq!(code, EXIT_USAGE);
        assert!(stderr.contains("unknown debug flag: bogus"));
    }
}
