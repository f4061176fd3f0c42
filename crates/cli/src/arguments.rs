//! crates/cli/src/arguments.rs
//!
//! `clap` command definition and the parsed argument structure.

use std::ffi::OsString;
use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, builder::OsStringValueParser, value_parser};

/// Program name used when `argv` is empty.
pub(crate) const PROGRAM_NAME: &str = "rcksum";

/// Parsed command-line arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ParsedArgs {
    /// `--help`, `-h`
    pub(crate) show_help: bool,
    /// `--version`, `-V`
    pub(crate) show_version: bool,
    /// Number of `-v` flags.
    pub(crate) verbosity: u8,
    /// `--debug FLAG`, repeatable.
    pub(crate) debug_flags: Vec<String>,
    /// `--block-size N`, `-b N`; chosen from the target length when absent.
    pub(crate) block_size: Option<NonZeroU32>,
    /// `--output FILE`, `-o FILE`
    pub(crate) output: Option<PathBuf>,
    /// `--fetch`: copy blocks no seed provided straight from the target.
    pub(crate) fetch: bool,
    /// First operand.
    pub(crate) target: Option<PathBuf>,
    /// Remaining operands.
    pub(crate) seeds: Vec<PathBuf>,
}

/// Builds the `clap` command used for parsing.
pub(crate) fn clap_command() -> Command {
    Command::new(PROGRAM_NAME)
        .about("Reconstruct a target file from blocks found in local seed files.")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("help")
                .long("help")
                .short('h')
                .help("Show this help message and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .short('V')
                .help("Output version information and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase diagnostic output; repeat for more detail.")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .value_name("FLAG")
                .help("Set one diagnostic flag (table, index, scan, cli), e.g. scan2.")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("block-size")
                .long("block-size")
                .short('b')
                .value_name("SIZE")
                .help("Block size in bytes (default: chosen from the target length).")
                .value_parser(value_parser!(NonZeroU32)),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("FILE")
                .help("Write the reconstructed target to FILE.")
                .value_parser(OsStringValueParser::new()),
        )
        .arg(
            Arg::new("fetch")
                .long("fetch")
                .help("Copy blocks missing from every seed straight from TARGET.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("operands")
                .value_name("TARGET SEED")
                .help("Target file followed by zero or more seed files.")
                .value_parser(OsStringValueParser::new())
                .num_args(0..)
                .action(ArgAction::Append),
        )
}

/// Parses command-line arguments into a [`ParsedArgs`] structure.
pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from(PROGRAM_NAME));
    }

    let mut matches = clap_command().try_get_matches_from(args)?;

    let mut operands = matches
        .remove_many::<OsString>("operands")
        .map(|values| values.map(PathBuf::from).collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter();
    let target = operands.next();
    let seeds = operands.collect();

    Ok(ParsedArgs {
        show_help: matches.get_flag("help"),
        show_version: matches.get_flag("version"),
        verbosity: matches.get_count("verbose"),
        debug_flags: matches
            .remove_many::<String>("debug")
            .map(|values| values.collect())
            .unwrap_or_default(),
        block_size: matches.remove_one::<NonZeroU32>("block-size"),
        output: matches.remove_one::<OsString>("output").map(PathBuf::from),
        fetch: matches.get_flag("fetch"),
        target,
        seeds,
    })
}

/// Renders the help text.
pub(crate) fn render_help() -> String {
    clap_command()
        .override_usage(
            "rcksum [-v]... [--block-size SIZE] [--output FILE] [--fetch] TARGET [SEED]...",
        )
        .render_help()
        .to_string()
}
