//! Command-line options.
//!
//! `--insts` and `--vars` are order-sensitive: the statistics file lists
//! the selected counters in the order the flags appear. Each may be given
//! at most once and only together with `--stats`.

use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "ippcode")]
#[command(about = "Interpret an IPPcode18 program stored in XML")]
#[command(version)]
struct Cli {
    /// XML representation of the program to run
    #[arg(long, value_name = "FILE")]
    source: PathBuf,

    /// Write execution statistics to this file after a successful run
    #[arg(long, value_name = "FILE")]
    stats: Option<PathBuf>,

    /// Report the number of executed instructions
    #[arg(long, action = ArgAction::Count, requires = "stats")]
    insts: u8,

    /// Report the peak number of declared variables
    #[arg(long, action = ArgAction::Count, requires = "stats")]
    vars: u8,
}

/// One counter in the statistics file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatSelector {
    /// Executed instructions.
    Insts,
    /// Peak number of declared variables.
    Vars,
}

impl StatSelector {
    fn id(&self) -> &'static str {
        match self {
            StatSelector::Insts => "insts",
            StatSelector::Vars => "vars",
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            StatSelector::Insts => "--insts",
            StatSelector::Vars => "--vars",
        }
    }
}

/// Where to write statistics and which counters, in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRequest {
    pub path: PathBuf,
    pub selectors: Vec<StatSelector>,
}

/// Validated command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub source: PathBuf,
    pub stats: Option<StatsRequest>,
}

/// Errors from command-line parsing.
#[derive(Error, Debug)]
pub enum OptionsError {
    /// Rejected by the argument parser, or a request for help/version.
    #[error(transparent)]
    Clap(#[from] clap::Error),

    /// A statistics selector appeared more than once.
    #[error("{0} may be given only once")]
    RepeatedSelector(&'static str),
}

impl OptionsError {
    /// Process exit code: 0 for `--help`/`--version`, 10 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            OptionsError::Clap(err) if !err.use_stderr() => 0,
            _ => 10,
        }
    }
}

/// Parse `args` (including the program name) into [`Options`].
pub fn parse_options<I, T>(args: I) -> Result<Options, OptionsError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Cli::command().try_get_matches_from(args)?;
    let cli = Cli::from_arg_matches(&matches)?;

    let counts = [(cli.insts, StatSelector::Insts), (cli.vars, StatSelector::Vars)];
    if let Some(&(_, selector)) = counts.iter().find(|&&(count, _)| count > 1) {
        return Err(OptionsError::RepeatedSelector(selector.flag()));
    }

    let given = counts
        .into_iter()
        .filter(|&(count, _)| count > 0)
        .map(|(_, selector)| selector);
    let stats = cli.stats.map(|path| StatsRequest {
        path,
        selectors: in_command_line_order(&matches, given),
    });

    Ok(Options {
        source: cli.source,
        stats,
    })
}

fn in_command_line_order(
    matches: &ArgMatches,
    selectors: impl Iterator<Item = StatSelector>,
) -> Vec<StatSelector> {
    let mut found: Vec<(usize, StatSelector)> = selectors
        .map(|selector| (matches.index_of(selector.id()).unwrap_or(usize::MAX), selector))
        .collect();
    found.sort_by_key(|&(index, _)| index);
    found.into_iter().map(|(_, selector)| selector).collect()
}
