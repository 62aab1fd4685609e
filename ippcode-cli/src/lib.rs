//! IPPcode18 interpreter front end: options, statistics output and the
//! top-level run command.

pub mod commands;
pub mod logging;
pub mod options;
pub mod stats;

pub use options::{parse_options, Options, OptionsError, StatSelector, StatsRequest};
