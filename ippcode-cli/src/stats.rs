//! Statistics file output.

use crate::options::{StatSelector, StatsRequest};
use ippcode_vm::ExecutionStats;
use std::fs;
use std::io;

/// One line per selected counter, in selector order.
pub fn render(selectors: &[StatSelector], stats: &ExecutionStats) -> String {
    selectors
        .iter()
        .map(|selector| match selector {
            StatSelector::Insts => format!("{}\n", stats.executed),
            StatSelector::Vars => format!("{}\n", stats.max_live_variables),
        })
        .collect()
}

/// Write the requested counters, replacing any existing file.
pub fn write_stats(request: &StatsRequest, stats: &ExecutionStats) -> io::Result<()> {
    fs::write(&request.path, render(&request.selectors, stats))
}
