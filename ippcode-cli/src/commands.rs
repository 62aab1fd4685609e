//! CLI command implementation.

use crate::options::Options;
use crate::stats::write_stats;
use tracing::info;

/// Load, execute and optionally write statistics.
///
/// Errors are reported on stderr; the returned code is the process exit
/// status.
pub fn run(options: &Options) -> Result<(), i32> {
    let program = ippcode_loader::load_file(&options.source).map_err(|e| {
        eprintln!("error: {e}");
        e.exit_code()
    })?;
    info!(
        source = %options.source.display(),
        instructions = program.len(),
        "executing program"
    );

    let stats = ippcode_vm::run(&program).map_err(|e| {
        eprintln!("runtime error: {e}");
        e.exit_code()
    })?;

    if let Some(request) = &options.stats {
        write_stats(request, &stats).map_err(|e| {
            eprintln!(
                "error: cannot write statistics to '{}': {e}",
                request.path.display()
            );
            11
        })?;
    }
    Ok(())
}
