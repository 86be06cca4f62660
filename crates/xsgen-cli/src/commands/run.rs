use crate::cli::RunArgs;
use crate::config::{CaseConfig, PartialCaseConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;
use xsgen::core::models::ids::format_xs_ids;
use xsgen::engine::backend::command::ExternalCommandBackend;
use xsgen::engine::progress::ProgressReporter;
use xsgen::workflows::operate::{self, RunSummary};

pub fn run(args: RunArgs) -> Result<()> {
    let partial_config = PartialCaseConfig::from_file(&args.config)?;
    let base_dir = args.config.parent().unwrap_or(Path::new("."));
    info!("Merging case file and CLI arguments...");
    let case = partial_config.merge_with_cli(&args, base_dir)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting case '{}' ({} cycle(s), {} node(s) per cycle)...",
        case.setup.name,
        case.setup.n_cycles,
        case.setup.burn_steps + 1
    );
    let summary = execute(&case, &reporter)?;
    progress_handler.finish();

    print!("{}", render_summary(&summary));
    Ok(())
}

fn execute(case: &CaseConfig, reporter: &ProgressReporter) -> Result<RunSummary> {
    let backend = Box::new(ExternalCommandBackend::new(case.executable.clone()));
    if case.parallel {
        return Ok(operate::run(&case.setup, backend, reporter)?);
    }
    info!("Parallel lattice physics jobs are disabled; running them one at a time.");
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to build thread pool: {}", e)))?;
    Ok(pool.install(|| operate::run(&case.setup, backend, reporter))?)
}

fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    for step in &summary.steps {
        if let Some(ids) = step.outcome.update().and_then(|u| u.regenerated()) {
            let _ = writeln!(
                out,
                "  cycle {} node {} iteration {}: generated {}",
                step.cycle,
                step.time_node,
                step.iteration,
                format_xs_ids(ids)
            );
        }
    }
    match &summary.final_library {
        Some(library) => {
            let _ = writeln!(
                out,
                "✓ Run complete: {} XS ID(s) generated; library `{}` holds {}.",
                summary.regenerations(),
                library.name(),
                format_xs_ids(library.xs_ids())
            );
        }
        None => {
            let _ = writeln!(
                out,
                "✓ Run complete: {} XS ID(s) generated; no library is attached.",
                summary.regenerations()
            );
        }
    }
    out
}
