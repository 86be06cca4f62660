use super::backend::{LatticeJob, LatticePhysicsBackend};
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::library::xs_library::{XsData, XsLibrary};
use crate::core::models::ids::XsId;
use tracing::{error, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

type JobResult = (XsId, Result<XsData, String>);

/// Runs every job and merges the results into one library.
///
/// All jobs run to completion before anything is merged. If any job fails or returns
/// a library without an entry for its identifier, no library is returned and the error
/// names every failing identifier.
#[instrument(skip_all, name = "lattice_jobs", fields(jobs = jobs.len()))]
pub fn run_jobs(
    backend: &dyn LatticePhysicsBackend,
    jobs: &[LatticeJob],
    reporter: &ProgressReporter,
) -> Result<XsLibrary, EngineError> {
    info!(
        "Running {} lattice physics calculation(s) with backend '{}'.",
        jobs.len(),
        backend.name()
    );
    reporter.report(Progress::JobsStart {
        xs_ids: jobs.iter().map(|job| job.xs_id.clone()).collect(),
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = jobs.iter();

    #[cfg(feature = "parallel")]
    let iterator = jobs.par_iter();

    let results: Vec<JobResult> = iterator
        .map(|job| {
            let result = run_one(backend, job);
            reporter.report(Progress::JobFinished {
                xs_id: job.xs_id.clone(),
                succeeded: result.is_ok(),
            });
            (job.xs_id.clone(), result)
        })
        .collect();

    reporter.report(Progress::JobsFinish);

    let mut merged = XsLibrary::new("");
    let mut failures: Vec<(XsId, String)> = Vec::new();
    for (xs_id, result) in results {
        match result {
            Ok(data) => {
                merged.insert(xs_id, data);
            }
            Err(reason) => failures.push((xs_id, reason)),
        }
    }

    if failures.is_empty() {
        return Ok(merged);
    }

    failures.sort_by(|a, b| a.0.cmp(&b.0));
    for (xs_id, reason) in &failures {
        error!(xs_id = %xs_id, "Lattice physics calculation failed: {}", reason);
    }
    let reason = failures
        .iter()
        .map(|(xs_id, reason)| format!("{}: {}", xs_id, reason))
        .collect::<Vec<_>>()
        .join("; ");
    Err(EngineError::ExternalCalculation {
        xs_ids: failures.into_iter().map(|(xs_id, _)| xs_id).collect(),
        reason,
    })
}

/// Only the requested identifier is taken from a job's output.
fn run_one(backend: &dyn LatticePhysicsBackend, job: &LatticeJob) -> Result<XsData, String> {
    let library = backend.compute(job).map_err(|e| e.to_string())?;
    library.get(&job.xs_id).cloned().ok_or_else(|| {
        format!(
            "output library has no cross sections for XS ID {}",
            job.xs_id
        )
    })
}
