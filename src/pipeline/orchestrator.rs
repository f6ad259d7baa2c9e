// 全ジョブ実行

use rayon::prelude::*;
use tracing::warn;

use crate::pipeline::job_runner::{JobConfig, JobResult, run_job};

/// Run multiple jobs in parallel, collecting results in input order.
/// One job failure does NOT prevent other jobs from running.
///
/// `parallel_workers == 0` uses rayon's global pool.
pub fn run_all_jobs(
    jobs: &[JobConfig],
    parallel_workers: usize,
) -> Vec<crate::error::Result<JobResult>> {
    let run = || -> Vec<crate::error::Result<JobResult>> {
        jobs.par_iter().map(run_job).collect()
    };

    if parallel_workers == 0 {
        return run();
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(parallel_workers)
        .build()
    {
        Ok(pool) => pool.install(run),
        Err(e) => {
            warn!("failed to build a {parallel_workers}-thread pool, using the global pool: {e}");
            run()
        }
    }
}
