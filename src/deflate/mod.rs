//! Concurrent in-place deflation of netCDF files.
//!
//! Deflation recompresses each file's variables with Lempel-Ziv compression
//! and converts the file to netCDF-4 format by running the external `ncks`
//! tool, one child process per file:
//!
//! 1. One [`DeflateJob`] is created per input file that exists; missing
//!    paths are silently skipped.
//! 2. Jobs are launched FIFO in input order until `max_concurrent_jobs`
//!    processes are running.
//! 3. A single coordinating task polls the running pool on a fixed
//!    interval; each exited job is completed (temp output renamed over the
//!    original on success) and its slot is refilled from the waiting queue.
//!
//! The coordinator itself is sequential; all real concurrency lives in the
//! child processes, so the pool structures need no locking. Per-file
//! failures are logged and do not abort the remaining jobs.

pub mod job;

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use crate::config::DeflateConfig;
use crate::error::Result;

pub use job::{DeflateJob, JobOutcome, JobPoll};

/// Deflate each of the netCDF files in `filepaths` in place, running at
/// most `max_concurrent_jobs` compression processes at a time.
///
/// Blocks until every job has completed. Each file ends up either replaced
/// by its deflated form (logged at info level) or untouched with the
/// compression tool's output logged at error level. There is no retry and
/// no structured per-file result; failures are isolated per file.
///
/// Paths that do not exist are skipped, and a path listed more than once
/// is deflated once: each job's temporary output path must be unique.
///
/// `max_concurrent_jobs` must be at least 1: with a bound of 0 no job is
/// ever launched and the call will not return while files are waiting.
pub async fn deflate(
    filepaths: &[PathBuf],
    max_concurrent_jobs: usize,
    config: &DeflateConfig,
) -> Result<()> {
    let mut seen = HashSet::new();
    let mut waiting: VecDeque<DeflateJob> = filepaths
        .iter()
        .filter(|fp| fp.exists() && seen.insert(*fp))
        .map(|fp| DeflateJob::new(fp.clone(), config.dfl_lvl))
        .collect();
    let mut running: HashMap<u32, DeflateJob> = HashMap::new();

    launch_jobs(&mut waiting, &mut running, max_concurrent_jobs, &config.tool)?;

    while !running.is_empty() || !waiting.is_empty() {
        tokio::time::sleep(config.poll_interval).await;

        let mut exited: Vec<(u32, ExitStatus)> = Vec::new();
        for (pid, job) in running.iter_mut() {
            if let JobPoll::Exited(status) = job.poll()? {
                exited.push((*pid, status));
            }
        }

        for (pid, status) in exited {
            if let Some(job) = running.remove(&pid) {
                let filepath = job.filepath().to_owned();
                match job.finish(status).await? {
                    JobOutcome::Succeeded => {
                        tracing::info!("netCDF4 deflated {}", filepath.display());
                    }
                    JobOutcome::Failed { output } => {
                        tracing::error!(filepath = %filepath.display(), "{}", output.trim_end());
                    }
                }
            }
            launch_jobs(&mut waiting, &mut running, max_concurrent_jobs, &config.tool)?;
        }
    }
    Ok(())
}

/// Launch jobs from the front of the waiting queue into free pool slots.
fn launch_jobs(
    waiting: &mut VecDeque<DeflateJob>,
    running: &mut HashMap<u32, DeflateJob>,
    max_concurrent_jobs: usize,
    tool: &Path,
) -> Result<()> {
    while running.len() < max_concurrent_jobs {
        let Some(mut job) = waiting.pop_front() else {
            break;
        };
        let pid = job.start(tool)?;
        running.insert(pid, job);
    }
    Ok(())
}
