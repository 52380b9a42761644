//! Fans probe jobs out over a worker pool and collects every result.
//!
//! There is one dispatch path. A pool as large as the job list is the
//! unbounded fan-out; anything smaller is a bounded pool.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};
use usrlinks_model::{EndpointDescriptor, ScanResult};

use crate::probe::ProbeContext;

/// Requested pool size for one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    /// One worker per endpoint.
    Unbounded,
    /// At most this many workers. Never zero.
    Bounded(usize),
}

impl Parallelism {
    /// `0` means unbounded.
    pub fn from_count(count: usize) -> Self {
        if count == 0 {
            Parallelism::Unbounded
        } else {
            Parallelism::Bounded(count)
        }
    }

    pub fn workers_for(self, jobs: usize) -> usize {
        match self {
            Parallelism::Unbounded => jobs,
            Parallelism::Bounded(limit) => limit.min(jobs),
        }
    }
}

/// One (handle, endpoint) pair. The context carries the handle.
#[derive(Debug, Clone)]
pub struct ProbeJob {
    pub context: Arc<ProbeContext>,
    pub descriptor: Arc<EndpointDescriptor>,
}

/// A finished job, tagged with the handle it probed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub handle: Arc<str>,
    pub result: ScanResult,
}

/// Probes every descriptor for the context's handle and returns exactly
/// one result per descriptor, in completion order.
pub async fn run_probes(
    context: Arc<ProbeContext>,
    descriptors: Vec<Arc<EndpointDescriptor>>,
    parallelism: Parallelism,
) -> Vec<ScanResult> {
    let jobs = descriptors
        .into_iter()
        .map(|descriptor| ProbeJob {
            context: Arc::clone(&context),
            descriptor,
        })
        .collect();
    run_jobs(jobs, parallelism)
        .await
        .into_iter()
        .map(|outcome| outcome.result)
        .collect()
}

/// Runs an arbitrary job list, possibly spanning several handles, through
/// one pool. Every job yields exactly one outcome.
pub async fn run_jobs(
    jobs: Vec<ProbeJob>,
    parallelism: Parallelism,
) -> Vec<ProbeOutcome> {
    let job_count = jobs.len();
    if job_count == 0 {
        return Vec::new();
    }

    let (job_tx, job_rx) = mpsc::channel::<ProbeJob>(job_count);
    let (result_tx, mut result_rx) = mpsc::channel::<ProbeOutcome>(job_count);

    // The queue holds every job, so none of these sends can wait.
    for job in &jobs {
        if job_tx.send(job.clone()).await.is_err() {
            break;
        }
    }
    drop(job_tx);

    let workers = parallelism.workers_for(job_count);
    debug!(jobs = job_count, workers, "dispatching probes");

    let job_rx = Arc::new(Mutex::new(job_rx));
    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let job_rx = Arc::clone(&job_rx);
        let result_tx = result_tx.clone();
        handles.push(tokio::spawn(async move {
            loop {
                let job = {
                    let mut guard = job_rx.lock().await;
                    guard.recv().await
                };
                let Some(job) = job else { break };
                let outcome = ProbeOutcome {
                    handle: Arc::clone(&job.context.handle),
                    result: job.context.probe(&job.descriptor).await,
                };
                if result_tx.send(outcome).await.is_err() {
                    warn!(worker_id, "result channel closed early");
                    break;
                }
            }
        }));
    }
    drop(result_tx);

    for handle in handles {
        if let Err(err) = handle.await {
            warn!("probe worker ended abnormally: {err}");
        }
    }

    let mut outcomes = Vec::with_capacity(job_count);
    while let Some(outcome) = result_rx.recv().await {
        outcomes.push(outcome);
    }

    backfill_missing(outcomes, &jobs)
}

/// A worker that dies mid-job loses that job's result. Every job still
/// gets exactly one entry.
fn backfill_missing(
    mut outcomes: Vec<ProbeOutcome>,
    jobs: &[ProbeJob],
) -> Vec<ProbeOutcome> {
    if outcomes.len() == jobs.len() {
        return outcomes;
    }

    let seen: HashSet<(Arc<str>, String)> = outcomes
        .iter()
        .map(|outcome| {
            (Arc::clone(&outcome.handle), outcome.result.platform.clone())
        })
        .collect();
    for job in jobs {
        let handle = &job.context.handle;
        let key = (Arc::clone(handle), job.descriptor.name.clone());
        if !seen.contains(&key) {
            warn!(
                platform = %job.descriptor.name,
                handle = %handle,
                "probe lost, marking indeterminate"
            );
            outcomes.push(ProbeOutcome {
                handle: Arc::clone(handle),
                result: ScanResult::indeterminate(
                    job.descriptor.name.clone(),
                    job.descriptor.resolve_url(handle),
                    "probe task aborted",
                ),
            });
        }
    }
    outcomes
}
