// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Starting a run.
//!
//! One thread plays each rank: rank 0 coordinates on the calling
//! thread and every other rank runs on a scoped worker thread.  A rank
//! that fails aborts the group so that nobody is left waiting for a
//! message that will never come.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::comm::{group, Communicator, Rank, COORDINATOR};
use crate::config::RenderConfig;
use crate::error::{ConfigError, MandelError};
use crate::escape::Evaluator;
use crate::scheduler::{DispatchLog, Strategy};
use crate::worker::WorkerSummary;

/// The outcome of a successful run.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// How the image was distributed.
    pub strategy: Strategy,
    /// Number of worker ranks, coordinator excluded.
    pub workers: usize,
    /// Wall-clock time from first assignment to last result.
    pub elapsed: Duration,
    /// The image, row-major, one byte per pixel.
    pub pixels: Vec<u8>,
    /// Everything the coordinator sent.
    pub dispatch: DispatchLog,
    /// What each worker did, in rank order.
    pub summaries: Vec<WorkerSummary>,
}

impl RunReport {
    /// Columns computed by each worker.
    pub fn columns_per_worker(&self) -> BTreeMap<Rank, usize> {
        self.dispatch.columns_per_worker()
    }
}

/// Reject groups without a worker.
pub fn check_processes(processes: usize) -> Result<(), ConfigError> {
    if processes < 2 {
        return Err(ConfigError::TooFewProcesses { processes });
    }
    Ok(())
}

/// Render `config` with `processes` ranks (coordinator included) using
/// `strategy`.  The sequential strategy ignores `processes`.
pub fn render(
    strategy: Strategy,
    processes: usize,
    config: &RenderConfig,
) -> Result<RunReport, MandelError> {
    config.validate()?;
    if strategy == Strategy::Sequential {
        return Ok(render_sequential(config));
    }
    check_processes(processes)?;
    render_with(strategy, group(processes), config)
}

/// Render the whole image on the calling thread.
pub fn render_sequential(config: &RenderConfig) -> RunReport {
    info!("rendering {0}x{0} sequentially", config.edge);
    let started = Instant::now();
    let pixels = Evaluator::new(config).render();
    RunReport {
        strategy: Strategy::Sequential,
        workers: 0,
        elapsed: started.elapsed(),
        pixels,
        dispatch: DispatchLog::default(),
        summaries: Vec::new(),
    }
}

/// Render over an existing group.  `endpoints[i]` plays rank `i`.
pub fn render_with<C>(
    strategy: Strategy,
    endpoints: Vec<C>,
    config: &RenderConfig,
) -> Result<RunReport, MandelError>
where
    C: Communicator + Send,
{
    config.validate()?;
    check_processes(endpoints.len())?;
    let scheduler = match strategy.scheduler() {
        Some(scheduler) => scheduler,
        None => return Ok(render_sequential(config)),
    };
    let workers = endpoints.len() - 1;
    let evaluator = Evaluator::new(config);
    info!(
        "rendering {0}x{0} with the {1} strategy across {2} worker(s)",
        config.edge, strategy, workers
    );

    let started = Instant::now();
    let scheduler = &*scheduler;
    let evaluator = &evaluator;
    let mut ranks = endpoints.into_iter();
    let coordinator = ranks.next();

    let (coordination, outcomes) = crossbeam::scope(move |spawner| {
        let handles: Vec<_> = ranks
            .map(|mut endpoint| {
                spawner.spawn(move |_| {
                    let outcome = scheduler.work(&mut endpoint, evaluator);
                    if let Err(ref e) = outcome {
                        if !e.is_abort() {
                            error!("worker {} failed: {}", endpoint.rank(), e);
                        }
                        endpoint.abort();
                    }
                    outcome
                })
            })
            .collect();

        let coordination = match coordinator {
            Some(mut endpoint) => {
                let coordination = scheduler.coordinate(&mut endpoint, config);
                if coordination.is_err() {
                    endpoint.abort();
                }
                coordination
            }
            None => Err(ConfigError::TooFewProcesses { processes: 0 }.into()),
        };

        let outcomes: Vec<Result<WorkerSummary, MandelError>> = handles
            .into_iter()
            .enumerate()
            .map(|(i, handle)| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(MandelError::RankPanicked { rank: i + 1 }))
            })
            .collect();
        (coordination, outcomes)
    })
    .map_err(|_| MandelError::RankPanicked { rank: COORDINATOR })?;

    let mut failures = Vec::new();
    let mut summaries = Vec::with_capacity(workers);
    let coordination = match coordination {
        Ok(coordination) => Some(coordination),
        Err(e) => {
            failures.push(e);
            None
        }
    };
    for outcome in outcomes {
        match outcome {
            Ok(summary) => summaries.push(summary),
            Err(e) => failures.push(e),
        }
    }

    match (coordination, root_cause(failures)) {
        (_, Some(e)) => Err(e),
        (Some(coordination), None) => {
            let elapsed = started.elapsed();
            info!("{} finished in {:?}", strategy, elapsed);
            Ok(RunReport {
                strategy,
                workers,
                elapsed,
                pixels: coordination.pixels,
                dispatch: coordination.dispatch,
                summaries,
            })
        }
        (None, None) => Err(MandelError::RankPanicked { rank: COORDINATOR }),
    }
}

/// When one rank fails the others see the abort; report the failure
/// that started it.
fn root_cause(mut failures: Vec<MandelError>) -> Option<MandelError> {
    if failures.is_empty() {
        return None;
    }
    let position = failures.iter().position(|e| !e.is_abort()).unwrap_or(0);
    Some(failures.swap_remove(position))
}
