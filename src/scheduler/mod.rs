// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Work distribution.
//!
//! A scheduler decides how the columns of the image are handed to the
//! worker ranks and how their results come back.  Every scheduler has
//! two halves: `coordinate`, run by rank 0, which owns the image, and
//! `work`, run by every other rank.  The strategies differ in load
//! balance and in message count, never in the pixels they produce.
//!
//! * [`StaticFull`](struct.StaticFull.html): one contiguous range of
//!   columns per worker, sent up front.
//! * [`StaticRoundBased`](struct.StaticRoundBased.html): one column per
//!   worker per round, each round collected before the next is dealt.
//! * [`Dynamic`](struct.Dynamic.html): one column at a time to whoever
//!   reports back first.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::assembly::PixelBuffer;
use crate::comm::{Communicator, Rank, Source, Tag, TagFilter};
use crate::config::RenderConfig;
use crate::error::MandelError;
use crate::escape::Evaluator;
use crate::worker::WorkerSummary;
use crate::workunit::{ReplyShape, Task, STOP_SENTINEL};

mod dynamic;
mod round_based;
mod static_full;

pub use self::dynamic::Dynamic;
pub use self::round_based::StaticRoundBased;
pub use self::static_full::StaticFull;

/// The names accepted by `Strategy::from_str`.
pub const STRATEGY_NAMES: [&str; 4] = ["static", "round", "dynamic", "sequential"];

/// The ways a render can be carried out.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Contiguous column ranges, one per worker, assigned once.
    StaticFull,
    /// Single columns dealt to every worker in rounds.
    StaticRoundBased,
    /// Single columns handed to whichever worker is free.
    Dynamic,
    /// No workers at all; the calling thread renders everything.
    Sequential,
}

impl Strategy {
    /// The scheduler implementing this strategy, or `None` for the
    /// sequential render, which has no group to schedule.
    pub fn scheduler(self) -> Option<Box<dyn Scheduler>> {
        match self {
            Strategy::StaticFull => Some(Box::new(StaticFull)),
            Strategy::StaticRoundBased => Some(Box::new(StaticRoundBased)),
            Strategy::Dynamic => Some(Box::new(Dynamic)),
            Strategy::Sequential => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Strategy::StaticFull => "Static",
            Strategy::StaticRoundBased => "Static-Round",
            Strategy::Dynamic => "Dynamic",
            Strategy::Sequential => "Sequential",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" | "static-full" => Ok(Strategy::StaticFull),
            "round" | "static-round" | "round-based" => Ok(Strategy::StaticRoundBased),
            "dynamic" => Ok(Strategy::Dynamic),
            "sequential" => Ok(Strategy::Sequential),
            other => Err(format!(
                "Unknown strategy '{}', expected one of {}",
                other,
                STRATEGY_NAMES.join(", ")
            )),
        }
    }
}

/// Both halves of a distribution strategy.
pub trait Scheduler: Send + Sync {
    /// Which strategy this is.
    fn strategy(&self) -> Strategy;

    /// Rank 0: hand out every column, collect every result, and return
    /// the finished image.
    fn coordinate(
        &self,
        comm: &mut dyn Communicator,
        config: &RenderConfig,
    ) -> Result<Coordination, MandelError>;

    /// Every other rank: compute whatever the coordinator asks for.
    fn work(
        &self,
        comm: &mut dyn Communicator,
        evaluator: &Evaluator,
    ) -> Result<WorkerSummary, MandelError>;
}

/// What the coordinator hands back once every result is in.
#[derive(Clone, Debug)]
pub struct Coordination {
    /// The complete image, row-major.
    pub pixels: Vec<u8>,
    /// Every INFO and STOP the coordinator sent.
    pub dispatch: DispatchLog,
}

/// A task sent to a worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// The worker it went to.
    pub worker: Rank,
    /// What it was asked to do.
    pub task: Task,
}

/// The coordinator's record of what it sent to whom.  All INFO and
/// STOP messages go through here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DispatchLog {
    /// INFO messages, in the order they were sent.
    pub assignments: Vec<Assignment>,
    /// Ranks sent STOP, in the order they were sent.
    pub stops: Vec<Rank>,
    /// DATA messages received.
    pub results: usize,
}

impl DispatchLog {
    /// Send `task` to `worker` under INFO.
    pub fn assign(
        &mut self,
        comm: &dyn Communicator,
        worker: Rank,
        task: Task,
    ) -> Result<(), MandelError> {
        comm.send(&task.encode()?, worker, Tag::Info)?;
        debug!("assigned {:?} to worker {}", task, worker);
        self.assignments.push(Assignment { worker, task });
        Ok(())
    }

    /// Tell `worker` to stop.
    pub fn stop(&mut self, comm: &dyn Communicator, worker: Rank) -> Result<(), MandelError> {
        comm.send(&[STOP_SENTINEL], worker, Tag::Stop)?;
        debug!("stopped worker {}", worker);
        self.stops.push(worker);
        Ok(())
    }

    /// Every column assigned, in assignment order, with repeats if a
    /// column were ever assigned twice.
    pub fn columns_assigned(&self) -> Vec<usize> {
        self.assignments
            .iter()
            .flat_map(|a| a.task.columns())
            .collect()
    }

    /// How many columns each worker was given.
    pub fn columns_per_worker(&self) -> BTreeMap<Rank, usize> {
        let mut counts = BTreeMap::new();
        for assignment in &self.assignments {
            *counts.entry(assignment.worker).or_insert(0) += assignment.task.columns().len();
        }
        counts
    }
}

/// Split `edge` columns into `workers` contiguous ranges of
/// `ceil(edge / workers)` columns.  Only the tail is short: the last
/// non-empty range takes the remainder and any ranges beyond it are
/// empty at `edge..edge`.
pub fn partition_columns(edge: usize, workers: usize) -> Vec<Range<usize>> {
    if workers == 0 {
        return Vec::new();
    }
    let task_size = (edge + workers - 1) / workers;
    (0..workers)
        .map(|i| {
            let start = (i * task_size).min(edge);
            let end = (start + task_size).min(edge);
            start..end
        })
        .collect()
}

/// Block for the next DATA message from any worker, decode it as
/// `shape`, and write it into `image`.  Returns the sender.
fn collect(
    comm: &mut dyn Communicator,
    inbox: &mut [i32],
    shape: ReplyShape,
    image: &mut PixelBuffer,
    log: &mut DispatchLog,
) -> Result<Rank, MandelError> {
    let status = comm.receive(inbox, Source::Any, TagFilter::Only(Tag::Data))?;
    let record = shape.decode(&inbox[..status.len], image.edge())?;
    image.place(&record)?;
    log.results += 1;
    Ok(status.source)
}
