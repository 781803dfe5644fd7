// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::assembly::PixelBuffer;
use crate::comm::Communicator;
use crate::config::RenderConfig;
use crate::error::MandelError;
use crate::escape::Evaluator;
use crate::worker::{serve_range, WorkerSummary};
use crate::workunit::{ReplyShape, Task};

use super::{collect, partition_columns, Coordination, DispatchLog, Scheduler, Strategy};

/// Every worker gets one contiguous range of columns before anything
/// is computed, and nothing else afterwards.  Results come back one
/// pixel per message.  No STOP is needed: a worker is done once its
/// range is sent.
#[derive(Copy, Clone, Debug, Default)]
pub struct StaticFull;

impl Scheduler for StaticFull {
    fn strategy(&self) -> Strategy {
        Strategy::StaticFull
    }

    fn coordinate(
        &self,
        comm: &mut dyn Communicator,
        config: &RenderConfig,
    ) -> Result<Coordination, MandelError> {
        let mut log = DispatchLog::default();
        let mut image = PixelBuffer::new(config.edge);
        let mut inbox = [0; 3];

        let workers = comm.size().saturating_sub(1);
        for (i, range) in partition_columns(config.edge, workers).into_iter().enumerate() {
            log.assign(comm, i + 1, Task::Columns(range))?;
        }

        for _ in 0..config.pixel_count() {
            collect(comm, &mut inbox, ReplyShape::PerPixel, &mut image, &mut log)?;
        }

        Ok(Coordination {
            pixels: image.finish()?,
            dispatch: log,
        })
    }

    fn work(
        &self,
        comm: &mut dyn Communicator,
        evaluator: &Evaluator,
    ) -> Result<WorkerSummary, MandelError> {
        serve_range(comm, evaluator)
    }
}
