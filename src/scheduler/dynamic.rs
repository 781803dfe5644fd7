// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::assembly::PixelBuffer;
use crate::comm::{Communicator, Source, Tag, TagFilter};
use crate::config::RenderConfig;
use crate::error::MandelError;
use crate::escape::Evaluator;
use crate::worker::{serve_columns, WorkerSummary};
use crate::workunit::{max_message_len, ReplyShape, Task};

use super::{Coordination, DispatchLog, Scheduler, Strategy};

/// A greedy work queue of single columns.  Each worker is seeded with
/// one column; whenever a column comes back, the worker that sent it
/// gets the next unassigned column, or STOP once there are none left.
/// A worker never holds more than one outstanding column, so faster
/// workers pull more of the image.
#[derive(Copy, Clone, Debug, Default)]
pub struct Dynamic;

impl Scheduler for Dynamic {
    fn strategy(&self) -> Strategy {
        Strategy::Dynamic
    }

    fn coordinate(
        &self,
        comm: &mut dyn Communicator,
        config: &RenderConfig,
    ) -> Result<Coordination, MandelError> {
        let mut log = DispatchLog::default();
        let mut image = PixelBuffer::new(config.edge);
        let mut inbox = vec![0; max_message_len(config.edge)];

        let workers = comm.size().saturating_sub(1);
        let mut next_column = 0;
        let mut active = 0;

        let seeded = workers.min(config.edge);
        for worker in 1..=seeded {
            log.assign(comm, worker, Task::Column(next_column))?;
            active += 1;
            next_column += 1;
        }
        // Workers beyond the last column have nothing to wait for.
        for worker in seeded + 1..=workers {
            log.stop(comm, worker)?;
        }

        while active > 0 {
            let status = comm.receive(&mut inbox, Source::Any, TagFilter::Only(Tag::Data))?;
            active -= 1;

            // Reply first, then copy the column out.
            if next_column < config.edge {
                log.assign(comm, status.source, Task::Column(next_column))?;
                active += 1;
                next_column += 1;
            } else {
                log.stop(comm, status.source)?;
            }

            let record = ReplyShape::PerColumn.decode(&inbox[..status.len], config.edge)?;
            image.place(&record)?;
            log.results += 1;
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
        serve_columns(comm, evaluator, ReplyShape::PerColumn)
    }
}
