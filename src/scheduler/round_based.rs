// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::assembly::PixelBuffer;
use crate::comm::Communicator;
use crate::config::RenderConfig;
use crate::error::MandelError;
use crate::escape::Evaluator;
use crate::worker::{serve_columns, WorkerSummary};
use crate::workunit::{ReplyShape, Task};

use super::{collect, Coordination, DispatchLog, Scheduler, Strategy};

/// Columns are dealt like cards: in round `r`, worker `i` gets column
/// `r * W + (i - 1)`.  A round's pixels are all collected before the
/// next round is dealt.  Results come back one pixel per message, and
/// every worker is stopped once the last round is in.
#[derive(Copy, Clone, Debug, Default)]
pub struct StaticRoundBased;

impl Scheduler for StaticRoundBased {
    fn strategy(&self) -> Strategy {
        Strategy::StaticRoundBased
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
        let mut next_column = 0;
        while workers > 0 && next_column < config.edge {
            let mut dealt = 0;
            for worker in 1..=workers {
                if next_column >= config.edge {
                    break;
                }
                log.assign(comm, worker, Task::Column(next_column))?;
                next_column += 1;
                dealt += 1;
            }

            for _ in 0..dealt * config.edge {
                collect(comm, &mut inbox, ReplyShape::PerPixel, &mut image, &mut log)?;
            }
            trace!("round complete, {} column(s) left", config.edge - next_column);
        }

        for worker in 1..=workers {
            log.stop(comm, worker)?;
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
        serve_columns(comm, evaluator, ReplyShape::PerPixel)
    }
}
