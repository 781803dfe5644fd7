// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! What the worker ranks run.
//!
//! Workers never see the image.  They take tasks from the coordinator,
//! compute every pixel the task covers with their own
//! [`Evaluator`](../escape/struct.Evaluator.html), and send the values
//! back.

use crate::comm::{Communicator, Rank, Source, Tag, TagFilter, COORDINATOR};
use crate::error::{MandelError, WireError};
use crate::escape::Evaluator;
use crate::workunit::{max_message_len, ReplyShape, ResultRecord, Task};

/// What a worker did during a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkerSummary {
    /// The worker's rank.
    pub rank: Rank,
    /// Columns computed.
    pub columns: usize,
    /// DATA messages sent.
    pub messages: usize,
}

/// Receives exactly one column range, sends every pixel in it as its
/// own message, and returns.
pub fn serve_range(
    comm: &mut dyn Communicator,
    evaluator: &Evaluator,
) -> Result<WorkerSummary, MandelError> {
    let mut summary = WorkerSummary {
        rank: comm.rank(),
        ..WorkerSummary::default()
    };
    let mut inbox = [0; 2];
    let status = comm.receive(
        &mut inbox,
        Source::Rank(COORDINATOR),
        TagFilter::Only(Tag::Info),
    )?;
    let columns = Task::decode_range(&inbox[..status.len])?.columns();
    debug!("worker {} computing columns {:?}", summary.rank, columns);

    for (row, column) in iproduct!(0..evaluator.edge(), columns.clone()) {
        let record = ResultRecord::Pixel {
            row,
            column,
            value: evaluator.pixel(column, row),
        };
        comm.send(&record.encode()?, COORDINATOR, Tag::Data)?;
        summary.messages += 1;
    }
    summary.columns = columns.len();
    Ok(summary)
}

/// Answers single-column tasks until told to stop.  Each column goes
/// back in `shape`: as one message, or as one message per pixel.
pub fn serve_columns(
    comm: &mut dyn Communicator,
    evaluator: &Evaluator,
    shape: ReplyShape,
) -> Result<WorkerSummary, MandelError> {
    let mut summary = WorkerSummary {
        rank: comm.rank(),
        ..WorkerSummary::default()
    };
    let mut inbox = vec![0; max_message_len(evaluator.edge())];

    loop {
        let status = comm.receive(&mut inbox, Source::Rank(COORDINATOR), TagFilter::Any)?;
        let column = match status.tag {
            Tag::Stop => break,
            Tag::Info => Task::decode_column(&inbox[..status.len])?.columns().start,
            Tag::Data => {
                return Err(WireError::UnexpectedTag {
                    tag: status.tag,
                    source: status.source,
                }
                .into())
            }
        };
        trace!("worker {} computing column {}", summary.rank, column);

        let values = evaluator.column(column);
        match shape {
            ReplyShape::PerColumn => {
                let record = ResultRecord::Column { column, values };
                comm.send(&record.encode()?, COORDINATOR, Tag::Data)?;
                summary.messages += 1;
            }
            ReplyShape::PerPixel => {
                for (row, value) in values.into_iter().enumerate() {
                    let record = ResultRecord::Pixel { row, column, value };
                    comm.send(&record.encode()?, COORDINATOR, Tag::Data)?;
                    summary.messages += 1;
                }
            }
        }
        summary.columns += 1;
    }

    debug!(
        "worker {} stopping after {} column(s)",
        summary.rank, summary.columns
    );
    Ok(summary)
}
