// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Work units and the shape they take on the wire.
//!
//! Every message is a flat run of `i32` values:
//!
//! | Message              | Tag  | Payload                          |
//! |----------------------|------|----------------------------------|
//! | column range task    | INFO | `start, end` (half open)         |
//! | single column task   | INFO | `column`                         |
//! | pixel result         | DATA | `row, column, value`             |
//! | column result        | DATA | `column, value_0 .. value_{E-1}` |
//! | termination          | STOP | `-1`                             |

use std::convert::TryFrom;
use std::ops::Range;

use crate::error::WireError;

/// Payload of a STOP message.  Only the tag is authoritative.
pub const STOP_SENTINEL: i32 = -1;

/// Largest payload any message carries for an image of `edge` pixels:
/// a column result.
pub fn max_message_len(edge: usize) -> usize {
    edge + 1
}

/// A unit of assignable work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    /// Every column in the half-open range, all rows.
    Columns(Range<usize>),
    /// One column, all rows.
    Column(usize),
}

impl Task {
    /// The columns this task covers.
    pub fn columns(&self) -> Range<usize> {
        match self {
            Task::Columns(range) => range.clone(),
            Task::Column(column) => *column..*column + 1,
        }
    }

    /// Flatten for sending.
    pub fn encode(&self) -> Result<Vec<i32>, WireError> {
        match self {
            Task::Columns(range) => Ok(vec![
                to_wire("start column", range.start)?,
                to_wire("end column", range.end)?,
            ]),
            Task::Column(column) => Ok(vec![to_wire("column", *column)?]),
        }
    }

    /// Read a range task.
    pub fn decode_range(payload: &[i32]) -> Result<Task, WireError> {
        expect_len("column range", payload, 2)?;
        let start = from_wire("start column", payload[0])?;
        let end = from_wire("end column", payload[1])?;
        if end < start {
            return Err(WireError::OutOfRange {
                field: "end column",
                value: i64::from(payload[1]),
            });
        }
        Ok(Task::Columns(start..end))
    }

    /// Read a single-column task.
    pub fn decode_column(payload: &[i32]) -> Result<Task, WireError> {
        expect_len("column", payload, 1)?;
        Ok(Task::Column(from_wire("column", payload[0])?))
    }
}

/// How a worker reports what it computed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReplyShape {
    /// One message per pixel.
    PerPixel,
    /// One message per column.
    PerColumn,
}

impl ReplyShape {
    /// Interpret a DATA payload of this shape.  Shapes are not
    /// self-describing (a column of a two pixel image is as long as a
    /// pixel result), so the receiver has to know what to expect.
    pub fn decode(self, payload: &[i32], edge: usize) -> Result<ResultRecord, WireError> {
        match self {
            ReplyShape::PerPixel => {
                expect_len("pixel result", payload, 3)?;
                Ok(ResultRecord::Pixel {
                    row: from_wire("row", payload[0])?,
                    column: from_wire("column", payload[1])?,
                    value: colour(payload[2])?,
                })
            }
            ReplyShape::PerColumn => {
                expect_len("column result", payload, edge + 1)?;
                let values = payload[1..]
                    .iter()
                    .map(|v| colour(*v))
                    .collect::<Result<Vec<u8>, WireError>>()?;
                Ok(ResultRecord::Column {
                    column: from_wire("column", payload[0])?,
                    values,
                })
            }
        }
    }
}

/// A result travelling from a worker to the coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultRecord {
    /// One pixel at explicit coordinates.
    Pixel {
        /// Row of the pixel.
        row: usize,
        /// Column of the pixel.
        column: usize,
        /// Escape time.
        value: u8,
    },
    /// A whole column; `values[row]` is the pixel in that row.
    Column {
        /// Column index.
        column: usize,
        /// One value per row, top to bottom.
        values: Vec<u8>,
    },
}

impl ResultRecord {
    /// Flatten for sending.
    pub fn encode(&self) -> Result<Vec<i32>, WireError> {
        match self {
            ResultRecord::Pixel { row, column, value } => Ok(vec![
                to_wire("row", *row)?,
                to_wire("column", *column)?,
                i32::from(*value),
            ]),
            ResultRecord::Column { column, values } => {
                let mut payload = Vec::with_capacity(values.len() + 1);
                payload.push(to_wire("column", *column)?);
                payload.extend(values.iter().map(|v| i32::from(*v)));
                Ok(payload)
            }
        }
    }
}

fn expect_len(shape: &'static str, payload: &[i32], expected: usize) -> Result<(), WireError> {
    if payload.len() != expected {
        return Err(WireError::Length {
            shape,
            expected,
            len: payload.len(),
        });
    }
    Ok(())
}

fn to_wire(field: &'static str, value: usize) -> Result<i32, WireError> {
    i32::try_from(value).map_err(|_| WireError::OutOfRange {
        field,
        value: value as i64,
    })
}

fn from_wire(field: &'static str, value: i32) -> Result<usize, WireError> {
    usize::try_from(value).map_err(|_| WireError::OutOfRange {
        field,
        value: i64::from(value),
    })
}

fn colour(value: i32) -> Result<u8, WireError> {
    u8::try_from(value).map_err(|_| WireError::OutOfRange {
        field: "pixel value",
        value: i64::from(value),
    })
}
