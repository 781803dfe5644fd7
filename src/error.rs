// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can go wrong during a run.  A render is a batch
//! job: none of these are retried, they are reported and the run ends.

use std::io;

use crate::comm::Rank;

/// Problems with the shape of the run, detected before any pixel is
/// computed.
#[derive(Debug, Fail, PartialEq)]
pub enum ConfigError {
    /// A group needs a coordinator and at least one worker.
    #[fail(
        display = "Number of processes should be >= 2, since there must be at least 1 worker (got {})",
        processes
    )]
    TooFewProcesses {
        /// The process count that was requested.
        processes: usize,
    },

    /// The image must be at least one pixel wide.
    #[fail(display = "Image edge must be at least 1 pixel")]
    EmptyImage,

    /// The iteration cap doubles as the colour depth, so it has to fit
    /// in one byte and be at least one.
    #[fail(display = "Iteration cap must be between 1 and 255 (got {})", depth)]
    ColorDepth {
        /// The cap that was requested.
        depth: u32,
    },

    /// The complex plane must be finite with a positive extent on both
    /// axes.
    #[fail(display = "Complex plane is degenerate: {}", reason)]
    DegeneratePlane {
        /// Which part of the plane was rejected.
        reason: String,
    },

    /// The image is too large to address with the wire format.
    #[fail(display = "Image edge of {} pixels cannot be addressed on the wire", edge)]
    EdgeTooLarge {
        /// The edge that was requested.
        edge: usize,
    },
}

/// Failures of the process-group runtime.  All of them are fatal.
#[derive(Debug, Fail, PartialEq)]
pub enum CommError {
    /// The destination is outside the group.
    #[fail(display = "Rank {} is not part of a group of {}", rank, size)]
    InvalidRank {
        /// The rank addressed.
        rank: Rank,
        /// The size of the group.
        size: usize,
    },

    /// The peer's endpoint is gone.
    #[fail(display = "Rank {} is no longer reachable", rank)]
    Disconnected {
        /// The rank that could not be reached.
        rank: Rank,
    },

    /// A message did not fit the receive buffer.
    #[fail(
        display = "Message of {} values does not fit a buffer of {}",
        len, capacity
    )]
    Truncated {
        /// Size of the receive buffer.
        capacity: usize,
        /// Size of the message that arrived.
        len: usize,
    },

    /// Some rank tore the group down.
    #[fail(display = "The process group was aborted")]
    Aborted,
}

/// A payload did not have the shape its tag promised.
#[derive(Debug, Fail, PartialEq)]
pub enum WireError {
    /// Wrong number of values in the payload.
    #[fail(display = "Expected a {} of {} values, got {}", shape, expected, len)]
    Length {
        /// What was being decoded.
        shape: &'static str,
        /// The expected number of values.
        expected: usize,
        /// The number of values received.
        len: usize,
    },

    /// A value that should be an index or a colour is out of range.
    #[fail(display = "Value {} is out of range for {}", value, field)]
    OutOfRange {
        /// The field being decoded.
        field: &'static str,
        /// The value received.
        value: i64,
    },

    /// The payload was well formed but arrived under the wrong tag.
    #[fail(display = "Unexpected {:?} message from rank {}", tag, source)]
    UnexpectedTag {
        /// The tag that arrived.
        tag: crate::comm::Tag,
        /// The sender.
        source: Rank,
    },
}

/// The pixel buffer rejected a write or a hand-off.
#[derive(Debug, Fail, PartialEq)]
pub enum AssemblyError {
    /// The coordinates are outside the image.
    #[fail(display = "Pixel ({}, {}) is outside a {}x{} image", row, column, edge, edge)]
    OutOfBounds {
        /// Row of the rejected write.
        row: usize,
        /// Column of the rejected write.
        column: usize,
        /// Edge of the image.
        edge: usize,
    },

    /// Every cell is written exactly once.
    #[fail(display = "Pixel ({}, {}) was written twice", row, column)]
    Duplicate {
        /// Row of the rejected write.
        row: usize,
        /// Column of the rejected write.
        column: usize,
    },

    /// The buffer was handed out before all results arrived.
    #[fail(display = "Image is incomplete: {} pixels were never written", missing)]
    Incomplete {
        /// Number of cells still unwritten.
        missing: usize,
    },
}

/// The top-level error returned by a run.
#[derive(Debug, Fail)]
pub enum MandelError {
    /// See [`ConfigError`](enum.ConfigError.html).
    #[fail(display = "{}", _0)]
    Config(#[cause] ConfigError),

    /// See [`CommError`](enum.CommError.html).
    #[fail(display = "Communication failure: {}", _0)]
    Comm(#[cause] CommError),

    /// See [`WireError`](enum.WireError.html).
    #[fail(display = "Malformed message: {}", _0)]
    Wire(#[cause] WireError),

    /// See [`AssemblyError`](enum.AssemblyError.html).
    #[fail(display = "Assembly failure: {}", _0)]
    Assembly(#[cause] AssemblyError),

    /// Writing the image failed.
    #[fail(display = "Could not write image: {}", _0)]
    Io(#[cause] io::Error),

    /// A rank's thread panicked.
    #[fail(display = "Rank {} panicked", rank)]
    RankPanicked {
        /// The rank that died.
        rank: Rank,
    },
}

impl MandelError {
    /// True when this error only reports that some other rank tore
    /// the group down.
    pub fn is_abort(&self) -> bool {
        match self {
            MandelError::Comm(CommError::Aborted) => true,
            _ => false,
        }
    }
}

impl From<ConfigError> for MandelError {
    fn from(e: ConfigError) -> Self {
        MandelError::Config(e)
    }
}

impl From<CommError> for MandelError {
    fn from(e: CommError) -> Self {
        MandelError::Comm(e)
    }
}

impl From<WireError> for MandelError {
    fn from(e: WireError) -> Self {
        MandelError::Wire(e)
    }
}

impl From<AssemblyError> for MandelError {
    fn from(e: AssemblyError) -> Self {
        MandelError::Assembly(e)
    }
}

impl From<io::Error> for MandelError {
    fn from(e: io::Error) -> Self {
        MandelError::Io(e)
    }
}
