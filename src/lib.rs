#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot farm
//!
//! Renders the Mandelbrot set by farming its columns out to a group of
//! worker ranks that share no memory.  Rank 0, the coordinator, owns
//! the image; every other rank computes whatever columns it is sent
//! and mails the escape times back.  How the columns are handed out is
//! up to the [`Scheduler`](scheduler/trait.Scheduler.html):
//!
//! * **Static** splits the image into one contiguous block of columns
//!   per worker and sends them all before anything is computed.  One
//!   message out per worker, but the slowest block sets the pace.
//! * **Static-Round** deals single columns to every worker in turn,
//!   collecting each round before dealing the next.
//! * **Dynamic** keeps exactly one column outstanding per worker and
//!   gives the next one to whoever answers first.  A round trip per
//!   column buys automatic load balancing.
//!
//! The image is the same whichever strategy produced it.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate itertools;
#[macro_use]
extern crate log;
extern crate crossbeam;
extern crate image;
extern crate num;

pub mod assembly;
pub mod bitmap;
pub mod comm;
pub mod complex;
pub mod config;
pub mod error;
pub mod escape;
pub mod planes;
pub mod runner;
pub mod scheduler;
pub mod worker;
pub mod workunit;

pub use crate::config::RenderConfig;
pub use crate::error::MandelError;
pub use crate::escape::Evaluator;
pub use crate::runner::{render, render_with, RunReport};
pub use crate::scheduler::Strategy;
