// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The process group.
//!
//! Ranks talk to each other only through point-to-point messages of
//! `i32` values, each carrying a [`Tag`](enum.Tag.html).  A receive
//! names the source and tag it is willing to accept, either of which
//! may be a wildcard.  Messages that arrive while a rank is waiting for
//! something else are parked, in arrival order, and are the first
//! candidates for the next receive.
//!
//! [`group`](fn.group.html) builds a group whose ranks live on
//! separate threads of one process and share nothing but their
//! inboxes.  Schedulers only see the
//! [`Communicator`](trait.Communicator.html) trait, so any transport
//! with the same delivery guarantees can stand in.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam::channel::{bounded, unbounded, Receiver, Select, Sender};

use crate::error::CommError;

/// Position of a participant in the group.  Rank 0 is the coordinator.
pub type Rank = usize;

/// The rank that coordinates a run.
pub const COORDINATOR: Rank = 0;

/// Message intent.  Workers look at the tag, never at the payload, to
/// decide what a message means.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tag {
    /// A task assignment, coordinator to worker.
    Info,
    /// A result payload, worker to coordinator.
    Data,
    /// Terminate, coordinator to worker.
    Stop,
}

/// Which senders a receive accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// Whoever sends first.
    Any,
    /// Only this rank.
    Rank(Rank),
}

/// Which tags a receive accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TagFilter {
    /// Every tag.
    Any,
    /// Only this tag.
    Only(Tag),
}

/// What a completed receive reports back.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Status {
    /// Who sent the message.
    pub source: Rank,
    /// The tag it was sent with.
    pub tag: Tag,
    /// How many values were copied into the receive buffer.
    pub len: usize,
}

/// Point-to-point messaging between the members of a group.
///
/// Sends are reliable and delivered in order between any two ranks.
/// Receives block until a matching message arrives or the group is
/// aborted.
pub trait Communicator {
    /// This participant's rank.
    fn rank(&self) -> Rank;

    /// Number of participants, coordinator included.
    fn size(&self) -> usize;

    /// Deliver `payload` to `dest` under `tag`.
    fn send(&self, payload: &[i32], dest: Rank, tag: Tag) -> Result<(), CommError>;

    /// Block until a message matching `source` and `tag` arrives and
    /// copy it into `buffer`.
    fn receive(
        &mut self,
        buffer: &mut [i32],
        source: Source,
        tag: TagFilter,
    ) -> Result<Status, CommError>;

    /// Tear the whole group down.  Every rank blocked in a receive,
    /// now or later, fails with `CommError::Aborted`.
    fn abort(&self);
}

#[derive(Debug)]
struct Envelope {
    source: Rank,
    tag: Tag,
    payload: Vec<i32>,
}

impl Envelope {
    fn matches(&self, source: Source, tag: TagFilter) -> bool {
        let source_ok = match source {
            Source::Any => true,
            Source::Rank(r) => r == self.source,
        };
        let tag_ok = match tag {
            TagFilter::Any => true,
            TagFilter::Only(t) => t == self.tag,
        };
        source_ok && tag_ok
    }
}

/// Dropping the only sender wakes every receiver of the abort channel.
type AbortSwitch = Arc<Mutex<Option<Sender<()>>>>;

/// One rank's view of an in-process group.
pub struct Endpoint {
    rank: Rank,
    peers: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
    pending: VecDeque<Envelope>,
    abort_switch: AbortSwitch,
    aborted: Receiver<()>,
}

/// Create a group of `size` ranks.  Element `i` of the result is rank
/// `i`; move each endpoint onto the thread that plays that rank.
pub fn group(size: usize) -> Vec<Endpoint> {
    let (abort_tx, abort_rx) = bounded::<()>(0);
    let abort_switch: AbortSwitch = Arc::new(Mutex::new(Some(abort_tx)));

    let (senders, inboxes): (Vec<_>, Vec<_>) = (0..size).map(|_| unbounded()).unzip();

    inboxes
        .into_iter()
        .enumerate()
        .map(|(rank, inbox)| Endpoint {
            rank,
            peers: senders.clone(),
            inbox,
            pending: VecDeque::new(),
            abort_switch: abort_switch.clone(),
            aborted: abort_rx.clone(),
        })
        .collect()
}

impl Endpoint {
    fn deliver(&self, envelope: Envelope, buffer: &mut [i32]) -> Result<Status, CommError> {
        let len = envelope.payload.len();
        if len > buffer.len() {
            return Err(CommError::Truncated {
                capacity: buffer.len(),
                len,
            });
        }
        buffer[..len].copy_from_slice(&envelope.payload);
        trace!(
            "rank {} <- rank {} {:?} ({} values)",
            self.rank,
            envelope.source,
            envelope.tag,
            len
        );
        Ok(Status {
            source: envelope.source,
            tag: envelope.tag,
            len,
        })
    }

    fn is_aborted(&self) -> bool {
        match self.abort_switch.lock() {
            Ok(switch) => switch.is_none(),
            Err(_) => true,
        }
    }
}

impl Communicator for Endpoint {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn send(&self, payload: &[i32], dest: Rank, tag: Tag) -> Result<(), CommError> {
        if self.is_aborted() {
            return Err(CommError::Aborted);
        }
        let peer = self.peers.get(dest).ok_or(CommError::InvalidRank {
            rank: dest,
            size: self.peers.len(),
        })?;
        trace!(
            "rank {} -> rank {} {:?} ({} values)",
            self.rank,
            dest,
            tag,
            payload.len()
        );
        peer.send(Envelope {
            source: self.rank,
            tag,
            payload: payload.to_vec(),
        })
        .map_err(|_| CommError::Disconnected { rank: dest })
    }

    fn receive(
        &mut self,
        buffer: &mut [i32],
        source: Source,
        tag: TagFilter,
    ) -> Result<Status, CommError> {
        if let Some(position) = self.pending.iter().position(|e| e.matches(source, tag)) {
            if let Some(envelope) = self.pending.remove(position) {
                return self.deliver(envelope, buffer);
            }
        }

        loop {
            let envelope = {
                let mut select = Select::new();
                let inbox = select.recv(&self.inbox);
                select.recv(&self.aborted);
                let operation = select.select();
                if operation.index() != inbox {
                    let _ = operation.recv(&self.aborted);
                    return Err(CommError::Aborted);
                }
                operation
                    .recv(&self.inbox)
                    .map_err(|_| CommError::Disconnected { rank: self.rank })?
            };

            if envelope.matches(source, tag) {
                return self.deliver(envelope, buffer);
            }
            self.pending.push_back(envelope);
        }
    }

    fn abort(&self) {
        if let Ok(mut switch) = self.abort_switch.lock() {
            if switch.take().is_some() {
                warn!("rank {} aborted the process group", self.rank);
            }
        }
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        if thread::panicking() {
            self.abort();
        }
    }
}
