//! The `Core` is the single task that owns all mutable state of a Raft node.
//!
//! It receives events from the application, the timer, and the tasks that
//! send RPCs to other nodes, and updates the node's state one event at a time.
//! The persistent part of the state is saved before any effect of an event
//! becomes visible to other nodes.

pub(crate) mod applier;
pub(crate) mod core;
pub(crate) mod core_state;
pub(crate) mod io;
pub(crate) mod roles;
mod tick;


use roles::candidate::Candidate;
use roles::leader::Leader;
pub(crate) use tick::Tick;
pub(crate) use tick::TickHandle;

pub(crate) type LeaderState = Option<Box<Leader>>;
pub(crate) type CandidateState = Option<Candidate>;
