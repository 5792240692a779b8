//! Testing utilities for raftpeer.

use std::fmt::Display;

use crate::storage::log::entry::Entry;
use crate::storage::log::log_id::LogId;
use crate::storage::membership::NodeId;
use crate::TypeConfig;

/// Builds a log id, for testing purposes.
pub fn log_id(term: u64, index: u64) -> LogId {
    LogId { term, index }
}

/// Builds a log entry carrying `payload`, for testing purposes.
pub fn entry<C: TypeConfig>(
    term: u64,
    index: u64,
    payload: C::AppData,
) -> Entry<C> {
    Entry::new(LogId::new(term, index), payload)
}

/// Builds a node id from anything displayable.
pub fn nid(x: impl Display) -> NodeId {
    format!("{}", x)
}

#[cfg(test)]
crate::declare_raft_types!(
    /// Type config used in unit tests: commands are plain numbers.
    pub(crate) UTConfig:
        AppData = u64,
);

/// An entry whose command is its own index.
#[cfg(test)]
pub(crate) fn ent(term: u64, index: u64) -> Entry<UTConfig> {
    entry(term, index, index)
}

#[cfg(test)]
mod doubles;

#[cfg(test)]
pub(crate) use doubles::MapStore;
#[cfg(test)]
pub(crate) use doubles::NoNetwork;
