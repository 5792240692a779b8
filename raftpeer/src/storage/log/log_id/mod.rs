//! This mod defines the identity of a raft log entry.

use std::fmt::Display;
use std::fmt::Formatter;

/// The identity of a raft log entry.
///
/// The log id serves as unique identifier for a log entry across the system:
/// by the Log Matching Property, two entries with the same `term` and `index`
/// carry the same command.
///
/// The derived ordering compares `term` first then `index`. This is exactly
/// the "at least as up-to-date" relation used when granting a vote: a log whose
/// last log id is greater or equal is at least as up-to-date.
///
/// `LogId::default()`, i.e., `T0-0`, is the id of the sentinel entry at index
/// 0 that every log starts with.
#[derive(Debug, Default, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct LogId {
    /// The term in which the entry was created by a leader.
    pub term: u64,

    /// The 1-based position of the entry in the log.
    pub index: u64,
}

impl Display for LogId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "T{}-{}", self.term, self.index)
    }
}

impl LogId {
    pub fn new(term: u64, index: u64) -> Self {
        LogId { term, index }
    }

    pub fn term(&self) -> u64 {
        self.term
    }

    pub fn index(&self) -> u64 {
        self.index
    }
}
