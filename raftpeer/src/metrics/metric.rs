use std::cmp::Ordering;

use crate::storage::vote::Vote;
use crate::Metrics;

/// A metric entry of a Raft node.
///
/// This is used to specify which metric to observe.
#[derive(Debug)]
pub enum Metric {
    Term(u64),
    Vote(Vote),
    LastLogIndex(u64),
    CommitIndex(u64),
    AppliedIndex(u64),
}

impl Metric {
    /// Describe the condition `<metric> <op> <value>`, for logging and error
    /// messages.
    pub(crate) fn describe(&self, op: &str) -> String {
        match self {
            Metric::Term(v) => format!("term {} {}", op, v),
            Metric::Vote(v) => format!("vote {} {}", op, v),
            Metric::LastLogIndex(v) => format!("last_log_index {} {}", op, v),
            Metric::CommitIndex(v) => format!("commit_index {} {}", op, v),
            Metric::AppliedIndex(v) => format!("last_applied {} {}", op, v),
        }
    }
}

/// Metric can be compared with Metrics by comparing the corresponding field
/// of Metrics.
impl PartialEq<Metric> for Metrics {
    fn eq(&self, other: &Metric) -> bool {
        match other {
            Metric::Term(v) => self.current_term == *v,
            Metric::Vote(v) => &self.vote == v,
            Metric::LastLogIndex(v) => self.last_log_index == *v,
            Metric::CommitIndex(v) => self.commit_index == *v,
            Metric::AppliedIndex(v) => self.last_applied == *v,
        }
    }
}

/// Metric can be compared with Metrics by comparing the corresponding field
/// of Metrics.
///
/// Votes of the same term with different candidates are incomparable.
impl PartialOrd<Metric> for Metrics {
    fn partial_cmp(&self, other: &Metric) -> Option<Ordering> {
        match other {
            Metric::Term(v) => Some(self.current_term.cmp(v)),
            Metric::Vote(v) => match self.vote.term.cmp(&v.term) {
                Ordering::Equal => {
                    if self.vote == *v {
                        Some(Ordering::Equal)
                    } else {
                        None
                    }
                }
                cmp => Some(cmp),
            },
            Metric::LastLogIndex(v) => Some(self.last_log_index.cmp(v)),
            Metric::CommitIndex(v) => Some(self.commit_index.cmp(v)),
            Metric::AppliedIndex(v) => Some(self.last_applied.cmp(v)),
        }
    }
}
