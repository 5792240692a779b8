use std::collections::BTreeMap;
use std::fmt;

use tokio::time::Instant;

use crate::storage::membership::Membership;
use crate::storage::membership::NodeId;

/// What a leader knows about the log of one follower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReplicationProgress {
    /// Index of the next entry to send, `nextIndex`.
    pub(crate) next_index: u64,

    /// The highest index known to be replicated on the follower,
    /// `matchIndex`.
    pub(crate) matched: u64,

    /// Whether an `AppendEntries` is on the way and no reply has arrived yet.
    pub(crate) inflight: bool,
}

impl fmt::Display for ReplicationProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{next:{}, matched:{}, inflight:{}}}",
            self.next_index, self.matched, self.inflight
        )
    }
}

impl ReplicationProgress {
    pub(crate) fn new(next_index: u64) -> Self {
        Self {
            next_index,
            matched: 0,
            inflight: false,
        }
    }
}

/// Leading state data.
///
/// It exists only while this node is leader of `term`, and is dropped as soon
/// as a greater term is seen.
pub(crate) struct Leader {
    /// The term this node is leader of.
    pub(crate) term: u64,

    /// Replication progress of every other node.
    pub(crate) progress: BTreeMap<NodeId, ReplicationProgress>,

    /// The time to send next heartbeat.
    pub(crate) next_heartbeat: Instant,
}

impl Leader {
    /// Create a new Leader.
    ///
    /// `last_log_index` is the last index in the leader's log when it is
    /// elected, every follower is first assumed to be up to date with it.
    pub(crate) fn new(
        term: u64,
        id: &NodeId,
        membership: &Membership,
        last_log_index: u64,
    ) -> Self {
        let progress = membership
            .peers(id)
            .map(|(target, _)| {
                (target.clone(), ReplicationProgress::new(last_log_index + 1))
            })
            .collect();

        Self {
            term,
            progress,
            next_heartbeat: Instant::now(),
        }
    }

    /// Returns the highest replicated index of every follower.
    pub(crate) fn matched(&self) -> BTreeMap<NodeId, u64> {
        self.progress.iter().map(|(id, p)| (id.clone(), p.matched)).collect()
    }
}
