use std::collections::BTreeSet;
use std::fmt;

use tokio::time::Instant;
use tracing::info;

use crate::quorum::QuorumSet;
use crate::storage::membership::Membership;
use crate::storage::membership::NodeId;

/// Candidate: voting state.
#[derive(Clone, Debug)]
#[derive(PartialEq, Eq)]
pub(crate) struct Candidate {
    /// When the voting is started.
    starting_time: Instant,

    /// The term this candidate campaigns for.
    pub(crate) term: u64,

    /// Nodes that have granted the vote in `term`, including this node.
    granted: BTreeSet<NodeId>,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{T{}@{:?}ago, granted:{:?}}}",
            self.term,
            self.starting_time.elapsed(),
            self.granted
        )
    }
}

impl Candidate {
    pub(crate) fn new(starting_time: Instant, term: u64) -> Self {
        Self {
            starting_time,
            term,
            granted: BTreeSet::new(),
        }
    }

    /// Record a vote granted by `target`.
    ///
    /// Returns `true` if the granted votes form a quorum of `membership`.
    /// A repeated grant from the same node is counted once.
    pub(crate) fn grant_by(
        &mut self,
        target: &NodeId,
        membership: &Membership,
    ) -> bool {
        self.granted.insert(target.clone());

        let quorum_granted = membership.is_quorum(self.granted.iter());

        info!(
            "candidate of term {} is granted by {}, granted: {:?}, quorum: {}",
            self.term, target, self.granted, quorum_granted
        );

        quorum_granted
    }
}
