use std::collections::BTreeMap;
use std::fmt;

use crate::base::display_ext::DisplayOption;
use crate::errors::Fatal;
use crate::metrics::ServerState;
use crate::storage::membership::NodeId;
use crate::storage::vote::Vote;

/// A set of metrics describing the current state of a Raft node.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct Metrics {
    pub running_state: Result<(), Fatal>,

    /// The ID of the Raft node.
    pub id: NodeId,

    /// The current term of this node.
    pub current_term: u64,

    /// The last persisted vote, i.e., `current_term` and `voted_for`.
    pub vote: Vote,

    /// The last log index has been appended to this node's log.
    pub last_log_index: u64,

    /// The index of the highest log entry known to be committed.
    pub commit_index: u64,

    /// The index of the highest log entry delivered to the apply channel.
    pub last_applied: u64,

    /// The state of the Raft node.
    pub server_state: ServerState,

    /// The current cluster leader.
    pub current_leader: Option<NodeId>,

    /// For a leader, the highest log index known to be replicated on each
    /// follower. It is `None` if this node is not leader.
    pub replication: Option<BTreeMap<NodeId, u64>>,
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Metrics{{")?;

        write!(
            f,
            "id:{}, {:?}, vote:{}, last_log:{}, committed:{}, applied:{}, leader:{}",
            self.id,
            self.server_state,
            self.vote,
            self.last_log_index,
            self.commit_index,
            self.last_applied,
            DisplayOption(&self.current_leader),
        )?;

        if let Some(replication) = &self.replication {
            write!(f, ", replication:{{")?;
            for (i, (id, matched)) in replication.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}:{}", id, matched)?;
            }
            write!(f, "}}")?;
        }

        write!(f, "}}")?;
        Ok(())
    }
}

impl Metrics {
    pub fn new_initial(id: NodeId) -> Self {
        Self {
            running_state: Ok(()),
            id,
            current_term: 0,
            vote: Vote::default(),
            last_log_index: 0,
            commit_index: 0,
            last_applied: 0,
            server_state: ServerState::Follower,
            current_leader: None,
            replication: None,
        }
    }
}
