use std::fmt;

use crate::storage::log::log_id::LogId;
use crate::storage::membership::NodeId;

/// An RPC sent by candidates to gather votes (§5.2).
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct RequestVote {
    /// The term the candidate is campaigning for.
    pub term: u64,

    pub candidate_id: NodeId,

    /// The id of the last entry in the candidate's log.
    pub last_log_id: LogId,
}

impl fmt::Display for RequestVote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{term:{}, candidate:{}, last_log:{}}}",
            self.term, self.candidate_id, self.last_log_id,
        )
    }
}

impl RequestVote {
    pub fn new(term: u64, candidate_id: NodeId, last_log_id: LogId) -> Self {
        Self {
            term,
            candidate_id,
            last_log_id,
        }
    }

    pub fn last_log_index(&self) -> u64 {
        self.last_log_id.index
    }

    pub fn last_log_term(&self) -> u64 {
        self.last_log_id.term
    }
}

/// The response to a [`RequestVote`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct VoteReply {
    /// The current term of the voter, after handling the request.
    ///
    /// A candidate that sees a greater term steps down.
    pub term: u64,

    /// It is true if the voter granted and persisted its vote.
    pub vote_granted: bool,
}

impl VoteReply {
    pub fn new(term: u64, vote_granted: bool) -> Self {
        Self { term, vote_granted }
    }
}

impl fmt::Display for VoteReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{term:{}, granted:{}}}", self.term, self.vote_granted)
    }
}
