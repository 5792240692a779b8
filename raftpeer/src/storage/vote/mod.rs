use std::fmt::Formatter;

use crate::base::display_ext::DisplayOptionExt;
use crate::storage::membership::NodeId;

/// `Vote` is the part of the persistent state that is about **when**:
/// the current term of a node and whom it voted for in that term.
///
/// A node votes at most once per term: `voted_for` can only be set while it
/// is `None`, and it is reset to `None` whenever `term` increases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct Vote {
    /// The latest term this node has seen, `currentTerm`.
    pub term: u64,

    /// The candidate this node voted for in `term`, `votedFor`.
    pub voted_for: Option<NodeId>,
}

impl std::fmt::Display for Vote {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<T{}-N{}>", self.term, self.voted_for.display())
    }
}

impl Vote {
    pub fn new(term: u64, voted_for: Option<NodeId>) -> Self {
        Self { term, voted_for }
    }

    pub fn term(&self) -> u64 {
        self.term
    }

    pub fn voted_for(&self) -> Option<&NodeId> {
        self.voted_for.as_ref()
    }

    /// Returns if a vote for `candidate` in `term` may be granted without
    /// breaking the one-vote-per-term rule.
    ///
    /// The caller must have adopted `term` already if it is greater.
    pub(crate) fn can_vote_for(&self, term: u64, candidate: &NodeId) -> bool {
        if term != self.term {
            return false;
        }

        match &self.voted_for {
            None => true,
            Some(voted) => voted == candidate,
        }
    }

    /// Move to a greater term, forgetting the vote of the previous term.
    pub(crate) fn advance_term(&mut self, term: u64) {
        debug_assert!(term > self.term);
        self.term = term;
        self.voted_for = None;
    }
}
