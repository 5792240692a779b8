use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;
use tracing::info;

use crate::base::leased::Leased;
use crate::core::CandidateState;
use crate::core::LeaderState;
use crate::errors::RejectVoteRequest;
use crate::raft::RequestVote;
use crate::storage::log::log_id::LogId;
use crate::storage::membership::NodeId;
use crate::storage::vote::Vote;

/// Handle raft vote related operations
///
/// The `vote` together with `leader` and `candidate` defines the role of a
/// node: a node is a follower if it is neither leader nor candidate.
///
/// Methods here only update the state in memory. The caller persists the
/// vote when a method reports a change.
pub(crate) struct VoteHandler<'st> {
    pub(crate) id: &'st NodeId,
    pub(crate) vote: &'st mut Leased<Vote>,
    pub(crate) leader: &'st mut LeaderState,
    pub(crate) candidate: &'st mut CandidateState,
    pub(crate) current_leader: &'st mut Option<NodeId>,
}

impl<'st> VoteHandler<'st> {
    /// Adopt `term` if it is greater than the local term, and step down to
    /// follower.
    ///
    /// A leader never ran its election timer while leading, so a deposed
    /// leader restarts it with `lease`; otherwise it would start an election
    /// at the next tick.
    ///
    /// This is done for every RPC request and reply this node sees.
    /// Returns `true` if the term changed and has to be persisted.
    pub(crate) fn update_term(&mut self, term: u64, lease: Duration) -> bool {
        if term <= self.vote.term() {
            return false;
        }

        info!(
            "id={} term is changing from {} to {}",
            self.id,
            self.vote.term(),
            term
        );

        self.vote.advance_term(term);
        *self.current_leader = None;

        if self.leader.is_some() {
            debug!(
                "id={} deposed leader resets election timer: {:?}",
                self.id, lease
            );
            self.vote.touch(Instant::now(), lease);
        }

        self.step_down();
        true
    }

    /// Decide whether to grant the vote to a candidate.
    ///
    /// The caller must have called [`Self::update_term`] with `req.term`.
    ///
    /// Returns `Ok(true)` if the vote is granted and `voted_for` changed,
    /// `Ok(false)` if it is a repeated grant to the same candidate.
    pub(crate) fn grant_vote(
        &mut self,
        req: &RequestVote,
        my_last_log_id: &LogId,
        lease: Duration,
    ) -> Result<bool, RejectVoteRequest> {
        if req.term < self.vote.term() {
            return Err(RejectVoteRequest::ByTerm(self.vote.term()));
        }

        if !self.vote.can_vote_for(req.term, &req.candidate_id) {
            return Err(RejectVoteRequest::ByVote((**self.vote).clone()));
        }

        if req.last_log_id < *my_last_log_id {
            return Err(RejectVoteRequest::ByLastLogId(*my_last_log_id));
        }

        let changed = self.vote.voted_for().is_none();

        if changed {
            self.vote.voted_for = Some(req.candidate_id.clone());
        }

        debug!(
            "id={} grant vote to {}, reset election timer: {:?}",
            self.id, req.candidate_id, lease
        );
        self.vote.touch(Instant::now(), lease);

        Ok(changed)
    }

    /// Accept `leader_id` as the leader of the current term and reset the
    /// election timer.
    ///
    /// The caller must have called [`Self::update_term`] with the leader's
    /// term.
    pub(crate) fn follow_leader(&mut self, leader_id: &NodeId, lease: Duration) {
        if self.leader.is_some() {
            tracing::error!(
                "id={} another leader {} in the same term {}",
                self.id,
                leader_id,
                self.vote.term()
            );
        }

        self.step_down();

        if self.current_leader.as_ref() != Some(leader_id) {
            info!(
                "id={} follows leader {} in term {}",
                self.id,
                leader_id,
                self.vote.term()
            );
            *self.current_leader = Some(leader_id.clone());
        }

        self.vote.touch(Instant::now(), lease);
    }

    /// Become a follower.
    pub(crate) fn step_down(&mut self) {
        if self.candidate.is_some() {
            info!("{} is no longer a candidate", self.id);
        }
        if self.leader.is_some() {
            info!("{} is no longer a leader", self.id);
        }
        *self.candidate = None;
        *self.leader = None;
    }
}
