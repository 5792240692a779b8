use anyerror::AnyError;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;
use tracing::info;
use tracing::Instrument;

use crate::core::io::notification::Notification;
use crate::core::roles::leader::Leader;
use crate::network::connection::Connection;
use crate::quorum::QuorumSet;
use crate::raft::AppendEntries;
use crate::raft::AppendEntriesReply;
use crate::raft::ConflictHint;
use crate::storage::log::log_id::LogId;
use crate::storage::log::RaftLog;
use crate::storage::membership::Membership;
use crate::storage::membership::NodeId;
use crate::Config;
use crate::Network;
use crate::TypeConfig;

/// Handle leader operations.
///
/// - Replicate logs;
/// - Heartbeat;
/// - Advance the commit index.
pub(crate) struct LeaderHandler<'x, C, Net>
where
    C: TypeConfig,
    Net: Network<C>,
{
    pub(crate) config: &'x Config,
    pub(crate) id: &'x NodeId,
    pub(crate) network: &'x mut Net,
    pub(crate) membership: &'x Membership,
    pub(crate) log: &'x RaftLog<C>,
    pub(crate) commit_index: &'x mut u64,
    pub(crate) tx_notification: mpsc::UnboundedSender<Notification>,
    pub(crate) leader: &'x mut Leader,
}

impl<'x, C, Net> LeaderHandler<'x, C, Net>
where
    C: TypeConfig,
    Net: Network<C>,
{
    /// Send an `AppendEntries` to every follower, with the entries it lacks.
    ///
    /// It is sent no matter whether a previous request is still in flight, so
    /// that followers keep hearing from the leader.
    pub(crate) async fn broadcast_heartbeat(&mut self) {
        self.leader.next_heartbeat =
            Instant::now() + self.config.heartbeat_interval();

        let targets = self.leader.progress.keys().cloned().collect::<Vec<_>>();
        for target in targets {
            self.send_append_entries(target).await;
        }
    }

    /// Send entries to every follower that lags behind and has no request in
    /// flight.
    pub(crate) async fn replicate_all(&mut self) {
        let last_index = self.log.last_index();

        let targets = self
            .leader
            .progress
            .iter()
            .filter(|(_, p)| !p.inflight && p.next_index <= last_index)
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();

        for target in targets {
            self.send_append_entries(target).await;
        }
    }

    /// Build an `AppendEntries` from the follower's `next_index` and send it
    /// in a spawned task, the reply is delivered as a [`Notification`].
    pub(crate) async fn send_append_entries(&mut self, target: NodeId) {
        let Some(node) = self.membership.get_node(&target) else {
            return;
        };

        let Some(progress) = self.leader.progress.get_mut(&target) else {
            return;
        };

        let last_index = self.log.last_index();
        let next_index = progress.next_index.clamp(1, last_index + 1);
        progress.next_index = next_index;
        progress.inflight = true;

        let Some(prev_log_id) = self.log.log_id_at(next_index - 1) else {
            tracing::error!(
                "id={} no log id at {} while sending to {}",
                self.id,
                next_index - 1,
                target
            );
            return;
        };

        let entries = self
            .log
            .entries_from(next_index, self.config.max_payload_entries);
        let n_entries = entries.len() as u64;

        let rpc = AppendEntries {
            term: self.leader.term,
            leader_id: self.id.clone(),
            prev_log_id,
            entries,
            leader_commit: *self.commit_index,
        };

        debug!(
            "id={} send AppendEntries to {}: {}",
            self.id, target, rpc
        );

        let mut connection =
            self.network.new_connection(target.clone(), node).await;

        let sender_term = self.leader.term;
        let ttl = self.config.rpc_timeout();
        let tx = self.tx_notification.clone();

        let fu = async move {
            let res = tokio::time::timeout(ttl, connection.append_entries(rpc))
                .await;

            let result = match res {
                Ok(Ok(reply)) => Ok(reply),
                Ok(Err(e)) => Err(AnyError::new(&e)),
                Err(e) => Err(AnyError::new(&e)),
            };

            let notification = Notification::AppendEntriesReply {
                target,
                sender_term,
                prev_log_id,
                n_entries,
                result,
            };

            let _ = tx.send(notification);
        };

        let span = tracing::debug_span!("append_entries", sender_term);
        // False positive lint warning(`non-binding `let` on a future`): https://github.com/rust-lang/rust-clippy/issues/9932
        #[allow(clippy::let_underscore_future)]
        let _ = tokio::spawn(fu.instrument(span));
    }

    /// Update the follower's progress with a reply to an `AppendEntries`
    /// sent in the current term, and send more entries if it still lags.
    ///
    /// Returns `true` if the commit index is advanced.
    pub(crate) async fn handle_append_entries_reply(
        &mut self,
        target: NodeId,
        prev_log_id: LogId,
        n_entries: u64,
        reply: AppendEntriesReply,
    ) -> bool {
        let Some(progress) = self.leader.progress.get_mut(&target) else {
            return false;
        };

        progress.inflight = false;

        let mut committed = false;

        if reply.success {
            let matched = prev_log_id.index + n_entries;
            if matched > progress.matched {
                progress.matched = matched;
            }
            progress.next_index = progress.matched + 1;

            debug!(
                "id={} {} accepted up to {}, progress: {}",
                self.id, target, matched, progress
            );

            committed = self.try_commit();
        } else {
            if prev_log_id.index + 1 != progress.next_index {
                debug!(
                    "id={} stale rejection from {}: prev:{}, progress: {}",
                    self.id, target, prev_log_id, progress
                );
                return false;
            }

            let matched = progress.matched;
            let next_index =
                self.backtrack_next_index(prev_log_id, reply.conflict, matched);

            info!(
                "id={} {} rejected prev:{}, conflict:{:?}, next_index: {} -> {}",
                self.id,
                target,
                prev_log_id,
                reply.conflict,
                prev_log_id.index + 1,
                next_index
            );

            if let Some(progress) = self.leader.progress.get_mut(&target) {
                progress.next_index = next_index;
            }
        }

        let lagging = self
            .leader
            .progress
            .get(&target)
            .map(|p| p.next_index <= self.log.last_index() || !reply.success)
            .unwrap_or_default();

        if lagging {
            self.send_append_entries(target).await;
        }

        committed
    }

    /// Mark that the last request to `target` failed without a reply.
    ///
    /// It will be retried by the next heartbeat.
    pub(crate) fn handle_append_entries_error(&mut self, target: &NodeId) {
        if let Some(progress) = self.leader.progress.get_mut(target) {
            progress.inflight = false;
        }
    }

    /// Decide where to resume sending to a follower that rejected `prev`.
    ///
    /// The result is always less than `prev.index + 1` and greater than the
    /// index known to match.
    fn backtrack_next_index(
        &self,
        prev: LogId,
        conflict: Option<ConflictHint>,
        matched: u64,
    ) -> u64 {
        let next_index = match conflict {
            None => prev.index,
            Some(ConflictHint { term: None, index }) => index,
            Some(ConflictHint {
                term: Some(term),
                index,
            }) => match self.log.last_index_of_term(term) {
                Some(last) => last + 1,
                None => index,
            },
        };

        next_index.min(prev.index).max(matched + 1).max(1)
    }

    /// Advance the commit index to the greatest index of the current term that
    /// is stored on a quorum.
    ///
    /// Entries of previous terms are only committed indirectly, along with a
    /// later entry of the current term.
    ///
    /// Returns `true` if the commit index is advanced.
    pub(crate) fn try_commit(&mut self) -> bool {
        let term = self.leader.term;

        let matched = std::iter::once((self.id, self.log.last_index())).chain(
            self.leader.progress.iter().map(|(id, p)| (id, p.matched)),
        );
        let index = self.membership.quorum_value(matched);

        if index <= *self.commit_index {
            return false;
        }

        // Entries of an earlier term are committed only along with one of
        // the current term.
        if self.log.term_at(index) != Some(term) {
            debug!(
                "id={} index {} reached a quorum but is not of term {}",
                self.id, index, term
            );
            return false;
        }

        info!(
            "id={} commit index: {} -> {}, matched: {:?}",
            self.id,
            self.commit_index,
            index,
            self.leader.matched()
        );
        *self.commit_index = index;
        true
    }
}
