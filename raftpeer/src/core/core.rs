use std::convert::Infallible;
use std::ops::Deref;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyerror::AnyError;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::Instrument;
use tracing::Level;
use tracing::Span;

use crate::base::display_ext::DisplayOptionExt;
use crate::base::leased::Leased;
use crate::config::Config;
use crate::config::RuntimeConfig;
use crate::core::applier::Applier;
use crate::core::io::api_message::APIMessage;
use crate::core::io::balancer::Balancer;
use crate::core::io::notification::Notification;
use crate::core::roles::candidate::Candidate;
use crate::core::roles::leader::Leader;
use crate::core::roles::leader_handler::LeaderHandler;
use crate::core::roles::vote_handler::VoteHandler;
use crate::core::CandidateState;
use crate::core::LeaderState;
use crate::errors::Fatal;
use crate::errors::ForwardToLeader;
use crate::errors::RejectAppendEntries;
use crate::metrics::Metrics;
use crate::metrics::ServerState;
use crate::network::connection::Connection;
use crate::network::Network;
use crate::raft::responder::Responder;
use crate::raft::AppendEntries;
use crate::raft::AppendEntriesReply;
use crate::raft::ConflictHint;
use crate::raft::RequestVote;
use crate::raft::VoteReply;
use crate::raft::WriteResult;
use crate::storage::log::entry::Entry;
use crate::storage::log::log_id::LogId;
use crate::storage::log::RaftLog;
use crate::storage::membership::Membership;
use crate::storage::membership::NodeId;
use crate::storage::vote::Vote;
use crate::storage::LogStorage;
use crate::storage::LogStorageExt;
use crate::TypeConfig;

/// The core type implementing the Raft protocol.
pub struct Core<C, Net, Log>
where
    C: TypeConfig,
    Net: Network<C>,
    Log: LogStorage<C>,
{
    /// This node's ID.
    pub(crate) id: NodeId,

    /// This node's runtime config.
    pub(crate) config: Arc<Config>,

    pub(crate) runtime_config: Arc<RuntimeConfig>,

    /// All nodes of the cluster, including this one.
    pub(crate) membership: Membership,

    /// The [`Network`] implementation.
    pub(crate) network: Net,

    /// The [`LogStorage`] implementation.
    pub(crate) log_store: Log,

    /// `current_term` and `voted_for`.
    ///
    /// The lease is the election timeout: it is renewed when a vote is granted
    /// or a legitimate leader is heard from, or an election starts.
    pub(crate) vote: Leased<Vote>,

    pub(crate) log: RaftLog<C>,

    /// The greatest index known to be committed.
    pub(crate) commit_index: u64,

    /// The leader of the current term known to this node.
    pub(crate) current_leader: Option<NodeId>,

    /// Represents the Leader state.
    pub(crate) leader: LeaderState,

    /// Represents the Candidate state.
    pub(crate) candidate: CandidateState,

    pub(crate) applier: Applier<C>,

    pub(crate) rx_api: mpsc::UnboundedReceiver<APIMessage<C>>,

    /// A Sender to send callback by other components to [`Core`], such as the
    /// reply of an RPC sent to another node.
    pub(crate) tx_notification: mpsc::UnboundedSender<Notification>,

    /// A Receiver to receive callback from other components.
    pub(crate) rx_notification: mpsc::UnboundedReceiver<Notification>,

    pub(crate) rx_shutdown: oneshot::Receiver<()>,

    pub(crate) tx_metrics: watch::Sender<Metrics>,

    pub(crate) span: Span,
}

impl<C, Net, Log> Core<C, Net, Log>
where
    C: TypeConfig,
    Net: Network<C>,
    Log: LogStorage<C>,
{
    /// The main loop of the Raft protocol.
    pub(crate) async fn main(mut self) -> Result<Infallible, Fatal> {
        debug!("Raft node started");

        // Initialize metrics
        self.report_metrics();

        let span = tracing::span!(parent: &self.span, Level::DEBUG, "main");
        let res = self.runtime_loop().instrument(span).await;

        // Flush buffered metrics
        self.report_metrics();

        let err = match res {
            Ok(never) => match never {},
            Err(err) => err,
        };

        match err {
            Fatal::Stopped => { /* Normal quit */ }
            _ => {
                error!(error = display(&err), "quit Core::main on error");
            }
        }

        debug!("update the metrics for shutdown");
        {
            let mut curr = self.tx_metrics.borrow().clone();
            curr.running_state = Err(err.clone());

            let _ = self.tx_metrics.send(curr);
        }

        info!("Core shutdown complete");

        Err(err)
    }

    /// Report a metrics payload on the current state of the Raft node.
    pub(crate) fn report_metrics(&mut self) {
        let server_state = if self.leader.is_some() {
            ServerState::Leader
        } else if self.candidate.is_some() {
            ServerState::Candidate
        } else {
            ServerState::Follower
        };

        let m = Metrics {
            running_state: Ok(()),
            id: self.id.clone(),

            current_term: self.vote.term(),
            vote: self.vote.deref().clone(),
            last_log_index: self.log.last_index(),
            commit_index: self.commit_index,
            last_applied: self.applier.last_applied(),

            server_state,
            current_leader: self.current_leader(),
            replication: self.leader.as_ref().map(|l| l.matched()),
        };

        let (changed, transited) = {
            let prev = self.tx_metrics.borrow();
            (
                *prev != m,
                prev.server_state != m.server_state
                    || prev.current_term != m.current_term,
            )
        };

        if !changed {
            return;
        }

        if transited {
            info!("id={} state transition: {}", self.id, m);
        } else {
            debug!("id={} report_metrics: {}", self.id, m);
        }
        let res = self.tx_metrics.send(m);

        if let Err(err) = res {
            error!(error=%err, id=display(&self.id), "error reporting metrics");
        }
    }

    pub(crate) fn current_leader(&self) -> Option<NodeId> {
        if self.leader.is_some() {
            return Some(self.id.clone());
        }
        self.current_leader.clone()
    }

    /// Run an event handling loop
    ///
    /// It always returns a [`Fatal`] error upon returning.
    #[tracing::instrument(level = "debug", skip_all, fields(id=display(&self.id)))]
    async fn runtime_loop(&mut self) -> Result<Infallible, Fatal> {
        // Ratio control the ratio of number of APIMessage to process to number
        // of Notification to process.
        let mut balancer = Balancer::new(10_000);

        loop {
            self.report_metrics();

            debug!("id={} runtime_loop: wait for next event", self.id);

            futures::select_biased! {
                _ = (&mut self.rx_shutdown).fuse() => {
                    info!("id={} recv from rx_shutdown", self.id);
                    return Err(Fatal::Stopped);
                }

                notify_res = self.rx_notification.recv().fuse() => {
                    match notify_res {
                        Some(notify) => self.handle_notification(notify).await?,
                        None => {
                            error!("all rx_notify senders are dropped");
                            return Err(Fatal::Stopped);
                        }
                    };
                }

                msg_res = self.rx_api.recv().fuse() => {
                    match msg_res {
                        Some(msg) => self.handle_api_msg(msg).await?,
                        None => {
                            info!("all rx_api senders are dropped");
                            return Err(Fatal::Stopped);
                        }
                    };
                }
            }

            // There is a message waking up the loop, process channels one by
            // one.

            let api_messages_processed =
                self.process_api_msg(balancer.api_message()).await?;
            let notify_processed =
                self.process_notification(balancer.notification()).await?;

            // If one of the channel consumed all its budget, re-balance the
            // budget ratio.

            #[allow(clippy::collapsible_else_if)]
            if notify_processed == balancer.notification() {
                info!("there may be more Notification to process, increase Notification ratio");
                balancer.increase_notification();
            } else {
                if api_messages_processed == balancer.api_message() {
                    info!("there may be more APIMessage to process, increase APIMessage ratio");
                    balancer.increase_api_message();
                }
            }
        }
    }

    /// Process APIMessage as many as possible.
    ///
    /// It returns the number of processed message.
    /// If the input channel is closed, it returns `Fatal::Stopped`.
    async fn process_api_msg(&mut self, at_most: u64) -> Result<u64, Fatal> {
        for i in 0..at_most {
            let res = self.rx_api.try_recv();
            let msg = match res {
                Ok(msg) => msg,
                Err(e) => match e {
                    TryRecvError::Empty => {
                        return Ok(i);
                    }
                    TryRecvError::Disconnected => {
                        info!("id={} rx_api is disconnected, quit", self.id);
                        return Err(Fatal::Stopped);
                    }
                },
            };

            self.handle_api_msg(msg).await?;
        }

        debug!(
            "id={} at_most({}) reached, there are more queued APIMessage to process",
            self.id,
            at_most
        );

        Ok(at_most)
    }

    /// Process Notification as many as possible.
    ///
    /// It returns the number of processed notifications.
    /// If the input channel is closed, it returns `Fatal::Stopped`.
    async fn process_notification(
        &mut self,
        at_most: u64,
    ) -> Result<u64, Fatal> {
        for i in 0..at_most {
            let res = self.rx_notification.try_recv();
            let notify = match res {
                Ok(msg) => msg,
                Err(e) => match e {
                    TryRecvError::Empty => {
                        return Ok(i);
                    }
                    TryRecvError::Disconnected => {
                        error!("rx_notify is disconnected, quit");
                        return Err(Fatal::Stopped);
                    }
                },
            };

            self.handle_notification(notify).await?;
        }

        debug!(
            "at_most({}) reached, there are more queued Notification to process",
            at_most
        );

        Ok(at_most)
    }

    #[tracing::instrument(level = "debug", skip(self, msg), fields(id=display(&self.id)))]
    pub(crate) async fn handle_api_msg(
        &mut self,
        msg: APIMessage<C>,
    ) -> Result<(), Fatal> {
        debug!("RAFT_event id={:<2}  input: {}", self.id, msg);

        match msg {
            APIMessage::RequestVote { rpc, tx } => {
                let reply = self.handle_request_vote(rpc).await?;
                let _ = tx.send(reply);
            }
            APIMessage::AppendEntries { rpc, tx } => {
                let reply = self.handle_append_entries(rpc).await?;
                let _ = tx.send(reply);
            }
            APIMessage::Write { app_data, tx } => {
                let res = self.write_entry(app_data).await?;
                tx.send(res);
            }
            APIMessage::Submit { app_data, tx } => {
                let res = self.write_entry(app_data).await?;
                let reply = match res {
                    Ok(log_id) => (log_id.index, log_id.term, true),
                    Err(_) => (0, self.vote.term(), false),
                };
                let _ = tx.send(reply);
            }
            APIMessage::GetState { tx } => {
                let _ = tx.send((self.vote.term(), self.leader.is_some()));
            }
            APIMessage::Elect => {
                if self.leader.is_some() {
                    info!("ExternalCommand: already a Leader");
                } else {
                    self.elect().await?;
                }
            }
            APIMessage::BroadcastHeartbeat => {
                if let Ok(mut lh) = self.leader_handler() {
                    lh.broadcast_heartbeat().await;
                }
            }
        };

        Ok(())
    }

    pub(crate) async fn handle_notification(
        &mut self,
        notify: Notification,
    ) -> Result<(), Fatal> {
        debug!("RAFT_event id={:<2} notify: {}", self.id, notify);

        match notify {
            Notification::RequestVoteReply {
                target,
                reply,
                sender_term,
            } => {
                self.handle_vote_reply(target, reply, sender_term).await?;
            }

            Notification::AppendEntriesReply {
                target,
                sender_term,
                prev_log_id,
                n_entries,
                result,
            } => {
                self.handle_append_entries_reply(
                    target,
                    sender_term,
                    prev_log_id,
                    n_entries,
                    result,
                )
                .await?;
            }

            Notification::Tick { i } => {
                let now = Instant::now();
                debug!("received tick: {}, now: {:?}", i, now);

                self.tick_election(now).await?;
                self.tick_heartbeat(now).await;
            }
        };
        Ok(())
    }

    /// Persist `current_term`, `voted_for` and the log.
    ///
    /// A failure is fatal: the node stops before anything depending on the
    /// unsaved state is sent out.
    async fn save_state(&mut self) -> Result<(), Fatal> {
        let res =
            self.log_store.save_state(self.vote.deref(), self.log.entries()).await;

        if let Err(e) = res {
            error!(
                "id={} failed to save state: vote: {}, last log: {}, error: {}",
                self.id,
                self.vote.deref(),
                self.log.last_log_id(),
                e
            );
            return Err(Fatal::from(e));
        }

        debug!(
            "id={} saved state: vote: {}, last log: {}",
            self.id,
            self.vote.deref(),
            self.log.last_log_id()
        );
        Ok(())
    }

    /// Append a command to the log if this node is the leader.
    async fn write_entry(
        &mut self,
        app_data: C::AppData,
    ) -> Result<WriteResult, Fatal> {
        if self.leader.is_none() {
            return Ok(Err(self.forward_to_leader()));
        }

        let log_id = LogId::new(self.vote.term(), self.log.last_index() + 1);
        self.log.append(Entry::new(log_id, app_data));

        self.save_state().await?;

        debug!("id={} AppendEntry: {}", self.id, log_id);

        if let Ok(mut lh) = self.leader_handler() {
            lh.try_commit();
            lh.replicate_all().await;
        }
        self.apply_committed();

        Ok(Ok(log_id))
    }

    /// Start an election: become candidate of the next term and vote for
    /// itself.
    async fn elect(&mut self) -> Result<(), Fatal> {
        let now = Instant::now();
        let term = self.vote.term() + 1;
        let lease = self.config.new_rand_election_timeout();

        self.vote.update(now, lease, Vote::new(term, Some(self.id.clone())));
        self.leader = None;
        self.current_leader = None;
        self.candidate = Some(Candidate::new(now, term));

        self.save_state().await?;

        info!(
            "id={} start election: vote: {}, last log: {}, election timeout: {:?}",
            self.id,
            self.vote.deref(),
            self.log.last_log_id(),
            lease
        );

        let self_granted = match self.candidate.as_mut() {
            Some(candidate) => candidate.grant_by(&self.id, &self.membership),
            None => false,
        };

        if self_granted {
            self.establish_leader().await;
            return Ok(());
        }

        let req = RequestVote::new(
            term,
            self.id.clone(),
            self.log.last_log_id(),
        );
        self.broadcast_request_vote(&req).await;

        Ok(())
    }

    /// Spawn parallel vote requests to all other cluster members.
    async fn broadcast_request_vote(&mut self, req: &RequestVote) {
        let peers = self
            .membership
            .peers(&self.id)
            .map(|(id, node)| (id.clone(), node.clone()))
            .collect::<Vec<_>>();

        for (target, target_node) in peers {
            let mut client =
                self.network.new_connection(target.clone(), &target_node).await;

            let req = req.clone();
            let sender_term = req.term;
            let ttl = self.config.rpc_timeout();
            let tx = self.tx_notification.clone();

            let fu = async move {
                let res = tokio::time::timeout(ttl, client.request_vote(req))
                    .await
                    .map_err(|e| AnyError::new(&e))
                    .and_then(|r| r.map_err(|e| AnyError::new(&e)));

                let reply = match res {
                    Ok(reply) => reply,
                    Err(e) => {
                        debug!("request vote to {} failed: {}", target, e);
                        return;
                    }
                };

                let notification = Notification::RequestVoteReply {
                    target,
                    reply,
                    sender_term,
                };

                let _ = tx.send(notification);
            };

            let span = tracing::debug_span!("request_vote", sender_term);
            // False positive lint warning(`non-binding `let` on a future`): https://github.com/rust-lang/rust-clippy/issues/9932
            #[allow(clippy::let_underscore_future)]
            let _ = tokio::spawn(fu.instrument(span));
        }
    }

    pub(crate) async fn handle_vote_reply(
        &mut self,
        target: NodeId,
        reply: VoteReply,
        sender_term: u64,
    ) -> Result<(), Fatal> {
        let lease = self.config.new_rand_election_timeout();
        if self.vote_handler().update_term(reply.term, lease) {
            info!(
                "id={} saw greater term {} in vote reply from {}",
                self.id, reply.term, target
            );
            self.save_state().await?;
            return Ok(());
        }

        let Some(candidate) = self.candidate.as_mut() else {
            // If the voting process has finished or canceled,
            // just ignore the delayed vote reply.
            return Ok(());
        };

        if candidate.term != sender_term {
            debug!(
                "id={} ignore vote reply of term {}, candidate term: {}",
                self.id, sender_term, candidate.term
            );
            return Ok(());
        }

        if !reply.vote_granted {
            return Ok(());
        }

        if candidate.grant_by(&target, &self.membership) {
            info!("id={} a quorum granted my vote", self.id);
            self.establish_leader().await;
        }

        Ok(())
    }

    /// Candidate vote is granted by a quorum, leader established.
    async fn establish_leader(&mut self) {
        let Some(candidate) = self.candidate.take() else {
            return;
        };

        debug_assert_eq!(candidate.term, self.vote.term());
        debug_assert_eq!(self.vote.voted_for(), Some(&self.id));

        info!(
            "id={} become leader of term {}, last log: {}",
            self.id,
            candidate.term,
            self.log.last_log_id()
        );

        let leader = Leader::new(
            candidate.term,
            &self.id,
            &self.membership,
            self.log.last_index(),
        );
        self.leader = Some(Box::new(leader));
        self.current_leader = Some(self.id.clone());

        if let Ok(mut lh) = self.leader_handler() {
            lh.try_commit();
            lh.broadcast_heartbeat().await;
        }
        self.apply_committed();
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub(crate) async fn handle_request_vote(
        &mut self,
        req: RequestVote,
    ) -> Result<VoteReply, Fatal> {
        let now = Instant::now();
        let my_last_log_id = self.log.last_log_id();

        info!(req = display(&req), "handle_request_vote");
        info!(
            my_vote = display(self.vote.deref()),
            my_last_log_id = display(&my_last_log_id),
            lease = display(self.vote.display_lease_info(now)),
            "handle_request_vote"
        );

        let lease = self.config.new_rand_election_timeout();

        let mut changed = self.vote_handler().update_term(req.term, lease);
        let res = self.vote_handler().grant_vote(&req, &my_last_log_id, lease);

        info!(
            req = display(&req),
            result = debug(&res),
            "handle vote request result"
        );

        if let Ok(true) = res {
            changed = true;
        }

        if changed {
            self.save_state().await?;
        }

        Ok(VoteReply::new(self.vote.term(), res.is_ok()))
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub(crate) async fn handle_append_entries(
        &mut self,
        req: AppendEntries<C>,
    ) -> Result<AppendEntriesReply, Fatal> {
        debug!(req = display(&req), "handle_append_entries");

        if req.term < self.vote.term() {
            let reject = RejectAppendEntries::ByTerm(self.vote.term());
            info!(req = display(&req), "{}", reject);
            return Ok(AppendEntriesReply::reject(self.vote.term(), None));
        }

        let lease = self.config.new_rand_election_timeout();

        let mut changed = self.vote_handler().update_term(req.term, lease);
        self.vote_handler().follow_leader(&req.leader_id, lease);

        if !self.log.contains(&req.prev_log_id) {
            let reject =
                RejectAppendEntries::ByLogMismatch { prev: req.prev_log_id };
            let hint = self.conflict_hint(&req.prev_log_id);
            info!(
                "{}, last log: {}, conflict hint: {}",
                reject,
                self.log.last_log_id(),
                hint
            );

            if changed {
                self.save_state().await?;
            }
            return Ok(AppendEntriesReply::reject(
                self.vote.term(),
                Some(hint),
            ));
        }

        let last_new_index = req.last_index();
        let leader_commit = req.leader_commit;

        if self.log.append_from_leader(&req.prev_log_id, req.entries) {
            changed = true;
        }

        if changed {
            self.save_state().await?;
        }

        let commit_index = std::cmp::min(leader_commit, last_new_index);
        if commit_index > self.commit_index {
            debug!(
                "id={} commit index: {} -> {}",
                self.id, self.commit_index, commit_index
            );
            self.commit_index = commit_index;
        }
        self.apply_committed();

        Ok(AppendEntriesReply::success(self.vote.term()))
    }

    /// Tell the leader where this log diverges from `prev`.
    fn conflict_hint(&self, prev: &LogId) -> ConflictHint {
        match self.log.term_at(prev.index) {
            None => ConflictHint {
                term: None,
                index: self.log.last_index() + 1,
            },
            Some(term) => ConflictHint {
                term: Some(term),
                index: self.log.first_index_of_term(term).unwrap_or(prev.index),
            },
        }
    }

    async fn handle_append_entries_reply(
        &mut self,
        target: NodeId,
        sender_term: u64,
        prev_log_id: LogId,
        n_entries: u64,
        result: Result<AppendEntriesReply, AnyError>,
    ) -> Result<(), Fatal> {
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                debug!(
                    "id={} AppendEntries to {} failed: {}",
                    self.id, target, e
                );
                if let Ok(mut lh) = self.leader_handler() {
                    if lh.leader.term == sender_term {
                        lh.handle_append_entries_error(&target);
                    }
                }
                return Ok(());
            }
        };

        let lease = self.config.new_rand_election_timeout();
        if self.vote_handler().update_term(reply.term, lease) {
            info!(
                "id={} saw greater term {} in AppendEntries reply from {}",
                self.id, reply.term, target
            );
            self.save_state().await?;
            return Ok(());
        }

        if let Ok(mut lh) = self.leader_handler() {
            if lh.leader.term != sender_term {
                return Ok(());
            }
            lh.handle_append_entries_reply(target, prev_log_id, n_entries, reply)
                .await;
        } else {
            return Ok(());
        }

        self.apply_committed();
        Ok(())
    }

    async fn tick_heartbeat(&mut self, now: Instant) {
        if !self.runtime_config.enable_heartbeat.load(Ordering::Relaxed) {
            return;
        }

        let Ok(mut lh) = self.leader_handler() else {
            return;
        };

        if now < lh.leader.next_heartbeat {
            return;
        }

        lh.broadcast_heartbeat().await;
    }

    async fn tick_election(&mut self, now: Instant) -> Result<(), Fatal> {
        if self.leader.is_some() {
            debug!(
                "id={} already a leader, do not elect again in this tick",
                self.id
            );
            return Ok(());
        }

        if !self.runtime_config.enable_elect.load(Ordering::Relaxed) {
            debug!("id={} election is disabled", self.id);
            return Ok(());
        }

        debug!(
            "id={} check if to elect: {}",
            self.id,
            self.vote.display_lease_info(now),
        );

        if self.vote.is_expired(now) {
            info!("id={} election timeout passed, about to elect", self.id);
        } else {
            debug!("id={} election timeout has not yet passed", self.id);
            return Ok(());
        }

        self.elect().await
    }

    fn apply_committed(&mut self) {
        self.applier.apply(&self.log, self.commit_index);
    }

    pub(crate) fn vote_handler(&mut self) -> VoteHandler<'_> {
        VoteHandler {
            id: &self.id,
            vote: &mut self.vote,
            leader: &mut self.leader,
            candidate: &mut self.candidate,
            current_leader: &mut self.current_leader,
        }
    }

    /// Build a ForwardToLeader error that contains the leader id
    pub(crate) fn forward_to_leader(&self) -> ForwardToLeader {
        debug!(
            "id={} not a leader, known leader: {}",
            self.id,
            self.current_leader.display()
        );

        match &self.current_leader {
            Some(id) => ForwardToLeader::new(id.clone()),
            None => ForwardToLeader::empty(),
        }
    }

    pub(crate) fn leader_handler(
        &mut self,
    ) -> Result<LeaderHandler<'_, C, Net>, ForwardToLeader> {
        match self.leader.as_mut() {
            Some(leader) => Ok(LeaderHandler {
                config: self.config.as_ref(),
                id: &self.id,
                network: &mut self.network,
                membership: &self.membership,
                log: &self.log,
                commit_index: &mut self.commit_index,
                tx_notification: self.tx_notification.clone(),
                leader,
            }),
            None => Err(ForwardToLeader {
                leader_id: self.current_leader.clone(),
            }),
        }
    }
}
