//! Public interface and data types.
//!
//! [`Raft`] serves as the primary interface to a Raft node,
//! facilitating all interactions with the underlying Core.
//!
//! While `Core` operates as a singleton within an application, [`Raft`]
//! instances are designed to be cheaply cloneable.
//! This allows multiple components within the application that require
//! interaction with `Core` to efficiently share access.

mod append_entries;
mod applied;
mod inner;
mod request_vote;
pub mod responder;
mod runtime_config_handle;
mod write_result;

use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tracing::info;
use tracing::trace_span;
use tracing::Instrument;
use tracing::Level;

pub use self::append_entries::AppendEntries;
pub use self::append_entries::AppendEntriesReply;
pub use self::append_entries::ConflictHint;
pub use self::applied::Applied;
pub use self::request_vote::RequestVote;
pub use self::request_vote::VoteReply;
pub use self::runtime_config_handle::RuntimeConfigHandle;
pub use self::write_result::WriteResult;
use crate::base::leased::Leased;
use crate::config::Config;
use crate::config::RuntimeConfig;
use crate::core::applier::Applier;
use crate::core::core::Core;
use crate::core::core_state::CoreState;
use crate::core::io::api_message::APIMessage;
use crate::core::Tick;
use crate::errors::Fatal;
use crate::metrics::Metrics;
use crate::metrics::Wait;
use crate::raft::inner::RaftInner;
use crate::raft::responder::Responder;
use crate::storage::log::RaftLog;
use crate::storage::membership::Membership;
use crate::storage::membership::NodeId;
use crate::storage::LogStorage;
use crate::storage::LogStorageExt;
use crate::storage::PersistentState;
use crate::Network;
use crate::OptionalSend;
pub use crate::TypeConfig;

/// The Raft API.
///
/// ### Clone
///
/// This type implements `Clone`, and cloning itself is very cheap and helps to
/// facilitate use with async workflows.
///
/// ### Shutting down
///
/// If any of the interfaces returns a [`Fatal`], this indicates that
/// the Raft node is shutting down. If the parent application needs to
/// shutdown the Raft node for any reason, calling `shutdown` will do the
/// trick.
#[derive(Clone)]
pub struct Raft<C>
where C: TypeConfig
{
    inner: Arc<RaftInner<C>>,
}

impl<C> Raft<C>
where C: TypeConfig
{
    /// Create and spawn a new Raft task.
    ///
    /// The persisted state is loaded from `log_store` before the node starts,
    /// so a restarted node resumes with the term, vote and log it saved. It
    /// always starts as a follower.
    ///
    /// ### `id`
    /// The ID which the spawned Raft task will use to identify itself within
    /// the cluster. It must be one of the nodes in `membership`, and must be
    /// stable across restarts.
    ///
    /// ### `config`
    /// Raft's runtime config. See the docs on the `Config` object for more
    /// details.
    ///
    /// ### `membership`
    /// All nodes of the cluster, including this one. It does not change.
    ///
    /// ### `network`
    /// An implementation of the [`Network`] trait which will be used
    /// by Raft for sending RPCs to peer nodes within the cluster.
    ///
    /// ### `log_store`
    /// An implementation of the [`LogStorage`] trait which will be used by
    /// Raft to persist its state.
    ///
    /// ### `tx_apply`
    /// Committed entries are sent to it in log order, see [`Applied`].
    #[tracing::instrument(level = "debug", skip_all, fields(id=display(&id)))]
    pub async fn new<Log, Net>(
        id: NodeId,
        config: Arc<Config>,
        membership: Membership,
        network: Net,
        mut log_store: Log,
        tx_apply: mpsc::UnboundedSender<Applied<C>>,
    ) -> Result<Self, Fatal>
    where
        Net: Network<C>,
        Log: LogStorage<C>,
    {
        let state = log_store.load_state().await?;

        let state = match state {
            Some(st) => {
                info!(
                    "id={} restore state: term: {}, voted_for: {:?}, log len: {}",
                    id,
                    st.current_term,
                    st.voted_for,
                    st.log.len()
                );
                st
            }
            None => {
                info!("id={} no saved state, start from scratch", id);
                PersistentState::default()
            }
        };

        let vote = state.vote();
        let log = RaftLog::new(state.log);

        let (tx_api, rx_api) = mpsc::unbounded_channel();
        let (tx_notify, rx_notify) = mpsc::unbounded_channel();
        let (tx_shutdown, rx_shutdown) = oneshot::channel();

        let mut initial_metrics = Metrics::new_initial(id.clone());
        initial_metrics.current_term = vote.term();
        initial_metrics.vote = vote.clone();
        initial_metrics.last_log_index = log.last_index();
        let (tx_metrics, rx_metrics) = watch::channel(initial_metrics);

        let tick_handle = Tick::spawn(
            config.heartbeat_interval() / 2,
            tx_notify.clone(),
            config.enable_tick,
        );

        let runtime_config = Arc::new(RuntimeConfig::new(&config));

        let core_span = tracing::span!(
            parent: tracing::Span::current(),
            Level::DEBUG,
            "Core",
            id = display(&id),
        );

        let core: Core<C, Net, Log> = Core {
            id: id.clone(),
            config: config.clone(),
            runtime_config: runtime_config.clone(),
            membership,
            network,
            log_store,

            vote: Leased::new(
                tokio::time::Instant::now(),
                config.new_rand_election_timeout(),
                vote,
            ),
            log,

            commit_index: 0,
            current_leader: None,
            leader: None,
            candidate: None,

            applier: Applier::new(tx_apply),

            rx_api,

            tx_notification: tx_notify,
            rx_notification: rx_notify,

            rx_shutdown,

            tx_metrics,

            span: core_span,
        };

        let core_handle = tokio::spawn(
            core.main().instrument(trace_span!("spawn").or_current()),
        );

        let inner = RaftInner {
            id,
            config,
            runtime_config,
            tick_handle,
            tx_api,
            rx_metrics,
            tx_shutdown: std::sync::Mutex::new(Some(tx_shutdown)),
            core_state: std::sync::Mutex::new(CoreState::Running(core_handle)),
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Return a handle to update runtime config.
    ///
    /// Such enabling/disabling heartbeat, election, etc.
    ///
    /// Example:
    /// ```ignore
    /// let raft = Raft::new(...).await?;
    /// raft.runtime_config().heartbeat(true);
    /// raft.runtime_config().tick(true);
    /// raft.runtime_config().elect(true);
    /// ```
    pub fn runtime_config(&self) -> RuntimeConfigHandle<C> {
        RuntimeConfigHandle::new(self.inner.as_ref())
    }

    /// Return the config of this Raft node.
    pub fn config(&self) -> &Arc<Config> {
        &self.inner.config
    }

    /// Trigger election at once and return at once.
    ///
    /// Returns error when Core has [`Fatal`] error, e.g. shut down or
    /// having storage error. It is not affected by
    /// `RuntimeConfigHandle::elect(false)`.
    pub async fn elect(&self) -> Result<(), Fatal> {
        let msg = APIMessage::Elect;
        self.inner.send_msg(msg).await?;
        Ok(())
    }

    /// Trigger a heartbeat at once and return at once.
    ///
    /// Returns error when Core has [`Fatal`] error, e.g. shut down or
    /// having storage error. It is not affected by
    /// `RuntimeConfigHandle::heartbeat(false)`.
    pub async fn broadcast_heartbeat(&self) -> Result<(), Fatal> {
        let msg = APIMessage::BroadcastHeartbeat;
        self.inner.send_msg(msg).await?;
        Ok(())
    }

    /// Submit a RequestVote RPC to this Raft node.
    ///
    /// These RPCs are sent by cluster peers which are in candidate state
    /// attempting to gather votes (§5.2).
    ///
    /// The reply is returned only after any change to the vote is persisted.
    pub async fn handle_request_vote(
        &self,
        rpc: RequestVote,
    ) -> Result<VoteReply, Fatal> {
        tracing::info!(rpc = display(&rpc), "handle_request_vote()");

        let (tx, rx) = oneshot::channel();
        self.inner.call_core(APIMessage::RequestVote { rpc, tx }, rx).await
    }

    /// Submit an AppendEntries RPC to this Raft node.
    ///
    /// These RPCs are sent by the leader to replicate log entries (§5.3), and
    /// as heartbeat when there is no entry to send (§5.2).
    ///
    /// The reply is returned only after any change to the term or log is
    /// persisted.
    pub async fn handle_append_entries(
        &self,
        rpc: AppendEntries<C>,
    ) -> Result<AppendEntriesReply, Fatal> {
        tracing::debug!(rpc = display(&rpc), "handle_append_entries()");

        let (tx, rx) = oneshot::channel();
        self.inner.call_core(APIMessage::AppendEntries { rpc, tx }, rx).await
    }

    /// Get the ID of the current leader from this Raft node.
    ///
    /// This method is based on the Raft metrics system which does a good job
    /// at staying up-to-date; however, it may be stale. This method is perfect
    /// for making decisions on where to route client requests.
    pub fn current_leader(&self) -> Option<NodeId> {
        self.inner.rx_metrics.borrow().current_leader.clone()
    }

    /// Propose a command, `Start()` in the Raft paper's lab interface.
    ///
    /// Returns `(index, term, is_leader)`. If this node is the leader, the
    /// command is appended to its log at `index` in `term` and the call
    /// returns without waiting for it to commit. Otherwise `is_leader` is
    /// false, `index` is 0 and nothing is appended.
    ///
    /// A returned index is not a promise that the command will be committed:
    /// it may be overwritten if this leader loses leadership.
    pub async fn submit(
        &self,
        app_data: C::AppData,
    ) -> Result<(u64, u64, bool), Fatal> {
        let (tx, rx) = oneshot::channel();
        self.inner.call_core(APIMessage::Submit { app_data, tx }, rx).await
    }

    /// Returns `(current_term, is_leader)`.
    pub async fn get_state(&self) -> Result<(u64, bool), Fatal> {
        let (tx, rx) = oneshot::channel();
        self.inner.call_core(APIMessage::GetState { tx }, rx).await
    }

    /// Submit a mutating client request to Raft (§5.1).
    ///
    /// It is appended to the leader's log and replicated. The returned log id
    /// tells where it is stored; when it is committed, it is delivered to the
    /// apply channel. If this node is not the leader, a
    /// [`ForwardToLeader`](crate::errors::ForwardToLeader) error with the
    /// known leader is returned.
    pub async fn write<E>(
        &self,
        app_data: C::AppData,
    ) -> Result<WriteResult, Fatal>
    where
        <C::Responder as Responder<C>>::Receiver:
            Future<Output = Result<WriteResult, E>>,
        E: Error + OptionalSend,
    {
        let rx = self.write_ff(app_data).await?;

        let res: WriteResult = self.inner.recv_msg(rx).await?;

        Ok(res)
    }

    /// Submit a mutating client request to Raft, returns an application
    /// defined response receiver [`Responder::Receiver`].
    ///
    /// `_ff` means fire and forget.
    ///
    /// It is same as [`Raft::write`] but does not wait for the response.
    #[tracing::instrument(level = "debug", skip(self, app_data))]
    pub async fn write_ff(
        &self,
        app_data: C::AppData,
    ) -> Result<<C::Responder as Responder<C>>::Receiver, Fatal> {
        let (app_data, tx, rx) = <C::Responder as Responder<C>>::from_app_data(app_data);

        self.inner.send_msg(APIMessage::Write { app_data, tx }).await?;

        Ok(rx)
    }

    /// Get a handle to the metrics channel.
    pub fn metrics(&self) -> watch::Receiver<Metrics> {
        self.inner.rx_metrics.clone()
    }

    /// Get a handle to wait for the metrics to satisfy some condition.
    ///
    /// If `timeout` is `None`, then it will wait forever(10 years).
    /// If `timeout` is `Some`, then it will wait for the specified duration.
    ///
    /// ```ignore
    /// # use std::time::Duration;
    /// # use raftpeer::{ServerState, Raft};
    ///
    /// let timeout = Duration::from_millis(200);
    ///
    /// // wait for raft log-3 to be committed and applied:
    /// r.wait(Some(timeout)).applied_index(3, "log").await?;
    ///
    /// // wait for ever for raft node's current leader to become 3:
    /// r.wait(None).current_leader(nid(3), "wait for leader").await?;
    ///
    /// // wait for raft state to become a follower
    /// r.wait(None).state(ServerState::Follower, "state").await?;
    /// ```
    pub fn wait(&self, timeout: Option<Duration>) -> Wait {
        let timeout = match timeout {
            Some(t) => t,
            None => Duration::from_secs(86400 * 365 * 100),
        };
        Wait {
            timeout,
            rx: self.inner.rx_metrics.clone(),
        }
    }

    /// Stop this node, `Kill()` in the Raft paper's lab interface.
    ///
    /// It returns after the Core task quits. Every later call to this node
    /// returns [`Fatal::Stopped`]. If the node had already stopped because of
    /// an error, that error is returned.
    pub async fn shutdown(&self) -> Result<(), Fatal> {
        let tx = self.inner.tx_shutdown.lock().unwrap().take();
        if let Some(tx) = tx {
            let send_res = tx.send(());
            info!("id={} sent shutdown signal: {:?}", self.inner.id, send_res);
        }

        self.inner.tick_handle.shutdown();

        self.inner.join_core_task().await;

        let core_res = self.inner.core_result();
        match core_res {
            Some(Err(Fatal::Stopped)) | None => Ok(()),
            Some(Err(fatal)) => Err(fatal),
            Some(Ok(never)) => match never {},
        }
    }
}
