use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use rand::Rng;
use raftpeer::errors::NetworkError;
use raftpeer::raft::AppendEntries;
use raftpeer::raft::AppendEntriesReply;
use raftpeer::raft::RequestVote;
use raftpeer::raft::VoteReply;
use raftpeer::Connection;
use raftpeer::Network;
use raftpeer::Node;
use raftpeer::NodeId;
use raftpeer::Raft;
use raftpeer::TypeConfig;
use tracing::debug;

/// The state shared by every node's view of the network.
struct Shared<C>
where C: TypeConfig
{
    peers: Mutex<BTreeMap<NodeId, Raft<C>>>,

    /// Nodes that can neither send nor receive.
    isolated: Mutex<BTreeSet<NodeId>>,

    /// When set, RPCs are randomly delayed, and some are lost.
    unreliable: AtomicBool,

    /// Number of RPCs sent, delivered or not.
    rpc_count: AtomicU64,
}

/// A network that delivers RPCs by calling the target [`Raft`] in the same
/// process.
///
/// All clones share the same peers and partition state. Each node should use
/// the instance returned by [`DirectNetwork::for_node`], so that RPCs it sends
/// are dropped while it is isolated.
#[derive(Clone)]
pub struct DirectNetwork<C>
where C: TypeConfig
{
    source: Option<NodeId>,
    shared: Arc<Shared<C>>,
}

impl<C> Default for DirectNetwork<C>
where C: TypeConfig
{
    fn default() -> Self {
        Self {
            source: None,
            shared: Arc::new(Shared {
                peers: Default::default(),
                isolated: Default::default(),
                unreliable: AtomicBool::new(false),
                rpc_count: AtomicU64::new(0),
            }),
        }
    }
}

impl<C> DirectNetwork<C>
where C: TypeConfig
{
    /// Returns the view of this network used by node `id` to send RPCs.
    pub fn for_node(&self, id: NodeId) -> Self {
        Self {
            source: Some(id),
            shared: self.shared.clone(),
        }
    }

    pub fn add_peer(&self, node_id: NodeId, raft: Raft<C>) {
        let mut peers = self.shared.peers.lock().unwrap();
        peers.insert(node_id, raft);
    }

    pub fn remove_peer(&self, node_id: &NodeId) -> Option<Raft<C>> {
        let mut peers = self.shared.peers.lock().unwrap();
        peers.remove(node_id)
    }

    pub fn get_peer(&self, node_id: &NodeId) -> Option<Raft<C>> {
        let peers = self.shared.peers.lock().unwrap();
        peers.get(node_id).cloned()
    }

    /// Cut every link of `node_id`.
    pub fn isolate(&self, node_id: &NodeId) {
        let mut isolated = self.shared.isolated.lock().unwrap();
        isolated.insert(node_id.clone());
    }

    /// Bring back the links of `node_id`.
    pub fn restore(&self, node_id: &NodeId) {
        let mut isolated = self.shared.isolated.lock().unwrap();
        isolated.remove(node_id);
    }

    pub fn set_unreliable(&self, unreliable: bool) {
        self.shared.unreliable.store(unreliable, Ordering::Relaxed);
    }

    /// Total number of RPCs sent by all nodes.
    pub fn rpc_count(&self) -> u64 {
        self.shared.rpc_count.load(Ordering::Relaxed)
    }
}

impl<C> Network<C> for DirectNetwork<C>
where C: TypeConfig
{
    type Connection = Conn<C>;

    async fn new_connection(
        &mut self,
        target: NodeId,
        _node: &Node,
    ) -> Self::Connection {
        Conn {
            source: self.source.clone(),
            target,
            shared: self.shared.clone(),
        }
    }
}

pub struct Conn<C>
where C: TypeConfig
{
    source: Option<NodeId>,
    target: NodeId,
    shared: Arc<Shared<C>>,
}

impl<C> Conn<C>
where C: TypeConfig
{
    fn is_connected(&self) -> bool {
        let isolated = self.shared.isolated.lock().unwrap();

        if isolated.contains(&self.target) {
            return false;
        }

        match &self.source {
            Some(source) => !isolated.contains(source),
            None => true,
        }
    }

    /// Returns the target if the link is up, after a random delay and a
    /// chance of losing the message if the network is unreliable.
    async fn deliver(&self) -> Result<Raft<C>, NetworkError> {
        self.shared.rpc_count.fetch_add(1, Ordering::Relaxed);

        if self.shared.unreliable.load(Ordering::Relaxed) {
            let (delay, lost) = {
                let mut rng = rand::thread_rng();
                (rng.gen_range(0..27), rng.gen_range(0..10) == 0)
            };

            tokio::time::sleep(Duration::from_millis(delay)).await;

            if lost {
                return Err(self.unreachable("message lost"));
            }
        }

        if !self.is_connected() {
            return Err(self.unreachable("link is cut"));
        }

        let peers = self.shared.peers.lock().unwrap();
        match peers.get(&self.target) {
            Some(raft) => Ok(raft.clone()),
            None => Err(self.unreachable("no such peer")),
        }
    }

    /// The reply is lost if the link is cut while the request is handled.
    fn check_reply(&self) -> Result<(), NetworkError> {
        if !self.is_connected() {
            return Err(self.unreachable("link is cut, reply lost"));
        }
        Ok(())
    }

    fn unreachable(&self, reason: &str) -> NetworkError {
        let msg = format!(
            "{:?} -> {}: {}",
            self.source, self.target, reason
        );
        debug!("DirectNetwork: {}", msg);
        NetworkError::new(&io::Error::new(io::ErrorKind::NotConnected, msg))
    }
}

impl<C> Connection<C> for Conn<C>
where C: TypeConfig
{
    async fn request_vote(
        &mut self,
        rpc: RequestVote,
    ) -> Result<VoteReply, NetworkError> {
        let raft = self.deliver().await?;

        let reply = raft
            .handle_request_vote(rpc)
            .await
            .map_err(|e| NetworkError::new(&e))?;

        self.check_reply()?;
        Ok(reply)
    }

    async fn append_entries(
        &mut self,
        rpc: AppendEntries<C>,
    ) -> Result<AppendEntriesReply, NetworkError> {
        let raft = self.deliver().await?;

        let reply = raft
            .handle_append_entries(rpc)
            .await
            .map_err(|e| NetworkError::new(&e))?;

        self.check_reply()?;
        Ok(reply)
    }
}
