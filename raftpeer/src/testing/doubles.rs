//! Stand-ins for the storage and network collaborators in unit tests.

use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;
use std::sync::Mutex;

use crate::errors::NetworkError;
use crate::raft::AppendEntries;
use crate::raft::AppendEntriesReply;
use crate::raft::RequestVote;
use crate::raft::VoteReply;
use crate::storage::membership::NodeId;
use crate::testing::UTConfig;
use crate::Connection;
use crate::LogStorage;
use crate::Network;
use crate::Node;

/// An in-memory [`LogStorage`], clones share the data.
#[derive(Clone, Default)]
pub(crate) struct MapStore {
    data: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl LogStorage<UTConfig> for MapStore {
    async fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>, io::Error> {
        Ok(self.data.lock().unwrap().get(path).cloned())
    }

    async fn write(&mut self, path: &str, buf: &[u8]) -> Result<(), io::Error> {
        self.data.lock().unwrap().insert(path.to_string(), buf.to_vec());
        Ok(())
    }
}

/// A [`Network`] whose peers never answer.
pub(crate) struct NoNetwork;

pub(crate) struct Unreachable;

impl Network<UTConfig> for NoNetwork {
    type Connection = Unreachable;

    async fn new_connection(
        &mut self,
        _target: NodeId,
        _node: &Node,
    ) -> Self::Connection {
        Unreachable
    }
}

impl Connection<UTConfig> for Unreachable {
    async fn request_vote(
        &mut self,
        _rpc: RequestVote,
    ) -> Result<VoteReply, NetworkError> {
        Err(unreachable_error())
    }

    async fn append_entries(
        &mut self,
        _rpc: AppendEntries<UTConfig>,
    ) -> Result<AppendEntriesReply, NetworkError> {
        Err(unreachable_error())
    }
}

fn unreachable_error() -> NetworkError {
    NetworkError::new(&io::Error::other("unreachable"))
}
