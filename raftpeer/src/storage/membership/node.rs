use std::fmt;

/// Identifies a peer in the cluster.
pub type NodeId = String;

/// How to reach a peer.
///
/// raftpeer itself never looks into it: it is handed to
/// [`Network::new_connection`](crate::Network::new_connection) as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Node {
    /// The network address of the peer, such as `127.0.0.1:21001`.
    ///
    /// Empty for a network that addresses peers by id only.
    pub address: String,
}

impl Node {
    pub fn new(address: impl ToString) -> Self {
        Node {
            address: address.to_string(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}
