//! The Raft network interface.

use openraft_macros::add_async_trait;

use crate::network::connection::Connection;
use crate::storage::membership::NodeId;
use crate::Node;
use crate::OptionalSend;
use crate::OptionalSync;
use crate::TypeConfig;

pub mod connection;

/// Creates a [`Connection`] to a peer.
///
/// A Raft node asks for a new connection for every outgoing RPC and drops it
/// once the call returns or times out, so a connection should be cheap to
/// build.
#[add_async_trait]
pub trait Network<C>: OptionalSend + OptionalSync + 'static
where C: TypeConfig
{
    /// Actual type of the network handling a single connection.
    type Connection: Connection<C>;

    /// Create a client sending RPCs to `target`.
    ///
    /// It must not fail: a client that cannot reach its peer just returns an
    /// error from every RPC, and Raft treats that as a lost message.
    async fn new_connection(
        &mut self,
        target: NodeId,
        node: &Node,
    ) -> Self::Connection;
}
