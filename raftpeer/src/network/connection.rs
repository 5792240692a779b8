use openraft_macros::add_async_trait;

use crate::errors::NetworkError;
use crate::raft::AppendEntries;
use crate::raft::AppendEntriesReply;
use crate::raft::RequestVote;
use crate::raft::VoteReply;
use crate::OptionalSend;
use crate::OptionalSync;
use crate::TypeConfig;

/// A trait defining the interface for a network between cluster members.
///
/// A single connection instance is used to send RPCs to a single target
/// node. It is constructed by the [`Network`](`crate::network::Network`).
///
/// An RPC may be lost, delayed or duplicated by the underlying network. The
/// caller puts a timeout on every call and never waits for a reply forever.
#[add_async_trait]
pub trait Connection<C>: OptionalSend + OptionalSync + 'static
where C: TypeConfig
{
    /// Send a RequestVote RPC to the target.
    async fn request_vote(
        &mut self,
        rpc: RequestVote,
    ) -> Result<VoteReply, NetworkError>;

    /// Send an AppendEntries RPC to the target.
    async fn append_entries(
        &mut self,
        rpc: AppendEntries<C>,
    ) -> Result<AppendEntriesReply, NetworkError>;
}
