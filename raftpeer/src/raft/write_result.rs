use crate::errors::ForwardToLeader;
use crate::storage::log::log_id::LogId;

/// The result of a write request to a Raft node.
///
/// `Ok` carries the log id assigned to the command. It only means the entry is
/// stored in the leader's log: whether it is committed is learned from the
/// apply channel.
pub type WriteResult = Result<LogId, ForwardToLeader>;
