use std::fmt;

use anyerror::AnyError;

use crate::raft::AppendEntriesReply;
use crate::raft::VoteReply;
use crate::storage::log::log_id::LogId;
use crate::storage::membership::NodeId;

/// A message coming from the internal components.
pub(crate) enum Notification {
    RequestVoteReply {
        target: NodeId,
        reply: VoteReply,

        /// The term in which the candidate sent the vote request.
        sender_term: u64,
    },

    AppendEntriesReply {
        target: NodeId,

        /// The term in which the leader sent the request.
        sender_term: u64,

        /// The `prev_log_id` of the request.
        prev_log_id: LogId,

        /// Number of entries carried by the request.
        n_entries: u64,

        /// The reply, or the error if the RPC failed or timed out.
        result: Result<AppendEntriesReply, AnyError>,
    },

    /// A tick event to wake up Core to check timeout etc.
    Tick {
        /// ith tick
        i: u64,
    },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestVoteReply {
                target,
                reply,
                sender_term,
            } => {
                write!(
                    f,
                    "VoteReply: from target={}, to candidate in term {}: {}",
                    target, sender_term, reply
                )
            }
            Self::AppendEntriesReply {
                target,
                sender_term,
                prev_log_id,
                n_entries,
                result,
            } => {
                write!(
                    f,
                    "AppendEntriesReply: from target={}, sent in term {}, prev:{}, n:{}, ",
                    target, sender_term, prev_log_id, n_entries
                )?;
                match result {
                    Ok(reply) => write!(f, "{}", reply),
                    Err(e) => write!(f, "error: {}", e),
                }
            }
            Self::Tick { i } => {
                write!(f, "Tick {}", i)
            }
        }
    }
}
