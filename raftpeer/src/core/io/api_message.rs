use std::fmt;

use tokio::sync::oneshot;

use crate::raft::AppendEntries;
use crate::raft::AppendEntriesReply;
use crate::raft::RequestVote;
use crate::raft::VoteReply;
use crate::TypeConfig;

/// A message sent by application to the [`Core`].
///
/// [`Core`]: crate::core::core::Core
pub(crate) enum APIMessage<C>
where C: TypeConfig
{
    RequestVote {
        rpc: RequestVote,
        tx: oneshot::Sender<VoteReply>,
    },

    AppendEntries {
        rpc: AppendEntries<C>,
        tx: oneshot::Sender<AppendEntriesReply>,
    },

    Write {
        app_data: C::AppData,
        tx: C::Responder,
    },

    /// Same as `Write`, but replies with `(index, term, is_leader)`.
    Submit {
        app_data: C::AppData,
        tx: oneshot::Sender<(u64, u64, bool)>,
    },

    /// Query `(current_term, is_leader)`.
    GetState {
        tx: oneshot::Sender<(u64, bool)>,
    },

    Elect,

    BroadcastHeartbeat,
}

impl<C> fmt::Display for APIMessage<C>
where C: TypeConfig
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            APIMessage::RequestVote { rpc, .. } => {
                write!(f, "RequestVote: {}", rpc)
            }
            APIMessage::AppendEntries { rpc, .. } => {
                write!(f, "AppendEntries: {}", rpc)
            }
            APIMessage::Write { .. } => {
                write!(f, "Write")
            }
            APIMessage::Submit { .. } => {
                write!(f, "Submit")
            }
            APIMessage::GetState { .. } => {
                write!(f, "GetState")
            }
            APIMessage::Elect => {
                write!(f, "Elect")
            }
            APIMessage::BroadcastHeartbeat => {
                write!(f, "BroadcastHeartbeat")
            }
        }
    }
}
