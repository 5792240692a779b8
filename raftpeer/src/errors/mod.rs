//! Error types exposed by this crate.

use std::error::Error;
use std::fmt;
use std::io;

use anyerror::AnyError;
use tracing::error;

use crate::storage::log::log_id::LogId;
use crate::storage::membership::NodeId;
use crate::storage::vote::Vote;

pub(crate) fn to_any_error<E: fmt::Display + 'static>(e: E) -> AnyError {
    error!("error: {}", e);
    AnyError::error(e)
}

/// Fatal is unrecoverable and shuts down raft at once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[derive(serde::Deserialize, serde::Serialize)]
pub enum Fatal {
    /// Persisting the state failed. The node can not make any further
    /// promise to its peers and stops.
    #[error(transparent)]
    StorageError(#[from] AnyError),

    #[error("panicked")]
    Panicked,

    /// Raft stopped normally.
    #[error("Stopped normally")]
    Stopped,
}

impl From<io::Error> for Fatal {
    fn from(value: io::Error) -> Self {
        Fatal::StorageError(AnyError::new(&value))
    }
}

/// Error that indicates a **temporary** network error.
///
/// An RPC that fails with it is not retried on its own: the next heartbeat or
/// election round sends a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("NetworkError: {source}")]
pub struct NetworkError {
    #[from]
    source: AnyError,
}

impl NetworkError {
    pub fn new<E: Error + 'static>(e: &E) -> Self {
        Self {
            source: AnyError::new(e),
        }
    }
}

/// A write request is sent to a node that is not the leader.
///
/// `leader_id` is the leader this node knows of in its current term, if any.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[derive(serde::Deserialize, serde::Serialize)]
#[error("has to forward request to: {leader_id:?}")]
pub struct ForwardToLeader {
    pub leader_id: Option<NodeId>,
}

impl ForwardToLeader {
    pub const fn empty() -> Self {
        Self { leader_id: None }
    }

    pub fn new(leader_id: NodeId) -> Self {
        Self {
            leader_id: Some(leader_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum RejectVoteRequest {
    #[error("reject vote request by a greater term: {0}")]
    ByTerm(u64),

    #[error("reject vote request, already voted: {0}")]
    ByVote(Vote),

    #[error("reject vote request by a greater last-log-id: {0}")]
    ByLastLogId(LogId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum RejectAppendEntries {
    #[error("reject append-entries by a greater term: {0}")]
    ByTerm(u64),

    #[error("reject append-entries, local log does not contain prev: {prev}")]
    ByLogMismatch { prev: LogId },
}
