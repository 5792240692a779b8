use std::fmt;

use crate::base::display_ext::DisplayOptionExt;
use crate::base::display_ext::DisplaySliceExt;
use crate::storage::log::entry::Entry;
use crate::storage::log::log_id::LogId;
use crate::storage::membership::NodeId;
use crate::TypeConfig;

/// An RPC sent by a leader to replicate log entries (§5.3), also used as
/// heartbeat when `entries` is empty.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(bound = "")]
pub struct AppendEntries<C>
where C: TypeConfig
{
    pub term: u64,

    pub leader_id: NodeId,

    /// The id of the entry right before `entries`.
    pub prev_log_id: LogId,

    pub entries: Vec<Entry<C>>,

    /// The leader's commit index.
    pub leader_commit: u64,
}

impl<C> Clone for AppendEntries<C>
where C: TypeConfig
{
    fn clone(&self) -> Self {
        Self {
            term: self.term,
            leader_id: self.leader_id.clone(),
            prev_log_id: self.prev_log_id,
            entries: self.entries.clone(),
            leader_commit: self.leader_commit,
        }
    }
}

impl<C> fmt::Debug for AppendEntries<C>
where C: TypeConfig
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppendEntries")
            .field("term", &self.term)
            .field("leader_id", &self.leader_id)
            .field("prev_log_id", &self.prev_log_id)
            .field("entries", &self.entries)
            .field("leader_commit", &self.leader_commit)
            .finish()
    }
}

impl<C> fmt::Display for AppendEntries<C>
where C: TypeConfig
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids = self.entries.iter().map(|e| e.log_id).collect::<Vec<_>>();
        write!(
            f,
            "{{term:{}, leader:{}, prev:{}, entries:{}, leader_commit:{}}}",
            self.term,
            self.leader_id,
            self.prev_log_id,
            ids.display(),
            self.leader_commit
        )
    }
}

impl<C> AppendEntries<C>
where C: TypeConfig
{
    pub fn prev_log_index(&self) -> u64 {
        self.prev_log_id.index
    }

    pub fn prev_log_term(&self) -> u64 {
        self.prev_log_id.term
    }

    /// The index of the last entry carried by this request, or `prev` if it
    /// is a heartbeat.
    pub fn last_index(&self) -> u64 {
        self.prev_log_id.index + self.entries.len() as u64
    }
}

/// Tells the leader where a follower's log diverges, so that it does not have
/// to step back one entry at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct ConflictHint {
    /// The term of the follower's entry at `prev_log_id.index`, or `None` if
    /// the follower's log is shorter than that.
    pub term: Option<u64>,

    /// The first index of `term` in the follower's log, or the follower's log
    /// length plus one if `term` is `None`.
    pub index: u64,
}

impl fmt::Display for ConflictHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{term:{}, index:{}}}", self.term.display(), self.index)
    }
}

/// The response to an [`AppendEntries`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct AppendEntriesReply {
    /// The current term of the follower, after handling the request.
    pub term: u64,

    /// True if the follower contained an entry matching `prev_log_id` and
    /// stored the entries.
    pub success: bool,

    /// Set when the request is rejected because of a log mismatch.
    pub conflict: Option<ConflictHint>,
}

impl AppendEntriesReply {
    pub fn success(term: u64) -> Self {
        Self {
            term,
            success: true,
            conflict: None,
        }
    }

    pub fn reject(term: u64, conflict: Option<ConflictHint>) -> Self {
        Self {
            term,
            success: false,
            conflict,
        }
    }
}

impl fmt::Display for AppendEntriesReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{term:{}, success:{}, conflict:{}}}",
            self.term,
            self.success,
            self.conflict.display()
        )
    }
}
