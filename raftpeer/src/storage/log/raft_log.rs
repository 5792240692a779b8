use std::fmt;

use crate::base::display_ext::DisplaySliceExt;
use crate::storage::log::entry::Entry;
use crate::storage::log::log_id::LogId;
use crate::TypeConfig;

/// The in-memory copy of a node's log.
///
/// Indexes are 1-based. Index 0 is a sentinel with term 0 and no command, so
/// that `prev_log_id` of the first entry always exists.
///
/// The log only grows at the end, except when a leader's entry conflicts with
/// a local one: then every entry since the conflict is removed.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(bound = "")]
pub struct RaftLog<C>
where C: TypeConfig
{
    entries: Vec<Entry<C>>,
}

impl<C> Default for RaftLog<C>
where C: TypeConfig
{
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C> Clone for RaftLog<C>
where C: TypeConfig
{
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<C> fmt::Debug for RaftLog<C>
where C: TypeConfig
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaftLog").field("entries", &self.entries).finish()
    }
}

impl<C> fmt::Display for RaftLog<C>
where C: TypeConfig
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids = self.entries.iter().map(|e| e.log_id).collect::<Vec<_>>();
        write!(f, "{}", ids.display())
    }
}

impl<C> RaftLog<C>
where C: TypeConfig
{
    /// Build a log from entries loaded from storage.
    ///
    /// The entries must be consecutive and start at index 1.
    pub fn new(entries: Vec<Entry<C>>) -> Self {
        debug_assert!(
            entries.iter().enumerate().all(|(i, e)| e.log_id.index == i as u64 + 1),
            "log entries must be consecutive and start from 1"
        );
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry<C>] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The id of the last entry, or the sentinel `T0-0` if the log is empty.
    pub fn last_log_id(&self) -> LogId {
        self.entries.last().map(|e| e.log_id).unwrap_or_default()
    }

    pub fn last_index(&self) -> u64 {
        self.entries.len() as u64
    }

    /// Returns the term of the entry at `index`, `Some(0)` for the sentinel, or
    /// `None` if there is no such entry.
    pub fn term_at(&self, index: u64) -> Option<u64> {
        if index == 0 {
            return Some(0);
        }
        self.get(index).map(|e| e.log_id.term)
    }

    /// Returns the log id at `index`, including the sentinel.
    pub fn log_id_at(&self, index: u64) -> Option<LogId> {
        self.term_at(index).map(|term| LogId::new(term, index))
    }

    pub fn get(&self, index: u64) -> Option<&Entry<C>> {
        if index == 0 {
            return None;
        }
        self.entries.get((index - 1) as usize)
    }

    /// Returns if this log contains an entry with the given id.
    pub fn contains(&self, log_id: &LogId) -> bool {
        self.term_at(log_id.index) == Some(log_id.term)
    }

    /// Clone at most `max` entries starting from index `start`.
    pub fn entries_from(&self, start: u64, max: u64) -> Vec<Entry<C>> {
        let start = start.max(1);
        if start > self.last_index() {
            return vec![];
        }

        let begin = (start - 1) as usize;
        let end = begin.saturating_add(max as usize).min(self.entries.len());
        self.entries[begin..end].to_vec()
    }

    /// Index of the first entry created in `term`.
    pub fn first_index_of_term(&self, term: u64) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.log_id.term == term)
            .map(|e| e.log_id.index)
    }

    /// Index of the last entry created in `term`.
    pub fn last_index_of_term(&self, term: u64) -> Option<u64> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.log_id.term == term)
            .map(|e| e.log_id.index)
    }

    /// Append an entry created by this node as leader.
    pub fn append(&mut self, entry: Entry<C>) {
        debug_assert_eq!(
            entry.log_id.index,
            self.last_index() + 1,
            "appended entry must follow the last one"
        );
        debug_assert!(
            entry.log_id.term >= self.last_log_id().term,
            "term of entries must not decrease"
        );
        self.entries.push(entry);
    }

    /// Append entries sent by a leader right after `prev`.
    ///
    /// The caller must have checked that `prev` is in this log.
    ///
    /// Entries that are already present with the same log id are skipped.
    /// The local log is truncated only at the first entry that conflicts, so
    /// a delayed or duplicated request never removes entries that a newer
    /// request has appended.
    ///
    /// Returns `true` if the log changed.
    pub fn append_from_leader(
        &mut self,
        prev: &LogId,
        entries: Vec<Entry<C>>,
    ) -> bool {
        debug_assert!(self.contains(prev));

        let mut new_entries = entries.into_iter().peekable();

        while let Some(ent) = new_entries.peek() {
            match self.term_at(ent.log_id.index) {
                Some(term) if term == ent.log_id.term => {
                    new_entries.next();
                }
                Some(_) => {
                    self.truncate_since(ent.log_id.index);
                    break;
                }
                None => break,
            }
        }

        let mut changed = false;
        for ent in new_entries {
            self.append(ent);
            changed = true;
        }
        changed
    }

    /// Remove every entry at and after `index`.
    pub(crate) fn truncate_since(&mut self, index: u64) {
        debug_assert!(index >= 1);
        self.entries.truncate((index - 1) as usize);
    }
}
