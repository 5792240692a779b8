use tokio::sync::mpsc;
use tracing::debug;
use tracing::warn;

use crate::raft::Applied;
use crate::storage::log::RaftLog;
use crate::TypeConfig;

/// Delivers committed entries to the application in log order.
pub(crate) struct Applier<C>
where C: TypeConfig
{
    tx_apply: mpsc::UnboundedSender<Applied<C>>,

    /// The index of the last entry delivered, `lastApplied`.
    last_applied: u64,
}

impl<C> Applier<C>
where C: TypeConfig
{
    pub(crate) fn new(tx_apply: mpsc::UnboundedSender<Applied<C>>) -> Self {
        Self {
            tx_apply,
            last_applied: 0,
        }
    }

    pub(crate) fn last_applied(&self) -> u64 {
        self.last_applied
    }

    /// Deliver every entry in `(last_applied, commit_index]`.
    ///
    /// A closed receiver does not stop the node: entries are still counted as
    /// applied so that `last_applied` keeps following `commit_index`.
    pub(crate) fn apply(&mut self, log: &RaftLog<C>, commit_index: u64) {
        while self.last_applied < commit_index {
            let index = self.last_applied + 1;

            let Some(entry) = log.get(index) else {
                tracing::error!(
                    "committed entry {} is not in log, last index: {}",
                    index,
                    log.last_index()
                );
                return;
            };

            let applied = Applied {
                index,
                term: entry.log_id.term,
                command: entry.payload.clone(),
            };

            debug!("apply: {}", applied);

            if let Err(e) = self.tx_apply.send(applied) {
                warn!("apply receiver is closed, drop: {}", e.0);
            }

            self.last_applied = index;
        }
    }
}
