//! Defines [`LogStorage`] trait.

use std::io;

use openraft_macros::add_async_trait;

use crate::OptionalSend;
use crate::OptionalSync;
use crate::TypeConfig;

/// Byte level API of the durable storage.
///
/// raftpeer stores its persistent state, i.e., `current_term`, `voted_for`
/// and the log, through this trait. In raft the vote is part of the log:
/// `vote` is about **when**, while `log` is about **what**.
///
/// ### To ensure correctness:
///
/// - `write` must be atomic: after a crash, `read` returns either the old or
///   the new value, never a mix of both.
/// - `write` must not return before the data is durable, e.g., `fsync`-ed.
/// - All write-IO must be serialized, i.e., a latter write must not be applied
///   before a former one is completed.
///
/// Implementations are cloned, and a clone must refer to the same storage.
#[add_async_trait]
pub trait LogStorage<C>: Clone + OptionalSend + OptionalSync + 'static
where C: TypeConfig
{
    /// Read the value stored at `path`, or `None` if it has never been
    /// written.
    async fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>, io::Error>;

    /// Atomically replace the value at `path` with `buf`.
    async fn write(&mut self, path: &str, buf: &[u8]) -> Result<(), io::Error>;
}
