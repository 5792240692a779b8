use std::collections::BTreeMap;
use std::fmt::Debug;
use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use raftpeer::storage::LogStorage;
use tracing::debug;

/// An in-memory log storage implementing the [`LogStorage`] trait.
///
/// Clones share the same data, so a node restarted with a clone of the store
/// sees everything saved before the restart.
#[derive(Debug, Clone, Default)]
pub struct MemLogStore {
    store: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,

    /// When set, every write fails with an IO error.
    fail_writes: Arc<AtomicBool>,

    /// Number of successful writes.
    writes: Arc<AtomicU64>,
}

impl MemLogStore {
    /// Make all following writes fail, or succeed again.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Return a copy of the data stored at `path`.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        let store = self.store.lock().unwrap();
        store.get(path).cloned()
    }
}

impl<C> LogStorage<C> for MemLogStore
where C: raftpeer::TypeConfig
{
    async fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>, io::Error> {
        let store = self.store.lock().unwrap();
        let got = store.get(path).cloned();

        debug!(
            "MemLogStore::read: path={}, got {:?} bytes",
            path,
            got.as_ref().map(|x| x.len())
        );
        Ok(got)
    }

    async fn write(&mut self, path: &str, buf: &[u8]) -> Result<(), io::Error> {
        debug!("MemLogStore::write: path={}, {} bytes", path, buf.len());

        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(io::Error::other(format!(
                "MemLogStore: injected write failure: {}",
                path
            )));
        }

        let mut store = self.store.lock().unwrap();
        store.insert(path.to_string(), buf.to_vec());

        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
