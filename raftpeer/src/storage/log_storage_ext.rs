use std::io;

use openraft_macros::add_async_trait;

use crate::storage::log::entry::Entry;
use crate::storage::membership::NodeId;
use crate::storage::path_config::PathConfig;
use crate::storage::persistent_state::PersistentState;
use crate::storage::vote::Vote;
use crate::storage::LogStorage;
use crate::TypeConfig;

/// Typed persistence built on the byte level [`LogStorage`].
///
/// The state is encoded as JSON and stored under a single path, so a save is
/// as atomic as [`LogStorage::write`].
#[add_async_trait]
pub trait LogStorageExt<C>: LogStorage<C>
where C: TypeConfig
{
    /// Persist `current_term`, `voted_for` and the whole log.
    async fn save_state(
        &mut self,
        vote: &Vote,
        log: &[Entry<C>],
    ) -> Result<(), io::Error> {
        #[derive(serde::Serialize)]
        #[serde(bound = "")]
        struct StateRef<'a, C: TypeConfig> {
            current_term: u64,
            voted_for: &'a Option<NodeId>,
            log: &'a [Entry<C>],
        }

        let state = StateRef::<C> {
            current_term: vote.term,
            voted_for: &vote.voted_for,
            log,
        };

        let buf = serde_json::to_vec(&state)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.write(PathConfig::state_path(), &buf).await
    }

    /// Load the persisted state, or `None` if nothing has been saved.
    async fn load_state(
        &mut self,
    ) -> Result<Option<PersistentState<C>>, io::Error> {
        let data = self.read(PathConfig::state_path()).await?;

        let Some(data) = data else {
            return Ok(None);
        };

        let state: PersistentState<C> = serde_json::from_slice(&data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok(Some(state))
    }
}

impl<C, T> LogStorageExt<C> for T
where
    C: TypeConfig,
    T: LogStorage<C>,
{
}
