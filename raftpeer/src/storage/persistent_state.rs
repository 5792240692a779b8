use crate::storage::log::entry::Entry;
use crate::storage::membership::NodeId;
use crate::storage::vote::Vote;
use crate::TypeConfig;

/// The state of a node that must survive a crash.
///
/// It is written as a whole, so that `current_term`, `voted_for` and the log
/// are always consistent with each other on storage.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(bound = "")]
pub struct PersistentState<C>
where C: TypeConfig
{
    pub current_term: u64,
    pub voted_for: Option<NodeId>,
    pub log: Vec<Entry<C>>,
}

impl<C> PersistentState<C>
where C: TypeConfig
{
    pub fn vote(&self) -> Vote {
        Vote::new(self.current_term, self.voted_for.clone())
    }
}

impl<C> Default for PersistentState<C>
where C: TypeConfig
{
    fn default() -> Self {
        Self {
            current_term: 0,
            voted_for: None,
            log: vec![],
        }
    }
}

impl<C> std::fmt::Debug for PersistentState<C>
where C: TypeConfig
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentState")
            .field("current_term", &self.current_term)
            .field("voted_for", &self.voted_for)
            .field("log", &self.log)
            .finish()
    }
}
