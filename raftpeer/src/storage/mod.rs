//! The storage interface and the data types of the persistent state.

pub mod log;
mod log_storage;
mod log_storage_ext;
pub mod membership;
pub(crate) mod path_config;
mod persistent_state;
pub mod vote;

pub use log_storage_ext::LogStorageExt;

pub use self::log_storage::LogStorage;
pub use self::persistent_state::PersistentState;
