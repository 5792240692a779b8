pub mod entry;
pub mod log_id;
mod raft_log;


pub use raft_log::RaftLog;
