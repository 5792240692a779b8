//! Collection of implementations of usually used traits defined by raftpeer

pub use crate::raft::responder::impls::OneshotResponder;
