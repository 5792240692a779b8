//! Raft metrics for observability.
//!
//! Applications may use this data in whatever way is needed. The obvious use
//! cases are to expose these metrics to a metrics collection system like
//! Prometheus. Applications may also use this data to trigger events within
//! higher levels of the parent application.
//!
//! Metrics are observed on a running Raft node via the [`Raft::metrics() ->
//! watch::Receiver<Metrics>`](`crate::Raft::metrics`) method, which will
//! return a stream of metrics.
//!
//! ## [`Metrics`]
//!
//! [`Metrics`] contains useful information such as:
//!
//! - Server state(leader/follower/candidate) of this raft node,
//! - The current leader,
//! - Last log, committed and applied log index.
//! - Replication state, if this node is a Leader.
//!
//! Metrics is not a stream thus it only guarantees to provide the latest state
//! but not every change of the state.
//! Because internally, `watch::channel()` only stores one last state.

mod metric;
mod metrics;
mod wait;

mod server_state;

pub use metric::Metric;
pub use metrics::Metrics;
pub use server_state::ServerState;
pub use wait::Wait;
pub use wait::WaitError;
