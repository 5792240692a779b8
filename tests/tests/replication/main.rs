#[path = "../fixtures/mod.rs"]
mod fixtures;

// The number indicate the preferred running order for these case.
// The later tests may depend on the earlier ones.

mod t10_commit_without_isolated_node;
mod t20_leader_crash_before_majority;
mod t21_leader_crash_after_majority;
mod t40_conflict_backtrack;
mod t50_unreliable_network;
