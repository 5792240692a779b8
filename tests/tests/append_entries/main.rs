#[path = "../fixtures/mod.rs"]
mod fixtures;

// The number indicate the preferred running order for these case.
// The later tests may depend on the earlier ones.

mod t30_reject_smaller_term;
mod t40_deposed_leader_waits_election_timeout;
