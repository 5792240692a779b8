pub(crate) mod candidate;
pub(crate) mod leader;
pub(crate) mod leader_handler;
pub(crate) mod vote_handler;
