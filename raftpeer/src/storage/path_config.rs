pub(crate) struct PathConfig;

impl PathConfig {
    /// Where the whole persistent state is stored.
    pub fn state_path() -> &'static str {
        "/meta/raft_state.json"
    }
}
