//! Split the work of one loop round between client calls and notifications.
//!
//! Notifications carry RPC replies and ticks. They keep elections and
//! replication moving, so they get most of the round; client calls get a
//! share that grows while they pile up, but never past half of the round.

/// Per-round budget of messages the core drains from each channel.
pub(crate) struct Balancer {
    round: u64,

    /// Budget of `APIMessage`s per round, in 1/1000 of `round`.
    api_permille: u64,
}

impl Balancer {
    const MIN_PERMILLE: u64 = 1;
    const MAX_PERMILLE: u64 = 500;

    pub(crate) fn new(round: u64) -> Self {
        Self {
            round,
            api_permille: 100,
        }
    }

    pub(crate) fn api_message(&self) -> u64 {
        (self.round * self.api_permille / 1000).max(1)
    }

    pub(crate) fn notification(&self) -> u64 {
        self.round - self.api_message()
    }

    /// Called when the notification budget was used up.
    pub(crate) fn increase_notification(&mut self) {
        self.api_permille =
            (self.api_permille * 15 / 16).max(Self::MIN_PERMILLE);
    }

    /// Called when the client call budget was used up.
    pub(crate) fn increase_api_message(&mut self) {
        let grown = (self.api_permille * 17 / 16).max(self.api_permille + 1);
        self.api_permille = grown.min(Self::MAX_PERMILLE);
    }
}
