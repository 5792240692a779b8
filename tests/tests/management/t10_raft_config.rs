use std::sync::Arc;

use anyhow::Result;
use maplit::btreeset;
use raftpeer::Config;

use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;

/// Get config via [`Raft::config`](raftpeer::Raft::config)
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn raft_config() -> Result<()> {
    let config = Arc::new(
        Config {
            enable_tick: false,
            election_timeout_min: 123,
            election_timeout_max: 124,
            max_payload_entries: 7,
            ..Default::default()
        }
        .validate()?,
    );

    let mut router = RaftRouter::new(config.clone(), btreeset! {s(0)});

    tracing::info!("--- initializing cluster");
    router.new_cluster().await?;

    tracing::info!("--- get config");
    {
        let n0 = router.get_raft_handle(&s(0))?;
        let c = n0.config();

        #[allow(clippy::bool_assert_comparison)]
        {
            assert_eq!(c.enable_tick, false);
        }
        assert_eq!(c.election_timeout_min, 123);
        assert_eq!(c.election_timeout_max, 124);
        assert_eq!(c.max_payload_entries, 7);
    }

    Ok(())
}
