use std::sync::Arc;

use anyhow::Result;
use maplit::btreeset;
use pretty_assertions::assert_eq;
use raftpeer::errors::Fatal;
use raftpeer::Config;

use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;
use crate::fixtures::TestRaft;

/// After `shutdown()` every call returns `Fatal::Stopped`, and shutting down
/// again is fine.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn shutdown() -> Result<()> {
    let config = Arc::new(
        Config {
            enable_tick: false,
            ..Default::default()
        }
        .validate()?,
    );

    let mut router = RaftRouter::new(config.clone(), btreeset! {s(0)});
    let raft: TestRaft = router.new_raft_node(&s(0)).await?;

    tracing::info!("--- a single node cluster elects itself");
    {
        let m = router.elect(&s(0), None).await?;
        assert_eq!(1, m.current_term);
        assert_eq!((1, 1, true), raft.submit(3).await?);
    }

    tracing::info!("--- shutdown");
    {
        raft.shutdown().await?;

        assert_eq!(Err(Fatal::Stopped), raft.get_state().await);
        assert_eq!(Err(Fatal::Stopped), raft.submit(4).await);
        assert_eq!(Err(Fatal::Stopped), raft.elect().await);

        let m = raft.metrics().borrow().clone();
        assert_eq!(Err(Fatal::Stopped), m.running_state);

        raft.shutdown().await?;
    }

    Ok(())
}
