use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use maplit::btreeset;
use pretty_assertions::assert_eq;
use raftpeer::Config;

use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;

/// In a cluster of 3, one node is cut off. The other two elect a leader and
/// commit commands, the cut off node catches up when it comes back.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn commit_without_isolated_node() -> Result<()> {
    let config = Arc::new(Config::default().validate()?);

    let mut router = RaftRouter::new(config.clone(), btreeset! {s(0),s(1),s(2)});
    router.new_cluster().await?;

    let (leader, term) = router.check_one_leader(Duration::from_secs(3)).await?;

    tracing::info!(leader, term, "--- commit with all nodes");
    router.one(101, 3, Duration::from_secs(5)).await?;

    tracing::info!(leader, "--- isolate the leader");
    {
        router.isolate(&leader);

        let (leader2, term2) = router.check_one_leader(Duration::from_secs(3)).await?;
        assert_ne!(leader, leader2);
        assert!(term2 > term);

        let index = router.one(102, 2, Duration::from_secs(5)).await?;
        assert_eq!(2, index);

        let index = router.one(103, 2, Duration::from_secs(5)).await?;
        assert_eq!(3, index);
    }

    tracing::info!(leader, "--- the isolated node applied nothing new");
    {
        assert_eq!(vec![101], router.applied(&leader).commands());
    }

    tracing::info!(leader, "--- restore, the old leader catches up");
    {
        router.restore(&leader);

        let index = router.one(104, 3, Duration::from_secs(5)).await?;
        assert_eq!(4, index);

        for id in [s(0), s(1), s(2)] {
            router.applied(&id).wait_len(4, Duration::from_secs(1)).await?;
            router.applied(&id).assert_in_order();
            assert_eq!(vec![101, 102, 103, 104], router.applied(&id).commands());
        }
    }

    Ok(())
}
