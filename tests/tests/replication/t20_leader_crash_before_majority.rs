use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use maplit::btreeset;
use pretty_assertions::assert_eq;
use raftpeer::Config;

use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;

/// The leader crashes after replicating an entry to a minority. The entry is
/// lost: a node without it is elected and overrides it, no node applies it.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn leader_crash_before_majority() -> Result<()> {
    let config = Arc::new(
        Config {
            enable_tick: false,
            ..Default::default()
        }
        .validate()?,
    );

    let mut router = RaftRouter::new(config.clone(), btreeset! {s(0),s(1),s(2),s(3),s(4)});
    router.new_cluster().await?;

    tracing::info!("--- elect node 0, commit entry 1 on all nodes");
    {
        router.elect(&s(0), timeout()).await?;

        let (index, term, is_leader) = router.get_raft_handle(&s(0))?.submit(1).await?;
        assert_eq!((1, 1, true), (index, term, is_leader));

        router.sync_commit(&s(0), 1, timeout()).await?;
    }

    tracing::info!("--- replicate entry 2 only to node 1");
    {
        for id in [s(2), s(3), s(4)] {
            router.isolate(&id);
        }

        let (index, _, _) = router.get_raft_handle(&s(0))?.submit(2).await?;
        assert_eq!(2, index);

        router.wait(&s(1), timeout()).log_index(2, "node 1 has entry 2").await?;

        tokio::time::sleep(Duration::from_millis(200)).await;
        let m = router.get_metrics(&s(0))?;
        assert_eq!(1, m.commit_index, "2 of 5 is not a quorum");
    }

    tracing::info!("--- crash node 0, elect node 2 while node 1 is cut off");
    {
        router.stop_node(&s(0)).await?;

        router.isolate(&s(1));
        for id in [s(2), s(3), s(4)] {
            router.restore(&id);
        }

        router.elect(&s(2), timeout()).await?;
        router.restore(&s(1));

        let (index, term, is_leader) = router.get_raft_handle(&s(2))?.submit(3).await?;
        assert!(is_leader);
        assert_eq!(2, index);
        assert!(term > 1);

        router.sync_commit(&s(2), 2, timeout()).await?;
    }

    tracing::info!("--- entry 2 is overridden on node 1 and applied by nobody");
    {
        for id in [s(1), s(2), s(3), s(4)] {
            let applied = router.applied(&id);
            applied.assert_in_order();
            assert_eq!(vec![1, 3], applied.commands(), "node {}", id);
        }
    }

    Ok(())
}

fn timeout() -> Option<Duration> {
    Some(Duration::from_millis(2_000))
}
