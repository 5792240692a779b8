use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use maplit::btreeset;
use pretty_assertions::assert_eq;
use raftpeer::Config;

use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;

/// The leader crashes after replicating an entry to a majority, before the
/// followers learn it is committed. The entry is recovered: only a node
/// holding it can be elected, and every node applies it.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn leader_crash_after_majority() -> Result<()> {
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
        router.get_raft_handle(&s(0))?.submit(1).await?;
        router.sync_commit(&s(0), 1, timeout()).await?;
    }

    tracing::info!("--- replicate entry 2 to node 1 and 2");
    {
        router.isolate(&s(3));
        router.isolate(&s(4));

        let (index, _, _) = router.get_raft_handle(&s(0))?.submit(2).await?;
        assert_eq!(2, index);

        router.wait(&s(0), timeout()).commit_index_at_least(2, "3 of 5 is a quorum").await?;

        for id in [s(1), s(2)] {
            let m = router.wait(&id, timeout()).log_index(2, "has entry 2").await?;
            assert_eq!(1, m.commit_index, "{} does not know 2 is committed", id);
        }
    }

    tracing::info!("--- crash node 0, node 3 can not be elected");
    {
        router.stop_node(&s(0)).await?;
        router.restore(&s(3));
        router.restore(&s(4));

        router.get_raft_handle(&s(3))?.elect().await?;
        router.wait(&s(1), timeout()).term(2, "node 1 sees the election of node 3").await?;
        router.wait(&s(2), timeout()).term(2, "node 2 sees the election of node 3").await?;

        tokio::time::sleep(Duration::from_millis(200)).await;
        let leaders = router.leaders(&router.connected_nodes())?;
        assert!(leaders.is_empty(), "node 3 lacks entry 2: {:?}", leaders);
    }

    tracing::info!("--- node 1 is elected, entry 2 commits with an entry of its term");
    {
        router.elect(&s(1), timeout()).await?;

        let (index, term, _) = router.get_raft_handle(&s(1))?.submit(3).await?;
        assert_eq!((3, 3), (index, term));

        router.sync_commit(&s(1), 3, timeout()).await?;

        for id in [s(1), s(2), s(3), s(4)] {
            let applied = router.applied(&id);
            applied.assert_in_order();
            assert_eq!(vec![1, 2, 3], applied.commands(), "node {}", id);
        }
    }

    Ok(())
}

fn timeout() -> Option<Duration> {
    Some(Duration::from_millis(2_000))
}
