use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use maplit::btreeset;
use pretty_assertions::assert_eq;
use raftpeer::Config;

use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;

/// `submit()` appends a command only on the leader and returns where it is
/// appended. `get_state()` returns the term and whether it is the leader.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn submit_and_get_state() -> Result<()> {
    let config = Arc::new(
        Config {
            enable_tick: false,
            ..Default::default()
        }
        .validate()?,
    );

    let mut router = RaftRouter::new(config.clone(), btreeset! {s(0),s(1),s(2)});
    router.new_cluster().await?;

    tracing::info!("--- no leader, nothing is appended");
    {
        for id in [s(0), s(1), s(2)] {
            let raft = router.get_raft_handle(&id)?;
            assert_eq!((0, false), raft.get_state().await?);
            assert_eq!((0, 0, false), raft.submit(5).await?);
        }
    }

    tracing::info!("--- elect node 0");
    {
        router.elect(&s(0), timeout()).await?;

        assert_eq!((1, true), router.get_raft_handle(&s(0))?.get_state().await?);
        for id in [s(1), s(2)] {
            router.wait(&id, timeout()).current_leader(s(0), "follow node 0").await?;
            assert_eq!((1, false), router.get_raft_handle(&id)?.get_state().await?);
        }
    }

    tracing::info!("--- submit to the leader");
    {
        let leader = router.get_raft_handle(&s(0))?;
        assert_eq!((1, 1, true), leader.submit(7).await?);
        assert_eq!((2, 1, true), leader.submit(8).await?);

        assert_eq!((0, 1, false), router.get_raft_handle(&s(1))?.submit(9).await?);

        router.sync_commit(&s(0), 2, timeout()).await?;

        for id in [s(0), s(1), s(2)] {
            let applied = router.applied(&id);
            applied.assert_in_order();
            assert_eq!(vec![7, 8], applied.commands(), "node {}", id);

            let m = router.get_metrics(&id)?;
            assert_eq!(2, m.last_log_index, "node {}", id);
        }
    }

    Ok(())
}

fn timeout() -> Option<Duration> {
    Some(Duration::from_millis(2_000))
}
