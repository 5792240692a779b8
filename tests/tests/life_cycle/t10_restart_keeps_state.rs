use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use maplit::btreeset;
use pretty_assertions::assert_eq;
use raftpeer::Config;
use raftpeer::ServerState;
use raftpeer::Vote;

use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;

/// A restarted node loads its term, vote and log from the store. Commit and
/// apply start over from 0, and committed entries are applied again once the
/// node learns the commit index.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn restart_keeps_state() -> Result<()> {
    let config = Arc::new(
        Config {
            enable_tick: false,
            ..Default::default()
        }
        .validate()?,
    );

    let mut router = RaftRouter::new(config.clone(), btreeset! {s(0),s(1),s(2)});
    router.new_cluster().await?;

    tracing::info!("--- commit 3 commands");
    {
        router.elect(&s(0), timeout()).await?;

        let leader = router.get_raft_handle(&s(0))?;
        for cmd in [1, 2, 3] {
            leader.submit(cmd).await?;
        }
        router.sync_commit(&s(0), 3, timeout()).await?;
    }

    tracing::info!("--- restart all nodes");
    {
        for id in [s(0), s(1), s(2)] {
            router.stop_node(&id).await?;
        }
        for id in [s(0), s(1), s(2)] {
            router.new_raft_node(&id).await?;
        }

        for id in [s(0), s(1), s(2)] {
            let m = router.get_metrics(&id)?;
            assert_eq!(ServerState::Follower, m.server_state);
            assert_eq!(1, m.current_term);
            assert_eq!(3, m.last_log_index);
            assert_eq!(0, m.commit_index);
            assert_eq!(0, m.last_applied);
            assert_eq!(None, m.current_leader);
        }

        let m = router.get_metrics(&s(0))?;
        assert_eq!(Vote::new(1, Some(s(0))), m.vote);
    }

    tracing::info!("--- elect node 1, all entries are applied again");
    {
        let m = router.elect(&s(1), timeout()).await?;
        assert_eq!(2, m.current_term);

        let (index, term, _) = router.get_raft_handle(&s(1))?.submit(4).await?;
        assert_eq!((4, 2), (index, term));

        router.sync_commit(&s(1), 4, timeout()).await?;

        for id in [s(0), s(1), s(2)] {
            let applied = router.applied(&id);
            applied.assert_in_order();
            assert_eq!(vec![1, 2, 3, 4], applied.commands(), "node {}", id);
        }
    }

    Ok(())
}

fn timeout() -> Option<Duration> {
    Some(Duration::from_millis(2_000))
}
