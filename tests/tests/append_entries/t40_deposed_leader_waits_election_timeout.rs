use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use maplit::btreeset;
use pretty_assertions::assert_eq;
use raftpeer::Config;
use raftpeer::ServerState;

use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;

/// A deposed leader becomes a follower with a fresh election timer: it does
/// not start an election at the next tick and overthrow the new leader.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn deposed_leader_waits_election_timeout() -> Result<()> {
    let config = Arc::new(
        Config {
            enable_heartbeat: false,
            enable_elect: false,
            election_timeout_min: 500,
            election_timeout_max: 600,
            ..Default::default()
        }
        .validate()?,
    );

    let mut router = RaftRouter::new(config.clone(), btreeset! {s(0),s(1),s(2)});
    router.new_cluster().await?;

    tracing::info!("--- node 0 is leader of term 1");
    {
        router.elect(&s(0), timeout()).await?;
    }

    tracing::info!("--- isolate node 0, node 1 is elected in term 2");
    {
        router.isolate(&s(0));
        let m = router.elect(&s(1), timeout()).await?;
        assert_eq!(2, m.current_term);
    }

    tracing::info!("--- node 0 may elect by itself from now on");
    {
        let n0 = router.get_raft_handle(&s(0))?;
        n0.runtime_config().elect(true);

        // Leading since term 1, the election timer has long expired.
        tokio::time::sleep(Duration::from_millis(700)).await;
    }

    tracing::info!("--- node 0 comes back and is deposed");
    {
        router.restore(&s(0));
        router.get_raft_handle(&s(0))?.broadcast_heartbeat().await?;

        router
            .wait(&s(0), timeout())
            .state(ServerState::Follower, "step down on a greater term")
            .await?;
    }

    tracing::info!("--- node 0 stays a follower for less than an election timeout");
    {
        tokio::time::sleep(Duration::from_millis(200)).await;

        let m = router.get_metrics(&s(0))?;
        assert_eq!(2, m.current_term);
        assert_eq!(ServerState::Follower, m.server_state);

        let m = router.get_metrics(&s(1))?;
        assert_eq!(2, m.current_term);
        assert_eq!(ServerState::Leader, m.server_state);
    }

    Ok(())
}

fn timeout() -> Option<Duration> {
    Some(Duration::from_millis(2_000))
}
