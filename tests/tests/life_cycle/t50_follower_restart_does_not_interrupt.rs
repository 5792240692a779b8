use std::sync::Arc;
use std::time::Duration;

use maplit::btreeset;
use raftpeer::Config;

use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;

/// A follower that restarted should not interrupt a stable cluster by a too
/// quick election.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn follower_restart_does_not_interrupt() -> anyhow::Result<()> {
    let config = Arc::new(
        Config {
            enable_heartbeat: false,
            election_timeout_min: 3_000,
            election_timeout_max: 4_000,
            ..Default::default()
        }
        .validate()?,
    );

    let mut router = RaftRouter::new(config.clone(), btreeset! {s(0),s(1),s(2)});
    router.new_cluster().await?;

    tracing::info!("--- elect node 0");
    let m = router.elect(&s(0), Some(Duration::from_millis(1_000))).await?;
    let term = m.current_term;

    tracing::info!(term, "--- stop all nodes and restart node 1,2");
    {
        // Stop followers first or the follower may start re-electing.
        router.stop_node(&s(2)).await?;
        router.stop_node(&s(1)).await?;
        router.stop_node(&s(0)).await?;

        router.new_raft_node(&s(1)).await?;
        router.new_raft_node(&s(2)).await?;

        let res = router
            .wait(&s(1), Some(Duration::from_millis(1_000)))
            .metrics(
                |x| x.current_term > term,
                "node increase term to start election",
            )
            .await;

        assert!(res.is_err(), "term should not increase");

        router
            .wait(&s(1), Some(Duration::from_millis(9_000)))
            .metrics(
                |x| x.current_term > term,
                concat!(
                    "node increase term to start election after a election timeout.",
                    "When it starts up, the election timer starts from `now`, ",
                    "as if a leader was just heard from."
                ),
            )
            .await?;
    }

    Ok(())
}
