use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use maplit::btreeset;
use pretty_assertions::assert_eq;
use raftpeer::Config;
use raftpeer::ServerState;
use raftpeer::Vote;

use crate::fixtures::ent;
use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;

/// The last log id in a vote request must be greater or equal than the
/// local one.
///
/// - Fake a cluster with two nodes: with last log (2,2) and (1,3).
/// - Only node 0 can become leader, node 1 then discards its conflicting
///   entries.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn elect_compare_last_log() -> Result<()> {
    let config = Arc::new(
        Config {
            enable_tick: false,
            ..Default::default()
        }
        .validate()?,
    );

    let mut router = RaftRouter::new(config.clone(), btreeset! {s(0),s(1)});

    tracing::info!("--- fake store: sto0: last log: 2,2");
    router
        .seed_state(&s(0), Vote::new(2, None), vec![
            //
            ent(1, 1, 10),
            ent(2, 2, 20),
        ])
        .await?;

    tracing::info!("--- fake store: sto1: last log: 1,3");
    router
        .seed_state(&s(1), Vote::new(2, None), vec![
            ent(1, 1, 10),
            ent(1, 2, 11),
            ent(1, 3, 12),
        ])
        .await?;

    router.new_cluster().await?;

    tracing::info!("--- node 1 can not be elected with a smaller last log id");
    {
        router.get_raft_handle(&s(1))?.elect().await?;

        router
            .wait(&s(0), timeout())
            .term(3, "node 0 sees the term of node 1")
            .await?;

        tokio::time::sleep(Duration::from_millis(200)).await;

        let m = router.get_metrics(&s(1))?;
        assert_eq!(ServerState::Candidate, m.server_state);
        assert_eq!(Vote::new(3, None), router.get_metrics(&s(0))?.vote);
    }

    tracing::info!("--- node 0 is elected");
    {
        router.elect(&s(0), timeout()).await?;

        let m = router.get_metrics(&s(0))?;
        assert_eq!(4, m.current_term);
    }

    tracing::info!("--- node 1 replaces its conflicting entries");
    {
        router
            .wait(&s(1), timeout())
            .metrics(
                |m| m.last_log_index == 2 && m.current_leader == Some(s(0)),
                "node 1 truncated to the leader's log",
            )
            .await?;
    }

    Ok(())
}

fn timeout() -> Option<Duration> {
    Some(Duration::from_millis(2_000))
}
