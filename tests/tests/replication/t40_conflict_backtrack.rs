use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use maplit::btreeset;
use pretty_assertions::assert_eq;
use raftpeer::Config;
use raftpeer::Vote;

use crate::fixtures::ent;
use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;

/// Followers with a conflicting log or a short log are brought in line with
/// the leader: the leader backtracks to where the logs agree, conflicting
/// entries are replaced and missing entries are filled.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn conflict_backtrack() -> Result<()> {
    let config = Arc::new(
        Config {
            enable_tick: false,
            max_payload_entries: 2,
            ..Default::default()
        }
        .validate()?,
    );

    let mut router = RaftRouter::new(config.clone(), btreeset! {s(0),s(1),s(2)});

    tracing::info!("--- node 0: last log: 3,5");
    router
        .seed_state(&s(0), Vote::new(3, Some(s(0))), vec![
            ent(1, 1, 1),
            ent(1, 2, 2),
            ent(3, 3, 3),
            ent(3, 4, 4),
            ent(3, 5, 5),
        ])
        .await?;

    tracing::info!("--- node 1: a longer log of term 2");
    router
        .seed_state(&s(1), Vote::new(2, Some(s(1))), vec![
            ent(1, 1, 1),
            ent(1, 2, 2),
            ent(2, 3, 23),
            ent(2, 4, 24),
            ent(2, 5, 25),
            ent(2, 6, 26),
            ent(2, 7, 27),
        ])
        .await?;

    tracing::info!("--- node 2: a short log");
    router.seed_state(&s(2), Vote::new(1, None), vec![ent(1, 1, 1)]).await?;

    router.new_cluster().await?;

    tracing::info!("--- node 0 is elected with the greatest last log id");
    {
        let m = router.elect(&s(0), timeout()).await?;
        assert_eq!(4, m.current_term);
    }

    tracing::info!("--- an entry of term 4 commits all entries before it");
    {
        let (index, term, is_leader) = router.get_raft_handle(&s(0))?.submit(6).await?;
        assert_eq!((6, 4, true), (index, term, is_leader));

        router.sync_commit(&s(0), 6, timeout()).await?;

        for id in [s(0), s(1), s(2)] {
            let applied = router.applied(&id);
            applied.assert_in_order();
            assert_eq!(vec![1, 2, 3, 4, 5, 6], applied.commands(), "node {}", id);

            let m = router.get_metrics(&id)?;
            assert_eq!(6, m.last_log_index, "node {} log is truncated to 6", id);
        }
    }

    Ok(())
}

fn timeout() -> Option<Duration> {
    Some(Duration::from_millis(2_000))
}
