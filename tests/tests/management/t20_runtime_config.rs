use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use maplit::btreeset;
use raftpeer::Config;

use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;

/// Turning off heartbeat on a running leader lets the followers time out and
/// elect a new leader in a higher term.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn disable_heartbeat_at_runtime() -> Result<()> {
    let config = Arc::new(Config::default().validate()?);

    let mut router = RaftRouter::new(config.clone(), btreeset! {s(0),s(1),s(2)});
    router.new_cluster().await?;

    let (leader, term) = router.check_one_leader(Duration::from_secs(3)).await?;
    tracing::info!("--- leader: {} at term {}", leader, term);

    tracing::info!("--- disable heartbeat on the leader");
    {
        let n = router.get_raft_handle(&leader)?;
        n.runtime_config().heartbeat(false);
        // Keep the old leader from winning the next round right away.
        n.runtime_config().elect(false);
    }

    for id in [s(0), s(1), s(2)] {
        router
            .wait(&id, timeout())
            .metrics(|m| m.current_term > term, "a new term is started")
            .await?;
    }

    let (new_leader, new_term) = router.check_one_leader(Duration::from_secs(3)).await?;
    assert_ne!(leader, new_leader);
    assert!(new_term > term);

    Ok(())
}

fn timeout() -> Option<Duration> {
    Some(Duration::from_millis(3_000))
}
