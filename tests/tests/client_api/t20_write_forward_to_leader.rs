use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use maplit::btreeset;
use pretty_assertions::assert_eq;
use raftpeer::errors::ForwardToLeader;
use raftpeer::Config;
use raftpeer::LogId;

use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;

/// `write()` on a non-leader returns the leader it knows of, a write on the
/// leader returns the log id the command is stored at.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn write_forward_to_leader() -> Result<()> {
    let config = Arc::new(
        Config {
            enable_tick: false,
            ..Default::default()
        }
        .validate()?,
    );

    let mut router = RaftRouter::new(config.clone(), btreeset! {s(0),s(1),s(2)});
    router.new_cluster().await?;

    tracing::info!("--- no leader is known");
    {
        let res = router.get_raft_handle(&s(1))?.write(1).await?;
        assert_eq!(Err(ForwardToLeader::empty()), res);
    }

    tracing::info!("--- elect node 2, followers forward to it");
    {
        router.elect(&s(2), timeout()).await?;

        for id in [s(0), s(1)] {
            router.wait(&id, timeout()).current_leader(s(2), "follow node 2").await?;

            let res = router.get_raft_handle(&id)?.write(1).await?;
            assert_eq!(Err(ForwardToLeader::new(s(2))), res);

            assert_eq!(Some(s(2)), router.get_raft_handle(&id)?.current_leader());
        }
    }

    tracing::info!("--- write to the leader");
    {
        let leader = router.get_raft_handle(&s(2))?;

        let res = leader.write(10).await?;
        assert_eq!(Ok(LogId::new(1, 1)), res);

        let rx = leader.write_ff(11).await?;
        assert_eq!(Ok(LogId::new(1, 2)), rx.await?);

        router.sync_commit(&s(2), 2, timeout()).await?;
        assert_eq!(vec![10, 11], router.applied(&s(0)).commands());
    }

    Ok(())
}

fn timeout() -> Option<Duration> {
    Some(Duration::from_millis(2_000))
}
