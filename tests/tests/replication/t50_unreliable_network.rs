use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use maplit::btreeset;
use raftpeer::Config;

use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;

/// With delayed and lost messages, commands are still committed and applied
/// in the same order on every node.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn unreliable_network() -> Result<()> {
    let config = Arc::new(Config::default().validate()?);

    let mut router = RaftRouter::new(config.clone(), btreeset! {s(0),s(1),s(2),s(3),s(4)});
    router.new_cluster().await?;

    router.network().set_unreliable(true);

    tracing::info!("--- commit 10 commands over an unreliable network");
    {
        for cmd in 1..=10 {
            router.one(cmd, 3, Duration::from_secs(10)).await?;
        }
    }

    tracing::info!("--- network is reliable again, all nodes agree");
    {
        router.network().set_unreliable(false);

        let index = router.one(11, 5, Duration::from_secs(10)).await?;

        for id in [s(0), s(1), s(2), s(3), s(4)] {
            let applied = router.applied(&id);
            applied.wait_len(index as usize, Duration::from_secs(2)).await?;
            applied.assert_in_order();
        }

        for i in 1..=index {
            let (n, _cmd) = router.n_committed(i)?;
            assert_eq!(5, n, "index {} applied by all nodes", i);
        }
    }

    Ok(())
}
