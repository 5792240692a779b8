use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use maplit::btreeset;
use pretty_assertions::assert_eq;
use raftpeer::Config;

use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;

/// Commands submitted concurrently are applied in the same order, one by one,
/// on every node.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn total_order_apply() -> Result<()> {
    let config = Arc::new(Config::default().validate()?);

    let mut router = RaftRouter::new(config.clone(), btreeset! {s(0),s(1),s(2)});
    router.new_cluster().await?;

    let (leader, _term) = router.check_one_leader(Duration::from_secs(3)).await?;

    tracing::info!(leader, "--- 3 clients submit 20 commands each");
    {
        let mut handles = vec![];
        for client in 0..3u64 {
            let raft = router.get_raft_handle(&leader)?;
            let h = tokio::spawn(async move {
                for i in 0..20u64 {
                    raft.submit(client * 100 + i).await?;
                }
                Ok::<(), anyhow::Error>(())
            });
            handles.push(h);
        }

        for h in handles {
            h.await??;
        }
    }

    tracing::info!("--- all nodes apply the same sequence");
    {
        let last = router.one(1_000, 3, Duration::from_secs(5)).await?;

        let want = router.applied(&leader);
        want.wait_len(last as usize, Duration::from_secs(2)).await?;
        want.assert_in_order();
        let want = want.commands()[..last as usize].to_vec();

        for id in [s(0), s(1), s(2)] {
            let applied = router.applied(&id);
            applied.wait_len(last as usize, Duration::from_secs(2)).await?;
            applied.assert_in_order();
            assert_eq!(want, applied.commands()[..last as usize].to_vec(), "node {}", id);
        }

        // Commands of one client are applied in the order they are submitted
        for client in 0..3u64 {
            let of_client = want.iter().filter(|c| **c / 100 == client && **c < 1_000).copied().collect::<Vec<_>>();
            assert!(of_client.windows(2).all(|w| w[0] < w[1]), "client {}: {:?}", client, of_client);
        }
    }

    Ok(())
}
