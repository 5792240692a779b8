use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use maplit::btreeset;
use pretty_assertions::assert_eq;
use raftpeer::raft::AppendEntries;
use raftpeer::raft::ConflictHint;
use raftpeer::raft::RequestVote;
use raftpeer::Config;
use raftpeer::LogId;
use raftpeer::Vote;

use crate::fixtures::ent;
use crate::fixtures::s;
use crate::fixtures::ut_harness;
use crate::fixtures::RaftRouter;

/// `AppendEntries` of a smaller term is rejected with the local term. A
/// greater term is adopted even if the log does not match.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn reject_smaller_term() -> Result<()> {
    let config = Arc::new(
        Config {
            enable_tick: false,
            ..Default::default()
        }
        .validate()?,
    );

    let mut router = RaftRouter::new(config.clone(), btreeset! {s(0),s(1),s(2)});
    let raft = router.new_raft_node(&s(1)).await?;

    tracing::info!("--- vote for node 2 in term 5");
    {
        let reply = raft.handle_request_vote(RequestVote::new(5, s(2), LogId::new(0, 0))).await?;
        assert!(reply.vote_granted);
        assert_eq!(5, reply.term);
    }

    tracing::info!("--- AppendEntries from the leader of term 4 is rejected");
    {
        let reply = raft
            .handle_append_entries(AppendEntries {
                term: 4,
                leader_id: s(0),
                prev_log_id: LogId::new(0, 0),
                entries: vec![ent(4, 1, 1)],
                leader_commit: 1,
            })
            .await?;

        assert!(!reply.success);
        assert_eq!(5, reply.term);
        assert_eq!(None, reply.conflict);

        let m = router.get_metrics(&s(1))?;
        assert_eq!(0, m.last_log_index);
        assert_eq!(None, m.current_leader);
    }

    tracing::info!("--- AppendEntries of term 6 with a missing prev log is rejected, term is adopted");
    {
        let reply = raft
            .handle_append_entries(AppendEntries {
                term: 6,
                leader_id: s(0),
                prev_log_id: LogId::new(6, 3),
                entries: vec![ent(6, 4, 1)],
                leader_commit: 1,
            })
            .await?;

        assert!(!reply.success);
        assert_eq!(6, reply.term);
        assert_eq!(Some(ConflictHint { term: None, index: 1 }), reply.conflict);

        let m = router
            .wait(&s(1), timeout())
            .vote(Vote::new(6, None), "adopt term 6")
            .await?;
        assert_eq!(Some(s(0)), m.current_leader);
        assert_eq!(0, m.last_log_index);
    }

    Ok(())
}

fn timeout() -> Option<Duration> {
    Some(Duration::from_millis(1_000))
}
