mod logging;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use maplit::btreeset;
use memstore::MemLogStore;
use pseudonet::DirectNetwork;
use raftpeer::declare_raft_types;
use raftpeer::errors::ForwardToLeader;
use raftpeer::Applied;
use raftpeer::Membership;
use raftpeer::Raft;
use tokio::sync::mpsc;

use crate::logging::init_logging;

#[derive(Debug, Clone)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Cmd {
    pub key: String,
    pub value: String,
}

impl Cmd {
    pub fn new(key: impl ToString, value: impl ToString) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

declare_raft_types!(pub Types: AppData = Cmd);

fn nid(id: impl ToString) -> raftpeer::NodeId {
    id.to_string()
}

/// A key-value store built from the entries a node applies.
#[derive(Default)]
struct StateMachine {
    id: raftpeer::NodeId,
    last_applied: u64,
    data: BTreeMap<String, String>,
}

impl StateMachine {
    fn apply(&mut self, applied: Applied<Types>) {
        assert_eq!(self.last_applied + 1, applied.index, "apply in order");

        self.last_applied = applied.index;
        self.data.insert(applied.command.key, applied.command.value);

        println!(
            "StateMachine-{}: applied: T{}-{}; data after applying: {:?}",
            self.id, applied.term, applied.index, self.data
        );
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Applied<Types>>) {
        while let Some(applied) = rx.recv().await {
            self.apply(applied);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = init_logging("hello", Some("_log"), "info");

    let config = Arc::new(raftpeer::Config::default().validate()?);
    let network = DirectNetwork::<Types>::default();
    let membership = Membership::new(btreeset! {nid(1), nid(2), nid(3)});

    let mut nodes = BTreeMap::new();

    for id in [nid(1), nid(2), nid(3)] {
        let (tx_apply, rx_apply) = mpsc::unbounded_channel();

        let raft = Raft::new(
            id.clone(),
            config.clone(),
            membership.clone(),
            network.for_node(id.clone()),
            MemLogStore::default(),
            tx_apply,
        )
        .await?;

        // Add routes to the network
        network.add_peer(id.clone(), raft.clone());

        let sm = StateMachine {
            id: id.clone(),
            ..Default::default()
        };
        tokio::spawn(sm.run(rx_apply));

        nodes.insert(id, raft);
    }

    let n1 = nodes[&nid(1)].clone();

    let res = n1.submit(Cmd::new("x", 1)).await?;
    println!(
        "submit to arbitrary node, there may not be a leader: (index, term, is_leader): {:?}",
        res
    );

    println!("sleeping for 1_000ms to wait for leader election");
    tokio::time::sleep(Duration::from_millis(1_000)).await;

    let write_res = n1.write(Cmd::new("x", 1)).await?;
    println!(
        "write to arbitrary node, if it's not leader, \
        it should inform to forward to a leader: {:?}",
        write_res
    );

    // Find the leader
    let leader = if let Err(ForwardToLeader {
        leader_id: Some(leader_id),
    }) = write_res
    {
        nodes[&leader_id].clone()
    } else {
        n1.clone()
    };

    println!("leader state: (term, is_leader): {:?}", leader.get_state().await?);

    let res = leader.submit(Cmd::new("x", "1")).await?;
    println!("submit to leader: {:?}", res);

    let write_res = leader.write(Cmd::new("y", "2")).await?;
    println!("write to leader: {:?}", write_res);

    tokio::time::sleep(Duration::from_millis(500)).await;

    for (id, raft) in nodes {
        println!("node-{}: {}", id, raft.metrics().borrow().clone());
        raft.shutdown().await?;
    }

    Ok(())
}
