use core::fmt;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::quorum::QuorumSet;
use crate::storage::membership::NodeId;
use crate::Node;

/// The static membership configuration of the cluster.
///
/// Every node in it is a voter. A quorum is a strict majority of the nodes.
/// The membership is fixed when a node is created and never changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct Membership {
    /// Additional info of all nodes, e.g., the connecting host and port.
    nodes: BTreeMap<NodeId, Node>,
}

impl From<BTreeMap<NodeId, Node>> for Membership {
    fn from(b: BTreeMap<NodeId, Node>) -> Self {
        Membership::new(b)
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{",)?;

        for (i, (node_id, node)) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, ",",)?;
            }
            write!(f, "{node_id}:{node}")?;
        }

        write!(f, "}}")?;
        Ok(())
    }
}

// Public APIs
impl Membership {
    /// Create a new Membership from a collection of nodes.
    ///
    /// The `nodes` can be:
    /// - `BTreeSet<NodeId>`: node ids only, every `Node` is filled with
    ///   default value,
    /// - `BTreeMap<NodeId, Node>` provides nodes for every node id.
    pub fn new<T>(nodes: T) -> Self
    where T: IntoNodes {
        let nodes = nodes.into_nodes();

        Membership { nodes }
    }

    /// Returns an Iterator of all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &Node)> {
        self.nodes.iter()
    }

    /// Get a node by node id.
    pub fn get_node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Returns an Iterator of all node ids.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Returns the number of nodes in the cluster.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns every node except `me`: the peers a node sends RPCs to.
    pub fn peers<'a>(
        &'a self,
        me: &'a NodeId,
    ) -> impl Iterator<Item = (&'a NodeId, &'a Node)> + 'a {
        self.nodes.iter().filter(move |(id, _)| *id != me)
    }
}

impl Membership {
    /// Check if the given `NodeId` is a member.
    pub(crate) fn contains(&self, node_id: &NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }
}

impl QuorumSet<NodeId> for Membership {
    fn is_quorum<'a, I: Iterator<Item = &'a NodeId> + Clone>(
        &self,
        ids: I,
    ) -> bool {
        self.nodes.is_quorum(ids)
    }

    fn quorum_value<'a, I>(&self, values: I) -> u64
    where I: Iterator<Item = (&'a NodeId, u64)> {
        self.nodes.quorum_value(values)
    }
}

/// Anything a [`Membership`] can be built from.
pub trait IntoNodes {
    fn into_nodes(self) -> BTreeMap<NodeId, Node>;
}

/// Peers that are addressed by id only.
impl IntoNodes for BTreeSet<NodeId> {
    fn into_nodes(self) -> BTreeMap<NodeId, Node> {
        self.into_iter().map(|id| (id, Node::default())).collect()
    }
}

impl IntoNodes for BTreeMap<NodeId, Node> {
    fn into_nodes(self) -> BTreeMap<NodeId, Node> {
        self
    }
}
