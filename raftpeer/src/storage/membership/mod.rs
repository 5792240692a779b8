//! The static set of peers of a cluster.

#[allow(clippy::module_inception)]
mod membership;
pub mod node;


pub use membership::IntoNodes;
pub use membership::Membership;
pub use node::Node;
pub use node::NodeId;
