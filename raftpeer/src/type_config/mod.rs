//! Define the configuration of types used by a Raft node, such as the
//! command type carried by log entries.

mod declare_raft_types;


use std::fmt::Debug;

use crate::app::AppData;
use crate::raft::responder::Responder;
use crate::OptionalSend;
use crate::OptionalSync;

/// Configuration of types used by the [`Raft`] core engine.
///
/// The (empty) implementation structure defines request/response types, node
/// ID type and the like. Refer to the documentation of associated types for
/// more information.
///
/// ## Note
///
/// Since Rust has some limitations when deriving traits for types with
/// generic arguments and most types are parameterized by [`TypeConfig`], we
/// need to add supertraits to a type implementing [`TypeConfig`].
///
/// ## Example
///
/// ```ignore
/// raftpeer::declare_raft_types!(
///    pub MyTypeConfig:
///        AppData = ClientRequest,
/// );
/// ```
/// [`Raft`]: crate::Raft
pub trait TypeConfig:
    Sized
    + OptionalSend
    + OptionalSync
    + Debug
    + Clone
    + Copy
    + Default
    + Eq
    + PartialEq
    + Ord
    + PartialOrd
    + 'static
{
    /// Application-specific command carried by log entries.
    type AppData: AppData;

    /// Send the result of a client write back to the caller.
    type Responder: Responder<Self>;
}
