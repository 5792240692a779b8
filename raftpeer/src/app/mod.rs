use std::fmt;

use crate::OptionalSend;
use crate::OptionalSync;
use crate::Serde;

/// A trait defining application specific data, i.e., the command carried by a
/// log entry.
///
/// Applications present their commands as-is to raftpeer. A command is stored
/// in the log, replicated to followers and, once committed, handed back
/// unchanged through the apply channel. It is cloned when replicated to more
/// than one follower.
///
/// ## Note
///
/// The trait is automatically implemented for all types which satisfy its
/// super traits.
pub trait AppData:
    fmt::Debug + Clone + OptionalSend + OptionalSync + 'static + Serde
{
}

impl<T> AppData for T where T: fmt::Debug + Clone + OptionalSend + OptionalSync + 'static + Serde
{}
