use std::fmt;

use crate::TypeConfig;

/// A committed entry delivered to the application, `ApplyMsg`.
///
/// Entries are delivered exactly once, in strictly increasing `index` order
/// with no gap, starting from 1.
pub struct Applied<C>
where C: TypeConfig
{
    pub index: u64,
    pub term: u64,
    pub command: C::AppData,
}

impl<C> Clone for Applied<C>
where C: TypeConfig
{
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            term: self.term,
            command: self.command.clone(),
        }
    }
}

impl<C> fmt::Debug for Applied<C>
where C: TypeConfig
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Applied")
            .field("index", &self.index)
            .field("term", &self.term)
            .field("command", &self.command)
            .finish()
    }
}

impl<C> PartialEq for Applied<C>
where
    C: TypeConfig,
    C::AppData: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.term == other.term
            && self.command == other.command
    }
}

impl<C> fmt::Display for Applied<C>
where C: TypeConfig
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}-{}:{:?}", self.term, self.index, self.command)
    }
}
