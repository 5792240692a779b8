/// A set of quorums is a collection of quorum.
///
/// A quorum is a collection of nodes that a read or write operation in
/// distributed system has to contact to. See:
/// <http://web.mit.edu/6.033/2005/wwwdocs/quorum_note.html>
pub(crate) trait QuorumSet<ID: 'static> {
    /// Check if a series of ID constitute a quorum that is defined by this
    /// quorum set.
    ///
    /// IDs that are not members are ignored, a member listed more than once
    /// is counted once.
    fn is_quorum<'a, I: Iterator<Item = &'a ID> + Clone>(&self, ids: I) -> bool;

    /// Returns the greatest value that is reached by a quorum.
    ///
    /// `values` pairs a member with a monotonic value it has reached, such as
    /// the last log index it stores. The result is the greatest `v` such that
    /// the members whose value is `>= v` constitute a quorum, or 0 if the
    /// given members do not constitute a quorum at all.
    fn quorum_value<'a, I>(&self, values: I) -> u64
    where I: Iterator<Item = (&'a ID, u64)>;
}
