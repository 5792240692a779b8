use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::quorum::QuorumSet;

/// The number of members that make up a majority of `n_members`.
fn majority_of(n_members: usize) -> usize {
    n_members / 2 + 1
}

fn count_members<'a, ID, I>(ids: I, is_member: impl Fn(&ID) -> bool) -> usize
where
    ID: Ord + 'a,
    I: Iterator<Item = &'a ID>,
{
    ids.filter(|id| is_member(id)).collect::<BTreeSet<_>>().len()
}

fn majority_value<'a, ID, I>(values: I, n_members: usize, is_member: impl Fn(&ID) -> bool) -> u64
where
    ID: Ord + 'a,
    I: Iterator<Item = (&'a ID, u64)>,
{
    // Keep the greatest value if a member is reported more than once.
    let mut by_member = BTreeMap::new();
    for (id, v) in values.filter(|(id, _)| is_member(id)) {
        let ent = by_member.entry(id).or_insert(v);
        *ent = (*ent).max(v);
    }

    let mut vs = by_member.into_values().collect::<Vec<_>>();
    vs.sort_unstable_by(|a, b| b.cmp(a));

    vs.get(majority_of(n_members) - 1).copied().unwrap_or_default()
}

/// Impl a simple majority quorum set
impl<ID> QuorumSet<ID> for BTreeSet<ID>
where ID: Ord + 'static
{
    fn is_quorum<'a, I: Iterator<Item = &'a ID> + Clone>(
        &self,
        ids: I,
    ) -> bool {
        count_members(ids, |id| self.contains(id)) >= majority_of(self.len())
    }

    fn quorum_value<'a, I>(&self, values: I) -> u64
    where I: Iterator<Item = (&'a ID, u64)> {
        majority_value(values, self.len(), |id| self.contains(id))
    }
}

/// The keys of a map as a majority quorum set
impl<ID, T> QuorumSet<ID> for BTreeMap<ID, T>
where ID: Ord + 'static
{
    fn is_quorum<'a, I: Iterator<Item = &'a ID> + Clone>(
        &self,
        ids: I,
    ) -> bool {
        count_members(ids, |id| self.contains_key(id)) >= majority_of(self.len())
    }

    fn quorum_value<'a, I>(&self, values: I) -> u64
    where I: Iterator<Item = (&'a ID, u64)> {
        majority_value(values, self.len(), |id| self.contains_key(id))
    }
}
