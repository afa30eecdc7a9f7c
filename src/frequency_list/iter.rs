use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;

use super::{EntryId, FrequencyList, NodeId};

/// A borrowing iterator over the keys and values of a cache, in eviction
/// order: lowest frequency first, and within a frequency, the entry that has
/// held that frequency the longest first.
///
/// Iterating does not count as an access. This is created by
/// [`LfuCache::iter`](crate::LfuCache::iter).
pub struct Iter<'a, Key, Value> {
    list: &'a FrequencyList<Key, Value>,
    node: Option<NodeId<Key, Value>>,
    entry: Option<EntryId<Key, Value>>,
    remaining: usize,
}

impl<'a, Key, Value> Iter<'a, Key, Value> {
    pub(crate) const fn new(list: &'a FrequencyList<Key, Value>) -> Self {
        Self {
            list,
            node: list.head,
            entry: None,
            remaining: list.len(),
        }
    }
}

impl<'a, Key, Value> Iterator for Iter<'a, Key, Value> {
    type Item = (&'a Key, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list;
        loop {
            if let Some(id) = self.entry {
                let entry = list.entries.get(id)?;
                self.entry = entry.prev;
                self.remaining = self.remaining.saturating_sub(1);
                return Some((&entry.key, &entry.value));
            }

            // Current node is exhausted, walk up to the next frequency.
            let node = list.nodes.get(self.node?)?;
            self.entry = node.tail;
            self.node = node.next;
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<Key, Value> FusedIterator for Iter<'_, Key, Value> {}

impl<Key, Value> ExactSizeIterator for Iter<'_, Key, Value> {}

impl<Key, Value> Clone for Iter<'_, Key, Value> {
    fn clone(&self) -> Self {
        Self {
            list: self.list,
            node: self.node,
            entry: self.entry,
            remaining: self.remaining,
        }
    }
}

#[cfg(not(tarpaulin_include))]
impl<Key, Value> Debug for Iter<'_, Key, Value> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish()
    }
}

/// An iterator over the distinct frequencies currently present in a cache,
/// lowest first.
///
/// This is created by [`LfuCache::frequencies`](crate::LfuCache::frequencies).
pub struct Frequencies<'a, Key, Value> {
    list: &'a FrequencyList<Key, Value>,
    node: Option<NodeId<Key, Value>>,
}

impl<'a, Key, Value> Frequencies<'a, Key, Value> {
    pub(crate) const fn new(list: &'a FrequencyList<Key, Value>) -> Self {
        Self {
            list,
            node: list.head,
        }
    }
}

impl<Key, Value> Iterator for Frequencies<'_, Key, Value> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.nodes.get(self.node?)?;
        self.node = node.next;
        Some(node.frequency)
    }
}

impl<Key, Value> FusedIterator for Frequencies<'_, Key, Value> {}

#[cfg(not(tarpaulin_include))]
impl<Key, Value> Debug for Frequencies<'_, Key, Value> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frequencies").finish_non_exhaustive()
    }
}
