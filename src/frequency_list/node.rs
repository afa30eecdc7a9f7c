use super::{EntryId, NodeId};

/// A single frequency bucket. Every entry owned by a node has been accessed
/// exactly `frequency` times.
///
/// Nodes form a doubly linked list sorted by ascending frequency. Members form
/// a second doubly linked list threaded through the entries themselves: `head`
/// is the member most recently moved into this node and `tail` the one that
/// has been here the longest, which makes `tail` the eviction candidate.
#[derive(Debug)]
pub(crate) struct Node<Key, Value> {
    pub(crate) frequency: usize,
    pub(crate) prev: Option<NodeId<Key, Value>>,
    pub(crate) next: Option<NodeId<Key, Value>>,
    pub(crate) head: Option<EntryId<Key, Value>>,
    pub(crate) tail: Option<EntryId<Key, Value>>,
    pub(crate) len: usize,
}

impl<Key, Value> Node<Key, Value> {
    pub(crate) const fn new(
        frequency: usize,
        prev: Option<NodeId<Key, Value>>,
        next: Option<NodeId<Key, Value>>,
    ) -> Self {
        Self {
            frequency,
            prev,
            next,
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }
}
