//! The frequency bucket list backing the cache.
//!
//! ```text
//!   head (min frequency)
//!    │
//!    ▼
//!  ┌────────┐    ┌────────┐    ┌────────┐
//!  │ freq 1 │◄──►│ freq 2 │◄──►│ freq 5 │
//!  └───┬────┘    └───┬────┘    └───┬────┘
//!      │ head        │             │
//!      ▼             ▼             ▼
//!     [d] ◄─► [c]   [b]           [a]
//!              ▲
//!              └ tail: evicted first
//! ```
//!
//! Both levels are doubly linked through indices into arenas rather than
//! pointers, so every structural operation is constant time without any
//! `unsafe` code.

use log::trace;

use crate::arena::{Arena, Id};

pub use iter::{Frequencies, Iter};
pub(crate) use lfu_entry::LfuEntry;
pub(crate) use node::Node;

mod iter;
mod lfu_entry;
mod node;

pub(crate) type NodeId<Key, Value> = Id<Node<Key, Value>>;
pub(crate) type EntryId<Key, Value> = Id<LfuEntry<Key, Value>>;

/// Owns every entry and every frequency node of a cache.
///
/// Nodes are kept sorted by ascending frequency and are pruned as soon as they
/// become empty, so `head` is always the minimum frequency node while the list
/// is non-empty.
pub(crate) struct FrequencyList<Key, Value> {
    nodes: Arena<Node<Key, Value>>,
    entries: Arena<LfuEntry<Key, Value>>,
    head: Option<NodeId<Key, Value>>,
}

impl<Key, Value> FrequencyList<Key, Value> {
    #[inline]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::new(),
            entries: Arena::with_capacity(capacity),
            head: None,
        }
    }

    /// Number of entries across all nodes.
    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub(crate) fn get(&self, id: EntryId<Key, Value>) -> Option<&LfuEntry<Key, Value>> {
        self.entries.get(id)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: EntryId<Key, Value>) -> Option<&mut LfuEntry<Key, Value>> {
        self.entries.get_mut(id)
    }

    #[inline]
    pub(crate) fn key(&self, id: EntryId<Key, Value>) -> Option<&Key> {
        self.entries.get(id).map(|entry| &entry.key)
    }

    /// Current frequency of the entry.
    pub(crate) fn frequency(&self, id: EntryId<Key, Value>) -> Option<usize> {
        let owner = self.entries.get(id)?.owner;
        self.nodes.get(owner).map(|node| node.frequency)
    }

    /// Frequency of the head node, i.e. the lowest frequency of any entry.
    pub(crate) fn min_frequency(&self) -> Option<usize> {
        self.nodes.get(self.head?).map(|node| node.frequency)
    }

    /// Inserts a new entry with a frequency of 1 as the most recent member of
    /// that node, creating the node if needed.
    pub(crate) fn insert(&mut self, key: Key, value: Value) -> EntryId<Key, Value> {
        let owner = match self.head {
            Some(head) if self.nodes.get(head).is_some_and(|node| node.frequency == 1) => head,
            _ => self.init_front(),
        };

        let id = self.entries.insert(LfuEntry::new(owner, key, value));
        let pushed = self.push(owner, id);
        debug_assert!(pushed.is_some());
        id
    }

    /// Moves the entry to the node one frequency higher, returning the new
    /// frequency. The entry becomes the most recent member of that node.
    ///
    /// Frequencies saturate: an entry already at `usize::MAX` only has its
    /// recency refreshed.
    pub(crate) fn increment(&mut self, id: EntryId<Key, Value>) -> Option<usize> {
        let owner = self.entries.get(id)?.owner;
        let (frequency, next) = {
            let node = self.nodes.get(owner)?;
            (node.frequency, node.next)
        };

        let Some(new_frequency) = frequency.checked_add(1) else {
            self.unlink(id)?;
            self.push(owner, id)?;
            return Some(frequency);
        };

        // The target node must exist before the current one is possibly
        // pruned, otherwise we lose our position in the list.
        let target = match next {
            Some(next)
                if self
                    .nodes
                    .get(next)
                    .is_some_and(|node| node.frequency == new_frequency) =>
            {
                next
            }
            _ => self.create_increment(owner)?,
        };

        self.unlink(id)?;
        if self.nodes.get(owner)?.is_empty() {
            self.detach_node(owner)?;
        }
        self.push(target, id)?;

        Some(new_frequency)
    }

    /// Removes the entry from the list, returning its key, value and the
    /// frequency it had.
    pub(crate) fn remove(&mut self, id: EntryId<Key, Value>) -> Option<(Key, Value, usize)> {
        let owner = self.unlink(id)?;
        let (frequency, emptied) = {
            let node = self.nodes.get(owner)?;
            (node.frequency, node.is_empty())
        };

        if emptied {
            self.detach_node(owner)?;
        }

        let entry = self.entries.remove(id)?;
        Some((entry.key, entry.value, frequency))
    }

    /// The entry that would be evicted next: the tail of the minimum frequency
    /// node.
    pub(crate) fn peek_lfu_id(&self) -> Option<EntryId<Key, Value>> {
        self.nodes.get(self.head?)?.tail
    }

    #[inline]
    pub(crate) fn peek_lfu(&self) -> Option<&LfuEntry<Key, Value>> {
        self.entries.get(self.peek_lfu_id()?)
    }

    /// Removes and returns the least frequently used entry along with its
    /// frequency.
    #[cfg(test)]
    pub(crate) fn pop_lfu(&mut self) -> Option<(Key, Value, usize)> {
        let id = self.peek_lfu_id()?;
        self.remove(id)
    }

    #[inline]
    pub(crate) const fn iter(&self) -> Iter<'_, Key, Value> {
        Iter::new(self)
    }

    #[inline]
    pub(crate) const fn frequencies(&self) -> Frequencies<'_, Key, Value> {
        Frequencies::new(self)
    }

    /// Iterates over every live entry together with its id, in no particular
    /// order.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn entries(&self) -> impl Iterator<Item = (EntryId<Key, Value>, &LfuEntry<Key, Value>)> + '_ {
        self.entries.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.entries.clear();
        self.head = None;
    }

    /// Creates a frequency 1 node in front of the current head.
    fn init_front(&mut self) -> NodeId<Key, Value> {
        let id = self.nodes.insert(Node::new(1, None, self.head));
        if let Some(head) = self.head.and_then(|head| self.nodes.get_mut(head)) {
            head.prev = Some(id);
        }
        self.head = Some(id);
        trace!("created frequency node 1 at list head");
        id
    }

    /// Creates a node with a frequency one higher than `node`, directly after
    /// it.
    fn create_increment(&mut self, node: NodeId<Key, Value>) -> Option<NodeId<Key, Value>> {
        // There are four links to fix:
        // ┌─────┐ (1) ┌─────┐ (2) ┌──────┐
        // │     ├────►│     ├────►│      │
        // │ cur │     │ new │     │ next │
        // │     │◄────┤     │◄────┤      │
        // └─────┘ (3) └─────┘ (4) └──────┘
        let (frequency, next) = {
            let current = self.nodes.get(node)?;
            (current.frequency.checked_add(1)?, current.next)
        };

        let id = self.nodes.insert(Node::new(frequency, Some(node), next)); // (2), (3)
        self.nodes.get_mut(node)?.next = Some(id); // (1)
        if let Some(next) = next {
            self.nodes.get_mut(next)?.prev = Some(id); // (4)
        }

        trace!("created frequency node {frequency}");
        Some(id)
    }

    /// Unlinks and frees an empty node.
    fn detach_node(&mut self, id: NodeId<Key, Value>) -> Option<()> {
        let node = self.nodes.remove(id)?;
        debug_assert!(node.is_empty());

        match node.prev {
            Some(prev) => self.nodes.get_mut(prev)?.next = node.next,
            None => {
                self.head = node.next;
                trace!(
                    "min frequency moved from {} to {:?}",
                    node.frequency,
                    self.min_frequency()
                );
            }
        }

        if let Some(next) = node.next {
            self.nodes.get_mut(next)?.prev = node.prev;
        }

        trace!("pruned empty frequency node {}", node.frequency);
        Some(())
    }

    /// Pushes an unlinked entry to the head of `owner`.
    fn push(&mut self, owner: NodeId<Key, Value>, id: EntryId<Key, Value>) -> Option<()> {
        let node = self.nodes.get_mut(owner)?;
        let old_head = node.head.replace(id);
        if old_head.is_none() {
            node.tail = Some(id);
        }
        node.len += 1;

        if let Some(old_head) = old_head {
            self.entries.get_mut(old_head)?.prev = Some(id);
        }

        let entry = self.entries.get_mut(id)?;
        entry.owner = owner;
        entry.prev = None;
        entry.next = old_head;
        Some(())
    }

    /// Removes the entry from its node's member list, returning the node. The
    /// node itself is left in place even if it became empty.
    fn unlink(&mut self, id: EntryId<Key, Value>) -> Option<NodeId<Key, Value>> {
        let entry = self.entries.get_mut(id)?;
        let owner = entry.owner;
        let prev = entry.prev.take();
        let next = entry.next.take();

        if let Some(prev) = prev {
            self.entries.get_mut(prev)?.next = next;
        }
        if let Some(next) = next {
            self.entries.get_mut(next)?.prev = prev;
        }

        let node = self.nodes.get_mut(owner)?;
        if prev.is_none() {
            node.head = next;
        }
        if next.is_none() {
            node.tail = prev;
        }
        node.len -= 1;

        Some(owner)
    }

    /// Walks the whole structure and panics if any invariant does not hold.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn debug_validate_invariants(&self) {
        if self.is_empty() {
            assert!(self.head.is_none(), "empty list still has a head node");
            assert!(self.nodes.is_empty(), "empty list still has nodes");
            return;
        }

        let head = self.head.expect("non-empty list has no head node");
        assert!(
            self.nodes[head].prev.is_none(),
            "head node has a predecessor"
        );

        let mut node_count = 0;
        let mut entry_count = 0;
        let mut last_frequency = 0;
        let mut prev_node = None;
        let mut current = Some(head);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id];
            assert!(node.frequency > last_frequency, "node frequencies not ascending");
            assert_eq!(node.prev, prev_node, "node back link is broken");
            assert!(!node.is_empty(), "empty node {} was not pruned", node.frequency);

            let mut members = 0;
            let mut prev_entry = None;
            let mut member = node.head;
            while let Some(entry_id) = member {
                let entry = &self.entries[entry_id];
                assert_eq!(entry.owner, node_id, "entry owner does not match node");
                assert_eq!(entry.prev, prev_entry, "entry back link is broken");
                prev_entry = Some(entry_id);
                member = entry.next;
                members += 1;
            }
            assert_eq!(node.tail, prev_entry, "node tail is not the last member");
            assert_eq!(node.len, members, "node length is stale");

            entry_count += members;
            node_count += 1;
            last_frequency = node.frequency;
            prev_node = Some(node_id);
            current = node.next;
        }

        assert_eq!(node_count, self.nodes.len(), "unreachable nodes in arena");
        assert_eq!(entry_count, self.entries.len(), "unreachable entries in arena");
    }
}
