use super::{EntryId, NodeId};

/// A cached key-value pair and its position in the frequency list.
#[derive(Debug)]
pub(crate) struct LfuEntry<Key, Value> {
    // Intra-node links. `prev` points towards the node's head (newer members)
    // and `next` towards its tail (older members).
    pub(crate) prev: Option<EntryId<Key, Value>>,
    pub(crate) next: Option<EntryId<Key, Value>>,
    /// The node this entry currently belongs to. Keeping it here makes finding
    /// an entry's frequency, and moving it to the next one, constant time.
    pub(crate) owner: NodeId<Key, Value>,
    /// The lookup table only stores entry ids, so the key lives here. It is
    /// needed to resolve hash collisions and to unlink evicted entries from
    /// the table.
    pub(crate) key: Key,
    pub(crate) value: Value,
}

impl<Key, Value> LfuEntry<Key, Value> {
    /// Creates an unlinked entry owned by `owner`. The caller is responsible
    /// for pushing it into that node.
    pub(crate) const fn new(owner: NodeId<Key, Value>, key: Key, value: Value) -> Self {
        Self {
            prev: None,
            next: None,
            owner,
            key,
            value,
        }
    }
}
