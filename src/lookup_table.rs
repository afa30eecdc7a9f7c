use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};

use hashbrown::HashTable;

use crate::frequency_list::{EntryId, FrequencyList};

/// Maps keys to entry ids.
///
/// The table only stores ids; the keys themselves live once, inside the
/// entries owned by the [`FrequencyList`]. Every operation therefore takes the
/// list so that it can compare and rehash keys.
pub(crate) struct LookupTable<Key, Value, State> {
    table: HashTable<EntryId<Key, Value>>,
    hasher: State,
}

impl<Key, Value, State> LookupTable<Key, Value, State> {
    pub(crate) fn with_capacity_and_hasher(capacity: usize, hasher: State) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hasher,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub(crate) const fn hasher(&self) -> &State {
        &self.hasher
    }

    pub(crate) fn clear(&mut self) {
        self.table.clear();
    }
}

impl<Key: Hash + Eq, Value, State: BuildHasher> LookupTable<Key, Value, State> {
    pub(crate) fn find<Q>(&self, key: &Q, list: &FrequencyList<Key, Value>) -> Option<EntryId<Key, Value>>
    where
        Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hasher.hash_one(key);
        self.table
            .find(hash, |&id| list.key(id).is_some_and(|other| other.borrow() == key))
            .copied()
    }

    /// Registers an entry that was just inserted into `list`. The entry's key
    /// must not already be present.
    pub(crate) fn insert(&mut self, id: EntryId<Key, Value>, list: &FrequencyList<Key, Value>) {
        let key = list.key(id);
        debug_assert!(key.is_some(), "inserted an id with no entry");
        let Some(key) = key else {
            return;
        };

        let hash = self.hasher.hash_one(key);
        let hasher = &self.hasher;
        self.table.insert_unique(hash, id, |&id| {
            list.key(id).map_or(0, |key| hasher.hash_one(key))
        });
    }

    /// Removes the key from the table, returning the id it mapped to.
    pub(crate) fn remove<Q>(&mut self, key: &Q, list: &FrequencyList<Key, Value>) -> Option<EntryId<Key, Value>>
    where
        Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hasher.hash_one(key);
        let entry = self
            .table
            .find_entry(hash, |&id| list.key(id).is_some_and(|other| other.borrow() == key))
            .ok()?;
        Some(entry.remove().0)
    }

    /// Removes the table slot pointing at `id`. The entry must still be in
    /// `list`, as its key is needed to find the slot.
    pub(crate) fn remove_id(&mut self, id: EntryId<Key, Value>, list: &FrequencyList<Key, Value>) -> bool {
        let Some(key) = list.key(id) else {
            return false;
        };

        let hash = self.hasher.hash_one(key);
        self.table
            .find_entry(hash, |&other| other == id)
            .map(|entry| entry.remove())
            .is_ok()
    }
}
