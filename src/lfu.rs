use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt::{Debug, Formatter};
use std::hash::{BuildHasher, Hash};
use std::num::NonZeroUsize;

use log::debug;

use crate::error::{Error, Result};
use crate::frequency_list::{Frequencies, FrequencyList, Iter};
use crate::iter::IntoIter;
use crate::lookup_table::LookupTable;

/// Upper bound on the number of slots reserved up front. Larger caches grow on
/// demand instead of allocating their full capacity at construction.
const MAX_PREALLOCATION: usize = 1 << 12;

/// A fixed capacity cache that evicts the least frequently used entry.
///
/// Every successful [`get`](Self::get), [`get_mut`](Self::get_mut) and
/// [`set`](Self::set) of an existing key counts as one access. When a new key
/// is set while the cache is full, the entry with the lowest access count is
/// evicted. If several entries share that count, the one that has held it the
/// longest is evicted first.
///
/// All operations are constant time.
///
/// The cache has no internal synchronization. Since `get` updates access
/// counts it needs `&mut self`; share a cache between threads by wrapping it
/// in a [`Mutex`](std::sync::Mutex).
// Note that Default is _not_ implemented, as a cache always needs an explicit
// capacity.
// This is re-exported at the crate root, so this lint can be safely ignored.
#[allow(clippy::module_name_repetitions)]
pub struct LfuCache<Key, Value, State = RandomState> {
    lookup: LookupTable<Key, Value, State>,
    freq_list: FrequencyList<Key, Value>,
    capacity: NonZeroUsize,
}

impl<Key: Hash + Eq, Value> LfuCache<Key, Value> {
    /// Creates an empty cache that holds at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use lfu_engine::{Error, LfuCache};
    ///
    /// let mut cache = LfuCache::new(2).unwrap();
    /// cache.set("a", 1);
    /// cache.set("b", 2);
    ///
    /// // "a" is now accessed twice, "b" only once.
    /// assert_eq!(cache.get(&"a"), Ok(&1));
    ///
    /// // Making room for "c" evicts the least frequently used entry.
    /// assert_eq!(cache.set("c", 3), Some(("b", 2)));
    /// assert_eq!(cache.get(&"b"), Err(Error::NotFound));
    ///
    /// assert!(LfuCache::<&str, i32>::new(0).is_err());
    /// ```
    #[inline]
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_hasher(capacity, RandomState::new())
    }
}

impl<Key: Hash + Eq, Value, State: BuildHasher> LfuCache<Key, Value, State> {
    /// Creates an empty cache that holds at most `capacity` entries and hashes
    /// keys with `hasher`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    pub fn with_hasher(capacity: usize, hasher: State) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or(Error::InvalidCapacity)?;
        let reserved = capacity.get().min(MAX_PREALLOCATION);
        debug!("creating lfu cache with capacity {capacity}");

        Ok(Self {
            lookup: LookupTable::with_capacity_and_hasher(reserved, hasher),
            freq_list: FrequencyList::with_capacity(reserved),
            capacity,
        })
    }

    /// Returns a reference to the value for `key` and counts it as an access.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the key is absent. The cache is left
    /// untouched in that case.
    pub fn get<Q>(&mut self, key: &Q) -> Result<&Value>
    where
        Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.lookup.find(key, &self.freq_list).ok_or(Error::NotFound)?;
        let promoted = self.freq_list.increment(id);
        debug_assert!(promoted.is_some());
        self.freq_list
            .get(id)
            .map(|entry| &entry.value)
            .ok_or(Error::NotFound)
    }

    /// Like [`Self::get`], but returns a mutable reference. This also counts
    /// as an access.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the key is absent.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut Value>
    where
        Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.lookup.find(key, &self.freq_list).ok_or(Error::NotFound)?;
        let promoted = self.freq_list.increment(id);
        debug_assert!(promoted.is_some());
        self.freq_list
            .get_mut(id)
            .map(|entry| &mut entry.value)
            .ok_or(Error::NotFound)
    }

    /// Returns the value for `key` without counting it as an access.
    #[must_use]
    pub fn peek<Q>(&self, key: &Q) -> Option<&Value>
    where
        Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.lookup.find(key, &self.freq_list)?;
        self.freq_list.get(id).map(|entry| &entry.value)
    }

    /// Returns if the key is present. This does not count as an access.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup.find(key, &self.freq_list).is_some()
    }

    /// Returns how many times the key has been accessed, counting its
    /// insertion as the first access.
    #[must_use]
    pub fn frequency<Q>(&self, key: &Q) -> Option<usize>
    where
        Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.lookup.find(key, &self.freq_list)?;
        self.freq_list.frequency(id)
    }

    /// Sets the value for `key`.
    ///
    /// If the key is already present, its value is replaced and this counts as
    /// an access; the number of entries does not change. Otherwise a new entry
    /// is added with a frequency of 1. If the cache was full, the least
    /// frequently used entry is evicted first and returned.
    ///
    /// ```
    /// use lfu_engine::LfuCache;
    ///
    /// let mut cache = LfuCache::new(2).unwrap();
    /// assert_eq!(cache.set(1, "one"), None);
    /// assert_eq!(cache.set(2, "two"), None);
    ///
    /// // Updating does not evict, but does count as an access.
    /// assert_eq!(cache.set(1, "uno"), None);
    /// assert_eq!(cache.frequency(&1), Some(2));
    ///
    /// assert_eq!(cache.set(3, "three"), Some((2, "two")));
    /// ```
    pub fn set(&mut self, key: Key, value: Value) -> Option<(Key, Value)> {
        if let Some(id) = self.lookup.find(&key, &self.freq_list) {
            if let Some(entry) = self.freq_list.get_mut(id) {
                entry.value = value;
            }
            let promoted = self.freq_list.increment(id);
            debug_assert!(promoted.is_some());
            return None;
        }

        let evicted = if self.is_full() { self.pop_lfu() } else { None };

        let id = self.freq_list.insert(key, value);
        self.lookup.insert(id, &self.freq_list);

        evicted
    }

    /// Removes the entry for `key` and returns its value. Removal is not an
    /// access.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the key is absent.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Result<Value>
    where
        Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes the entry for `key` and returns the stored key and value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the key is absent.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Result<(Key, Value)>
    where
        Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self
            .lookup
            .remove(key, &self.freq_list)
            .ok_or(Error::NotFound)?;
        self.freq_list
            .remove(id)
            .map(|(key, value, _)| (key, value))
            .ok_or(Error::NotFound)
    }

    /// Evicts the least frequently used entry and returns it. If several
    /// entries share the lowest frequency, the one that has held it the longest
    /// is evicted.
    pub fn pop_lfu(&mut self) -> Option<(Key, Value)> {
        self.pop_lfu_key_value_frequency()
            .map(|(key, value, _)| (key, value))
    }

    /// Like [`Self::pop_lfu`], but also returns the frequency the entry had.
    pub fn pop_lfu_key_value_frequency(&mut self) -> Option<(Key, Value, usize)> {
        let victim = self.freq_list.peek_lfu_id()?;
        let unlinked = self.lookup.remove_id(victim, &self.freq_list);
        debug_assert!(unlinked);

        let (key, value, frequency) = self.freq_list.remove(victim)?;
        debug!("evicted entry with frequency {frequency}");
        Some((key, value, frequency))
    }
}

impl<Key, Value, State> LfuCache<Key, Value, State> {
    /// Returns the entry that would be evicted next, without counting it as
    /// an access.
    #[must_use]
    pub fn peek_lfu(&self) -> Option<(&Key, &Value)> {
        self.freq_list
            .peek_lfu()
            .map(|entry| (&entry.key, &entry.value))
    }

    /// The lowest frequency of any entry, or `None` if the cache is empty.
    #[inline]
    #[must_use]
    pub fn min_frequency(&self) -> Option<usize> {
        self.freq_list.min_frequency()
    }

    /// Returns the distinct frequencies currently held by entries, lowest
    /// first. This walks the frequency list and is linear in the number of
    /// distinct frequencies.
    #[inline]
    #[must_use]
    pub const fn frequencies(&self) -> Frequencies<'_, Key, Value> {
        self.freq_list.frequencies()
    }

    /// Returns an iterator over the entries in eviction order. This does
    /// **not** count as an access for any entry.
    #[inline]
    #[must_use]
    pub const fn iter(&self) -> Iter<'_, Key, Value> {
        self.freq_list.iter()
    }

    /// Removes every entry. The capacity is unchanged.
    pub fn clear(&mut self) {
        self.lookup.clear();
        self.freq_list.clear();
    }

    /// Returns the maximum number of entries the cache holds.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Returns the current number of entries. This is a constant time
    /// operation.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.freq_list.len()
    }

    /// Returns if the cache contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.freq_list.is_empty()
    }

    /// Returns if inserting a new key would evict an entry.
    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len() >= self.capacity.get()
    }

    /// Returns the hasher used for keys.
    #[inline]
    #[must_use]
    pub const fn hasher(&self) -> &State {
        self.lookup.hasher()
    }
}

impl<Key: Hash + Eq, Value, State: BuildHasher> LfuCache<Key, Value, State> {
    /// Panics if any internal invariant does not hold.
    ///
    /// Only available in tests and debug builds.
    #[cfg(any(test, debug_assertions))]
    #[doc(hidden)]
    pub fn debug_validate_invariants(&self) {
        self.freq_list.debug_validate_invariants();
        assert!(self.len() <= self.capacity(), "capacity exceeded");
        assert_eq!(
            self.lookup.len(),
            self.freq_list.len(),
            "lookup table and frequency list disagree on size"
        );
        for (id, entry) in self.freq_list.entries() {
            assert_eq!(
                self.lookup.find(&entry.key, &self.freq_list),
                Some(id),
                "entry is not reachable from the lookup table"
            );
        }
    }
}

#[cfg(not(tarpaulin_include))]
impl<Key: Debug, Value: Debug, State> Debug for LfuCache<Key, Value, State> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("LfuCache");
        dbg.field("len", &self.len());
        dbg.field("capacity", &self.capacity);
        dbg.field("frequencies", &self.frequencies().collect::<Vec<_>>());
        dbg.field("entries", &self.iter().collect::<Vec<_>>());
        dbg.finish()
    }
}

impl<Key: Hash + Eq, Value, State: BuildHasher> Extend<(Key, Value)> for LfuCache<Key, Value, State> {
    /// Sets every pair from the iterator. Note that this may evict entries if
    /// the number of new keys exceeds the free space in the cache.
    fn extend<T: IntoIterator<Item = (Key, Value)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<Key: Hash + Eq, Value, State: BuildHasher> IntoIterator for LfuCache<Key, Value, State> {
    type Item = (Key, Value);

    type IntoIter = IntoIter<Key, Value, State>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

impl<'a, Key, Value, State> IntoIterator for &'a LfuCache<Key, Value, State> {
    type Item = (&'a Key, &'a Value);

    type IntoIter = Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}


#[cfg(test)]
mod get {
    use crate::{Error, LfuCache};

    #[test]
    fn empty() {
        let mut cache = LfuCache::<u64, u64>::new(2).unwrap();
        for i in 0..10 {
            assert_eq!(cache.get(&i), Err(Error::NotFound));
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn miss_then_hit() {
        let mut cache = LfuCache::new(2).unwrap();
        assert_eq!(cache.get(&1), Err(Error::NotFound));
        cache.set(1, 2);
        assert_eq!(cache.get(&1), Ok(&2));
    }

    #[test]
    fn get_increments_frequency() {
        let mut cache = LfuCache::new(2).unwrap();
        cache.set(1, 2);
        assert_eq!(cache.frequency(&1), Some(1));
        cache.get(&1).unwrap();
        assert_eq!(cache.frequency(&1), Some(2));
        cache.get(&1).unwrap();
        assert_eq!(cache.frequency(&1), Some(3));
        cache.debug_validate_invariants();
    }

    #[test]
    fn get_mut() {
        let mut cache = LfuCache::new(2).unwrap();
        cache.set(1, 2);
        *cache.get_mut(&1).unwrap() = 3;
        assert_eq!(cache.frequency(&1), Some(2));
        assert_eq!(cache.get(&1), Ok(&3));
        assert_eq!(cache.get_mut(&2), Err(Error::NotFound));
    }

    #[test]
    fn getting_is_ok_after_adding_other_value() {
        let mut cache = LfuCache::new(2).unwrap();
        cache.set(1, 2);
        assert_eq!(cache.get(&1), Ok(&2));
        cache.set(3, 4);
        assert_eq!(cache.get(&1), Ok(&2));
    }

    #[test]
    fn bounded_alternating_values() {
        let mut cache = LfuCache::new(8).unwrap();
        cache.set(1, 1);
        cache.set(2, 2);
        for _ in 0..100 {
            cache.get(&1).unwrap();
            cache.get(&2).unwrap();
        }

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.frequencies().collect::<Vec<_>>(), vec![101]);
        cache.debug_validate_invariants();
    }

    #[test]
    fn borrowed_lookup() {
        let mut cache = LfuCache::new(2).unwrap();
        cache.set(String::from("key"), 1);
        assert_eq!(cache.get("key"), Ok(&1));
        assert!(cache.contains("key"));
        assert_eq!(cache.peek("key"), Some(&1));
        assert_eq!(cache.remove("key"), Ok(1));
    }

    #[test]
    fn peek_has_no_side_effect() {
        let mut cache = LfuCache::new(2).unwrap();
        cache.set(1, 10);
        assert_eq!(cache.peek(&1), Some(&10));
        assert_eq!(cache.peek(&2), None);
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert_eq!(cache.frequency(&1), Some(1));
    }
}





#[cfg(test)]
mod property_tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use crate::{Error, LfuCache};

    /// A naive reference model. Each key tracks its frequency and the tick at
    /// which it entered that frequency; the victim is the minimum of both.
    #[derive(Default)]
    struct Model {
        entries: HashMap<u8, (u32, usize, u64)>,
        tick: u64,
    }

    impl Model {
        fn touch(&mut self, key: u8) {
            self.tick += 1;
            let tick = self.tick;
            if let Some((_, freq, entered)) = self.entries.get_mut(&key) {
                *freq += 1;
                *entered = tick;
            }
        }

        fn victim(&self) -> Option<u8> {
            self.entries
                .iter()
                .min_by_key(|(_, (_, freq, entered))| (*freq, *entered))
                .map(|(key, _)| *key)
        }

        fn set(&mut self, key: u8, value: u32, capacity: usize) -> Option<(u8, u32)> {
            if self.entries.contains_key(&key) {
                self.touch(key);
                if let Some(entry) = self.entries.get_mut(&key) {
                    entry.0 = value;
                }
                return None;
            }
            let evicted = if self.entries.len() >= capacity {
                self.victim()
                    .and_then(|victim| self.entries.remove(&victim).map(|(v, _, _)| (victim, v)))
            } else {
                None
            };
            self.tick += 1;
            self.entries.insert(key, (value, 1, self.tick));
            evicted
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Get(u8),
        Set(u8, u32),
        Remove(u8),
        Pop,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0u8..16).prop_map(Op::Get),
            4 => (0u8..16, any::<u32>()).prop_map(|(k, v)| Op::Set(k, v)),
            1 => (0u8..16).prop_map(Op::Remove),
            1 => Just(Op::Pop),
        ]
    }

    proptest! {
        /// Property: the cache behaves like the naive model and keeps its
        /// invariants after every operation.
        #[test]
        fn prop_matches_model(
            capacity in 1usize..8,
            ops in prop::collection::vec(op(), 0..200)
        ) {
            let mut cache = LfuCache::new(capacity).unwrap();
            let mut model = Model::default();

            for op in ops {
                match op {
                    Op::Get(key) => {
                        let expected = model.entries.get(&key).map(|(v, _, _)| *v);
                        model.touch(key);
                        prop_assert_eq!(cache.get(&key).ok().copied(), expected);
                    }
                    Op::Set(key, value) => {
                        let expected = model.set(key, value, capacity);
                        prop_assert_eq!(cache.set(key, value), expected);
                    }
                    Op::Remove(key) => {
                        let expected = model.entries.remove(&key).map(|(v, _, _)| v).ok_or(Error::NotFound);
                        prop_assert_eq!(cache.remove(&key), expected);
                    }
                    Op::Pop => {
                        let expected = model
                            .victim()
                            .and_then(|victim| model.entries.remove(&victim).map(|(v, _, _)| (victim, v)));
                        prop_assert_eq!(cache.pop_lfu(), expected);
                    }
                }

                cache.debug_validate_invariants();
                prop_assert!(cache.len() <= cache.capacity());
                prop_assert_eq!(cache.len(), model.entries.len());
                prop_assert_eq!(
                    cache.min_frequency(),
                    model.entries.values().map(|(_, freq, _)| *freq).min()
                );
            }
        }

        /// Property: an entry's frequency never decreases while it is cached.
        #[test]
        fn prop_frequency_is_monotonic(
            ops in prop::collection::vec((any::<bool>(), 0u8..8), 0..200)
        ) {
            let mut cache = LfuCache::new(4).unwrap();
            let mut seen: HashMap<u8, usize> = HashMap::new();

            for (is_get, key) in ops {
                if is_get {
                    let _ = cache.get(&key);
                } else if let Some((evicted, _)) = cache.set(key, ()) {
                    seen.remove(&evicted);
                }

                for (key, last) in &mut seen {
                    let now = cache.frequency(key);
                    prop_assert!(now.is_some_and(|now| now >= *last));
                    *last = now.unwrap_or(*last);
                }
                if let Some(freq) = cache.frequency(&key) {
                    seen.insert(key, freq);
                }
            }
        }
    }
}
