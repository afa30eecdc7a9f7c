use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt::{Debug, Formatter};
use std::hash::{BuildHasher, Hash};

use crate::error::Result;
use crate::LfuCache;

/// A key-only frequency tracker with the same eviction rule as [`LfuCache`].
///
/// This is useful for admission decisions, where only the identity of hot keys
/// matters and no value needs to be kept.
///
/// ```
/// # use lfu_engine::LfuSet;
/// let mut set = LfuSet::new(2).unwrap();
/// assert_eq!(set.refer("a"), None);
/// assert_eq!(set.refer("b"), None);
/// assert_eq!(set.refer("a"), None);
///
/// // "b" was referred to less often, so it makes room for "c".
/// assert_eq!(set.refer("c"), Some("b"));
/// assert!(set.contains("a"));
/// ```
// This is re-exported at the crate root, so this lint can be safely ignored.
#[allow(clippy::module_name_repetitions)]
pub struct LfuSet<Key, State = RandomState> {
    inner: LfuCache<Key, (), State>,
}

impl<Key: Hash + Eq> LfuSet<Key> {
    /// Creates an empty set that tracks at most `capacity` keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`](crate::Error::InvalidCapacity) if
    /// `capacity` is zero.
    #[inline]
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_hasher(capacity, RandomState::new())
    }
}

impl<Key: Hash + Eq, State: BuildHasher> LfuSet<Key, State> {
    /// Creates an empty set that tracks at most `capacity` keys, hashing them
    /// with `hasher`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`](crate::Error::InvalidCapacity) if
    /// `capacity` is zero.
    #[inline]
    pub fn with_hasher(capacity: usize, hasher: State) -> Result<Self> {
        LfuCache::with_hasher(capacity, hasher).map(|inner| Self { inner })
    }

    /// Records a reference to `key`. A known key has its frequency increased;
    /// an unknown key is added with a frequency of 1, evicting and returning
    /// the least frequently used key if the set was full.
    #[inline]
    pub fn refer(&mut self, key: Key) -> Option<Key> {
        self.inner.set(key, ()).map(|(evicted, ())| evicted)
    }

    /// Returns if the key is tracked. This does not count as a reference.
    #[inline]
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains(key)
    }

    /// Returns how many times the key has been referred to.
    #[inline]
    #[must_use]
    pub fn frequency<Q>(&self, key: &Q) -> Option<usize>
    where
        Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.frequency(key)
    }

    /// Stops tracking `key`, returning the stored key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the key is not
    /// tracked.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Result<Key>
    where
        Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.remove_entry(key).map(|(key, ())| key)
    }
}

impl<Key, State> LfuSet<Key, State> {
    /// The key that would be evicted next.
    #[inline]
    #[must_use]
    pub fn peek_lfu(&self) -> Option<&Key> {
        self.inner.peek_lfu().map(|(key, ())| key)
    }

    /// Returns the number of tracked keys.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns if no keys are tracked.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the maximum number of tracked keys.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}

#[cfg(not(tarpaulin_include))]
impl<Key: Debug, State> Debug for LfuSet<Key, State> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(self.inner.iter().map(|(key, ())| key))
            .finish()
    }
}

#[cfg(test)]
mod refer {
    use crate::{Error, LfuSet};

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(LfuSet::<u8>::new(0).unwrap_err(), Error::InvalidCapacity);
    }

    #[test]
    fn refer_inserts_then_counts() {
        let mut set = LfuSet::new(4).unwrap();
        assert_eq!(set.refer(String::from("a")), None);
        assert_eq!(set.frequency("a"), Some(1));
        assert_eq!(set.refer(String::from("a")), None);
        assert_eq!(set.frequency("a"), Some(2));
        assert_eq!(set.len(), 1);
        assert_eq!(set.capacity(), 4);
    }

    #[test]
    fn refer_evicts_least_frequent() {
        let mut set = LfuSet::new(2).unwrap();
        set.refer(1);
        set.refer(1);
        set.refer(2);
        assert_eq!(set.peek_lfu(), Some(&2));
        assert_eq!(set.refer(3), Some(2));
        assert!(!set.contains(&2));
        assert_eq!(set.refer(4), Some(3));
        assert!(set.contains(&1));
    }

    #[test]
    fn refer_ties_evict_oldest() {
        let mut set = LfuSet::new(3).unwrap();
        set.refer('a');
        set.refer('b');
        set.refer('c');
        assert_eq!(set.refer('d'), Some('a'));
    }

    #[test]
    fn remove() {
        let mut set = LfuSet::new(2).unwrap();
        set.refer(1);
        assert_eq!(set.remove(&1), Ok(1));
        assert_eq!(set.remove(&1), Err(Error::NotFound));
        assert!(set.is_empty());
        assert_eq!(set.peek_lfu(), None);
    }
}
