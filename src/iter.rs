use std::fmt::{Debug, Formatter};
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;

use crate::LfuCache;

/// A consuming iterator over the keys and values of an [`LfuCache`], in
/// eviction order.
///
/// This is constructed by calling `into_iter` on a cache.
pub struct IntoIter<Key, Value, State>(pub(crate) LfuCache<Key, Value, State>);

impl<Key: Hash + Eq, Value, State: BuildHasher> Iterator for IntoIter<Key, Value, State> {
    type Item = (Key, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_lfu()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl<Key: Hash + Eq, Value, State: BuildHasher> FusedIterator for IntoIter<Key, Value, State> {}

impl<Key: Hash + Eq, Value, State: BuildHasher> ExactSizeIterator for IntoIter<Key, Value, State> {
    #[inline]
    fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(not(tarpaulin_include))]
impl<Key: Debug, Value: Debug, State> Debug for IntoIter<Key, Value, State> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("IntoIter").field(&self.0).finish()
    }
}
