#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(missing_docs)]

//! This crate provides a least frequently used (LFU) cache where every
//! operation, including eviction, runs in constant time.
//!
//! Each entry carries an access count. Reading a key with [`LfuCache::get`] or
//! overwriting it with [`LfuCache::set`] increases that count by one. When a
//! new key arrives while the cache is full, the entry with the lowest count is
//! evicted. Among entries sharing the lowest count, the one that reached it
//! first goes first, so the cache degrades to least recently used order when
//! all counts are equal.
//!
//! ```
//! # use lfu_engine::{Error, LfuCache};
//! let mut cache = LfuCache::new(2)?;
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.get("a")?;
//!
//! assert_eq!(cache.set("c", 3), Some(("b", 2)));
//! assert_eq!(cache.get("b"), Err(Error::NotFound));
//! # Ok::<(), Error>(())
//! ```
//!
//! Entries and frequency buckets live in index based arenas rather than behind
//! raw pointers, so the crate contains no `unsafe` code and a cache is [`Send`]
//! and [`Sync`] whenever its keys and values are. The cache does no locking of
//! its own. Wrap it in a [`Mutex`](std::sync::Mutex) to share it between
//! threads.
//!
//! [`LfuSet`] applies the same policy to bare keys, for callers that only need
//! to know which keys are hot.

#![forbid(unsafe_code)]

pub use error::{Error, Result};
pub use frequency_list::{Frequencies, Iter};
pub use iter::IntoIter;
pub use lfu::LfuCache;
pub use lfu_set::LfuSet;

mod arena;
mod error;
mod frequency_list;
mod iter;
mod lfu;
mod lfu_set;
mod lookup_table;
