//! A [`Tree`] behind a tree-wide read/write lock.

use parking_lot::RwLock;

use super::{Config, Match, Tree};
use crate::error::InsertError;

/// A radix tree that can be written to while it is being read.
///
/// Every insert holds the write lock and every lookup holds the read lock for
/// its whole duration, so registration and serving may interleave freely.
/// Lookups do not serialize against each other. Prefer a plain [`Tree`] when
/// every route is known before the first request arrives.
#[derive(Debug)]
pub struct GuardedTree<T> {
    inner: RwLock<Tree<T>>,
}

impl<T> GuardedTree<T> {
    pub fn new() -> Self {
        Self::from(Tree::new())
    }

    pub fn with_config(config: Config) -> Self {
        Self::from(Tree::with_config(config))
    }

    pub fn insert(&self, pattern: &str, handler: T) -> Result<(), InsertError> {
        self.inner.write().insert(pattern, handler)
    }

    /// Looks `path` up under the read lock and returns a clone of the handler,
    /// since no reference may outlive the guard.
    pub fn lookup(&self, path: &str) -> Option<Match<T>>
    where
        T: Clone,
    {
        self.inner.read().lookup(path).map(|found| found.map(T::clone))
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn size(&self) -> usize {
        self.inner.read().size()
    }

    /// Unwraps the lock once registration is over.
    pub fn into_inner(self) -> Tree<T> {
        self.inner.into_inner()
    }
}

impl<T> Default for GuardedTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Tree<T>> for GuardedTree<T> {
    fn from(tree: Tree<T>) -> Self {
        Self { inner: RwLock::new(tree) }
    }
}
