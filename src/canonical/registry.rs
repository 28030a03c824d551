//! Sharing of structurally equal canonical mappings.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;

use crate::canonical::CanonicalMapping;

/// Counters describing how often a [`Registry`] found an existing shape.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counts {
    /// The number of lookups that returned an existing mapping.
    pub hits: usize,

    /// The number of lookups that inserted a new mapping.
    pub misses: usize,
}

/// A thread-safe deduplication table of canonical mappings.
///
/// Mappings are keyed by their structural hash, so every distinct gap pattern
/// is stored exactly once and shared by all reads that exhibit it.
#[derive(Debug, Default)]
pub struct Registry {
    /// The guarded table.
    inner: Mutex<Inner>,
}

/// The contents of a [`Registry`].
#[derive(Debug, Default)]
struct Inner {
    /// The distinct shapes.
    mappings: HashSet<Arc<CanonicalMapping>>,

    /// The lookup counters.
    counts: Counts,
}

impl Registry {
    /// Returns the shared instance of `mapping`, inserting it if this shape
    /// has not been seen before.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use contigmap::canonical::CanonicalMapping;
    /// use contigmap::canonical::CanonicalSegment;
    /// use contigmap::canonical::Registry;
    /// use nonempty::nonempty;
    ///
    /// let registry = Registry::default();
    ///
    /// let a = registry.intern(CanonicalMapping::new(nonempty![CanonicalSegment::new(1, 1, 5)]));
    /// let b = registry.intern(CanonicalMapping::new(nonempty![CanonicalSegment::new(1, 1, 5)]));
    ///
    /// assert!(Arc::ptr_eq(&a, &b));
    /// assert_eq!(registry.len(), 1);
    /// assert_eq!(registry.counts().hits, 1);
    /// assert_eq!(registry.counts().misses, 1);
    /// ```
    pub fn intern(&self, mapping: CanonicalMapping) -> Arc<CanonicalMapping> {
        let mut inner = self.lock();

        if let Some(existing) = inner.mappings.get(&mapping) {
            let existing = Arc::clone(existing);
            inner.counts.hits += 1;
            return existing;
        }

        let mapping = Arc::new(mapping);
        inner.mappings.insert(Arc::clone(&mapping));
        inner.counts.misses += 1;
        mapping
    }

    /// Gets the number of distinct shapes held.
    pub fn len(&self) -> usize {
        self.lock().mappings.len()
    }

    /// Returns whether the registry holds no shapes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the hit and miss counts.
    pub fn counts(&self) -> Counts {
        self.lock().counts
    }

    /// Locks the table, recovering from poisoning.
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Every insertion is a single call, so a poisoned set is still whole.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use nonempty::nonempty;

    use super::*;
    use crate::canonical::CanonicalSegment;

    #[test]
    fn distinct_shapes_are_kept_apart() {
        let registry = Registry::default();
        assert!(registry.is_empty());

        let a = registry.intern(CanonicalMapping::new(nonempty![
            CanonicalSegment::new(1, 1, 5)
        ]));
        let b = registry.intern(CanonicalMapping::new(nonempty![
            CanonicalSegment::new(1, 1, 5),
            CanonicalSegment::new(8, 6, 2)
        ]));

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.counts(), Counts { hits: 0, misses: 2 });
    }

    #[test]
    fn interning_from_many_threads() {
        let registry = Arc::new(Registry::default());

        let handles = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let length = 1 + i % 2;
                    registry.intern(CanonicalMapping::new(nonempty![CanonicalSegment::new(
                        1, 1, length
                    )]))
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.counts(), Counts { hits: 6, misses: 2 });
    }
}
