use std::{collections::VecDeque, sync::Arc};

use crate::Grid;

/// A small least-recently-used cache of grids, keyed by resolution.
///
/// Entries are kept in recency order, most recent first.  With only a
/// handful of entries a linear scan beats any hashing.
#[derive(Debug)]
pub struct SampleCache {
    capacity: usize,
    entries: VecDeque<(usize, Arc<Grid>)>,
}

impl SampleCache {
    pub fn new(capacity: usize) -> SampleCache {
        assert!(capacity > 0, "a sample cache must hold at least one grid");
        SampleCache {
            capacity: capacity,
            entries: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Looks up a grid, marking it as most recently used.
    pub fn get(&mut self, resolution: usize) -> Option<Arc<Grid>> {
        let i = self.entries.iter().position(|e| e.0 == resolution)?;
        let entry = self.entries.remove(i)?;
        let grid = Arc::clone(&entry.1);
        self.entries.push_front(entry);
        Some(grid)
    }

    /// Adds a grid as the most recently used entry, evicting the least
    /// recently used one if the cache is full.
    ///
    /// Returns the resolution of the evicted grid, if any.
    pub fn insert(&mut self, resolution: usize, grid: Arc<Grid>) -> Option<usize> {
        if let Some(i) = self.entries.iter().position(|e| e.0 == resolution) {
            self.entries.remove(i);
        }
        self.entries.push_front((resolution, grid));

        if self.entries.len() > self.capacity {
            self.entries.pop_back().map(|e| e.0)
        } else {
            None
        }
    }

    pub fn contains(&self, resolution: usize) -> bool {
        self.entries.iter().any(|e| e.0 == resolution)
    }

    /// Cached resolutions, most recently used first.
    pub fn resolutions(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.0).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniform_samples;

    fn grid(n: usize) -> Arc<Grid> {
        Arc::new(uniform_samples(n).unwrap())
    }

    #[test]
    fn recency_order() {
        let mut cache = SampleCache::new(4);
        assert!(cache.is_empty());
        cache.insert(1, grid(1));
        cache.insert(2, grid(2));
        cache.insert(3, grid(3));
        assert_eq!(cache.resolutions(), vec![3, 2, 1]);

        assert!(cache.get(1).is_some());
        assert_eq!(cache.resolutions(), vec![1, 3, 2]);
        assert!(cache.get(7).is_none());
        assert_eq!(cache.resolutions(), vec![1, 3, 2]);
    }

    #[test]
    fn bounded() {
        let mut cache = SampleCache::new(4);
        for n in 1..=4 {
            assert_eq!(cache.insert(n, grid(n)), None);
        }
        assert_eq!(cache.insert(5, grid(5)), Some(1));
        assert_eq!(cache.len(), cache.capacity());
        assert_eq!(cache.resolutions(), vec![5, 4, 3, 2]);
    }

    #[test]
    fn reinsert_does_not_grow() {
        let mut cache = SampleCache::new(2);
        cache.insert(3, grid(3));
        cache.insert(3, grid(3));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(!cache.contains(3));
    }
}
