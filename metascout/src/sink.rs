use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::results::SearchResult;

/// A thread-safe, append-only collection of search results.
///
/// Producers call [`ResultSink::try_insert`] from any number of threads.
/// No ordering is promised between producers; consumers should treat the
/// contents as an unordered multiset until they have drained it.
pub trait ResultSink: Send + Sync {
    /// Attempts to add a result; returns whether it was accepted
    fn try_insert(&self, result: SearchResult) -> bool;

    /// Removes one result, if any
    fn try_take(&self) -> Option<SearchResult>;

    /// Copies the current contents without removing them
    fn snapshot(&self) -> Vec<SearchResult>;

    fn len(&self) -> usize;

    /// Inserts refused so far because the sink was full
    fn rejected(&self) -> usize {
        0
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns everything currently held
    fn drain(&self) -> Vec<SearchResult> {
        let mut drained = Vec::with_capacity(self.len());
        while let Some(result) = self.try_take() {
            drained.push(result);
        }
        drained
    }
}

/// Default sink: a mutex-guarded FIFO with an optional capacity.
///
/// Once a bounded queue is full, further inserts are rejected until
/// something is taken out.
#[derive(Default)]
pub struct ResultQueue {
    items: Mutex<VecDeque<SearchResult>>,
    capacity: Option<usize>,
    rejected: AtomicUsize,
}

impl ResultQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue that holds at most `capacity` results; `0` means unbounded
    pub fn bounded(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            capacity: (capacity > 0).then_some(capacity),
            rejected: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.capacity
            .is_some_and(|capacity| self.items.lock().len() >= capacity)
    }
}

impl ResultSink for ResultQueue {
    fn try_insert(&self, result: SearchResult) -> bool {
        let mut items = self.items.lock();
        if self.capacity.is_some_and(|capacity| items.len() >= capacity) {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        items.push_back(result);
        true
    }

    fn try_take(&self) -> Option<SearchResult> {
        self.items.lock().pop_front()
    }

    fn snapshot(&self) -> Vec<SearchResult> {
        self.items.lock().iter().cloned().collect()
    }

    fn len(&self) -> usize {
        self.items.lock().len()
    }

    fn rejected(&self) -> usize {
        self.rejected.load(Ordering::Relaxed)
    }

    fn drain(&self) -> Vec<SearchResult> {
        self.items.lock().drain(..).collect()
    }
}

impl fmt::Debug for ResultQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ModuleBuilder;
    use crate::results::{fitness_for, ResourceResult};
    use rayon::prelude::*;
    use std::sync::Arc;

    fn resource(name: &str) -> SearchResult {
        let module = Arc::new(ModuleBuilder::new("Acme").build());
        SearchResult::Resource(ResourceResult {
            name: name.to_string(),
            fitness: fitness_for(name),
            location: "Acme".to_string(),
            assembly: "Acme".to_string(),
            module,
        })
    }

    #[test]
    fn test_insert_take_fifo() {
        let queue = ResultQueue::new();
        assert!(queue.is_empty());
        assert!(queue.try_insert(resource("a")));
        assert!(queue.try_insert(resource("b")));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.try_take().unwrap().name(), "a");
        assert_eq!(queue.try_take().unwrap().name(), "b");
        assert!(queue.try_take().is_none());
    }

    #[test]
    fn test_snapshot_does_not_remove() {
        let queue = ResultQueue::new();
        queue.try_insert(resource("a"));
        assert_eq!(queue.snapshot().len(), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_bounded_queue_rejects_when_full() {
        let queue = ResultQueue::bounded(2);
        assert_eq!(queue.capacity(), Some(2));
        assert!(queue.try_insert(resource("a")));
        assert!(queue.try_insert(resource("b")));
        assert!(queue.is_full());
        assert!(!queue.try_insert(resource("c")));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.rejected(), 1);

        queue.try_take();
        assert!(queue.try_insert(resource("c")));
    }

    #[test]
    fn test_zero_capacity_is_unbounded() {
        let queue = ResultQueue::bounded(0);
        assert_eq!(queue.capacity(), None);
        assert!(!queue.is_full());
    }

    #[test]
    fn test_concurrent_inserts_are_not_lost() {
        let queue = ResultQueue::new();
        (0..1000).into_par_iter().for_each(|i| {
            assert!(queue.try_insert(resource(&format!("r{}", i))));
        });
        assert_eq!(queue.len(), 1000);

        let mut names: Vec<String> = queue.drain().iter().map(|r| r.name().to_string()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 1000);
    }
}
