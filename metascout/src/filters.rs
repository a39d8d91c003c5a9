/// Sink decorators.
///
/// [`FilteredSink`] wraps any [`ResultSink`] and gates insertion on a
/// predicate. Everything else (taking, snapshots, length) is forwarded to the
/// wrapped sink untouched, so several filtered views can share one
/// downstream queue.
///
/// The usual predicate is a scope check: a delegate strategy that knows
/// nothing about scopes writes through the filter, and results outside the
/// scope never reach the queue.
///
/// ```rust,ignore
/// let queue: Arc<dyn ResultSink> = Arc::new(ResultQueue::new());
/// let in_scope = FilteredSink::new(queue.clone(), move |r| scope.is_match_result(r));
/// ```
use std::fmt;
use std::sync::Arc;

use crate::results::SearchResult;
use crate::sink::ResultSink;

pub struct FilteredSink<F> {
    inner: Arc<dyn ResultSink>,
    filter: F,
}

impl<F> FilteredSink<F>
where
    F: Fn(&SearchResult) -> bool + Send + Sync,
{
    pub fn new(inner: Arc<dyn ResultSink>, filter: F) -> Self {
        Self { inner, filter }
    }
}

impl<F> ResultSink for FilteredSink<F>
where
    F: Fn(&SearchResult) -> bool + Send + Sync,
{
    fn try_insert(&self, result: SearchResult) -> bool {
        (self.filter)(&result) && self.inner.try_insert(result)
    }

    fn try_take(&self) -> Option<SearchResult> {
        self.inner.try_take()
    }

    fn snapshot(&self) -> Vec<SearchResult> {
        self.inner.snapshot()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    /// Only capacity refusals downstream; filtered-out results are not counted
    fn rejected(&self) -> usize {
        self.inner.rejected()
    }

    fn drain(&self) -> Vec<SearchResult> {
        self.inner.drain()
    }
}

impl<F> fmt::Debug for FilteredSink<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredSink")
            .field("len", &self.inner.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ModuleBuilder;
    use crate::results::{fitness_for, ResourceResult};
    use crate::sink::ResultQueue;

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
    fn test_rejected_items_never_reach_inner() {
        let queue: Arc<dyn ResultSink> = Arc::new(ResultQueue::new());
        let filtered = FilteredSink::new(queue.clone(), |r: &SearchResult| r.name().starts_with("keep"));

        assert!(filtered.try_insert(resource("keep.me")));
        assert!(!filtered.try_insert(resource("drop.me")));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.snapshot()[0].name(), "keep.me");
    }

    #[test]
    fn test_accepted_items_mirror_inner_result() {
        let queue: Arc<dyn ResultSink> = Arc::new(ResultQueue::bounded(1));
        let filtered = FilteredSink::new(queue.clone(), |_: &SearchResult| true);

        assert!(filtered.try_insert(resource("a")));
        // Predicate holds, but the inner queue is full.
        assert!(!filtered.try_insert(resource("b")));
        assert_eq!(queue.len(), 1);
        assert_eq!(filtered.rejected(), 1);
    }

    #[test]
    fn test_filtered_out_items_are_not_counted_as_refused() {
        let queue: Arc<dyn ResultSink> = Arc::new(ResultQueue::bounded(1));
        let filtered = FilteredSink::new(queue.clone(), |_: &SearchResult| false);

        assert!(!filtered.try_insert(resource("a")));
        assert_eq!(filtered.rejected(), 0);
    }

    #[test]
    fn test_other_operations_pass_through() {
        let queue: Arc<dyn ResultSink> = Arc::new(ResultQueue::new());
        queue.try_insert(resource("direct"));
        let filtered = FilteredSink::new(queue.clone(), |_: &SearchResult| false);

        // Items added behind the filter's back are still visible through it.
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.snapshot().len(), 1);
        assert_eq!(filtered.try_take().unwrap().name(), "direct");
        assert!(filtered.is_empty());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_two_filters_share_one_queue() {
        let queue: Arc<dyn ResultSink> = Arc::new(ResultQueue::new());
        let evens = FilteredSink::new(queue.clone(), |r: &SearchResult| r.name().len() % 2 == 0);
        let odds = FilteredSink::new(queue.clone(), |r: &SearchResult| r.name().len() % 2 == 1);

        for name in ["a", "bb", "ccc", "dddd"] {
            evens.try_insert(resource(name));
            odds.try_insert(resource(name));
        }
        assert_eq!(queue.len(), 4);
    }
}
