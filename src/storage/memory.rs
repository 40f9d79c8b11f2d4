use crate::storage::PageResult;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Page results keyed by URL, read back in discovery order
///
/// Workers insert concurrently; the single mutex guards both the result
/// list and the key index so they can never disagree. Readers get results
/// sorted by [`PageResult::seq`], ties kept in insertion order.
#[derive(Debug, Default)]
pub struct ResultStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    results: Vec<PageResult>,
    index: HashMap<String, usize>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts a result keyed by its URL
    ///
    /// A second insert for the same URL replaces the earlier result in place,
    /// keeping the original discovery position.
    pub fn insert(&self, result: PageResult) {
        let mut inner = self.lock();
        let key = result.url.as_str().to_string();

        match inner.index.get(&key).copied() {
            Some(position) => {
                tracing::debug!("Replacing existing result for {}", key);
                inner.results[position] = result;
            }
            None => {
                let position = inner.results.len();
                inner.results.push(result);
                inner.index.insert(key, position);
            }
        }
    }

    /// Returns a copy of every result in discovery order
    pub fn all(&self) -> Vec<PageResult> {
        let mut results = self.lock().results.clone();
        results.sort_by_key(|r| r.seq);
        results
    }

    /// Looks up the result recorded for a URL
    pub fn get(&self, url: &str) -> Option<PageResult> {
        let inner = self.lock();
        inner.index.get(url).map(|&i| inner.results[i].clone())
    }

    pub fn len(&self) -> usize {
        self.lock().results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the store, returning results in discovery order
    pub fn into_results(self) -> Vec<PageResult> {
        let mut results = self
            .inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .results;
        results.sort_by_key(|r| r.seq);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FailureReason;
    use std::sync::Arc;
    use url::Url;

    fn page(path: &str, title: &str) -> PageResult {
        let url = Url::parse(&format!("https://a.test{}", path)).unwrap();
        PageResult::success(url, 0, title.to_string(), format!("# {}", title), vec![])
    }

    #[test]
    fn test_equal_positions_keep_insertion_order() {
        let store = ResultStore::new();
        store.insert(page("/c", "C"));
        store.insert(page("/a", "A"));
        store.insert(page("/b", "B"));

        let titles: Vec<_> = store.all().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_results_sorted_by_discovery_position() {
        let store = ResultStore::new();
        store.insert(page("/fast", "Fast").with_seq(2));
        store.insert(page("/", "Root").with_seq(0));
        store.insert(page("/slow", "Slow").with_seq(1));

        let titles: Vec<_> = store.all().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["Root", "Slow", "Fast"]);

        let titles: Vec<_> = store.into_results().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["Root", "Slow", "Fast"]);
    }

    #[test]
    fn test_duplicate_insert_overwrites_in_place() {
        let store = ResultStore::new();
        store.insert(page("/a", "First"));
        store.insert(page("/b", "B"));
        store.insert(page("/a", "Second"));

        assert_eq!(store.len(), 2);
        let all = store.all();
        assert_eq!(all[0].title, "Second");
        assert_eq!(all[1].title, "B");
    }

    #[test]
    fn test_get_by_url() {
        let store = ResultStore::new();
        let url = Url::parse("https://a.test/x").unwrap();
        store.insert(PageResult::failed(url, 1, FailureReason::HttpStatus(404)));

        let found = store.get("https://a.test/x").unwrap();
        assert!(!found.is_success());
        assert!(store.get("https://a.test/y").is_none());
    }

    #[test]
    fn test_concurrent_inserts() {
        let store = Arc::new(ResultStore::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        store.insert(page(&format!("/{}/{}", t, i), "p"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 200);
        let store = Arc::try_unwrap(store).unwrap();
        assert_eq!(store.into_results().len(), 200);
    }
}
