//! Pending-work queue and visited set shared by all workers

use crate::url::ScopeFilter;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use url::Url;

/// A URL admitted to the crawl together with its discovery depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: Url,
    pub depth: u32,

    /// Admission position; the root is 0 and every later admission counts up
    pub seq: u64,
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<CrawlTarget>,
    visited: HashSet<String>,
    next_seq: u64,
    in_flight: usize,
    closed: bool,
}

/// Breadth-first frontier with exhaustion detection
///
/// The queue, the visited set and the in-flight count sit behind one mutex,
/// so checking and inserting a URL is a single atomic step and exhaustion
/// (empty queue, nothing in flight) is observed consistently.
///
/// A worker that takes a target must call [`Frontier::complete`] once it is
/// done with it (see [`InFlightGuard`]); until then the frontier cannot
/// report exhaustion, because that worker may still enqueue new links.
#[derive(Debug)]
pub struct Frontier {
    scope: ScopeFilter,
    max_depth: Option<u32>,
    state: Mutex<FrontierState>,
    notify: Notify,
}

impl Frontier {
    pub fn new(scope: ScopeFilter, max_depth: Option<u32>) -> Self {
        Self {
            scope,
            max_depth,
            state: Mutex::new(FrontierState::default()),
            notify: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Scope filter used for admission
    pub fn scope(&self) -> &ScopeFilter {
        &self.scope
    }

    /// Enqueues the crawl root at depth 0
    ///
    /// The root is admitted without consulting the scope filter; it still
    /// enters the visited set so links back to it are rejected.
    pub fn seed(&self, url: Url) -> bool {
        self.push(url, 0)
    }

    /// Admits `url` at `depth` unless it is too deep, out of scope or already
    /// visited
    ///
    /// A depth rejection does not mark the URL visited.
    pub fn try_enqueue(&self, url: &Url, depth: u32) -> bool {
        if let Some(max) = self.max_depth {
            if depth > max {
                tracing::trace!("Depth {} exceeds limit {} for {}", depth, max, url);
                return false;
            }
        }

        if !self.scope.admit_url(url) {
            tracing::trace!("Out of scope: {}", url);
            return false;
        }

        self.push(url.clone(), depth)
    }

    fn push(&self, url: Url, depth: u32) -> bool {
        {
            let mut state = self.lock();
            if state.closed || !state.visited.insert(url.as_str().to_string()) {
                return false;
            }
            let seq = state.next_seq;
            state.next_seq += 1;
            state.queue.push_back(CrawlTarget { url, depth, seq });
        }

        self.notify.notify_waiters();
        true
    }

    /// Marks `url` visited without scheduling it
    ///
    /// Used for redirect targets: the page was already fetched under another
    /// URL. Returns false if the URL was already visited.
    pub fn claim(&self, url: &Url) -> bool {
        self.lock().visited.insert(url.as_str().to_string())
    }

    /// Takes the next target, waiting while the queue is empty but other
    /// workers are still busy
    ///
    /// Returns `None` once the frontier is exhausted or closed. A returned
    /// target counts as in flight until [`Frontier::complete`] is called.
    pub async fn dequeue(&self) -> Option<CrawlTarget> {
        loop {
            // Registered before the state check so a wakeup between the check
            // and the await is not lost.
            let notified = self.notify.notified();

            {
                let mut state = self.lock();

                if state.closed {
                    return None;
                }

                if let Some(target) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Some(target);
                }

                if state.in_flight == 0 {
                    state.closed = true;
                    drop(state);
                    self.notify.notify_waiters();
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Marks one dequeued target as finished
    pub fn complete(&self) {
        let exhausted = {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);

            if state.in_flight == 0 && state.queue.is_empty() {
                state.closed = true;
                true
            } else {
                false
            }
        };

        if exhausted {
            tracing::debug!("Frontier exhausted");
            self.notify.notify_waiters();
        }
    }

    /// Stops handing out targets; queued targets are dropped
    pub fn close(&self) {
        let dropped = {
            let mut state = self.lock();
            state.closed = true;
            let dropped = state.queue.len();
            state.queue.clear();
            dropped
        };

        if dropped > 0 {
            tracing::debug!("Frontier closed with {} queued targets dropped", dropped);
        }
        self.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of URLs ever admitted (including claimed redirect targets)
    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    /// Targets waiting to be dequeued
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// Targets dequeued but not yet completed
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }
}

/// Calls [`Frontier::complete`] when dropped
///
/// Held by a worker for the lifetime of one target, so the in-flight count is
/// released even if processing unwinds.
pub struct InFlightGuard<'a> {
    frontier: &'a Frontier,
}

impl<'a> InFlightGuard<'a> {
    pub fn new(frontier: &'a Frontier) -> Self {
        Self { frontier }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.frontier.complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://a.test{}", path)).unwrap()
    }

    fn frontier(max_depth: Option<u32>) -> Frontier {
        let scope = ScopeFilter::new(&url("/index"), false, &[], &[]).unwrap();
        Frontier::new(scope, max_depth)
    }

    #[test]
    fn test_reenqueue_is_rejected() {
        let f = frontier(None);
        assert!(f.seed(url("/index")));
        assert!(f.try_enqueue(&url("/page1"), 1));
        assert!(!f.try_enqueue(&url("/page1"), 1));
        assert!(!f.try_enqueue(&url("/index"), 2));
        assert_eq!(f.visited_count(), 2);
        assert_eq!(f.queued(), 2);
    }

    #[test]
    fn test_depth_rejection_does_not_mark_visited() {
        let f = frontier(Some(1));
        assert!(!f.try_enqueue(&url("/deep"), 2));
        assert_eq!(f.visited_count(), 0);
        assert!(f.try_enqueue(&url("/deep"), 1));
    }

    #[test]
    fn test_out_of_scope_rejected() {
        let f = frontier(None);
        let other = Url::parse("https://b.test/x").unwrap();
        assert!(!f.try_enqueue(&other, 1));
        assert_eq!(f.visited_count(), 0);
    }

    #[test]
    fn test_seed_bypasses_scope() {
        let scope = ScopeFilter::new(&url("/"), false, &["/docs/".to_string()], &[]).unwrap();
        let f = Frontier::new(scope, None);
        assert!(f.seed(url("/")));
        assert!(!f.try_enqueue(&url("/blog"), 1));
    }

    #[test]
    fn test_claim() {
        let f = frontier(None);
        assert!(f.claim(&url("/final")));
        assert!(!f.claim(&url("/final")));
        assert!(!f.try_enqueue(&url("/final"), 1));
        assert_eq!(f.queued(), 0);
    }

    #[test]
    fn test_concurrent_enqueue_admits_once() {
        let f = Arc::new(frontier(None));
        let target = url("/shared");

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let f = Arc::clone(&f);
                let target = target.clone();
                std::thread::spawn(move || f.try_enqueue(&target, 1))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&ok| ok)
            .count();

        assert_eq!(admitted, 1);
        assert_eq!(f.queued(), 1);
    }

    #[tokio::test]
    async fn test_dequeue_exhausts_when_idle() {
        let f = frontier(None);
        f.seed(url("/index"));

        let target = f.dequeue().await.unwrap();
        assert_eq!(target.depth, 0);
        assert_eq!(f.in_flight(), 1);

        f.complete();
        assert!(f.is_closed());
        assert!(f.dequeue().await.is_none());
    }

    #[tokio::test]
    async fn test_waiting_worker_sees_new_target() {
        let f = Arc::new(frontier(None));
        f.seed(url("/index"));
        let root = f.dequeue().await.unwrap();
        assert_eq!(root.url, url("/index"));

        let waiter = {
            let f = Arc::clone(&f);
            tokio::spawn(async move { f.dequeue().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        // The busy worker discovers a link before finishing its target
        assert!(f.try_enqueue(&url("/page1"), 1));
        let next = waiter.await.unwrap().unwrap();
        assert_eq!(next.url, url("/page1"));
        assert_eq!(next.depth, 1);

        f.complete();
        assert!(!f.is_closed());
        f.complete();
        assert!(f.is_closed());
    }

    #[tokio::test]
    async fn test_waiting_worker_released_on_exhaustion() {
        let f = Arc::new(frontier(None));
        f.seed(url("/index"));
        let _root = f.dequeue().await.unwrap();

        let waiter = {
            let f = Arc::clone(&f);
            tokio::spawn(async move { f.dequeue().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        {
            let _guard = InFlightGuard::new(&f);
        }

        assert!(waiter.await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sequence_follows_admission_order() {
        let f = frontier(None);
        f.seed(url("/index"));
        f.try_enqueue(&url("/b"), 1);
        assert!(!f.try_enqueue(&url("/b"), 1));
        f.try_enqueue(&url("/a"), 1);

        let mut order = Vec::new();
        while let Some(target) = f.dequeue().await {
            order.push((target.url.path().to_string(), target.seq));
            f.complete();
        }

        assert_eq!(
            order,
            vec![
                ("/index".to_string(), 0),
                ("/b".to_string(), 1),
                ("/a".to_string(), 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_close_drops_queue() {
        let f = frontier(None);
        f.seed(url("/index"));
        f.try_enqueue(&url("/page1"), 1);

        f.close();
        assert_eq!(f.queued(), 0);
        assert!(f.dequeue().await.is_none());
        assert!(!f.try_enqueue(&url("/page2"), 1));
    }
}
