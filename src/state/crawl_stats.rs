use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Live crawl counters shared by all workers
///
/// Every field is an atomic so concurrent workers can update it without a
/// lock and without lost updates. Readers take a [`StatsSnapshot`].
#[derive(Debug, Default)]
pub struct CrawlStats {
    discovered: AtomicUsize,
    crawled: AtomicUsize,
    failed: AtomicUsize,
    links_found: AtomicUsize,
    max_depth: AtomicU32,
}

/// Point-in-time copy of [`CrawlStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// URLs admitted to the frontier (including the root)
    pub discovered: usize,

    /// Pages fetched and converted successfully
    pub crawled: usize,

    /// Pages that ended in a failure
    pub failed: usize,

    /// Links extracted from successful pages, before admission
    pub links_found: usize,

    /// Deepest depth at which a URL was admitted
    pub max_depth: u32,
}

impl StatsSnapshot {
    /// Pages with a recorded outcome
    pub fn completed(&self) -> usize {
        self.crawled + self.failed
    }

    /// Admitted URLs without an outcome yet (non-zero only for partial crawls)
    pub fn pending(&self) -> usize {
        self.discovered.saturating_sub(self.completed())
    }

    /// Percentage of completed pages that succeeded
    pub fn success_rate(&self) -> f64 {
        let completed = self.completed();
        if completed == 0 {
            0.0
        } else {
            (self.crawled as f64 / completed as f64) * 100.0
        }
    }
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a URL admitted to the frontier at `depth`
    pub fn record_discovered(&self, depth: u32) {
        self.discovered.fetch_add(1, Ordering::Relaxed);
        self.max_depth.fetch_max(depth, Ordering::Relaxed);
    }

    /// Records a successful page and the number of links it contained
    pub fn record_crawled(&self, links: usize) {
        self.crawled.fetch_add(1, Ordering::Relaxed);
        self.links_found.fetch_add(links, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            discovered: self.discovered.load(Ordering::Relaxed),
            crawled: self.crawled.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            links_found: self.links_found.load(Ordering::Relaxed),
            max_depth: self.max_depth.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counters() {
        let stats = CrawlStats::new();
        stats.record_discovered(0);
        stats.record_discovered(2);
        stats.record_discovered(1);
        stats.record_crawled(7);
        stats.record_failed();

        let snap = stats.snapshot();
        assert_eq!(snap.discovered, 3);
        assert_eq!(snap.crawled, 1);
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.links_found, 7);
        assert_eq!(snap.max_depth, 2);
        assert_eq!(snap.completed(), 2);
        assert_eq!(snap.pending(), 1);
    }

    #[test]
    fn test_success_rate() {
        let snap = StatsSnapshot {
            crawled: 3,
            failed: 1,
            ..Default::default()
        };
        assert!((snap.success_rate() - 75.0).abs() < f64::EPSILON);
        assert_eq!(StatsSnapshot::default().success_rate(), 0.0);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let stats = Arc::new(CrawlStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.record_discovered(1);
                        stats.record_crawled(2);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snap = stats.snapshot();
        assert_eq!(snap.discovered, 8000);
        assert_eq!(snap.crawled, 8000);
        assert_eq!(snap.links_found, 16000);
    }
}
