//! Crawler coordinator - concurrent breadth-first crawl orchestration
//!
//! This module runs the worker pool that drives a crawl:
//! - Seeding the frontier with the root URL
//! - Fetching, converting and recording each target
//! - Admitting discovered links at the next depth
//! - Stopping cleanly on exhaustion or cancellation

use crate::config::CrawlConfig;
use crate::content::{ContentPipeline, MarkdownPipeline};
use crate::crawler::events::{CrawlEvent, EventSink};
use crate::crawler::fetcher::{FetchedPage, Fetcher, HttpFetcher};
use crate::crawler::frontier::{CrawlTarget, Frontier, InFlightGuard};
use crate::state::{CrawlStats, FailureReason, PageStatus, StatsSnapshot};
use crate::storage::{PageResult, ResultStore};
use crate::url::{normalize_url, ScopeFilter};
use crate::{Result, WcbError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Base delay before the first retry; doubled for every further attempt
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Outcome of one crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Every recorded page, in the order results were stored
    pub pages: Vec<PageResult>,

    pub stats: StatsSnapshot,

    /// True when the crawl was stopped before the frontier was exhausted
    pub cancelled: bool,

    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn successes(&self) -> impl Iterator<Item = &PageResult> {
        self.pages.iter().filter(|p| p.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &PageResult> {
        self.pages.iter().filter(|p| !p.is_success())
    }
}

/// State shared by all workers of one crawl
struct Shared {
    config: CrawlConfig,
    frontier: Frontier,
    store: ResultStore,
    stats: CrawlStats,
    fetcher: Arc<dyn Fetcher>,
    pipeline: Arc<dyn ContentPipeline>,
    events: EventSink,
    cancel: CancellationToken,
}

/// Main crawler coordinator structure
///
/// Construct with [`Coordinator::new`], optionally swap collaborators with the
/// `with_*` methods, then call [`Coordinator::run`].
pub struct Coordinator {
    config: CrawlConfig,
    scope: ScopeFilter,
    fetcher: Arc<dyn Fetcher>,
    pipeline: Arc<dyn ContentPipeline>,
    events: EventSink,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a coordinator using the HTTP fetcher and markdown pipeline
    ///
    /// Fails if the scope patterns do not compile or the HTTP client cannot
    /// be built; no request is made here.
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let scope = ScopeFilter::from_config(&config)?;
        let fetcher = HttpFetcher::from_config(&config)?;

        Ok(Self {
            config,
            scope,
            fetcher: Arc::new(fetcher),
            pipeline: Arc::new(MarkdownPipeline::new()),
            events: EventSink::disabled(),
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_pipeline(mut self, pipeline: Arc<dyn ContentPipeline>) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Sends progress events to `events`
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    /// Stops the crawl when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this crawl
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the crawl to exhaustion or cancellation
    ///
    /// Per-page failures are recorded in the report, never returned as errors.
    pub async fn run(self) -> Result<CrawlReport> {
        let started = Instant::now();
        let root = self.config.root_url.clone();
        let workers = self.config.max_concurrent.max(1);

        let shared = Arc::new(Shared {
            frontier: Frontier::new(self.scope, self.config.max_depth),
            store: ResultStore::new(),
            stats: CrawlStats::new(),
            fetcher: self.fetcher,
            pipeline: self.pipeline,
            events: self.events,
            cancel: self.cancel,
            config: self.config,
        });

        if shared.frontier.seed(root.clone()) {
            shared.stats.record_discovered(0);
            shared.events.emit(CrawlEvent::Discovered {
                url: root.clone(),
                depth: 0,
            });
        }

        tracing::info!("Starting crawl of {} with {} workers", root, workers);

        let mut join_set = JoinSet::new();
        for worker_id in 0..workers {
            join_set.spawn(worker_loop(Arc::clone(&shared), worker_id));
        }

        while let Some(joined) = join_set.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl worker terminated abnormally: {}", e);
            }
        }

        let cancelled = shared.cancel.is_cancelled();
        let shared = Arc::try_unwrap(shared)
            .map_err(|_| WcbError::Worker("crawl state still shared after shutdown".into()))?;

        let report = CrawlReport {
            pages: shared.store.into_results(),
            stats: shared.stats.snapshot(),
            cancelled,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            "Crawl {}: {} crawled, {} failed, {} discovered in {:.1?}",
            if cancelled { "cancelled" } else { "completed" },
            report.stats.crawled,
            report.stats.failed,
            report.stats.discovered,
            report.elapsed
        );

        Ok(report)
    }
}

/// Pulls targets until the frontier is exhausted or the crawl is cancelled
async fn worker_loop(shared: Arc<Shared>, worker_id: usize) {
    loop {
        let target = tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => {
                shared.frontier.close();
                break;
            }
            next = shared.frontier.dequeue() => match next {
                Some(target) => target,
                None => break,
            },
        };

        let _in_flight = InFlightGuard::new(&shared.frontier);
        process_target(&shared, target).await;
    }

    tracing::debug!("Worker {} exiting", worker_id);
}

/// Runs one fetch-convert-record cycle
async fn process_target(shared: &Shared, target: CrawlTarget) {
    if !shared.config.delay.is_zero() {
        tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => {
                tracing::debug!("Cancelled before fetching {}", target.url);
                return;
            }
            _ = tokio::time::sleep(shared.config.delay) => {}
        }
    }

    tracing::debug!("Fetching {} (depth {})", target.url, target.depth);

    let result = match fetch_with_retries(shared, &target.url).await {
        Ok(page) => handle_page(shared, &target, page),
        Err(reason) => PageResult::failed(target.url.clone(), target.depth, reason),
    };

    // A redirect re-keyed to its final URL keeps the requested URL's position
    let result = result.with_seq(target.seq);

    record(shared, result);
}

/// Fetches `url`, retrying transient failures when configured
async fn fetch_with_retries(
    shared: &Shared,
    url: &Url,
) -> std::result::Result<FetchedPage, FailureReason> {
    let timeout = shared.config.timeout;
    let mut attempt = 0;

    loop {
        let outcome = match tokio::time::timeout(timeout, shared.fetcher.fetch(url, timeout)).await
        {
            Ok(fetched) => fetched.map_err(FailureReason::from),
            Err(_) => Err(FailureReason::Timeout),
        };

        let reason = match outcome {
            Ok(page) => return Ok(page),
            Err(reason) => reason,
        };

        if attempt >= shared.config.retries || !reason.is_transient() {
            return Err(reason);
        }

        let backoff = RETRY_BACKOFF * 2u32.saturating_pow(attempt);
        tracing::warn!(
            "Fetching {} failed ({}), retry {}/{} in {:?}",
            url,
            reason,
            attempt + 1,
            shared.config.retries,
            backoff
        );

        tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => return Err(reason),
            _ = tokio::time::sleep(backoff) => {}
        }

        attempt += 1;
    }
}

/// Resolves redirects, converts the page and admits its links
fn handle_page(shared: &Shared, target: &CrawlTarget, page: FetchedPage) -> PageResult {
    let final_url = normalize_url(page.final_url.as_str()).unwrap_or_else(|_| target.url.clone());

    let url = if final_url == target.url {
        final_url
    } else {
        // The root was admitted without the scope filter, so its redirect is too
        if target.depth > 0 && !shared.frontier.scope().admit_url(&final_url) {
            return PageResult::failed(
                target.url.clone(),
                target.depth,
                FailureReason::RedirectOutOfScope(final_url.to_string()),
            );
        }

        if !shared.frontier.claim(&final_url) {
            return PageResult::failed(
                target.url.clone(),
                target.depth,
                FailureReason::RedirectToVisited(final_url.to_string()),
            );
        }

        tracing::debug!("{} redirected to {}", target.url, final_url);
        final_url
    };

    let converted = match shared.pipeline.convert(&page.html, &url) {
        Ok(converted) => converted,
        Err(e) => return PageResult::failed(url, target.depth, e.into()),
    };

    let next_depth = target.depth + 1;
    for link in &converted.links {
        if shared.frontier.try_enqueue(link, next_depth) {
            shared.stats.record_discovered(next_depth);
            shared.events.emit(CrawlEvent::Discovered {
                url: link.clone(),
                depth: next_depth,
            });
        }
    }

    PageResult::success(
        url,
        target.depth,
        converted.title,
        converted.markdown,
        converted.links,
    )
}

/// Stores a result and reports it to stats and the observer
fn record(shared: &Shared, result: PageResult) {
    match &result.status {
        PageStatus::Success => {
            shared.stats.record_crawled(result.discovered_links.len());
            shared.events.emit(CrawlEvent::Crawled {
                url: result.url.clone(),
                depth: result.depth,
            });
        }
        PageStatus::Failed(reason) => {
            tracing::warn!("Failed {}: {}", result.url, reason);
            shared.stats.record_failed();
            shared.events.emit(CrawlEvent::Failed {
                url: result.url.clone(),
                reason: reason.clone(),
            });
        }
    }

    shared.store.insert(result);
}

/// Runs a complete crawl with the default HTTP fetcher and markdown pipeline
///
/// # Example
///
/// ```no_run
/// use web_context_builder::config::CrawlConfigBuilder;
/// use web_context_builder::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CrawlConfigBuilder::new().root_url("https://docs.example.com").build()?;
/// let report = run_crawl(config).await?;
/// println!("{} pages crawled", report.stats.crawled);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: CrawlConfig) -> Result<CrawlReport> {
    Coordinator::new(config)?.run().await
}
