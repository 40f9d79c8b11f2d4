//! Web Context Builder main entry point
//!
//! This is the command-line interface that crawls a site and writes
//! LLM-ready markdown.

use anyhow::{bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use web_context_builder::config::{load_config_with_hash, CrawlConfig, CrawlConfigBuilder};
use web_context_builder::crawler::{event_channel, Coordinator, CrawlEvent};
use web_context_builder::output::{print_statistics, write_output};

/// Web Context Builder: turn a website into LLM context
///
/// Crawls every reachable page under a root URL, extracts the main content,
/// converts it to markdown and writes per-page files plus one merged
/// document with a table of contents.
#[derive(Parser, Debug)]
#[command(name = "wcb")]
#[command(version)]
#[command(about = "Crawl a website into clean markdown for LLM context", long_about = None)]
struct Cli {
    /// Root URL to start crawling from (https:// is assumed if omitted)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Maximum number of concurrent requests
    #[arg(short = 'c', long = "concurrency", value_name = "N")]
    max_concurrent: Option<usize>,

    /// Maximum link depth from the root (unlimited if omitted)
    #[arg(short = 'd', long = "depth", value_name = "N")]
    max_depth: Option<u32>,

    /// Pause before each request, in seconds
    #[arg(long, value_name = "SECS")]
    delay: Option<f64>,

    /// Per-request timeout, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<f64>,

    /// Also crawl other subdomains of the root's domain
    #[arg(long)]
    cross_subdomain: bool,

    /// Only crawl URLs matching this regex (repeatable; bypasses the domain check)
    #[arg(long, value_name = "REGEX")]
    include: Vec<String>,

    /// Never crawl URLs matching this regex (repeatable)
    #[arg(long, value_name = "REGEX")]
    exclude: Vec<String>,

    /// Retries for timeouts, connection errors and 5xx responses
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// User-Agent header to send
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Skip writing the merged document
    #[arg(long)]
    no_merge: bool,

    /// File name of the merged document (defaults to <host>.md)
    #[arg(short = 'm', long, value_name = "NAME")]
    merged_filename: Option<String>,

    /// Log progress lines instead of showing a spinner
    #[arg(long)]
    no_progress: bool,

    /// Stop the crawl after this many seconds and write what was collected
    #[arg(long, value_name = "SECS")]
    max_duration: Option<f64>,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let max_duration = cli
        .max_duration
        .map(Duration::try_from_secs_f64)
        .transpose()
        .context("--max-duration must be a non-negative number of seconds")?;

    tracing::info!(
        "Crawling {} (concurrency {}, depth {}, delay {:?}, timeout {:?})",
        config.root_url,
        config.max_concurrent,
        config
            .max_depth
            .map_or_else(|| "unlimited".to_string(), |d| d.to_string()),
        config.delay,
        config.timeout
    );

    let token = CancellationToken::new();
    spawn_interrupt_handler(token.clone());
    if let Some(limit) = max_duration {
        spawn_deadline(token.clone(), limit);
    }

    let (events, rx) = event_channel();
    let show_progress = !cli.no_progress && !cli.quiet;
    let observer = tokio::spawn(observe(rx, show_progress));

    let report = Coordinator::new(config.clone())
        .context("Failed to initialize crawler")?
        .with_events(events)
        .with_cancellation(token)
        .run()
        .await
        .context("Crawl failed")?;

    if let Err(e) = observer.await {
        tracing::warn!("Progress display ended abnormally: {}", e);
    }

    if !cli.quiet {
        print_statistics(&report);
    }

    let written = write_output(&config, &report.pages).context("Failed to write output")?;

    if report.stats.crawled == 0 {
        bail!("No pages were crawled successfully from {}", config.root_url);
    }

    if !cli.quiet {
        println!(
            "\n✓ {} pages written to {}",
            written.pages.len(),
            config.pages_dir().display()
        );
        if let Some(merged) = &written.merged {
            println!("✓ Merged document: {}", merged.display());
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("web_context_builder=info,warn"),
            1 => EnvFilter::new("web_context_builder=debug,info"),
            2 => EnvFilter::new("web_context_builder=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Layers the config file (if any) and command-line flags over the defaults
fn build_config(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    let mut builder = match &cli.config {
        Some(path) => {
            let (file, hash) = load_config_with_hash(path).with_context(|| {
                format!("Failed to load configuration from {}", path.display())
            })?;
            tracing::info!(
                "Configuration loaded from {} (hash: {})",
                path.display(),
                hash
            );
            CrawlConfigBuilder::new().apply_file(file)
        }
        None => CrawlConfigBuilder::new(),
    };

    if let Some(url) = &cli.url {
        builder = builder.root_url(url.as_str());
    }
    if let Some(dir) = &cli.output {
        builder = builder.output_dir(dir.as_path());
    }
    if let Some(n) = cli.max_concurrent {
        builder = builder.max_concurrent(n);
    }
    if let Some(secs) = cli.delay {
        builder = builder.delay_secs(secs);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }
    if let Some(n) = cli.retries {
        builder = builder.retries(n);
    }
    if let Some(ua) = &cli.user_agent {
        builder = builder.user_agent(ua.as_str());
    }
    if let Some(name) = &cli.merged_filename {
        builder = builder.merged_filename(name.as_str());
    }
    if cli.cross_subdomain {
        builder = builder.cross_subdomain(true);
    }
    if cli.no_merge {
        builder = builder.merge(false);
    }

    builder
        .max_depth(cli.max_depth)
        .include(cli.include.iter().cloned())
        .exclude(cli.exclude.iter().cloned())
        .build()
        .context("Invalid configuration")
}

/// Cancels the crawl on Ctrl-C
fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing in-flight pages");
            token.cancel();
        }
    });
}

/// Cancels the crawl once `limit` has elapsed
fn spawn_deadline(token: CancellationToken, limit: Duration) {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(limit) => {
                tracing::warn!("Time limit of {:?} reached, stopping crawl", limit);
                token.cancel();
            }
        }
    });
}

/// Renders crawl events until the coordinator drops its sender
async fn observe(mut rx: UnboundedReceiver<CrawlEvent>, show_progress: bool) {
    let spinner = show_progress.then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{elapsed}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Starting crawl...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let mut discovered = 0usize;
    let mut crawled = 0usize;
    let mut failed = 0usize;
    let mut depth = 0u32;

    while let Some(event) = rx.recv().await {
        match event {
            CrawlEvent::Discovered { depth: d, .. } => {
                discovered += 1;
                depth = depth.max(d);
            }
            CrawlEvent::Crawled { url, depth: d } => {
                crawled += 1;
                if spinner.is_none() {
                    tracing::info!(
                        "[{}/{}] Crawled {} (depth {})",
                        crawled + failed,
                        discovered,
                        url,
                        d
                    );
                }
            }
            // Failures are already logged by the worker that saw them
            CrawlEvent::Failed { .. } => failed += 1,
        }

        if let Some(pb) = &spinner {
            pb.set_message(format!(
                "Discovered {} | Crawled {} | Failed {} | Depth {}",
                discovered, crawled, failed, depth
            ));
        }
    }

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
}
