//! Final crawl statistics report

use crate::crawler::CrawlReport;
use crate::state::FailureKind;
use std::collections::BTreeMap;
use std::fmt;

/// End-of-crawl report, including every failed URL and its reason
pub struct StatisticsReport<'a>(pub &'a CrawlReport);

impl fmt::Display for StatisticsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let stats = &report.stats;

        writeln!(f, "=== Crawl Statistics ===\n")?;

        writeln!(f, "Overview:")?;
        writeln!(f, "  URLs discovered: {}", stats.discovered)?;
        writeln!(f, "  Pages crawled: {}", stats.crawled)?;
        writeln!(f, "  Pages failed: {}", stats.failed)?;
        writeln!(f, "  Links found: {}", stats.links_found)?;
        writeln!(f, "  Max depth reached: {}", stats.max_depth)?;
        writeln!(f, "  Elapsed: {:.1?}", report.elapsed)?;
        if report.cancelled {
            writeln!(
                f,
                "  Crawl was cancelled; {} admitted URLs were not processed",
                stats.pending()
            )?;
        }
        writeln!(f)?;

        let failures: Vec<_> = report.failures().collect();
        if !failures.is_empty() {
            let mut by_kind: BTreeMap<&'static str, usize> = BTreeMap::new();
            for page in &failures {
                let kind = page
                    .status
                    .failure()
                    .map(|r| r.kind())
                    .unwrap_or(FailureKind::Transport);
                *by_kind.entry(kind.as_str()).or_default() += 1;
            }

            writeln!(f, "Failures by Kind:")?;
            for (kind, count) in &by_kind {
                writeln!(f, "  {}: {}", kind, count)?;
            }
            writeln!(f)?;

            writeln!(f, "Failed URLs ({}):", failures.len())?;
            for page in &failures {
                if let Some(reason) = page.status.failure() {
                    writeln!(f, "  - {} ({})", page.url, reason)?;
                }
            }
            writeln!(f)?;
        }

        writeln!(
            f,
            "Success Rate: {:.1}% ({} / {} pages successfully processed)",
            stats.success_rate(),
            stats.crawled,
            stats.completed()
        )
    }
}

/// Formats the end-of-crawl report as a string
pub fn format_statistics(report: &CrawlReport) -> String {
    StatisticsReport(report).to_string()
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(report: &CrawlReport) {
    print!("{}", StatisticsReport(report));
}
