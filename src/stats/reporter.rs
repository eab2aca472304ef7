//! Statistics reporter
//!
//! Renders pool snapshots and hit-rate samples for humans or tooling.

use std::fmt::Write;

use crate::stats::sample::HitRateSample;
use crate::stats::snapshot::WindowPoolStats;

/// Output format for statistics reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format
    Json,
    /// Compact one-line format
    Compact,
}

/// Statistics reporter
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsReporter {
    format: ReportFormat,
}

impl StatsReporter {
    /// Create a new reporter with the given format
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Create a reporter with text format
    pub fn text() -> Self {
        Self::new(ReportFormat::Text)
    }

    /// Create a reporter with JSON format
    pub fn json() -> Self {
        Self::new(ReportFormat::Json)
    }

    /// Create a reporter with compact format
    pub fn compact() -> Self {
        Self::new(ReportFormat::Compact)
    }

    /// Output format
    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Render a pool snapshot
    pub fn report_stats(&self, stats: &WindowPoolStats) -> String {
        match self.format {
            ReportFormat::Text => format_stats_text(stats),
            ReportFormat::Json => to_json(stats),
            ReportFormat::Compact => format!(
                "store={} pages={} resident={} hits={} misses={} hit_rate={:.2}%",
                stats.store_name,
                stats.page_table_size,
                stats.resident_pages,
                stats.hit_count,
                stats.miss_count,
                stats.hit_rate() * 100.0
            ),
        }
    }

    /// Render a hit-rate sample
    pub fn report_sample(&self, sample: &HitRateSample) -> String {
        match self.format {
            ReportFormat::Text => sample.to_string(),
            ReportFormat::Json => to_json(sample),
            ReportFormat::Compact => format!(
                "store={} acquired={} mapped={} miss={:.2}% elapsed_ms={}",
                sample.store,
                sample.acquired,
                sample.mapped,
                sample.miss_percent(),
                sample.elapsed_ms()
            ),
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

fn format_stats_text(stats: &WindowPoolStats) -> String {
    let mut output = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(output, "=== Window Pool: {} ===", stats.store_name);
    let _ = writeln!(output, "Pages:");
    let _ = writeln!(output, "  Table Size:   {}", stats.page_table_size);
    let _ = writeln!(output, "  Resident:     {}", stats.resident_pages);
    let _ = writeln!(
        output,
        "  Page Size:    {} bytes ({} records)",
        stats.bytes_per_page, stats.records_per_page
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "Tiers:");
    let _ = writeln!(output, "  Unknown:      {}", stats.tier_counts.unknown);
    let _ = writeln!(output, "  Short Term:   {}", stats.tier_counts.short_term);
    let _ = writeln!(output, "  Long Term:    {}", stats.tier_counts.long_term);
    let _ = writeln!(output);
    let _ = writeln!(output, "Access:");
    let _ = writeln!(output, "  Hits:         {}", stats.hit_count);
    let _ = writeln!(output, "  Misses:       {}", stats.miss_count);
    let _ = writeln!(output, "  Hit Rate:     {:.2}%", stats.hit_rate() * 100.0);

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::snapshot::TierCounts;
    use std::time::Duration;

    fn stats() -> WindowPoolStats {
        WindowPoolStats {
            store_name: "nodes.db".into(),
            page_table_size: 8,
            bytes_per_page: 80,
            records_per_page: 10,
            hit_count: 9,
            miss_count: 1,
            resident_pages: 2,
            tier_counts: TierCounts {
                unknown: 1,
                short_term: 1,
                long_term: 0,
            },
        }
    }

    #[test]
    fn test_text_report() {
        let report = StatsReporter::text().report_stats(&stats());
        assert!(report.contains("Window Pool: nodes.db"));
        assert!(report.contains("Hit Rate:     90.00%"));
        assert!(report.contains("Short Term:   1"));
    }

    #[test]
    fn test_json_report() {
        let report = StatsReporter::json().report_stats(&stats());
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["store_name"], "nodes.db");
        assert_eq!(value["tier_counts"]["unknown"], 1);
        assert_eq!(value["miss_count"], 1);
    }

    #[test]
    fn test_compact_report() {
        let report = StatsReporter::compact().report_stats(&stats());
        assert!(!report.contains('\n'));
        assert!(report.contains("hit_rate=90.00%"));
    }

    #[test]
    fn test_sample_formats() {
        let sample = HitRateSample::new("nodes.db", 10, 1, Duration::from_millis(3));
        assert_eq!(
            StatsReporter::text().report_sample(&sample),
            "In nodes.db: 10 pages acquired, 1 pages mapped (10.00%) in 3 ms"
        );
        assert!(StatsReporter::compact()
            .report_sample(&sample)
            .contains("miss=10.00%"));
        let value: serde_json::Value =
            serde_json::from_str(&StatsReporter::json().report_sample(&sample)).unwrap();
        assert_eq!(value["mapped"], 1);
    }
}
