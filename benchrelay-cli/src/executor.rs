//! Call Execution & Reporting
//!
//! Drives registered calls strictly sequentially — each invocation blocks the
//! calling thread for the full duration of the external process — and
//! assembles the results into a report for human or JSON output.

use crate::registry::{BoundCall, Registry};
use benchrelay_core::{MetricRecord, ReportSink};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Outcome of one call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    /// Pipeline produced a metric record
    Passed,
    /// Pipeline failed (process, decode, or reduction error)
    Failed,
}

/// Result of one call in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallResult {
    /// Call identifier
    pub id: String,
    /// Outcome
    pub status: CallStatus,
    /// The produced record, when the call passed
    pub record: Option<MetricRecord>,
    /// Error text, when the call failed
    pub error: Option<String>,
}

/// Complete harness report for one `run` invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessReport {
    /// Report generation time
    pub timestamp: DateTime<Utc>,
    /// Harness version
    pub version: String,
    /// Total wall-clock duration of the run in milliseconds
    pub total_duration_ms: f64,
    /// Per-call results in execution order
    pub results: Vec<CallResult>,
}

impl HarnessReport {
    /// Number of failed calls
    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == CallStatus::Failed)
            .count()
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Execute every registered call whose id matches `filter` (all when `None`),
/// forwarding each produced record to `sink`.
///
/// Calls run one after another; a failure is recorded and execution continues
/// with the next call.
pub fn execute(
    registry: &Registry,
    filter: Option<&Regex>,
    sink: &mut dyn ReportSink,
) -> HarnessReport {
    let start = Instant::now();
    let selected: Vec<&BoundCall> = registry
        .calls()
        .filter(|call| filter.map_or(true, |re| re.is_match(call.id())))
        .collect();

    let pb = progress_bar(selected.len() as u64);
    let mut results = Vec::with_capacity(selected.len());
    for call in selected {
        pb.set_message(call.id().to_string());
        let result = match call.invoke(sink) {
            Ok(record) => CallResult {
                id: call.id().to_string(),
                status: CallStatus::Passed,
                record: Some(record),
                error: None,
            },
            Err(e) => {
                tracing::warn!(call = %call.id(), error = %e, "benchmark call failed");
                CallResult {
                    id: call.id().to_string(),
                    status: CallStatus::Failed,
                    record: None,
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(result);
        pb.inc(1);
    }
    pb.finish_and_clear();

    HarnessReport {
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        total_duration_ms: start.elapsed().as_secs_f64() * 1000.0,
        results,
    }
}

/// Serialize the report as prettified JSON.
pub fn generate_json_report(report: &HarnessReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Format the report for human-readable terminal display.
pub fn format_human_output(report: &HarnessReport) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("BenchRelay Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    for result in &report.results {
        let status_icon = match result.status {
            CallStatus::Passed => "✓",
            CallStatus::Failed => "✗",
        };
        output.push_str(&format!("  {} {}\n", status_icon, result.id));

        if let Some(record) = &result.record {
            output.push_str(&format!(
                "      iters: {}  wall_time: {:.4} s\n",
                record.iters, record.wall_time
            ));
            for metric in &record.metrics {
                output.push_str(&format!("      {}: {:.4}\n", metric.name, metric.value));
            }
        }
        if let Some(error) = &result.error {
            output.push_str(&format!("      error: {}\n", error));
        }
    }

    output.push('\n');
    let failed = report.failed_count();
    output.push_str(&format!(
        "{} call(s), {} failed, {:.1} ms total\n",
        report.results.len(),
        failed,
        report.total_duration_ms
    ));
    output
}
