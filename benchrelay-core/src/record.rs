//! Measurement and Metric Records
//!
//! `RawResult` is the decoded output of one external invocation and lives only
//! until reduction. `MetricRecord` is the stable contract handed to the
//! reporting sink; its serialized field names (`iters`, `wall_time`, `extras`,
//! `metrics`) must not change regardless of which reduction strategy produced it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One named metric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Metric name (e.g. `exp_per_second`)
    pub name: String,
    /// Metric value
    pub value: f64,
}

impl Metric {
    /// Convenience constructor
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// The record handed to the reporting sink for one invocation.
///
/// Metric ordering is deterministic (reduction insertion order) so downstream
/// consumers can compare positionally or by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Iteration count reported by the external binary
    pub iters: u64,
    /// Wall time in seconds
    pub wall_time: f64,
    /// Free-form metadata (e.g. the binary's `configuration.settings`)
    pub extras: Option<Value>,
    /// Named metrics, in reduction order
    pub metrics: Vec<Metric>,
}

/// Pre-aggregated measurement fields from the `benchmarks`-array output shape.
///
/// In this shape the external binary has already reduced its samples: the entry
/// carries `wall_time`, `iterations`, and arbitrary named metric fields which
/// pass through reduction unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    /// Wall time as reported by the binary
    pub wall_time: f64,
    /// Named metric fields, in decoded order
    pub metrics: Vec<Metric>,
}

/// Decoded measurement output of one invocation.
///
/// Which optional fields are present determines the reduction strategy.
/// Created fresh per invocation and discarded after reduction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResult {
    /// Iteration count (`configuration.settings.iterations`, or the
    /// `iterations` field of a `benchmarks`-array entry)
    pub iterations: u64,
    /// Per-iteration timing samples in milliseconds
    pub timings_ms: Vec<f64>,
    /// Examples processed per iteration (percentile strategy denominator)
    pub example_count: Option<u64>,
    /// Batch size (explicit warm-up strategy)
    pub batch_size: Option<u64>,
    /// Warm-up time in milliseconds (explicit warm-up strategy)
    pub warmup_time_ms: Option<f64>,
    /// Total run time in milliseconds (explicit warm-up strategy)
    pub total_time_ms: Option<f64>,
    /// The binary's `configuration.settings` object, when emitted
    pub settings: Option<Map<String, Value>>,
    /// Pre-aggregated fields, when the output shape carried them
    pub aggregate: Option<AggregateResult>,
    /// Unknown top-level fields, preserved opaquely
    pub extras: Map<String, Value>,
}

impl RawResult {
    /// The extras payload surfaced on the outgoing `MetricRecord`:
    /// `configuration.settings` when present, otherwise the preserved unknown
    /// fields, otherwise `None`.
    pub fn extras_value(&self) -> Option<Value> {
        if let Some(settings) = &self.settings {
            return Some(Value::Object(settings.clone()));
        }
        if !self.extras.is_empty() {
            return Some(Value::Object(self.extras.clone()));
        }
        None
    }
}

/// Consumer of metric records — the external runner's side of the contract.
pub trait ReportSink {
    /// Record one metric record for the entry identified by `entry_id`.
    fn report(&mut self, entry_id: &str, record: &MetricRecord);
}

/// Sink that collects records in memory (tests and embedding).
#[derive(Debug, Default)]
pub struct VecSink {
    /// Collected `(entry_id, record)` pairs in report order
    pub records: Vec<(String, MetricRecord)>,
}

impl ReportSink for VecSink {
    fn report(&mut self, entry_id: &str, record: &MetricRecord) {
        self.records.push((entry_id.to_string(), record.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_with_exact_keys() {
        let record = MetricRecord {
            iters: 4,
            wall_time: 0.1,
            extras: None,
            metrics: vec![Metric::new("exp_per_second", 100.0)],
        };

        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["iters", "wall_time", "extras", "metrics"]);
        assert_eq!(json["metrics"][0]["name"], "exp_per_second");
    }

    #[test]
    fn test_extras_prefers_settings() {
        let mut settings = Map::new();
        settings.insert("iterations".to_string(), Value::from(4));
        let mut extras = Map::new();
        extras.insert("gpuUtilization".to_string(), Value::from(0.9));

        let raw = RawResult {
            settings: Some(settings),
            extras,
            ..Default::default()
        };

        let value = raw.extras_value().unwrap();
        assert!(value.get("iterations").is_some());
        assert!(value.get("gpuUtilization").is_none());
    }

    #[test]
    fn test_extras_falls_back_to_unknown_fields() {
        let mut extras = Map::new();
        extras.insert("gpuUtilization".to_string(), Value::from(0.9));
        let raw = RawResult {
            extras,
            ..Default::default()
        };
        assert!(raw.extras_value().unwrap().get("gpuUtilization").is_some());

        let empty = RawResult::default();
        assert_eq!(empty.extras_value(), None);
    }

    #[test]
    fn test_vec_sink_collects_in_order() {
        let mut sink = VecSink::default();
        let record = MetricRecord {
            iters: 1,
            wall_time: 1.0,
            extras: None,
            metrics: Vec::new(),
        };
        sink.report("a", &record);
        sink.report("b", &record);
        assert_eq!(sink.records[0].0, "a");
        assert_eq!(sink.records[1].0, "b");
    }
}
