//! Output Decoding
//!
//! Decodes the external binary's JSON output into catalog identities and
//! `RawResult` records. Two measurement shapes are accepted:
//!
//! - a single document whose top-level fields are one run's measurements
//!   (`configuration.settings`, `timings`, optional batch/warm-up fields)
//! - a document with a `benchmarks` array, where the entry matching the
//!   requested name carries `name`, `wall_time`, `iterations`, and arbitrary
//!   named metric fields
//!
//! Unknown fields never cause decode failure; they are preserved opaquely so
//! additional instrumentation from newer binaries surfaces via `extras`.

use benchrelay_core::{AggregateResult, BenchmarkIdentity, Metric, RawResult};
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure decoding captured output. Fatal to that single invocation.
#[derive(Debug, Error)]
pub enum ResultDecodeError {
    /// Output was not valid JSON (or valid line-delimited JSON)
    #[error("output is not valid JSON: {detail}")]
    Malformed {
        /// Underlying parse error text
        detail: String,
    },

    /// A required field was absent
    #[error("missing required field `{field}`")]
    MissingField {
        /// Dotted path of the missing field
        field: &'static str,
    },

    /// A field was present but carried the wrong type of value
    #[error("field `{field}` has an invalid value")]
    InvalidField {
        /// Dotted path of the invalid field
        field: &'static str,
    },

    /// A `benchmarks` array held no entry for the requested benchmark
    #[error("no result entry for benchmark `{name}`")]
    MissingBenchmark {
        /// Requested full catalog name
        name: String,
    },
}

fn decode_u64(value: &Value, field: &'static str) -> Result<u64, ResultDecodeError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    // The binary's JSON renders numeric columns as doubles; accept
    // integral floats for count-valued fields
    if let Some(f) = value.as_f64() {
        if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
            return Ok(f as u64);
        }
    }
    Err(ResultDecodeError::InvalidField { field })
}

fn decode_f64(value: &Value, field: &'static str) -> Result<f64, ResultDecodeError> {
    value
        .as_f64()
        .ok_or(ResultDecodeError::InvalidField { field })
}

fn identity_from_record(record: &Value) -> Result<BenchmarkIdentity, ResultDecodeError> {
    let name = record
        .get("name")
        .ok_or(ResultDecodeError::MissingField { field: "name" })?
        .as_str()
        .ok_or(ResultDecodeError::InvalidField { field: "name" })?;
    Ok(BenchmarkIdentity::parse(name))
}

/// Decode the catalog emitted by the enumeration command.
///
/// Accepts either newline-delimited JSON records with a `name` field, or one
/// document with a `benchmarks` array of such records.
pub fn parse_catalog(bytes: &[u8]) -> Result<Vec<BenchmarkIdentity>, ResultDecodeError> {
    if let Ok(doc) = serde_json::from_slice::<Value>(bytes) {
        match doc {
            Value::Object(obj) => {
                if let Some(benchmarks) = obj.get("benchmarks") {
                    let entries = benchmarks
                        .as_array()
                        .ok_or(ResultDecodeError::InvalidField { field: "benchmarks" })?;
                    return entries.iter().map(identity_from_record).collect();
                }
                // A lone record document is a one-entry catalog
                return Ok(vec![identity_from_record(&Value::Object(obj))?]);
            }
            Value::Array(entries) => {
                return entries.iter().map(identity_from_record).collect();
            }
            _ => {
                return Err(ResultDecodeError::Malformed {
                    detail: "top-level value is not an object or array".to_string(),
                });
            }
        }
    }

    // Newline-delimited records: one JSON object per non-empty line
    let text = String::from_utf8_lossy(bytes);
    let mut identities = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: Value =
            serde_json::from_str(line).map_err(|e| ResultDecodeError::Malformed {
                detail: e.to_string(),
            })?;
        identities.push(identity_from_record(&record)?);
    }
    Ok(identities)
}

fn decode_aggregate_entry(
    entry: &Map<String, Value>,
) -> Result<RawResult, ResultDecodeError> {
    let iterations = decode_u64(
        entry
            .get("iterations")
            .ok_or(ResultDecodeError::MissingField { field: "iterations" })?,
        "iterations",
    )?;
    let wall_time = decode_f64(
        entry
            .get("wall_time")
            .ok_or(ResultDecodeError::MissingField { field: "wall_time" })?,
        "wall_time",
    )?;

    let mut metrics = Vec::new();
    let mut extras = Map::new();
    for (key, value) in entry {
        match key.as_str() {
            "name" | "iterations" | "wall_time" => {}
            _ => match value.as_f64() {
                Some(number) => metrics.push(Metric::new(key.clone(), number)),
                None => {
                    extras.insert(key.clone(), value.clone());
                }
            },
        }
    }

    Ok(RawResult {
        iterations,
        aggregate: Some(AggregateResult { wall_time, metrics }),
        extras,
        ..Default::default()
    })
}

const KNOWN_MEASUREMENT_FIELDS: &[&str] = &[
    "configuration",
    "timings",
    "exampleCount",
    "batchSize",
    "warmupTime",
    "totalTime",
];

fn decode_measurement_document(obj: &Map<String, Value>) -> Result<RawResult, ResultDecodeError> {
    let settings = obj
        .get("configuration")
        .and_then(|c| c.get("settings"))
        .and_then(Value::as_object);

    let iterations = match settings.and_then(|s| s.get("iterations")) {
        Some(value) => decode_u64(value, "configuration.settings.iterations")?,
        None => {
            return Err(ResultDecodeError::MissingField {
                field: "configuration.settings.iterations",
            });
        }
    };

    let timings = obj
        .get("timings")
        .ok_or(ResultDecodeError::MissingField { field: "timings" })?
        .as_array()
        .ok_or(ResultDecodeError::InvalidField { field: "timings" })?;
    let timings_ms = timings
        .iter()
        .map(|t| decode_f64(t, "timings"))
        .collect::<Result<Vec<f64>, _>>()?;

    let example_count = match obj.get("exampleCount") {
        Some(value) => Some(decode_u64(value, "exampleCount")?),
        None => None,
    };
    let batch_size = match obj.get("batchSize") {
        Some(value) => Some(decode_u64(value, "batchSize")?),
        None => match settings.and_then(|s| s.get("batchSize")) {
            Some(value) => Some(decode_u64(value, "configuration.settings.batchSize")?),
            None => None,
        },
    };
    let warmup_time_ms = match obj.get("warmupTime") {
        Some(value) => Some(decode_f64(value, "warmupTime")?),
        None => None,
    };
    let total_time_ms = match obj.get("totalTime") {
        Some(value) => Some(decode_f64(value, "totalTime")?),
        None => None,
    };

    let mut extras = Map::new();
    for (key, value) in obj {
        if !KNOWN_MEASUREMENT_FIELDS.contains(&key.as_str()) {
            extras.insert(key.clone(), value.clone());
        }
    }

    Ok(RawResult {
        iterations,
        timings_ms,
        example_count,
        batch_size,
        warmup_time_ms,
        total_time_ms,
        settings: settings.cloned(),
        aggregate: None,
        extras,
    })
}

/// Decode one invocation's measurement output.
///
/// When the output is a `benchmarks` array, the entry matching `requested`'s
/// full catalog name is selected; its absence is a decode failure.
pub fn parse_measurement(
    bytes: &[u8],
    requested: &BenchmarkIdentity,
) -> Result<RawResult, ResultDecodeError> {
    let doc: Value = serde_json::from_slice(bytes).map_err(|e| ResultDecodeError::Malformed {
        detail: e.to_string(),
    })?;
    let obj = doc.as_object().ok_or(ResultDecodeError::Malformed {
        detail: "top-level value is not an object".to_string(),
    })?;

    if let Some(benchmarks) = obj.get("benchmarks") {
        let entries = benchmarks
            .as_array()
            .ok_or(ResultDecodeError::InvalidField { field: "benchmarks" })?;
        let wanted = requested.full_name();
        for entry in entries {
            if entry.get("name").and_then(Value::as_str) == Some(wanted.as_str()) {
                let entry = entry
                    .as_object()
                    .ok_or(ResultDecodeError::InvalidField { field: "benchmarks" })?;
                return decode_aggregate_entry(entry);
            }
        }
        return Err(ResultDecodeError::MissingBenchmark { name: wanted });
    }

    decode_measurement_document(obj)
}
