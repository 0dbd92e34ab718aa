#![warn(missing_docs)]
//! BenchRelay Core - Data Model
//!
//! This crate defines the types shared across the harness:
//! - `BenchmarkIdentity` addressing one runnable benchmark in the external catalog
//! - `InvocationSpec` describing exactly one external-binary invocation
//! - `RawResult` holding the decoded measurement output before reduction
//! - `MetricRecord`, the stable contract handed to the reporting sink
//! - `BenchmarkEntry`, the capability contract every registered entry satisfies

mod entry;
mod record;

pub use entry::{BenchmarkEntry, EntryOptions, PlainEntry};
pub use record::{AggregateResult, Metric, MetricRecord, RawResult, ReportSink, VecSink};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Addresses one runnable benchmark exposed by the external binary.
///
/// Catalog names may encode a two-level hierarchy as `suite.benchmark`;
/// standalone benchmarks carry no suite. Immutable once discovered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BenchmarkIdentity {
    /// Suite this benchmark belongs to, when the catalog name is dotted
    pub suite: Option<String>,
    /// Benchmark name within the suite (or the full name when standalone)
    pub name: String,
}

impl BenchmarkIdentity {
    /// Identity for a standalone benchmark
    pub fn standalone(name: impl Into<String>) -> Self {
        Self {
            suite: None,
            name: name.into(),
        }
    }

    /// Identity for a benchmark inside a suite
    pub fn suite_member(suite: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            suite: Some(suite.into()),
            name: name.into(),
        }
    }

    /// Parse a catalog name, splitting `suite.benchmark` on the first dot.
    ///
    /// Names without a dot are standalone.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('.') {
            Some((suite, name)) if !suite.is_empty() && !name.is_empty() => {
                Self::suite_member(suite, name)
            }
            _ => Self::standalone(raw),
        }
    }

    /// The full catalog name (`suite.benchmark` or plain `benchmark`)
    pub fn full_name(&self) -> String {
        match &self.suite {
            Some(suite) => format!("{}.{}", suite, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for BenchmarkIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.suite {
            Some(suite) => write!(f, "{}.{}", suite, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Mode of execution requested from the external binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Training pass (forward + backward)
    Training,
    /// Inference pass (forward only)
    Inference,
}

impl Variant {
    /// Flag passed on the external command line
    pub fn flag(self) -> &'static str {
        match self {
            Variant::Training => "--training",
            Variant::Inference => "--inference",
        }
    }

    /// Short label used in entry names
    pub fn label(self) -> &'static str {
        match self {
            Variant::Training => "training",
            Variant::Inference => "inference",
        }
    }
}

/// Execution engine requested from the external binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Eager (interpreted) execution
    Eager,
    /// X10 (compiled/accelerated) execution
    X10,
}

impl Backend {
    /// Flag passed on the external command line
    pub fn flag(self) -> &'static str {
        match self {
            Backend::Eager => "--eager",
            Backend::X10 => "--x10",
        }
    }

    /// Short label used in entry names
    pub fn label(self) -> &'static str {
        match self {
            Backend::Eager => "eager",
            Backend::X10 => "x10",
        }
    }
}

/// Fully determines one external-binary invocation.
///
/// Constructed per call; the command line is derived deterministically from it
/// (extra flags are emitted in key order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    /// Benchmark to run
    pub identity: BenchmarkIdentity,
    /// Variant flag, when the benchmark distinguishes training/inference
    pub variant: Option<Variant>,
    /// Backend flag, when the benchmark supports multiple engines
    pub backend: Option<Backend>,
    /// Additional `--key value` flags forwarded verbatim
    pub extra_flags: BTreeMap<String, String>,
}

impl InvocationSpec {
    /// Spec running `identity` with the binary's default variant and backend
    pub fn new(identity: BenchmarkIdentity) -> Self {
        Self {
            identity,
            variant: None,
            backend: None,
            extra_flags: BTreeMap::new(),
        }
    }

    /// Set the variant
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Set the backend
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Add an extra `--key value` flag
    pub fn with_flag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_flags.insert(key.into(), value.into());
        self
    }
}
