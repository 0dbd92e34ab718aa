//! Command-Line Construction
//!
//! Builds the exact argument vector for each kind of external invocation.
//! Construction is deterministic: fixed flag order, extra flags in key order,
//! so identical specs always produce identical command lines.

use benchrelay_core::InvocationSpec;
use std::path::PathBuf;

/// The external benchmark binary and how to launch it.
///
/// `program` plus `args` form the launch prefix (e.g. `swift` with
/// `["run", "-c", "release", "Benchmarks"]` to build-and-run a release target);
/// every invocation appends its own selector and flags to that prefix.
#[derive(Debug, Clone)]
pub struct ExternalBinary {
    /// Executable to launch
    pub program: String,
    /// Leading arguments selecting the benchmark target
    pub args: Vec<String>,
    /// Working directory for every invocation (the external project checkout)
    pub working_dir: PathBuf,
}

/// Measurement knobs forwarded to the external binary.
#[derive(Debug, Clone)]
pub struct MeasureSettings {
    /// Minimum run time floor in seconds (`--min-time`)
    pub min_time_secs: Option<u64>,
    /// Warm-up batches to request (`--warmupBatches`)
    pub warmup_batches: Option<u64>,
}

impl Default for MeasureSettings {
    fn default() -> Self {
        Self {
            // Run each benchmark for up to five minutes
            min_time_secs: Some(300),
            warmup_batches: None,
        }
    }
}

impl ExternalBinary {
    /// Binary launched via `program args...` in `working_dir`
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: working_dir.into(),
        }
    }

    fn command_line(&self, tail: &[String]) -> Vec<String> {
        let mut command = Vec::with_capacity(1 + self.args.len() + tail.len());
        command.push(self.program.clone());
        command.extend(self.args.iter().cloned());
        command.extend(tail.iter().cloned());
        command
    }

    /// Zero-cost enumeration command: asks the binary for its catalog without
    /// running any iterations or warm-up.
    pub fn discovery_command(&self) -> Vec<String> {
        self.command_line(&["list-defaults".to_string(), "--json".to_string()])
    }

    /// Measurement command for one invocation spec.
    ///
    /// Suite-qualified benchmarks go through the filter protocol (the binary
    /// reports a `benchmarks` array); standalone benchmarks go through
    /// `measure --benchmark` with variant/backend flags.
    pub fn measure_command(&self, spec: &InvocationSpec, settings: &MeasureSettings) -> Vec<String> {
        let mut tail = Vec::new();

        if spec.identity.suite.is_some() {
            tail.push("--filter".to_string());
            tail.push(spec.identity.full_name());
            tail.push("--format".to_string());
            tail.push("json".to_string());
            if let Some(min_time) = settings.min_time_secs {
                tail.push("--min-time".to_string());
                tail.push(min_time.to_string());
            }
            return self.command_line(&tail);
        }

        tail.push("measure".to_string());
        tail.push("--benchmark".to_string());
        tail.push(spec.identity.name.clone());
        if let Some(variant) = spec.variant {
            tail.push(variant.flag().to_string());
        }
        if let Some(backend) = spec.backend {
            tail.push(backend.flag().to_string());
        }
        if let Some(batches) = settings.warmup_batches {
            tail.push("--warmupBatches".to_string());
            tail.push(batches.to_string());
        }
        if let Some(min_time) = settings.min_time_secs {
            tail.push("--min-time".to_string());
            tail.push(min_time.to_string());
        }
        for (key, value) in &spec.extra_flags {
            tail.push(format!("--{}", key));
            tail.push(value.clone());
        }
        tail.push("--json".to_string());

        self.command_line(&tail)
    }
}
