//! Reduction Strategies
//!
//! Three strategies, selected by which optional fields the raw result carries:
//!
//! - **Explicit warm-up**: the binary instrumented one discarded warm-up batch
//!   and reports `batchSize`/`warmupTime`/`totalTime` alongside step timings.
//! - **Percentile**: only timing samples and an example count are available;
//!   the leading `floor(n/2)` samples are treated as warm-up.
//! - **Pass-through**: the binary already reduced its samples (the
//!   `benchmarks`-array output shape); fields are forwarded unchanged.
//!
//! The two warm-up conventions are intentionally different per strategy —
//! unifying them would silently change reported throughput for one of the
//! invocation modes.

use crate::percentiles::compute_percentile;
use benchrelay_core::{Metric, RawResult};
use thiserror::Error;

const MS_PER_SEC: f64 = 1000.0;

/// Reduction failure on degenerate timing data. Fatal to the invocation's
/// reduction; the raw result is discarded and no partial metrics escape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DegenerateTimingError {
    /// Total measured time sums to zero (or is negative)
    #[error("total time is zero; cannot derive throughput")]
    TotalTimeZero,

    /// Post-warm-up time sums to zero, leaving no steady-state window
    #[error("warm time is zero; cannot derive steady-state throughput")]
    WarmTimeZero,

    /// No timing samples were reported
    #[error("no timing samples reported")]
    EmptySamples,

    /// Neither an example count nor a batch size is available
    #[error("no example count or batch size; cannot derive throughput")]
    MissingThroughputDenominator,
}

/// Named reduction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReductionStrategy {
    /// One instrumented warm-up batch with explicit warm-up/total times
    ExplicitWarmup,
    /// Timing samples only; leading half treated as warm-up
    Percentile,
    /// Binary-side aggregation forwarded unchanged
    PassThrough,
}

impl ReductionStrategy {
    /// Pick the strategy for a raw result from the fields it carries.
    pub fn select(raw: &RawResult) -> Self {
        if raw.aggregate.is_some() {
            ReductionStrategy::PassThrough
        } else if raw.batch_size.is_some()
            && raw.warmup_time_ms.is_some()
            && raw.total_time_ms.is_some()
        {
            ReductionStrategy::ExplicitWarmup
        } else {
            ReductionStrategy::Percentile
        }
    }
}

/// Output of one reduction: wall time plus ordered metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    /// Wall time in seconds
    pub wall_time: f64,
    /// Metrics in deterministic insertion order
    pub metrics: Vec<Metric>,
}

/// Number of leading samples excluded as warm-up under the percentile
/// strategy: `floor(n / 2)`. A single sample has no warm-up.
pub fn warmup_split(sample_count: usize) -> usize {
    sample_count / 2
}

fn reduce_percentile(raw: &RawResult) -> Result<Reduction, DegenerateTimingError> {
    if raw.timings_ms.is_empty() {
        return Err(DegenerateTimingError::EmptySamples);
    }
    let count = raw
        .example_count
        .or(raw.batch_size)
        .ok_or(DegenerateTimingError::MissingThroughputDenominator)? as f64;

    let secs: Vec<f64> = raw.timings_ms.iter().map(|ms| ms / MS_PER_SEC).collect();
    let n = secs.len();
    let warmup = warmup_split(n);

    let total: f64 = secs.iter().sum();
    let warm: f64 = secs[warmup..].iter().sum();
    if total <= 0.0 {
        return Err(DegenerateTimingError::TotalTimeZero);
    }
    if warm <= 0.0 {
        return Err(DegenerateTimingError::WarmTimeZero);
    }

    Ok(Reduction {
        wall_time: compute_percentile(&secs, 50.0),
        metrics: vec![
            Metric::new("avg_exp_per_second", count * n as f64 / total),
            Metric::new("exp_per_second", count * (n - warmup) as f64 / warm),
        ],
    })
}

fn reduce_explicit_warmup(raw: &RawResult) -> Result<Reduction, DegenerateTimingError> {
    if raw.timings_ms.is_empty() {
        return Err(DegenerateTimingError::EmptySamples);
    }
    let batch_size = raw
        .batch_size
        .ok_or(DegenerateTimingError::MissingThroughputDenominator)? as f64;
    let warmup_ms = raw.warmup_time_ms.unwrap_or(0.0);
    let total_ms = raw.total_time_ms.unwrap_or(0.0);
    let batch_count = raw.iterations as f64;

    let total_s = total_ms / MS_PER_SEC;
    if total_s <= 0.0 {
        return Err(DegenerateTimingError::TotalTimeZero);
    }
    let warm_s = (total_ms - warmup_ms) / MS_PER_SEC;
    if warm_s <= 0.0 {
        return Err(DegenerateTimingError::WarmTimeZero);
    }

    let secs: Vec<f64> = raw.timings_ms.iter().map(|ms| ms / MS_PER_SEC).collect();
    let step_min = secs
        .iter()
        .cloned()
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or(0.0);
    let step_max = secs
        .iter()
        .cloned()
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or(0.0);

    Ok(Reduction {
        wall_time: total_s,
        metrics: vec![
            // One warm-up batch is discarded by the binary, hence batch_count + 1
            Metric::new(
                "avg_exp_per_second",
                batch_size * (batch_count + 1.0) / total_s,
            ),
            Metric::new("exp_per_second", batch_size * batch_count / warm_s),
            Metric::new("startup_time", warmup_ms / MS_PER_SEC),
            Metric::new("step_time_median", compute_percentile(&secs, 50.0)),
            Metric::new("step_time_min", step_min),
            Metric::new("step_time_max", step_max),
        ],
    })
}

fn reduce_pass_through(raw: &RawResult) -> Reduction {
    let aggregate = raw.aggregate.as_ref().expect("selected by aggregate field");
    Reduction {
        wall_time: aggregate.wall_time,
        metrics: aggregate.metrics.clone(),
    }
}

/// Reduce one raw result into wall time and ordered metrics.
///
/// Either fully succeeds or fails atomically; degenerate denominators produce
/// a typed error rather than Inf/NaN metric values.
pub fn reduce(raw: &RawResult) -> Result<Reduction, DegenerateTimingError> {
    match ReductionStrategy::select(raw) {
        ReductionStrategy::PassThrough => Ok(reduce_pass_through(raw)),
        ReductionStrategy::ExplicitWarmup => reduce_explicit_warmup(raw),
        ReductionStrategy::Percentile => reduce_percentile(raw),
    }
}
