#![warn(missing_docs)]
//! BenchRelay Metric Reduction
//!
//! Transforms raw per-iteration timing into the fixed metric vocabulary:
//! wall time, throughput (`avg_exp_per_second` / `exp_per_second`), and, for
//! explicitly warm-up-instrumented runs, startup time and step-time
//! percentiles. Three named strategies are selected by which raw fields are
//! present; the outgoing record shape is identical across all of them.

mod percentiles;
mod reduce;

pub use percentiles::compute_percentile;
pub use reduce::{DegenerateTimingError, Reduction, ReductionStrategy, reduce, warmup_split};
