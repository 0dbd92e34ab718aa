#![warn(missing_docs)]
//! # BenchRelay
//!
//! Harness that drives an external compiled benchmark binary, captures its
//! structured output, reduces raw timings into a stable metric vocabulary,
//! and dynamically registers one callable entry per discovered benchmark.
//!
//! - **Discovery**: the binary's catalog is enumerated once, at an explicit
//!   `initialize_registry` call, with zero iterations and zero warm-up
//! - **Registration**: dotted `suite.benchmark` names group into composite
//!   suite entries; standalone names get one callable per configured
//!   (variant, backend) combination
//! - **Invocation**: each callable blocks on one external process, decodes
//!   its JSON output, and reduces it to `{iters, wall_time, extras, metrics}`
//! - **Reduction**: percentile, explicit-warm-up, and pass-through strategies
//!   selected by the fields the binary reported
//!
//! ## Quick Start
//!
//! ```ignore
//! use benchrelay::prelude::*;
//!
//! let config = HarnessConfig::discover().unwrap_or_default();
//! let registry = initialize_registry(&config)?;
//! let mut sink = VecSink::default();
//! let report = execute(&registry, None, &mut sink);
//! ```
//!
//! Or let the CLI drive everything:
//!
//! ```ignore
//! fn main() {
//!     if let Err(e) = benchrelay::run() {
//!         eprintln!("{e}");
//!         std::process::exit(1);
//!     }
//! }
//! ```

// Re-export core types
pub use benchrelay_core::{
    AggregateResult, Backend, BenchmarkEntry, BenchmarkIdentity, EntryOptions, InvocationSpec,
    Metric, MetricRecord, RawResult, ReportSink, Variant, VecSink,
};

// Re-export the protocol layer
pub use benchrelay_proto::{
    ExternalBinary, ExternalProcessError, MeasureSettings, ResultDecodeError, parse_catalog,
    parse_measurement,
};

// Re-export reduction
pub use benchrelay_stats::{
    DegenerateTimingError, Reduction, ReductionStrategy, compute_percentile, reduce,
};

// Re-export the harness surface
pub use benchrelay_cli::{
    BoundCall, DiscoveryError, Harness, HarnessConfig, HarnessReport, InvocationError,
    RegisteredEntry, Registry, RegistrationContext, execute, format_human_output,
    generate_json_report, initialize_registry,
};

/// Run the BenchRelay CLI harness.
///
/// Call this from your harness binary's `main()`.
pub use benchrelay_cli::run;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BenchmarkEntry, BenchmarkIdentity, HarnessConfig, InvocationSpec, MetricRecord,
        ReportSink, VecSink, execute, initialize_registry,
    };
}
