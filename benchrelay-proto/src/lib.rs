#![warn(missing_docs)]
//! BenchRelay Protocol Layer
//!
//! Everything that talks to the external benchmark binary:
//! - `ExternalBinary` / `MeasureSettings`: deterministic command-line construction
//! - `run`: synchronous process invocation with captured output
//! - `parse_catalog` / `parse_measurement`: decoding of the binary's JSON output
//!
//! The harness never retries and never times out an invocation — the external
//! binary bounds its own run time via the `--min-time` floor, and retry policy
//! belongs to the runner driving the registered entries.

mod command;
mod invoke;
mod parse;

pub use command::{ExternalBinary, MeasureSettings};
pub use invoke::{ExternalProcessError, run};
pub use parse::{ResultDecodeError, parse_catalog, parse_measurement};
