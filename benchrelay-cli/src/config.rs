//! Configuration loading from relay.toml
//!
//! Harness configuration can be specified in a `relay.toml` file, discovered
//! by walking up from the current directory. Every section is optional and
//! serde-defaulted, so an empty file (or no file) yields a working default
//! configuration pointing at a `swift run -c release Benchmarks` checkout.

use benchrelay_core::{Backend, EntryOptions, Variant};
use benchrelay_proto::{ExternalBinary, MeasureSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Harness configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HarnessConfig {
    /// External binary launch configuration
    #[serde(default)]
    pub binary: BinaryConfig,
    /// Measurement and registration configuration
    #[serde(default)]
    pub run: RunConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// How to launch the external benchmark binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryConfig {
    /// Executable name
    #[serde(default = "default_program")]
    pub program: String,
    /// Leading arguments selecting the benchmark target
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Working directory for every invocation (the external project checkout)
    #[serde(default = "default_working_dir")]
    pub working_dir: String,
}

impl Default for BinaryConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            working_dir: default_working_dir(),
        }
    }
}

fn default_program() -> String {
    "swift".to_string()
}
fn default_args() -> Vec<String> {
    vec![
        "run".to_string(),
        "-c".to_string(),
        "release".to_string(),
        "Benchmarks".to_string(),
    ]
}
fn default_working_dir() -> String {
    ".".to_string()
}

/// Measurement knobs and the registration matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Minimum run time floor per invocation, in seconds
    #[serde(default = "default_min_time_secs")]
    pub min_time_secs: Option<u64>,
    /// Warm-up batches requested from the binary
    #[serde(default)]
    pub warmup_batches: Option<u64>,
    /// Variants registered per standalone benchmark
    #[serde(default = "default_variants")]
    pub variants: Vec<Variant>,
    /// Backends registered per standalone benchmark (empty = binary default)
    #[serde(default)]
    pub backends: Vec<Backend>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            min_time_secs: default_min_time_secs(),
            warmup_batches: None,
            variants: default_variants(),
            backends: Vec::new(),
        }
    }
}

fn default_min_time_secs() -> Option<u64> {
    Some(300)
}
fn default_variants() -> Vec<Variant> {
    vec![Variant::Training, Variant::Inference]
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default report format: "human" or "json"
    #[serde(default = "default_format")]
    pub format: String,
    /// Directory for per-entry output (None = process temp dir)
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            directory: None,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

impl HarnessConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("relay.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// The configured external binary
    pub fn external_binary(&self) -> ExternalBinary {
        ExternalBinary::new(
            self.binary.program.clone(),
            self.binary.args.clone(),
            PathBuf::from(&self.binary.working_dir),
        )
    }

    /// The configured measurement settings
    pub fn measure_settings(&self) -> MeasureSettings {
        MeasureSettings {
            min_time_secs: self.run.min_time_secs,
            warmup_batches: self.run.warmup_batches,
        }
    }

    /// Entry options derived from the output section
    pub fn entry_options(&self) -> EntryOptions {
        match &self.output.directory {
            Some(dir) => EntryOptions::with_output_dir(dir),
            None => EntryOptions::default(),
        }
    }
}
