#![warn(missing_docs)]
//! BenchRelay CLI Library
//!
//! CLI infrastructure for the harness: configuration loading, registry
//! initialization, and the `discover`/`list`/`run` subcommands. Use
//! `benchrelay::run()` in a binary's main function for the full experience,
//! or call [`initialize_registry`] directly from a runner's setup path and
//! drive the registered entries yourself.

mod config;
mod executor;
mod registry;

pub use config::{BinaryConfig, HarnessConfig, OutputConfig, RunConfig};
pub use executor::{
    CallResult, CallStatus, HarnessReport, execute, format_human_output, generate_json_report,
};
pub use registry::{
    BoundCall, DiscoveryError, Harness, InvocationError, RegisteredEntry, Registry,
    RegistrationContext, StandaloneEntry, SuiteEntry, initialize_registry,
};

use benchrelay_core::{BenchmarkEntry, VecSink};
use clap::{Parser, Subcommand};
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;

/// BenchRelay CLI arguments
#[derive(Parser, Debug)]
#[command(name = "benchrelay")]
#[command(author, version, about = "BenchRelay - external benchmark harness")]
pub struct Cli {
    /// Subcommand; defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to relay.toml (default: walk up from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the external binary's catalog without registering anything
    Discover,
    /// List registered entries and their callables
    List,
    /// Run registered benchmarks and report metrics
    Run {
        /// Filter calls by regex pattern
        #[arg(default_value = ".*")]
        filter: String,

        /// Output format: human, json
        #[arg(long)]
        format: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> anyhow::Result<HarnessConfig> {
    match &cli.config {
        Some(path) => HarnessConfig::load(path),
        None => Ok(HarnessConfig::discover().unwrap_or_default()),
    }
}

/// Run the CLI with arguments from the environment.
pub fn run() -> anyhow::Result<()> {
    init_tracing();
    run_with(Cli::parse())
}

/// Run the CLI with pre-parsed arguments.
pub fn run_with(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Run {
        filter: ".*".to_string(),
        format: None,
        output: None,
    }) {
        Commands::Discover => {
            let harness = Harness::from_config(&config);
            for identity in harness.discover()? {
                println!("{}", identity);
            }
            Ok(())
        }
        Commands::List => {
            let registry = initialize_registry(&config)?;
            for entry in registry.entries() {
                println!("{}", entry.entry_id());
                for call in entry.calls() {
                    println!("  {}", call.id());
                }
            }
            Ok(())
        }
        Commands::Run {
            filter,
            format,
            output,
        } => {
            let registry = initialize_registry(&config)?;
            let filter = Regex::new(&filter)?;

            let mut sink = VecSink::default();
            let report = execute(&registry, Some(&filter), &mut sink);

            let format = format.unwrap_or_else(|| config.output.format.clone());
            let rendered = match format.as_str() {
                "json" => generate_json_report(&report)?,
                _ => format_human_output(&report),
            };

            match output {
                Some(path) => std::fs::write(&path, rendered)?,
                None => {
                    let mut stdout = std::io::stdout();
                    stdout.write_all(rendered.as_bytes())?;
                }
            }

            let failed = report.failed_count();
            if failed > 0 {
                anyhow::bail!("{} benchmark call(s) failed", failed);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run_defaults() {
        let cli = Cli::parse_from(["benchrelay", "run"]);
        match cli.command {
            Some(Commands::Run { filter, format, output }) => {
                assert_eq!(filter, ".*");
                assert!(format.is_none());
                assert!(output.is_none());
            }
            other => panic!("expected run command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_run_options() {
        let cli = Cli::parse_from([
            "benchrelay",
            "run",
            "LeNet.*",
            "--format",
            "json",
            "--output",
            "/tmp/report.json",
        ]);
        match cli.command {
            Some(Commands::Run { filter, format, output }) => {
                assert_eq!(filter, "LeNet.*");
                assert_eq!(format.as_deref(), Some("json"));
                assert_eq!(output, Some(PathBuf::from("/tmp/report.json")));
            }
            other => panic!("expected run command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_global_config_flag() {
        let cli = Cli::parse_from(["benchrelay", "list", "--config", "/etc/relay.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/relay.toml")));
        assert!(matches!(cli.command, Some(Commands::List)));
    }
}
