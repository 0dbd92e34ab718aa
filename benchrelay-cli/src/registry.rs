//! Discovery & Registration
//!
//! Queries the external binary once for its catalog, then synthesizes one
//! callable per discovered benchmark without prior static knowledge of its
//! name. Dotted catalog names (`suite.benchmark`) group into one composite
//! entry per suite; standalone names get one callable per configured
//! (variant, backend) combination. Entries are plain structs closing over
//! their bound `InvocationSpec` — no runtime code generation.
//!
//! Lifecycle: `initialize_registry` is called explicitly from the runner's
//! setup path; the returned registry is read-only thereafter. Re-initializing
//! is the only way to refresh it.

use crate::config::HarnessConfig;
use benchrelay_core::{
    Backend, BenchmarkEntry, BenchmarkIdentity, EntryOptions, InvocationSpec, MetricRecord,
    ReportSink, Variant,
};
use benchrelay_proto::{
    ExternalBinary, ExternalProcessError, MeasureSettings, ResultDecodeError, parse_catalog,
    parse_measurement,
};
use benchrelay_stats::{DegenerateTimingError, reduce};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Catalog enumeration failure. Fatal to the whole registration phase:
/// nothing is registered, and discovery may be retried later.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The enumeration invocation itself failed
    #[error("catalog enumeration failed: {0}")]
    Process(#[from] ExternalProcessError),

    /// The catalog output could not be decoded
    #[error("catalog output could not be decoded: {0}")]
    Decode(#[from] ResultDecodeError),
}

/// Failure of one entry invocation. Bubbles unchanged to whatever drives the
/// registered entry; the harness never retries and never swallows these.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// External process failed
    #[error(transparent)]
    Process(#[from] ExternalProcessError),

    /// Captured output could not be decoded
    #[error(transparent)]
    Decode(#[from] ResultDecodeError),

    /// Reduction hit degenerate timing data
    #[error(transparent)]
    Timing(#[from] DegenerateTimingError),
}

/// The invocation pipeline shared by every bound call: invoke, parse, reduce.
#[derive(Debug)]
pub struct Harness {
    binary: ExternalBinary,
    settings: MeasureSettings,
}

impl Harness {
    /// Harness over the given binary and measurement settings
    pub fn new(binary: ExternalBinary, settings: MeasureSettings) -> Self {
        Self { binary, settings }
    }

    /// Harness from the loaded configuration
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(config.external_binary(), config.measure_settings())
    }

    /// Query the binary's catalog via the zero-cost enumeration command.
    pub fn discover(&self) -> Result<Vec<BenchmarkIdentity>, DiscoveryError> {
        let command = self.binary.discovery_command();
        let output = benchrelay_proto::run(&command, &self.binary.working_dir)?;
        let identities = parse_catalog(&output)?;
        for identity in &identities {
            tracing::info!(benchmark = %identity, "discovered benchmark");
        }
        Ok(identities)
    }

    /// Run one invocation end to end, producing exactly one metric record.
    pub fn run_spec(&self, spec: &InvocationSpec) -> Result<MetricRecord, InvocationError> {
        let command = self.binary.measure_command(spec, &self.settings);
        let output = benchrelay_proto::run(&command, &self.binary.working_dir)?;
        let raw = parse_measurement(&output, &spec.identity)?;
        let reduction = reduce(&raw)?;
        Ok(MetricRecord {
            iters: raw.iterations,
            wall_time: reduction.wall_time,
            extras: raw.extras_value(),
            metrics: reduction.metrics,
        })
    }
}

/// One callable unit bound to a single invocation spec.
///
/// Created at registration time and never mutated afterwards. Invoking it
/// drives the full pipeline and forwards the record to the sink; it yields
/// exactly one record or a typed error, never partial metrics.
#[derive(Debug)]
pub struct BoundCall {
    id: String,
    spec: InvocationSpec,
    harness: Arc<Harness>,
}

impl BoundCall {
    fn new(id: String, spec: InvocationSpec, harness: Arc<Harness>) -> Self {
        Self { id, spec, harness }
    }

    /// Stable identifier of this call (entry name plus variant/backend labels)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The invocation spec this call is bound to
    pub fn spec(&self) -> &InvocationSpec {
        &self.spec
    }

    /// Run the bound invocation and report the record to `sink`.
    pub fn invoke(&self, sink: &mut dyn ReportSink) -> Result<MetricRecord, InvocationError> {
        tracing::info!(call = %self.id, "running benchmark");
        let record = self.harness.run_spec(&self.spec)?;
        sink.report(&self.id, &record);
        Ok(record)
    }
}

/// Standalone benchmark entry: one callable per (variant, backend) combination.
#[derive(Debug)]
pub struct StandaloneEntry {
    id: String,
    options: EntryOptions,
    calls: BTreeMap<String, BoundCall>,
}

impl StandaloneEntry {
    /// Calls keyed by variant/backend label, in deterministic order
    pub fn calls(&self) -> &BTreeMap<String, BoundCall> {
        &self.calls
    }
}

impl BenchmarkEntry for StandaloneEntry {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn options(&self) -> &EntryOptions {
        &self.options
    }
}

/// Composite entry for one suite: one callable member per benchmark.
#[derive(Debug)]
pub struct SuiteEntry {
    id: String,
    options: EntryOptions,
    members: BTreeMap<String, BoundCall>,
}

impl SuiteEntry {
    /// Member calls keyed by benchmark name, in deterministic order
    pub fn members(&self) -> &BTreeMap<String, BoundCall> {
        &self.members
    }
}

impl BenchmarkEntry for SuiteEntry {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn options(&self) -> &EntryOptions {
        &self.options
    }
}

/// A registered entry: standalone benchmark or suite composite.
#[derive(Debug)]
pub enum RegisteredEntry {
    /// Standalone benchmark with per-(variant, backend) callables
    Standalone(StandaloneEntry),
    /// Suite composite with one callable member per benchmark
    Suite(SuiteEntry),
}

impl RegisteredEntry {
    /// All callables of this entry, in deterministic order
    pub fn calls(&self) -> impl Iterator<Item = &BoundCall> {
        match self {
            RegisteredEntry::Standalone(entry) => entry.calls.values(),
            RegisteredEntry::Suite(entry) => entry.members.values(),
        }
    }
}

impl BenchmarkEntry for RegisteredEntry {
    fn entry_id(&self) -> &str {
        match self {
            RegisteredEntry::Standalone(entry) => entry.entry_id(),
            RegisteredEntry::Suite(entry) => entry.entry_id(),
        }
    }

    fn options(&self) -> &EntryOptions {
        match self {
            RegisteredEntry::Standalone(entry) => entry.options(),
            RegisteredEntry::Suite(entry) => entry.options(),
        }
    }
}

/// Everything registration needs besides the identities themselves.
#[derive(Debug)]
pub struct RegistrationContext {
    /// Shared invocation pipeline
    pub harness: Arc<Harness>,
    /// Options every created entry is constructed with
    pub options: EntryOptions,
    /// Variants registered per standalone benchmark (empty = binary default)
    pub variants: Vec<Variant>,
    /// Backends registered per standalone benchmark (empty = binary default)
    pub backends: Vec<Backend>,
}

impl RegistrationContext {
    /// Context from the loaded configuration
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            harness: Arc::new(Harness::from_config(config)),
            options: config.entry_options(),
            variants: config.run.variants.clone(),
            backends: config.run.backends.clone(),
        }
    }

    /// The (variant, backend) combinations registered per standalone
    /// benchmark. An empty axis contributes a single "binary default" slot.
    fn combinations(&self) -> Vec<(Option<Variant>, Option<Backend>)> {
        let variants: Vec<Option<Variant>> = if self.variants.is_empty() {
            vec![None]
        } else {
            self.variants.iter().copied().map(Some).collect()
        };
        let backends: Vec<Option<Backend>> = if self.backends.is_empty() {
            vec![None]
        } else {
            self.backends.iter().copied().map(Some).collect()
        };

        let mut combos = Vec::with_capacity(variants.len() * backends.len());
        for &variant in &variants {
            for &backend in &backends {
                combos.push((variant, backend));
            }
        }
        combos
    }
}

fn call_key(variant: Option<Variant>, backend: Option<Backend>) -> String {
    match (variant, backend) {
        (Some(v), Some(b)) => format!("{}_{}", v.label(), b.label()),
        (Some(v), None) => v.label().to_string(),
        (None, Some(b)) => b.label().to_string(),
        (None, None) => "default".to_string(),
    }
}

/// Registry of discovered entries. Read-only after registration; iteration
/// order is deterministic (sorted by entry name).
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<String, RegisteredEntry>,
}

impl Registry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered entries in name order
    pub fn entries(&self) -> impl Iterator<Item = &RegisteredEntry> {
        self.entries.values()
    }

    /// Look up one entry by name
    pub fn get(&self, name: &str) -> Option<&RegisteredEntry> {
        self.entries.get(name)
    }

    /// Registered entry names in order
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every callable across all entries, in deterministic order
    pub fn calls(&self) -> impl Iterator<Item = &BoundCall> {
        self.entries.values().flat_map(RegisteredEntry::calls)
    }

    /// Bind entries for the given identities.
    ///
    /// Idempotent: a name that is already registered is left untouched.
    /// Dotted identities group by suite into composite entries; standalone
    /// identities get one callable per configured (variant, backend)
    /// combination.
    pub fn register(&mut self, identities: &[BenchmarkIdentity], ctx: &RegistrationContext) {
        let mut suites: BTreeMap<&str, Vec<&BenchmarkIdentity>> = BTreeMap::new();
        let mut standalone: Vec<&BenchmarkIdentity> = Vec::new();
        for identity in identities {
            match &identity.suite {
                Some(suite) => suites.entry(suite.as_str()).or_default().push(identity),
                None => standalone.push(identity),
            }
        }

        for (suite, members) in suites {
            if self.entries.contains_key(suite) {
                continue;
            }
            let mut calls = BTreeMap::new();
            for identity in members {
                let spec = InvocationSpec::new((*identity).clone());
                calls.insert(
                    identity.name.clone(),
                    BoundCall::new(identity.full_name(), spec, Arc::clone(&ctx.harness)),
                );
            }
            self.entries.insert(
                suite.to_string(),
                RegisteredEntry::Suite(SuiteEntry {
                    id: suite.to_string(),
                    options: ctx.options.clone(),
                    members: calls,
                }),
            );
            tracing::debug!(suite, "registered suite entry");
        }

        let combinations = ctx.combinations();
        for identity in standalone {
            if self.entries.contains_key(&identity.name) {
                continue;
            }
            let mut calls = BTreeMap::new();
            for &(variant, backend) in &combinations {
                let mut spec = InvocationSpec::new(identity.clone());
                spec.variant = variant;
                spec.backend = backend;
                let key = call_key(variant, backend);
                let call_id = format!("{}.{}", identity.name, key);
                calls.insert(key, BoundCall::new(call_id, spec, Arc::clone(&ctx.harness)));
            }
            self.entries.insert(
                identity.name.clone(),
                RegisteredEntry::Standalone(StandaloneEntry {
                    id: identity.name.clone(),
                    options: ctx.options.clone(),
                    calls,
                }),
            );
            tracing::debug!(benchmark = %identity.name, "registered standalone entry");
        }
    }
}

/// Discover the catalog and build the registry.
///
/// Must be called once before any entry lookup; safe to call again later to
/// build a fresh registry. Discovery failure registers nothing.
pub fn initialize_registry(config: &HarnessConfig) -> Result<Registry, DiscoveryError> {
    let ctx = RegistrationContext::from_config(config);
    let identities = ctx.harness.discover()?;
    let mut registry = Registry::new();
    registry.register(&identities, &ctx);
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_context(variants: Vec<Variant>, backends: Vec<Backend>) -> RegistrationContext {
        let binary = ExternalBinary::new("true", Vec::new(), ".");
        RegistrationContext {
            harness: Arc::new(Harness::new(binary, MeasureSettings::default())),
            options: EntryOptions::default(),
            variants,
            backends,
        }
    }

    fn identities(names: &[&str]) -> Vec<BenchmarkIdentity> {
        names.iter().map(|n| BenchmarkIdentity::parse(n)).collect()
    }

    #[test]
    fn test_suite_names_group_into_composite_entry() {
        let ctx = test_context(Vec::new(), Vec::new());
        let mut registry = Registry::new();
        registry.register(&identities(&["SuiteA.bench1", "SuiteA.bench2"]), &ctx);

        assert_eq!(registry.names(), vec!["SuiteA"]);
        match registry.get("SuiteA").unwrap() {
            RegisteredEntry::Suite(suite) => {
                let members: Vec<&str> = suite.members().keys().map(String::as_str).collect();
                assert_eq!(members, vec!["bench1", "bench2"]);
                assert_eq!(suite.members()["bench1"].id(), "SuiteA.bench1");
            }
            other => panic!("expected suite entry, got {:?}", other),
        }
    }

    #[test]
    fn test_standalone_variant_backend_matrix() {
        let ctx = test_context(
            vec![Variant::Training, Variant::Inference],
            vec![Backend::Eager, Backend::X10],
        );
        let mut registry = Registry::new();
        registry.register(&identities(&["LeNetMNIST"]), &ctx);

        match registry.get("LeNetMNIST").unwrap() {
            RegisteredEntry::Standalone(entry) => {
                let keys: Vec<&str> = entry.calls().keys().map(String::as_str).collect();
                assert_eq!(
                    keys,
                    vec![
                        "inference_eager",
                        "inference_x10",
                        "training_eager",
                        "training_x10",
                    ]
                );
                let call = &entry.calls()["training_x10"];
                assert_eq!(call.spec().variant, Some(Variant::Training));
                assert_eq!(call.spec().backend, Some(Backend::X10));
            }
            other => panic!("expected standalone entry, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_matrix_gets_default_call() {
        let ctx = test_context(Vec::new(), Vec::new());
        let mut registry = Registry::new();
        registry.register(&identities(&["WordSeg"]), &ctx);

        match registry.get("WordSeg").unwrap() {
            RegisteredEntry::Standalone(entry) => {
                let keys: Vec<&str> = entry.calls().keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["default"]);
                let call = &entry.calls()["default"];
                assert_eq!(call.spec().variant, None);
                assert_eq!(call.spec().backend, None);
            }
            other => panic!("expected standalone entry, got {:?}", other),
        }
    }

    #[test]
    fn test_registration_is_idempotent() {
        let names = identities(&["SuiteA.bench1", "SuiteA.bench2", "LeNetMNIST"]);
        let ctx = test_context(vec![Variant::Training], Vec::new());
        let mut registry = Registry::new();
        registry.register(&names, &ctx);
        let first_names = registry.names().join(",");

        // Second registration with a different matrix must not touch
        // existing entries
        let other_ctx = test_context(vec![Variant::Training, Variant::Inference], Vec::new());
        registry.register(&names, &other_ctx);

        assert_eq!(registry.names().join(","), first_names);
        match registry.get("LeNetMNIST").unwrap() {
            RegisteredEntry::Standalone(entry) => assert_eq!(entry.calls().len(), 1),
            other => panic!("expected standalone entry, got {:?}", other),
        }
    }

    #[test]
    fn test_registry_is_ordered_and_queryable() {
        let ctx = test_context(Vec::new(), Vec::new());
        let mut registry = Registry::new();
        registry.register(&identities(&["Zeta", "Alpha", "Mid.b"]), &ctx);

        assert_eq!(registry.names(), vec!["Alpha", "Mid", "Zeta"]);
        assert_eq!(registry.len(), 3);
        assert!(!registry.is_empty());
        assert_eq!(registry.calls().count(), 3);
        assert!(registry.get("Nope").is_none());
    }

    #[test]
    fn test_entry_contract_surface() {
        let ctx = test_context(Vec::new(), Vec::new());
        let mut registry = Registry::new();
        registry.register(&identities(&["SuiteA.b", "Solo"]), &ctx);

        for entry in registry.entries() {
            entry.setup();
            let dir = entry.model_directory("artifacts");
            assert!(dir.ends_with("artifacts"));
        }
        assert_eq!(registry.get("Solo").unwrap().entry_id(), "Solo");
    }
}
