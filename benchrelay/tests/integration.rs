//! Integration tests for BenchRelay
//!
//! These drive the whole pipeline against a fake external binary: a shell
//! script that answers the enumeration, filter, and measure protocols with
//! canned JSON.

use benchrelay::{
    Backend, BenchmarkEntry, DiscoveryError, HarnessConfig, RegisteredEntry, Registry,
    RegistrationContext, Variant, VecSink, execute, initialize_registry,
};
use std::path::Path;

const FAKE_BINARY: &str = r#"#!/bin/sh
case "$*" in
  *list-defaults*)
    printf '%s\n' '{"name":"SuiteA.bench1"}' '{"name":"SuiteA.bench2"}' '{"name":"LeNetMNIST"}'
    ;;
  *--filter*)
    printf '%s' '{"benchmarks":[{"name":"SuiteA.bench1","iterations":10,"wall_time":1.5,"exp_per_second":200.0},{"name":"SuiteA.bench2","iterations":3,"wall_time":0.5}]}'
    ;;
  *measure*)
    printf '%s' '{"configuration":{"settings":{"iterations":4,"batchSize":32}},"timings":[100,100,100,100],"exampleCount":10}'
    ;;
esac
"#;

/// Write the fake binary into `dir` and build a config launching it via `sh`.
fn fake_config(dir: &Path) -> HarnessConfig {
    let script = dir.join("fake-benchmarks.sh");
    std::fs::write(&script, FAKE_BINARY).unwrap();

    let mut config = HarnessConfig::default();
    config.binary.program = "sh".to_string();
    config.binary.args = vec![script.to_string_lossy().into_owned()];
    config.binary.working_dir = dir.to_string_lossy().into_owned();
    config.run.min_time_secs = None;
    config.run.variants = vec![Variant::Training, Variant::Inference];
    config.run.backends = Vec::new();
    config
}

#[test]
fn test_discovery_registers_suites_and_standalones() {
    let dir = tempfile::tempdir().unwrap();
    let config = fake_config(dir.path());

    let registry = initialize_registry(&config).unwrap();

    assert_eq!(registry.names(), vec!["LeNetMNIST", "SuiteA"]);
    match registry.get("SuiteA").unwrap() {
        RegisteredEntry::Suite(suite) => {
            let members: Vec<&str> = suite.members().keys().map(String::as_str).collect();
            assert_eq!(members, vec!["bench1", "bench2"]);
        }
        other => panic!("expected suite entry, got {:?}", other),
    }
    match registry.get("LeNetMNIST").unwrap() {
        RegisteredEntry::Standalone(entry) => {
            let keys: Vec<&str> = entry.calls().keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["inference", "training"]);
        }
        other => panic!("expected standalone entry, got {:?}", other),
    }
}

#[test]
fn test_end_to_end_run_produces_records() {
    let dir = tempfile::tempdir().unwrap();
    let config = fake_config(dir.path());
    let registry = initialize_registry(&config).unwrap();

    let mut sink = VecSink::default();
    let report = execute(&registry, None, &mut sink);

    // Two standalone variants + two suite members
    assert_eq!(report.results.len(), 4);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(sink.records.len(), 4);

    // Standalone calls reduce via the percentile strategy
    let (_, lenet) = sink
        .records
        .iter()
        .find(|(id, _)| id == "LeNetMNIST.training")
        .unwrap();
    assert_eq!(lenet.iters, 4);
    assert!((lenet.wall_time - 0.1).abs() < 1e-9);
    let names: Vec<&str> = lenet.metrics.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["avg_exp_per_second", "exp_per_second"]);
    assert!((lenet.metrics[0].value - 100.0).abs() < 1e-9);
    // Settings surface via extras
    assert_eq!(lenet.extras.as_ref().unwrap()["batchSize"], 32);

    // Suite members pass the binary's aggregated fields through
    let (_, bench1) = sink
        .records
        .iter()
        .find(|(id, _)| id == "SuiteA.bench1")
        .unwrap();
    assert_eq!(bench1.iters, 10);
    assert_eq!(bench1.wall_time, 1.5);
    assert_eq!(bench1.metrics[0].name, "exp_per_second");
    assert_eq!(bench1.metrics[0].value, 200.0);

    let (_, bench2) = sink
        .records
        .iter()
        .find(|(id, _)| id == "SuiteA.bench2")
        .unwrap();
    assert_eq!(bench2.iters, 3);
    assert!(bench2.metrics.is_empty());
}

#[test]
fn test_repeated_initialization_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = fake_config(dir.path());

    let first = initialize_registry(&config).unwrap();
    let second = initialize_registry(&config).unwrap();
    assert_eq!(first.names(), second.names());

    // Registering the same catalog twice into one registry adds nothing
    let ctx = RegistrationContext::from_config(&config);
    let identities = ctx.harness.discover().unwrap();
    let mut registry = Registry::new();
    registry.register(&identities, &ctx);
    let before = registry.names().join(",");
    registry.register(&identities, &ctx);
    assert_eq!(registry.names().join(","), before);
    assert_eq!(registry.calls().count(), 4);
}

#[test]
fn test_discovery_failure_registers_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("broken.sh");
    std::fs::write(&script, "#!/bin/sh\nprintf 'not json'\n").unwrap();

    let mut config = HarnessConfig::default();
    config.binary.program = "sh".to_string();
    config.binary.args = vec![script.to_string_lossy().into_owned()];
    config.binary.working_dir = dir.path().to_string_lossy().into_owned();

    let err = initialize_registry(&config).unwrap_err();
    assert!(matches!(err, DiscoveryError::Decode(_)));

    // Discovery may be retried after the binary is fixed
    std::fs::write(&script, FAKE_BINARY).unwrap();
    let registry = initialize_registry(&config).unwrap();
    assert!(!registry.is_empty());
}

#[test]
fn test_entry_contract_for_registered_entries() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fake_config(dir.path());
    config.output.directory = Some(dir.path().join("out").to_string_lossy().into_owned());
    config.run.backends = vec![Backend::Eager, Backend::X10];

    let registry = initialize_registry(&config).unwrap();

    let entry = registry.get("LeNetMNIST").unwrap();
    entry.setup();
    assert_eq!(
        entry.model_directory("lenet"),
        dir.path().join("out").join("lenet")
    );

    // Full variant × backend matrix
    match entry {
        RegisteredEntry::Standalone(standalone) => {
            assert_eq!(standalone.calls().len(), 4);
        }
        other => panic!("expected standalone entry, got {:?}", other),
    }
}
