//! Benchmark Entry Contract
//!
//! The minimal capability surface every registered entry exposes to the
//! external runner: construction options, a model-directory accessor, and a
//! no-op setup hook required by the runner's lifecycle.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Recognized entry construction options.
///
/// `default_flags`, `flag_methods`, and `root_data_dir` are not used by the
/// core pipeline; they exist so the external runner can construct entries with
/// its usual option set.
#[derive(Debug, Clone)]
pub struct EntryOptions {
    /// Directory for per-entry output (saved models, event logs)
    pub output_dir: PathBuf,
    /// Runner-supplied default flags, forwarded untouched
    pub default_flags: BTreeMap<String, String>,
    /// Runner-supplied flag methods, forwarded untouched
    pub flag_methods: BTreeMap<String, String>,
    /// Runner-supplied data root, unused by the pipeline
    pub root_data_dir: Option<PathBuf>,
}

impl Default for EntryOptions {
    fn default() -> Self {
        Self {
            output_dir: std::env::temp_dir(),
            default_flags: BTreeMap::new(),
            flag_methods: BTreeMap::new(),
            root_data_dir: None,
        }
    }
}

impl EntryOptions {
    /// Options writing output under `output_dir`
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }
}

/// Capability contract satisfied by every registered entry.
pub trait BenchmarkEntry {
    /// Stable identifier of this entry within the registry
    fn entry_id(&self) -> &str;

    /// Construction options this entry was created with
    fn options(&self) -> &EntryOptions;

    /// Directory for storing per-run artifacts. Pure path join, no I/O.
    fn model_directory(&self, folder_name: &str) -> PathBuf {
        self.options().output_dir.join(folder_name)
    }

    /// Lifecycle hook required by the external runner. Performs no work.
    fn setup(&self) {}
}

/// Helper for tests and simple embedders: an entry with nothing but options.
#[derive(Debug)]
pub struct PlainEntry {
    id: String,
    options: EntryOptions,
}

impl PlainEntry {
    /// Create an entry with the given id and options
    pub fn new(id: impl Into<String>, options: EntryOptions) -> Self {
        Self {
            id: id.into(),
            options,
        }
    }
}

impl BenchmarkEntry for PlainEntry {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn options(&self) -> &EntryOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_dir_is_temp() {
        let options = EntryOptions::default();
        assert_eq!(options.output_dir, std::env::temp_dir());
        assert!(options.default_flags.is_empty());
        assert!(options.root_data_dir.is_none());
    }

    #[test]
    fn test_model_directory_joins() {
        let entry = PlainEntry::new("LeNetMNIST", EntryOptions::with_output_dir("/tmp/out"));
        assert_eq!(
            entry.model_directory("lenet"),
            PathBuf::from("/tmp/out/lenet")
        );
    }

    #[test]
    fn test_setup_is_noop() {
        let entry = PlainEntry::new("x", EntryOptions::default());
        entry.setup();
        assert_eq!(entry.entry_id(), "x");
    }
}
