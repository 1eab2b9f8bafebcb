//! Test helpers: a scripted engine loader and engine configuration files.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use wayfind_core::test_support::StubEngine;
use wayfind_core::{LoadOutcome, RoutingEngine};

use super::*;
use crate::engine::CliContext;

/// Loads a clone of a scripted engine instead of reaching a service.
#[derive(Debug, Clone, Default)]
pub(super) struct StubLoader {
    pub(super) engine: StubEngine,
}

impl EngineLoader for StubLoader {
    fn load(&self, context: &CliContext, config: &Utf8Path) -> Result<LoadOutcome, CliError> {
        context.load_with(config.as_str(), || {
            Ok::<Box<dyn RoutingEngine>, CliError>(Box::new(self.engine.clone()))
        })
    }
}

/// A temporary directory holding an engine configuration.
pub(super) struct ConfigDir {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
}

impl ConfigDir {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    /// Write `valhalla.json` and return the directory.
    pub(super) fn with_engine_config(self) -> Self {
        write_utf8(
            &self.root.join("valhalla.json"),
            br#"{ "service": { "base_url": "http://localhost:8002" } }"#,
        );
        self
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write file");
}

/// Parse `argv` and run the command against `loader`, capturing stdout.
pub(super) fn run_argv(argv: &[&str], loader: &StubLoader) -> (Result<(), CliError>, String) {
    let mut buffer = Vec::new();
    let outcome = Cli::try_parse_from(argv)
        .map_err(CliError::from)
        .and_then(|cli| run_command(cli.command, loader, &mut buffer));
    let stdout = String::from_utf8(buffer).expect("stdout utf-8");
    (outcome, stdout)
}
