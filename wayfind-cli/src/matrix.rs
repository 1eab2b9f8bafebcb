//! `matrix` command.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wayfind_core::{Coordinate, Costing, MatrixBind, MatrixEntry, MatrixRunner};

use crate::engine::{EngineLoader, EngineSelection, parse_coordinate};
use crate::output::write_json;
use crate::{ARG_CONFIG, ARG_COSTING, ARG_SOURCE, ARG_TARGET, CliError};

pub(crate) const ENV_MATRIX_CONFIG: &str = "WAYFIND_CMDS_MATRIX_CONFIG";

/// CLI arguments for the `matrix` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Compute distances and travel times from every source to \
                 every target. Entries are printed in row-major order; \
                 unreachable cells carry -1.",
    about = "Many-to-many distance and time matrix"
)]
#[ortho_config(prefix = "WAYFIND")]
pub(crate) struct MatrixArgs {
    /// Source as `lat,lon`; repeat for each source.
    #[arg(long = ARG_SOURCE, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) sources: Vec<String>,
    /// Target as `lat,lon`; repeat for each target.
    #[arg(long = ARG_TARGET, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) targets: Vec<String>,
    /// Engine configuration file, or a directory holding `valhalla.json`.
    #[arg(long = ARG_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) config: Option<Utf8PathBuf>,
    /// Costing model (`auto`, `bicycle`, `pedestrian`, ...).
    #[arg(long = ARG_COSTING, value_name = "name")]
    #[serde(default)]
    pub(crate) costing: Option<String>,
}

/// Resolved `matrix` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MatrixConfig {
    pub(crate) engine: EngineSelection,
    pub(crate) sources: Vec<Coordinate>,
    pub(crate) targets: Vec<Coordinate>,
}

impl MatrixArgs {
    pub(crate) fn into_config(self) -> Result<MatrixConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MatrixConfig::try_from(merged)
    }
}

impl TryFrom<MatrixArgs> for MatrixConfig {
    type Error = CliError;

    fn try_from(args: MatrixArgs) -> Result<Self, Self::Error> {
        let parse_all = |field: &'static str, values: &[String]| {
            values
                .iter()
                .map(|value| parse_coordinate(field, value))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            sources: parse_all(ARG_SOURCE, &args.sources)?,
            targets: parse_all(ARG_TARGET, &args.targets)?,
            engine: EngineSelection::resolve(
                args.config,
                args.costing.as_deref(),
                ENV_MATRIX_CONFIG,
            )?,
        })
    }
}

#[derive(Debug, Serialize)]
struct MatrixOutput {
    costing: Costing,
    sources: Vec<Coordinate>,
    targets: Vec<Coordinate>,
    entries: Vec<MatrixEntry>,
}

pub(crate) fn run_matrix(
    args: MatrixArgs,
    loader: &dyn EngineLoader,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let context = config.engine.open(loader)?;
    let bind = MatrixBind::from_coordinates(
        config.sources.clone(),
        config.targets.clone(),
        config.engine.costing,
    )?;
    let mut runner = MatrixRunner::execute(&bind, &context)?;
    let mut entries = Vec::with_capacity(runner.len());
    while !runner.is_done() {
        entries.extend_from_slice(runner.next_page());
    }
    write_json(
        writer,
        &MatrixOutput {
            costing: config.engine.costing,
            sources: config.sources,
            targets: config.targets,
            entries,
        },
    )
}
