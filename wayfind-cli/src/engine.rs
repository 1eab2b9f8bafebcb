//! Engine selection shared by every subcommand.

use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use wayfind_core::{Coordinate, Costing, LoadOutcome, RoutingContext, RoutingEngine};
use wayfind_data::config_file_for;

use crate::{ARG_CONFIG, ARG_COSTING, CliError};

/// Context type driven by the CLI.
pub(crate) type CliContext = RoutingContext<Box<dyn RoutingEngine>>;

/// Loads an engine into a fresh context for one invocation.
pub(crate) trait EngineLoader {
    fn load(&self, context: &CliContext, config: &Utf8Path) -> Result<LoadOutcome, CliError>;
}

/// Loads the HTTP engine named by the configuration file.
pub(crate) struct HttpEngineLoader;

impl EngineLoader for HttpEngineLoader {
    fn load(&self, context: &CliContext, config: &Utf8Path) -> Result<LoadOutcome, CliError> {
        Ok(wayfind_data::load_http_engine(context, config)?)
    }
}

/// Resolved engine configuration path and costing model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EngineSelection {
    pub(crate) config: Utf8PathBuf,
    pub(crate) costing: Costing,
}

impl EngineSelection {
    /// Resolve the layered `--config` and `--costing` values.
    ///
    /// A missing costing falls back to [`Costing::Auto`].
    pub(crate) fn resolve(
        config: Option<Utf8PathBuf>,
        costing: Option<&str>,
        config_env: &'static str,
    ) -> Result<Self, CliError> {
        let path = config.ok_or(CliError::MissingArgument {
            field: ARG_CONFIG,
            env: config_env,
        })?;
        let model = costing.map_or(Ok(Costing::Auto), parse_costing)?;
        Ok(Self {
            config: config_file_for(&path),
            costing: model,
        })
    }

    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.config, ARG_CONFIG)
    }

    /// Build a context with the selected engine loaded.
    pub(crate) fn open(&self, loader: &dyn EngineLoader) -> Result<CliContext, CliError> {
        self.validate_sources()?;
        let context = CliContext::new();
        let outcome = loader.load(&context, &self.config)?;
        debug!("engine from {} {outcome:?}", self.config);
        Ok(context)
    }
}

pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match wayfind_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub(crate) fn parse_costing(value: &str) -> Result<Costing, CliError> {
    Costing::from_str(value).map_err(|reason| CliError::InvalidArgument {
        field: ARG_COSTING,
        value: value.to_owned(),
        reason,
    })
}

/// Parse a `lat,lon` pair.
pub(crate) fn parse_coordinate(field: &'static str, value: &str) -> Result<Coordinate, CliError> {
    let invalid = |reason: String| CliError::InvalidArgument {
        field,
        value: value.to_owned(),
        reason,
    };
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| invalid("expected lat,lon".to_owned()))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|e| invalid(e.to_string()))
    };
    Coordinate::new(parse(lat)?, parse(lon)?).map_err(|e| invalid(e.to_string()))
}

/// Parse a required `lat,lon` option.
pub(crate) fn required_coordinate(
    field: &'static str,
    env: &'static str,
    value: Option<&str>,
) -> Result<Coordinate, CliError> {
    let text = value.ok_or(CliError::MissingArgument { field, env })?;
    parse_coordinate(field, text)
}
