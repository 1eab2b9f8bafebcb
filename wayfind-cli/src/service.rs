//! `request` and `status` commands.

use std::io::Write;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wayfind_core::EngineAction;

use crate::engine::{EngineLoader, EngineSelection, require_existing};
use crate::output::write_json;
use crate::{ARG_ACTION, ARG_BODY, ARG_CONFIG, CliError};

pub(crate) const ARG_BODY_FILE: &str = "body-file";
pub(crate) const ENV_REQUEST_CONFIG: &str = "WAYFIND_CMDS_REQUEST_CONFIG";
pub(crate) const ENV_REQUEST_ACTION: &str = "WAYFIND_CMDS_REQUEST_ACTION";
pub(crate) const ENV_REQUEST_BODY: &str = "WAYFIND_CMDS_REQUEST_BODY";
pub(crate) const ENV_STATUS_CONFIG: &str = "WAYFIND_CMDS_STATUS_CONFIG";

/// CLI arguments for the `request` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Send a JSON request document to a named engine action \
                 (route, sources_to_targets, isochrone, locate, trace_route, \
                 trace_attributes, optimized_route, height, status) and \
                 print the response.",
    about = "Send a raw JSON request to an engine action"
)]
#[ortho_config(prefix = "WAYFIND")]
pub(crate) struct RequestArgs {
    /// Engine action name.
    #[arg(long = ARG_ACTION, value_name = "name")]
    #[serde(default)]
    pub(crate) action: Option<String>,
    /// Request document as inline JSON.
    #[arg(long = ARG_BODY, value_name = "json", conflicts_with = "body_file")]
    #[serde(default)]
    pub(crate) body: Option<String>,
    /// Path to a file holding the request document.
    #[arg(long = ARG_BODY_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) body_file: Option<Utf8PathBuf>,
    /// Engine configuration file, or a directory holding `valhalla.json`.
    #[arg(long = ARG_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) config: Option<Utf8PathBuf>,
}

/// Where the request document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RequestBody {
    Inline(String),
    File(Utf8PathBuf),
}

impl RequestBody {
    fn read(&self) -> Result<String, CliError> {
        match self {
            Self::Inline(text) => Ok(text.clone()),
            Self::File(path) => read_body_file(path),
        }
    }
}

fn read_body_file(path: &Utf8Path) -> Result<String, CliError> {
    require_existing(path, ARG_BODY_FILE)?;
    wayfind_fs::read_utf8_to_string(path).map_err(|source| CliError::InspectSourcePath {
        field: ARG_BODY_FILE,
        path: path.to_path_buf(),
        source,
    })
}

/// Resolved `request` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequestConfig {
    pub(crate) engine: EngineSelection,
    pub(crate) action: EngineAction,
    pub(crate) body: RequestBody,
}

impl RequestArgs {
    pub(crate) fn into_config(self) -> Result<RequestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RequestConfig::try_from(merged)
    }
}

impl TryFrom<RequestArgs> for RequestConfig {
    type Error = CliError;

    fn try_from(args: RequestArgs) -> Result<Self, Self::Error> {
        let name = args.action.ok_or(CliError::MissingArgument {
            field: ARG_ACTION,
            env: ENV_REQUEST_ACTION,
        })?;
        let action = EngineAction::from_str(&name).map_err(|e| CliError::InvalidArgument {
            field: ARG_ACTION,
            value: name.clone(),
            reason: e.to_string(),
        })?;
        let body = match (args.body, args.body_file) {
            (Some(text), _) => RequestBody::Inline(text),
            (None, Some(path)) => RequestBody::File(path),
            (None, None) => {
                return Err(CliError::MissingArgument {
                    field: ARG_BODY,
                    env: ENV_REQUEST_BODY,
                });
            }
        };
        Ok(Self {
            engine: EngineSelection::resolve(args.config, None, ENV_REQUEST_CONFIG)?,
            action,
            body,
        })
    }
}

pub(crate) fn run_request(
    args: RequestArgs,
    loader: &dyn EngineLoader,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let request = config.body.read()?;
    let context = config.engine.open(loader)?;
    let response = context.raw_request(config.action, &request)?;
    let document: Value = serde_json::from_str(&response).map_err(CliError::SerializeOutput)?;
    write_json(writer, &document)
}

/// CLI arguments for the `status` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Report the loaded engine and its graph size")]
#[ortho_config(prefix = "WAYFIND")]
pub(crate) struct StatusArgs {
    /// Engine configuration file, or a directory holding `valhalla.json`.
    #[arg(long = ARG_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) config: Option<Utf8PathBuf>,
}

impl StatusArgs {
    pub(crate) fn into_config(self) -> Result<EngineSelection, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        EngineSelection::resolve(merged.config, None, ENV_STATUS_CONFIG)
    }
}

#[derive(Debug, Serialize)]
struct StatusOutput {
    source: Option<String>,
    node_count: u64,
}

pub(crate) fn run_status(
    args: StatusArgs,
    loader: &dyn EngineLoader,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let engine = args.into_config()?;
    let context = engine.open(loader)?;
    let node_count = context.node_count()?;
    write_json(
        writer,
        &StatusOutput {
            source: context.loaded_source(),
            node_count,
        },
    )
}
