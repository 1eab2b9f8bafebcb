//! `travel-time` and `route` commands.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wayfind_core::{Coordinate, Costing, UNLIMITED_POINTS};

use crate::engine::{EngineLoader, EngineSelection, required_coordinate};
use crate::output::{linestring_wkt, write_json};
use crate::{ARG_CONFIG, ARG_COSTING, ARG_FROM, ARG_MAX_POINTS, ARG_TO, CliError};

pub(crate) const ENV_TRAVEL_TIME_CONFIG: &str = "WAYFIND_CMDS_TRAVEL_TIME_CONFIG";
pub(crate) const ENV_TRAVEL_TIME_FROM: &str = "WAYFIND_CMDS_TRAVEL_TIME_FROM";
pub(crate) const ENV_TRAVEL_TIME_TO: &str = "WAYFIND_CMDS_TRAVEL_TIME_TO";
pub(crate) const ENV_ROUTE_CONFIG: &str = "WAYFIND_CMDS_ROUTE_CONFIG";
pub(crate) const ENV_ROUTE_FROM: &str = "WAYFIND_CMDS_ROUTE_FROM";
pub(crate) const ENV_ROUTE_TO: &str = "WAYFIND_CMDS_ROUTE_TO";

/// CLI arguments for the `travel-time` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Travel time in seconds between two coordinates")]
#[ortho_config(prefix = "WAYFIND")]
pub(crate) struct TravelTimeArgs {
    /// Origin as `lat,lon`.
    #[arg(long = ARG_FROM, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) from: Option<String>,
    /// Destination as `lat,lon`.
    #[arg(long = ARG_TO, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) to: Option<String>,
    /// Engine configuration file, or a directory holding `valhalla.json`.
    #[arg(long = ARG_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) config: Option<Utf8PathBuf>,
    /// Costing model (`auto`, `bicycle`, `pedestrian`, ...).
    #[arg(long = ARG_COSTING, value_name = "name")]
    #[serde(default)]
    pub(crate) costing: Option<String>,
}

/// Resolved `travel-time` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TravelTimeConfig {
    pub(crate) engine: EngineSelection,
    pub(crate) from: Coordinate,
    pub(crate) to: Coordinate,
}

impl TravelTimeArgs {
    pub(crate) fn into_config(self) -> Result<TravelTimeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        TravelTimeConfig::try_from(merged)
    }
}

impl TryFrom<TravelTimeArgs> for TravelTimeConfig {
    type Error = CliError;

    fn try_from(args: TravelTimeArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            from: required_coordinate(ARG_FROM, ENV_TRAVEL_TIME_FROM, args.from.as_deref())?,
            to: required_coordinate(ARG_TO, ENV_TRAVEL_TIME_TO, args.to.as_deref())?,
            engine: EngineSelection::resolve(
                args.config,
                args.costing.as_deref(),
                ENV_TRAVEL_TIME_CONFIG,
            )?,
        })
    }
}

#[derive(Debug, Serialize)]
struct TravelTimeOutput {
    costing: Costing,
    from: Coordinate,
    to: Coordinate,
    duration_s: f64,
}

pub(crate) fn run_travel_time(
    args: TravelTimeArgs,
    loader: &dyn EngineLoader,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let context = config.engine.open(loader)?;
    let duration_s = context.travel_time(config.from, config.to, config.engine.costing)?;
    write_json(
        writer,
        &TravelTimeOutput {
            costing: config.engine.costing,
            from: config.from,
            to: config.to,
            duration_s,
        },
    )
}

/// CLI arguments for the `route` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Route between two coordinates. The path is printed as a WKT \
                 linestring, optionally capped to a number of points.",
    about = "Route between two coordinates"
)]
#[ortho_config(prefix = "WAYFIND")]
pub(crate) struct RouteArgs {
    /// Origin as `lat,lon`.
    #[arg(long = ARG_FROM, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) from: Option<String>,
    /// Destination as `lat,lon`.
    #[arg(long = ARG_TO, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) to: Option<String>,
    /// Keep at most this many path points.
    #[arg(long = ARG_MAX_POINTS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_points: Option<usize>,
    /// Engine configuration file, or a directory holding `valhalla.json`.
    #[arg(long = ARG_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) config: Option<Utf8PathBuf>,
    /// Costing model (`auto`, `bicycle`, `pedestrian`, ...).
    #[arg(long = ARG_COSTING, value_name = "name")]
    #[serde(default)]
    pub(crate) costing: Option<String>,
}

/// Resolved `route` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RouteConfig {
    pub(crate) engine: EngineSelection,
    pub(crate) from: Coordinate,
    pub(crate) to: Coordinate,
    pub(crate) max_points: usize,
}

impl RouteArgs {
    pub(crate) fn into_config(self) -> Result<RouteConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RouteConfig::try_from(merged)
    }
}

impl TryFrom<RouteArgs> for RouteConfig {
    type Error = CliError;

    fn try_from(args: RouteArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            from: required_coordinate(ARG_FROM, ENV_ROUTE_FROM, args.from.as_deref())?,
            to: required_coordinate(ARG_TO, ENV_ROUTE_TO, args.to.as_deref())?,
            max_points: args.max_points.unwrap_or(UNLIMITED_POINTS),
            engine: EngineSelection::resolve(
                args.config,
                args.costing.as_deref(),
                ENV_ROUTE_CONFIG,
            )?,
        })
    }
}

#[derive(Debug, Serialize)]
struct RouteOutput {
    costing: Costing,
    distance_m: f64,
    duration_s: f64,
    total_points: usize,
    truncated: bool,
    geometry: String,
}

pub(crate) fn run_route(
    args: RouteArgs,
    loader: &dyn EngineLoader,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let context = config.engine.open(loader)?;
    let summary = context.route(
        config.from,
        config.to,
        config.engine.costing,
        config.max_points,
    )?;
    let geometry = linestring_wkt(&summary.to_wkb())?;
    write_json(
        writer,
        &RouteOutput {
            costing: config.engine.costing,
            distance_m: summary.distance_m,
            duration_s: summary.duration_s,
            total_points: summary.total_points,
            truncated: summary.truncated,
            geometry,
        },
    )
}

#[cfg(test)]
pub(crate) fn route_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RouteConfig, CliError> {
    let merged = RouteArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RouteConfig::try_from(merged)
}
