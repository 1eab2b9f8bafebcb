//! `locate` and `isochrone` commands.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wayfind_core::{Coordinate, Costing, SnappedLocation};

use crate::engine::{EngineLoader, EngineSelection, required_coordinate};
use crate::output::{polygon_wkt, wkb_hex, write_json};
use crate::{ARG_AT, ARG_CONFIG, ARG_COSTING, ARG_FROM, ARG_SECONDS, CliError};

pub(crate) const ENV_LOCATE_CONFIG: &str = "WAYFIND_CMDS_LOCATE_CONFIG";
pub(crate) const ENV_LOCATE_AT: &str = "WAYFIND_CMDS_LOCATE_AT";
pub(crate) const ENV_ISOCHRONE_CONFIG: &str = "WAYFIND_CMDS_ISOCHRONE_CONFIG";
pub(crate) const ENV_ISOCHRONE_FROM: &str = "WAYFIND_CMDS_ISOCHRONE_FROM";
pub(crate) const ENV_ISOCHRONE_SECONDS: &str = "WAYFIND_CMDS_ISOCHRONE_SECONDS";

/// CLI arguments for the `locate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Snap a coordinate to the nearest road")]
#[ortho_config(prefix = "WAYFIND")]
pub(crate) struct LocateArgs {
    /// Coordinate to snap as `lat,lon`.
    #[arg(long = ARG_AT, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) at: Option<String>,
    /// Engine configuration file, or a directory holding `valhalla.json`.
    #[arg(long = ARG_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) config: Option<Utf8PathBuf>,
    /// Costing model (`auto`, `bicycle`, `pedestrian`, ...).
    #[arg(long = ARG_COSTING, value_name = "name")]
    #[serde(default)]
    pub(crate) costing: Option<String>,
}

/// Resolved `locate` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LocateConfig {
    pub(crate) engine: EngineSelection,
    pub(crate) at: Coordinate,
}

impl LocateArgs {
    pub(crate) fn into_config(self) -> Result<LocateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LocateConfig::try_from(merged)
    }
}

impl TryFrom<LocateArgs> for LocateConfig {
    type Error = CliError;

    fn try_from(args: LocateArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            at: required_coordinate(ARG_AT, ENV_LOCATE_AT, args.at.as_deref())?,
            engine: EngineSelection::resolve(
                args.config,
                args.costing.as_deref(),
                ENV_LOCATE_CONFIG,
            )?,
        })
    }
}

#[derive(Debug, Serialize)]
struct LocateOutput {
    costing: Costing,
    requested: Coordinate,
    snapped: SnappedLocation,
}

pub(crate) fn run_locate(
    args: LocateArgs,
    loader: &dyn EngineLoader,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let context = config.engine.open(loader)?;
    let snapped = context.locate(config.at, config.engine.costing)?;
    write_json(
        writer,
        &LocateOutput {
            costing: config.engine.costing,
            requested: config.at,
            snapped,
        },
    )
}

/// CLI arguments for the `isochrone` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Compute reachability contours around an origin, one per \
                 travel budget in seconds. Each contour is printed as a WKT \
                 polygon and as hex-encoded little-endian WKB.",
    about = "Reachability contours around an origin"
)]
#[ortho_config(prefix = "WAYFIND")]
pub(crate) struct IsochroneArgs {
    /// Origin as `lat,lon`.
    #[arg(long = ARG_FROM, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) from: Option<String>,
    /// Travel budget in seconds; repeat for several contours.
    #[arg(long = ARG_SECONDS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) seconds: Vec<f64>,
    /// Engine configuration file, or a directory holding `valhalla.json`.
    #[arg(long = ARG_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) config: Option<Utf8PathBuf>,
    /// Costing model (`auto`, `bicycle`, `pedestrian`, ...).
    #[arg(long = ARG_COSTING, value_name = "name")]
    #[serde(default)]
    pub(crate) costing: Option<String>,
}

/// Resolved `isochrone` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IsochroneConfig {
    pub(crate) engine: EngineSelection,
    pub(crate) origin: Coordinate,
    pub(crate) seconds: Vec<f64>,
}

impl IsochroneArgs {
    pub(crate) fn into_config(self) -> Result<IsochroneConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        IsochroneConfig::try_from(merged)
    }
}

impl TryFrom<IsochroneArgs> for IsochroneConfig {
    type Error = CliError;

    fn try_from(args: IsochroneArgs) -> Result<Self, Self::Error> {
        if args.seconds.is_empty() {
            return Err(CliError::MissingArgument {
                field: ARG_SECONDS,
                env: ENV_ISOCHRONE_SECONDS,
            });
        }
        Ok(Self {
            origin: required_coordinate(ARG_FROM, ENV_ISOCHRONE_FROM, args.from.as_deref())?,
            seconds: args.seconds,
            engine: EngineSelection::resolve(
                args.config,
                args.costing.as_deref(),
                ENV_ISOCHRONE_CONFIG,
            )?,
        })
    }
}

#[derive(Debug, Serialize)]
struct ContourOutput {
    target_seconds: f64,
    boundary: String,
    boundary_wkb: String,
}

#[derive(Debug, Serialize)]
struct IsochroneOutput {
    costing: Costing,
    origin: Coordinate,
    contours: Vec<ContourOutput>,
}

pub(crate) fn run_isochrone(
    args: IsochroneArgs,
    loader: &dyn EngineLoader,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let context = config.engine.open(loader)?;
    let contours = context
        .isochrone(config.origin, &config.seconds, config.engine.costing)?
        .into_iter()
        .map(|contour| {
            let ring: Vec<Coordinate> = contour.exterior_coordinates().collect();
            ContourOutput {
                target_seconds: contour.target_seconds,
                boundary: polygon_wkt(&ring),
                boundary_wkb: wkb_hex(&contour.to_wkb()),
            }
        })
        .collect();
    write_json(
        writer,
        &IsochroneOutput {
            costing: config.engine.costing,
            origin: config.origin,
            contours,
        },
    )
}
