//! Command-line interface for querying a wayfind routing engine.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use log::{LevelFilter, debug};

mod area;
mod engine;
mod error;
mod matrix;
mod output;
mod route;
mod service;

pub use error::CliError;

use area::{IsochroneArgs, LocateArgs};
use engine::{EngineLoader, HttpEngineLoader};
use matrix::MatrixArgs;
use route::{RouteArgs, TravelTimeArgs};
use service::{RequestArgs, StatusArgs};

pub(crate) const ARG_CONFIG: &str = "config";
pub(crate) const ARG_COSTING: &str = "costing";
pub(crate) const ARG_FROM: &str = "from";
pub(crate) const ARG_TO: &str = "to";
pub(crate) const ARG_AT: &str = "at";
pub(crate) const ARG_SOURCE: &str = "source";
pub(crate) const ARG_TARGET: &str = "target";
pub(crate) const ARG_SECONDS: &str = "seconds";
pub(crate) const ARG_MAX_POINTS: &str = "max-points";
pub(crate) const ARG_ACTION: &str = "action";
pub(crate) const ARG_BODY: &str = "body";

/// Run the wayfind CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] when arguments or configuration are invalid, the
/// engine cannot be loaded, the routing operation fails or output cannot be
/// written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.verbose);
    let mut stdout = std::io::stdout().lock();
    run_command(cli.command, &HttpEngineLoader, &mut stdout)
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp(None);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if builder.try_init().is_err() {
        debug!("logger already installed");
    }
}

fn run_command(
    command: Command,
    loader: &dyn EngineLoader,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::TravelTime(args) => route::run_travel_time(args, loader, writer),
        Command::Route(args) => route::run_route(args, loader, writer),
        Command::Matrix(args) => matrix::run_matrix(args, loader, writer),
        Command::Locate(args) => area::run_locate(args, loader, writer),
        Command::Isochrone(args) => area::run_isochrone(args, loader, writer),
        Command::Request(args) => service::run_request(args, loader, writer),
        Command::Status(args) => service::run_status(args, loader, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "wayfind",
    about = "Query a routing engine for routes, matrices, isochrones and snaps",
    version
)]
struct Cli {
    /// Log debug detail to stderr (`RUST_LOG` overrides).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Travel time in seconds between two coordinates.
    TravelTime(TravelTimeArgs),
    /// Route between two coordinates, with its geometry as WKT.
    Route(RouteArgs),
    /// Many-to-many distance and time matrix.
    Matrix(MatrixArgs),
    /// Snap a coordinate to the nearest road.
    Locate(LocateArgs),
    /// Reachability contours around an origin.
    Isochrone(IsochroneArgs),
    /// Send a raw JSON request to an engine action.
    Request(RequestArgs),
    /// Report the loaded engine and its graph size.
    Status(StatusArgs),
}

#[cfg(test)]
mod tests;
