//! Focused unit tests covering argument resolution and command output.

use super::helpers::{ConfigDir, StubLoader, run_argv, write_utf8};
use super::*;
use crate::area::{ENV_ISOCHRONE_SECONDS, IsochroneConfig};
use crate::engine::{EngineSelection, parse_coordinate};
use crate::route::{
    ENV_ROUTE_CONFIG, ENV_TRAVEL_TIME_FROM, RouteConfig, TravelTimeConfig,
    route_config_from_layers_for_test,
};
use crate::service::{RequestBody, RequestConfig};
use camino::Utf8PathBuf;
use rstest::rstest;
use serde_json::{Value, json};
use wayfind_core::test_support::{
    StubEngine, isochrone_response, route_response, status_response,
};
use wayfind_core::{Coordinate, Costing, EngineAction, RoutingError, UNLIMITED_POINTS};

#[rstest]
fn travel_time_without_origin_names_the_flag_and_env() {
    let args = TravelTimeArgs {
        to: Some("43.93,12.44".to_owned()),
        config: Some(Utf8PathBuf::from("tiles")),
        ..TravelTimeArgs::default()
    };
    let err = TravelTimeConfig::try_from(args).expect_err("missing origin should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_FROM);
            assert_eq!(env, ENV_TRAVEL_TIME_FROM);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn missing_config_is_reported_with_its_env_var() {
    let args = RouteArgs {
        from: Some("43.94,12.45".to_owned()),
        to: Some("43.93,12.44".to_owned()),
        ..RouteArgs::default()
    };
    let err = RouteConfig::try_from(args).expect_err("missing config should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_CONFIG);
            assert_eq!(env, ENV_ROUTE_CONFIG);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case("43.94,12.45", Some(Coordinate { lat: 43.94, lon: 12.45 }))]
#[case(" -33.9 , 151.2 ", Some(Coordinate { lat: -33.9, lon: 151.2 }))]
#[case("43.94", None)]
#[case("north,east", None)]
#[case("91,0", None)]
fn coordinates_parse_as_lat_lon(#[case] text: &str, #[case] expected: Option<Coordinate>) {
    assert_eq!(parse_coordinate(ARG_AT, text).ok(), expected);
}

#[rstest]
fn selection_defaults_to_auto_and_appends_the_config_name() {
    let selection = EngineSelection::resolve(Some(Utf8PathBuf::from("tiles")), None, "ENV")
        .expect("selection should resolve");
    assert_eq!(selection.costing, Costing::Auto);
    assert_eq!(selection.config, Utf8PathBuf::from("tiles/valhalla.json"));
}

#[rstest]
fn unknown_costing_is_rejected() {
    let err = EngineSelection::resolve(Some(Utf8PathBuf::from("a.json")), Some("hovercraft"), "ENV")
        .expect_err("unknown costing should error");
    match err {
        CliError::InvalidArgument { field, value, .. } => {
            assert_eq!(field, ARG_COSTING);
            assert_eq!(value, "hovercraft");
        }
        other => panic!("expected InvalidArgument, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_missing_and_directory_configs() {
    let workspace = ConfigDir::new();
    let missing = EngineSelection::resolve(
        Some(workspace.root.join("absent.json")),
        None,
        "ENV",
    )
    .expect("selection");
    assert!(matches!(
        missing.validate_sources(),
        Err(CliError::MissingSourceFile { field: ARG_CONFIG, .. })
    ));

    let nested = workspace.root.join("nested.json");
    std::fs::create_dir(nested.as_std_path()).expect("create directory");
    let directory = EngineSelection::resolve(Some(nested), None, "ENV").expect("selection");
    assert!(matches!(
        directory.validate_sources(),
        Err(CliError::SourcePathNotFile { field: ARG_CONFIG, .. })
    ));
}

#[rstest]
fn isochrone_requires_a_budget() {
    let args = IsochroneArgs {
        from: Some("43.94,12.45".to_owned()),
        config: Some(Utf8PathBuf::from("a.json")),
        ..IsochroneArgs::default()
    };
    let err = IsochroneConfig::try_from(args).expect_err("missing budget should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_SECONDS);
            assert_eq!(env, ENV_ISOCHRONE_SECONDS);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn request_accepts_action_aliases_and_file_bodies() {
    let args = RequestArgs {
        action: Some("matrix".to_owned()),
        body_file: Some(Utf8PathBuf::from("body.json")),
        config: Some(Utf8PathBuf::from("a.json")),
        ..RequestArgs::default()
    };
    let config = RequestConfig::try_from(args).expect("request should resolve");
    assert_eq!(config.action, EngineAction::SourcesToTargets);
    assert_eq!(config.body, RequestBody::File(Utf8PathBuf::from("body.json")));
}

#[rstest]
fn request_rejects_unknown_actions() {
    let args = RequestArgs {
        action: Some("teleport".to_owned()),
        body: Some("{}".to_owned()),
        config: Some(Utf8PathBuf::from("a.json")),
        ..RequestArgs::default()
    };
    let err = RequestConfig::try_from(args).expect_err("unknown action should error");
    assert!(matches!(err, CliError::InvalidArgument { field: ARG_ACTION, .. }));
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "max_points": "many" }));

    let err = route_config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honour_precedence() {
    use ortho_config::MergeComposer;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "config": "from-file.json",
            "costing": "bicycle",
            "from": "1,1",
        }),
        None,
    );
    composer.push_environment(json!({
        "config": "from-env.json",
        "to": "2,2",
    }));
    composer.push_cli(json!({ "from": "3,3" }));

    let config =
        route_config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.engine.config, Utf8PathBuf::from("from-env.json"));
    assert_eq!(config.engine.costing, Costing::Bicycle);
    assert_eq!(config.from, Coordinate { lat: 3.0, lon: 3.0 });
    assert_eq!(config.to, Coordinate { lat: 2.0, lon: 2.0 });
    assert_eq!(config.max_points, UNLIMITED_POINTS);
}

#[rstest]
fn routing_failures_keep_their_status() {
    let not_loaded = CliError::from(RoutingError::EngineNotLoaded);
    assert_eq!(not_loaded.status(), -2);
    assert!(not_loaded.to_string().ends_with("(status -2)"));
    assert_eq!(CliError::from(RoutingError::invalid("bad")).status(), -1);
}

#[rstest]
fn travel_time_prints_the_duration() {
    let workspace = ConfigDir::new().with_engine_config();
    let loader = StubLoader {
        engine: StubEngine::new().respond(
            EngineAction::Route,
            route_response(
                1.2,
                95.5,
                &[&[
                    Coordinate { lat: 43.94, lon: 12.45 },
                    Coordinate { lat: 43.93, lon: 12.44 },
                ]],
            ),
        ),
    };
    let (outcome, stdout) = run_argv(
        &[
            "wayfind",
            "travel-time",
            "--from",
            "43.94,12.45",
            "--to",
            "43.93,12.44",
            "--config",
            workspace.root.as_str(),
            "--costing",
            "pedestrian",
        ],
        &loader,
    );
    outcome.expect("travel-time should succeed");
    let output: Value = serde_json::from_str(&stdout).expect("JSON output");
    assert_eq!(output["duration_s"], json!(95.5));
    assert_eq!(output["costing"], json!("pedestrian"));
}

#[rstest]
fn request_reads_its_body_from_a_file() {
    let workspace = ConfigDir::new().with_engine_config();
    let body_path = workspace.root.join("status.json");
    write_utf8(&body_path, b"{}");
    let loader = StubLoader {
        engine: StubEngine::new().respond(EngineAction::Status, status_response(Some(7))),
    };
    let (outcome, stdout) = run_argv(
        &[
            "wayfind",
            "request",
            "--action",
            "status",
            "--body-file",
            body_path.as_str(),
            "--config",
            workspace.root.as_str(),
        ],
        &loader,
    );
    outcome.expect("request should succeed");
    let output: Value = serde_json::from_str(&stdout).expect("JSON output");
    assert_eq!(output["node_count"], json!(7));
}

#[rstest]
fn isochrone_prints_wkt_and_wkb_boundaries() {
    let workspace = ConfigDir::new().with_engine_config();
    let ring = vec![
        Coordinate { lat: 43.90, lon: 12.40 },
        Coordinate { lat: 43.90, lon: 12.50 },
        Coordinate { lat: 44.00, lon: 12.50 },
        Coordinate { lat: 43.90, lon: 12.40 },
    ];
    let loader = StubLoader {
        engine: StubEngine::new()
            .respond(EngineAction::Isochrone, isochrone_response(&[(10.0, ring)])),
    };
    let (outcome, stdout) = run_argv(
        &[
            "wayfind",
            "isochrone",
            "--from",
            "43.94,12.45",
            "--seconds",
            "600",
            "--config",
            workspace.root.as_str(),
        ],
        &loader,
    );
    outcome.expect("isochrone should succeed");
    let output: Value = serde_json::from_str(&stdout).expect("JSON output");
    let contour = &output["contours"][0];
    assert_eq!(contour["target_seconds"], json!(600.0));
    assert_eq!(
        contour["boundary"],
        json!("POLYGON ((12.4 43.9, 12.5 43.9, 12.5 44, 12.4 43.9))")
    );
    let wkb = contour["boundary_wkb"].as_str().expect("hex WKB");
    // Little-endian polygon header, one ring of four points.
    assert!(wkb.starts_with("01030000000100000004000000"));
    assert_eq!(wkb.len(), 2 * (9 + 4 + 4 * 16));
}
