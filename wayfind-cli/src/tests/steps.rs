//! Behaviour-driven step definitions driving the CLI command scenarios.

use super::helpers::{ConfigDir, StubLoader, run_argv};
use super::*;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use std::cell::RefCell;
use wayfind_core::test_support::{
    StubEngine, error_response, route_response, status_response, uniform_matrix_response,
};
use wayfind_core::{Coordinate, EngineAction};

struct CommandWorld {
    workspace: ConfigDir,
    engine: RefCell<StubEngine>,
    extra_args: RefCell<Vec<String>>,
    stdout: RefCell<String>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl CommandWorld {
    fn new() -> Self {
        Self {
            workspace: ConfigDir::new(),
            engine: RefCell::new(StubEngine::new()),
            extra_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(String::new()),
            result: RefCell::new(None),
        }
    }

    fn script(&self, action: EngineAction, response: Value) {
        let scripted = self.engine.borrow().clone().respond(action, response);
        self.engine.replace(scripted);
    }

    fn run(&self, command: &[&str]) {
        let mut argv = vec!["wayfind"];
        argv.extend_from_slice(command);
        argv.extend(["--config", self.workspace.root.as_str()]);
        let extra = self.extra_args.borrow();
        argv.extend(extra.iter().map(String::as_str));
        let loader = StubLoader {
            engine: self.engine.borrow().clone(),
        };
        let (outcome, stdout) = run_argv(&argv, &loader);
        self.stdout.replace(stdout);
        self.result.replace(Some(outcome));
    }

    fn output(&self) -> Value {
        serde_json::from_str(&self.stdout.borrow()).expect("output should be JSON")
    }

    fn error_status(&self) -> i32 {
        let borrowed = self.result.borrow();
        borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error")
            .status()
    }
}

#[fixture]
fn world() -> CommandWorld {
    CommandWorld::new()
}

#[given("an engine configuration on disk")]
fn engine_configuration_on_disk(#[from(world)] world: &CommandWorld) {
    super::helpers::write_utf8(
        &world.workspace.root.join("valhalla.json"),
        br#"{ "service": { "base_url": "http://localhost:8002" } }"#,
    );
}

#[given("the engine routes through three points")]
fn engine_routes_through_three_points(#[from(world)] world: &CommandWorld) {
    let shape = [
        Coordinate { lat: 43.94, lon: 12.45 },
        Coordinate { lat: 43.935, lon: 12.44 },
        Coordinate { lat: 43.93, lon: 12.44 },
    ];
    world.script(EngineAction::Route, route_response(2.5, 300.0, &[&shape]));
}

#[given("the route is capped at 2 points")]
fn route_is_capped(#[from(world)] world: &CommandWorld) {
    world
        .extra_args
        .borrow_mut()
        .extend(["--max-points".to_owned(), "2".to_owned()]);
}

#[given("the engine answers a two by one matrix")]
fn engine_answers_matrix(#[from(world)] world: &CommandWorld) {
    world.script(
        EngineAction::SourcesToTargets,
        uniform_matrix_response(2, 1, 3.0, 240.0),
    );
}

#[given("the engine finds no path")]
fn engine_finds_no_path(#[from(world)] world: &CommandWorld) {
    world.script(
        EngineAction::Route,
        error_response(442, "No path could be found for input"),
    );
}

#[given("the engine reports a graph of 42 nodes")]
fn engine_reports_nodes(#[from(world)] world: &CommandWorld) {
    world.script(EngineAction::Status, status_response(Some(42)));
}

#[when("I run the route command")]
fn run_route_command(#[from(world)] world: &CommandWorld) {
    world.run(&["route", "--from", "43.94,12.45", "--to", "43.93,12.44"]);
}

#[when("I run the matrix command")]
fn run_matrix_command(#[from(world)] world: &CommandWorld) {
    world.run(&[
        "matrix",
        "--source",
        "43.94,12.45",
        "--source",
        "43.92,12.46",
        "--target",
        "43.93,12.44",
    ]);
}

#[when("I run the status command")]
fn run_status_command(#[from(world)] world: &CommandWorld) {
    world.run(&["status"]);
}

#[then("the command succeeds")]
fn command_succeeds(#[from(world)] world: &CommandWorld) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    result.as_ref().expect("expected success");
}

#[then("the output geometry is {wkt}")]
fn output_geometry_is(#[from(world)] world: &CommandWorld, wkt: String) {
    assert_eq!(world.output()["geometry"], Value::from(wkt.trim_matches('"')));
}

#[then("the output reports a truncated route of 3 points")]
fn output_reports_truncated(#[from(world)] world: &CommandWorld) {
    let output = world.output();
    assert_eq!(output["truncated"], Value::Bool(true));
    assert_eq!(output["total_points"], Value::from(3));
    assert_eq!(
        output["geometry"],
        Value::from("LINESTRING (12.45 43.94, 12.44 43.935)")
    );
}

#[then("the output holds 2 matrix entries")]
fn output_holds_matrix(#[from(world)] world: &CommandWorld) {
    let output = world.output();
    let entries = output["entries"].as_array().expect("entries array");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries.first().map(|e| e["from_index"].clone()), Some(Value::from(0)));
    assert_eq!(entries.last().map(|e| e["from_index"].clone()), Some(Value::from(1)));
    assert_eq!(output["costing"], Value::from("auto"));
}

#[then("the command fails because the configuration is missing")]
fn command_fails_missing_config(#[from(world)] world: &CommandWorld) {
    let borrowed = world.result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::MissingSourceFile { field, .. } => assert_eq!(*field, ARG_CONFIG),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[then("the command fails with status {status}")]
fn command_fails_with_status(#[from(world)] world: &CommandWorld, status: i32) {
    assert_eq!(world.error_status(), status);
}

#[then("the output reports 42 nodes")]
fn output_reports_nodes(#[from(world)] world: &CommandWorld) {
    let output = world.output();
    assert_eq!(output["node_count"], Value::from(42));
    assert!(
        output["source"]
            .as_str()
            .is_some_and(|source| source.ends_with("valhalla.json"))
    );
}

macro_rules! register_command_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/cli_commands.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: CommandWorld) {
            let _ = world;
        }
    };
}

register_command_scenario!(route_as_wkt, "Printing a route as WKT");
register_command_scenario!(route_capped, "Capping the route geometry");
register_command_scenario!(matrix_rows, "Printing a matrix in row-major order");
register_command_scenario!(missing_config, "Reporting a missing engine configuration");
register_command_scenario!(engine_failure, "Surfacing an engine failure with its status");
register_command_scenario!(engine_status, "Reporting the engine status");
