#![expect(
    clippy::expect_used,
    reason = "boundary tests use expect for readable failures"
)]
#![expect(
    clippy::float_cmp,
    reason = "values are copied from scripted responses"
)]
#![expect(
    clippy::indexing_slicing,
    reason = "buffers are fixed-size arrays sized by each test"
)]

//! Exercises the exported C functions against a scripted engine.

use std::ffi::{CStr, c_char};
use std::ptr;

use byteorder::{ByteOrder, LittleEndian};
use rstest::{fixture, rstest};
use wayfind_core::geometry::{CoordinateWriter, POINT_TYPE, decode_linestring};
use wayfind_core::test_support::{
    StubEngine, error_response, isochrone_response, locate_response, route_response,
    status_response, uniform_matrix_response,
};
use wayfind_core::{Coordinate, EngineAction, EngineError};
use wayfind_ffi::{
    IsochronePoint, MatrixCell, RoutePoint, RouteResult, WayfindContext, wayfind_batch_travel_time,
    wayfind_context_free, wayfind_context_new, wayfind_encode_linestring, wayfind_free_string,
    wayfind_is_loaded, wayfind_isochrone, wayfind_last_error, wayfind_linestring_wkb_len,
    wayfind_load, wayfind_matrix, wayfind_node_count, wayfind_request, wayfind_route,
    wayfind_route_wkb, wayfind_route_wkt, wayfind_snap, wayfind_travel_time, wayfind_unload,
    wayfind_version,
};

const AUTO: &CStr = c"auto";

fn path(len: usize) -> Vec<Coordinate> {
    (0..len)
        .map(|i| Coordinate {
            lat: 43.94 - i as f64 * 0.001,
            lon: 12.45 - i as f64 * 0.001,
        })
        .collect()
}

fn scripted(engine: StubEngine) -> WayfindContext {
    WayfindContext::with_engine(Box::new(engine))
}

fn last_error() -> String {
    let message = wayfind_last_error();
    assert!(!message.is_null(), "a failure should leave a message");
    // SAFETY: the library keeps the message alive until the next call.
    unsafe { CStr::from_ptr(message) }
        .to_str()
        .expect("UTF-8 message")
        .to_owned()
}

#[fixture]
fn routed() -> WayfindContext {
    let points = path(5);
    scripted(StubEngine::new().respond(
        EngineAction::Route,
        route_response(4.2, 480.0, &[points.as_slice()]),
    ))
}

#[rstest]
fn context_lifecycle_without_engine() {
    let ctx = wayfind_context_new();
    assert!(!ctx.is_null());
    // SAFETY: `ctx` is live until freed below.
    unsafe {
        assert_eq!(wayfind_is_loaded(ctx), 0);
        assert_eq!(wayfind_node_count(ctx), -2);
        assert_eq!(
            wayfind_travel_time(ctx, 43.94, 12.45, 43.93, 12.44, AUTO.as_ptr()),
            -2.0
        );
        assert_eq!(wayfind_unload(ctx), 0);
        wayfind_context_free(ctx);
        wayfind_context_free(ptr::null_mut());
    }
}

#[rstest]
fn null_context_is_a_failure() {
    // SAFETY: null handles are rejected before use.
    let status = unsafe { wayfind_node_count(ptr::null()) };
    assert_eq!(status, -1);
    assert!(last_error().contains("ctx"));
}

#[rstest]
fn loading_a_missing_configuration_fails() {
    let ctx = WayfindContext::new();
    let missing = c"/nonexistent/wayfind/tiles";
    // SAFETY: all pointers are live for the call.
    let status = unsafe { wayfind_load(&ctx, missing.as_ptr(), AUTO.as_ptr()) };
    assert_eq!(status, -1);
    assert!(last_error().contains("valhalla.json"));
    // SAFETY: `ctx` is live.
    assert_eq!(unsafe { wayfind_is_loaded(&ctx) }, 0);
}

#[rstest]
fn unknown_mode_is_rejected_before_the_engine(routed: WayfindContext) {
    // SAFETY: all pointers are live for the call.
    let seconds = unsafe {
        wayfind_travel_time(&routed, 43.94, 12.45, 43.93, 12.44, c"hovercraft".as_ptr())
    };
    assert_eq!(seconds, -1.0);
    assert!(last_error().contains("hovercraft"));
}

#[rstest]
fn travel_time_reports_seconds(routed: WayfindContext) {
    // SAFETY: all pointers are live for the call.
    let seconds = unsafe { wayfind_travel_time(&routed, 43.94, 12.45, 43.93, 12.44, AUTO.as_ptr()) };
    assert_eq!(seconds, 480.0);
    assert!(wayfind_last_error().is_null());
}

#[rstest]
fn route_respects_capacity(routed: WayfindContext) {
    let mut result = RouteResult::default();
    let mut points = [RoutePoint::default(); 3];
    // SAFETY: buffers hold `max_points` records.
    let written = unsafe {
        wayfind_route(
            &routed,
            43.94,
            12.45,
            43.93,
            12.44,
            AUTO.as_ptr(),
            &mut result,
            points.as_mut_ptr(),
            2,
        )
    };
    assert_eq!(written, 2);
    assert_eq!(result.num_points, 2);
    assert_eq!(result.distance_m, 4200.0);
    let expected = path(2);
    assert_eq!(points[0], RoutePoint::from(expected[0]));
    assert_eq!(points[1], RoutePoint::from(expected[1]));
    assert_eq!(points[2], RoutePoint::default(), "beyond capacity stays untouched");
}

#[rstest]
#[case(-1)]
fn negative_capacity_is_rejected(routed: WayfindContext, #[case] max_points: i32) {
    let mut result = RouteResult::default();
    let mut points = [RoutePoint::default(); 1];
    // SAFETY: the capacity is rejected before any write.
    let status = unsafe {
        wayfind_route(
            &routed,
            43.94,
            12.45,
            43.93,
            12.44,
            AUTO.as_ptr(),
            &mut result,
            points.as_mut_ptr(),
            max_points,
        )
    };
    assert_eq!(status, -1);
    assert_eq!(result, RouteResult::default());
}

#[rstest]
fn null_output_buffer_is_rejected(routed: WayfindContext) {
    // SAFETY: null outputs are rejected before any write.
    let status = unsafe {
        wayfind_route(
            &routed,
            43.94,
            12.45,
            43.93,
            12.44,
            AUTO.as_ptr(),
            ptr::null_mut(),
            ptr::null_mut(),
            4,
        )
    };
    assert_eq!(status, -1);
}

#[rstest]
fn route_wkt_uses_geometry_centroids(routed: WayfindContext) {
    let mut result = RouteResult::default();
    let mut points = [RoutePoint::default(); 8];
    // SAFETY: buffers hold `max_points` records and strings are terminated.
    let written = unsafe {
        wayfind_route_wkt(
            &routed,
            c"POINT(12.45 43.94)".as_ptr(),
            c"SRID=4326;POINT(12.44 43.93)".as_ptr(),
            AUTO.as_ptr(),
            &mut result,
            points.as_mut_ptr(),
            8,
        )
    };
    assert_eq!(written, 5);
    assert_eq!(result.duration_s, 480.0);
}

#[rstest]
fn route_wkt_with_unsupported_geometry_fails(routed: WayfindContext) {
    let mut result = RouteResult::default();
    let mut points = [RoutePoint::default(); 8];
    // SAFETY: buffers hold `max_points` records and strings are terminated.
    let status = unsafe {
        wayfind_route_wkt(
            &routed,
            c"LINESTRING(12.45 43.94, 12.44 43.93)".as_ptr(),
            c"POINT(12.44 43.93)".as_ptr(),
            AUTO.as_ptr(),
            &mut result,
            points.as_mut_ptr(),
            8,
        )
    };
    assert_eq!(status, -1);
}

#[rstest]
fn route_wkb_accepts_standard_points(routed: WayfindContext) {
    let mut from_writer = CoordinateWriter::<LittleEndian>::new();
    from_writer.header(POINT_TYPE).pair(12.45, 43.94);
    let from = from_writer.finish();
    let mut to_writer = CoordinateWriter::<LittleEndian>::new();
    to_writer.header(POINT_TYPE).pair(12.44, 43.93);
    let to = to_writer.finish();
    let mut result = RouteResult::default();
    let mut points = [RoutePoint::default(); 8];
    // SAFETY: all buffers are live for their stated lengths.
    let written = unsafe {
        wayfind_route_wkb(
            &routed,
            from.as_ptr(),
            21,
            to.as_ptr(),
            21,
            AUTO.as_ptr(),
            &mut result,
            points.as_mut_ptr(),
            8,
        )
    };
    assert_eq!(written, 5);
}

#[rstest]
fn geometry_routes_without_engine_report_not_loaded() {
    let mut writer = CoordinateWriter::<LittleEndian>::new();
    writer.header(POINT_TYPE).pair(12.45, 43.94);
    let point = writer.finish();
    let mut result = RouteResult::default();
    let mut points = [RoutePoint::default(); 4];
    let ctx = wayfind_context_new();
    // SAFETY: `ctx` is live until freed and every buffer outlives the calls.
    unsafe {
        let text_status = wayfind_route_wkt(
            ctx,
            c"POINT(12.45 43.94)".as_ptr(),
            c"POINT(12.44 43.93)".as_ptr(),
            AUTO.as_ptr(),
            &mut result,
            points.as_mut_ptr(),
            4,
        );
        assert_eq!(text_status, -2);
        assert!(last_error().contains("not loaded"));

        let binary_status = wayfind_route_wkb(
            ctx,
            point.as_ptr(),
            21,
            point.as_ptr(),
            21,
            AUTO.as_ptr(),
            &mut result,
            points.as_mut_ptr(),
            4,
        );
        assert_eq!(binary_status, -2);
        assert!(last_error().contains("not loaded"));
        wayfind_context_free(ctx);
    }
}

#[rstest]
fn engine_failures_flatten_to_minus_one() {
    let ctx = scripted(StubEngine::new().respond(
        EngineAction::Route,
        error_response(442, "No path could be found for input"),
    ));
    // SAFETY: all pointers are live for the call.
    let seconds = unsafe { wayfind_travel_time(&ctx, 43.94, 12.45, 43.93, 12.44, AUTO.as_ptr()) };
    assert_eq!(seconds, -1.0);
    assert!(last_error().contains("No path"));
}

#[rstest]
fn batch_marks_failed_pairs() {
    let points = path(2);
    let ctx = scripted(
        StubEngine::new()
            .respond(
                EngineAction::Route,
                route_response(1.0, 60.0, &[points.as_slice()]),
            )
            .fail(EngineAction::Route, EngineError::Timeout)
            .respond(
                EngineAction::Route,
                route_response(2.0, 120.0, &[points.as_slice()]),
            ),
    );
    let lats = [43.94, 43.95, 43.96];
    let lons = [12.45, 12.46, 12.47];
    let mut results = [0.0_f64; 3];
    // SAFETY: every array holds `count` values.
    let successes = unsafe {
        wayfind_batch_travel_time(
            &ctx,
            lats.as_ptr(),
            lons.as_ptr(),
            lats.as_ptr(),
            lons.as_ptr(),
            results.as_mut_ptr(),
            3,
            AUTO.as_ptr(),
        )
    };
    assert_eq!(successes, 2);
    assert_eq!(results, [60.0, -1.0, 120.0]);
}

#[rstest]
fn snap_writes_the_correlated_point() {
    let edge = Coordinate {
        lat: 43.9401,
        lon: 12.4502,
    };
    let ctx = scripted(StubEngine::new().respond(EngineAction::Locate, locate_response(Some(edge))));
    let (mut lat, mut lon, mut distance) = (0.0, 0.0, -1.0);
    // SAFETY: outputs are live locals.
    let status = unsafe {
        wayfind_snap(
            &ctx,
            43.94,
            12.45,
            AUTO.as_ptr(),
            &mut lat,
            &mut lon,
            &mut distance,
        )
    };
    assert_eq!(status, 0);
    assert_eq!((lat, lon), (edge.lat, edge.lon));
    assert!(distance > 0.0 && distance < 50.0, "distance was {distance}");
}

#[rstest]
fn isochrone_writes_vertices_up_to_capacity() {
    let ring = vec![
        Coordinate { lat: 43.9, lon: 12.4 },
        Coordinate { lat: 43.9, lon: 12.5 },
        Coordinate { lat: 44.0, lon: 12.5 },
        Coordinate { lat: 43.9, lon: 12.4 },
    ];
    let ctx = scripted(
        StubEngine::new().respond(EngineAction::Isochrone, isochrone_response(&[(10.0, ring)])),
    );
    let mut out = [IsochronePoint::default(); 3];
    // SAFETY: the buffer holds `max_results` records.
    let written = unsafe {
        wayfind_isochrone(&ctx, 43.94, 12.45, 600.0, AUTO.as_ptr(), out.as_mut_ptr(), 3)
    };
    assert_eq!(written, 3);
    assert!(out.iter().all(|point| point.seconds == 600.0));
    assert_eq!((out[0].lat, out[0].lon), (43.9, 12.4));
}

#[rstest]
fn matrix_fills_cells_row_major() {
    let ctx = scripted(StubEngine::new().respond(
        EngineAction::SourcesToTargets,
        uniform_matrix_response(2, 2, 1.5, 90.0),
    ));
    let lats = [43.94, 43.95];
    let lons = [12.45, 12.46];
    let mut cells = [MatrixCell::default(); 3];
    // SAFETY: arrays hold their stated counts.
    let written = unsafe {
        wayfind_matrix(
            &ctx,
            lats.as_ptr(),
            lons.as_ptr(),
            2,
            lats.as_ptr(),
            lons.as_ptr(),
            2,
            AUTO.as_ptr(),
            cells.as_mut_ptr(),
            3,
        )
    };
    assert_eq!(written, 3);
    let order: Vec<(i32, i32)> = cells.iter().map(|c| (c.from_index, c.to_index)).collect();
    assert_eq!(order, vec![(0, 0), (0, 1), (1, 0)]);
    assert_eq!(cells[0].distance_m, 1500.0);
}

#[rstest]
fn node_count_reads_engine_status() {
    let ctx = scripted(StubEngine::new().respond(EngineAction::Status, status_response(Some(1234))));
    // SAFETY: `ctx` is live.
    assert_eq!(unsafe { wayfind_node_count(&ctx) }, 1234);
    // SAFETY: `ctx` is live.
    assert_eq!(unsafe { wayfind_unload(&ctx) }, 1);
    // SAFETY: `ctx` is live.
    assert_eq!(unsafe { wayfind_node_count(&ctx) }, -2);
}

#[rstest]
fn raw_request_round_trips_json() {
    let ctx = scripted(StubEngine::new().respond(EngineAction::Status, status_response(Some(7))));
    // SAFETY: strings are terminated; the response is freed below.
    unsafe {
        let response: *mut c_char = wayfind_request(&ctx, c"status".as_ptr(), c"{}".as_ptr());
        assert!(!response.is_null());
        let text = CStr::from_ptr(response).to_str().expect("UTF-8 response");
        let value: serde_json::Value = serde_json::from_str(text).expect("JSON response");
        assert_eq!(value["node_count"], 7);
        wayfind_free_string(response);

        let rejected = wayfind_request(&ctx, c"teleport".as_ptr(), c"{}".as_ptr());
        assert!(rejected.is_null());
        assert!(last_error().contains("teleport"));
    }
}

#[rstest]
fn linestring_encoding_is_capacity_bounded() {
    let points: Vec<RoutePoint> = path(3).into_iter().map(RoutePoint::from).collect();
    let needed = wayfind_linestring_wkb_len(3);
    assert_eq!(needed, 57);

    let mut small = [0_u8; 56];
    // SAFETY: buffers are live for their stated lengths.
    let status = unsafe {
        wayfind_encode_linestring(points.as_ptr(), 3, small.as_mut_ptr(), 56)
    };
    assert_eq!(status, -1);
    assert!(small.iter().all(|&b| b == 0), "nothing written on failure");

    let mut exact = vec![0_u8; 57];
    // SAFETY: buffers are live for their stated lengths.
    let written = unsafe {
        wayfind_encode_linestring(points.as_ptr(), 3, exact.as_mut_ptr(), 57)
    };
    assert_eq!(written, 57);
    assert_eq!(exact[0], 1, "little-endian flag");
    assert_eq!(LittleEndian::read_u32(&exact[1..5]), 2);
    assert_eq!(decode_linestring(&exact).expect("decodes"), path(3));
}

#[rstest]
fn version_is_a_c_string() {
    // SAFETY: the version string is static and terminated.
    let version = unsafe { CStr::from_ptr(wayfind_version()) };
    assert_eq!(
        version.to_str().expect("UTF-8 version"),
        env!("CARGO_PKG_VERSION")
    );
}
