//! C-linkage boundary for wayfind.
//!
//! Every exported function takes an opaque [`WayfindContext`] handle and
//! reports failure through sentinel integers: `-2` when no engine is loaded
//! and `-1` for anything else. The reason for the most recent failure on the
//! calling thread is available from [`wayfind_last_error`].
//!
//! Output buffers are owned by the caller. Functions never write past the
//! stated capacity, reject null pointers and negative lengths with `-1`, and
//! never unwind across the boundary.

mod error;
mod handle;
mod raw;
mod records;

use std::ffi::{CString, c_char};
use std::ptr;
use std::str::FromStr;

use camino::Utf8Path;
use log::info;
use wayfind_core::geometry::{LINESTRING_HEADER_LEN, PAIR_LEN, encode_linestring};
use wayfind_core::{
    Coordinate, EngineAction, MatrixBind, MatrixRunner, RouteSummary, RoutingError,
    STATUS_FAILED, STATUS_OK,
};
use wayfind_data::load_http_engine;

pub use error::{BoundaryError, FfiError};
pub use handle::WayfindContext;
pub use records::{IsochronePoint, MatrixCell, RoutePoint, RouteResult};

use error::{clear_last_error, last_error_ptr, record};
use raw::{c_str, costing_arg, length, out, saturating_count, shield, slice, slice_mut};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// Run `body`, recording a failure and converting its status with `fail`.
fn guarded_as<T>(fail: impl Fn(i32) -> T, body: impl FnOnce() -> Result<T, FfiError>) -> T {
    shield(fail(STATUS_FAILED), || {
        body().map_or_else(
            |err| fail(record(&err)),
            |value| {
                clear_last_error();
                value
            },
        )
    })
}

fn guarded(body: impl FnOnce() -> Result<i32, FfiError>) -> i32 {
    guarded_as(|status| status, body)
}

fn write_route(
    summary: &RouteSummary,
    out_result: &mut RouteResult,
    out_points: &mut [RoutePoint],
) -> i32 {
    for (slot, point) in out_points.iter_mut().zip(&summary.points) {
        *slot = RoutePoint::from(*point);
    }
    let written = saturating_count(out_points.len().min(summary.points.len()));
    *out_result = RouteResult::from_summary(summary, written);
    written
}

/// Create a context with no engine loaded.
///
/// Release it with [`wayfind_context_free`]. Returns null only if
/// allocation fails.
#[unsafe(no_mangle)]
pub extern "C" fn wayfind_context_new() -> *mut WayfindContext {
    shield(ptr::null_mut(), || Box::into_raw(Box::new(WayfindContext::new())))
}

/// Release a context and any engine it holds.
///
/// # Safety
///
/// `ctx` must be null or a pointer returned by [`wayfind_context_new`] that
/// has not already been freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wayfind_context_free(ctx: *mut WayfindContext) {
    if ctx.is_null() {
        return;
    }
    // SAFETY: the pointer came from `Box::into_raw` and is freed once.
    let owned = unsafe { Box::from_raw(ctx) };
    shield((), || drop(owned));
}

/// Load the engine configured at `config_path` for `mode`.
///
/// A path ending in `.json` names the configuration file; any other path
/// names a directory holding `valhalla.json`. Loading the loaded path again
/// does nothing. `mode` must be a known costing name.
///
/// Returns `0` on success and `-1` on failure.
///
/// # Safety
///
/// `ctx` must be a live handle; `config_path` and `mode` must be
/// null-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wayfind_load(
    ctx: *const WayfindContext,
    config_path: *const c_char,
    mode: *const c_char,
) -> i32 {
    guarded(|| {
        // SAFETY: forwarded caller contract.
        let context = unsafe { handle::context(ctx) }?;
        // SAFETY: forwarded caller contract.
        let path = unsafe { c_str("config_path", config_path) }?;
        // SAFETY: forwarded caller contract.
        let costing = unsafe { costing_arg(mode) }?;
        let outcome = load_http_engine(context.routing(), Utf8Path::new(path))?;
        info!("engine load for {costing} from {path}: {outcome:?}");
        Ok(STATUS_OK)
    })
}

/// Whether an engine is loaded and ready: `1` if so, `0` otherwise.
///
/// # Safety
///
/// `ctx` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wayfind_is_loaded(ctx: *const WayfindContext) -> i32 {
    shield(0, || {
        // SAFETY: forwarded caller contract.
        unsafe { handle::context(ctx) }.map_or(0, |context| i32::from(context.routing().is_loaded()))
    })
}

/// Drop the loaded engine. Returns `1` if one was loaded, `0` if not.
///
/// # Safety
///
/// `ctx` must be a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wayfind_unload(ctx: *const WayfindContext) -> i32 {
    guarded(|| {
        // SAFETY: forwarded caller contract.
        let context = unsafe { handle::context(ctx) }?;
        Ok(i32::from(context.routing().unload()))
    })
}

/// Number of nodes in the loaded graph, or `-1`/`-2`.
///
/// # Safety
///
/// `ctx` must be a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wayfind_node_count(ctx: *const WayfindContext) -> i64 {
    guarded_as(i64::from, || {
        // SAFETY: forwarded caller contract.
        let context = unsafe { handle::context(ctx) }?;
        let nodes = context.routing().node_count()?;
        Ok(i64::try_from(nodes).unwrap_or(i64::MAX))
    })
}

/// Travel time in seconds between two points.
///
/// Returns `-1.0` when no route is found or input is invalid and `-2.0`
/// when no engine is loaded.
///
/// # Safety
///
/// `ctx` must be a live handle and `mode` a null-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wayfind_travel_time(
    ctx: *const WayfindContext,
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
    mode: *const c_char,
) -> f64 {
    guarded_as(f64::from, || {
        // SAFETY: forwarded caller contract.
        let context = unsafe { handle::context(ctx) }?;
        // SAFETY: forwarded caller contract.
        let costing = unsafe { costing_arg(mode) }?;
        let from = Coordinate { lat: lat1, lon: lon1 };
        let to = Coordinate { lat: lat2, lon: lon2 };
        Ok(context.routing().travel_time(from, to, costing)?)
    })
}

/// Travel times for `count` origin and destination pairs.
///
/// Writes one value per pair into `results`, `-1.0` for pairs that could
/// not be routed. Returns the number of successful pairs, or `-1`/`-2`.
///
/// # Safety
///
/// `ctx` must be a live handle, the four coordinate arrays must hold `count`
/// readable values, `results` must hold `count` writable values and `mode`
/// must be a null-terminated string.
#[unsafe(no_mangle)]
#[expect(clippy::too_many_arguments, reason = "mirrors the C signature")]
pub unsafe extern "C" fn wayfind_batch_travel_time(
    ctx: *const WayfindContext,
    lats1: *const f64,
    lons1: *const f64,
    lats2: *const f64,
    lons2: *const f64,
    results: *mut f64,
    count: i32,
    mode: *const c_char,
) -> i32 {
    guarded(|| {
        // SAFETY: forwarded caller contract.
        let context = unsafe { handle::context(ctx) }?;
        let len = length("count", count)?;
        // SAFETY: forwarded caller contract for every array below.
        let (from_lats, from_lons, to_lats, to_lons, out_seconds) = unsafe {
            (
                slice("lats1", lats1, len)?,
                slice("lons1", lons1, len)?,
                slice("lats2", lats2, len)?,
                slice("lons2", lons2, len)?,
                slice_mut("results", results, len)?,
            )
        };
        // SAFETY: forwarded caller contract.
        let costing = unsafe { costing_arg(mode) }?;
        let origins = pairs(from_lats, from_lons);
        let destinations = pairs(to_lats, to_lons);
        let batch = context
            .routing()
            .batch_travel_time(&origins, &destinations, costing)?;
        for (slot, seconds) in out_seconds.iter_mut().zip(&batch.seconds) {
            *slot = *seconds;
        }
        Ok(saturating_count(batch.successes))
    })
}

fn pairs(lats: &[f64], lons: &[f64]) -> Vec<Coordinate> {
    lats.iter()
        .zip(lons)
        .map(|(&lat, &lon)| Coordinate { lat, lon })
        .collect()
}

/// Snap a point to the nearest road.
///
/// Returns `0` and writes the snapped point and its distance in metres on
/// success, or `-1`/`-2`.
///
/// # Safety
///
/// `ctx` must be a live handle, `mode` a null-terminated string and the
/// three output pointers writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wayfind_snap(
    ctx: *const WayfindContext,
    lat: f64,
    lon: f64,
    mode: *const c_char,
    out_lat: *mut f64,
    out_lon: *mut f64,
    out_distance_m: *mut f64,
) -> i32 {
    guarded(|| {
        // SAFETY: forwarded caller contract for the handle and outputs.
        let (context, lat_slot, lon_slot, distance_slot) = unsafe {
            (
                handle::context(ctx)?,
                out("out_lat", out_lat)?,
                out("out_lon", out_lon)?,
                out("out_distance_m", out_distance_m)?,
            )
        };
        // SAFETY: forwarded caller contract.
        let costing = unsafe { costing_arg(mode) }?;
        let snapped = context.routing().locate(Coordinate { lat, lon }, costing)?;
        *lat_slot = snapped.coordinate.lat;
        *lon_slot = snapped.coordinate.lon;
        *distance_slot = snapped.distance_m;
        Ok(STATUS_OK)
    })
}

/// Boundary of the area reachable from a point within `max_seconds`.
///
/// Writes up to `max_results` `(lat, lon, seconds)` vertices and returns the
/// number written, or `-1`/`-2`.
///
/// # Safety
///
/// `ctx` must be a live handle, `mode` a null-terminated string and
/// `out_results` writable for `max_results` records.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wayfind_isochrone(
    ctx: *const WayfindContext,
    lat: f64,
    lon: f64,
    max_seconds: f64,
    mode: *const c_char,
    out_results: *mut IsochronePoint,
    max_results: i32,
) -> i32 {
    guarded(|| {
        // SAFETY: forwarded caller contract.
        let context = unsafe { handle::context(ctx) }?;
        let capacity = length("max_results", max_results)?;
        // SAFETY: forwarded caller contract.
        let buffer = unsafe { slice_mut("out_results", out_results, capacity) }?;
        // SAFETY: forwarded caller contract.
        let costing = unsafe { costing_arg(mode) }?;
        let contours =
            context
                .routing()
                .isochrone(Coordinate { lat, lon }, &[max_seconds], costing)?;
        let mut written = 0_usize;
        for (slot, vertex) in buffer
            .iter_mut()
            .zip(contours.iter().flat_map(IsochronePoint::vertices))
        {
            *slot = vertex;
            written += 1;
        }
        Ok(saturating_count(written))
    })
}

/// Route between two points, writing up to `max_points` path points.
///
/// Returns the number of points written, or `-1`/`-2`. A path longer than
/// the buffer is truncated; `out_result` still reports the full distance
/// and duration.
///
/// # Safety
///
/// `ctx` must be a live handle, `mode` a null-terminated string,
/// `out_result` writable and `out_points` writable for `max_points` records.
#[unsafe(no_mangle)]
#[expect(clippy::too_many_arguments, reason = "mirrors the C signature")]
pub unsafe extern "C" fn wayfind_route(
    ctx: *const WayfindContext,
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
    mode: *const c_char,
    out_result: *mut RouteResult,
    out_points: *mut RoutePoint,
    max_points: i32,
) -> i32 {
    guarded(|| {
        let capacity = length("max_points", max_points)?;
        // SAFETY: forwarded caller contract for the handle and outputs.
        let (context, result_slot, points) = unsafe {
            (
                handle::context(ctx)?,
                out("out_result", out_result)?,
                slice_mut("out_points", out_points, capacity)?,
            )
        };
        // SAFETY: forwarded caller contract.
        let costing = unsafe { costing_arg(mode) }?;
        let from = Coordinate { lat: lat1, lon: lon1 };
        let to = Coordinate { lat: lat2, lon: lon2 };
        let summary = context.routing().route(from, to, costing, capacity)?;
        Ok(write_route(&summary, result_slot, points))
    })
}

/// Route between the centroids of two WKT geometries.
///
/// Behaves as [`wayfind_route`] otherwise.
///
/// # Safety
///
/// As for [`wayfind_route`]; `from_wkt` and `to_wkt` must be null-terminated
/// strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wayfind_route_wkt(
    ctx: *const WayfindContext,
    from_wkt: *const c_char,
    to_wkt: *const c_char,
    mode: *const c_char,
    out_result: *mut RouteResult,
    out_points: *mut RoutePoint,
    max_points: i32,
) -> i32 {
    guarded(|| {
        let capacity = length("max_points", max_points)?;
        // SAFETY: forwarded caller contract for every pointer below.
        let (context, from, to, result_slot, points) = unsafe {
            (
                handle::context(ctx)?,
                c_str("from_wkt", from_wkt)?,
                c_str("to_wkt", to_wkt)?,
                out("out_result", out_result)?,
                slice_mut("out_points", out_points, capacity)?,
            )
        };
        // SAFETY: forwarded caller contract.
        let costing = unsafe { costing_arg(mode) }?;
        let summary = context.routing().route_wkt(from, to, costing, capacity)?;
        Ok(write_route(&summary, result_slot, points))
    })
}

/// Route between the centroids of two binary geometries.
///
/// Accepts standard WKB, EWKB and the columnar engine encoding. Behaves as
/// [`wayfind_route`] otherwise.
///
/// # Safety
///
/// As for [`wayfind_route`]; `from_wkb` and `to_wkb` must be readable for
/// their stated lengths.
#[unsafe(no_mangle)]
#[expect(clippy::too_many_arguments, reason = "mirrors the C signature")]
pub unsafe extern "C" fn wayfind_route_wkb(
    ctx: *const WayfindContext,
    from_wkb: *const u8,
    from_wkb_len: i32,
    to_wkb: *const u8,
    to_wkb_len: i32,
    mode: *const c_char,
    out_result: *mut RouteResult,
    out_points: *mut RoutePoint,
    max_points: i32,
) -> i32 {
    guarded(|| {
        let capacity = length("max_points", max_points)?;
        let from_len = length("from_wkb_len", from_wkb_len)?;
        let to_len = length("to_wkb_len", to_wkb_len)?;
        // SAFETY: forwarded caller contract for every pointer below.
        let (context, from, to, result_slot, points) = unsafe {
            (
                handle::context(ctx)?,
                slice("from_wkb", from_wkb, from_len)?,
                slice("to_wkb", to_wkb, to_len)?,
                out("out_result", out_result)?,
                slice_mut("out_points", out_points, capacity)?,
            )
        };
        // SAFETY: forwarded caller contract.
        let costing = unsafe { costing_arg(mode) }?;
        let summary = context.routing().route_wkb(from, to, costing, capacity)?;
        Ok(write_route(&summary, result_slot, points))
    })
}

/// Many-to-many distance and duration matrix.
///
/// Writes up to `capacity` cells in row-major order and returns the number
/// written, or `-1`/`-2`. Unreachable cells carry `-1`.
///
/// # Safety
///
/// `ctx` must be a live handle, the source arrays readable for `src_count`
/// values, the target arrays readable for `dst_count` values, `mode` a
/// null-terminated string and `out_entries` writable for `capacity` cells.
#[unsafe(no_mangle)]
#[expect(clippy::too_many_arguments, reason = "mirrors the C signature")]
pub unsafe extern "C" fn wayfind_matrix(
    ctx: *const WayfindContext,
    src_lats: *const f64,
    src_lons: *const f64,
    src_count: i32,
    dst_lats: *const f64,
    dst_lons: *const f64,
    dst_count: i32,
    mode: *const c_char,
    out_entries: *mut MatrixCell,
    capacity: i32,
) -> i32 {
    guarded(|| {
        let sources = length("src_count", src_count)?;
        let targets = length("dst_count", dst_count)?;
        let limit = length("capacity", capacity)?;
        // SAFETY: forwarded caller contract for every pointer below.
        let (context, source_lats, source_lons, target_lats, target_lons, cells) = unsafe {
            (
                handle::context(ctx)?,
                slice("src_lats", src_lats, sources)?,
                slice("src_lons", src_lons, sources)?,
                slice("dst_lats", dst_lats, targets)?,
                slice("dst_lons", dst_lons, targets)?,
                slice_mut("out_entries", out_entries, limit)?,
            )
        };
        // SAFETY: forwarded caller contract.
        let costing = unsafe { costing_arg(mode) }?;
        let bind = MatrixBind::new(source_lats, source_lons, target_lats, target_lons, costing)?;
        let mut runner = MatrixRunner::execute(&bind, context.routing())?;
        let mut written = 0_usize;
        let mut slots = cells.iter_mut();
        while !runner.is_done() {
            for entry in runner.next_page() {
                let Some(slot) = slots.next() else {
                    return Ok(saturating_count(written));
                };
                *slot = MatrixCell::from(entry);
                written += 1;
            }
        }
        Ok(saturating_count(written))
    })
}

/// Number of bytes [`wayfind_encode_linestring`] needs for `count` points,
/// or `-1` for a negative count.
#[unsafe(no_mangle)]
pub extern "C" fn wayfind_linestring_wkb_len(count: i32) -> i32 {
    guarded(|| {
        let points = length("count", count)?;
        let needed = points
            .saturating_mul(PAIR_LEN)
            .saturating_add(LINESTRING_HEADER_LEN);
        Ok(saturating_count(needed))
    })
}

/// Encode `count` points as a little-endian WKB linestring.
///
/// Returns the number of bytes written, or `-1` when `out` is too small.
/// Nothing is written on failure.
///
/// # Safety
///
/// `points` must be readable for `count` records and `out` writable for
/// `capacity` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wayfind_encode_linestring(
    points: *const RoutePoint,
    count: i32,
    out: *mut u8,
    capacity: i32,
) -> i32 {
    guarded(|| {
        let len = length("count", count)?;
        let limit = length("capacity", capacity)?;
        // SAFETY: forwarded caller contract for both buffers.
        let (input, buffer) =
            unsafe { (slice("points", points, len)?, slice_mut("out", out, limit)?) };
        let coordinates: Vec<Coordinate> = input.iter().copied().map(Coordinate::from).collect();
        let bytes = encode_linestring(&coordinates);
        let target = buffer
            .get_mut(..bytes.len())
            .ok_or(BoundaryError::BufferTooSmall {
                name: "out",
                capacity: limit,
                needed: bytes.len(),
            })?;
        target.copy_from_slice(&bytes);
        Ok(saturating_count(bytes.len()))
    })
}

/// Send a raw JSON request to the engine.
///
/// Returns the JSON response, to be released with [`wayfind_free_string`],
/// or null on failure.
///
/// # Safety
///
/// `ctx` must be a live handle; `action` and `request_json` must be
/// null-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wayfind_request(
    ctx: *const WayfindContext,
    action: *const c_char,
    request_json: *const c_char,
) -> *mut c_char {
    guarded_as(
        |_| ptr::null_mut(),
        || {
            // SAFETY: forwarded caller contract for every pointer below.
            let (context, name, request) = unsafe {
                (
                    handle::context(ctx)?,
                    c_str("action", action)?,
                    c_str("request_json", request_json)?,
                )
            };
            let engine_action = EngineAction::from_str(name).map_err(RoutingError::from)?;
            let response = context.routing().raw_request(engine_action, request)?;
            let text = CString::new(response).map_err(|err| RoutingError::invalid(err.to_string()))?;
            Ok(text.into_raw())
        },
    )
}

/// Release a string returned by [`wayfind_request`].
///
/// # Safety
///
/// `text` must be null or a pointer returned by [`wayfind_request`] that has
/// not already been released.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wayfind_free_string(text: *mut c_char) {
    if !text.is_null() {
        // SAFETY: the pointer came from `CString::into_raw` and is freed once.
        drop(unsafe { CString::from_raw(text) });
    }
}

/// Message describing the last failure on this thread, or null.
///
/// The string is owned by the library and stays valid until the next call
/// on this thread.
#[unsafe(no_mangle)]
pub extern "C" fn wayfind_last_error() -> *const c_char {
    last_error_ptr()
}

/// Library version as a static null-terminated string.
#[unsafe(no_mangle)]
pub extern "C" fn wayfind_version() -> *const c_char {
    VERSION.as_ptr().cast()
}
