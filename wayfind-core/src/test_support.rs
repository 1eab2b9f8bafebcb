//! Scripted engine and response builders for unit and behaviour tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Value, json};

use crate::coordinate::Coordinate;
use crate::engine::{EngineAction, EngineError, RoutingEngine, polyline};

/// One scripted answer.
#[derive(Debug, Clone, PartialEq)]
pub enum StubReply {
    /// Return this document.
    Json(Value),
    /// Fail with this error.
    Error(EngineError),
}

/// A call received by a [`StubEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Action requested.
    pub action: EngineAction,
    /// Request document.
    pub request: Value,
}

/// Shared record of calls, readable after the engine moves into a context.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<RecordedCall>>>);

impl CallLog {
    /// Every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Actions requested so far, in order.
    #[must_use]
    pub fn actions(&self) -> Vec<EngineAction> {
        self.calls().into_iter().map(|call| call.action).collect()
    }

    /// Number of calls so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no call has been made.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, call: RecordedCall) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

/// In-memory [`RoutingEngine`] answering from per-action scripts.
///
/// Replies queued for an action are consumed in order; the last one is
/// repeated once the queue is down to it. Unscripted actions fail with
/// [`EngineError::Transport`].
#[derive(Debug, Clone)]
pub struct StubEngine {
    replies: HashMap<EngineAction, VecDeque<StubReply>>,
    ready: bool,
    log: CallLog,
}

impl Default for StubEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StubEngine {
    /// A ready engine with no scripts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            ready: true,
            log: CallLog::default(),
        }
    }

    /// Queue a successful reply for `action`.
    #[must_use]
    pub fn respond(self, action: EngineAction, response: Value) -> Self {
        self.reply(action, StubReply::Json(response))
    }

    /// Queue a failure for `action`.
    #[must_use]
    pub fn fail(self, action: EngineAction, error: EngineError) -> Self {
        self.reply(action, StubReply::Error(error))
    }

    /// Queue any reply for `action`.
    #[must_use]
    pub fn reply(mut self, action: EngineAction, reply: StubReply) -> Self {
        self.replies.entry(action).or_default().push_back(reply);
        self
    }

    /// Report the engine as loaded but not ready.
    #[must_use]
    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    /// Handle on the call record.
    #[must_use]
    pub fn call_log(&self) -> CallLog {
        self.log.clone()
    }
}

impl RoutingEngine for StubEngine {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn execute(&mut self, action: EngineAction, request: &Value) -> Result<Value, EngineError> {
        self.log.record(RecordedCall {
            action,
            request: request.clone(),
        });
        let queue = self.replies.get_mut(&action);
        let reply = queue.and_then(|replies| {
            if replies.len() > 1 {
                replies.pop_front()
            } else {
                replies.front().cloned()
            }
        });
        match reply {
            Some(StubReply::Json(value)) => Ok(value),
            Some(StubReply::Error(error)) => Err(error),
            None => Err(EngineError::Transport {
                message: format!("no scripted reply for {action}"),
            }),
        }
    }
}

/// A `route` response with the given summary and one shape per leg.
#[must_use]
pub fn route_response(distance_km: f64, time_s: f64, legs: &[&[Coordinate]]) -> Value {
    let shapes: Vec<Value> = legs
        .iter()
        .map(|points| json!({ "shape": polyline::encode(points) }))
        .collect();
    json!({
        "trip": {
            "summary": { "length": distance_km, "time": time_s },
            "legs": shapes,
            "units": "kilometers",
        }
    })
}

/// A `sources_to_targets` response; `None` cells are unreachable.
#[must_use]
pub fn matrix_response(rows: &[Vec<Option<(f64, f64)>>]) -> Value {
    let cells: Vec<Value> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| {
                    cell.map_or_else(
                        || json!({ "distance": null, "time": null }),
                        |(distance_km, time_s)| json!({ "distance": distance_km, "time": time_s }),
                    )
                })
                .collect()
        })
        .collect();
    json!({ "sources_to_targets": cells })
}

/// A uniform `rows x cols` matrix response.
#[must_use]
pub fn uniform_matrix_response(rows: usize, cols: usize, distance_km: f64, time_s: f64) -> Value {
    matrix_response(&vec![vec![Some((distance_km, time_s)); cols]; rows])
}

/// An `isochrone` response with one polygon per `(minutes, ring)`.
#[must_use]
pub fn isochrone_response(contours: &[(f64, Vec<Coordinate>)]) -> Value {
    let features: Vec<Value> = contours
        .iter()
        .map(|(minutes, ring)| {
            let positions: Vec<[f64; 2]> = ring.iter().map(|c| [c.lon, c.lat]).collect();
            json!({
                "type": "Feature",
                "properties": { "contour": minutes, "metric": "time" },
                "geometry": { "type": "Polygon", "coordinates": [positions] },
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

/// A `locate` response snapping to `edge`, or finding nothing.
#[must_use]
pub fn locate_response(edge: Option<Coordinate>) -> Value {
    let edges: Vec<Value> = edge
        .into_iter()
        .map(|c| json!({ "correlated_lat": c.lat, "correlated_lon": c.lon }))
        .collect();
    json!([{ "edges": edges }])
}

/// A `status` response, optionally reporting a node count.
#[must_use]
pub fn status_response(node_count: Option<u64>) -> Value {
    node_count.map_or_else(
        || json!({ "version": "3.5.0" }),
        |count| json!({ "version": "3.5.0", "node_count": count }),
    )
}

/// An engine error document.
#[must_use]
pub fn error_response(code: i64, message: &str) -> Value {
    json!({ "error_code": code, "error": message, "status_code": 400 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn queued_replies_repeat_the_last() {
        let mut engine = StubEngine::new()
            .fail(EngineAction::Route, EngineError::Timeout)
            .respond(EngineAction::Route, json!({ "ok": 1 }));
        let request = json!({});
        assert_eq!(
            engine.execute(EngineAction::Route, &request),
            Err(EngineError::Timeout)
        );
        assert_eq!(
            engine.execute(EngineAction::Route, &request),
            Ok(json!({ "ok": 1 }))
        );
        assert_eq!(
            engine.execute(EngineAction::Route, &request),
            Ok(json!({ "ok": 1 }))
        );
        assert_eq!(engine.call_log().len(), 3);
    }

    #[rstest]
    fn unscripted_action_fails() {
        let mut engine = StubEngine::new();
        assert!(matches!(
            engine.execute(EngineAction::Height, &json!({})),
            Err(EngineError::Transport { .. })
        ));
    }
}
