//! Named operations accepted by the routing engine.

use serde::{Deserialize, Serialize};

use super::error::EngineError;

/// An engine endpoint. Each action takes and returns a JSON document.
///
/// # Examples
/// ```
/// use wayfind_core::engine::EngineAction;
///
/// assert_eq!("matrix".parse::<EngineAction>().ok(), Some(EngineAction::SourcesToTargets));
/// assert_eq!(EngineAction::TraceRoute.as_str(), "trace_route");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineAction {
    /// Point-to-point route with shape.
    Route,
    /// Many-to-many distance and time matrix.
    SourcesToTargets,
    /// Reachability contours.
    Isochrone,
    /// Nearest graph edges for a location.
    Locate,
    /// Map-match a trace into a route.
    TraceRoute,
    /// Map-match a trace and report edge attributes.
    TraceAttributes,
    /// Route visiting locations in optimal order.
    OptimizedRoute,
    /// Elevation lookup.
    Height,
    /// Engine health and graph statistics.
    Status,
}

impl EngineAction {
    /// Every action, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Route,
        Self::SourcesToTargets,
        Self::Isochrone,
        Self::Locate,
        Self::TraceRoute,
        Self::TraceAttributes,
        Self::OptimizedRoute,
        Self::Height,
        Self::Status,
    ];

    /// The endpoint name used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::SourcesToTargets => "sources_to_targets",
            Self::Isochrone => "isochrone",
            Self::Locate => "locate",
            Self::TraceRoute => "trace_route",
            Self::TraceAttributes => "trace_attributes",
            Self::OptimizedRoute => "optimized_route",
            Self::Height => "height",
            Self::Status => "status",
        }
    }
}

impl std::fmt::Display for EngineAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EngineAction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "matrix" {
            return Ok(Self::SourcesToTargets);
        }
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == wanted)
            .ok_or_else(|| EngineError::UnknownAction { name: s.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("route", EngineAction::Route)]
    #[case("matrix", EngineAction::SourcesToTargets)]
    #[case("sources_to_targets", EngineAction::SourcesToTargets)]
    #[case(" Status ", EngineAction::Status)]
    fn parses_action_names(#[case] name: &str, #[case] expected: EngineAction) {
        assert_eq!(name.parse::<EngineAction>(), Ok(expected));
    }

    #[rstest]
    fn unknown_action_is_reported_by_name() {
        assert_eq!(
            "teleport".parse::<EngineAction>(),
            Err(EngineError::UnknownAction {
                name: "teleport".to_owned()
            })
        );
    }
}
