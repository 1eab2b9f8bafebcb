//! Endpoint resolution for geometry-addressed routes.

use log::debug;

use crate::geometry::{
    Centroid, GeometryDecodeError, GeometryEncoding, GeometryInput, classify, extract,
};

/// Which request family a geometry route is dispatched through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestPath {
    /// At least one endpoint arrived as text; the pair is treated as text.
    Text,
    /// Both endpoints arrived as binary geometry.
    Binary,
}

/// Both endpoints of a route, resolved to coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedEndpoints {
    /// Origin centroid.
    pub from: Centroid,
    /// Destination centroid.
    pub to: Centroid,
    /// Request family chosen for the pair.
    pub path: RequestPath,
}

/// Resolve two geometry payloads to route endpoints.
///
/// Each endpoint is classified and extracted on its own; both must succeed.
/// When the encodings differ between text and binary the text path is used.
///
/// # Errors
///
/// The first [`GeometryDecodeError`], origin before destination.
///
/// # Examples
/// ```
/// use wayfind_core::geometry::GeometryInput;
/// use wayfind_core::routing::{resolve_endpoints, RequestPath};
///
/// # fn main() -> Result<(), wayfind_core::geometry::GeometryDecodeError> {
/// let resolved = resolve_endpoints(
///     &GeometryInput::text("POINT(12.45 43.94)"),
///     &GeometryInput::text("POINT(12.44 43.93)"),
/// )?;
/// assert_eq!(resolved.path, RequestPath::Text);
/// assert_eq!(resolved.to.coordinate.lon, 12.44);
/// # Ok(())
/// # }
/// ```
pub fn resolve_endpoints(
    from: &GeometryInput<'_>,
    to: &GeometryInput<'_>,
) -> Result<ResolvedEndpoints, GeometryDecodeError> {
    let from_geometry = classify(from);
    let to_geometry = classify(to);
    let from_centroid = extract(&from_geometry)?;
    let to_centroid = extract(&to_geometry)?;
    let path = request_path(from_geometry.encoding, to_geometry.encoding);
    debug!(
        "resolved endpoints {:?} -> {:?} via {path:?} path",
        from_geometry.encoding, to_geometry.encoding
    );
    Ok(ResolvedEndpoints {
        from: from_centroid,
        to: to_centroid,
        path,
    })
}

/// Choose the request family for a pair of encodings.
#[must_use]
pub const fn request_path(from: GeometryEncoding, to: GeometryEncoding) -> RequestPath {
    if from.is_binary() && to.is_binary() {
        RequestPath::Binary
    } else {
        RequestPath::Text
    }
}
