//! Bind-then-execute matrix runs with paged output.
//!
//! [`MatrixBind`] validates and owns the inputs. [`MatrixRunner::execute`]
//! issues exactly one `sources_to_targets` request, buffers every entry and
//! then hands them out in pages of a fixed size.

use log::debug;

use super::context::RoutingContext;
use crate::coordinate::Coordinate;
use crate::costing::Costing;
use crate::engine::RoutingEngine;
use crate::error::RoutingError;
use crate::route::MatrixEntry;

/// Rows handed out per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 2048;

/// Validated, immutable inputs for one matrix run.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixBind {
    sources: Vec<Coordinate>,
    targets: Vec<Coordinate>,
    costing: Costing,
}

impl MatrixBind {
    /// Bind parallel latitude and longitude arrays.
    ///
    /// # Errors
    ///
    /// [`RoutingError::InvalidArgument`] when a latitude array and its
    /// longitude array differ in length or a coordinate is out of range.
    ///
    /// # Examples
    /// ```
    /// use wayfind_core::{Costing, MatrixBind};
    ///
    /// # fn main() -> Result<(), wayfind_core::RoutingError> {
    /// let bind = MatrixBind::new(&[43.94, 43.93], &[12.45, 12.44], &[43.9], &[12.4], Costing::Auto)?;
    /// assert_eq!(bind.expected_len(), 2);
    /// assert!(MatrixBind::new(&[43.94], &[], &[], &[], Costing::Auto).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        source_lats: &[f64],
        source_lons: &[f64],
        target_lats: &[f64],
        target_lons: &[f64],
        costing: Costing,
    ) -> Result<Self, RoutingError> {
        let sources = zip_coordinates("source", source_lats, source_lons)?;
        let targets = zip_coordinates("target", target_lats, target_lons)?;
        Ok(Self {
            sources,
            targets,
            costing,
        })
    }

    /// Bind coordinate lists directly.
    ///
    /// # Errors
    ///
    /// [`RoutingError::InvalidArgument`] when a coordinate is out of range.
    pub fn from_coordinates(
        sources: Vec<Coordinate>,
        targets: Vec<Coordinate>,
        costing: Costing,
    ) -> Result<Self, RoutingError> {
        if let Some(bad) = sources.iter().chain(&targets).find(|c| !c.is_valid()) {
            return Err(RoutingError::invalid(format!(
                "coordinate out of range: lat={}, lon={}",
                bad.lat, bad.lon
            )));
        }
        Ok(Self {
            sources,
            targets,
            costing,
        })
    }

    /// Source coordinates.
    #[must_use]
    pub fn sources(&self) -> &[Coordinate] {
        &self.sources
    }

    /// Target coordinates.
    #[must_use]
    pub fn targets(&self) -> &[Coordinate] {
        &self.targets
    }

    /// Costing model.
    #[must_use]
    pub const fn costing(&self) -> Costing {
        self.costing
    }

    /// Number of entries a run will produce.
    #[must_use]
    pub fn expected_len(&self) -> usize {
        self.sources.len().saturating_mul(self.targets.len())
    }
}

fn zip_coordinates(
    role: &str,
    lats: &[f64],
    lons: &[f64],
) -> Result<Vec<Coordinate>, RoutingError> {
    if lats.len() != lons.len() {
        return Err(RoutingError::invalid(format!(
            "{role} latitudes ({}) and longitudes ({}) differ in length",
            lats.len(),
            lons.len()
        )));
    }
    lats.iter()
        .zip(lons)
        .map(|(&lat, &lon)| {
            Coordinate::new(lat, lon).map_err(|e| RoutingError::invalid(format!("{role} {e}")))
        })
        .collect()
}

/// Buffered matrix results streamed out page by page.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRunner {
    entries: Vec<MatrixEntry>,
    cursor: usize,
    page_size: usize,
}

impl MatrixRunner {
    /// Run `bind` against the engine in `context`.
    ///
    /// # Errors
    ///
    /// Any error from [`RoutingContext::matrix`].
    pub fn execute<E: RoutingEngine>(
        bind: &MatrixBind,
        context: &RoutingContext<E>,
    ) -> Result<Self, RoutingError> {
        let entries = context.matrix(&bind.sources, &bind.targets, bind.costing)?;
        debug!(
            "matrix run buffered {} entries ({}x{})",
            entries.len(),
            bind.sources.len(),
            bind.targets.len()
        );
        Ok(Self::from_entries(entries))
    }

    /// Wrap already computed entries.
    #[must_use]
    pub const fn from_entries(entries: Vec<MatrixEntry>) -> Self {
        Self {
            entries,
            cursor: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the page size; zero is treated as one.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// The configured page size.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Hand out the next page. Empty once every entry has been read.
    pub fn next_page(&mut self) -> &[MatrixEntry] {
        let start = self.cursor;
        let end = start.saturating_add(self.page_size).min(self.entries.len());
        self.cursor = end;
        self.entries.get(start..end).unwrap_or_default()
    }

    /// Whether every entry has been handed out.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.cursor >= self.entries.len()
    }

    /// Total buffered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the run produced no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.entries.len().saturating_sub(self.cursor)
    }
}
