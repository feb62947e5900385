//! Metric declarations for the growthlimit parcel picker.
//!
//! Every metric the session records is declared once in [`metric_defs`] as a
//! const [`Metric`], so names cannot drift between the recording site and
//! dashboards. The `metrics` facade is re-exported; without an installed
//! recorder all recordings are no-ops.
//!
//! ```rust
//! use growthlimit_metrics::{metric_defs, NeighborhoodLabels};
//!
//! let labels = NeighborhoodLabels::new("Hough");
//! metrics::counter!(metric_defs::PARCELS_SELECTED.name, &labels.to_labels()).increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric (counter, gauge, or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
    /// A histogram for recording distributions.
    Histogram,
}

impl MetricKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// Built with const constructors so declarations live in `const` items:
///
/// ```rust
/// use growthlimit_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const LOADS: Metric = Metric::counter("growthlimit.catalog.loads")
///     .with_description("Catalogs installed")
///     .with_unit(Unit::Count)
///     .with_labels(&["neighborhood"]);
///
/// assert_eq!(LOADS.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// Dotted metric name.
    pub name: &'static str,
    pub kind: MetricKind,
    pub description: &'static str,
    pub unit: Option<Unit>,
    /// Label keys recorded with the metric.
    pub labels: &'static [&'static str],
}

impl Metric {
    pub const fn counter(name: &'static str) -> Self {
        Self::new(name, MetricKind::Counter)
    }

    pub const fn gauge(name: &'static str) -> Self {
        Self::new(name, MetricKind::Gauge)
    }

    pub const fn histogram(name: &'static str) -> Self {
        Self::new(name, MetricKind::Histogram)
    }

    const fn new(name: &'static str, kind: MetricKind) -> Self {
        Self {
            name,
            kind,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the installed recorder.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => describe_counter!(self.name, unit, self.description),
            (MetricKind::Counter, None) => describe_counter!(self.name, self.description),
            (MetricKind::Gauge, Some(unit)) => describe_gauge!(self.name, unit, self.description),
            (MetricKind::Gauge, None) => describe_gauge!(self.name, self.description),
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description)
            }
            (MetricKind::Histogram, None) => describe_histogram!(self.name, self.description),
        }
    }
}

/// All metrics recorded by a selection session.
pub mod metric_defs {
    use super::{Metric, Unit};

    /// Label present on every session metric.
    pub const NEIGHBORHOOD_LABELS: &[&str] = &["neighborhood"];

    // ========================================================================
    // Selection
    // ========================================================================

    /// Parcels admitted into the selection.
    pub const PARCELS_SELECTED: Metric = Metric::counter("growthlimit.selection.selected")
        .with_description("Parcels admitted into the selection")
        .with_unit(Unit::Count)
        .with_labels(NEIGHBORHOOD_LABELS);

    /// Parcels removed from the selection by a toggle.
    pub const PARCELS_UNSELECTED: Metric = Metric::counter("growthlimit.selection.unselected")
        .with_description("Parcels removed from the selection")
        .with_unit(Unit::Count)
        .with_labels(NEIGHBORHOOD_LABELS);

    /// Additions refused because they would exceed the development limit.
    pub const BUDGET_EXCEEDED: Metric = Metric::counter("growthlimit.selection.budget_exceeded")
        .with_description("Parcel additions refused by the development limit")
        .with_unit(Unit::Count)
        .with_labels(NEIGHBORHOOD_LABELS);

    /// Acreage currently selected.
    pub const SELECTED_ACREAGE: Metric = Metric::gauge("growthlimit.selection.acreage")
        .with_description("Acreage currently selected")
        .with_labels(NEIGHBORHOOD_LABELS);

    // ========================================================================
    // Budget
    // ========================================================================

    /// Budget edits accepted.
    pub const BUDGET_EDITS: Metric = Metric::counter("growthlimit.budget.edits")
        .with_description("Development limit edits accepted")
        .with_unit(Unit::Count);

    /// Budget edits reverted because they fell below the selected acreage.
    pub const BUDGET_REJECTED: Metric = Metric::counter("growthlimit.budget.rejected")
        .with_description("Development limit edits reverted")
        .with_unit(Unit::Count);

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Catalogs fetched and installed.
    pub const CATALOG_LOADS: Metric = Metric::counter("growthlimit.catalog.loads")
        .with_description("Neighborhood catalogs installed")
        .with_unit(Unit::Count)
        .with_labels(NEIGHBORHOOD_LABELS);

    /// Catalog fetches that failed.
    pub const CATALOG_FAILURES: Metric = Metric::counter("growthlimit.catalog.failures")
        .with_description("Neighborhood catalog fetches that failed")
        .with_unit(Unit::Count)
        .with_labels(NEIGHBORHOOD_LABELS);

    /// Responses dropped because a newer request was issued.
    pub const CATALOG_STALE: Metric = Metric::counter("growthlimit.catalog.stale_dropped")
        .with_description("Catalog responses superseded by a newer request")
        .with_unit(Unit::Count)
        .with_labels(NEIGHBORHOOD_LABELS);

    /// Time from request to response.
    pub const CATALOG_FETCH_TIME: Metric = Metric::histogram("growthlimit.catalog.fetch_time_ms")
        .with_description("Wall-clock catalog fetch time in milliseconds")
        .with_unit(Unit::Milliseconds)
        .with_labels(NEIGHBORHOOD_LABELS);

    // ========================================================================
    // Export
    // ========================================================================

    /// Selections written to disk.
    pub const EXPORTS: Metric = Metric::counter("growthlimit.export.written")
        .with_description("Selections exported")
        .with_unit(Unit::Count);

    /// Exports refused because nothing was selected.
    pub const EXPORTS_EMPTY: Metric = Metric::counter("growthlimit.export.empty")
        .with_description("Exports refused with an empty selection")
        .with_unit(Unit::Count);

    /// Returns a slice of all defined metrics.
    pub const ALL: &[&Metric] = &[
        &PARCELS_SELECTED,
        &PARCELS_UNSELECTED,
        &BUDGET_EXCEEDED,
        &SELECTED_ACREAGE,
        &BUDGET_EDITS,
        &BUDGET_REJECTED,
        &CATALOG_LOADS,
        &CATALOG_FAILURES,
        &CATALOG_STALE,
        &CATALOG_FETCH_TIME,
        &EXPORTS,
        &EXPORTS_EMPTY,
    ];
}

/// Labels attached to neighborhood-scoped metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborhoodLabels {
    pub neighborhood: String,
}

impl NeighborhoodLabels {
    pub fn new(neighborhood: impl Into<String>) -> Self {
        Self {
            neighborhood: neighborhood.into(),
        }
    }

    /// Labels for a session with no neighborhood loaded.
    pub fn none() -> Self {
        Self::new("none")
    }

    /// Converts the labels to the metrics crate label format.
    pub fn to_labels(&self) -> [(&'static str, String); 1] {
        [("neighborhood", self.neighborhood.clone())]
    }
}

/// Describes all metrics. Call once after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}
