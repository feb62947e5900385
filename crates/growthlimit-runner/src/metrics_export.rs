//! In-memory metrics recorder and JSON export.
//!
//! [`InMemoryRecorder`] keeps every counter, gauge and histogram the session
//! records, keyed by name and labels. The `growthlimit` binary installs one
//! globally and can dump it with `--metrics-output`; tests install one
//! locally with [`metrics::with_local_recorder`] and read values back.
//!
//! ```json
//! {
//!   "metrics": {
//!     "growthlimit.selection.selected": {
//!       "kind": "counter",
//!       "description": "Parcels admitted into the selection",
//!       "series": [ { "labels": { "neighborhood": "Hough" }, "value": 2.0 } ]
//!     }
//!   }
//! }
//! ```

use growthlimit_metrics::MetricKind;
use metrics::{
    Counter, Gauge, Histogram, HistogramFn, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Labels of one series, sorted by key.
type LabelSet = BTreeMap<String, String>;

/// Recorded histogram samples.
#[derive(Debug, Default)]
struct Samples(Mutex<Vec<f64>>);

impl HistogramFn for Samples {
    fn record(&self, value: f64) {
        if let Ok(mut samples) = self.0.lock() {
            samples.push(value);
        }
    }
}

#[derive(Debug, Clone)]
enum Handle {
    Counter(Arc<AtomicU64>),
    /// Gauge value stored as `f64` bits.
    Gauge(Arc<AtomicU64>),
    Histogram(Arc<Samples>),
}

#[derive(Debug, Default)]
struct Registry {
    series: HashMap<(String, LabelSet), Handle>,
    descriptions: HashMap<String, String>,
}

/// Recorder that keeps all values in memory.
#[derive(Debug, Default)]
pub struct InMemoryRecorder {
    registry: Mutex<Registry>,
}

/// Summary of one histogram series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramSummary {
    pub count: usize,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Serialize)]
struct SeriesExport {
    labels: LabelSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    histogram: Option<HistogramSummary>,
}

#[derive(Debug, Serialize)]
struct MetricExport {
    kind: &'static str,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    series: Vec<SeriesExport>,
}

#[derive(Debug, Serialize)]
struct MetricsExport {
    metrics: BTreeMap<String, MetricExport>,
}

fn label_set(key: &Key) -> LabelSet {
    key.labels()
        .map(|label| (label.key().to_string(), label.value().to_string()))
        .collect()
}

fn matches(set: &LabelSet, labels: &[(&str, &str)]) -> bool {
    labels
        .iter()
        .all(|(k, v)| set.get(*k).map(String::as_str) == Some(*v))
}

fn summarize(samples: &Samples) -> HistogramSummary {
    let values = match samples.0.lock() {
        Ok(values) => values.clone(),
        Err(_) => Vec::new(),
    };
    HistogramSummary {
        count: values.len(),
        sum: values.iter().sum(),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

impl InMemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // A panic while holding the lock cannot leave the maps half-updated.
        self.registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn handle(&self, key: &Key, make: impl FnOnce() -> Handle) -> Handle {
        self.registry()
            .series
            .entry((key.name().to_string(), label_set(key)))
            .or_insert_with(make)
            .clone()
    }

    fn describe(&self, key: KeyName, description: SharedString) {
        self.registry()
            .descriptions
            .insert(key.as_str().to_string(), description.to_string());
    }

    /// Sum of a counter over every series whose labels include `labels`.
    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        self.registry()
            .series
            .iter()
            .filter(|((n, set), _)| n == name && matches(set, labels))
            .map(|(_, handle)| match handle {
                Handle::Counter(value) => value.load(Ordering::Relaxed),
                _ => 0,
            })
            .sum()
    }

    /// Value of the gauge series with exactly `labels`.
    pub fn gauge(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        let wanted: LabelSet = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        match self.registry().series.get(&(name.to_string(), wanted)) {
            Some(Handle::Gauge(bits)) => Some(f64::from_bits(bits.load(Ordering::Relaxed))),
            _ => None,
        }
    }

    /// Summary of the histogram samples across series whose labels include `labels`.
    pub fn histogram(&self, name: &str, labels: &[(&str, &str)]) -> Option<HistogramSummary> {
        let registry = self.registry();
        let merged = Samples::default();
        let mut found = false;
        for ((n, set), handle) in &registry.series {
            if let Handle::Histogram(samples) = handle {
                if n == name && matches(set, labels) {
                    found = true;
                    if let (Ok(mut into), Ok(from)) = (merged.0.lock(), samples.0.lock()) {
                        into.extend(from.iter().copied());
                    }
                }
            }
        }
        found.then(|| summarize(&merged))
    }

    pub fn description(&self, name: &str) -> Option<String> {
        self.registry().descriptions.get(name).cloned()
    }

    /// Render every recorded series as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let registry = self.registry();
        let mut metrics: BTreeMap<String, MetricExport> = BTreeMap::new();
        for ((name, labels), handle) in &registry.series {
            let (kind, value, histogram) = match handle {
                Handle::Counter(v) => (MetricKind::Counter, Some(v.load(Ordering::Relaxed) as f64), None),
                Handle::Gauge(bits) => (
                    MetricKind::Gauge,
                    Some(f64::from_bits(bits.load(Ordering::Relaxed))),
                    None,
                ),
                Handle::Histogram(samples) => (MetricKind::Histogram, None, Some(summarize(samples))),
            };
            let entry = metrics.entry(name.clone()).or_insert_with(|| MetricExport {
                kind: kind.as_str(),
                description: registry.descriptions.get(name).cloned().unwrap_or_default(),
                series: Vec::new(),
            });
            entry.series.push(SeriesExport {
                labels: labels.clone(),
                value,
                histogram,
            });
        }
        for metric in metrics.values_mut() {
            metric.series.sort_by(|a, b| a.labels.cmp(&b.labels));
        }
        serde_json::to_string_pretty(&MetricsExport { metrics })
    }

    /// Write [`to_json`](Self::to_json) to `path`.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::from)?;
        fs::write(path, json)
    }
}

impl Recorder for InMemoryRecorder {
    fn describe_counter(&self, key: KeyName, _unit: Option<Unit>, description: SharedString) {
        self.describe(key, description);
    }

    fn describe_gauge(&self, key: KeyName, _unit: Option<Unit>, description: SharedString) {
        self.describe(key, description);
    }

    fn describe_histogram(&self, key: KeyName, _unit: Option<Unit>, description: SharedString) {
        self.describe(key, description);
    }

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        match self.handle(key, || Handle::Counter(Arc::new(AtomicU64::new(0)))) {
            Handle::Counter(value) => Counter::from_arc(value),
            _ => Counter::noop(),
        }
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        match self.handle(key, || Handle::Gauge(Arc::new(AtomicU64::new(0.0f64.to_bits())))) {
            Handle::Gauge(bits) => Gauge::from_arc(bits),
            _ => Gauge::noop(),
        }
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        match self.handle(key, || Handle::Histogram(Arc::new(Samples::default()))) {
            Handle::Histogram(samples) => Histogram::from_arc(samples),
            _ => Histogram::noop(),
        }
    }
}
