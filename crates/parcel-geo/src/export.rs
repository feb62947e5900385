//! Export of the current selection as a GeoJSON FeatureCollection.
//!
//! The exported document holds exactly the selected features, in selection
//! order, each one byte-for-byte the object it was loaded from (property
//! order included). An empty selection is refused rather than written as an
//! empty collection.

use crate::{GeoError, Result};
use parcel_ledger::Snapshot;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name used for exports unless configured otherwise.
pub const DEFAULT_EXPORT_FILENAME: &str = "selected_parcels.geojson";

/// What an export wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    /// File that was written.
    pub path: PathBuf,
    /// Number of features in the document.
    pub features: usize,
    /// Selected acreage at the time of export.
    pub total_acreage: f64,
    /// Size of the written document.
    pub bytes: usize,
}

/// Build the FeatureCollection for a selection.
pub fn to_feature_collection(snapshot: &Snapshot<'_>) -> Result<Value> {
    if snapshot.is_empty() {
        return Err(GeoError::EmptyExport);
    }
    let features: Vec<Value> = snapshot
        .parcels
        .iter()
        .map(|parcel| parcel.feature().clone())
        .collect();
    Ok(json!({
        "type": "FeatureCollection",
        "features": features,
    }))
}

/// Serialize a selection to a compact GeoJSON string.
pub fn to_geojson_string(snapshot: &Snapshot<'_>) -> Result<String> {
    let collection = to_feature_collection(snapshot)?;
    Ok(serde_json::to_string(&collection)?)
}

/// Write a selection to `path`, creating parent directories as needed.
///
/// Nothing is written when the selection is empty.
pub fn export_selection<P: AsRef<Path>>(snapshot: &Snapshot<'_>, path: P) -> Result<ExportSummary> {
    let document = to_geojson_string(snapshot)?;
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &document)?;

    info!(
        path = %path.display(),
        features = snapshot.len(),
        acres = snapshot.total_acreage,
        "selection exported"
    );
    Ok(ExportSummary {
        path: path.to_path_buf(),
        features: snapshot.len(),
        total_acreage: snapshot.total_acreage,
        bytes: document.len(),
    })
}
