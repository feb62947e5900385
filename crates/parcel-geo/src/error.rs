//! Error types for catalog loading and export.

use parcel_ledger::ParcelId;
use thiserror::Error;

/// Errors that can occur while loading a catalog or exporting a selection.
#[derive(Debug, Error)]
pub enum GeoError {
    /// I/O error reading a catalog or writing an export.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request error when fetching a catalog.
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The document is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered, but not with a catalog.
    #[error("failed to download catalog for {neighborhood}: {reason}")]
    DownloadFailed {
        /// Neighborhood whose catalog was requested.
        neighborhood: String,
        /// Reason for failure.
        reason: String,
    },

    /// The document is JSON but not a GeoJSON FeatureCollection.
    #[error("not a GeoJSON FeatureCollection: {0}")]
    NotAFeatureCollection(String),

    /// A feature lacks a property the catalog requires.
    #[error("feature {index} has no usable `{property}` property")]
    MissingProperty {
        /// Position of the feature in the collection.
        index: usize,
        /// Name of the missing property.
        property: String,
    },

    /// A feature declares an acreage that is negative, not finite, or not a number.
    #[error("parcel {parcel} has invalid acreage {value}")]
    InvalidAcreage {
        /// Offending parcel.
        parcel: ParcelId,
        /// The declared value, as found in the document.
        value: String,
    },

    /// Two features in one catalog share an id.
    #[error("parcel {parcel} appears more than once in the catalog")]
    DuplicateParcel {
        /// The repeated id.
        parcel: ParcelId,
    },

    /// Neighborhood identifier cannot name a catalog resource.
    #[error("invalid neighborhood identifier: {0:?}")]
    InvalidNeighborhood(String),

    /// Export was requested with nothing selected.
    #[error("nothing to export: no parcels are selected")]
    EmptyExport,
}

/// Result type for catalog and export operations.
pub type Result<T> = std::result::Result<T, GeoError>;
