//! Parcel records and the identifiers that key them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Stable identifier of a parcel, unique within one neighborhood catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelId(String);

impl ParcelId {
    /// Create a parcel identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParcelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParcelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ParcelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a neighborhood; also names the catalog resource to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeighborhoodId(String);

impl NeighborhoodId {
    /// Create a neighborhood identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NeighborhoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NeighborhoodId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NeighborhoodId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Returns true if `acreage` is usable as a parcel area (finite, non-negative).
pub fn is_valid_acreage(acreage: f64) -> bool {
    acreage.is_finite() && acreage >= 0.0
}

/// A unit of land with a declared acreage.
///
/// The source feature (geometry plus display attributes such as the TOD score)
/// is carried verbatim so an export reproduces it unchanged. Identity is the
/// [`ParcelId`]; two parcels with the same id are the same parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    id: ParcelId,
    acreage: f64,
    neighborhood: NeighborhoodId,
    feature: Value,
}

impl Parcel {
    /// Create a parcel with an empty placeholder feature.
    ///
    /// # Panics
    /// Panics if `acreage` is negative or not finite.
    pub fn new(
        id: impl Into<ParcelId>,
        acreage: f64,
        neighborhood: impl Into<NeighborhoodId>,
    ) -> Self {
        assert!(
            is_valid_acreage(acreage),
            "parcel acreage must be finite and non-negative, got {}",
            acreage
        );
        let id = id.into();
        let feature = json!({
            "type": "Feature",
            "properties": { "id": id.as_str(), "acres": acreage },
            "geometry": null,
        });
        Self {
            id,
            acreage,
            neighborhood: neighborhood.into(),
            feature,
        }
    }

    /// Replace the carried source feature.
    pub fn with_feature(mut self, feature: Value) -> Self {
        self.feature = feature;
        self
    }

    pub fn id(&self) -> &ParcelId {
        &self.id
    }

    pub fn acreage(&self) -> f64 {
        self.acreage
    }

    pub fn neighborhood(&self) -> &NeighborhoodId {
        &self.neighborhood
    }

    /// The source feature exactly as it was loaded.
    pub fn feature(&self) -> &Value {
        &self.feature
    }

    /// Look up a display attribute in the feature's `properties` object.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.feature.get("properties")?.get(key)
    }
}
