//! Neighborhood catalogs and the GeoJSON decoder that builds them.
//!
//! A catalog document is a GeoJSON `FeatureCollection`. Each feature must
//! carry two properties:
//!
//! - an identifier (`parcelpin` by default), string or number
//! - an acreage (`acres` by default), number or numeric string
//!
//! Everything else in the feature (geometry, TOD score, other attributes) is
//! kept verbatim on the resulting [`Parcel`].

use crate::{GeoError, Result};
use parcel_ledger::{is_valid_acreage, NeighborhoodId, Parcel, ParcelId};
use serde_json::Value;
use std::collections::HashMap;

/// Default feature property holding the parcel identifier.
pub const DEFAULT_ID_PROPERTY: &str = "parcelpin";

/// Default feature property holding the parcel acreage.
pub const DEFAULT_ACREAGE_PROPERTY: &str = "acres";

/// The parcels available for one neighborhood.
#[derive(Debug, Clone)]
pub struct Catalog {
    neighborhood: NeighborhoodId,
    parcels: Vec<Parcel>,
    index: HashMap<ParcelId, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate parcel ids.
    pub fn new(neighborhood: NeighborhoodId, parcels: Vec<Parcel>) -> Result<Self> {
        let mut index = HashMap::with_capacity(parcels.len());
        for (pos, parcel) in parcels.iter().enumerate() {
            if index.insert(parcel.id().clone(), pos).is_some() {
                return Err(GeoError::DuplicateParcel {
                    parcel: parcel.id().clone(),
                });
            }
        }
        Ok(Self {
            neighborhood,
            parcels,
            index,
        })
    }

    pub fn neighborhood(&self) -> &NeighborhoodId {
        &self.neighborhood
    }

    /// Look up a parcel by id.
    pub fn get(&self, id: &ParcelId) -> Option<&Parcel> {
        self.index.get(id).map(|&pos| &self.parcels[pos])
    }

    /// All parcels in document order.
    pub fn parcels(&self) -> &[Parcel] {
        &self.parcels
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    /// Sum of all parcel acreage in the catalog.
    pub fn total_acreage(&self) -> f64 {
        self.parcels.iter().map(Parcel::acreage).sum()
    }
}

/// Turns GeoJSON documents into [`Catalog`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogDecoder {
    /// Feature property holding the parcel identifier.
    pub id_property: String,
    /// Feature property holding the parcel acreage.
    pub acreage_property: String,
}

impl Default for CatalogDecoder {
    fn default() -> Self {
        Self {
            id_property: DEFAULT_ID_PROPERTY.to_string(),
            acreage_property: DEFAULT_ACREAGE_PROPERTY.to_string(),
        }
    }
}

impl CatalogDecoder {
    /// Create a decoder reading the given property names.
    pub fn new(id_property: impl Into<String>, acreage_property: impl Into<String>) -> Self {
        Self {
            id_property: id_property.into(),
            acreage_property: acreage_property.into(),
        }
    }

    /// Decode a raw document.
    pub fn decode_slice(&self, neighborhood: &NeighborhoodId, bytes: &[u8]) -> Result<Catalog> {
        let document: Value = serde_json::from_slice(bytes)?;
        self.decode(neighborhood, document)
    }

    /// Decode an already-parsed document.
    pub fn decode(&self, neighborhood: &NeighborhoodId, document: Value) -> Result<Catalog> {
        let Value::Object(mut root) = document else {
            return Err(GeoError::NotAFeatureCollection(
                "document root is not an object".to_string(),
            ));
        };
        match root.get("type").and_then(Value::as_str) {
            Some("FeatureCollection") => {}
            Some(other) => {
                return Err(GeoError::NotAFeatureCollection(format!(
                    "document type is {other:?}"
                )))
            }
            None => {
                return Err(GeoError::NotAFeatureCollection(
                    "document has no type".to_string(),
                ))
            }
        }
        let Some(Value::Array(features)) = root.remove("features") else {
            return Err(GeoError::NotAFeatureCollection(
                "document has no features array".to_string(),
            ));
        };

        let parcels = features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| self.decode_feature(neighborhood, index, feature))
            .collect::<Result<Vec<_>>>()?;

        Catalog::new(neighborhood.clone(), parcels)
    }

    fn decode_feature(
        &self,
        neighborhood: &NeighborhoodId,
        index: usize,
        feature: Value,
    ) -> Result<Parcel> {
        let properties = feature.get("properties");
        let id = properties
            .and_then(|p| p.get(&self.id_property))
            .and_then(id_from_value)
            .ok_or_else(|| GeoError::MissingProperty {
                index,
                property: self.id_property.clone(),
            })?;

        let raw_acreage = properties
            .and_then(|p| p.get(&self.acreage_property))
            .filter(|v| !v.is_null())
            .ok_or_else(|| GeoError::MissingProperty {
                index,
                property: self.acreage_property.clone(),
            })?;
        let acreage = acreage_from_value(raw_acreage)
            .filter(|&acres| is_valid_acreage(acres))
            .ok_or_else(|| GeoError::InvalidAcreage {
                parcel: id.clone(),
                value: raw_acreage.to_string(),
            })?;

        Ok(Parcel::new(id, acreage, neighborhood.clone()).with_feature(feature))
    }
}

fn id_from_value(value: &Value) -> Option<ParcelId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(ParcelId::new(s.trim())),
        Value::Number(n) => Some(ParcelId::new(n.to_string())),
        _ => None,
    }
}

fn acreage_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_float(s),
        _ => None,
    }
}

/// Parse the numeric prefix of a string, ignoring trailing text ("2.5 ac" is
/// 2.5). An exponent is part of the number only when it has digits ("1e3" is
/// 1000, "4e" is 4).
fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let whole = digits(end);
    end += whole;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits(end + 1);
        end += 1 + fraction;
    }
    if whole == 0 && fraction == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }
    s[..end].parse().ok()
}
