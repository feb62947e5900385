//! # parcel-geo
//!
//! GeoJSON plumbing around the selection ledger.
//!
//! - **Loading**: a [`CatalogSource`] produces the [`Catalog`] of parcels for a
//!   neighborhood, either over HTTP ([`HttpCatalogSource`], with an optional
//!   disk cache) or from a local directory ([`DirectoryCatalogSource`]).
//! - **Export**: [`export_selection`] writes the current selection as a
//!   FeatureCollection, refusing to write an empty one.
//!
//! ## Example
//!
//! ```no_run
//! use parcel_geo::{CatalogSource, HttpCatalogSource, DEFAULT_BASE_URL};
//! use parcel_ledger::{Ledger, NeighborhoodId};
//!
//! let source = HttpCatalogSource::new(DEFAULT_BASE_URL)?.with_cache_dir("./catalog_cache")?;
//! let catalog = source.fetch(&NeighborhoodId::new("Hough"))?;
//!
//! let mut ledger = Ledger::new(10.0).expect("valid budget");
//! if let Some(parcel) = catalog.parcels().first() {
//!     let _ = ledger.toggle(parcel);
//! }
//! parcel_geo::export_selection(&ledger.snapshot(), "selected_parcels.geojson")?;
//! # Ok::<(), parcel_geo::GeoError>(())
//! ```

mod catalog;
mod error;
mod export;
mod source;

pub use catalog::{Catalog, CatalogDecoder, DEFAULT_ACREAGE_PROPERTY, DEFAULT_ID_PROPERTY};
pub use error::{GeoError, Result};
pub use export::{
    export_selection, to_feature_collection, to_geojson_string, ExportSummary,
    DEFAULT_EXPORT_FILENAME,
};
pub use source::{
    catalog_file_name, validate_neighborhood, CatalogSource, DirectoryCatalogSource,
    DownloadStats, HttpCatalogSource, CATALOG_EXTENSION, DEFAULT_BASE_URL,
};
