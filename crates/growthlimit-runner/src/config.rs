//! Session configuration loaded from YAML.
//!
//! Every field has a default, so an empty document is a valid config:
//!
//! ```yaml
//! default_budget: 10
//! export_path: selected_parcels.geojson
//! drop_stale_responses: true
//! catalog:
//!   base_url: https://raw.githubusercontent.com/timothydehm/growthlimit/main/data
//!   cache_dir: ./catalog_cache
//!   fetch_timeout_secs: 30
//! neighborhoods:
//!   - id: Hough
//!     name: Hough
//!     population_2020: 14000
//!     vacant_land_2023: 412.5
//! ```

use crate::{Result, RunnerError};
use parcel_geo::{
    CatalogDecoder, CatalogSource, DirectoryCatalogSource, HttpCatalogSource,
    DEFAULT_ACREAGE_PROPERTY, DEFAULT_BASE_URL, DEFAULT_EXPORT_FILENAME, DEFAULT_ID_PROPERTY,
};
use parcel_ledger::{is_valid_acreage, DEFAULT_BUDGET};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Feature property holding the transit-oriented development score.
pub const DEFAULT_SCORE_PROPERTY: &str = "TOD_Index";

/// Top-level session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Development limit in acres at startup.
    pub default_budget: f64,
    pub catalog: CatalogConfig,
    /// Where `export` writes the selection.
    pub export_path: PathBuf,
    /// Ignore catalog responses that a newer request has superseded.
    pub drop_stale_responses: bool,
    /// Neighborhoods offered by the `neighborhoods` command.
    pub neighborhoods: Vec<NeighborhoodInfo>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_budget: DEFAULT_BUDGET,
            catalog: CatalogConfig::default(),
            export_path: PathBuf::from(DEFAULT_EXPORT_FILENAME),
            drop_stale_responses: true,
            neighborhoods: Vec::new(),
        }
    }
}

/// Where catalogs come from and how their features are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Read catalogs from this directory instead of the network.
    pub data_dir: Option<PathBuf>,
    /// Keep downloaded catalogs here.
    pub cache_dir: Option<PathBuf>,
    pub id_property: String,
    pub acreage_property: String,
    pub score_property: String,
    /// No timeout when unset.
    pub fetch_timeout_secs: Option<u64>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: None,
            cache_dir: None,
            id_property: DEFAULT_ID_PROPERTY.to_string(),
            acreage_property: DEFAULT_ACREAGE_PROPERTY.to_string(),
            score_property: DEFAULT_SCORE_PROPERTY.to_string(),
            fetch_timeout_secs: None,
        }
    }
}

/// One entry of the neighborhood selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population_2020: Option<u64>,
    /// Vacant land in acres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacant_land_2023: Option<f64>,
}

impl NeighborhoodInfo {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl SessionConfig {
    /// Load and validate a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RunnerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        // An empty file deserializes to unit, not to an empty mapping.
        let config: SessionConfig = if text.trim().is_empty() {
            SessionConfig::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_acreage(self.default_budget) {
            return Err(RunnerError::Config(format!(
                "default_budget must be a finite, non-negative number of acres, got {}",
                self.default_budget
            )));
        }
        if self.catalog.data_dir.is_none() && self.catalog.base_url.trim().is_empty() {
            return Err(RunnerError::Config(
                "catalog.base_url is empty and no catalog.data_dir is set".to_string(),
            ));
        }
        if self.catalog.fetch_timeout_secs == Some(0) {
            return Err(RunnerError::Config(
                "catalog.fetch_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.export_path.as_os_str().is_empty() {
            return Err(RunnerError::Config("export_path is empty".to_string()));
        }
        Ok(())
    }

    /// Decoder for the configured feature properties.
    pub fn decoder(&self) -> CatalogDecoder {
        CatalogDecoder::new(&self.catalog.id_property, &self.catalog.acreage_property)
    }

    /// Build the catalog source: a local directory when `data_dir` is set,
    /// otherwise HTTP with an optional disk cache.
    pub fn build_source(&self) -> Result<Arc<dyn CatalogSource>> {
        if let Some(dir) = &self.catalog.data_dir {
            let source = DirectoryCatalogSource::new(dir).with_decoder(self.decoder());
            return Ok(Arc::new(source));
        }

        let timeout = self.catalog.fetch_timeout_secs.map(Duration::from_secs);
        let mut source = HttpCatalogSource::with_timeout(self.catalog.base_url.clone(), timeout)?
            .with_decoder(self.decoder());
        if let Some(cache_dir) = &self.catalog.cache_dir {
            source = source.with_cache_dir(cache_dir)?;
        }
        Ok(Arc::new(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = SessionConfig::from_yaml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.default_budget, 10.0);
        assert_eq!(config.export_path, PathBuf::from("selected_parcels.geojson"));
        assert!(config.drop_stale_responses);
        assert_eq!(config.catalog.id_property, "parcelpin");
        assert_eq!(config.catalog.score_property, "TOD_Index");
    }

    #[test]
    fn test_partial_document() {
        let config = SessionConfig::from_yaml_str(
            r#"
default_budget: 25
catalog:
  data_dir: ./data
  acreage_property: area
neighborhoods:
  - id: Hough
    population_2020: 14000
  - id: Fairfax
    name: Fairfax Renaissance
    vacant_land_2023: 88.5
"#,
        )
        .unwrap();

        assert_eq!(config.default_budget, 25.0);
        assert_eq!(config.catalog.data_dir, Some(PathBuf::from("./data")));
        assert_eq!(config.catalog.acreage_property, "area");
        assert_eq!(config.catalog.id_property, "parcelpin");
        assert_eq!(config.neighborhoods.len(), 2);
        assert_eq!(config.neighborhoods[0].display_name(), "Hough");
        assert_eq!(config.neighborhoods[0].population_2020, Some(14000));
        assert_eq!(config.neighborhoods[1].display_name(), "Fairfax Renaissance");
        assert_eq!(config.neighborhoods[1].vacant_land_2023, Some(88.5));
    }

    #[test]
    fn test_invalid_budget_rejected() {
        assert!(matches!(
            SessionConfig::from_yaml_str("default_budget: -1"),
            Err(RunnerError::Config(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(matches!(
            SessionConfig::from_yaml_str("catalog:\n  fetch_timeout_secs: 0"),
            Err(RunnerError::Config(_))
        ));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            SessionConfig::from_yaml_str("default_budget: [1, 2"),
            Err(RunnerError::Yaml(_))
        ));
    }

    #[test]
    fn test_directory_source_when_data_dir_set() {
        let mut config = SessionConfig::default();
        config.catalog.data_dir = Some(PathBuf::from("/tmp/parcels"));
        let source = config.build_source().unwrap();
        assert!(source.describe().contains("/tmp/parcels"));
    }
}
