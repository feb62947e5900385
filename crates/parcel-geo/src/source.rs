//! Catalog sources: where neighborhood GeoJSON documents come from.
//!
//! Each neighborhood's parcels live in one document named
//! `{neighborhood}.geojson`, either under a base URL ([`HttpCatalogSource`])
//! or in a local directory ([`DirectoryCatalogSource`]).
//!
//! ## Caching
//!
//! The HTTP source can keep a copy of every downloaded document in a cache
//! directory. Cached documents are served without touching the network.

use crate::{Catalog, CatalogDecoder, GeoError, Result};
use parcel_ledger::NeighborhoodId;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Repository that hosts the Cleveland neighborhood parcel documents.
pub const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com/timothydehm/growthlimit/main/data";

/// File extension of catalog documents.
pub const CATALOG_EXTENSION: &str = "geojson";

/// Anything that can produce the catalog for a neighborhood.
///
/// Implementations block until the catalog is available or the fetch fails;
/// callers that must stay responsive run them on a worker thread.
pub trait CatalogSource: Send + Sync {
    /// Fetch and decode the catalog for `neighborhood`.
    fn fetch(&self, neighborhood: &NeighborhoodId) -> Result<Catalog>;

    /// Short human-readable description used in logs.
    fn describe(&self) -> String;
}

/// Check that a neighborhood id can safely name a file or URL path segment.
///
/// Accepts ASCII letters, digits, `_`, `-` and `.`, but not `..` or a leading dot.
pub fn validate_neighborhood(neighborhood: &NeighborhoodId) -> Result<()> {
    let id = neighborhood.as_str();
    let valid_chars = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if id.is_empty() || !valid_chars || id.starts_with('.') || id.contains("..") {
        return Err(GeoError::InvalidNeighborhood(id.to_string()));
    }
    Ok(())
}

/// File name of a neighborhood's catalog document.
pub fn catalog_file_name(neighborhood: &NeighborhoodId) -> String {
    format!("{}.{}", neighborhood, CATALOG_EXTENSION)
}

/// Reads catalogs from `{dir}/{neighborhood}.geojson`.
#[derive(Debug, Clone)]
pub struct DirectoryCatalogSource {
    dir: PathBuf,
    decoder: CatalogDecoder,
}

impl DirectoryCatalogSource {
    /// Create a source over a directory of catalog documents.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            decoder: CatalogDecoder::default(),
        }
    }

    /// Use a decoder with non-default property names.
    pub fn with_decoder(mut self, decoder: CatalogDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for a neighborhood.
    pub fn catalog_path(&self, neighborhood: &NeighborhoodId) -> PathBuf {
        self.dir.join(catalog_file_name(neighborhood))
    }
}

impl CatalogSource for DirectoryCatalogSource {
    fn fetch(&self, neighborhood: &NeighborhoodId) -> Result<Catalog> {
        validate_neighborhood(neighborhood)?;
        let path = self.catalog_path(neighborhood);
        debug!(path = %path.display(), "reading catalog");
        let bytes = fs::read(&path)?;
        self.decoder.decode_slice(neighborhood, &bytes)
    }

    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }
}

/// Download statistics for the HTTP source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadStats {
    /// Number of catalogs downloaded this session.
    pub catalogs_downloaded: usize,
    /// Number of catalogs served from the disk cache.
    pub cache_hits: usize,
    /// Total bytes downloaded this session.
    pub bytes_downloaded: u64,
}

/// Fetches catalogs from `{base_url}/{neighborhood}.geojson`.
///
/// Safe to share between threads; statistics are kept in atomics.
pub struct HttpCatalogSource {
    /// URL prefix, without a trailing slash.
    base_url: String,
    /// Optional directory for downloaded documents.
    cache_dir: Option<PathBuf>,
    decoder: CatalogDecoder,
    client: reqwest::blocking::Client,
    catalogs_downloaded: AtomicUsize,
    cache_hits: AtomicUsize,
    bytes_downloaded: AtomicU64,
}

impl std::fmt::Debug for HttpCatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalogSource")
            .field("base_url", &self.base_url)
            .field("cache_dir", &self.cache_dir)
            .finish()
    }
}

impl HttpCatalogSource {
    /// Create a source with no request timeout and no disk cache.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Create a source whose requests give up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        // The blocking client defaults to a 30s timeout; `None` means wait indefinitely.
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            base_url,
            cache_dir: None,
            decoder: CatalogDecoder::default(),
            client,
            catalogs_downloaded: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            bytes_downloaded: AtomicU64::new(0),
        })
    }

    /// Keep downloaded documents in `cache_dir`, creating it if needed.
    pub fn with_cache_dir<P: AsRef<Path>>(mut self, cache_dir: P) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        fs::create_dir_all(&cache_dir)?;
        self.cache_dir = Some(cache_dir);
        Ok(self)
    }

    /// Use a decoder with non-default property names.
    pub fn with_decoder(mut self, decoder: CatalogDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    /// URL of the document for a neighborhood.
    pub fn catalog_url(&self, neighborhood: &NeighborhoodId) -> String {
        format!("{}/{}", self.base_url, catalog_file_name(neighborhood))
    }

    /// Cache path of the document for a neighborhood, if caching is enabled.
    pub fn cache_path(&self, neighborhood: &NeighborhoodId) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(catalog_file_name(neighborhood)))
    }

    /// Get download statistics for this session.
    pub fn download_stats(&self) -> DownloadStats {
        DownloadStats {
            catalogs_downloaded: self.catalogs_downloaded.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
        }
    }

    fn download(&self, neighborhood: &NeighborhoodId) -> Result<Vec<u8>> {
        let url = self.catalog_url(neighborhood);
        debug!(%url, "downloading catalog");

        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            return Err(GeoError::DownloadFailed {
                neighborhood: neighborhood.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let bytes = response.bytes()?.to_vec();
        self.catalogs_downloaded.fetch_add(1, Ordering::Relaxed);
        self.bytes_downloaded
            .fetch_add(bytes.len() as u64, Ordering::Relaxed);
        info!(%neighborhood, bytes = bytes.len(), "catalog downloaded");
        Ok(bytes)
    }
}

impl HttpCatalogSource {
    /// Decode a cached document. A document that cannot be read or decoded
    /// is evicted so the next fetch goes to the network.
    fn read_cached(&self, neighborhood: &NeighborhoodId, path: &Path) -> Option<Catalog> {
        let decoded = fs::read(path)
            .map_err(GeoError::from)
            .and_then(|bytes| self.decoder.decode_slice(neighborhood, &bytes));
        match decoded {
            Ok(catalog) => {
                self.cache_hits.fetch_add(1, Ordering::Relaxed);
                debug!(path = %path.display(), "catalog served from cache");
                Some(catalog)
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "discarding unreadable cached catalog");
                if let Err(err) = fs::remove_file(path) {
                    warn!(path = %path.display(), %err, "failed to remove cached catalog");
                }
                None
            }
        }
    }

    /// Write a document to the cache through a temporary file, so an
    /// interrupted write never leaves a truncated document in place.
    fn store_cached(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let partial = path.with_extension(format!("{}.part", CATALOG_EXTENSION));
        fs::write(&partial, bytes)?;
        fs::rename(&partial, path).map_err(|err| {
            let _ = fs::remove_file(&partial);
            err
        })
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch(&self, neighborhood: &NeighborhoodId) -> Result<Catalog> {
        validate_neighborhood(neighborhood)?;

        let cache_path = self.cache_path(neighborhood);
        if let Some(path) = cache_path.as_ref().filter(|p| p.exists()) {
            if let Some(catalog) = self.read_cached(neighborhood, path) {
                return Ok(catalog);
            }
        }

        let bytes = self.download(neighborhood)?;
        // Decode before caching so a bad document is never served again.
        let catalog = self.decoder.decode_slice(neighborhood, &bytes)?;
        if let Some(path) = cache_path {
            if let Err(err) = self.store_cached(&path, &bytes) {
                warn!(path = %path.display(), %err, "failed to cache catalog");
            }
        }
        Ok(catalog)
    }

    fn describe(&self) -> String {
        format!("{}/*.{}", self.base_url, CATALOG_EXTENSION)
    }
}
