/*!
 * Dictionary acquisition for the host layer.
 *
 * The conversion engine never touches the network or the filesystem. The
 * host resolves a dictionary source (a local path or an http(s) URL) to
 * text with one of the fetchers below and hands that text to the loader.
 * - `FileFetcher`: reads a local file
 * - `HttpFetcher`: downloads over HTTP(S) with an optional on-disk cache
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::{self, Debug};
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::Context;
use log::{debug, error, warn};
use reqwest::Client;
use sha2::{Digest, Sha256};
use url::Url;

use crate::errors::FetchError;

/// Where dictionary text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionarySource {
    /// Local file
    Path(PathBuf),
    /// Remote http(s) resource
    Url(Url),
}

impl DictionarySource {
    /// Interpret a user supplied source: `http://` and `https://` are URLs,
    /// anything else is a path.
    pub fn parse(source: &str) -> Result<Self, FetchError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(FetchError::InvalidSource("empty source".to_string()));
        }

        let lower = source.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(source).map_err(|e| FetchError::InvalidSource(format!("{}: {}", source, e)))?;
            return Ok(Self::Url(url));
        }
        if lower.contains("://") {
            return Err(FetchError::InvalidSource(format!("unsupported scheme in '{}'", source)));
        }

        Ok(Self::Path(PathBuf::from(source)))
    }
}

impl fmt::Display for DictionarySource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Common trait for dictionary fetchers
#[async_trait]
pub trait DictionaryFetcher: Send + Sync + Debug {
    /// Fetch the dictionary text for `source`
    async fn fetch(&self, source: &DictionarySource) -> Result<String, FetchError>;
}

/// Reads dictionaries from the local filesystem
#[derive(Debug, Default, Clone)]
pub struct FileFetcher;

#[async_trait]
impl DictionaryFetcher for FileFetcher {
    async fn fetch(&self, source: &DictionarySource) -> Result<String, FetchError> {
        let DictionarySource::Path(path) = source else {
            return Err(FetchError::InvalidSource(format!("{} is not a local path", source)));
        };

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| FetchError::File(format!("{}: {}", path.display(), e)))?;
        String::from_utf8(bytes).map_err(|e| FetchError::NotText(format!("{}: {}", path.display(), e)))
    }
}

/// Downloads dictionaries over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// HTTP client for making requests
    client: Client,
    /// Directory holding previously downloaded dictionaries, if caching
    cache_dir: Option<PathBuf>,
}

impl HttpFetcher {
    /// Create a fetcher with the given request timeout and no disk cache
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            cache_dir: None,
        }
    }

    /// Keep downloads under `dir`, keyed by URL
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Default cache location inside the user's cache directory
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join("ass2srt")
            .join("dictionaries")
    }

    /// Cache file for `url`: SHA-256 of the URL in hex
    pub fn cache_path(dir: &Path, url: &Url) -> PathBuf {
        let digest = Sha256::digest(url.as_str().as_bytes());
        let name: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        dir.join(format!("{}.txt", name))
    }

    async fn download(&self, url: &Url) -> Result<String, FetchError> {
        debug!("Downloading dictionary from {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::RequestFailed(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
            error!("Dictionary download failed ({}): {}", status, url);
            return Err(FetchError::HttpStatus {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let body: Bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::RequestFailed(format!("{}: {}", url, e)))?;
        String::from_utf8(body.to_vec()).map_err(|e| FetchError::NotText(format!("{}: {}", url, e)))
    }

    async fn store(path: &Path, text: &str) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create cache directory: {}", parent.display()))?;
        }
        tokio::fs::write(path, text)
            .await
            .with_context(|| format!("Failed to write cached dictionary: {}", path.display()))?;
        Ok(())
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(30)
    }
}

#[async_trait]
impl DictionaryFetcher for HttpFetcher {
    async fn fetch(&self, source: &DictionarySource) -> Result<String, FetchError> {
        let DictionarySource::Url(url) = source else {
            return Err(FetchError::InvalidSource(format!("{} is not a URL", source)));
        };

        let cache_path = self.cache_dir.as_deref().map(|dir| Self::cache_path(dir, url));
        if let Some(path) = &cache_path {
            if let Ok(text) = tokio::fs::read_to_string(path).await {
                debug!("Using cached dictionary {} for {}", path.display(), url);
                return Ok(text);
            }
        }

        let text = self.download(url).await?;

        // Cache write failures are not fatal
        if let Some(path) = &cache_path {
            if let Err(e) = Self::store(path, &text).await {
                warn!("{:#}", e);
            }
        }

        Ok(text)
    }
}

/// Fetch dictionary text from any supported source
pub async fn fetch_dictionary(source: &DictionarySource, http: &HttpFetcher) -> Result<String, FetchError> {
    match source {
        DictionarySource::Path(_) => FileFetcher.fetch(source).await,
        DictionarySource::Url(_) => http.fetch(source).await,
    }
}
