use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::catalog::{Catalog, CatalogMeta};
use crate::config;

pub const DEFAULT_COLLECTION_FILE: &str = "collection.json";
pub const DEFAULT_WANTLIST_FILE: &str = "wantlist.json";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid base URL: {url}: {message}")]
    InvalidBase { url: String, message: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("{resource} request failed: {source}")]
    Request {
        resource: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{resource} HTTP {status}")]
    Status { resource: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {resource}: {source}")]
    Parse {
        resource: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the two resources live.
#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    Http(reqwest::Url),
    Dir(PathBuf),
}

impl Source {
    pub fn parse(raw: &str) -> Result<Self, LoadError> {
        let raw = raw.trim();
        let lower = raw.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            // a base without a trailing slash would lose its last segment on join
            let with_slash = if raw.ends_with('/') {
                raw.to_string()
            } else {
                format!("{raw}/")
            };
            let url = reqwest::Url::parse(&with_slash).map_err(|e| LoadError::InvalidBase {
                url: raw.to_string(),
                message: e.to_string(),
            })?;
            return Ok(Source::Http(url));
        }
        Ok(Source::Dir(config::expand_tilde(raw)))
    }
}

#[derive(Clone, Debug)]
pub struct LoaderOptions {
    pub source: Source,
    pub collection_file: String,
    pub wantlist_file: String,
    pub timeout_seconds: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            source: Source::Dir(PathBuf::from(".")),
            collection_file: DEFAULT_COLLECTION_FILE.to_string(),
            wantlist_file: DEFAULT_WANTLIST_FILE.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DataLoader {
    options: LoaderOptions,
    client: Option<reqwest::Client>,
}

impl DataLoader {
    pub fn new(options: LoaderOptions) -> Result<Self, LoadError> {
        let client = match options.source {
            Source::Http(_) => Some(build_client(options.timeout_seconds)?),
            Source::Dir(_) => None,
        };
        Ok(Self { options, client })
    }

    /// Fetches both resources together. Only the collection is required; a
    /// wantlist that cannot be fetched or parsed loads as empty.
    pub async fn load(&self) -> Result<Catalog, LoadError> {
        let (collection, wantlist) = futures::future::join(
            self.fetch(&self.options.collection_file),
            self.fetch(&self.options.wantlist_file),
        )
        .await;

        let collection = collection?;
        let wantlist = match wantlist {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::warn!("continuing without wantlist: {e}");
                None
            }
        };
        Ok(Catalog::new(collection, wantlist))
    }

    async fn fetch(&self, resource: &str) -> Result<CatalogMeta, LoadError> {
        let raw = match (&self.options.source, self.client.as_ref()) {
            (Source::Http(base), Some(client)) => fetch_http(client, base, resource).await?,
            (Source::Http(_), None) => {
                return Err(LoadError::InvalidBase {
                    url: resource.to_string(),
                    message: "no HTTP client".to_string(),
                })
            }
            (Source::Dir(dir), _) => {
                let path = dir.join(resource);
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| LoadError::Read {
                        path: path.display().to_string(),
                        source: e,
                    })?
            }
        };
        tracing::debug!("fetched {resource} ({} bytes)", raw.len());
        CatalogMeta::from_json(&raw).map_err(|e| LoadError::Parse {
            resource: resource.to_string(),
            source: e,
        })
    }
}

async fn fetch_http(
    client: &reqwest::Client,
    base: &reqwest::Url,
    resource: &str,
) -> Result<String, LoadError> {
    let url = base.join(resource).map_err(|e| LoadError::InvalidBase {
        url: base.to_string(),
        message: e.to_string(),
    })?;
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| LoadError::Request {
            resource: resource.to_string(),
            source: e,
        })?;
    let status = resp.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            resource: resource.to_string(),
            status: status.as_u16(),
        });
    }
    resp.text().await.map_err(|e| LoadError::Request {
        resource: resource.to_string(),
        source: e,
    })
}

fn build_client(timeout_seconds: u64) -> Result<reqwest::Client, LoadError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(concat!("recordshelf/", env!("CARGO_PKG_VERSION"))),
    );
    headers.insert(
        reqwest::header::CACHE_CONTROL,
        reqwest::header::HeaderValue::from_static("no-cache"),
    );
    headers.insert(
        reqwest::header::PRAGMA,
        reqwest::header::HeaderValue::from_static("no-cache"),
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| LoadError::HttpClientBuild { source: e })
}
