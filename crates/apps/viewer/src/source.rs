//! Where the dataset document comes from.
//!
//! The session awaits exactly one `fetch` per load; sources never retry.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use formats::{FeatureCollection, LoadError, decode_geojson_body, decode_geojson_response};

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A root that resolves dataset paths to parsed FeatureCollections.
///
/// Methods return boxed futures for dyn-compatibility.
pub trait DataSource: Send + Sync {
    /// Human-readable location of `path`, for logs.
    fn locate(&self, path: &str) -> String;

    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<FeatureCollection, LoadError>>;
}

/// GET against a base URL; dataset paths are resolved relative to it.
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn resolve(&self, path: &str) -> Result<reqwest::Url, LoadError> {
        let base = reqwest::Url::parse(&self.base_url)
            .map_err(|e| LoadError::Transport(format!("invalid base url {}: {e}", self.base_url)))?;
        base.join(path)
            .map_err(|e| LoadError::Transport(format!("invalid dataset path {path}: {e}")))
    }
}

impl DataSource for HttpSource {
    fn locate(&self, path: &str) -> String {
        match self.resolve(path) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{path}", self.base_url),
        }
    }

    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<FeatureCollection, LoadError>> {
        Box::pin(async move {
            let url = self.resolve(path)?;
            let resp = self
                .client
                .get(url)
                .header(reqwest::header::CACHE_CONTROL, "no-cache")
                .send()
                .await
                .map_err(|e| LoadError::Transport(e.to_string()))?;

            let status = resp.status();
            let body = resp
                .text()
                .await
                .map_err(|e| LoadError::Transport(e.to_string()))?;
            decode_geojson_response(status.as_u16(), status.canonical_reason(), &body)
        })
    }
}

/// Reads datasets from a local directory.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl DataSource for FileSource {
    fn locate(&self, path: &str) -> String {
        self.root.join(path).display().to_string()
    }

    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<FeatureCollection, LoadError>> {
        let path = self.root.join(path);
        Box::pin(async move {
            let body = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| LoadError::Io { path, source })?;
            decode_geojson_body(&body)
        })
    }
}

/// A document embedded by the host page; every path resolves to it.
pub struct InlineSource {
    payload: String,
}

impl InlineSource {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

impl DataSource for InlineSource {
    fn locate(&self, _path: &str) -> String {
        "inline".to_string()
    }

    fn fetch<'a>(&'a self, _path: &'a str) -> BoxFuture<'a, Result<FeatureCollection, LoadError>> {
        Box::pin(async move { decode_geojson_body(&self.payload) })
    }
}
