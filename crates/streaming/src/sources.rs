//! The `DocumentSource` trait and its filesystem, HTTP and in-memory
//! implementations.
//!
//! Paths are the document locations of the map configuration (a world's base
//! path joined with a layer path, e.g. `/worlds/main/markers.json`). Each
//! source resolves them against its own root.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

#[derive(Debug)]
pub struct SourceError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {source}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(format!("document not found: {path}"))
    }
}

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A place documents are fetched from.
///
/// Implementations must be `Send + Sync`; methods return boxed futures for
/// dyn-compatibility.
pub trait DocumentSource: Send + Sync {
    fn name(&self) -> &str;

    /// The full document body. A missing document is an error.
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<u8>, SourceError>>;
}

/// Documents under a local directory.
pub struct FilesystemSource {
    root: PathBuf,
}

impl FilesystemSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl DocumentSource for FilesystemSource {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<u8>, SourceError>> {
        let file = self.resolve(path);
        Box::pin(async move {
            match tokio::fs::read(&file).await {
                Ok(data) => Ok(data),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SourceError::not_found(path)),
                Err(e) => Err(SourceError::with_source(
                    format!("failed to read {}", file.display()),
                    e,
                )),
            }
        })
    }
}

/// Documents served over HTTP below a base URL.
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

    pub fn document_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl DocumentSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<u8>, SourceError>> {
        let url = self.document_url(path);
        Box::pin(async move {
            let resp = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| SourceError::with_source(format!("GET {url} failed"), e))?;

            if resp.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(SourceError::not_found(path));
            }
            if !resp.status().is_success() {
                return Err(SourceError::new(format!("GET {url}: HTTP {}", resp.status())));
            }

            let bytes = resp
                .bytes()
                .await
                .map_err(|e| SourceError::with_source("failed to read response body", e))?;
            Ok(bytes.to_vec())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Started,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchLogEntry {
    pub path: String,
    pub phase: FetchPhase,
}

struct MemoryDocument {
    body: Vec<u8>,
    latency: Duration,
}

/// In-memory documents with optional per-document latency, for tests and
/// offline use. Every fetch is recorded in a log.
#[derive(Default)]
pub struct MemorySource {
    documents: RwLock<HashMap<String, MemoryDocument>>,
    log: Mutex<Vec<FetchLogEntry>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, path: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.insert_with_latency(path, body, Duration::ZERO).await;
    }

    pub async fn insert_with_latency(
        &self,
        path: impl Into<String>,
        body: impl Into<Vec<u8>>,
        latency: Duration,
    ) {
        self.documents.write().await.insert(
            path.into(),
            MemoryDocument {
                body: body.into(),
                latency,
            },
        );
    }

    pub async fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.documents.write().await.remove(path).map(|d| d.body)
    }

    pub async fn fetch_log(&self) -> Vec<FetchLogEntry> {
        self.log.lock().await.clone()
    }

    async fn record(&self, path: &str, phase: FetchPhase) {
        self.log.lock().await.push(FetchLogEntry {
            path: path.to_string(),
            phase,
        });
    }
}

impl DocumentSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<u8>, SourceError>> {
        Box::pin(async move {
            self.record(path, FetchPhase::Started).await;
            let found = self
                .documents
                .read()
                .await
                .get(path)
                .map(|d| (d.body.clone(), d.latency));
            let result = match found {
                Some((body, latency)) => {
                    if !latency.is_zero() {
                        debug!(path, ?latency, "delaying memory document");
                        tokio::time::sleep(latency).await;
                    }
                    Ok(body)
                }
                None => Err(SourceError::not_found(path)),
            };
            self.record(path, FetchPhase::Finished).await;
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentSource, FetchLogEntry, FetchPhase, FilesystemSource, HttpSource, MemorySource};
    use std::time::Duration;

    #[tokio::test]
    async fn filesystem_resolves_against_root() {
        let dir = std::env::temp_dir().join(format!("regionmap_fs_source_{}", std::process::id()));
        std::fs::create_dir_all(dir.join("worlds")).expect("mkdir");
        std::fs::write(dir.join("worlds/markers.json"), b"[]").expect("write");

        let source = FilesystemSource::new(&dir);
        let body = source.fetch("/worlds/markers.json").await.expect("fetch");
        assert_eq!(body, b"[]");

        let err = source.fetch("/worlds/missing.json").await.expect_err("missing");
        assert_eq!(err.message, "document not found: /worlds/missing.json");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn http_joins_base_and_path() {
        let source = HttpSource::new("https://maps.example.org/data/");
        assert_eq!(
            source.document_url("/worlds/markers.json"),
            "https://maps.example.org/data/worlds/markers.json"
        );
    }

    #[tokio::test]
    async fn memory_source_logs_fetches() {
        let source = MemorySource::new();
        source
            .insert_with_latency("/a.json", "[1]", Duration::from_millis(5))
            .await;
        assert_eq!(source.fetch("/a.json").await.expect("a"), b"[1]");
        assert!(source.fetch("/b.json").await.is_err());

        let log = source.fetch_log().await;
        let entry = |path: &str, phase| FetchLogEntry {
            path: path.to_string(),
            phase,
        };
        assert_eq!(
            log,
            vec![
                entry("/a.json", FetchPhase::Started),
                entry("/a.json", FetchPhase::Finished),
                entry("/b.json", FetchPhase::Started),
                entry("/b.json", FetchPhase::Finished),
            ]
        );
    }
}
