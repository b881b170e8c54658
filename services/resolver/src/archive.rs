//! Remote archive access: directory listings and file fetches.
//!
//! The archive is laid out as `{run-date}/{cycle-hour}/core/{filename}`.
//! Paths passed to an [`Archive`] are relative to its root and use `/`
//! separators; an empty path is the root itself.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio::fs;
use tracing::{debug, info};

use crate::download::{prepare_destination, stream_to_file};
use crate::error::ResolveError;

/// Production NOMADS mirror of the blend archive.
pub const DEFAULT_ARCHIVE_URL: &str = "https://nomads.ncep.noaa.gov/pub/data/nccf/com/blend/prod/";

/// A browsable file archive.
#[async_trait]
pub trait Archive: Send + Sync {
    /// Names of the entries directly under `path`, without trailing slashes
    /// or navigation links, in the order the archive returned them.
    async fn list(&self, path: &str) -> Result<Vec<String>, ResolveError>;

    /// Copy the file at `path` to `dest`, returning the bytes written.
    async fn fetch(&self, path: &str, dest: &Path) -> Result<u64, ResolveError>;

    /// Human-readable location for logs.
    fn location(&self) -> String;
}

/// Archive served as Apache-style HTML directory indexes.
pub struct HttpArchive {
    client: Client,
    base_url: String,
}

impl HttpArchive {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ResolveError::archive(base_url, e))?;

        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Archive for HttpArchive {
    async fn list(&self, path: &str) -> Result<Vec<String>, ResolveError> {
        let url = if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/", self.url(path).trim_end_matches('/'))
        };
        debug!(url = %url, "Listing archive directory");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ResolveError::archive(path, e))?;
        match response.status() {
            StatusCode::OK => {}
            // A missing directory lists as empty
            StatusCode::NOT_FOUND => return Ok(Vec::new()),
            status => return Err(ResolveError::archive(path, format!("HTTP error: {}", status))),
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResolveError::archive(path, e))?;
        Ok(parse_listing(&body))
    }

    async fn fetch(&self, path: &str, dest: &Path) -> Result<u64, ResolveError> {
        let url = self.url(path);
        info!(url = %url, dest = %dest.display(), "Starting download");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ResolveError::archive(path, e))?;
        if !response.status().is_success() {
            return Err(ResolveError::archive(
                path,
                format!("HTTP error: {}", response.status()),
            ));
        }

        stream_to_file(response.bytes_stream(), dest).await
    }

    fn location(&self) -> String {
        self.base_url.clone()
    }
}

/// Entry names from the `href` attributes of a directory index page.
///
/// Parent links, column-sort queries, absolute URLs and anchors are
/// dropped; a trailing `/` marking a directory is removed.
pub fn parse_listing(html: &str) -> Vec<String> {
    // ASCII lowering keeps byte offsets valid in `html`
    let lower = html.to_ascii_lowercase();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut entries: Vec<String> = Vec::new();
    let mut cursor = 0;

    while let Some(found) = lower[cursor..].find(HREF) {
        cursor += found + HREF.len();
        let rest = &html[cursor..];
        let Some(quote) = rest.chars().next() else {
            break;
        };
        if quote != '"' && quote != '\'' {
            continue;
        }
        let Some(end) = rest[1..].find(quote) else {
            break;
        };
        let target = &rest[1..1 + end];
        cursor += end + 2;

        if target.is_empty()
            || target.starts_with('?')
            || target.starts_with('#')
            || target.starts_with('/')
            || target.starts_with("..")
            || target.contains("://")
        {
            continue;
        }

        let name = target.trim_end_matches('/');
        if name.is_empty() || name.contains('/') {
            continue;
        }
        if seen.insert(name) {
            entries.push(name.to_string());
        }
    }

    entries
}

const HREF: &str = "href=";

/// Archive mirrored on the local filesystem.
pub struct LocalArchive {
    root: PathBuf,
}

impl LocalArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

#[async_trait]
impl Archive for LocalArchive {
    async fn list(&self, path: &str) -> Result<Vec<String>, ResolveError> {
        let dir = self.resolve(path);
        let mut reader = match fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ResolveError::io(&dir, e)),
        };

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| ResolveError::io(&dir, e))?
        {
            entries.push(entry.file_name().to_string_lossy().into_owned());
        }
        // Directory order is filesystem dependent
        entries.sort();
        Ok(entries)
    }

    async fn fetch(&self, path: &str, dest: &Path) -> Result<u64, ResolveError> {
        let src = self.resolve(path);
        info!(src = %src.display(), dest = %dest.display(), "Copying from local archive");
        prepare_destination(dest).await?;
        fs::copy(&src, dest)
            .await
            .map_err(|e| ResolveError::io(&src, e))
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}
