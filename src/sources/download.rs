//! Fetching remote resources.
//!
//! [`Fetch`] is the network seam; [`HttpFetcher`] is the real implementation
//! on top of `reqwest`'s blocking client. A [`Downloader`] wraps a fetcher
//! with an in-memory response cache that lives exactly as long as the
//! downloader, i.e. one build. Resources requested more than once during a
//! build (the launcher manifest is fetched once per entry point) hit the
//! network once.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use url::Url;

use crate::core::errors::BuildError;
use crate::util::shell::Shell;

/// Retrieves the body of a URL.
pub trait Fetch {
    /// GET `url`. A non-success status is an error
    /// ([`BuildError::DownloadFailed`]).
    fn fetch(&mut self, url: &Url) -> Result<Vec<u8>>;
}

/// HTTP(S) fetcher using a blocking `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    shell: Arc<Shell>,
}

impl HttpFetcher {
    /// Create a fetcher that reports progress through `shell`.
    pub fn new(shell: Arc<Shell>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("py2win/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<std::time::Duration>)
            .build()
            .context("failed to create HTTP client")?;

        Ok(HttpFetcher { client, shell })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&mut self, url: &Url) -> Result<Vec<u8>> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("failed to download {}", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BuildError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let total = response.content_length();
        let mut progress = self.shell.bytes_progress(file_name(url), total);
        let mut body = Vec::with_capacity(total.unwrap_or(0) as usize);
        let mut chunk = vec![0u8; 64 * 1024];

        loop {
            let n = response
                .read(&mut chunk)
                .with_context(|| format!("failed to read response body from {}", url))?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
            progress.inc(n as u64);
        }
        progress.finish();

        Ok(body)
    }
}

/// Last path segment of a URL, for progress messages.
fn file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .unwrap_or(url.as_str())
        .to_string()
}

/// Fetches URLs to files, caching responses for the lifetime of one build.
pub struct Downloader {
    fetcher: Box<dyn Fetch>,
    cache: HashMap<Url, Vec<u8>>,
    requests: Vec<String>,
}

impl Downloader {
    pub fn new(fetcher: Box<dyn Fetch>) -> Self {
        Downloader {
            fetcher,
            cache: HashMap::new(),
            requests: Vec::new(),
        }
    }

    /// Body of `url`, from the cache when it was fetched before.
    pub fn get(&mut self, url: &str) -> Result<&[u8]> {
        let url = Url::parse(url).with_context(|| format!("invalid URL: {}", url))?;

        if !self.cache.contains_key(&url) {
            tracing::info!("downloading {}", url);
            self.requests.push(url.to_string());
            let body = self.fetcher.fetch(&url)?;
            self.cache.insert(url.clone(), body);
        } else {
            tracing::debug!("using cached response for {}", url);
        }

        Ok(self.cache.get(&url).map(Vec::as_slice).unwrap_or_default())
    }

    /// Fetch `url` and write the body to `dest`.
    pub fn download(&mut self, url: &str, dest: &Path) -> Result<()> {
        let body = self.get(url)?;
        std::fs::write(dest, body)
            .with_context(|| format!("failed to write {}", dest.display()))?;
        Ok(())
    }

    /// URLs that went to the network, in request order.
    pub fn requests(&self) -> &[String] {
        &self.requests
    }
}
