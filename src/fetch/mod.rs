//! HTTP probing and page retrieval
//!
//! [`PaperFetcher`] owns the HTTP clients and implements the shared request
//! semantics: a fixed informational User-Agent, disabled TLS verification,
//! optional proxy, bounded retries with a fixed pause, and a 404
//! short-circuit. [`PageFetcher`] builds on it with the per-page resolution
//! rules of each layout and the sequential, cancellable fetch loop.

pub mod retry;

pub use retry::RetryPolicy;

use std::path::Path;
use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect, Client, StatusCode};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::batch::CancelFlag;
use crate::config::NetworkConfig;
use crate::error::{Error, FetchError, Result};
use crate::models::{Edition, FetchSummary, Layout, Page, PageStatus};
use crate::parser::MarkupParser;
use crate::site::SiteUrls;

/// Media type a page download must declare
const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Smallest byte count accepted as a real page file
pub const MIN_PAGE_BYTES: u64 = 1024;

/// HTTP client pair with the site's shared request semantics
///
/// Probes use a short timeout and never follow redirects (a redirect on a
/// cover page means the edition is absent, not moved); binary downloads get
/// a longer timeout and follow redirects normally.
pub struct PaperFetcher {
    probe_client: Client,
    download_client: Client,
    retry: RetryPolicy,
}

impl PaperFetcher {
    /// Build the client pair from network settings
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if a client cannot be constructed,
    /// including an invalid proxy endpoint.
    pub fn new(network: &NetworkConfig, retry: RetryPolicy) -> std::result::Result<Self, FetchError> {
        let mut probe = Client::builder()
            .user_agent(network.user_agent.clone())
            .timeout(network.probe_timeout())
            .redirect(redirect::Policy::none())
            .danger_accept_invalid_certs(true);

        let mut download = Client::builder()
            .user_agent(network.user_agent.clone())
            .timeout(network.download_timeout())
            .danger_accept_invalid_certs(true);

        if let Some(proxy) = &network.proxy {
            let handle = proxy.to_reqwest().map_err(FetchError::from)?;
            probe = probe.proxy(handle.clone());
            download = download.proxy(handle);
        }

        Ok(Self {
            probe_client: probe.build().map_err(FetchError::from)?,
            download_client: download.build().map_err(FetchError::from)?,
            retry,
        })
    }

    /// Retrieve an HTML document, distinguishing absence from failure
    ///
    /// Returns `Ok(Some(body))` on 200, `Ok(None)` on a definitive 404 or
    /// once the retry budget is exhausted. Any other status or a transport
    /// error pauses and retries.
    pub async fn probe(&self, url: &str) -> std::result::Result<Option<String>, FetchError> {
        for attempt in 1..=self.retry.max_attempts {
            let pause = self.retry.pause_before(attempt);
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }

            match self.probe_client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::OK {
                        return Ok(Some(response.text().await?));
                    }
                    if status == StatusCode::NOT_FOUND {
                        debug!(url, "probe: not found");
                        return Ok(None);
                    }
                    warn!(
                        url,
                        status = status.as_u16(),
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        "probe: unexpected status"
                    );
                }
                Err(err) => {
                    warn!(
                        url,
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        error = %err,
                        "probe: request failed"
                    );
                }
            }
        }

        debug!(url, "probe: attempts exhausted");
        Ok(None)
    }

    /// Download one binary page to `dest` with bounded retries
    ///
    /// Each attempt streams the body to the file in chunks and then checks
    /// the size floor. A non-PDF content type fails the attempt outright
    /// but still counts against the shared budget.
    ///
    /// # Errors
    ///
    /// Returns the last attempt's error once the budget is exhausted.
    pub async fn download(&self, url: &str, dest: &Path) -> std::result::Result<u64, FetchError> {
        let mut last_error = None;

        for attempt in 1..=self.retry.max_attempts {
            let pause = self.retry.pause_before(attempt);
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }

            match self.download_attempt(url, dest).await {
                Ok(bytes) => {
                    if attempt > 1 {
                        debug!(url, attempt, "download succeeded after retry");
                    }
                    return Ok(bytes);
                }
                // definitive absence, pointless to retry
                Err(FetchError::NotFound) => {
                    debug!(url, "download: not found");
                    return Err(FetchError::NotFound);
                }
                Err(err) => {
                    warn!(
                        url,
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        error = %err,
                        "download attempt failed"
                    );
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or(FetchError::AttemptsExhausted {
            attempts: self.retry.max_attempts,
        }))
    }

    async fn download_attempt(&self, url: &str, dest: &Path) -> std::result::Result<u64, FetchError> {
        let response = self.download_client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::ServerStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains(PDF_MEDIA_TYPE) {
            return Err(FetchError::NotPdf(content_type));
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        let mut response = response;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        if written < MIN_PAGE_BYTES {
            return Err(FetchError::Undersized { size: written });
        }
        Ok(written)
    }
}

/// Per-page retrieval on top of [`PaperFetcher`]
pub struct PageFetcher {
    client: Arc<PaperFetcher>,
    site: SiteUrls,
    markup: MarkupParser,
}

impl PageFetcher {
    pub fn new(client: Arc<PaperFetcher>, site: SiteUrls) -> Self {
        Self {
            client,
            site,
            markup: MarkupParser::new(),
        }
    }

    /// Resolve the binary URL of one page
    ///
    /// Legacy pages are addressed directly. Current-layout pages go through
    /// the node document first; an unreachable node or a missing attachment
    /// reference fails the page without further retries.
    async fn resolve_page_url(
        &self,
        edition: &Edition,
        index: u32,
    ) -> std::result::Result<String, FetchError> {
        match edition.layout {
            Layout::Legacy => Ok(self.site.legacy_page(&edition.date, index)),
            Layout::Current => {
                let node_url = self.site.current_node(&edition.date, index);
                let html = self
                    .client
                    .probe(&node_url)
                    .await?
                    .ok_or(FetchError::NodeUnreachable { page: index })?;
                let path = self
                    .markup
                    .attachment_path(&html)
                    .ok_or(FetchError::AttachmentMissing { page: index })?;
                Ok(self.site.attachment(path))
            }
        }
    }

    /// Fetch one page into the workspace, never propagating page failures
    pub async fn fetch_page(&self, edition: &Edition, index: u32, workspace: &Path) -> Page {
        let file = workspace.join(edition.date.page_file_name(index));
        let mut page = Page::new(index, file);

        match self.resolve_page_url(edition, index).await {
            Ok(url) => {
                page.url = url;
                match self.client.download(&page.url, &page.file).await {
                    Ok(bytes) => {
                        debug!(
                            date = %edition.date,
                            page = index,
                            url = %page.url,
                            bytes,
                            "page retrieved"
                        );
                        page.status = PageStatus::Success;
                    }
                    Err(err) => {
                        warn!(
                            date = %edition.date,
                            page = index,
                            url = %page.url,
                            error = %err,
                            "page download failed"
                        );
                        page.status = PageStatus::Failed;
                    }
                }
            }
            Err(err) => {
                warn!(
                    date = %edition.date,
                    page = index,
                    error = %err,
                    "page source unresolved"
                );
                page.status = PageStatus::Failed;
            }
        }

        page
    }

    /// Fetch every page of the edition, strictly in order
    ///
    /// Cancellation is checked between pages only; an in-flight download
    /// always runs to completion or failure first. Per-page failures are
    /// tallied, never escalated. Fewer successes than expected is reported
    /// as a degraded download in the returned summary, not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Interrupted`] when cancellation is observed.
    pub async fn fetch_edition(
        &self,
        edition: &Edition,
        workspace: &Path,
        cancel: &CancelFlag,
    ) -> Result<FetchSummary> {
        let mut summary = FetchSummary::new(edition.pages);

        for index in 1..=edition.pages {
            if cancel.is_cancelled() {
                warn!(date = %edition.date, page = index, "fetch loop interrupted");
                return Err(Error::Interrupted);
            }
            let page = self.fetch_page(edition, index, workspace).await;
            summary.record(&page);
        }

        if !summary.is_complete() {
            warn!(
                date = %edition.date,
                succeeded = summary.succeeded,
                total = summary.total,
                failed = ?summary.failed,
                "edition download degraded"
            );
        }
        Ok(summary)
    }
}
