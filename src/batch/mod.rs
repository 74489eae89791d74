//! Per-date orchestration and batch execution
//!
//! One date's run is: idempotent-skip check, exclusive temp workspace,
//! locate, sequential page fetch, assemble, publish. The workspace is a
//! [`tempfile::TempDir`], so it is removed on every exit path — success,
//! failure, or cancellation. In range mode the dates run ascending and a
//! failed date never stops the batch; only a process-wide interruption
//! does.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::date::EditionDate;
use crate::error::{Error, MergeError, Result};
use crate::fetch::{PageFetcher, PaperFetcher};
use crate::locate::EditionLocator;
use crate::merge::{Assembler, PdfOxideEngine};
use crate::models::{BatchReport, DateOutcome, DateStatus};
use crate::site::SiteUrls;

/// Cooperative cancellation flag, set once and observed at loop boundaries
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs the locate → fetch → assemble pipeline per date
pub struct BatchOrchestrator {
    locator: EditionLocator,
    fetcher: PageFetcher,
    assembler: Assembler,
    output_dir: PathBuf,
    cancel: CancelFlag,
}

impl BatchOrchestrator {
    /// Wire the production components from configuration
    ///
    /// # Errors
    ///
    /// Returns a fetch error if the HTTP clients cannot be built.
    pub fn new(config: &Config, cancel: CancelFlag) -> Result<Self> {
        let client = Arc::new(PaperFetcher::new(&config.network, config.retry_policy())?);
        let site = SiteUrls::new();
        Ok(Self::with_components(
            EditionLocator::new(Arc::clone(&client), site.clone()),
            PageFetcher::new(client, site),
            Assembler::new(Box::new(PdfOxideEngine)),
            config.paths.output_dir.clone(),
            cancel,
        ))
    }

    /// Assemble an orchestrator from explicit parts (tests swap these out)
    pub fn with_components(
        locator: EditionLocator,
        fetcher: PageFetcher,
        assembler: Assembler,
        output_dir: PathBuf,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            locator,
            fetcher,
            assembler,
            output_dir,
            cancel,
        }
    }

    /// Run the pipeline for a single date
    ///
    /// Never panics or propagates: every failure mode is folded into the
    /// returned [`DateOutcome`] so batch callers can keep going.
    pub async fn run_date(&self, date: EditionDate) -> DateOutcome {
        let output_path = self.output_dir.join(date.output_file_name());

        if output_path.exists() {
            info!(
                date = %date,
                file = %output_path.display(),
                "edition already downloaded, skipping"
            );
            return DateOutcome {
                date,
                status: DateStatus::AlreadyExists,
            };
        }

        let status = match self.run_date_inner(date, &output_path).await {
            Ok(status) => status,
            Err(Error::Interrupted) => DateStatus::Interrupted,
            Err(err) => {
                error!(date = %date, error = %err, "date failed");
                DateStatus::Failed {
                    reason: err.to_string(),
                }
            }
        };
        DateOutcome { date, status }
    }

    async fn run_date_inner(&self, date: EditionDate, output_path: &Path) -> Result<DateStatus> {
        // RAII workspace: removed on success, failure, and cancellation alike
        let workspace = tempfile::Builder::new().prefix("rmrb-").tempdir()?;

        let edition = self.locator.locate(date).await?;
        let summary = self
            .fetcher
            .fetch_edition(&edition, workspace.path(), &self.cancel)
            .await?;

        if summary.succeeded == 0 {
            return Err(MergeError::NoValidPages.into());
        }

        let pages = self.assembler.assemble(workspace.path(), output_path)?;
        Ok(DateStatus::Completed {
            pages: pages as u32,
            total: edition.pages,
        })
    }

    /// Run the pipeline for every date in the list, ascending
    ///
    /// Per-date failures are isolated; the batch is "completed" once every
    /// date has been attempted. A process-wide interruption stops the loop
    /// before the next date starts.
    pub async fn run_range(&self, dates: &[EditionDate]) -> BatchReport {
        info!(days = dates.len(), "starting batch download");
        let mut report = BatchReport::default();

        for &date in dates {
            if self.cancel.is_cancelled() {
                warn!(date = %date, "batch interrupted before this date");
                report.outcomes.push(DateOutcome {
                    date,
                    status: DateStatus::Interrupted,
                });
                break;
            }

            let outcome = self.run_date(date).await;
            match &outcome.status {
                DateStatus::Completed { pages, total } => {
                    info!(date = %date, pages, total, "date completed");
                }
                DateStatus::AlreadyExists => {}
                DateStatus::Failed { reason } => {
                    warn!(date = %date, reason = %reason, "date failed, continuing");
                }
                DateStatus::Interrupted => {
                    warn!(date = %date, "date interrupted");
                }
            }
            report.outcomes.push(outcome);

            if report.was_interrupted() {
                break;
            }
        }

        info!(
            total = report.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "batch finished"
        );
        report
    }
}
