// Core data structures for the edition-acquisition pipeline

use std::path::PathBuf;

use crate::date::EditionDate;

/// Which of the two known site structures serves a given date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Pre-redesign archive (`html/...` paths, direct per-page PDFs)
    Legacy,
    /// Post-redesign site (`pc/layout/...` paths, attachment indirection)
    Current,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Current => "current",
        }
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One calendar day's located edition
///
/// Produced once per run by the locator and immutable afterwards.
#[derive(Debug, Clone, Copy)]
pub struct Edition {
    pub date: EditionDate,
    pub layout: Layout,
    pub pages: u32,
}

impl Edition {
    pub fn new(date: EditionDate, layout: Layout, pages: u32) -> Self {
        Self { date, layout, pages }
    }
}

/// Retrieval state of one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Pending,
    Success,
    Failed,
}

/// One page of an edition during the fetch loop
///
/// Created lazily per page and discarded with the workspace after assembly.
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page index
    pub index: u32,
    /// Source URL, empty until resolved
    pub url: String,
    /// Target file inside the workspace
    pub file: PathBuf,
    pub status: PageStatus,
}

impl Page {
    pub fn new(index: u32, file: PathBuf) -> Self {
        Self {
            index,
            url: String::new(),
            file,
            status: PageStatus::Pending,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == PageStatus::Success
    }
}

/// Tally of one edition's fetch loop
#[derive(Debug, Clone)]
pub struct FetchSummary {
    /// Expected page count
    pub total: u32,
    /// Pages retrieved and validated
    pub succeeded: u32,
    /// Indices of pages that exhausted their attempts
    pub failed: Vec<u32>,
}

impl FetchSummary {
    pub fn new(total: u32) -> Self {
        Self {
            total,
            succeeded: 0,
            failed: Vec::new(),
        }
    }

    pub fn record(&mut self, page: &Page) {
        if page.succeeded() {
            self.succeeded += 1;
        } else {
            self.failed.push(page.index);
        }
    }

    /// Every expected page was retrieved
    pub fn is_complete(&self) -> bool {
        self.succeeded == self.total
    }
}

/// Terminal state of one date's pipeline run
#[derive(Debug, Clone)]
pub enum DateStatus {
    /// Edition merged and published
    Completed { pages: u32, total: u32 },
    /// Canonical output already existed; nothing was fetched
    AlreadyExists,
    /// The date failed; the batch continues
    Failed { reason: String },
    /// Cancellation was observed while this date was in flight
    Interrupted,
}

/// Outcome of one date, reported individually in batch mode
#[derive(Debug, Clone)]
pub struct DateOutcome {
    pub date: EditionDate,
    pub status: DateStatus,
}

impl DateOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            DateStatus::Completed { .. } | DateStatus::AlreadyExists
        )
    }
}

/// Per-date outcomes of a completed batch
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<DateOutcome>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn was_interrupted(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o.status, DateStatus::Interrupted))
    }
}
