//! Unified error handling for the rmrb-dl crate
//!
//! Domain-specific error enums cover the four failure surfaces (date
//! validation, edition location, page fetching, merging); the [`Error`]
//! enum unifies them across module boundaries while preserving detail.

use chrono::NaiveDate;
use std::io;
use thiserror::Error;

/// Errors produced while validating a date or date range
#[derive(Error, Debug)]
pub enum DateError {
    /// Input matched none of the accepted encodings
    #[error("unrecognized date '{input}' (accepted: YYYYMMDD, YYYY-MM-DD, YYYY/MM/DD, YYYY-MM/DD, YYYYMM/DD)")]
    UnrecognizedFormat { input: String },

    /// Date lies after the current day
    #[error("date {0} is in the future; editions exist only up to today")]
    InFuture(NaiveDate),

    /// Date lies before the first archived edition
    #[error("date {0} predates the archive; editions start in 2003")]
    TooEarly(NaiveDate),

    /// Range string did not contain exactly 16 digits
    #[error("date range must contain exactly 16 digits (two YYYYMMDD dates), got {0}")]
    BadRangeLength(usize),

    /// Range start is after range end
    #[error("range start {start} is after range end {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
}

/// Errors produced while locating an edition
#[derive(Error, Debug)]
pub enum LocateError {
    /// Neither the current nor the legacy cover page was reachable
    #[error("no edition found for {0} on either site layout")]
    EditionNotFound(NaiveDate),
}

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// Request timeout
    #[error("request timeout")]
    Timeout,

    /// Definitive absence; never retried
    #[error("resource not found (404)")]
    NotFound,

    /// Unexpected HTTP status
    #[error("server returned status {0}")]
    ServerStatus(u16),

    /// Response body was not a PDF
    #[error("response is not a PDF (content-type: '{0}')")]
    NotPdf(String),

    /// Downloaded file below the validity floor
    #[error("downloaded file too small: {size} bytes")]
    Undersized { size: u64 },

    /// Current-layout node page could not be retrieved
    #[error("page {page}: layout node page unreachable")]
    NodeUnreachable { page: u32 },

    /// Node page retrieved but no attachment reference in it
    #[error("page {page}: attachment link not found")]
    AttachmentMissing { page: u32 },

    /// Every attempt of the retry budget failed
    #[error("all {attempts} attempts failed")]
    AttemptsExhausted { attempts: u32 },

    /// I/O error while writing the page file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

impl FetchError {
    /// Whether another attempt of the same call could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout | Self::ServerStatus(_) | Self::Io(_) => true,
            Self::NotFound
            | Self::NotPdf(_)
            | Self::Undersized { .. }
            | Self::NodeUnreachable { .. }
            | Self::AttachmentMissing { .. }
            | Self::AttemptsExhausted { .. } => false,
        }
    }
}

/// Errors produced while assembling page files into one document
#[derive(Error, Debug)]
pub enum MergeError {
    /// No candidate file survived the validity filter
    #[error("no valid page files to merge")]
    NoValidPages,

    /// A retained input could not be parsed by the merge engine
    #[error("cannot merge '{file}': {reason}")]
    Corrupt { file: String, reason: String },

    /// The engine failed to write the composite
    #[error("merge engine error: {0}")]
    Engine(String),

    /// I/O error while listing or publishing files
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Unified error type for the rmrb-dl crate
#[derive(Error, Debug)]
pub enum Error {
    /// Date validation errors
    #[error("date error: {0}")]
    Date(#[from] DateError),

    /// Edition location errors
    #[error("locate error: {0}")]
    Locate(#[from] LocateError),

    /// Fetch errors
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Merge errors
    #[error("merge error: {0}")]
    Merge(#[from] MergeError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("config error: {0}")]
    Config(String),

    /// Cooperative cancellation was observed
    #[error("interrupted by user")]
    Interrupted,
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error is the user-initiated interruption
    pub fn is_interruption(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
