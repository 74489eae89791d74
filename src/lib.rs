//! rmrb-dl - People's Daily PDF edition downloader
//!
//! Downloads one calendar day's paginated newspaper edition from
//! paper.people.com.cn, detecting which of the two known site layouts is
//! live, retrieving every page with bounded retries, and merging the pages
//! into a single ordered PDF. A date-range mode repeats the process per
//! day with per-day failure isolation.
//!
//! # Architecture
//!
//! - [`date`] - Edition date validation, range expansion, and formatting
//! - [`site`] - Deterministic URL templates for both layouts
//! - [`parser`] - Markup adapter: page-count markers and attachment paths
//! - [`fetch`] - HTTP probing and streaming page downloads with retries
//! - [`locate`] - Layout detection and page-count discovery
//! - [`merge`] - Ordered assembly of page files into one document
//! - [`batch`] - Per-date orchestration and batch execution
//! - [`config`] - Configuration and proxy validation
//! - [`models`] - Core data structures
//! - [`error`] - Unified error handling
//!
//! # Example
//!
//! ```no_run
//! use rmrb_dl::batch::{BatchOrchestrator, CancelFlag};
//! use rmrb_dl::config::Config;
//! use rmrb_dl::date::EditionDate;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let orchestrator = BatchOrchestrator::new(&config, CancelFlag::new())?;
//!     let outcome = orchestrator.run_date(EditionDate::today()).await;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod date;
pub mod error;
pub mod fetch;
pub mod locate;
pub mod merge;
pub mod models;
pub mod parser;
pub mod site;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::batch::{BatchOrchestrator, CancelFlag};
    pub use crate::config::{Config, ProxyConfig};
    pub use crate::date::EditionDate;
    pub use crate::error::{Error, Result};
    pub use crate::models::{BatchReport, DateOutcome, DateStatus, Edition, Layout};
}

pub use error::{Error, Result};
