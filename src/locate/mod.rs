//! Edition location: layout detection and page-count discovery
//!
//! The site has served two structures over its lifetime. For any date the
//! locator probes the current-layout cover first; a retrievable cover with
//! at least one page marker wins. Otherwise it falls back to the legacy
//! cover, where even a marker count of zero is accepted as long as the
//! cover itself is reachable. Neither cover reachable means the edition
//! cannot be located at all.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::date::EditionDate;
use crate::error::{LocateError, Result};
use crate::fetch::PaperFetcher;
use crate::models::{Edition, Layout};
use crate::parser::MarkupParser;
use crate::site::SiteUrls;

/// Determines which layout serves a date and how many pages it has
pub struct EditionLocator {
    client: Arc<PaperFetcher>,
    site: SiteUrls,
    markup: MarkupParser,
}

impl EditionLocator {
    pub fn new(client: Arc<PaperFetcher>, site: SiteUrls) -> Self {
        Self {
            client,
            site,
            markup: MarkupParser::new(),
        }
    }

    /// Locate the edition for a date
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::EditionNotFound`] when neither cover probe
    /// succeeds; this is fatal for the date.
    pub async fn locate(&self, date: EditionDate) -> Result<Edition> {
        let current_cover = self.site.current_cover(&date);
        if let Some(html) = self.client.probe(&current_cover).await? {
            let pages = self.markup.current_page_count(&html);
            if pages > 0 {
                let edition = Edition::new(date, Layout::Current, pages as u32);
                info!(
                    date = %date,
                    pages = edition.pages,
                    layout = %edition.layout,
                    "edition located"
                );
                return Ok(edition);
            }
            debug!(date = %date, "current cover retrievable but carries no page markers");
        }

        let legacy_cover = self.site.legacy_cover(&date);
        if let Some(html) = self.client.probe(&legacy_cover).await? {
            let edition = Edition::new(date, Layout::Legacy, self.markup.legacy_page_count(&html) as u32);
            info!(
                date = %date,
                pages = edition.pages,
                layout = %edition.layout,
                "edition located"
            );
            return Ok(edition);
        }

        error!(date = %date, "edition not found on either layout");
        Err(LocateError::EditionNotFound(date.date()).into())
    }
}
