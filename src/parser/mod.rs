//! Markup adapter for the two site layouts
//!
//! The site publishes no API; page counts and attachment locations are
//! scraped from cover and node documents. This module is the only place
//! that knows what the markup looks like, with a narrow contract: given a
//! document, return a page count or an attachment path. Markup drift on
//! the upstream site shows up here first.

use regex::Regex;

/// Marker whose occurrence count equals the page count on current-layout covers
pub const CURRENT_PAGE_MARKER: &str = "pageLink";

/// Marker whose occurrence count equals the page count on legacy-layout covers
pub const LEGACY_PAGE_MARKER: &str = "nbs";

/// Extracts page counts and attachment paths from raw site markup
pub struct MarkupParser {
    /// Matches the per-page PDF reference on current-layout node pages
    attachment_pattern: Regex,
}

impl MarkupParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            // The node page references its PDF as a relative path rooted at
            // /attachement (site's own spelling)
            attachment_pattern: Regex::new(r"/attachement.*?\.pdf").unwrap(),
        }
    }

    /// Count of current-layout page markers; zero means the layout is not live
    pub fn current_page_count(&self, html: &str) -> usize {
        html.matches(CURRENT_PAGE_MARKER).count()
    }

    /// Count of legacy-layout page markers; zero is a valid (empty) edition
    pub fn legacy_page_count(&self, html: &str) -> usize {
        html.matches(LEGACY_PAGE_MARKER).count()
    }

    /// First attachment path on a node page, if any
    pub fn attachment_path<'a>(&self, html: &'a str) -> Option<&'a str> {
        self.attachment_pattern.find(html).map(|m| m.as_str())
    }
}

impl Default for MarkupParser {
    fn default() -> Self {
        Self::new()
    }
}
