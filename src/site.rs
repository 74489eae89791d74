//! URL templates for the newspaper site
//!
//! Both layouts derive every URL deterministically from the edition date.
//! The base can be overridden so tests can point the pipeline at a mock
//! server.

use crate::date::EditionDate;

/// Production base URL of the paper archive
pub const SITE_BASE: &str = "http://paper.people.com.cn/rmrb";

/// Deterministic URL builder for both site layouts
#[derive(Debug, Clone)]
pub struct SiteUrls {
    base: String,
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self {
            base: SITE_BASE.to_string(),
        }
    }
}

impl SiteUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different base URL (mock servers in tests)
    pub fn with_base(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Current-layout cover page, probed first to detect the live layout
    pub fn current_cover(&self, date: &EditionDate) -> String {
        self.current_node(date, 1)
    }

    /// Current-layout per-page node document carrying the attachment link
    pub fn current_node(&self, date: &EditionDate, page: u32) -> String {
        format!(
            "{}/pc/layout/{}/node_{:02}.html",
            self.base,
            date.layout_path(),
            page
        )
    }

    /// Legacy-layout cover page, the fallback probe target
    pub fn legacy_cover(&self, date: &EditionDate) -> String {
        format!(
            "{}/html/{}/nbs.D110000renmrb_01.htm",
            self.base,
            date.archive_path()
        )
    }

    /// Legacy-layout per-page PDF, addressable without indirection
    pub fn legacy_page(&self, date: &EditionDate, page: u32) -> String {
        format!(
            "{}/images/{}/rmrb{}{:02}.pdf",
            self.base,
            date.archive_path(),
            date.compact(),
            page
        )
    }

    /// Resolve an extracted attachment path against the current layout root
    pub fn attachment(&self, path: &str) -> String {
        format!("{}/pc{}", self.base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date() -> EditionDate {
        EditionDate::from(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
    }

    #[test]
    fn test_current_urls() {
        let site = SiteUrls::new();
        assert_eq!(
            site.current_cover(&date()),
            "http://paper.people.com.cn/rmrb/pc/layout/202401/05/node_01.html"
        );
        assert_eq!(
            site.current_node(&date(), 12),
            "http://paper.people.com.cn/rmrb/pc/layout/202401/05/node_12.html"
        );
    }

    #[test]
    fn test_legacy_urls() {
        let site = SiteUrls::new();
        assert_eq!(
            site.legacy_cover(&date()),
            "http://paper.people.com.cn/rmrb/html/2024-01/05/nbs.D110000renmrb_01.htm"
        );
        assert_eq!(
            site.legacy_page(&date(), 3),
            "http://paper.people.com.cn/rmrb/images/2024-01/05/rmrb2024010503.pdf"
        );
    }

    #[test]
    fn test_attachment_join() {
        let site = SiteUrls::new();
        assert_eq!(
            site.attachment("/attachement/1/2024-01/05/01/page.pdf"),
            "http://paper.people.com.cn/rmrb/pc/attachement/1/2024-01/05/01/page.pdf"
        );
    }

    #[test]
    fn test_base_override() {
        let site = SiteUrls::with_base("http://127.0.0.1:8080");
        assert!(site
            .current_cover(&date())
            .starts_with("http://127.0.0.1:8080/pc/layout/"));
    }
}
