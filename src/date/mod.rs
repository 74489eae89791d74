//! Edition date validation and formatting
//!
//! A single newspaper edition is identified by its calendar day. This module
//! validates user-supplied dates in the five accepted encodings, expands
//! compact 16-digit ranges into day lists, and renders every date-derived
//! string the rest of the pipeline needs (URL path fragments and file names).

use chrono::{Datelike, Local, NaiveDate};

use crate::error::DateError;

/// First year with archived editions
pub const MIN_YEAR: i32 = 2003;

/// Accepted single-date encodings, tried in order
const ACCEPTED_FORMATS: &[&str] = &["%Y%m%d", "%Y-%m-%d", "%Y/%m/%d", "%Y-%m/%d", "%Y%m/%d"];

/// A validated edition date
///
/// Wraps a [`NaiveDate`] that is guaranteed to lie within the archive's
/// range (2003 through today) when produced by [`EditionDate::parse`] or
/// [`EditionDate::parse_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditionDate(NaiveDate);

impl EditionDate {
    /// Validate an optional date string, defaulting to today
    ///
    /// Tries the five accepted encodings in order and uses the first one
    /// that parses. Dates after today or before 2003 are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::UnrecognizedFormat`] when no encoding matches,
    /// [`DateError::InFuture`] / [`DateError::TooEarly`] on range violations.
    pub fn parse(input: Option<&str>) -> Result<Self, DateError> {
        Self::parse_with_today(input, Local::now().date_naive())
    }

    fn parse_with_today(input: Option<&str>, today: NaiveDate) -> Result<Self, DateError> {
        let Some(input) = input else {
            return Ok(Self(today));
        };

        for format in ACCEPTED_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(input, format) {
                return Self::bounded(date, today);
            }
        }

        Err(DateError::UnrecognizedFormat {
            input: input.to_string(),
        })
    }

    /// Validate a compact date range and expand it into a day list
    ///
    /// All non-digit characters are stripped first, so `20240101-20240105`
    /// and `2024-01-01..2024-01-05` are equivalent. The remaining digits
    /// must be exactly two concatenated `YYYYMMDD` dates. The result is
    /// every calendar day from start to end inclusive, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::BadRangeLength`] for anything other than 16
    /// digits, [`DateError::StartAfterEnd`] for an inverted range, and the
    /// single-date bound errors for out-of-range endpoints.
    pub fn parse_range(range: &str) -> Result<Vec<Self>, DateError> {
        Self::parse_range_with_today(range, Local::now().date_naive())
    }

    fn parse_range_with_today(range: &str, today: NaiveDate) -> Result<Vec<Self>, DateError> {
        let digits: String = range.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != 16 {
            return Err(DateError::BadRangeLength(digits.len()));
        }

        let (start_str, end_str) = digits.split_at(8);
        let start = NaiveDate::parse_from_str(start_str, "%Y%m%d").map_err(|_| {
            DateError::UnrecognizedFormat {
                input: start_str.to_string(),
            }
        })?;
        let end = NaiveDate::parse_from_str(end_str, "%Y%m%d").map_err(|_| {
            DateError::UnrecognizedFormat {
                input: end_str.to_string(),
            }
        })?;

        if start > end {
            return Err(DateError::StartAfterEnd { start, end });
        }
        if end > today {
            return Err(DateError::InFuture(end));
        }
        if start.year() < MIN_YEAR {
            return Err(DateError::TooEarly(start));
        }

        let mut days = Vec::new();
        let mut current = start;
        while current <= end {
            days.push(Self(current));
            current = current
                .succ_opt()
                .expect("date range is bounded well below NaiveDate::MAX");
        }
        Ok(days)
    }

    fn bounded(date: NaiveDate, today: NaiveDate) -> Result<Self, DateError> {
        if date > today {
            return Err(DateError::InFuture(date));
        }
        if date.year() < MIN_YEAR {
            return Err(DateError::TooEarly(date));
        }
        Ok(Self(date))
    }

    /// Today's edition date
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// The underlying calendar day
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// `YYYY-MM/DD` — path fragment used by the legacy archive layout
    pub fn archive_path(&self) -> String {
        self.0.format("%Y-%m/%d").to_string()
    }

    /// `YYYYMM/DD` — path fragment used by the current site layout
    pub fn layout_path(&self) -> String {
        self.0.format("%Y%m/%d").to_string()
    }

    /// `YYYYMMDD` — compact digits used in file names
    pub fn compact(&self) -> String {
        self.0.format("%Y%m%d").to_string()
    }

    /// Temporary file name for one page of this edition
    pub fn page_file_name(&self, page: u32) -> String {
        format!("rmrb{}{:02}.pdf", self.compact(), page)
    }

    /// Canonical file name of the merged edition
    pub fn output_file_name(&self) -> String {
        format!("People's.Daily.{}.pdf", self.compact())
    }
}

impl From<NaiveDate> for EditionDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl std::fmt::Display for EditionDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}
